use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use keel_core::{AppError, AppResult, RecordId};
use keel_domain::{
    Direction, ListQuery, ListResult, MenuFilters, MenuNode, MenuPayload, MenuType, Menus,
    RecordStatus, ReorderEntry, TreeNode,
};

use crate::{ConsoleContext, MutationOutcome, Notifier, ResourceApi, ScreenOptions, TreeApi};

use super::TreeScreen;

struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn success(&self, _message: &str) {}

    fn error(&self, _message: &str) {}
}

struct FakeMenuApi {
    rows: Mutex<Vec<MenuNode>>,
    created: Mutex<Vec<MenuPayload>>,
    reorders: Mutex<Vec<Vec<ReorderEntry>>>,
    tree_calls: AtomicUsize,
    reject_reorder: AtomicBool,
    nested: bool,
}

impl FakeMenuApi {
    fn new(rows: Vec<MenuNode>) -> Self {
        Self {
            rows: Mutex::new(rows),
            created: Mutex::new(Vec::new()),
            reorders: Mutex::new(Vec::new()),
            tree_calls: AtomicUsize::new(0),
            reject_reorder: AtomicBool::new(false),
            nested: false,
        }
    }
}

#[async_trait]
impl ResourceApi<Menus> for FakeMenuApi {
    async fn list(&self, _query: &ListQuery<MenuFilters>) -> AppResult<ListResult<MenuNode>> {
        Err(AppError::Internal("menus are not paginated".to_owned()))
    }

    async fn create(&self, payload: &MenuPayload) -> AppResult<()> {
        self.created.lock().await.push(payload.clone());
        Ok(())
    }

    async fn update(&self, _id: RecordId, _payload: &MenuPayload) -> AppResult<()> {
        Ok(())
    }

    async fn remove(&self, id: RecordId) -> AppResult<()> {
        self.rows.lock().await.retain(|row| row.menu_id != id);
        Ok(())
    }
}

#[async_trait]
impl TreeApi<Menus> for FakeMenuApi {
    async fn list_tree(&self, _filters: &MenuFilters) -> AppResult<Vec<MenuNode>> {
        self.tree_calls.fetch_add(1, Ordering::SeqCst);
        let rows = self.rows.lock().await.clone();
        if !self.nested {
            return Ok(rows);
        }

        let mut roots: Vec<MenuNode> = rows
            .iter()
            .filter(|row| row.parent_id.is_none())
            .cloned()
            .collect();
        for root in &mut roots {
            root.children = rows
                .iter()
                .filter(|row| row.parent_id == Some(root.menu_id))
                .cloned()
                .collect();
        }
        Ok(roots)
    }

    async fn reorder(&self, entries: &[ReorderEntry]) -> AppResult<()> {
        self.reorders.lock().await.push(entries.to_vec());
        if self.reject_reorder.load(Ordering::SeqCst) {
            return Err(AppError::Conflict("menu order changed concurrently".to_owned()));
        }

        let mut rows = self.rows.lock().await;
        for entry in entries {
            if let Some(row) = rows.iter_mut().find(|row| row.menu_id == entry.id) {
                row.order_num = entry.order_num;
            }
        }
        Ok(())
    }
}

fn node(id: u64, parent: Option<u64>, menu_type: MenuType, order_num: u32) -> MenuNode {
    MenuNode {
        menu_id: RecordId::new(id),
        parent_id: parent.map(RecordId::new),
        menu_name: format!("menu {id}"),
        menu_type,
        order_num,
        path: None,
        component: None,
        perms: None,
        icon: None,
        visible: true,
        status: RecordStatus::Normal,
        children: Vec::new(),
    }
}

fn sample_menus() -> Vec<MenuNode> {
    vec![
        node(1, None, MenuType::Directory, 1),
        node(2, Some(1), MenuType::Menu, 1),
        node(3, Some(1), MenuType::Menu, 2),
        node(4, Some(2), MenuType::Button, 1),
        node(5, None, MenuType::Directory, 2),
    ]
}

fn screen(api: &Arc<FakeMenuApi>) -> TreeScreen<Menus> {
    let context = ConsoleContext::new(Arc::new(SilentNotifier), ScreenOptions::default());
    TreeScreen::new(api.clone(), context)
}

fn order_of(rows: &[MenuNode], id: u64) -> Option<u32> {
    rows.iter()
        .find(|row| row.node_id() == RecordId::new(id))
        .map(TreeNode::order_num)
}

#[tokio::test]
async fn parents_start_expanded_and_collapsed_nodes_stay_collapsed() {
    let api = Arc::new(FakeMenuApi::new(sample_menus()));
    let screen = screen(&api);
    screen.load().await;

    let view = screen.view().await;
    assert_eq!(view.visible().len(), 5);
    assert_eq!(
        view.expanded,
        BTreeSet::from([RecordId::new(1), RecordId::new(2)])
    );

    screen.toggle(RecordId::new(1)).await;
    api.rows
        .lock()
        .await
        .push(node(6, Some(5), MenuType::Menu, 1));
    screen.list().refresh().await;

    let view = screen.view().await;
    assert!(!view.expanded.contains(&RecordId::new(1)));
    assert!(view.expanded.contains(&RecordId::new(5)));
    let visible: Vec<RecordId> = view.visible().iter().map(|row| row.node.menu_id).collect();
    assert_eq!(
        visible,
        vec![RecordId::new(1), RecordId::new(5), RecordId::new(6)]
    );
}

#[tokio::test]
async fn expand_and_collapse_all() {
    let api = Arc::new(FakeMenuApi::new(sample_menus()));
    let screen = screen(&api);
    screen.load().await;

    screen.collapse_all().await;
    assert_eq!(screen.view().await.visible().len(), 2);

    screen.expand_all().await;
    assert_eq!(screen.view().await.visible().len(), 5);
}

#[tokio::test]
async fn nested_responses_are_flattened() {
    let api = Arc::new(FakeMenuApi {
        nested: true,
        ..FakeMenuApi::new(sample_menus())
    });
    let screen = screen(&api);
    screen.load().await;

    let view = screen.view().await;
    assert_eq!(view.list.rows.len(), 4);
    assert_eq!(view.items.len(), 2);
    assert_eq!(view.items[0].children.len(), 2);
}

#[tokio::test]
async fn move_applies_new_order_and_sends_it() {
    let api = Arc::new(FakeMenuApi::new(sample_menus()));
    let screen = screen(&api);
    screen.load().await;

    let outcome = screen.move_node(RecordId::new(3), Direction::Up).await;

    assert_eq!(outcome, MutationOutcome::Completed);
    let reorders = api.reorders.lock().await.clone();
    assert_eq!(
        reorders,
        vec![vec![
            ReorderEntry {
                id: RecordId::new(3),
                parent_id: Some(RecordId::new(1)),
                order_num: 1,
            },
            ReorderEntry {
                id: RecordId::new(2),
                parent_id: Some(RecordId::new(1)),
                order_num: 2,
            },
        ]]
    );
    let view = screen.view().await;
    assert_eq!(order_of(&view.list.rows, 3), Some(1));
    assert_eq!(view.items[0].children[0].node.menu_id, RecordId::new(3));
    assert_eq!(api.tree_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn rejected_move_is_rolled_back_by_refetch() {
    let api = Arc::new(FakeMenuApi::new(sample_menus()));
    api.reject_reorder.store(true, Ordering::SeqCst);
    let screen = screen(&api);
    screen.load().await;

    let outcome = screen.move_node(RecordId::new(5), Direction::Up).await;

    assert_eq!(
        outcome,
        MutationOutcome::Failed("menu order changed concurrently".to_owned())
    );
    assert_eq!(api.tree_calls.load(Ordering::SeqCst), 2);
    let view = screen.view().await;
    assert_eq!(order_of(&view.list.rows, 5), Some(2));
    assert_eq!(order_of(&view.list.rows, 1), Some(1));
    assert!(!view.list.mutating);
}

#[tokio::test]
async fn move_at_the_edge_sends_nothing() {
    let api = Arc::new(FakeMenuApi::new(sample_menus()));
    let screen = screen(&api);
    screen.load().await;

    assert_eq!(
        screen.move_node(RecordId::new(1), Direction::Up).await,
        MutationOutcome::Skipped
    );
    assert_eq!(
        screen.move_node(RecordId::new(4), Direction::Down).await,
        MutationOutcome::Skipped
    );
    assert!(api.reorders.lock().await.is_empty());
}

#[tokio::test]
async fn button_cannot_hold_a_menu() {
    let api = Arc::new(FakeMenuApi::new(sample_menus()));
    let screen = screen(&api);
    screen.load().await;

    screen
        .open_create_child(Some(RecordId::new(4)))
        .await
        .ok();
    screen
        .list()
        .edit_form(|form| {
            form.menu_type = MenuType::Menu;
            form.menu_name = "Audit".to_owned();
            form.path = "audit".to_owned();
        })
        .await;

    assert!(matches!(
        screen.submit().await,
        Err(AppError::Validation(message)) if message == "a button cannot contain a menu"
    ));
    assert!(api.created.lock().await.is_empty());
}

#[tokio::test]
async fn node_cannot_move_under_its_descendant() {
    let api = Arc::new(FakeMenuApi::new(sample_menus()));
    let screen = screen(&api);
    screen.load().await;

    screen.list().open_edit(node(1, None, MenuType::Directory, 1)).await.ok();
    screen
        .list()
        .edit_form(|form| {
            form.path = "system".to_owned();
            form.parent_id = Some(RecordId::new(2));
        })
        .await;

    assert!(matches!(screen.submit().await, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn unknown_parent_is_rejected() {
    let api = Arc::new(FakeMenuApi::new(sample_menus()));
    let screen = screen(&api);
    screen.load().await;

    screen.open_create_child(Some(RecordId::new(99))).await.ok();
    screen
        .list()
        .edit_form(|form| {
            form.menu_name = "Lost".to_owned();
            form.path = "lost".to_owned();
        })
        .await;

    assert!(matches!(screen.submit().await, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn valid_child_is_created_and_tree_refetched() {
    let api = Arc::new(FakeMenuApi::new(sample_menus()));
    let screen = screen(&api);
    screen.load().await;

    screen.open_create_child(Some(RecordId::new(3))).await.ok();
    screen
        .list()
        .edit_form(|form| {
            form.menu_type = MenuType::Button;
            form.menu_name = "Edit role".to_owned();
            form.perms = "system:role:edit".to_owned();
        })
        .await;

    assert!(matches!(screen.submit().await, Ok(MutationOutcome::Completed)));
    let created = api.created.lock().await.clone();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].parent_id, Some(RecordId::new(3)));
    assert_eq!(created[0].path, None);
    assert_eq!(api.tree_calls.load(Ordering::SeqCst), 2);
}
