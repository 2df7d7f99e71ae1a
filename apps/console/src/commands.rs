use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::info;

use keel_application::{
    ApplyOptions, ConsoleContext, ListScreen, LoadPhase, MutationOutcome, StatusMonitor,
    TreeScreen,
};
use keel_core::{AppError, AppResult, RecordId};
use keel_domain::{
    ConfigFilters, Department, DepartmentFilters, DictTypeFilters, Direction, MenuFilters,
    MenuNode, OperationLogFilters, Pagination, PostFilters, Resource, RoleFilters, TreeResource,
    UserFilters,
};
use keel_infrastructure::{HttpAdminClient, HttpResourceApi, HttpStatusStream};

/// Filters with a free-text search field.
pub trait KeywordFilter {
    fn set_keyword(&mut self, keyword: Option<String>);
}

macro_rules! keyword_filter {
    ($($filters:ty),+ $(,)?) => {
        $(
            impl KeywordFilter for $filters {
                fn set_keyword(&mut self, keyword: Option<String>) {
                    self.keyword = keyword;
                }
            }
        )+
    };
}

keyword_filter!(
    UserFilters,
    RoleFilters,
    PostFilters,
    DictTypeFilters,
    ConfigFilters,
    OperationLogFilters,
    DepartmentFilters,
    MenuFilters,
);

/// Line shown for a tree node.
pub trait NodeLabel {
    fn label(&self) -> String;
}

impl NodeLabel for Department {
    fn label(&self) -> String {
        format!("{} [{}]", self.dept_name, self.dept_id)
    }
}

impl NodeLabel for MenuNode {
    fn label(&self) -> String {
        format!(
            "{} [{}] {}",
            self.menu_name,
            self.menu_id,
            self.menu_type.as_str()
        )
    }
}

pub async fn list<R>(
    client: Arc<HttpAdminClient>,
    context: ConsoleContext,
    keyword: Option<String>,
    page: u32,
    page_size: Option<u32>,
) -> AppResult<()>
where
    R: Resource,
    R::Filters: KeywordFilter,
    R::Row: Serialize,
{
    let page_size = page_size.unwrap_or(context.options().page_size);
    let screen = ListScreen::<R>::new(Arc::new(HttpResourceApi::<R>::new(client)), context);
    let mut filters = R::Filters::default();
    filters.set_keyword(keyword.filter(|keyword| !keyword.trim().is_empty()));

    screen.restore(filters, Pagination::new(page, page_size)).await;
    screen.load().await;

    let view = screen.view().await;
    if let LoadPhase::Failed(message) = view.phase {
        return Err(AppError::Internal(message));
    }

    for row in &view.rows {
        let line = serde_json::to_string(row)
            .map_err(|error| AppError::Internal(format!("failed to render row: {error}")))?;
        println!("{line}");
    }
    println!(
        "page {}/{} ({} {} records)",
        view.pagination.page_num(),
        view.pagination.page_count(view.total).max(1),
        view.total,
        R::LABEL
    );
    Ok(())
}

pub async fn tree<R>(
    client: Arc<HttpAdminClient>,
    context: ConsoleContext,
    keyword: Option<String>,
    collapsed: bool,
) -> AppResult<()>
where
    R: TreeResource,
    R::Filters: KeywordFilter,
    R::Row: NodeLabel,
{
    let screen = TreeScreen::<R>::new(Arc::new(HttpResourceApi::<R>::new(client)), context);
    let mut filters = R::Filters::default();
    filters.set_keyword(keyword.filter(|keyword| !keyword.trim().is_empty()));
    screen
        .list()
        .apply_filters(filters, ApplyOptions::default())
        .await;
    screen.load().await;
    if collapsed {
        screen.collapse_all().await;
    }

    let view = screen.view().await;
    if let LoadPhase::Failed(message) = view.list.phase {
        return Err(AppError::Internal(message));
    }

    for node in view.visible() {
        let marker = match (node.has_children, node.expanded) {
            (false, _) => " ",
            (true, true) => "-",
            (true, false) => "+",
        };
        println!("{}{marker} {}", "  ".repeat(node.depth), node.node.label());
    }
    Ok(())
}

pub async fn move_node<R: TreeResource>(
    client: Arc<HttpAdminClient>,
    context: ConsoleContext,
    id: RecordId,
    direction: Direction,
) -> AppResult<()> {
    let screen = TreeScreen::<R>::new(Arc::new(HttpResourceApi::<R>::new(client)), context);
    screen.load().await;
    report(screen.move_node(id, direction).await)
}

pub async fn delete<R: Resource>(
    client: Arc<HttpAdminClient>,
    context: ConsoleContext,
    ids: Vec<RecordId>,
) -> AppResult<()> {
    let screen = ListScreen::<R>::new(Arc::new(HttpResourceApi::<R>::new(client)), context);
    for id in ids {
        screen.toggle_selection(id).await;
    }
    report(screen.bulk_delete().await)
}

pub async fn monitor(
    client: Arc<HttpAdminClient>,
    reconnect: Option<Duration>,
    seconds: u64,
) -> AppResult<()> {
    let monitor = StatusMonitor::new(Arc::new(HttpStatusStream::new(client)), reconnect);
    monitor.set_visible(true).await;

    for _ in 0..seconds {
        tokio::time::sleep(Duration::from_secs(1)).await;
        let view = monitor.view().await;
        match (&view.status, &view.error) {
            (_, Some(error)) => println!("[{:?}] {error}", view.connection),
            (Some(status), None) => println!(
                "[{:?}] {} cpu {:.1}% user, memory {:.1}%, up {}s",
                view.connection,
                status.host_name,
                status.cpu.user_percent,
                status.memory.used_percent(),
                status.uptime_seconds
            ),
            (None, None) => println!("[{:?}] waiting for first snapshot", view.connection),
        }
    }

    monitor.stop().await;
    info!("status monitor stopped");
    Ok(())
}

fn report(outcome: MutationOutcome) -> AppResult<()> {
    match outcome {
        MutationOutcome::Completed => Ok(()),
        MutationOutcome::Failed(message) => Err(AppError::Internal(message)),
        MutationOutcome::Skipped => {
            info!("nothing to do");
            Ok(())
        }
    }
}
