//! Hierarchical records: flattening, rebuilding and sibling reordering.

use std::collections::{BTreeMap, BTreeSet};

use keel_core::RecordId;
use serde::{Deserialize, Serialize};

/// A record that takes part in a parent/child hierarchy.
pub trait TreeNode: Clone {
    /// Returns the node identifier.
    fn node_id(&self) -> RecordId;

    /// Returns the parent identifier, `None` for root nodes.
    fn parent_id(&self) -> Option<RecordId>;

    /// Returns the one-based position among siblings.
    fn order_num(&self) -> u32;

    /// Overwrites the position among siblings.
    fn set_order_num(&mut self, order_num: u32);

    /// Detaches and returns nested children delivered by the backend.
    fn take_children(&mut self) -> Vec<Self>;
}

/// A node of a rebuilt tree.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeItem<T> {
    /// The record itself, without nested children.
    pub node: T,
    /// Zero for roots.
    pub depth: usize,
    /// Children ordered by position.
    pub children: Vec<TreeItem<T>>,
}

/// A row of the rendered tree after expand/collapse is applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleNode<'a, T> {
    /// The record.
    pub node: &'a T,
    /// Indentation level.
    pub depth: usize,
    /// Whether the node has children at all.
    pub has_children: bool,
    /// Whether the node's children are shown.
    pub expanded: bool,
}

/// Direction of a sibling move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Towards the first sibling.
    Up,
    /// Towards the last sibling.
    Down,
}

/// One element of a batch reorder request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderEntry {
    /// Node identifier.
    pub id: RecordId,
    /// Parent identifier, `0` on the wire for roots.
    #[serde(with = "root_parent")]
    pub parent_id: Option<RecordId>,
    /// One-based position among siblings.
    pub order_num: u32,
}

/// Flattens a nested response into a flat list, parents before children.
#[must_use]
pub fn flatten_nodes<T: TreeNode>(nodes: Vec<T>) -> Vec<T> {
    let mut flat = Vec::with_capacity(nodes.len());
    let mut stack: Vec<T> = nodes.into_iter().rev().collect();

    while let Some(mut node) = stack.pop() {
        let children = node.take_children();
        flat.push(node);
        stack.extend(children.into_iter().rev());
    }

    flat
}

/// Rebuilds the hierarchy of a flat row list.
///
/// Rows whose parent is missing from the list are shown as roots. Rows
/// caught in a parent cycle are appended as roots as well, so every row
/// appears exactly once.
#[must_use]
pub fn build_tree<T: TreeNode>(rows: &[T]) -> Vec<TreeItem<T>> {
    let children = children_by_parent(rows);
    let ids: BTreeSet<RecordId> = rows.iter().map(TreeNode::node_id).collect();

    let mut roots: Vec<&T> = rows
        .iter()
        .filter(|row| !has_known_parent(*row, &ids))
        .collect();
    roots.sort_by_key(|row| sibling_key(*row));

    let mut visited = BTreeSet::new();
    let mut items: Vec<TreeItem<T>> = roots
        .into_iter()
        .filter_map(|row| build_item(row, 0, &children, &mut visited))
        .collect();

    for row in rows {
        if !visited.contains(&row.node_id())
            && let Some(item) = build_item(row, 0, &children, &mut visited)
        {
            items.push(item);
        }
    }

    items
}

fn build_item<T: TreeNode>(
    row: &T,
    depth: usize,
    children: &BTreeMap<RecordId, Vec<&T>>,
    visited: &mut BTreeSet<RecordId>,
) -> Option<TreeItem<T>> {
    if !visited.insert(row.node_id()) {
        return None;
    }

    let nested = children
        .get(&row.node_id())
        .map(|kids| {
            kids.iter()
                .filter_map(|kid| build_item(*kid, depth + 1, children, visited))
                .collect()
        })
        .unwrap_or_default();

    Some(TreeItem {
        node: row.clone(),
        depth,
        children: nested,
    })
}

/// Lists the rows shown when only `expanded` nodes reveal their children.
#[must_use]
pub fn visible_nodes<'a, T>(
    items: &'a [TreeItem<T>],
    expanded: &BTreeSet<RecordId>,
) -> Vec<VisibleNode<'a, T>>
where
    T: TreeNode,
{
    let mut visible = Vec::new();
    collect_visible(items, expanded, &mut visible);
    visible
}

fn collect_visible<'a, T: TreeNode>(
    items: &'a [TreeItem<T>],
    expanded: &BTreeSet<RecordId>,
    visible: &mut Vec<VisibleNode<'a, T>>,
) {
    for item in items {
        let is_expanded = expanded.contains(&item.node.node_id());
        visible.push(VisibleNode {
            node: &item.node,
            depth: item.depth,
            has_children: !item.children.is_empty(),
            expanded: is_expanded,
        });

        if is_expanded {
            collect_visible(&item.children, expanded, visible);
        }
    }
}

/// Returns the ids of rows that have at least one child in the list.
#[must_use]
pub fn parent_ids<T: TreeNode>(rows: &[T]) -> BTreeSet<RecordId> {
    let ids: BTreeSet<RecordId> = rows.iter().map(TreeNode::node_id).collect();
    rows.iter()
        .filter_map(TreeNode::parent_id)
        .filter(|parent| ids.contains(parent))
        .collect()
}

/// Returns the ids of every descendant of `id`, excluding `id` itself.
#[must_use]
pub fn descendant_ids<T: TreeNode>(rows: &[T], id: RecordId) -> BTreeSet<RecordId> {
    let children = children_by_parent(rows);
    let mut descendants = BTreeSet::new();
    let mut pending = vec![id];

    while let Some(current) = pending.pop() {
        for child in children.get(&current).into_iter().flatten() {
            let child_id = child.node_id();
            if child_id != id && descendants.insert(child_id) {
                pending.push(child_id);
            }
        }
    }

    descendants
}

/// Returns the ids under `parent_id` in display order.
#[must_use]
pub fn sibling_order<T: TreeNode>(rows: &[T], parent_id: Option<RecordId>) -> Vec<RecordId> {
    let mut siblings: Vec<&T> = rows
        .iter()
        .filter(|row| row.parent_id() == parent_id)
        .collect();
    siblings.sort_by_key(|row| sibling_key(*row));
    siblings.into_iter().map(TreeNode::node_id).collect()
}

/// Computes the sibling order after moving `id` one step.
///
/// Returns `None` when `id` is not among the siblings or already sits at
/// the edge in the requested direction.
#[must_use]
pub fn move_sibling(
    order: &[RecordId],
    id: RecordId,
    direction: Direction,
) -> Option<Vec<RecordId>> {
    let index = order.iter().position(|candidate| *candidate == id)?;
    let target = match direction {
        Direction::Up => index.checked_sub(1)?,
        Direction::Down => {
            let next = index + 1;
            if next >= order.len() {
                return None;
            }
            next
        }
    };

    let mut moved = order.to_vec();
    moved.swap(index, target);
    Some(moved)
}

/// Assigns `order_num = index + 1` to the listed rows.
pub fn apply_sibling_order<T: TreeNode>(rows: &mut [T], ordered_ids: &[RecordId]) {
    for row in rows.iter_mut() {
        if let Some(index) = ordered_ids.iter().position(|id| *id == row.node_id()) {
            row.set_order_num(position_of(index));
        }
    }
}

/// Builds the batch reorder request for a sibling group.
#[must_use]
pub fn reorder_entries(parent_id: Option<RecordId>, ordered_ids: &[RecordId]) -> Vec<ReorderEntry> {
    ordered_ids
        .iter()
        .enumerate()
        .map(|(index, id)| ReorderEntry {
            id: *id,
            parent_id,
            order_num: position_of(index),
        })
        .collect()
}

fn position_of(index: usize) -> u32 {
    u32::try_from(index).unwrap_or(u32::MAX - 1).saturating_add(1)
}

fn sibling_key<T: TreeNode>(row: &T) -> (u32, RecordId) {
    (row.order_num(), row.node_id())
}

fn has_known_parent<T: TreeNode>(row: &T, ids: &BTreeSet<RecordId>) -> bool {
    row.parent_id()
        .is_some_and(|parent| parent != row.node_id() && ids.contains(&parent))
}

fn children_by_parent<T: TreeNode>(rows: &[T]) -> BTreeMap<RecordId, Vec<&T>> {
    let ids: BTreeSet<RecordId> = rows.iter().map(TreeNode::node_id).collect();
    let mut children: BTreeMap<RecordId, Vec<&T>> = BTreeMap::new();

    for row in rows {
        if has_known_parent(row, &ids)
            && let Some(parent) = row.parent_id()
        {
            children.entry(parent).or_default().push(row);
        }
    }

    for siblings in children.values_mut() {
        siblings.sort_by_key(|row| sibling_key(*row));
    }

    children
}

/// Serde adapter mapping a root parent to `0` on the wire.
pub mod root_parent {
    use keel_core::RecordId;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Writes `None` as `0`.
    pub fn serialize<S>(value: &Option<RecordId>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(value.map_or(0, |id| id.get()))
    }

    /// Reads `0` or `null` as `None`.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<RecordId>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<u64>::deserialize(deserializer)?;
        Ok(value.filter(|id| *id != 0).map(RecordId::new))
    }
}

#[cfg(test)]
mod tests {
    use keel_core::RecordId;
    use proptest::prelude::*;

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Node {
        id: u64,
        parent: Option<u64>,
        order: u32,
        children: Vec<Node>,
    }

    impl Node {
        fn new(id: u64, parent: Option<u64>, order: u32) -> Self {
            Self {
                id,
                parent,
                order,
                children: Vec::new(),
            }
        }
    }

    impl TreeNode for Node {
        fn node_id(&self) -> RecordId {
            RecordId::new(self.id)
        }

        fn parent_id(&self) -> Option<RecordId> {
            self.parent.map(RecordId::new)
        }

        fn order_num(&self) -> u32 {
            self.order
        }

        fn set_order_num(&mut self, order_num: u32) {
            self.order = order_num;
        }

        fn take_children(&mut self) -> Vec<Self> {
            std::mem::take(&mut self.children)
        }
    }

    fn ids(values: &[u64]) -> Vec<RecordId> {
        values.iter().copied().map(RecordId::new).collect()
    }

    #[test]
    fn flatten_keeps_parents_before_children() {
        let mut root = Node::new(1, None, 1);
        let mut child = Node::new(2, Some(1), 1);
        child.children.push(Node::new(3, Some(2), 1));
        root.children.push(child);
        root.children.push(Node::new(4, Some(1), 2));

        let flat = flatten_nodes(vec![root]);
        let order: Vec<u64> = flat.iter().map(|node| node.id).collect();
        assert_eq!(order, vec![1, 2, 3, 4]);
        assert!(flat.iter().all(|node| node.children.is_empty()));
    }

    #[test]
    fn build_tree_orders_siblings_and_promotes_orphans() {
        let rows = vec![
            Node::new(1, None, 2),
            Node::new(2, None, 1),
            Node::new(3, Some(1), 2),
            Node::new(4, Some(1), 1),
            Node::new(5, Some(99), 1),
        ];

        let tree = build_tree(&rows);
        let roots: Vec<u64> = tree.iter().map(|item| item.node.id).collect();
        assert_eq!(roots, vec![2, 1, 5]);

        let children: Vec<u64> = tree[1].children.iter().map(|item| item.node.id).collect();
        assert_eq!(children, vec![4, 3]);
        assert_eq!(tree[1].children[0].depth, 1);
    }

    #[test]
    fn build_tree_keeps_cyclic_rows() {
        let rows = vec![Node::new(1, Some(2), 1), Node::new(2, Some(1), 1)];
        let tree = build_tree(&rows);
        let total: usize = tree.iter().map(|item| 1 + item.children.len()).sum();
        assert_eq!(total, 2);
    }

    #[test]
    fn visible_nodes_hide_collapsed_children() {
        let rows = vec![
            Node::new(1, None, 1),
            Node::new(2, Some(1), 1),
            Node::new(3, None, 2),
        ];
        let tree = build_tree(&rows);

        let collapsed = visible_nodes(&tree, &BTreeSet::new());
        assert_eq!(collapsed.len(), 2);
        assert!(collapsed[0].has_children);

        let expanded = visible_nodes(&tree, &BTreeSet::from([RecordId::new(1)]));
        let order: Vec<u64> = expanded.iter().map(|visible| visible.node.id).collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn descendants_cover_all_levels() {
        let rows = vec![
            Node::new(1, None, 1),
            Node::new(2, Some(1), 1),
            Node::new(3, Some(2), 1),
            Node::new(4, None, 2),
        ];
        assert_eq!(
            descendant_ids(&rows, RecordId::new(1)),
            BTreeSet::from([RecordId::new(2), RecordId::new(3)])
        );
        assert_eq!(parent_ids(&rows), BTreeSet::from([RecordId::new(1), RecordId::new(2)]));
    }

    #[test]
    fn moving_up_swaps_with_previous_sibling() {
        let moved = move_sibling(&ids(&[1, 2, 3]), RecordId::new(2), Direction::Up);
        assert_eq!(moved, Some(ids(&[2, 1, 3])));
    }

    #[test]
    fn moving_past_the_edge_is_rejected() {
        assert_eq!(
            move_sibling(&ids(&[1, 2, 3]), RecordId::new(1), Direction::Up),
            None
        );
        assert_eq!(
            move_sibling(&ids(&[1, 2, 3]), RecordId::new(3), Direction::Down),
            None
        );
        assert_eq!(
            move_sibling(&ids(&[1, 2, 3]), RecordId::new(7), Direction::Down),
            None
        );
    }

    #[test]
    fn reorder_entries_number_from_one() {
        let entries = reorder_entries(Some(RecordId::new(5)), &ids(&[9, 8]));
        assert_eq!(entries[0].order_num, 1);
        assert_eq!(entries[1].order_num, 2);
        assert_eq!(entries[1].id, RecordId::new(8));
    }

    #[test]
    fn root_parent_is_zero_on_the_wire() {
        let entry = ReorderEntry {
            id: RecordId::new(3),
            parent_id: None,
            order_num: 1,
        };
        let encoded = serde_json::to_value(entry).unwrap_or_default();
        assert_eq!(encoded["parentId"], 0);

        let decoded: Result<ReorderEntry, _> =
            serde_json::from_str(r#"{"id":3,"parentId":0,"orderNum":1}"#);
        assert!(matches!(decoded, Ok(entry) if entry.parent_id.is_none()));
    }

    #[test]
    fn applying_order_rewrites_positions() {
        let mut rows = vec![
            Node::new(1, None, 1),
            Node::new(2, None, 2),
            Node::new(3, None, 3),
        ];
        apply_sibling_order(&mut rows, &ids(&[2, 1, 3]));
        assert_eq!(sibling_order(&rows, None), ids(&[2, 1, 3]));
    }

    proptest! {
        #[test]
        fn moves_are_permutations(len in 1_usize..12, pick in 0_usize..12, up in any::<bool>()) {
            let order: Vec<RecordId> = (1..=len as u64).map(RecordId::new).collect();
            let id = order[pick % len];
            let direction = if up { Direction::Up } else { Direction::Down };

            if let Some(moved) = move_sibling(&order, id, direction) {
                let mut sorted = moved.clone();
                sorted.sort();
                prop_assert_eq!(sorted, order.clone());
                prop_assert_ne!(moved, order);
            }
        }
    }
}
