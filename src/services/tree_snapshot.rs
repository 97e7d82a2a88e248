use crate::enums::priority::Priority;
use crate::structs::approval_request::ApprovalRequest;
use crate::structs::history_group::HistoryGroup;
use crate::structs::tree_node::TreeNode;

/// Queue view: one node per non-empty priority, requests underneath.
pub fn queue_tree(groups: &[(Priority, Vec<ApprovalRequest>)]) -> Vec<TreeNode> {
    groups
        .iter()
        .map(|(priority, requests)| {
            let children = requests
                .iter()
                .map(|request| {
                    let description = format!("{} line(s) · {}", request.line_change_count(), request.created_at.format("%H:%M"));
                    TreeNode::leaf(&request.id, &request.title, Some(description))
                })
                .collect();
            let label = format!("{} {} priority", priority.emoji(), priority);
            TreeNode::group(&format!("priority-{}", priority), &label, children)
        })
        .collect()
}

/// History view: day groups, newest first, entries underneath.
pub fn history_tree(groups: &[HistoryGroup]) -> Vec<TreeNode> {
    groups
        .iter()
        .map(|group| {
            let children = group
                .entries
                .iter()
                .map(|entry| {
                    let description = format!("{} {}", entry.status.emoji(), entry.status);
                    TreeNode::leaf(&entry.id, &entry.title, Some(description))
                })
                .collect();
            TreeNode::group(&format!("day-{}", group.date), &group.label, children)
        })
        .collect()
}
