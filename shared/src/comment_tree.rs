//! Comment forest assembly
//!
//! Comments are stored flat with an optional parent pointer. The builder
//! turns them into an ordered forest where every input comment appears
//! exactly once.

use std::collections::HashMap;

use crate::models::{Comment, CommentNode};

/// Build the reply forest from comments in display order
///
/// A comment whose parent is missing from `comments` becomes a root. Replies
/// keep input order. Comments caught in a parent cycle are emitted as roots.
pub fn build_comment_tree(comments: Vec<Comment>) -> Vec<CommentNode> {
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(comments.len());
    for (pos, comment) in comments.iter().enumerate() {
        index.entry(comment.id.as_str()).or_insert(pos);
    }

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); comments.len()];
    let mut roots = Vec::new();
    for (pos, comment) in comments.iter().enumerate() {
        match comment
            .parent_comment_id
            .as_deref()
            .and_then(|parent| index.get(parent))
        {
            Some(&parent) if parent != pos => children[parent].push(pos),
            Some(_) => {} // self-parented, picked up by the leftover pass
            None => roots.push(pos),
        }
    }
    drop(index);

    let mut slots: Vec<Option<Comment>> = comments.into_iter().map(Some).collect();
    let mut forest = Vec::with_capacity(roots.len());
    for pos in roots {
        if let Some(node) = assemble(pos, &mut slots, &children) {
            forest.push(node);
        }
    }

    // Anything still unclaimed sits on a cycle
    for pos in 0..slots.len() {
        if let Some(node) = assemble(pos, &mut slots, &children) {
            forest.push(node);
        }
    }

    forest
}

fn assemble(
    pos: usize,
    slots: &mut [Option<Comment>],
    children: &[Vec<usize>],
) -> Option<CommentNode> {
    let comment = slots[pos].take()?;
    let replies = children[pos]
        .iter()
        .filter_map(|&child| assemble(child, slots, children))
        .collect();
    Some(CommentNode { comment, replies })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(id: &str, parent: Option<&str>, created_at: i64) -> Comment {
        Comment {
            id: id.to_string(),
            ticket_id: "t1".to_string(),
            author_id: "u1".to_string(),
            body: format!("body of {id}"),
            parent_comment_id: parent.map(str::to_string),
            created_at,
            updated_at: created_at,
        }
    }

    fn ids(nodes: &[CommentNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.comment.id.as_str()).collect()
    }

    #[test]
    fn test_empty() {
        assert!(build_comment_tree(vec![]).is_empty());
    }

    #[test]
    fn test_single_reply() {
        let tree = build_comment_tree(vec![comment("c1", None, 1), comment("c2", Some("c1"), 2)]);
        assert_eq!(ids(&tree), vec!["c1"]);
        assert_eq!(ids(&tree[0].replies), vec!["c2"]);
        assert!(tree[0].replies[0].replies.is_empty());
    }

    #[test]
    fn test_replies_keep_input_order() {
        let tree = build_comment_tree(vec![
            comment("root", None, 1),
            comment("b", Some("root"), 2),
            comment("a", Some("root"), 3),
            comment("b1", Some("b"), 4),
            comment("second", None, 5),
        ]);
        assert_eq!(ids(&tree), vec!["root", "second"]);
        assert_eq!(ids(&tree[0].replies), vec!["b", "a"]);
        assert_eq!(ids(&tree[0].replies[0].replies), vec!["b1"]);
    }

    #[test]
    fn test_reply_before_parent_in_input() {
        let tree = build_comment_tree(vec![comment("c2", Some("c1"), 1), comment("c1", None, 2)]);
        assert_eq!(ids(&tree), vec!["c1"]);
        assert_eq!(ids(&tree[0].replies), vec!["c2"]);
    }

    #[test]
    fn test_orphan_becomes_root() {
        let tree = build_comment_tree(vec![
            comment("c1", None, 1),
            comment("orphan", Some("deleted"), 2),
        ]);
        assert_eq!(ids(&tree), vec!["c1", "orphan"]);
    }

    #[test]
    fn test_cycle_is_not_dropped() {
        let tree = build_comment_tree(vec![
            comment("a", Some("b"), 1),
            comment("b", Some("a"), 2),
            comment("self", Some("self"), 3),
        ]);
        assert_eq!(ids(&tree), vec!["a", "self"]);
        assert_eq!(ids(&tree[0].replies), vec!["b"]);
        assert!(tree[0].replies[0].replies.is_empty());
    }
}
