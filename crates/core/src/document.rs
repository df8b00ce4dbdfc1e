//! Documents and the per-workspace document tree.

use serde::{Deserialize, Serialize};

use crate::types::ObjectId;

/// Document metadata as returned by `GET /document/info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: ObjectId,
    pub title: String,
    pub workspace_id: ObjectId,
    #[serde(default)]
    pub parent_document_id: Option<ObjectId>,
}

/// A node of the nested tree returned by `GET /document/tree`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentNode {
    pub id: ObjectId,
    pub title: String,
    #[serde(default)]
    pub children: Vec<DocumentNode>,
}

/// The forest of root documents in one workspace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentTree {
    pub roots: Vec<DocumentNode>,
}

impl DocumentTree {
    pub fn new(roots: Vec<DocumentNode>) -> Self {
        Self { roots }
    }

    /// Find a node anywhere in the tree.
    pub fn find(&self, id: ObjectId) -> Option<&DocumentNode> {
        fn search(nodes: &[DocumentNode], id: ObjectId) -> Option<&DocumentNode> {
            for node in nodes {
                if node.id == id {
                    return Some(node);
                }
                if let Some(found) = search(&node.children, id) {
                    return Some(found);
                }
            }
            None
        }
        search(&self.roots, id)
    }

    /// Visit every node depth first, pre-order, with its depth (roots are 0).
    pub fn walk(&self) -> Vec<(usize, &DocumentNode)> {
        fn visit<'a>(nodes: &'a [DocumentNode], depth: usize, out: &mut Vec<(usize, &'a DocumentNode)>) {
            for node in nodes {
                out.push((depth, node));
                visit(&node.children, depth + 1, out);
            }
        }
        let mut out = Vec::new();
        visit(&self.roots, 0, &mut out);
        out
    }

    pub fn len(&self) -> usize {
        self.walk().len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(title: &str, children: Vec<DocumentNode>) -> DocumentNode {
        DocumentNode {
            id: ObjectId::now_v7(),
            title: title.to_string(),
            children,
        }
    }

    #[test]
    fn walk_is_preorder_with_depth() {
        let tree = DocumentTree::new(vec![
            node("a", vec![node("a1", vec![]), node("a2", vec![node("a2x", vec![])])]),
            node("b", vec![]),
        ]);
        let titles: Vec<(usize, &str)> = tree
            .walk()
            .into_iter()
            .map(|(d, n)| (d, n.title.as_str()))
            .collect();
        assert_eq!(
            titles,
            vec![(0, "a"), (1, "a1"), (1, "a2"), (2, "a2x"), (0, "b")]
        );
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn find_locates_nested_node() {
        let deep = node("deep", vec![]);
        let deep_id = deep.id;
        let tree = DocumentTree::new(vec![node("root", vec![node("mid", vec![deep])])]);
        assert_eq!(tree.find(deep_id).map(|n| n.title.as_str()), Some("deep"));
        assert!(tree.find(ObjectId::nil()).is_none());
    }

    #[test]
    fn tree_decodes_from_plain_array() {
        let json = serde_json::json!([
            {"id": "0190b4d6-6f55-7c1e-9a52-1b2f3c4d5e6f", "title": "Root"}
        ]);
        let tree: DocumentTree = serde_json::from_value(json).unwrap();
        assert_eq!(tree.roots.len(), 1);
        assert!(tree.roots[0].children.is_empty());
    }
}
