use generational_arena::Index;
use termtree::Tree;
use tracing::instrument;

use crate::domain::arena::TldTree;

/// Render a tree's shape for inspection.
pub trait TreeDisplay {
    fn to_tree_string(&self) -> Tree<String>;
}

impl TreeDisplay for TldTree {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self) -> Tree<String> {
        fn label(tree: &TldTree, idx: Index, side: &str) -> String {
            match tree.get_node(idx) {
                Some(node) => format!("{}{} ({}) h={}", side, node.key(), node.count(), node.height()),
                None => format!("{}?", side),
            }
        }

        fn build_tree(tree: &TldTree, node_idx: Index, parent_tree: &mut Tree<String>) {
            if let Some(node) = tree.get_node(node_idx) {
                for (side, child) in [("L ", node.left()), ("R ", node.right())] {
                    if let Some(child_idx) = child {
                        let mut child_tree = Tree::new(label(tree, child_idx, side));
                        build_tree(tree, child_idx, &mut child_tree);
                        parent_tree.push(child_tree);
                    }
                }
            }
        }

        if let Some(root_idx) = self.root() {
            let mut tree = Tree::new(label(self, root_idx, ""));
            build_tree(self, root_idx, &mut tree);
            tree
        } else {
            Tree::new("Empty tree".to_string())
        }
    }
}
