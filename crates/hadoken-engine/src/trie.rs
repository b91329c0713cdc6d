//! Prefix tree over button sequences
//!
//! Nodes live in a flat arena and refer to their children by [`NodeId`], so the
//! trie has no internal pointers and can be shared read-only behind an `Arc`.

use std::collections::HashMap;

use crate::button::Button;
use crate::table::ComboTable;

/// Index of a node inside a [`ComboTrie`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Default)]
struct TrieNode {
    transitions: HashMap<Button, NodeId>,
    /// Name of the combo whose sequence ends at this node
    combo: Option<String>,
}

/// Immutable trie built from a [`ComboTable`].
#[derive(Debug, Clone)]
pub struct ComboTrie {
    nodes: Vec<TrieNode>,
}

impl ComboTrie {
    /// The root node every traversal starts from.
    pub const ROOT: NodeId = NodeId(0);

    /// Build the trie for every definition in `table`.
    ///
    /// Definitions sharing a prefix share the nodes along that prefix.
    pub fn build(table: &ComboTable) -> Self {
        let mut nodes = vec![TrieNode::default()];

        for definition in table.definitions() {
            let mut current = Self::ROOT;
            for &button in &definition.sequence {
                let existing = nodes[current.0].transitions.get(&button).copied();
                current = match existing {
                    Some(child) => child,
                    None => {
                        let child = NodeId(nodes.len());
                        nodes.push(TrieNode::default());
                        nodes[current.0].transitions.insert(button, child);
                        child
                    }
                };
            }
            nodes[current.0].combo = Some(definition.name.clone());
        }

        tracing::trace!(
            "Built combo trie with {} node(s) for {} combo(s)",
            nodes.len(),
            table.len()
        );

        Self { nodes }
    }

    /// Follow the transition for `button` out of `node`.
    pub fn child(&self, node: NodeId, button: Button) -> Option<NodeId> {
        self.nodes
            .get(node.0)
            .and_then(|n| n.transitions.get(&button))
            .copied()
    }

    /// The combo completed at `node`, if it is terminal.
    pub fn combo_at(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(node.0).and_then(|n| n.combo.as_deref())
    }

    /// Walk a full sequence from the root.
    pub fn walk(&self, sequence: &[Button]) -> Option<NodeId> {
        sequence
            .iter()
            .try_fold(Self::ROOT, |node, &button| self.child(node, button))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

impl Default for ComboTrie {
    fn default() -> Self {
        Self::build(&ComboTable::builtin())
    }
}
