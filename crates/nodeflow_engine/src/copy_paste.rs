// SPDX-License-Identifier: MIT OR Apache-2.0
//! Copy/paste through an internal scratch graph.

use crate::filter::{AllNodesFilter, NodeCollection};
use crate::graph::NodeGraph;
use crate::merge::{MergeError, MergeResult};

/// Holds the last copied subgraph until it is pasted
#[derive(Debug, Clone)]
pub struct CopyPasteHandler {
    scratch: NodeGraph,
}

impl CopyPasteHandler {
    /// Create a handler with nothing to paste
    pub fn new() -> Self {
        Self {
            scratch: NodeGraph::new("Clipboard"),
        }
    }

    /// Whether a previous copy left something to paste
    pub fn can_paste(&self) -> bool {
        !self.scratch.is_empty()
    }

    /// Replace the clipboard with the selected nodes of `source`
    pub fn copy_from(&mut self, source: &NodeGraph, selection: &NodeCollection) -> Result<MergeResult, MergeError> {
        self.scratch = NodeGraph::new("Clipboard");
        source.merge_to(&mut self.scratch, selection)
    }

    /// Paste the clipboard into `target`; every paste gets fresh node IDs
    pub fn paste_to(&self, target: &mut NodeGraph) -> Result<MergeResult, MergeError> {
        self.scratch.merge_to(target, &AllNodesFilter)
    }

    /// The copied subgraph
    pub fn clipboard(&self) -> &NodeGraph {
        &self.scratch
    }

    /// Forget the copied subgraph
    pub fn clear(&mut self) {
        self.scratch = NodeGraph::new("Clipboard");
    }
}

impl Default for CopyPasteHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeId;
    use crate::slot::{InputSlotRef, OutputSlotRef};
    use crate::test_nodes::{adder, constant};

    #[test]
    fn test_nothing_to_paste_initially() {
        let handler = CopyPasteHandler::new();
        assert!(!handler.can_paste());
        let mut target = NodeGraph::default();
        assert!(matches!(handler.paste_to(&mut target), Err(MergeError::EmptyMergeSet)));
    }

    #[test]
    fn test_failed_copy_clears_clipboard() {
        let mut source = NodeGraph::default();
        let a = source.add_node(constant(1)).unwrap();
        let mut handler = CopyPasteHandler::new();
        handler.copy_from(&source, &[a].into_iter().collect()).unwrap();
        assert!(handler.can_paste());

        let result = handler.copy_from(&source, &[NodeId::new()].into_iter().collect());
        assert!(result.is_err());
        assert!(!handler.can_paste());
    }

    #[test]
    fn test_paste_twice_gives_distinct_copies() {
        let mut source = NodeGraph::default();
        let a = source.add_node(constant(1)).unwrap();
        let b = source.add_node(adder()).unwrap();
        source.connect(&OutputSlotRef::new(a, "out"), &InputSlotRef::new(b, "a")).unwrap();

        let mut handler = CopyPasteHandler::new();
        handler.copy_from(&source, &[a, b].into_iter().collect()).unwrap();

        let first = handler.paste_to(&mut source).unwrap();
        let second = handler.paste_to(&mut source).unwrap();
        assert_eq!(source.node_count(), 6);
        assert_eq!(source.connection_count(), 3);

        let first_ids: Vec<_> = first.new_node_ids().collect();
        let second_ids: Vec<_> = second.new_node_ids().collect();
        assert!(first_ids.iter().all(|id| !second_ids.contains(id)));
        assert!(first_ids.iter().all(|id| *id != a && *id != b));
    }
}
