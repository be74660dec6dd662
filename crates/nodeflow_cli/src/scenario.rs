// SPDX-License-Identifier: MIT OR Apache-2.0
//! Reference editing session: build, evaluate, toggle and copy a small graph.

use crate::nodes;
use nodeflow_engine::{
    ConnectionError, CopyPasteHandler, EditorConfig, EvaluationContext, EvaluationError,
    FeatureError, InputSlotRef, MergeError, NodeCollection, NodeEditorInfo, NodeError, NodeGraph,
    NodeId, OutputSlotRef, Value,
};

/// Error while running the session
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    /// Node creation or parameter change failed
    #[error("Node error: {0}")]
    Node(#[from] NodeError),

    /// Connecting slots failed
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),

    /// Evaluation pass failed
    #[error("Evaluation error: {0}")]
    Evaluation(#[from] EvaluationError),

    /// Feature toggle failed
    #[error("Feature error: {0}")]
    Feature(#[from] FeatureError),

    /// Copy or paste failed
    #[error("Merge error: {0}")]
    Merge(#[from] MergeError),
}

/// Final state of a session
#[derive(Debug)]
pub struct ScenarioOutcome {
    /// Graph after all edits
    pub graph: NodeGraph,
    /// Published values after the last pass
    pub context: EvaluationContext,
    /// Published value count after each step
    pub published_counts: Vec<usize>,
}

fn out(node: NodeId) -> OutputSlotRef {
    OutputSlotRef::new(node, "out")
}

fn input(node: NodeId, slot: &str) -> InputSlotRef {
    InputSlotRef::new(node, slot)
}

/// Run the session with the two source values `a` and `b`
pub fn run(config: &EditorConfig, a: i64, b: i64) -> Result<ScenarioOutcome, ScenarioError> {
    let registry = nodes::registry();
    let mut graph = NodeGraph::new("Session");
    let mut ctx = EvaluationContext::new();
    let mut published_counts = Vec::new();

    let column = config.skin.node_width * 1.5;
    let n1 = graph.add_node_from_registry(&registry, "int", [0.0, 0.0])?;
    let n2 = graph.add_node_from_registry(&registry, "int", [0.0, 120.0])?;
    let n3 = graph.add_node_from_registry(&registry, "sum", [column, 60.0])?;
    let n4 = graph.add_node_from_registry(&registry, "viewer", [column * 2.0, 60.0])?;

    graph.set_input_default(&input(n1, "value"), Some(Value::Int(a)))?;
    graph.set_input_default(&input(n2, "value"), Some(Value::Int(b)))?;
    graph.connect(&out(n1), &input(n3, "in1"))?;
    graph.connect(&out(n2), &input(n3, "in2"))?;
    graph.connect(&out(n3), &input(n4, "in"))?;
    graph.add_group("Sources", [n1, n2]);

    let report = graph.update(&mut ctx)?;
    tracing::info!(
        "Initial pass calculated {} node(s); sum = {:?}",
        report.calculated.len(),
        ctx.value(n3)
    );
    published_counts.push(ctx.len());

    graph.set_node_enabled(n3, false, &mut ctx)?;
    graph.update(&mut ctx)?;
    tracing::info!("Sum disabled: {} value(s) published", ctx.len());
    published_counts.push(ctx.len());

    graph.set_node_enabled(n3, true, &mut ctx)?;
    graph.update(&mut ctx)?;
    tracing::info!("Sum re-enabled: {} value(s) published", ctx.len());
    published_counts.push(ctx.len());

    let mut clipboard = CopyPasteHandler::new();
    let selection: NodeCollection = [n1, n2, n3].into_iter().collect();
    clipboard.copy_from(&graph, &selection)?;
    let pasted = clipboard.paste_to(&mut graph)?;
    tracing::info!(
        "Pasted {} node(s) with {} connection(s)",
        pasted.id_map.len(),
        pasted.connection_count
    );
    graph.update(&mut ctx)?;
    published_counts.push(ctx.len());

    for event in graph.drain_events() {
        tracing::trace!("Graph event: {:?}", event);
    }

    Ok(ScenarioOutcome {
        graph,
        context: ctx,
        published_counts,
    })
}

/// Snapshot of a finished session laid out with `config`
pub fn snapshot(outcome: &ScenarioOutcome, config: &EditorConfig) -> NodeEditorInfo {
    NodeEditorInfo::build(&outcome.graph, &config.layout())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_session() {
        let config = EditorConfig::default();
        let outcome = run(&config, 2, 3).unwrap();
        assert_eq!(outcome.published_counts, vec![4, 3, 4, 7]);
        assert_eq!(outcome.graph.node_count(), 7);
        assert_eq!(outcome.graph.connection_count(), 5);

        let sums: Vec<_> = outcome
            .graph
            .nodes()
            .filter(|n| n.type_tag() == "sum")
            .map(|n| outcome.context.value(n.id()).cloned())
            .collect();
        assert_eq!(sums, vec![Some(Some(Value::Int(5))), Some(Some(Value::Int(5)))]);
    }

    #[test]
    fn test_snapshot_serializes() {
        let config = EditorConfig::default();
        let outcome = run(&config, 1, 1).unwrap();
        let info = snapshot(&outcome, &config);
        assert_eq!(info.nodes.len(), 7);
        assert_eq!(info.groups.len(), 2);
        let json = serde_json::to_string(&info).unwrap();
        assert!(json.contains("\"nodes_in_group\""));
    }
}
