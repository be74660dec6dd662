// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node types available to the command-line driver.

use nodeflow_engine::{
    CalculationError, EnableDisableFeature, EvaluationContext, InputSlot, NodeBehavior,
    NodeBuilder, NodeRegistry, NodeValue, OutputSlot, SlotId, SlotValues, Value,
};

/// Integer source; its value is the default of the `value` input
#[derive(Debug, Clone)]
pub struct IntNode;

impl NodeBehavior for IntNode {
    fn type_tag(&self) -> &'static str {
        "int"
    }

    fn initialize(&self, builder: &mut NodeBuilder) {
        builder
            .input(InputSlot::new("value", "Value", Some(Value::Int(0))))
            .output(OutputSlot::new("out", "Value"));
    }

    fn calculate(&self, inputs: &SlotValues, _ctx: &mut EvaluationContext) -> Result<NodeValue, CalculationError> {
        Ok(Some(Value::Int(inputs.int(&SlotId::from("value"))?)))
    }

    fn clone_box(&self) -> Box<dyn NodeBehavior> {
        Box::new(self.clone())
    }
}

/// Sum of two integers, with enable/disable
#[derive(Debug, Clone)]
pub struct SumNode;

impl NodeBehavior for SumNode {
    fn type_tag(&self) -> &'static str {
        "sum"
    }

    fn initialize(&self, builder: &mut NodeBuilder) {
        builder
            .input(InputSlot::new("in1", "First Input", Some(Value::Int(1))))
            .input(InputSlot::new("in2", "Second Input", Some(Value::Int(1))))
            .output(OutputSlot::new("out", "Sum"))
            .feature(EnableDisableFeature::new());
    }

    fn calculate(&self, inputs: &SlotValues, _ctx: &mut EvaluationContext) -> Result<NodeValue, CalculationError> {
        let a = inputs.int(&SlotId::from("in1"))?;
        let b = inputs.int(&SlotId::from("in2"))?;
        a.checked_add(b)
            .map(|sum| Some(Value::Int(sum)))
            .ok_or_else(|| CalculationError::Failed(format!("{a} + {b} overflows")))
    }

    fn clone_box(&self) -> Box<dyn NodeBehavior> {
        Box::new(self.clone())
    }
}

/// Passes its input through so it shows up as a published value
#[derive(Debug, Clone)]
pub struct ViewerNode;

impl NodeBehavior for ViewerNode {
    fn type_tag(&self) -> &'static str {
        "viewer"
    }

    fn initialize(&self, builder: &mut NodeBuilder) {
        builder
            .input(InputSlot::new("in", "Input", None))
            .output(OutputSlot::new("out", "Output"));
    }

    fn calculate(&self, inputs: &SlotValues, _ctx: &mut EvaluationContext) -> Result<NodeValue, CalculationError> {
        Ok(inputs.get(&SlotId::from("in")).cloned())
    }

    fn clone_box(&self) -> Box<dyn NodeBehavior> {
        Box::new(self.clone())
    }
}

/// Registry with every node type above
pub fn registry() -> NodeRegistry {
    let mut registry = NodeRegistry::new();
    registry.register(|| Box::new(IntNode));
    registry.register(|| Box::new(SumNode));
    registry.register(|| Box::new(ViewerNode));
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_contents() {
        let registry = registry();
        assert_eq!(registry.type_tags().collect::<Vec<_>>(), vec!["int", "sum", "viewer"]);
        assert_eq!(registry.create("sum").unwrap().type_tag(), "sum");
    }

    #[test]
    fn test_sum_overflow_fails() {
        let inputs = SlotValues::from_values([
            (SlotId::from("in1"), Some(Value::Int(i64::MAX))),
            (SlotId::from("in2"), Some(Value::Int(1))),
        ]);
        let mut ctx = EvaluationContext::new();
        assert!(matches!(
            SumNode.calculate(&inputs, &mut ctx),
            Err(CalculationError::Failed(_))
        ));
    }
}
