// SPDX-License-Identifier: MIT OR Apache-2.0
//! Small node behaviors shared by the unit tests.

use crate::evaluation::{CalculationError, EvaluationContext, SlotValues};
use crate::feature::EnableDisableFeature;
use crate::node::{NodeBehavior, NodeBuilder, NodeId};
use crate::slot::{InputSlot, OutputSlot, SlotId};
use crate::value::{NodeValue, Value};

/// Records calculation order when installed as context data
#[derive(Debug, Default)]
pub struct CalculationLog {
    pub order: Vec<NodeId>,
}

fn record(ctx: &mut EvaluationContext) {
    let current = ctx.current_node();
    if let (Some(log), Some(node_id)) = (ctx.data_mut::<CalculationLog>(), current) {
        log.order.push(node_id);
    }
}

#[derive(Debug, Clone)]
pub struct Constant(pub i64);

impl NodeBehavior for Constant {
    fn type_tag(&self) -> &'static str {
        "constant"
    }

    fn initialize(&self, builder: &mut NodeBuilder) {
        builder.output(OutputSlot::new("out", "Value"));
    }

    fn calculate(&self, _inputs: &SlotValues, ctx: &mut EvaluationContext) -> Result<NodeValue, CalculationError> {
        record(ctx);
        Ok(Some(Value::Int(self.0)))
    }

    fn clone_box(&self) -> Box<dyn NodeBehavior> {
        Box::new(self.clone())
    }
}

/// Adds two integer inputs; unavailable if either input is not an integer
#[derive(Debug, Clone)]
pub struct Adder;

impl NodeBehavior for Adder {
    fn type_tag(&self) -> &'static str {
        "adder"
    }

    fn initialize(&self, builder: &mut NodeBuilder) {
        builder
            .input(InputSlot::new("a", "First Input", Some(Value::Int(1))))
            .input(InputSlot::new("b", "Second Input", Some(Value::Int(1))))
            .output(OutputSlot::new("out", "Sum"))
            .feature(EnableDisableFeature::new());
    }

    fn calculate(&self, inputs: &SlotValues, ctx: &mut EvaluationContext) -> Result<NodeValue, CalculationError> {
        record(ctx);
        let a = inputs.get(&SlotId::from("a")).and_then(Value::as_int);
        let b = inputs.get(&SlotId::from("b")).and_then(Value::as_int);
        match (a, b) {
            (Some(a), Some(b)) => Ok(Some(Value::Int(a + b))),
            _ => Ok(None),
        }
    }

    fn clone_box(&self) -> Box<dyn NodeBehavior> {
        Box::new(self.clone())
    }
}

/// Passes through the aggregated values of a multi-connection input
#[derive(Debug, Clone)]
pub struct Collector;

impl NodeBehavior for Collector {
    fn type_tag(&self) -> &'static str {
        "collector"
    }

    fn initialize(&self, builder: &mut NodeBuilder) {
        builder
            .input(InputSlot::multiple("values", "Values", None))
            .output(OutputSlot::new("out", "List"));
    }

    fn calculate(&self, inputs: &SlotValues, ctx: &mut EvaluationContext) -> Result<NodeValue, CalculationError> {
        record(ctx);
        Ok(inputs.get(&SlotId::from("values")).cloned())
    }

    fn clone_box(&self) -> Box<dyn NodeBehavior> {
        Box::new(self.clone())
    }
}

#[derive(Debug, Clone)]
pub struct Failing;

impl NodeBehavior for Failing {
    fn type_tag(&self) -> &'static str {
        "failing"
    }

    fn initialize(&self, builder: &mut NodeBuilder) {
        builder.output(OutputSlot::new("out", "Nothing"));
    }

    fn calculate(&self, _inputs: &SlotValues, _ctx: &mut EvaluationContext) -> Result<NodeValue, CalculationError> {
        Err(CalculationError::Failed("boom".to_string()))
    }

    fn clone_box(&self) -> Box<dyn NodeBehavior> {
        Box::new(self.clone())
    }
}

pub fn constant(value: i64) -> Box<dyn NodeBehavior> {
    Box::new(Constant(value))
}

pub fn adder() -> Box<dyn NodeBehavior> {
    Box::new(Adder)
}

pub fn collector() -> Box<dyn NodeBehavior> {
    Box::new(Collector)
}

pub fn failing() -> Box<dyn NodeBehavior> {
    Box::new(Failing)
}
