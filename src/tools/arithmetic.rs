//! Integer arithmetic tools: `add`, `subtract`, `multiply`.

use crate::tools::schema::{ParamType, ParameterSchema};
use crate::tools::traits::Tool;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};

fn operands() -> ParameterSchema {
    ParameterSchema::new()
        .required("a", ParamType::Integer, "First operand")
        .required("b", ParamType::Integer, "Second operand")
}

fn int_arg(args: &Map<String, Value>, key: &str) -> Result<i64> {
    args.get(key)
        .and_then(Value::as_i64)
        .ok_or_else(|| anyhow!("Missing or out-of-range '{}' argument", key))
}

fn binary_op(
    args: &Map<String, Value>,
    op: fn(i64, i64) -> Option<i64>,
    verb: &str,
) -> Result<Value> {
    let a = int_arg(args, "a")?;
    let b = int_arg(args, "b")?;
    op(a, b)
        .map(Value::from)
        .ok_or_else(|| anyhow!("Integer overflow trying to {} {} and {}", verb, a, b))
}

/// `a * b`
pub struct Multiply;

#[async_trait]
impl Tool for Multiply {
    fn name(&self) -> &str {
        "multiply"
    }

    fn description(&self) -> &str {
        "Multiply a and b."
    }

    fn parameters(&self) -> ParameterSchema {
        operands()
    }

    async fn execute(&self, args: Map<String, Value>) -> Result<Value> {
        binary_op(&args, i64::checked_mul, "multiply")
    }
}

/// `a + b`
pub struct Add;

#[async_trait]
impl Tool for Add {
    fn name(&self) -> &str {
        "add"
    }

    fn description(&self) -> &str {
        "Add a and b."
    }

    fn parameters(&self) -> ParameterSchema {
        operands()
    }

    async fn execute(&self, args: Map<String, Value>) -> Result<Value> {
        binary_op(&args, i64::checked_add, "add")
    }
}

/// `a - b`
pub struct Subtract;

#[async_trait]
impl Tool for Subtract {
    fn name(&self) -> &str {
        "subtract"
    }

    fn description(&self) -> &str {
        "Subtract b from a."
    }

    fn parameters(&self) -> ParameterSchema {
        operands()
    }

    async fn execute(&self, args: Map<String, Value>) -> Result<Value> {
        binary_op(&args, i64::checked_sub, "subtract")
    }
}
