//! Declared tool parameters and argument validation.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;

/// JSON type of a tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Integer,
    Number,
    Boolean,
}

impl ParamType {
    fn accepts(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64() || whole_number(value).is_some(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
        }
    }
}

/// A float with no fractional part that fits in i64, e.g. `2.0`.
///
/// Models frequently emit whole numbers as doubles in function-call arguments.
fn whole_number(value: &Value) -> Option<i64> {
    let f = value.as_f64().filter(|_| value.is_f64())?;
    let in_range = f >= i64::MIN as f64 && f < i64::MAX as f64;
    (f.fract() == 0.0 && in_range).then_some(f as i64)
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Integer => write!(f, "integer"),
            Self::Number => write!(f, "number"),
            Self::Boolean => write!(f, "boolean"),
        }
    }
}

/// One declared parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: String,
    pub kind: ParamType,
    pub description: String,
    pub required: bool,
    pub default: Option<Value>,
}

/// Ordered parameter list for a tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterSchema {
    params: Vec<ParameterSpec>,
}

impl ParameterSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a required parameter.
    pub fn required(mut self, name: &str, kind: ParamType, description: &str) -> Self {
        self.params.push(ParameterSpec {
            name: name.into(),
            kind,
            description: description.into(),
            required: true,
            default: None,
        });
        self
    }

    /// Add an optional parameter, filled with `default` when absent.
    pub fn optional(
        mut self,
        name: &str,
        kind: ParamType,
        description: &str,
        default: Option<Value>,
    ) -> Self {
        self.params.push(ParameterSpec {
            name: name.into(),
            kind,
            description: description.into(),
            required: false,
            default,
        });
        self
    }

    pub fn params(&self) -> &[ParameterSpec] {
        &self.params
    }

    /// Render as a JSON Schema object for the model.
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        for p in &self.params {
            let mut prop = json!({
                "type": p.kind.to_string(),
                "description": p.description,
            });
            if let Some(default) = &p.default {
                prop["default"] = default.clone();
            }
            properties.insert(p.name.clone(), prop);
        }
        let required: Vec<&str> = self
            .params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Check `args` against the declared parameters and fill defaults.
    ///
    /// Returns the normalized argument object, or a human-readable reason.
    pub fn validate(&self, args: &Value) -> Result<Map<String, Value>, String> {
        let mut args = match args {
            Value::Object(map) => map.clone(),
            Value::Null => Map::new(),
            other => return Err(format!("arguments must be a JSON object, got {}", other)),
        };

        if let Some(unknown) = args
            .keys()
            .find(|k| !self.params.iter().any(|p| &p.name == *k))
        {
            return Err(format!("unexpected argument '{}'", unknown));
        }

        for p in &self.params {
            let present = args.get(&p.name).is_some_and(|v| !v.is_null());
            if !present {
                if p.required {
                    return Err(format!("missing required argument '{}'", p.name));
                }
                args.remove(&p.name);
                if let Some(default) = &p.default {
                    args.insert(p.name.clone(), default.clone());
                }
                continue;
            }
            if let Some(value) = args.get(&p.name).filter(|v| !p.kind.accepts(v)) {
                return Err(format!(
                    "argument '{}' must be {}, got {}",
                    p.name, p.kind, value
                ));
            }
            if p.kind == ParamType::Integer {
                if let Some(n) = args.get(&p.name).and_then(whole_number) {
                    args.insert(p.name.clone(), Value::from(n));
                }
            }
        }

        Ok(args)
    }
}
