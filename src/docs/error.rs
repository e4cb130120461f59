use crate::docs::kind::ComponentKind;
use thiserror::Error;

/// Failures raised while resolving, sanitising or linting component configs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocsError {
    #[error("invalid config value {found}, expected object")]
    NotAnObject { found: &'static str },

    #[error("{kind} type '{name}' was not recognised")]
    UnrecognisedType { kind: ComponentKind, name: String },

    #[error("unable to infer {kind} type, multiple candidates '{first}' and '{second}'")]
    AmbiguousInference {
        kind: ComponentKind,
        first: String,
        second: String,
    },

    #[error("unable to infer {kind} type, candidates were: [{}]", .candidates.join(" "))]
    NoInferenceCandidate {
        kind: ComponentKind,
        candidates: Vec<String>,
    },

    #[error("should match the regular expression /{pattern}/ and must not start with an underscore")]
    InvalidLabel { pattern: &'static str },

    #[error("Label '{label}' collides with a previously defined label at line {previous_line}")]
    LabelCollision { label: String, previous_line: usize },
}

/// Short name of a JSON value's shape, for error messages.
pub fn value_shape(v: &serde_json::Value) -> &'static str {
    use serde_json::Value;
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
