//! Type inference: which registered implementation does a config block denote?

use crate::docs::component::ComponentSpec;
use crate::docs::error::{DocsError, value_shape};
use crate::docs::field::{FieldSpec, FieldType};
use crate::docs::kind::ComponentKind;
use crate::docs::label::label_field;
use crate::docs::registry::Provider;

use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Fields present on every instance of a kind regardless of its type.
pub fn reserved_fields_by_kind(kind: ComponentKind) -> BTreeMap<&'static str, FieldSpec> {
    let mut m = BTreeMap::new();
    m.insert("type", FieldSpec::string("type", ""));
    m.insert("plugin", FieldSpec::new("plugin", "", FieldType::Object));
    if kind.has_processors() {
        let processors = FieldSpec::component("processors", "", ComponentKind::Processor)
            .array()
            .omit_when(|v, _| match v {
                Value::Array(items) if items.is_empty() => {
                    Some("field processors is empty and can be removed".to_string())
                }
                _ => None,
            });
        m.insert("processors", processors);
    }
    if kind.has_label() {
        m.insert("label", label_field());
    }
    m
}

/// Resolve the type of a raw component config.
///
/// An explicit string `type` field is looked up directly. Otherwise the
/// non-reserved keys are matched against registered names of `kind`, falling
/// back to `default_type` only when there are no non-reserved keys at all.
pub fn get_inference_candidate(
    provider: &dyn Provider,
    kind: ComponentKind,
    default_type: &str,
    raw: &Value,
) -> Result<(String, Arc<ComponentSpec>), DocsError> {
    provider.refresh_plugins();

    let Value::Object(m) = raw else {
        return Err(DocsError::NotAnObject {
            found: value_shape(raw),
        });
    };

    if let Some(name) = m.get("type").and_then(Value::as_str) {
        return match provider.get_docs(name, kind) {
            Some(spec) => Ok((name.to_string(), spec)),
            None => Err(DocsError::UnrecognisedType {
                kind,
                name: name.to_string(),
            }),
        };
    }

    get_inference_candidate_from_keys(provider, kind, default_type, m.keys().map(String::as_str))
}

/// Shape-based inference over a list of keys.
///
/// When several keys name registered types only the first collision is
/// reported, with the pair in sorted order.
pub fn get_inference_candidate_from_keys<'a>(
    provider: &dyn Provider,
    kind: ComponentKind,
    default_type: &str,
    keys: impl IntoIterator<Item = &'a str>,
) -> Result<(String, Arc<ComponentSpec>), DocsError> {
    let reserved = reserved_fields_by_kind(kind);

    let mut candidates: Vec<String> = Vec::new();
    let mut inferred: Option<(String, Arc<ComponentSpec>)> = None;
    for key in keys {
        if reserved.contains_key(key) {
            continue;
        }
        candidates.push(key.to_string());
        let Some(spec) = provider.get_docs(key, kind) else {
            continue;
        };
        if let Some((previous, _)) = &inferred {
            let mut pair = [previous.clone(), key.to_string()];
            pair.sort();
            let [first, second] = pair;
            return Err(DocsError::AmbiguousInference {
                kind,
                first,
                second,
            });
        }
        inferred = Some((key.to_string(), spec));
    }

    if candidates.is_empty() && !default_type.is_empty() {
        if let Some(spec) = provider.get_docs(default_type, kind) {
            debug!(%kind, default_type, "empty config, using default type");
            return Ok((default_type.to_string(), spec));
        }
    }

    match inferred {
        Some(found) => {
            debug!(%kind, name = %found.0, "inferred type from config shape");
            Ok(found)
        }
        None => {
            candidates.sort();
            Err(DocsError::NoInferenceCandidate { kind, candidates })
        }
    }
}
