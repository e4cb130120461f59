//! Config sanitisation: reduce a component config to the fields that matter
//! for its resolved type.

use crate::docs::component::ComponentSpec;
use crate::docs::error::{DocsError, value_shape};
use crate::docs::field::{FieldFilter, FieldSpec};
use crate::docs::infer::{get_inference_candidate, reserved_fields_by_kind};
use crate::docs::kind::ComponentKind;
use crate::docs::registry::{self, Provider};

use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Which classes of fields survive sanitisation. Threaded unchanged through
/// every nested sanitise call.
#[derive(Clone, Default)]
pub struct SanitiseConfig {
    /// Drop the `type` discriminator from each sanitised component.
    pub remove_type_field: bool,
    /// Drop fields marked deprecated.
    pub remove_deprecated: bool,
    /// Tailor output for documentation examples by dropping advanced fields.
    pub for_example: bool,
    pub filter: Option<FieldFilter>,
    /// Overrides the global registry when set.
    pub docs_provider: Option<Arc<dyn Provider>>,
}

impl fmt::Debug for SanitiseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SanitiseConfig")
            .field("remove_type_field", &self.remove_type_field)
            .field("remove_deprecated", &self.remove_deprecated)
            .field("for_example", &self.for_example)
            .field("filter", &self.filter.is_some())
            .field("docs_provider", &self.docs_provider.is_some())
            .finish()
    }
}

impl SanitiseConfig {
    pub fn provider(&self) -> &dyn Provider {
        match &self.docs_provider {
            Some(p) => p.as_ref(),
            None => registry::global(),
        }
    }

    /// Look up a component via the configured provider, or the global one.
    pub fn get_docs(&self, name: &str, kind: ComponentKind) -> Option<Arc<ComponentSpec>> {
        self.provider().get_docs(name, kind)
    }

    pub fn should_keep(&self, spec: &FieldSpec) -> bool {
        if self.remove_deprecated && spec.deprecated {
            return false;
        }
        if self.for_example && spec.advanced {
            return false;
        }
        self.filter.as_ref().is_none_or(|f| f(spec))
    }
}

/// Reduce a raw component config, in place, to the fields relevant to its
/// inferred type.
///
/// Nothing is modified when the type cannot be resolved.
pub fn sanitise_component_config(
    kind: ComponentKind,
    raw: &mut Value,
    conf: &SanitiseConfig,
) -> Result<(), DocsError> {
    if kind == ComponentKind::Condition {
        return sanitise_condition_config(raw);
    }

    let (name, spec) = get_inference_candidate(conf.provider(), kind, "", raw)?;
    let Value::Object(m) = raw else {
        return Err(DocsError::NotAnObject {
            found: value_shape(raw),
        });
    };

    if let Some(component_conf) = m.get_mut(&name) {
        spec.config.sanitise(component_conf, conf);
    }

    let reserved = reserved_fields_by_kind(kind);
    let parent = &*m;
    let doomed: Vec<String> = parent
        .iter()
        .filter(|(k, _)| **k != name)
        .filter(|(k, v)| match reserved.get(k.as_str()) {
            None => true,
            Some(field) => field.should_omit(v, parent).is_some(),
        })
        .map(|(k, _)| k.clone())
        .collect();
    for k in doomed {
        trace!(%kind, component = %name, field = %k, "removing field");
        m.shift_remove(&k);
    }

    for (field_name, field) in &reserved {
        if let Some(v) = m.get_mut(*field_name) {
            field.sanitise(v, conf);
        }
    }

    if conf.remove_type_field {
        m.shift_remove("type");
    }
    Ok(())
}

/// Deprecated: conditions predate the reserved-field model and only keep the
/// field named by their `type`, plus `type` and `plugin`. A condition without
/// a `type` field is left unchanged.
fn sanitise_condition_config(raw: &mut Value) -> Result<(), DocsError> {
    let Value::Object(m) = raw else {
        return Err(DocsError::NotAnObject {
            found: value_shape(raw),
        });
    };
    let Some(type_value) = m.get("type").cloned() else {
        return Ok(());
    };
    m.retain(|k, _| type_value.as_str() == Some(k.as_str()) || k == "type" || k == "plugin");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docs::field::FieldSpec;
    use crate::docs::registry::Registry;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn provider() -> Arc<Registry> {
        let r = Registry::new();
        let drop_zero = |v: &Value, _: &serde_json::Map<String, Value>| {
            (v.as_i64() == Some(0)).then(|| "zero".to_string())
        };
        r.register(
            ComponentSpec::new("foo", ComponentKind::Input).fields(vec![
                FieldSpec::int("a", ""),
                FieldSpec::int("b", "").omit_when(drop_zero),
                FieldSpec::string("old", "").deprecated(),
            ]),
        );
        r.register(ComponentSpec::new("bar", ComponentKind::Input));
        r.register(
            ComponentSpec::new("resource", ComponentKind::Input)
                .config(FieldSpec::string("", "")),
        );
        r.register(
            ComponentSpec::new("thing", ComponentKind::Processor)
                .fields(vec![FieldSpec::int("x", "").omit_when(drop_zero)]),
        );
        Arc::new(r)
    }

    fn conf() -> SanitiseConfig {
        SanitiseConfig {
            docs_provider: Some(provider()),
            ..SanitiseConfig::default()
        }
    }

    #[test]
    fn removes_unrelated_fields() {
        let mut v = json!({"type": "foo", "foo": {"a": 1, "b": 2}, "unused": "x"});
        sanitise_component_config(ComponentKind::Input, &mut v, &conf()).unwrap();
        assert_eq!(v, json!({"type": "foo", "foo": {"a": 1, "b": 2}}));
    }

    #[test]
    fn prunes_component_config_by_field_rules() {
        let mut v = json!({"foo": {"a": 1, "b": 0}, "bar_like": {}, "label": "in"});
        sanitise_component_config(ComponentKind::Input, &mut v, &conf()).unwrap();
        assert_eq!(v, json!({"foo": {"a": 1}, "label": "in"}));
    }

    #[test]
    fn drops_other_component_configs() {
        let mut v = json!({"type": "foo", "foo": {}, "bar": {"x": 1}});
        sanitise_component_config(ComponentKind::Input, &mut v, &conf()).unwrap();
        assert_eq!(v, json!({"type": "foo", "foo": {}}));
    }

    #[test]
    fn empty_processors_are_omitted_and_nested_ones_sanitised() {
        let mut v = json!({"type": "foo", "processors": []});
        sanitise_component_config(ComponentKind::Input, &mut v, &conf()).unwrap();
        assert_eq!(v, json!({"type": "foo"}));

        let mut v = json!({
            "type": "foo",
            "processors": [{"thing": {"x": 0}, "junk": true}],
        });
        sanitise_component_config(ComponentKind::Input, &mut v, &conf()).unwrap();
        assert_eq!(v, json!({"type": "foo", "processors": [{"thing": {}}]}));
    }

    #[test]
    fn label_dropped_for_resource_references() {
        let mut v = json!({"type": "resource", "resource": "shared", "label": "nope"});
        sanitise_component_config(ComponentKind::Input, &mut v, &conf()).unwrap();
        assert_eq!(v, json!({"type": "resource", "resource": "shared"}));

        let mut v = json!({"resource": "shared", "label": "nope"});
        sanitise_component_config(ComponentKind::Input, &mut v, &conf()).unwrap();
        assert_eq!(v, json!({"resource": "shared"}));
    }

    #[test]
    fn policy_options_apply() {
        let conf = SanitiseConfig {
            remove_type_field: true,
            remove_deprecated: true,
            ..conf()
        };
        let mut v = json!({"type": "foo", "foo": {"a": 1, "old": "x"}});
        sanitise_component_config(ComponentKind::Input, &mut v, &conf).unwrap();
        assert_eq!(v, json!({"foo": {"a": 1}}));
    }

    #[test]
    fn removing_type_field_can_drop_the_only_discriminator() {
        let conf = SanitiseConfig {
            remove_type_field: true,
            ..conf()
        };
        let mut v = json!({"type": "bar", "junk": 1});
        sanitise_component_config(ComponentKind::Input, &mut v, &conf).unwrap();
        assert_eq!(v, json!({}));

        let err = sanitise_component_config(ComponentKind::Input, &mut v, &conf).unwrap_err();
        assert_eq!(
            err,
            DocsError::NoInferenceCandidate {
                kind: ComponentKind::Input,
                candidates: Vec::new(),
            }
        );
        assert_eq!(v, json!({}));
    }

    #[test]
    fn failed_inference_leaves_config_untouched() {
        let original = json!({"foo": {}, "bar": {}, "junk": 1});
        let mut v = original.clone();
        let err = sanitise_component_config(ComponentKind::Input, &mut v, &conf()).unwrap_err();
        assert!(matches!(err, DocsError::AmbiguousInference { .. }));
        assert_eq!(v, original);
    }

    #[test]
    fn sanitising_twice_is_idempotent() {
        let mut once = json!({
            "label": "a",
            "foo": {"a": 1, "b": 0},
            "processors": [{"type": "thing", "thing": {"x": 3}, "junk": 1}],
            "junk": "x",
        });
        sanitise_component_config(ComponentKind::Input, &mut once, &conf()).unwrap();
        let mut twice = once.clone();
        sanitise_component_config(ComponentKind::Input, &mut twice, &conf()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn legacy_condition_keeps_typed_field_only() {
        let mut v = json!({"type": "static", "static": true, "bloblang": "x", "plugin": {}});
        sanitise_component_config(ComponentKind::Condition, &mut v, &conf()).unwrap();
        assert_eq!(v, json!({"type": "static", "static": true, "plugin": {}}));

        let original = json!({"static": true, "bloblang": "x"});
        let mut v = original.clone();
        sanitise_component_config(ComponentKind::Condition, &mut v, &conf()).unwrap();
        assert_eq!(v, original);
    }

    #[test]
    fn global_registry_used_without_override() {
        let mut v = json!({"type": "stdin", "stdin": {}, "unused": 1});
        sanitise_component_config(ComponentKind::Input, &mut v, &SanitiseConfig::default())
            .unwrap();
        assert_eq!(v, json!({"type": "stdin", "stdin": {}}));
    }

    #[test]
    fn get_docs_prefers_override() {
        let overridden = conf();
        assert!(overridden.get_docs("foo", ComponentKind::Input).is_some());
        assert!(overridden.get_docs("stdin", ComponentKind::Input).is_none());

        let global = SanitiseConfig::default();
        assert!(global.get_docs("stdin", ComponentKind::Input).is_some());
    }

    #[test]
    fn globally_registered_components_are_sanitised() {
        registry::register_docs(
            ComponentSpec::new("sanitise_test_sink", ComponentKind::Output)
                .fields(vec![FieldSpec::string("path", "")]),
        );
        registry::global().register_plugin_name("sanitise_test_plugin", ComponentKind::Output);

        let mut v = json!({"sanitise_test_sink": {"path": "a", "other": 1}, "junk": 1});
        sanitise_component_config(ComponentKind::Output, &mut v, &SanitiseConfig::default())
            .unwrap();
        assert_eq!(v, json!({"sanitise_test_sink": {"path": "a", "other": 1}}));

        let mut v = json!({"type": "sanitise_test_plugin", "sanitise_test_plugin": {}, "x": 1});
        sanitise_component_config(ComponentKind::Output, &mut v, &SanitiseConfig::default())
            .unwrap();
        assert_eq!(v, json!({"type": "sanitise_test_plugin", "sanitise_test_plugin": {}}));
    }
}
