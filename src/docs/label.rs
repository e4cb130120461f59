//! Component labels: validation and the shared `label` field.

use crate::docs::error::DocsError;
use crate::docs::field::FieldSpec;
use crate::docs::lint::{Lint, LintContext};

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

pub const LABEL_EXPRESSION: &str = r"^[a-z0-9_]+$";

static LABEL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(LABEL_EXPRESSION).expect("label expression is a valid regex"));

/// Check a label against the naming rules.
///
/// An empty label means "no label set" and is accepted.
pub fn validate_label(label: &str) -> Result<(), DocsError> {
    if label.is_empty() {
        return Ok(());
    }
    if label.starts_with('_') || !LABEL_RE.is_match(label) {
        return Err(DocsError::InvalidLabel {
            pattern: LABEL_EXPRESSION,
        });
    }
    Ok(())
}

fn points_to_resource(parent: &Map<String, Value>) -> bool {
    if parent.get("type").and_then(Value::as_str) == Some("resource") {
        return true;
    }
    matches!(parent.get("resource").and_then(Value::as_str), Some(r) if !r.is_empty())
}

/// Lint one label occurrence, registering it in the context when it is new.
pub fn lint_label(ctx: &mut LintContext, line: usize, column: usize, value: &Value) -> Vec<Lint> {
    let label = value.as_str().unwrap_or_default();
    if label.is_empty() {
        return Vec::new();
    }
    if let Err(err) = validate_label(label) {
        return vec![Lint::error(line, format!("Invalid label '{}': {}", label, err)).at_column(column)];
    }
    if let Some(&previous_line) = ctx.labels_to_line.get(label) {
        debug!(%label, line, previous_line, "label collision");
        let err = DocsError::LabelCollision {
            label: label.to_string(),
            previous_line,
        };
        return vec![Lint::error(line, err.to_string()).at_column(column)];
    }
    ctx.labels_to_line.insert(label.to_string(), line);
    Vec::new()
}

/// The `label` field reserved on label-bearing component kinds.
pub fn label_field() -> FieldSpec {
    FieldSpec::string(
        "label",
        "An optional label to use as an identifier for observability data such as metrics and logging.",
    )
    .omit_when(|_, parent| {
        points_to_resource(parent)
            .then(|| "label field should be omitted when pointing to a resource".to_string())
    })
    .at_version("3.44.0")
    .linter(lint_label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn validate_label_rules() {
        assert!(validate_label("foo_1").is_ok());
        assert!(validate_label("worker").is_ok());
        assert!(validate_label("0").is_ok());
        assert!(validate_label("").is_ok());

        for bad in ["_foo", "Foo", "foo-bar", "foo bar", "_", "foo\n"] {
            assert_eq!(
                validate_label(bad),
                Err(DocsError::InvalidLabel {
                    pattern: LABEL_EXPRESSION
                }),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn invalid_label_message_names_pattern() {
        let err = validate_label("Foo").unwrap_err();
        assert_eq!(
            err.to_string(),
            "should match the regular expression /^[a-z0-9_]+$/ and must not start with an underscore"
        );
    }

    #[test]
    fn label_omitted_when_pointing_to_resource() {
        let field = label_field();
        let by_type = json!({"type": "resource", "resource": "", "label": "a"});
        assert!(field.should_omit(&json!("a"), by_type.as_object().unwrap()).is_some());

        let by_name = json!({"resource": "shared", "label": "a"});
        assert!(field.should_omit(&json!("a"), by_name.as_object().unwrap()).is_some());

        let empty_resource = json!({"type": "stdin", "resource": "", "label": "a"});
        assert!(field.should_omit(&json!("a"), empty_resource.as_object().unwrap()).is_none());

        let plain = json!({"type": "stdin", "label": "a"});
        assert!(field.should_omit(&json!("a"), plain.as_object().unwrap()).is_none());
    }

    #[test]
    fn empty_label_is_not_linted() {
        let mut ctx = LintContext::new();
        assert!(lint_label(&mut ctx, 3, 1, &json!("")).is_empty());
        assert!(ctx.labels_to_line.is_empty());
    }

    #[test]
    fn invalid_label_lints_without_registering() {
        let mut ctx = LintContext::new();
        let lints = lint_label(&mut ctx, 4, 3, &json!("_bad"));
        assert_eq!(lints.len(), 1);
        assert_eq!(lints[0].line, 4);
        assert_eq!(lints[0].column, 3);
        assert!(lints[0].what.starts_with("Invalid label '_bad'"));
        assert!(ctx.labels_to_line.is_empty());
    }

    #[test]
    fn collision_reports_first_line() {
        let field = label_field();
        let mut ctx = LintContext::new();
        assert!(field.lint(&mut ctx, 5, 1, &json!("worker")).is_empty());

        let lints = field.lint(&mut ctx, 12, 1, &json!("worker"));
        assert_eq!(
            lints,
            vec![Lint::error(
                12,
                "Label 'worker' collides with a previously defined label at line 5"
            )]
        );

        let mut fresh = LintContext::new();
        assert!(field.lint(&mut fresh, 20, 1, &json!("worker")).is_empty());
    }
}
