//! Document-wide lint pass over a pipeline config.
//!
//! One [`LintContext`] is created per call, so label collisions are detected
//! across the whole document and never leak between documents.

use crate::document::locate::{Positions, child_pointer};
use crate::docs::{
    ComponentKind, FieldKind, FieldSpec, Lint, LintContext, Provider, get_inference_candidate,
    reserved_fields_by_kind,
};

use serde_json::{Map, Value};
use tracing::debug;

/// Top-level sections of a pipeline document holding a single component.
const COMPONENT_SECTIONS: [(&str, ComponentKind); 5] = [
    ("input", ComponentKind::Input),
    ("buffer", ComponentKind::Buffer),
    ("output", ComponentKind::Output),
    ("metrics", ComponentKind::Metrics),
    ("tracer", ComponentKind::Tracer),
];

/// Top-level sections holding a list of labelled resources.
const RESOURCE_SECTIONS: [(&str, ComponentKind); 5] = [
    ("input_resources", ComponentKind::Input),
    ("processor_resources", ComponentKind::Processor),
    ("output_resources", ComponentKind::Output),
    ("cache_resources", ComponentKind::Cache),
    ("rate_limit_resources", ComponentKind::RateLimit),
];

fn section_kind(table: &[(&str, ComponentKind)], key: &str) -> Option<ComponentKind> {
    table
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, kind)| *kind)
}

/// Type used for an otherwise empty component of a kind.
fn default_type(kind: ComponentKind) -> &'static str {
    match kind {
        ComponentKind::Buffer | ComponentKind::Metrics | ComponentKind::Tracer => "none",
        _ => "",
    }
}

/// Lint a whole pipeline document. Findings are ordered by position.
pub fn lint_document(source: &str, value: &Value, provider: &dyn Provider) -> Vec<Lint> {
    let positions = Positions::scan(source, value);
    let mut linter = DocumentLinter {
        provider,
        positions: &positions,
        ctx: LintContext::new(),
        lints: Vec::new(),
    };
    linter.lint_root(value);
    let mut lints = linter.lints;
    lints.sort_by_key(|l| (l.line, l.column));
    lints
}

struct DocumentLinter<'a> {
    provider: &'a dyn Provider,
    positions: &'a Positions,
    ctx: LintContext,
    lints: Vec<Lint>,
}

impl DocumentLinter<'_> {
    fn error(&mut self, pointer: &str, what: String) {
        let (line, column) = self.positions.nearest(pointer);
        debug!(line, %what, "lint error");
        self.lints.push(Lint::error(line, what).at_column(column));
    }

    fn warning(&mut self, pointer: &str, what: String) {
        let (line, column) = self.positions.nearest(pointer);
        self.lints.push(Lint::warning(line, what).at_column(column));
    }

    fn lint_root(&mut self, value: &Value) {
        let Value::Object(root) = value else {
            self.error("", "expected the document root to be an object".to_string());
            return;
        };
        for (k, v) in root {
            let pointer = child_pointer("", k);
            if let Some(kind) = section_kind(&COMPONENT_SECTIONS, k) {
                self.lint_component(kind, &pointer, v);
            } else if let Some(kind) = section_kind(&RESOURCE_SECTIONS, k) {
                self.lint_component_list(kind, &pointer, v);
            } else if k == "pipeline" {
                self.lint_pipeline(&pointer, v);
            } else {
                self.warning(&pointer, format!("field {} is not recognised", k));
            }
        }
    }

    fn lint_pipeline(&mut self, pointer: &str, value: &Value) {
        let Value::Object(m) = value else {
            self.error(pointer, "expected pipeline to be an object".to_string());
            return;
        };
        for (k, v) in m {
            let child = child_pointer(pointer, k);
            match k.as_str() {
                "processors" => self.lint_component_list(ComponentKind::Processor, &child, v),
                "threads" => {
                    if !v.is_i64() {
                        self.error(&child, "expected threads to be an integer".to_string());
                    }
                }
                _ => self.warning(&child, format!("field {} is not recognised", k)),
            }
        }
    }

    fn lint_component_list(&mut self, kind: ComponentKind, pointer: &str, value: &Value) {
        let Value::Array(items) = value else {
            self.error(pointer, format!("expected a list of {} configs", kind));
            return;
        };
        for (i, item) in items.iter().enumerate() {
            self.lint_component(kind, &child_pointer(pointer, &i.to_string()), item);
        }
    }

    fn lint_component(&mut self, kind: ComponentKind, pointer: &str, value: &Value) {
        let (name, spec) =
            match get_inference_candidate(self.provider, kind, default_type(kind), value) {
                Ok(found) => found,
                Err(err) => {
                    self.error(pointer, err.to_string());
                    return;
                }
            };
        let Value::Object(m) = value else {
            return;
        };

        let reserved = reserved_fields_by_kind(kind);
        for (k, v) in m {
            let child = child_pointer(pointer, k);
            if *k == name {
                self.lint_field(&spec.config, &child, v);
            } else if let Some(field) = reserved.get(k.as_str()) {
                if let Some(reason) = field.should_omit(v, m) {
                    self.warning(&child, reason);
                }
                self.lint_field(field, &child, v);
            } else {
                self.warning(
                    &child,
                    format!(
                        "field {} is invalid when the component type is {} ({})",
                        k, name, kind
                    ),
                );
            }
        }
    }

    fn lint_field(&mut self, field: &FieldSpec, pointer: &str, value: &Value) {
        if field.linter.is_some() {
            let (line, column) = self.positions.nearest(pointer);
            let found = field.lint(&mut self.ctx, line, column, value);
            self.lints.extend(found);
        }

        if let Some(kind) = field.field_type.core_component() {
            match (field.kind, value) {
                (FieldKind::Array, Value::Array(items)) => {
                    for (i, item) in items.iter().enumerate() {
                        self.lint_component(kind, &child_pointer(pointer, &i.to_string()), item);
                    }
                }
                (FieldKind::Map, Value::Object(m)) => {
                    for (k, v) in m {
                        self.lint_component(kind, &child_pointer(pointer, k), v);
                    }
                }
                (FieldKind::Scalar, _) => self.lint_component(kind, pointer, value),
                _ => self.error(pointer, format!("unexpected value for field {}", field.name)),
            }
            return;
        }

        if field.children.is_empty() {
            return;
        }
        match (field.kind, value) {
            (FieldKind::Array, Value::Array(items)) => {
                for (i, item) in items.iter().enumerate() {
                    self.lint_children(field, &child_pointer(pointer, &i.to_string()), item);
                }
            }
            (FieldKind::Map, Value::Object(m)) => {
                for (k, v) in m {
                    self.lint_children(field, &child_pointer(pointer, k), v);
                }
            }
            (FieldKind::Scalar, _) => self.lint_children(field, pointer, value),
            _ => self.error(pointer, format!("unexpected value for field {}", field.name)),
        }
    }

    fn lint_children(&mut self, field: &FieldSpec, pointer: &str, value: &Value) {
        let Value::Object(m) = value else {
            self.error(pointer, "expected object value".to_string());
            return;
        };
        self.lint_object(field, pointer, m);
    }

    fn lint_object(&mut self, field: &FieldSpec, pointer: &str, m: &Map<String, Value>) {
        for (k, v) in m {
            let child = child_pointer(pointer, k);
            match field.child(k) {
                Some(spec) => self.lint_field(spec, &child, v),
                None => self.warning(&child, format!("field {} not recognised", k)),
            }
        }
    }
}
