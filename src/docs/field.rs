//! Field specifications: the schema tree describing a component's config.
//!
//! A field may carry two pluggable rules:
//! - an omission predicate, consulted by the sanitiser to drop fields that
//!   are irrelevant given their parent object
//! - a linter, invoked once per occurrence during a document lint pass

use crate::docs::kind::ComponentKind;
use crate::docs::lint::{Lint, LintContext};
use crate::docs::sanitise::{SanitiseConfig, sanitise_component_config};

use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Decides whether a field should be dropped given its value and parent
/// object, returning the reason when it should.
pub type OmitFn = Arc<dyn Fn(&Value, &Map<String, Value>) -> Option<String> + Send + Sync>;

/// Produces lint findings for one occurrence of a field at (line, column).
pub type LintFn = Arc<dyn Fn(&mut LintContext, usize, usize, &Value) -> Vec<Lint> + Send + Sync>;

/// Custom keep/drop decision applied during sanitisation. Returns true to keep.
pub type FieldFilter = Arc<dyn Fn(&FieldSpec) -> bool + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Int,
    Float,
    Bool,
    Object,
    Unknown,
    Component(ComponentKind),
}

impl FieldType {
    /// The component kind when values of this field are themselves component
    /// configs.
    pub fn core_component(self) -> Option<ComponentKind> {
        match self {
            FieldType::Component(kind) => Some(kind),
            _ => None,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::String => f.write_str("string"),
            FieldType::Int => f.write_str("int"),
            FieldType::Float => f.write_str("float"),
            FieldType::Bool => f.write_str("bool"),
            FieldType::Object => f.write_str("object"),
            FieldType::Unknown => f.write_str("unknown"),
            FieldType::Component(kind) => write!(f, "{}", kind),
        }
    }
}

/// How many values of the declared type a field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldKind {
    #[default]
    Scalar,
    Array,
    Map,
}

#[derive(Clone)]
pub struct FieldSpec {
    pub name: String,
    pub description: String,
    pub field_type: FieldType,
    pub kind: FieldKind,
    pub advanced: bool,
    pub deprecated: bool,
    pub version: Option<String>,
    pub children: Vec<FieldSpec>,
    pub omit_when: Option<OmitFn>,
    pub linter: Option<LintFn>,
}

impl fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSpec")
            .field("name", &self.name)
            .field("field_type", &self.field_type)
            .field("kind", &self.kind)
            .field("advanced", &self.advanced)
            .field("deprecated", &self.deprecated)
            .field("version", &self.version)
            .field("children", &self.children)
            .field("omit_when", &self.omit_when.is_some())
            .field("linter", &self.linter.is_some())
            .finish()
    }
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, description: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            field_type,
            kind: FieldKind::Scalar,
            advanced: false,
            deprecated: false,
            version: None,
            children: Vec::new(),
            omit_when: None,
            linter: None,
        }
    }

    pub fn string(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, description, FieldType::String)
    }

    pub fn int(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, description, FieldType::Int)
    }

    pub fn bool(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, description, FieldType::Bool)
    }

    pub fn object(
        name: impl Into<String>,
        description: impl Into<String>,
        children: Vec<FieldSpec>,
    ) -> Self {
        let mut f = Self::new(name, description, FieldType::Object);
        f.children = children;
        f
    }

    pub fn component(
        name: impl Into<String>,
        description: impl Into<String>,
        kind: ComponentKind,
    ) -> Self {
        Self::new(name, description, FieldType::Component(kind))
    }

    pub fn array(mut self) -> Self {
        self.kind = FieldKind::Array;
        self
    }

    pub fn map(mut self) -> Self {
        self.kind = FieldKind::Map;
        self
    }

    pub fn advanced(mut self) -> Self {
        self.advanced = true;
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    pub fn at_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn omit_when<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value, &Map<String, Value>) -> Option<String> + Send + Sync + 'static,
    {
        self.omit_when = Some(Arc::new(f));
        self
    }

    pub fn linter<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut LintContext, usize, usize, &Value) -> Vec<Lint> + Send + Sync + 'static,
    {
        self.linter = Some(Arc::new(f));
        self
    }

    /// Evaluate the omission predicate against the field's value and parent.
    pub fn should_omit(&self, value: &Value, parent: &Map<String, Value>) -> Option<String> {
        self.omit_when.as_ref().and_then(|f| f(value, parent))
    }

    /// Run the field's linter, if any.
    pub fn lint(&self, ctx: &mut LintContext, line: usize, column: usize, value: &Value) -> Vec<Lint> {
        match &self.linter {
            Some(f) => f(ctx, line, column, value),
            None => Vec::new(),
        }
    }

    pub fn child(&self, name: &str) -> Option<&FieldSpec> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Prune a value held by this field.
    ///
    /// Core component values are sanitised as components in their own right.
    /// Fields with children prune each element (array/map) or the value itself.
    pub fn sanitise(&self, value: &mut Value, conf: &SanitiseConfig) {
        if let Some(kind) = self.field_type.core_component() {
            let sanitise_one = |v: &mut Value| {
                if let Err(err) = sanitise_component_config(kind, v, conf) {
                    debug!(field = %self.name, %kind, error = %err, "skipping nested component");
                }
            };
            match self.kind {
                FieldKind::Array => {
                    if let Value::Array(items) = value {
                        items.iter_mut().for_each(sanitise_one);
                    }
                }
                FieldKind::Map => {
                    if let Value::Object(m) = value {
                        m.values_mut().for_each(sanitise_one);
                    }
                }
                FieldKind::Scalar => sanitise_one(value),
            }
            return;
        }

        if self.children.is_empty() {
            return;
        }
        match self.kind {
            FieldKind::Array => {
                if let Value::Array(items) = value {
                    for item in items {
                        sanitise_fields(&self.children, item, conf);
                    }
                }
            }
            FieldKind::Map => {
                if let Value::Object(m) = value {
                    for v in m.values_mut() {
                        sanitise_fields(&self.children, v, conf);
                    }
                }
            }
            FieldKind::Scalar => sanitise_fields(&self.children, value, conf),
        }
    }
}

/// Prune an object against a list of field specs.
///
/// Only keys named by a spec are considered; other keys are left alone.
pub fn sanitise_fields(specs: &[FieldSpec], value: &mut Value, conf: &SanitiseConfig) {
    let Value::Object(m) = value else {
        return;
    };
    for spec in specs {
        if !conf.should_keep(spec) {
            if m.shift_remove(&spec.name).is_some() {
                trace!(field = %spec.name, "dropped by sanitise policy");
            }
            continue;
        }
        let omit = match m.get(&spec.name) {
            Some(v) => spec.should_omit(v, m),
            None => continue,
        };
        if let Some(reason) = omit {
            trace!(field = %spec.name, %reason, "omitting field");
            m.shift_remove(&spec.name);
        } else if let Some(v) = m.get_mut(&spec.name) {
            spec.sanitise(v, conf);
        }
    }
}
