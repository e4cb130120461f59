//! Registered component implementations.

use crate::docs::field::FieldSpec;
use crate::docs::kind::{ComponentKind, Status};

/// Describes one registered implementation of a component kind.
///
/// Specs handed out by a provider are immutable; a spec obtained for
/// `(name, kind)` always carries that same name and kind.
#[derive(Debug, Clone)]
pub struct ComponentSpec {
    pub name: String,
    pub kind: ComponentKind,
    pub summary: String,
    pub status: Status,
    /// True when registered from a dynamically loaded extension.
    pub plugin: bool,
    /// Root field whose children describe the component's config object.
    pub config: FieldSpec,
}

impl ComponentSpec {
    pub fn new(name: impl Into<String>, kind: ComponentKind) -> Self {
        Self {
            name: name.into(),
            kind,
            summary: String::new(),
            status: Status::Stable,
            plugin: false,
            config: FieldSpec::object("", "", Vec::new()),
        }
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    pub fn plugin(mut self) -> Self {
        self.plugin = true;
        self
    }

    /// Config is an object with the given fields.
    pub fn fields(mut self, fields: Vec<FieldSpec>) -> Self {
        self.config = FieldSpec::object("", "", fields);
        self
    }

    /// Config is a single value rather than an object (e.g. `resource: foo`).
    pub fn config(mut self, config: FieldSpec) -> Self {
        self.config = config;
        self
    }
}
