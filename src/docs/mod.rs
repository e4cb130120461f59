//! Component schema layer.
//!
//! It owns:
//! - component kinds, field specs and component specs
//! - the registry/provider seam
//! - type inference, config sanitisation and label linting

pub mod component;
pub mod error;
pub mod field;
pub mod infer;
pub mod kind;
pub mod label;
pub mod lint;
pub mod registry;
pub mod sanitise;

pub use component::ComponentSpec;
pub use error::DocsError;
pub use field::{FieldFilter, FieldKind, FieldSpec, FieldType};
pub use infer::{get_inference_candidate, reserved_fields_by_kind};
pub use kind::{ComponentKind, Status};
pub use label::{LABEL_EXPRESSION, label_field, validate_label};
pub use lint::{Lint, LintContext, LintLevel};
pub use registry::{Provider, Registry};
pub use sanitise::{SanitiseConfig, sanitise_component_config};
