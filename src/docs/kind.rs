//! Component kinds and lifecycle status.

use anyhow::bail;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The category a component implementation belongs to.
///
/// Kinds scope which names are valid inference candidates and which fields
/// are reserved on every instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Input,
    Buffer,
    Cache,
    Condition,
    Metrics,
    Output,
    Processor,
    RateLimit,
    Tracer,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 9] = [
        ComponentKind::Input,
        ComponentKind::Buffer,
        ComponentKind::Cache,
        ComponentKind::Condition,
        ComponentKind::Metrics,
        ComponentKind::Output,
        ComponentKind::Processor,
        ComponentKind::RateLimit,
        ComponentKind::Tracer,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ComponentKind::Input => "input",
            ComponentKind::Buffer => "buffer",
            ComponentKind::Cache => "cache",
            ComponentKind::Condition => "condition",
            ComponentKind::Metrics => "metrics",
            ComponentKind::Output => "output",
            ComponentKind::Processor => "processor",
            ComponentKind::RateLimit => "rate_limit",
            ComponentKind::Tracer => "tracer",
        }
    }

    /// Kinds whose instances may carry a `label`.
    pub fn has_label(self) -> bool {
        matches!(
            self,
            ComponentKind::Input
                | ComponentKind::Processor
                | ComponentKind::Output
                | ComponentKind::Cache
                | ComponentKind::RateLimit
        )
    }

    /// Kinds whose instances may carry a `processors` list.
    pub fn has_processors(self) -> bool {
        matches!(self, ComponentKind::Input | ComponentKind::Output)
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ComponentKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        for kind in ComponentKind::ALL {
            if kind.as_str() == s {
                return Ok(kind);
            }
        }
        bail!("unknown component kind: {}", s);
    }
}

/// Lifecycle status of a component implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Stable,
    Beta,
    Experimental,
    Deprecated,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Stable => "stable",
            Status::Beta => "beta",
            Status::Experimental => "experimental",
            Status::Deprecated => "deprecated",
        };
        f.pad(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn kind_names_round_trip_through_from_str() {
        for kind in ComponentKind::ALL {
            assert_eq!(kind.to_string().parse::<ComponentKind>().unwrap(), kind);
        }
        assert!("rate-limit".parse::<ComponentKind>().is_err());
    }

    #[test]
    fn label_and_processor_bearing_kinds() {
        let labelled: Vec<_> = ComponentKind::ALL
            .into_iter()
            .filter(|k| k.has_label())
            .collect();
        assert_eq!(
            labelled,
            vec![
                ComponentKind::Input,
                ComponentKind::Cache,
                ComponentKind::Output,
                ComponentKind::Processor,
                ComponentKind::RateLimit,
            ]
        );
        assert!(ComponentKind::Output.has_processors());
        assert!(!ComponentKind::Processor.has_processors());
    }
}
