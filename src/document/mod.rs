//! Pipeline config documents: loading and the document-wide lint pass.

pub mod lint;
pub mod locate;

pub use lint::lint_document;
pub use locate::Positions;

use crate::Result;

use anyhow::{Context, bail};
use serde_json::Value;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    /// Guess the format from a file extension. `None` means "try both".
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Some(Format::Json),
            Some("yaml") | Some("yml") => Some(Format::Yaml),
            _ => None,
        }
    }
}

/// A parsed document plus the text it came from.
#[derive(Debug, Clone)]
pub struct Document {
    pub source: String,
    pub value: Value,
}

impl Document {
    pub fn parse(source: String, format: Option<Format>) -> Result<Self> {
        let value = match format {
            Some(Format::Json) => serde_json::from_str(&source).context("parse JSON document")?,
            Some(Format::Yaml) => serde_yaml::from_str(&source).context("parse YAML document")?,
            None => match serde_json::from_str(&source) {
                Ok(v) => v,
                Err(json_err) => serde_yaml::from_str(&source).map_err(|yaml_err| {
                    anyhow::anyhow!(
                        "document is neither JSON ({}) nor YAML ({})",
                        json_err,
                        yaml_err
                    )
                })?,
            },
        };
        Ok(Self { source, value })
    }

    /// Read and parse a document from disk.
    pub fn load(path: &str) -> Result<Self> {
        let source =
            fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
        if source.trim().is_empty() {
            bail!("config file {} is empty", path);
        }
        Self::parse(source, Format::from_path(Path::new(path)))
            .with_context(|| format!("bad config file {}", path))
    }
}
