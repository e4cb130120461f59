//! Type inference, sanitisation and label linting for pipeline component
//! configs.

pub mod catalog;
pub mod docs;
pub mod document;

pub type Result<T> = anyhow::Result<T>;
