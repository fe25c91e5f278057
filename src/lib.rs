//! Stackmap recovers the implicit client/server contract of a source tree.
//!
//! A single lexical pass over the repository collects imports, environment
//! variables, declared backend routes and outbound HTTP calls. From the calls
//! alone it can also sketch the backend a frontend-only repository is missing.
//! Matching is regex based and best effort; nothing is parsed or executed.

pub mod config;
pub mod core;
pub mod error;

pub use crate::config::Config;
pub use crate::core::Engine;
pub use crate::error::{Result, ScanError};
