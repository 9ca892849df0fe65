//! The host-parser seam.
//!
//! Turning raw document text into a [`Tree`] is the host pipeline's job; the
//! engine only needs a way to invoke it for each layout file it loads.

use crate::models::{Location, Tree};
use std::path::Path;

/// Parses raw document text into a node tree.
///
/// Implementations must attach `filename` to the location of every node they
/// produce when one is given, so that errors and dependency tracking
/// downstream point at the layout file rather than the including document.
pub trait TemplateParser {
    fn parse(&self, source: &str, filename: Option<&Path>) -> Result<Tree, ParseError>;
}

/// A parse failure, propagated through resolution unchanged.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct ParseError {
    pub message: String,
    pub location: Option<Location>,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        ParseError {
            message: message.into(),
            location: None,
        }
    }

    pub fn at(message: impl Into<String>, location: Location) -> Self {
        ParseError {
            message: message.into(),
            location: Some(location),
        }
    }
}
