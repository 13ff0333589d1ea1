//! Error types for the post-processing pipeline.
use std::{io, string::FromUtf8Error};

use thiserror::Error;

/// Error returned by [`crate::PostProcessor`] entry points.
///
/// Either the whole fragment is rewritten and returned, or one of these is
/// returned and no output exists. Retrying with the same input fails the same
/// way.
#[derive(Debug, Error)]
pub enum PostProcessError {
  /// The input could not be parsed as an HTML fragment.
  #[error("PostProcess: invalid HTML, {reason}")]
  InvalidHtml { reason: String },

  /// The rewritten tree could not be serialized back to HTML.
  #[error("PostProcess: error rendering processed HTML, {0}")]
  Render(#[from] RenderError),

  /// The full issue URL pattern derived from the application URL did not
  /// compile.
  #[error("PostProcess: invalid issue URL pattern, {0}")]
  Pattern(#[from] regex::Error),
}

/// Error produced while serializing a node tree.
#[derive(Debug, Error)]
pub enum RenderError {
  #[error("I/O error: {0}")]
  Io(#[from] io::Error),

  #[error("void element <{0}> has child nodes")]
  VoidElementChildren(String),

  #[error("rendered output is not valid UTF-8: {0}")]
  Encoding(#[from] FromUtf8Error),
}
