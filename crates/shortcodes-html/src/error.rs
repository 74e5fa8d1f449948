//! Error types for HTML tree parsing.

/// Error raised when markup cannot be turned into a tree.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum HtmlError {
    /// Markup syntax error reported by the reader.
    #[error("markup parse error: {0}")]
    Syntax(#[from] quick_xml::Error),

    /// Encoding error while decoding names or text.
    #[error("encoding error: {0}")]
    Encoding(#[from] quick_xml::encoding::EncodingError),
}
