/// Convenience result type for request resolution.
pub type PlaceholderResult<T> = Result<T, PlaceholderError>;

/// A request path that does not match the placeholder grammar.
///
/// Every variant carries the raw substring that made the parse fail.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("invalid width `{0}`")]
    InvalidWidth(String),

    #[error("unknown background color `{0}`")]
    InvalidBackground(String),

    #[error("unknown foreground color `{0}`")]
    InvalidForeground(String),

    #[error("unexpected trailing input `{0}`")]
    TrailingInput(String),
}

impl PathError {
    /// The offending raw segment.
    pub fn segment(&self) -> &str {
        match self {
            Self::InvalidWidth(segment)
            | Self::InvalidBackground(segment)
            | Self::InvalidForeground(segment)
            | Self::TrailingInput(segment) => segment,
        }
    }
}

/// Top-level error taxonomy for turning a request into a placeholder.
#[derive(thiserror::Error, Debug)]
pub enum PlaceholderError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("invalid path: {0}")]
    InvalidPath(#[from] PathError),

    #[error("render error: {0}")]
    Render(String),
}

impl PlaceholderError {
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Whether the caller sent a malformed request, as opposed to a server-side failure.
    pub fn is_bad_request(&self) -> bool {
        matches!(self, Self::InvalidUrl(_) | Self::InvalidPath(_))
    }
}
