use thiserror::Error;

#[derive(Debug, Error)]
pub enum MultipartError {
    #[error("boundary delimiter not found in payload")]
    BoundaryNotFound,
    #[error("part header block is missing its blank-line terminator")]
    UnterminatedHeaders,
    #[error("quoted parameter is missing its closing quote")]
    UnterminatedQuote,
    #[error("part body is missing its closing boundary delimiter")]
    UnterminatedBody,
    #[error("part header block carries no name parameter")]
    MissingName,
    #[error("header text is not valid UTF-8: {0}")]
    HeaderEncoding(#[from] std::str::Utf8Error),
}
