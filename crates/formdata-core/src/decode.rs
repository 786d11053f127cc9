use thiserror::Error;

use crate::multipart::{MultipartError, parse_parts};
use crate::registry::{ProcessorError, ProcessorRegistry};
use crate::{Entry, ParsedForm};

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("multipart framing failed: {0}")]
    Multipart(#[from] MultipartError),
    #[error("processor for field '{field}' ({content_type}) failed: {source}")]
    Processor {
        field: String,
        content_type: String,
        source: ProcessorError,
    },
}

/// Decode a `multipart/form-data` payload with the built-in registry.
///
/// # Examples
/// ```
/// use formdata_core::decode;
///
/// let payload = concat!(
///     "--b\r\n",
///     "Content-Disposition: form-data; name=\"metadata\"\r\n",
///     "Content-Type: application/json\r\n",
///     "\r\n",
///     "{\"age\":30}\r\n",
///     "--b--",
/// );
/// let form = decode(payload.as_bytes(), "b")?;
/// let entry = form.get("metadata").and_then(|value| value.first()).expect("metadata entry");
/// assert_eq!(entry.data.as_json().and_then(|v| v["age"].as_i64()), Some(30));
/// # Ok::<(), formdata_core::DecodeError>(())
/// ```
pub fn decode(payload: &[u8], boundary: &str) -> Result<ParsedForm, DecodeError> {
    decode_with(payload, boundary, &ProcessorRegistry::default())
}

/// Decode, dispatching each part body through `registry`.
///
/// Parsing is all-or-nothing: a framing failure or a processor failure on
/// any part aborts the call without a partial form.
pub fn decode_with(
    payload: &[u8],
    boundary: &str,
    registry: &ProcessorRegistry,
) -> Result<ParsedForm, DecodeError> {
    let parts = parse_parts(payload, boundary)?;
    let mut form = ParsedForm::new();
    for part in parts {
        let data =
            registry.resolve(&part.content_type)(part.body).map_err(|source| {
                DecodeError::Processor {
                    field: part.name.clone(),
                    content_type: part.content_type.clone(),
                    source,
                }
            })?;
        form.push(
            part.name,
            Entry {
                content_type: part.content_type,
                data,
                filename: part.filename,
            },
        );
    }
    Ok(form)
}
