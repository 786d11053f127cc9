use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::FieldData;

/// Pseudo-key that addresses the fallback processor.
pub const FALLBACK_KEY: &str = "default";

/// Transform from raw body bytes to typed field data.
pub type Processor = Arc<dyn Fn(&[u8]) -> Result<FieldData, ProcessorError> + Send + Sync>;

#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error("body is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("JSON body failed to parse: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Other(String),
}

/// MIME-type-keyed processor table with a fallback slot.
///
/// Lookup is exact-match on the content-type string, falling back to the
/// `default` processor; there is no wildcard or parameter-aware matching.
/// Caller processors merge over the built-ins key-by-key, and the
/// [`FALLBACK_KEY`] pseudo-key replaces the fallback itself.
///
/// # Examples
/// ```
/// use formdata_core::{FieldData, ProcessorRegistry};
///
/// let mut registry = ProcessorRegistry::builtin();
/// registry.insert("text/csv", |body| {
///     Ok(FieldData::Text(String::from_utf8_lossy(body).into_owned()))
/// });
/// let processor = registry.resolve("text/csv");
/// let data = processor(b"a,b").expect("csv body");
/// assert_eq!(data.as_text(), Some("a,b"));
/// ```
#[derive(Clone)]
pub struct ProcessorRegistry {
    processors: HashMap<String, Processor>,
    fallback: Processor,
}

impl Default for ProcessorRegistry {
    fn default() -> Self {
        let mut processors: HashMap<String, Processor> = HashMap::new();
        processors.insert(
            "text/plain".to_string(),
            Arc::new(|body: &[u8]| Ok(FieldData::Text(std::str::from_utf8(body)?.to_string()))),
        );
        processors.insert(
            "application/json".to_string(),
            Arc::new(|body: &[u8]| {
                let text = std::str::from_utf8(body)?;
                Ok(FieldData::Json(serde_json::from_str(text)?))
            }),
        );
        Self {
            processors,
            fallback: Arc::new(|body: &[u8]| Ok(FieldData::Bytes(body.to_vec()))),
        }
    }
}

impl ProcessorRegistry {
    /// Registry holding only the built-in processors: `text/plain` (UTF-8
    /// text), `application/json` (parsed JSON) and the raw-bytes fallback.
    #[must_use]
    pub fn builtin() -> Self {
        Self::default()
    }

    /// Merge one caller processor over the built-ins.
    pub fn insert<F>(&mut self, content_type: impl Into<String>, processor: F)
    where
        F: Fn(&[u8]) -> Result<FieldData, ProcessorError> + Send + Sync + 'static,
    {
        let content_type = content_type.into();
        if content_type == FALLBACK_KEY {
            self.fallback = Arc::new(processor);
        } else {
            self.processors.insert(content_type, Arc::new(processor));
        }
    }

    /// Processor for `content_type`, or the fallback when unregistered.
    #[must_use]
    pub fn resolve(&self, content_type: &str) -> &Processor {
        self.processors.get(content_type).unwrap_or(&self.fallback)
    }
}

impl fmt::Debug for ProcessorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&str> = self.processors.keys().map(String::as_str).collect();
        keys.sort_unstable();
        f.debug_struct("ProcessorRegistry")
            .field("keys", &keys)
            .finish()
    }
}
