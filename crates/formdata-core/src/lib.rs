//! Core decoder for `multipart/form-data` payloads.
//!
//! This crate implements a single-pass, byte-level decoder: the framing
//! layer (`multipart`) segments a borrowed payload into parts without
//! copying, the processor registry turns each body into typed data keyed by
//! MIME type, and the aggregation layer collects entries by field name in
//! first-seen order. Parsing is synchronous and side-effect free; any
//! violation aborts the whole call and no partial form is ever returned.
//!
//! Invariants:
//! - Boundary comparison is byte-exact; no case folding.
//! - Line endings are strict CRLF; bare-LF payloads are unsupported.
//! - Field order in the result follows first occurrence in the payload.
//!
//! Version française (résumé):
//! Décodeur `multipart/form-data` en une passe : le cadrage (`multipart`)
//! découpe la charge utile sans copie, le registre de processeurs type les
//! corps par type MIME et l'agrégation regroupe les champs dans l'ordre de
//! première apparition. Toute erreur interrompt l'appel entier.
//!
//! # Examples
//! ```
//! use formdata_core::decode;
//!
//! let payload = concat!(
//!     "--b\r\n",
//!     "Content-Disposition: form-data; name=\"greeting\"\r\n",
//!     "\r\n",
//!     "hello\r\n",
//!     "--b--",
//! );
//! let form = decode(payload.as_bytes(), "b")?;
//! assert_eq!(form.len(), 1);
//! # Ok::<(), formdata_core::DecodeError>(())
//! ```

use std::collections::HashMap;

use serde::Serialize;
use serde::ser::SerializeMap;

mod boundary;
mod decode;
mod multipart;
mod registry;

pub use boundary::{BoundaryError, boundary_from_content_type};
pub use decode::{DecodeError, decode, decode_with};
pub use multipart::{MultipartError, RawPart, parse_parts};
pub use registry::{FALLBACK_KEY, Processor, ProcessorError, ProcessorRegistry};

/// Content type assumed for parts whose header block never names one.
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain";

/// Typed output of a content processor.
///
/// # Examples
/// ```
/// use formdata_core::FieldData;
///
/// let data = FieldData::Text("john_doe".to_string());
/// assert_eq!(data.as_text(), Some("john_doe"));
/// assert!(data.as_bytes().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldData {
    /// UTF-8 text, produced by the built-in `text/plain` processor.
    Text(String),
    /// Parsed JSON, produced by the built-in `application/json` processor.
    Json(serde_json::Value),
    /// Raw body bytes, produced by the built-in fallback processor.
    Bytes(Vec<u8>),
}

impl FieldData {
    /// Text view, when the processor produced text.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldData::Text(text) => Some(text),
            _ => None,
        }
    }

    /// JSON view, when the processor produced a parsed document.
    #[must_use]
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            FieldData::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Raw-bytes view, when the processor passed the body through.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            FieldData::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }
}

/// One decoded part as exposed to the caller.
///
/// `filename` is serialized only when the original part carried one.
///
/// # Examples
/// ```
/// use formdata_core::{Entry, FieldData};
///
/// let entry = Entry {
///     content_type: "text/plain".to_string(),
///     data: FieldData::Text("hello".to_string()),
///     filename: None,
/// };
/// let json = serde_json::to_value(&entry).expect("entry json");
/// assert!(json.get("filename").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    /// Content type of the part, defaulted to [`DEFAULT_CONTENT_TYPE`].
    pub content_type: String,
    /// Processor output for the part body.
    pub data: FieldData,
    /// Filename parameter, when the part carried one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

/// Value stored under one field name: a single entry, or an ordered list
/// when the name repeats across the payload.
///
/// # Examples
/// ```
/// use formdata_core::{Entry, FieldData, FieldValue};
///
/// let entry = Entry {
///     content_type: "text/plain".to_string(),
///     data: FieldData::Text("one".to_string()),
///     filename: None,
/// };
/// let value = FieldValue::Single(entry);
/// assert_eq!(value.entries().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// The field name appeared exactly once.
    Single(Entry),
    /// The field name repeated; entries are in payload order.
    Multiple(Vec<Entry>),
}

impl FieldValue {
    /// All entries for the field, in payload order.
    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        match self {
            FieldValue::Single(entry) => std::slice::from_ref(entry),
            FieldValue::Multiple(entries) => entries,
        }
    }

    /// The first entry for the field, if any.
    #[must_use]
    pub fn first(&self) -> Option<&Entry> {
        self.entries().first()
    }
}

/// Decoded form, keyed by field name in first-seen payload order.
///
/// Serializes as a JSON map; repeated names serialize as arrays.
///
/// # Examples
/// ```
/// use formdata_core::{Entry, FieldData, FieldValue, ParsedForm};
///
/// fn text(value: &str) -> Entry {
///     Entry {
///         content_type: "text/plain".to_string(),
///         data: FieldData::Text(value.to_string()),
///         filename: None,
///     }
/// }
///
/// let mut form = ParsedForm::new();
/// form.push("username", text("john_doe"));
/// form.push("username", text("hello world"));
/// assert!(matches!(form.get("username"), Some(FieldValue::Multiple(_))));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedForm {
    entries: Vec<(String, FieldValue)>,
    index: HashMap<String, usize>,
}

impl ParsedForm {
    /// Empty form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `entry` under `name`. A first repeat promotes the existing
    /// scalar to a two-element list; further repeats append.
    pub fn push(&mut self, name: impl Into<String>, entry: Entry) {
        let name = name.into();
        match self.index.get(&name) {
            Some(&slot) => {
                let value = &mut self.entries[slot].1;
                let previous = std::mem::replace(value, FieldValue::Multiple(Vec::new()));
                *value = match previous {
                    FieldValue::Single(first) => FieldValue::Multiple(vec![first, entry]),
                    FieldValue::Multiple(mut entries) => {
                        entries.push(entry);
                        FieldValue::Multiple(entries)
                    }
                };
            }
            None => {
                self.index.insert(name.clone(), self.entries.len());
                self.entries.push((name, FieldValue::Single(entry)));
            }
        }
    }

    /// Value stored under `name`, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.index.get(name).map(|&slot| &self.entries[slot].1)
    }

    /// Fields in first-seen payload order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Number of distinct field names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no field was decoded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for ParsedForm {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
