use super::error::MultipartError;
use super::layout;
use super::reader::PayloadReader;
use crate::DEFAULT_CONTENT_TYPE;

/// One framed part, with its body borrowed from the payload.
#[derive(Debug, PartialEq)]
pub struct RawPart<'a> {
    pub name: String,
    pub filename: Option<String>,
    pub content_type: String,
    pub body: &'a [u8],
}

/// Segment `payload` into parts separated by `--` + `boundary` lines.
///
/// The preamble before the first delimiter line is discarded, the terminal
/// `--`-suffixed delimiter stops the scan, and any epilogue after it is never
/// inspected. All failures abort the whole parse.
pub fn parse_parts<'a>(
    payload: &'a [u8],
    boundary: &str,
) -> Result<Vec<RawPart<'a>>, MultipartError> {
    let delimiter = delimiter_bytes(boundary);
    let reader = PayloadReader::new(payload);
    let mut parts = Vec::new();

    let mut offset = skip_preamble(&reader, &delimiter)?;
    loop {
        let (header, body_start) = parse_part_headers(&reader, offset)?;
        let (body, after_delimiter, terminal) = extract_body(&reader, &delimiter, body_start)?;
        parts.push(RawPart {
            name: header.name,
            filename: header.filename,
            content_type: header.content_type,
            body,
        });
        if terminal {
            return Ok(parts);
        }
        offset = after_delimiter;
    }
}

fn delimiter_bytes(boundary: &str) -> Vec<u8> {
    let mut delimiter = Vec::with_capacity(layout::DELIMITER_DASHES.len() + boundary.len());
    delimiter.extend_from_slice(layout::DELIMITER_DASHES);
    delimiter.extend_from_slice(boundary.as_bytes());
    delimiter
}

/// Discard lines until one starts with the delimiter; the first part's
/// header block begins on the following line.
fn skip_preamble(reader: &PayloadReader<'_>, delimiter: &[u8]) -> Result<usize, MultipartError> {
    let mut offset = 0;
    loop {
        if offset >= reader.len() {
            return Err(MultipartError::BoundaryNotFound);
        }
        let line_end = reader.find_line_end(offset);
        if reader.starts_with_at(offset, delimiter) {
            return Ok(line_end + 2);
        }
        if line_end >= reader.len() {
            return Err(MultipartError::BoundaryNotFound);
        }
        offset = line_end + 2;
    }
}

struct PartHeader {
    name: String,
    filename: Option<String>,
    content_type: String,
}

/// Scan a header block up to its blank-line terminator.
///
/// Checks run in a fixed order at every byte position: disposition line,
/// content-type line, blank line, then a single-byte advance. Reordering
/// changes behavior on malformed or reordered headers.
fn parse_part_headers(
    reader: &PayloadReader<'_>,
    mut offset: usize,
) -> Result<(PartHeader, usize), MultipartError> {
    let mut name = None;
    let mut filename = None;
    let mut content_type = None;

    loop {
        if offset >= reader.len() {
            return Err(MultipartError::UnterminatedHeaders);
        }
        if name.is_none() && reader.starts_with_at(offset, layout::DISPOSITION_PREFIX) {
            let line_end = reader.find_line_end(offset);
            let (found_name, found_filename) = parse_disposition_params(
                reader,
                offset + layout::DISPOSITION_PREFIX.len(),
                line_end,
            )?;
            name = found_name;
            filename = found_filename;
            offset = line_end + 2;
        } else if content_type.is_none()
            && reader.starts_with_at(offset, layout::CONTENT_TYPE_PREFIX)
        {
            let line_end = reader.find_line_end(offset);
            // Exactly one separating space after the colon.
            let value_start = (offset + layout::CONTENT_TYPE_PREFIX.len() + 1).min(line_end);
            content_type = Some(reader.utf8(value_start..line_end)?.to_string());
            offset = line_end + 2;
        } else if reader.starts_with_at(offset, layout::CRLF) {
            offset += 2;
            break;
        } else {
            offset += 1;
        }
    }

    let name = name.ok_or(MultipartError::MissingName)?;
    Ok((
        PartHeader {
            name,
            filename,
            content_type: content_type.unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
        },
        offset,
    ))
}

/// Scan a disposition line for `name="..."` and `filename="..."`, in either
/// order.
fn parse_disposition_params(
    reader: &PayloadReader<'_>,
    mut offset: usize,
    line_end: usize,
) -> Result<(Option<String>, Option<String>), MultipartError> {
    let mut name = None;
    let mut filename = None;

    while offset < line_end {
        if name.is_none() && reader.starts_with_at(offset, layout::NAME_PARAM) {
            let (value, next) = quoted_value(reader, offset + layout::NAME_PARAM.len())?;
            name = Some(value);
            offset = next;
        } else if filename.is_none() && reader.starts_with_at(offset, layout::FILENAME_PARAM) {
            let (value, next) = quoted_value(reader, offset + layout::FILENAME_PARAM.len())?;
            filename = Some(value);
            offset = next;
        } else {
            offset += 1;
        }
    }

    Ok((name, filename))
}

/// Quoted parameter value: everything up to the next `"`, which is searched
/// to the payload end. No escape handling inside the value.
fn quoted_value(
    reader: &PayloadReader<'_>,
    start: usize,
) -> Result<(String, usize), MultipartError> {
    let close = reader
        .find_quote(start)
        .ok_or(MultipartError::UnterminatedQuote)?;
    Ok((reader.utf8(start..close)?.to_string(), close + 1))
}

/// Walk the body line by line until a line starts with the delimiter.
///
/// The body is the byte range between the header terminator and the CRLF
/// preceding that delimiter line; it may itself contain CR/LF bytes. Returns
/// the body slice, the offset just past the delimiter line, and whether the
/// delimiter carried the terminal `--` suffix.
fn extract_body<'a>(
    reader: &PayloadReader<'a>,
    delimiter: &[u8],
    body_start: usize,
) -> Result<(&'a [u8], usize, bool), MultipartError> {
    let mut cursor = body_start;
    loop {
        if cursor >= reader.len() {
            return Err(MultipartError::UnterminatedBody);
        }
        if reader.starts_with_at(cursor, delimiter) {
            let body_end = cursor.saturating_sub(2).max(body_start);
            let body = reader.slice(body_start..body_end);
            let terminal =
                reader.starts_with_at(cursor + delimiter.len(), layout::DELIMITER_DASHES);
            let line_end = reader.find_line_end(cursor);
            return Ok((body, line_end + 2, terminal));
        }
        let line_end = reader.find_line_end(cursor);
        if line_end >= reader.len() {
            return Err(MultipartError::UnterminatedBody);
        }
        cursor = line_end + 2;
    }
}
