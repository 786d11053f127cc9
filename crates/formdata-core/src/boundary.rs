use thiserror::Error;

#[derive(Debug, Error)]
pub enum BoundaryError {
    #[error("no boundary parameter in content type '{0}'")]
    Missing(String),
}

/// Extract the boundary token from a `Content-Type` header value.
///
/// One layer of surrounding double quotes is stripped from the token. The
/// parameter key is matched ASCII-case-insensitively.
///
/// # Examples
/// ```
/// use formdata_core::boundary_from_content_type;
///
/// let token = boundary_from_content_type(
///     "multipart/form-data; boundary=\"----WebKitFormBoundary\"; charset=utf-8",
/// )?;
/// assert_eq!(token, "----WebKitFormBoundary");
/// # Ok::<(), formdata_core::BoundaryError>(())
/// ```
pub fn boundary_from_content_type(header: &str) -> Result<String, BoundaryError> {
    for segment in header.split(';') {
        let Some((key, value)) = segment.split_once('=') else {
            continue;
        };
        if key.trim().eq_ignore_ascii_case("boundary") {
            return Ok(strip_quotes(value.trim()).to_string());
        }
    }
    Err(BoundaryError::Missing(header.to_string()))
}

fn strip_quotes(token: &str) -> &str {
    token
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(token)
}

#[cfg(test)]
mod tests {
    use super::boundary_from_content_type;

    #[test]
    fn extracts_bare_token() {
        let token =
            boundary_from_content_type("multipart/form-data; boundary=----WebKitFormBoundary")
                .unwrap();
        assert_eq!(token, "----WebKitFormBoundary");
    }

    #[test]
    fn strips_one_layer_of_quotes() {
        let token =
            boundary_from_content_type("multipart/form-data; boundary=\"simple-token\"").unwrap();
        assert_eq!(token, "simple-token");
    }

    #[test]
    fn quoted_and_bare_tokens_agree() {
        let bare = boundary_from_content_type("multipart/form-data; boundary=tok").unwrap();
        let quoted = boundary_from_content_type("multipart/form-data; boundary=\"tok\"").unwrap();
        assert_eq!(bare, quoted);
    }

    #[test]
    fn ignores_trailing_parameters() {
        let token =
            boundary_from_content_type("multipart/form-data; boundary=\"tok\";other=param")
                .unwrap();
        assert_eq!(token, "tok");
    }

    #[test]
    fn matches_key_case_insensitively() {
        let token = boundary_from_content_type("multipart/form-data; Boundary=tok").unwrap();
        assert_eq!(token, "tok");
    }

    #[test]
    fn missing_boundary_fails() {
        let err = boundary_from_content_type("multipart/form-data").unwrap_err();
        assert!(err.to_string().contains("no boundary parameter"));
    }
}
