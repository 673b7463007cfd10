//! JSON parsing utilities for the Tibber API client.

use anyhow::Result;

/// Attempt to parse JSON and, on failure, include a contextual snippet of the
/// line where the error occurred along with the serde path and type mismatch.
pub fn parse_json_with_context<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T> {
    let jd = &mut serde_json::Deserializer::from_slice(body);
    match serde_path_to_error::deserialize(jd) {
        Ok(value) => Ok(value),
        Err(err) => {
            let inner_err = err.inner();
            let (line, column) = (inner_err.line(), inner_err.column());
            let path = err.path().to_string();

            let msg = inner_err.to_string();
            let loc = format!(" at line {line} column {column}");
            let msg_without_loc = msg.strip_suffix(&loc).unwrap_or(&msg).to_string();

            let type_info = parse_type_mismatch(&msg_without_loc);
            let text = String::from_utf8_lossy(body);
            let snippet = build_error_snippet(&text, line, column, 20);

            let mut final_err = String::new();
            if !path.is_empty() && path != "." && path != "?" {
                final_err.push_str(&format!("at path '{}': ", path));
            }
            final_err.push_str(&format!(
                "{} (line {} col {})\n{}",
                type_info, line, column, snippet
            ));

            Err(anyhow::anyhow!(final_err))
        }
    }
}

/// Deserialize an already-decoded value into `T`, reporting the JSON path of
/// the first mismatch.
pub fn from_value_with_context<T: serde::de::DeserializeOwned>(
    value: serde_json::Value,
) -> Result<T> {
    serde_path_to_error::deserialize(value).map_err(|err| {
        let path = err.path().to_string();
        let type_info = parse_type_mismatch(&err.inner().to_string());
        if path.is_empty() || path == "." || path == "?" {
            anyhow::anyhow!(type_info)
        } else {
            anyhow::anyhow!("at path '{path}': {type_info}")
        }
    })
}

/// Extract type mismatch information from a serde error message.
///
/// Parses error messages like "invalid type: null, expected a string" to extract
/// the expected and actual types for clearer error reporting.
///
/// Returns a formatted string like "expected a string, got null" or the original
/// message if parsing fails.
fn parse_type_mismatch(error_msg: &str) -> String {
    // Try to parse "invalid type: X, expected Y" format
    if let Some(invalid_start) = error_msg.find("invalid type: ") {
        let after_prefix = &error_msg[invalid_start + "invalid type: ".len()..];

        if let Some(comma_pos) = after_prefix.find(", expected ") {
            let actual_type = &after_prefix[..comma_pos];
            let expected_part = &after_prefix[comma_pos + ", expected ".len()..];

            let expected_type = expected_part
                .split(" at line ")
                .next()
                .unwrap_or(expected_part)
                .trim();

            return format!("expected {}, got {}", expected_type, actual_type);
        }
    }

    if error_msg.starts_with("expected ")
        && let Some(expected_part) = error_msg.split(" at line ").next()
    {
        return expected_part.to_string();
    }

    error_msg.to_string()
}

/// Render the neighbourhood of `column` on `line` with a caret under the error.
///
/// serde reports a 1-based byte column; slicing happens on characters so
/// multi-byte text never splits.
fn build_error_snippet(body: &str, line: usize, column: usize, context_len: usize) -> String {
    let raw_line = body.lines().nth(line.saturating_sub(1)).unwrap_or("");
    if raw_line.is_empty() {
        return "(empty line)".to_string();
    }

    let byte_idx = column.saturating_sub(1);
    let error_idx = raw_line
        .char_indices()
        .take_while(|(offset, _)| *offset < byte_idx)
        .count();

    let target_line: Vec<char> = raw_line.chars().collect();

    let half_len = context_len / 2;
    let start = error_idx.saturating_sub(half_len);
    let end = (error_idx + half_len).min(target_line.len());

    let slice: String = target_line[start..end].iter().collect();
    let indicator = " ".repeat(error_idx - start) + "^";

    format!("...{slice}...\n   {indicator}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn test_parse_type_mismatch_invalid_type() {
        let msg = "invalid type: null, expected a string at line 45 column 29";
        let result = parse_type_mismatch(msg);
        assert_eq!(result, "expected a string, got null");
    }

    #[test]
    fn test_parse_type_mismatch_expected() {
        let msg = "expected value at line 1 column 1";
        let result = parse_type_mismatch(msg);
        assert_eq!(result, "expected value");
    }

    #[test]
    fn test_malformed_body_reports_location() {
        let result: Result<serde_json::Value> = parse_json_with_context(br#"{"data": }"#);
        let err_msg = result.unwrap_err().to_string();

        assert!(err_msg.contains("expected value"), "{err_msg}");
        assert!(err_msg.contains("line 1 col 10"), "{err_msg}");
        assert!(err_msg.contains('^'));
    }

    #[test]
    fn test_truncated_body_does_not_panic() {
        let result: Result<serde_json::Value> = parse_json_with_context("{\"name\": \"Å".as_bytes());
        assert!(result.is_err());
    }

    #[test]
    fn test_caret_points_at_error_after_multibyte_text() {
        let body = format!(r#"{{"a":"{}" x}}"#, "Å".repeat(25));
        let err_msg = parse_json_with_context::<serde_json::Value>(body.as_bytes())
            .unwrap_err()
            .to_string();

        let mut lines = err_msg.lines().skip(1);
        let excerpt = lines.next().unwrap();
        let caret = lines.next().unwrap();
        let caret_col = caret.chars().position(|c| c == '^').unwrap();
        assert_eq!(excerpt.chars().nth(caret_col), Some('x'), "{err_msg}");
    }

    #[test]
    fn test_syntax_error_has_no_path_prefix() {
        let err_msg = parse_json_with_context::<serde_json::Value>(br#"{"a": 1 x}"#)
            .unwrap_err()
            .to_string();
        assert!(!err_msg.contains("at path"), "{err_msg}");
        assert!(err_msg.contains("line 1 col 9"), "{err_msg}");
    }

    #[test]
    fn test_empty_body() {
        let result: Result<serde_json::Value> = parse_json_with_context(b"");
        let err_msg = result.unwrap_err().to_string();
        assert!(err_msg.contains("(empty line)"), "{err_msg}");
    }

    #[test]
    fn test_from_value_reports_path() {
        #[derive(Debug, Deserialize)]
        struct Home {
            #[allow(dead_code)]
            id: String,
        }

        #[derive(Debug, Deserialize)]
        struct Viewer {
            #[allow(dead_code)]
            homes: Vec<Home>,
        }

        let value = serde_json::json!({ "homes": [{ "id": null }] });
        let err_msg = from_value_with_context::<Viewer>(value)
            .unwrap_err()
            .to_string();

        assert!(err_msg.contains("homes[0].id"), "{err_msg}");
        assert!(err_msg.contains("expected") && err_msg.contains("got"));
    }
}
