//! Human-readable messages for call outcomes.
//!
//! Every failure the gateway sees, whether a dropped connection or an
//! error body in one of the backend's shapes, is reduced to exactly one
//! display string. Nothing in here fails.
//!
//! Precedence for error bodies (first match wins):
//! 1. a plain string body
//! 2. an object with a string `detail`
//! 3. an object with a `detail` array of field errors
//! 4. an object with a string `error`
//! 5. an object with a string `message`
//! 6. a canned sentence for the status code
//!
//! A call with no response at all gets [`NETWORK_ERROR_MESSAGE`].

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

/// Shown when no response reached the client.
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please check your connection.";

/// Replaces bodies that turn out to be HTML pages.
pub const UNEXPECTED_RESPONSE_MESSAGE: &str = "Unexpected server response.";

/// Shown when a session could not be kept alive.
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please sign in again.";

/// Shown after a mutating call whose body has no usable message.
pub const SUCCESS_FALLBACK_MESSAGE: &str = "Action completed successfully.";

const MAX_MESSAGE_CHARS: usize = 200;
const MAX_FIELD_ERRORS: usize = 3;
const FIELD_ERRORS_PREFIX: &str = "Some fields are invalid: ";
const LOCATION_SEGMENTS: [&str; 5] = ["body", "query", "path", "header", "cookie"];

#[allow(clippy::expect_used)]
static CLOSING_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</\s*[A-Za-z][A-Za-z0-9-]*\s*>").expect("valid regex"));

/// Normalizes a string for display.
///
/// Whitespace runs collapse to one space and the ends are trimmed. Text
/// that looks like an HTML document is replaced wholesale. Anything longer
/// than 200 characters is cut to 200, the last one being an ellipsis.
/// Applying this twice gives the same result as applying it once.
#[must_use]
pub fn sanitize_message(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.starts_with('<') && CLOSING_TAG.is_match(&collapsed) {
        return UNEXPECTED_RESPONSE_MESSAGE.to_string();
    }

    if collapsed.chars().count() > MAX_MESSAGE_CHARS {
        let mut truncated: String = collapsed.chars().take(MAX_MESSAGE_CHARS - 1).collect();
        truncated.push('…');
        return truncated;
    }

    collapsed
}

/// Turns a failed call into one display string.
///
/// `status` is `None` when the call never got a response. `body` is the
/// response payload, already parsed (see `ResponseSpec::payload`).
#[must_use]
pub fn error_message(status: Option<u16>, body: Option<&Value>) -> String {
    let Some(status) = status else {
        return NETWORK_ERROR_MESSAGE.to_string();
    };

    body.and_then(message_from_body)
        .unwrap_or_else(|| status_message(status))
}

/// Message for a successful mutating call.
///
/// Uses the body's `message` field when it has something to say.
#[must_use]
pub fn success_message(body: Option<&Value>) -> String {
    body.and_then(|b| b.get("message"))
        .and_then(Value::as_str)
        .and_then(non_empty)
        .unwrap_or_else(|| SUCCESS_FALLBACK_MESSAGE.to_string())
}

fn message_from_body(body: &Value) -> Option<String> {
    if let Value::String(text) = body {
        return non_empty(text);
    }

    let detail = body.get("detail");
    detail
        .and_then(Value::as_str)
        .and_then(non_empty)
        .or_else(|| detail.and_then(Value::as_array).and_then(|d| field_errors(d)))
        .or_else(|| body.get("error").and_then(Value::as_str).and_then(non_empty))
        .or_else(|| body.get("message").and_then(Value::as_str).and_then(non_empty))
}

fn non_empty(text: &str) -> Option<String> {
    let sanitized = sanitize_message(text);
    (!sanitized.is_empty()).then_some(sanitized)
}

fn field_errors(detail: &[Value]) -> Option<String> {
    let errors: Vec<String> = detail.iter().filter_map(field_error).collect();
    if errors.is_empty() {
        return None;
    }

    let mut message = String::from(FIELD_ERRORS_PREFIX);
    message.push_str(
        &errors
            .iter()
            .take(MAX_FIELD_ERRORS)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("; "),
    );
    if errors.len() > MAX_FIELD_ERRORS {
        message.push_str("; and more");
    }
    Some(sanitize_message(&message))
}

fn field_error(entry: &Value) -> Option<String> {
    if let Value::String(text) = entry {
        return non_empty(text);
    }

    let msg = entry.get("msg").and_then(Value::as_str).unwrap_or("is invalid");
    let field = entry
        .get("loc")
        .and_then(Value::as_array)
        .map(|loc| field_name(loc))
        .filter(|name| !name.is_empty());

    Some(match field {
        Some(field) => format!("{field}: {msg}"),
        None => msg.to_string(),
    })
}

fn field_name(loc: &[Value]) -> String {
    let segments: Vec<String> = loc
        .iter()
        .filter_map(|segment| match segment {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .collect();

    let skip = usize::from(
        segments.len() > 1
            && segments
                .first()
                .is_some_and(|first| LOCATION_SEGMENTS.contains(&first.as_str())),
    );
    segments[skip..].join(".")
}

fn status_message(status: u16) -> String {
    match status {
        400 => "The request was invalid. Please review your input and try again.".to_string(),
        401 => SESSION_EXPIRED_MESSAGE.to_string(),
        403 => "You do not have permission to perform this action.".to_string(),
        404 => "The requested resource was not found.".to_string(),
        409 => "This action conflicts with the current state of the resource.".to_string(),
        422 => "Some of the submitted data is invalid.".to_string(),
        s if s >= 500 => "The server encountered an error. Please try again later.".to_string(),
        s => format!("Request failed with status {s}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_classification_table() {
        let cases = [
            (Some(400), Some(json!("Bad input")), "Bad input"),
            (Some(400), Some(json!({ "detail": "Name required" })), "Name required"),
            (
                Some(422),
                Some(json!({ "detail": [
                    { "loc": ["body", "name"], "msg": "field required" },
                    { "loc": ["body", "age"], "msg": "must be positive" }
                ] })),
                "Some fields are invalid: name: field required; age: must be positive",
            ),
            (Some(404), Some(json!({})), "The requested resource was not found."),
            (None, None, NETWORK_ERROR_MESSAGE),
            (
                Some(502),
                Some(json!("<html><body>Bad Gateway</body></html>")),
                UNEXPECTED_RESPONSE_MESSAGE,
            ),
        ];

        for (status, body, expected) in cases {
            assert_eq!(error_message(status, body.as_ref()), expected);
        }
    }

    #[test]
    fn test_more_than_three_field_errors() {
        let body = json!({ "detail": [
            { "loc": ["body", "name"], "msg": "field required" },
            { "loc": ["body", "age"], "msg": "must be positive" },
            { "loc": ["query", "term"], "msg": "unknown term" },
            { "loc": ["body", "guardian", "phone"], "msg": "invalid phone" }
        ] });

        assert_eq!(
            error_message(Some(422), Some(&body)),
            "Some fields are invalid: name: field required; age: must be positive; \
             term: unknown term; and more"
        );
    }

    #[test]
    fn test_nested_location_and_index() {
        let body = json!({ "detail": [
            { "loc": ["body", "guardians", 0, "phone"], "msg": "invalid phone" }
        ] });

        assert_eq!(
            error_message(Some(422), Some(&body)),
            "Some fields are invalid: guardians.0.phone: invalid phone"
        );
    }

    #[test]
    fn test_error_then_message_fields() {
        assert_eq!(
            error_message(Some(409), Some(&json!({ "error": "Duplicate roll number" }))),
            "Duplicate roll number"
        );
        assert_eq!(
            error_message(
                Some(400),
                Some(&json!({ "message": "Fee plan is locked", "code": "LOCKED" }))
            ),
            "Fee plan is locked"
        );
        assert_eq!(
            error_message(
                Some(400),
                Some(&json!({ "error": "first", "message": "second" }))
            ),
            "first"
        );
    }

    #[test]
    fn test_status_fallbacks() {
        let empty = json!({});
        for status in [400, 401, 403, 409, 422, 500, 503] {
            let message = error_message(Some(status), Some(&empty));
            assert!(!message.is_empty());
            assert!(!message.starts_with("Request failed"));
        }
        assert_eq!(
            error_message(Some(500), None),
            error_message(Some(504), None)
        );
        assert_eq!(
            error_message(Some(418), None),
            "Request failed with status 418"
        );
    }

    #[test]
    fn test_blank_detail_falls_through() {
        assert_eq!(
            error_message(Some(403), Some(&json!({ "detail": "   ", "error": "Locked" }))),
            "Locked"
        );
    }

    #[test]
    fn test_sanitize_collapses_whitespace() {
        assert_eq!(
            sanitize_message("  Exam \n\n  schedule\tclash  "),
            "Exam schedule clash"
        );
    }

    #[test]
    fn test_sanitize_truncates_long_messages() {
        let long = "x".repeat(450);
        let sanitized = sanitize_message(&long);
        assert_eq!(sanitized.chars().count(), 200);
        assert!(sanitized.ends_with('…'));
    }

    #[test]
    fn test_sanitize_leaves_angle_brackets_in_prose() {
        assert_eq!(sanitize_message("<none> selected"), "<none> selected");
        assert_eq!(sanitize_message("a < b </b>"), "a < b </b>");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let inputs = [
            "plain".to_string(),
            "  spaced \t out \n text ".to_string(),
            "<html><head></head><body>Oops</body></html>".to_string(),
            format!("{} {}", "word ".repeat(60), "tail"),
            "é".repeat(300),
            String::new(),
        ];

        for input in inputs {
            let once = sanitize_message(&input);
            assert_eq!(sanitize_message(&once), once);
        }
    }

    #[test]
    fn test_success_message() {
        assert_eq!(
            success_message(Some(&json!({ "message": "Student enrolled" }))),
            "Student enrolled"
        );
        assert_eq!(
            success_message(Some(&json!({ "id": 7 }))),
            SUCCESS_FALLBACK_MESSAGE
        );
        assert_eq!(success_message(None), SUCCESS_FALLBACK_MESSAGE);
    }
}
