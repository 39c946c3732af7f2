use std::panic;

const REDACTED: &str = "[REDACTED]";

const SENSITIVE_MARKERS: [&str; 6] = ["password", "pass", "secret", "token", "apikey", "authorization"];

pub fn redact_text(input: &str) -> String {
    input
        .split_whitespace()
        .map(redact_chunk)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Backend error codes are logged verbatim only when they look like codes;
/// anything else may carry response text and gets collapsed.
pub fn sanitize_error_code(code: &str) -> String {
    let valid = !code.is_empty()
        && code.len() <= 64
        && code
            .chars()
            .all(|ch| ch.is_ascii_uppercase() || ch.is_ascii_digit() || ch == '_' || ch == '-');

    if valid {
        code.to_owned()
    } else {
        "BACKEND_ERROR".to_owned()
    }
}

pub fn install_panic_redaction_hook() {
    panic::set_hook(Box::new(|panic_info| {
        let payload = panic_info
            .payload()
            .downcast_ref::<&str>()
            .map(ToString::to_string)
            .or_else(|| panic_info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "panic payload omitted".to_owned());

        let scrubbed = redact_text(&payload);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "gowactl panic: {} at {}:{}:{}",
                scrubbed,
                location.file(),
                location.line(),
                location.column()
            );
        } else {
            eprintln!("gowactl panic: {}", scrubbed);
        }
    }));
}

fn redact_chunk(chunk: &str) -> String {
    let lowered = chunk.to_ascii_lowercase();
    if SENSITIVE_MARKERS
        .iter()
        .any(|marker| lowered.contains(marker))
        || looks_like_basic_auth(chunk)
    {
        REDACTED.to_owned()
    } else {
        chunk.to_owned()
    }
}

/// `user:pass` pairs and base64 header values both end up in backend errors.
fn looks_like_basic_auth(value: &str) -> bool {
    if value.contains(':') && value.splitn(2, ':').all(|part| !part.is_empty()) {
        let (user, _) = value.split_once(':').unwrap_or_default();
        if user.chars().all(|ch| ch.is_ascii_alphanumeric()) && !user.is_empty() {
            return true;
        }
    }

    value.len() >= 16
        && value
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '+' || ch == '/' || ch == '=')
        && value.chars().any(|ch| ch.is_ascii_digit())
        && value.chars().any(|ch| ch.is_ascii_alphabetic())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redact_text_scrubs_credential_fragments() {
        let input = "login failed password=hunter2 for admin:hunter2 header dXNlcjpodW50ZXIyMg==";
        let output = redact_text(input);

        assert!(!output.contains("hunter2"));
        assert!(!output.contains("dXNlcjpodW50ZXIyMg=="));
        assert!(output.contains("[REDACTED]"));
    }

    #[test]
    fn redact_text_keeps_plain_words() {
        assert_eq!(redact_text("connection refused"), "connection refused");
    }

    #[test]
    fn sanitize_error_code_keeps_codes_and_rejects_free_text() {
        assert_eq!(sanitize_error_code("ALREADY_LOGGED_IN"), "ALREADY_LOGGED_IN");
        assert_eq!(sanitize_error_code("SESSION-401"), "SESSION-401");
        assert_eq!(
            sanitize_error_code("you are already logged in"),
            "BACKEND_ERROR"
        );
        assert_eq!(sanitize_error_code(""), "BACKEND_ERROR");
    }
}
