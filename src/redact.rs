//! Secret redaction for logged command lines
//!
//! Migration tools accept connection strings on the command line, so
//! anything that reaches a log or the terminal goes through here first.
//! The arguments handed to the child process are never touched.

use regex_lite::Regex;
use std::sync::OnceLock;

/// Replacement text for masked values
pub const REDACTED: &str = "[REDACTED]";

/// Flags whose value is always masked
const SENSITIVE_FLAGS: [&str; 5] = ["--connection", "--password", "--token", "--api-key", "--key"];

/// `Password=...;` style fragments inside ADO.NET / libpq connection strings
fn secret_pair_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"(?i)\b(password|pwd|access\s*token|account\s*key)\s*=\s*[^;]*")
            .expect("Invalid secret regex")
    })
}

/// Mask `key=value` secrets embedded in a single string
pub fn redact_connection_string(text: &str) -> String {
    secret_pair_regex()
        .replace_all(text, |caps: &regex_lite::Captures<'_>| {
            format!("{}={}", &caps[1], REDACTED)
        })
        .into_owned()
}

/// Redact sensitive arguments (connection strings, tokens, keys)
pub fn redact_sensitive_args(args: &[String]) -> Vec<String> {
    let mut result = Vec::with_capacity(args.len());
    let mut redact_next = false;
    for arg in args {
        if redact_next {
            result.push(REDACTED.to_string());
            redact_next = false;
        } else if let Some(flag) = SENSITIVE_FLAGS.iter().find(|f| is_flag(arg, f)) {
            if arg.contains('=') {
                result.push(format!("{}={}", flag, REDACTED));
            } else {
                result.push(arg.clone());
                redact_next = true;
            }
        } else {
            result.push(redact_connection_string(arg));
        }
    }
    result
}

fn is_flag(arg: &str, flag: &str) -> bool {
    arg == flag || arg.strip_prefix(flag).is_some_and(|rest| rest.starts_with('='))
}
