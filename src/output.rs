//! Response rendering for the terminal

use crate::config::Settings;
use serde_json::Value;
use std::io::Write;

/// Pretty-print a JSON response; anything else is returned as text
pub fn render(body: &[u8]) -> String {
    match serde_json::from_slice::<Value>(body) {
        Ok(value) => serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string()),
        Err(_) => String::from_utf8_lossy(body).into_owned(),
    }
}

/// Write a response to stdout unless output is disabled or the body is empty
pub fn print_response(settings: &Settings, body: &[u8]) -> std::io::Result<()> {
    if !settings.print_output || body.iter().all(u8::is_ascii_whitespace) {
        return Ok(());
    }

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", render(body))
}
