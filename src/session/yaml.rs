//! Cleanup of the writer's session text before it reaches the YAML parser.
//!
//! The writer emits free-text values (driver and team names, setup names,
//! livery strings) without quoting, so an apostrophe or a leading comma makes
//! the document invalid:
//!
//! ```text
//! UserName: O'Connor, Mike
//! CarDesignStr: ,ff0000,00ff00
//! ```
//!
//! becomes
//!
//! ```text
//! UserName: 'O''Connor, Mike'
//! CarDesignStr: ',ff0000,00ff00'
//! ```
//!
//! Line structure is preserved so parser locations still point into the
//! original text.

/// Keys whose values are copied verbatim from user input.
const FREE_TEXT_KEYS: &[&str] =
    &["UserName", "TeamName", "AbbrevName", "Initials", "DriverSetupName", "CarDesignStr"];

/// Strip control characters and quote free-text values.
pub fn preprocess(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 64);
    for (index, line) in text.split('\n').enumerate() {
        if index > 0 {
            out.push('\n');
        }
        let cleaned: String =
            line.chars().filter(|&ch| !ch.is_control() || ch == '\t' || ch == '\r').collect();
        match quote_free_text(&cleaned) {
            Some(quoted) => out.push_str(&quoted),
            None => out.push_str(&cleaned),
        }
    }
    out
}

fn quote_free_text(line: &str) -> Option<String> {
    let indent = line.len() - line.trim_start().len();
    let mut body = &line[indent..];
    let mut prefix_len = indent;
    if let Some(rest) = body.strip_prefix("- ") {
        prefix_len += 2;
        body = rest;
    }

    let key = FREE_TEXT_KEYS.iter().find(|key| {
        body.strip_prefix(**key).is_some_and(|rest| rest.starts_with(':'))
    })?;
    let after_colon = prefix_len + key.len() + 1;
    let value = line[after_colon..].trim();
    if value.is_empty() || is_quoted(value) {
        return None;
    }

    Some(format!("{} '{}'", &line[..after_colon], value.replace('\'', "''")))
}

/// Whether `value` is one complete YAML scalar in single or double quotes,
/// with every inner quote escaped.
fn is_quoted(value: &str) -> bool {
    let Some(quote) = value.chars().next().filter(|ch| matches!(ch, '\'' | '"')) else {
        return false;
    };
    if value.len() < 2 || !value.ends_with(quote) {
        return false;
    }
    let inner = &value[1..value.len() - 1];
    if quote == '\'' {
        return inner.split("''").all(|part| !part.contains('\''));
    }
    let mut escaped = false;
    for ch in inner.chars() {
        match ch {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => return false,
            _ => {}
        }
    }
    !escaped
}
