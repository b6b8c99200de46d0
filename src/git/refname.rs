//! Ref name checks following `git check-ref-format` rules.

use regex::Regex;
use std::sync::LazyLock;

static FORBIDDEN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"[\x00-\x20\x7f~^:?*\[\\]|\.\.|@\{|//").ok());

/// Check that `name` can be used as a branch or tag name.
///
/// Returns a human readable reason on failure.
pub fn check_ref_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("name is empty".to_string());
    }
    if name == "@" {
        return Err("'@' is not a valid ref name".to_string());
    }
    if name.starts_with('-') {
        return Err("name must not start with '-'".to_string());
    }
    if name.starts_with('/') || name.ends_with('/') {
        return Err("name must not start or end with '/'".to_string());
    }
    if name.ends_with('.') {
        return Err("name must not end with '.'".to_string());
    }
    if name.split('/').any(|c| c.starts_with('.') || c.ends_with(".lock")) {
        return Err("components must not start with '.' or end with '.lock'".to_string());
    }
    match FORBIDDEN.as_ref() {
        Some(re) => match re.find(name) {
            Some(m) => Err(format!("contains forbidden sequence {:?}", m.as_str())),
            None => Ok(()),
        },
        None => Err("ref name pattern failed to compile".to_string()),
    }
}
