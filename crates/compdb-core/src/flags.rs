//! Compiler flag extraction from free-form command strings
//!
//! A flag token starts at the beginning of the command or after whitespace,
//! begins with `-` and one of the option-class letters `D I O U W f g s`
//! (defines, include paths, optimization, warnings, `-f`/`-g`/`-s` families),
//! and runs up to the next whitespace or `=`. An optional `=value` follows,
//! where the value is either double-quoted (quotes may be backslash-escaped,
//! and the quoted part may contain spaces) or a bare run of non-whitespace.

use regex::Regex;
use std::sync::OnceLock;

/// Flag token grammar. Group 1 is the token without its leading separator.
const FLAG_PATTERN: &str = r#"(?:^|\s)(-[DIOUWfgs][^=\s]+(?:=\\?"[^"]*?\\?"|=\S+)?)"#;

fn flag_regex() -> &'static Regex {
    static FLAG_REGEX: OnceLock<Regex> = OnceLock::new();
    FLAG_REGEX.get_or_init(|| Regex::new(FLAG_PATTERN).expect("flag pattern is a valid regex"))
}

/// Extracts flag tokens from compiler invocations
#[derive(Debug, Clone, Copy, Default)]
pub struct FlagExtractor;

impl FlagExtractor {
    pub fn new() -> Self {
        FlagExtractor
    }

    /// Every flag token in `command`, in order of appearance
    pub fn extract(&self, command: &str) -> Vec<String> {
        flag_regex()
            .captures_iter(command)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .collect()
    }
}

/// Shorthand for `FlagExtractor::new().extract(command)`
pub fn extract_flags(command: &str) -> Vec<String> {
    FlagExtractor::new().extract(command)
}
