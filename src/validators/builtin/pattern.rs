//! Translation of server-side (Ruby) regular expressions
//!
//! Patterns arrive as the server's string form of a regexp, e.g.
//! `(?-mix:^[a-z]+$)` or `(?i-mx:\Ahello\z)`. The translation is
//! deliberately approximate:
//!
//! * the `i`, `m` and `x` flags map to case-insensitive, dot-matches-newline
//!   and whitespace-insensitive mode;
//! * `^` and `$` always match at line boundaries, as they do in Ruby;
//! * `\Z` becomes `\z` (a trailing newline is no longer tolerated);
//! * `\h` and `\H` become hex-digit classes.
//!
//! Ruby-only constructs such as possessive quantifiers, lookaround,
//! backreferences and `\G` are not rewritten and make compilation fail,
//! which surfaces as a configuration error.

use crate::validators::ValidationError;
use regex::{Regex, RegexBuilder};
use tracing::debug;

#[derive(Debug, Default, PartialEq, Eq)]
struct Flags {
    case_insensitive: bool,
    dot_all: bool,
    extended: bool,
}

/// Split `(?on-off:source)` into flags and source
///
/// Anything not in that form is treated as a bare source with no flags.
fn split_flags(pattern: &str) -> (Flags, &str) {
    let inner = match pattern
        .strip_prefix("(?")
        .and_then(|rest| rest.strip_suffix(')'))
    {
        Some(inner) => inner,
        None => return (Flags::default(), pattern),
    };

    let (flags, source) = match inner.split_once(':') {
        Some(parts) => parts,
        None => return (Flags::default(), pattern),
    };
    if !flags.chars().all(|c| matches!(c, 'm' | 'i' | 'x' | '-')) {
        return (Flags::default(), pattern);
    }

    let on = flags.split('-').next().unwrap_or_default();
    (
        Flags {
            case_insensitive: on.contains('i'),
            dot_all: on.contains('m'),
            extended: on.contains('x'),
        },
        source,
    )
}

/// Rewrite escapes that differ between the two dialects
fn rewrite_escapes(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('Z') => out.push_str(r"\z"),
            Some('h') => out.push_str("[0-9a-fA-F]"),
            Some('H') => out.push_str("[^0-9a-fA-F]"),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Compile a server-side pattern string into a [`Regex`]
pub fn translate_pattern(pattern: &str) -> Result<Regex, ValidationError> {
    let (flags, source) = split_flags(pattern);
    let source = rewrite_escapes(source);
    debug!("Translated pattern {:?} to {:?} ({:?})", pattern, source, flags);

    RegexBuilder::new(&source)
        .case_insensitive(flags.case_insensitive)
        .dot_matches_new_line(flags.dot_all)
        .ignore_whitespace(flags.extended)
        .multi_line(true)
        .build()
        .map_err(|e| ValidationError::Config(format!("Invalid pattern {:?}: {}", pattern, e)))
}
