//! Glob patterns compiled to anchored regular expressions
//!
//! Only two metacharacters are recognized: `*` matches any run of
//! characters (including none) and `?` matches exactly one character.
//! Everything else is escaped, so translation never produces an invalid
//! expression.
//!
//! Names are matched as text when they are valid UTF-8. Other names are
//! matched on their raw bytes, where `?` also accepts a single byte that
//! does not decode.

use regex::{Regex, RegexBuilder};
use std::borrow::Cow;
use std::ffi::OsStr;
use std::fmt;
use tracing::warn;

/// Byte-level stand-ins for `*` and `?`
const RAW_ANY_RUN: &str = "(?s-u:.)*";
const RAW_ANY_ONE: &str = "(?:(?s:.)|(?s-u:.))";

/// A compiled name pattern
#[derive(Clone)]
pub struct CompiledPattern {
    glob: String,
    case_insensitive: bool,
    /// `None` only if the regex engine refused the expression (size limit);
    /// such a pattern never matches.
    text: Option<Regex>,
    raw: Option<regex::bytes::Regex>,
}

impl CompiledPattern {
    /// Compile a case-sensitive pattern
    pub fn new(glob: &str) -> Self {
        Self::compile(glob, false)
    }

    /// Compile a case-insensitive pattern
    pub fn new_case_insensitive(glob: &str) -> Self {
        Self::compile(glob, true)
    }

    fn compile(glob: &str, case_insensitive: bool) -> Self {
        let text = RegexBuilder::new(&glob_to_regex(glob))
            .case_insensitive(case_insensitive)
            .dot_matches_new_line(true)
            .build();
        let raw = regex::bytes::RegexBuilder::new(&translate(glob, RAW_ANY_RUN, RAW_ANY_ONE))
            .case_insensitive(case_insensitive)
            .dot_matches_new_line(true)
            .build();

        let (text, raw) = match (text, raw) {
            (Ok(text), Ok(raw)) => (Some(text), Some(raw)),
            (Err(e), _) | (_, Err(e)) => {
                warn!(pattern = glob, error = %e, "Pattern rejected, it will never match");
                (None, None)
            }
        };

        Self {
            glob: glob.to_string(),
            case_insensitive,
            text,
            raw,
        }
    }

    /// Check whether `name` matches the whole pattern
    pub fn is_match(&self, name: impl AsRef<OsStr>) -> bool {
        let name = name.as_ref();
        match name.to_str() {
            Some(text) => self.text.as_ref().is_some_and(|re| re.is_match(text)),
            None => {
                let bytes = raw_bytes(name);
                self.raw.as_ref().is_some_and(|re| re.is_match(&bytes))
            }
        }
    }
}

impl fmt::Debug for CompiledPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledPattern")
            .field("glob", &self.glob)
            .field("case_insensitive", &self.case_insensitive)
            .finish()
    }
}

#[cfg(unix)]
fn raw_bytes(name: &OsStr) -> Cow<'_, [u8]> {
    use std::os::unix::ffi::OsStrExt;

    Cow::Borrowed(name.as_bytes())
}

#[cfg(not(unix))]
fn raw_bytes(name: &OsStr) -> Cow<'_, [u8]> {
    Cow::Owned(name.to_string_lossy().into_owned().into_bytes())
}

/// Translate a glob into an anchored regular expression
pub fn glob_to_regex(glob: &str) -> String {
    translate(glob, ".*", ".")
}

fn translate(glob: &str, any_run: &str, any_one: &str) -> String {
    let mut expr = String::with_capacity(glob.len() * 2 + 8);
    expr.push_str("^(?:");

    let mut literal = String::new();
    for c in glob.chars() {
        match c {
            '*' | '?' => {
                if !literal.is_empty() {
                    expr.push_str(&regex::escape(&literal));
                    literal.clear();
                }
                expr.push_str(if c == '*' { any_run } else { any_one });
            }
            _ => literal.push(c),
        }
    }
    if !literal.is_empty() {
        expr.push_str(&regex::escape(&literal));
    }

    expr.push_str(")$");
    expr
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glob_translation() {
        assert_eq!(glob_to_regex("*.txt"), r"^(?:.*\.txt)$");
        assert_eq!(glob_to_regex("a?c"), "^(?:a.c)$");
        assert_eq!(glob_to_regex(""), "^(?:)$");
    }

    #[test]
    fn test_star_matches_any_run() {
        let p = CompiledPattern::new("*.txt");
        assert!(p.is_match("a.txt"));
        assert!(p.is_match(".txt"));
        assert!(!p.is_match("a.txt.bak"));
        assert!(!p.is_match("a.TXT"));
    }

    #[test]
    fn test_anchored_not_substring() {
        let p = CompiledPattern::new("b");
        assert!(p.is_match("b"));
        assert!(!p.is_match("abc"));
    }

    #[test]
    fn test_question_mark() {
        let p = CompiledPattern::new("file?.rs");
        assert!(p.is_match("file1.rs"));
        assert!(!p.is_match("file.rs"));
        assert!(!p.is_match("file12.rs"));
    }

    #[test]
    fn test_case_insensitive() {
        let p = CompiledPattern::new_case_insensitive("README*");
        assert!(p.is_match("readme.md"));
        assert!(p.is_match("ReadMe"));
        assert!(!CompiledPattern::new("README*").is_match("readme.md"));
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let p = CompiledPattern::new("a.c");
        assert!(p.is_match("a.c"));
        assert!(!p.is_match("abc"));

        // Would be an invalid regex if passed through unescaped
        let p = CompiledPattern::new("[(+");
        assert!(p.is_match("[(+"));
        assert!(!p.is_match("x"));
    }

    #[test]
    fn test_newline_in_name() {
        let p = CompiledPattern::new("a*b");
        assert!(p.is_match("a\nb"));
    }

    #[test]
    fn test_question_mark_is_one_character() {
        let p = CompiledPattern::new("a?b");
        assert!(p.is_match("aéb"));
        assert!(!p.is_match("aéeb"));
        assert!(CompiledPattern::new("??").is_match("éé"));
        assert!(!CompiledPattern::new("a??b").is_match("aéb"));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_names() {
        use std::os::unix::ffi::OsStrExt;

        let raw = OsStr::from_bytes(b"a\xffb");
        assert!(CompiledPattern::new("a?b").is_match(raw));
        assert!(CompiledPattern::new("*b").is_match(raw));
        assert!(CompiledPattern::new_case_insensitive("A*").is_match(raw));
        assert!(!CompiledPattern::new("a??b").is_match(raw));

        // A lossy conversion would turn the invalid byte into U+FFFD
        assert!(!CompiledPattern::new("a\u{FFFD}b").is_match(raw));
    }
}
