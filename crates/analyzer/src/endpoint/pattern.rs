use grep_matcher::Matcher;
use grep_regex::{RegexMatcher, RegexMatcherBuilder};

use super::EndpointError;

/// Path segment standing in for a numeric user id.
pub const USER_ID_PLACEHOLDER: &str = "{user_id}";

const DIGITS: &str = "[0-9]+";

/// Turn a path pattern into a fully anchored regex string.
///
/// The first `{user_id}` (any letter case) becomes `[0-9]+`; the rest of
/// the pattern is used as-is.
///
/// ```rust,ignore
/// assert_eq!(compile_pattern("/api/users/{user_id}"), "^/api/users/[0-9]+$");
/// ```
pub fn compile_pattern(path_pattern: &str) -> String {
    // ASCII lowercasing keeps byte offsets aligned with the original
    let body = match path_pattern.to_ascii_lowercase().find(USER_ID_PLACEHOLDER) {
        Some(start) => format!(
            "{}{}{}",
            &path_pattern[..start],
            DIGITS,
            &path_pattern[start + USER_ID_PLACEHOLDER.len()..]
        ),
        None => path_pattern.to_string(),
    };
    format!("^{}$", body)
}

/// `METHOD:` followed by the compiled pattern; unique per registered route.
pub fn make_identifier(method: &str, path_pattern: &str) -> String {
    format!("{}:{}", method, compile_pattern(path_pattern))
}

/// A compiled, case-insensitive path matcher.
#[derive(Debug, Clone)]
pub struct PathPattern {
    compiled: String,
    matcher: RegexMatcher,
}

impl PathPattern {
    pub fn new(path_pattern: &str) -> Result<Self, EndpointError> {
        let compiled = compile_pattern(path_pattern);
        let matcher = RegexMatcherBuilder::new()
            .case_insensitive(true)
            .multi_line(false)
            .build(&compiled)
            .map_err(|e| EndpointError::InvalidPattern(e.to_string()))?;

        Ok(Self { compiled, matcher })
    }

    /// Whether the whole of `path` matches.
    #[inline]
    pub fn is_match(&self, path: &str) -> bool {
        self.matcher.is_match(path.as_bytes()).unwrap_or(false)
    }

    pub fn as_str(&self) -> &str {
        &self.compiled
    }
}
