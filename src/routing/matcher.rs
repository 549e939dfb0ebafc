//! Route matching logic.
//!
//! # Responsibilities
//! - Match request path prefix (case-sensitive)
//! - Apply path prefix rewrites before forwarding
//!
//! # Design Decisions
//! - Path matching is a plain string prefix test, so "/api" also matches "/apiv2"
//! - Rewrite keys may carry a leading '^' anchor; it is implied and ignored
//! - No regex to guarantee O(n) matching
//! - Paths with `.` or `..` segments are not forwarded: URL normalization
//!   would move them out of the matched prefix upstream

use percent_encoding::percent_decode_str;

/// Matches the request path prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Returns true if the path starts with this prefix.
    pub fn matches(&self, path: &str) -> bool {
        path.starts_with(&self.prefix)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Specificity used to order matchers; longer prefixes win.
    pub fn specificity(&self) -> usize {
        self.prefix.len()
    }
}

/// Ordered list of prefix replacements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathRewrite {
    rules: Vec<(String, String)>,
}

impl PathRewrite {
    pub fn new<I, K, V>(rules: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        Self {
            rules: rules
                .into_iter()
                .map(|(from, to)| (from.as_ref().trim_start_matches('^').to_string(), to.into()))
                .collect(),
        }
    }

    /// Rewrite `path` with the first rule whose key prefixes it.
    ///
    /// The result always starts with '/' unless it is empty.
    pub fn apply(&self, path: &str) -> String {
        let rewritten = self
            .rules
            .iter()
            .find_map(|(from, to)| path.strip_prefix(from.as_str()).map(|rest| format!("{to}{rest}")))
            .unwrap_or_else(|| path.to_string());

        if rewritten.is_empty() || rewritten.starts_with('/') {
            rewritten
        } else {
            format!("/{rewritten}")
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// True if any segment of `path`, percent-decoded, is `.` or `..`.
///
/// Backslashes count as separators since URL parsers treat them as `/`
/// for http(s).
pub fn has_dot_segments(path: &str) -> bool {
    path.split(['/', '\\']).any(|raw| {
        let segment = percent_decode_str(raw).decode_utf8_lossy();
        segment == "." || segment == ".."
    })
}
