//! Article inclusion filter
//!
//! Listing pages link to more than articles: quizzes, practice tests,
//! category and tag listings, and dated archives. Every extraction strategy
//! runs its links through [`should_include`] before they enter the aggregate.

use regex::Regex;
use std::sync::LazyLock;

/// Case-insensitive tokens marking quiz and practice-test pages
const EXCLUDED_TOKENS: &[&str] = &[
    "quiz",
    "mcq",
    "multiple-choice",
    "practice-questions",
    "mock-test",
];

/// Path fragments of taxonomy listings
const EXCLUDED_PATHS: &[&str] = &["/category/", "/tag/"];

/// A path segment that begins with a four-digit year
static RE_YEAR_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/(?:19|20)\d{2}[^/]*/").unwrap());

/// Returns true if a candidate URL looks like an article worth fetching
///
/// A URL is rejected when it:
/// - contains a quiz/MCQ/practice-test token (case-insensitive)
/// - points at a `/category/` or `/tag/` listing
/// - is a year-style archive: a path segment starting with a four-digit year
///   and the URL ending in `/`
///
/// The filter is pure: the same input always gives the same answer.
///
/// # Examples
///
/// ```
/// use affairs_digest::url::should_include;
///
/// assert!(should_include("https://example.com/rbi-keeps-repo-rate-unchanged"));
/// assert!(!should_include("https://example.com/quiz-2024/"));
/// assert!(!should_include("https://example.com/2024/05/"));
/// ```
pub fn should_include(url: &str) -> bool {
    let lowered = url.to_lowercase();

    if EXCLUDED_TOKENS.iter().any(|token| lowered.contains(token)) {
        return false;
    }

    if EXCLUDED_PATHS.iter().any(|path| lowered.contains(path)) {
        return false;
    }

    !is_year_archive(&lowered)
}

/// Checks for a dated archive listing such as `/2024/` or `/2024/05/`
fn is_year_archive(url: &str) -> bool {
    if !url.ends_with('/') {
        return false;
    }

    let path = match url.find("://") {
        Some(scheme_end) => {
            let rest = &url[scheme_end + 3..];
            match rest.find('/') {
                Some(path_start) => &rest[path_start..],
                None => return false,
            }
        }
        None => url,
    };

    RE_YEAR_SEGMENT.is_match(path)
}
