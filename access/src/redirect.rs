//! Open-redirect guard for post-login destinations.

/// Fallback when a requested destination is rejected.
pub const DEFAULT_RETURN_PATH: &str = "/";

/// Return `candidate` only when it is a same-origin relative path.
///
/// Accepted values start with exactly one `/`. Protocol-relative (`//host`),
/// absolute (`https://host`), backslash tricks (`/\host`) and control
/// characters all yield `fallback`.
#[must_use]
pub fn safe_return_url<'a>(candidate: &'a str, fallback: &'a str) -> &'a str {
    if is_safe_relative(candidate) { candidate } else { fallback }
}

fn is_safe_relative(candidate: &str) -> bool {
    candidate.starts_with('/')
        && !candidate.starts_with("//")
        && !candidate.contains('\\')
        && !candidate.chars().any(char::is_control)
}

#[cfg(test)]
#[path = "redirect_test.rs"]
mod tests;
