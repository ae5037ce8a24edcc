//! Link-header pagination.
//!
//! The platform paginates list endpoints and advertises the following page in an
//! RFC 8288 `Link` header:
//!
//! ```text
//! <https://lms.example/api/v1/courses/1/enrollments?page=2&per_page=100>; rel="next",
//! <https://lms.example/api/v1/courses/1/enrollments?page=1&per_page=100>; rel="first"
//! ```

use url::Url;

/// Returns the target of the `rel="next"` link, if any.
pub fn next_page_link(header: &str) -> Option<String> {
    header.split(',').find_map(|link| {
        let mut parts = link.split(';');
        let target = parts.next()?.trim();
        let target = target.strip_prefix('<')?.strip_suffix('>')?;
        let is_next = parts.any(|param| {
            let Some((key, value)) = param.split_once('=') else {
                return false;
            };
            key.trim().eq_ignore_ascii_case("rel")
                && value
                    .trim()
                    .trim_matches('"')
                    .split_whitespace()
                    .any(|rel| rel.eq_ignore_ascii_case("next"))
        });
        is_next.then(|| target.to_string())
    })
}

/// Resolves a next-page link against the URL of the page that advertised it.
pub fn resolve_next_page(current: &Url, link: &str) -> Result<Url, url::ParseError> {
    current.join(link)
}
