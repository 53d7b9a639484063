//! URL handling module for Tululu-Harvest
//!
//! Catalog page addressing, link resolution against the page a link was
//! found on, and the final-segment rule used to name downloaded images.

use ::url::Url;

/// URL of the category root, e.g. `https://tululu.org/l55/`
///
/// The root page carries the pagination control used to discover the last
/// catalog page.
pub fn category_url(base_url: &Url, category_id: u32) -> Result<Url, ::url::ParseError> {
    base_url.join(&format!("/l{}/", category_id))
}

/// URL of one catalog page, e.g. `https://tululu.org/l55/3/`
pub fn catalog_page_url(
    base_url: &Url,
    category_id: u32,
    page: u32,
) -> Result<Url, ::url::ParseError> {
    base_url.join(&format!("/l{}/{}/", category_id, page))
}

/// Resolves a link href found on `base_url` to an absolute URL
///
/// Returns None for empty hrefs, fragment-only links and anything that does
/// not resolve to an HTTP(S) URL.
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) => {
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                Some(absolute_url)
            } else {
                None
            }
        }
        Err(_) => None,
    }
}

/// Final segment of the URL path, the query string is ignored
///
/// `https://tululu.org/shots/9.jpg?v=2` gives `9.jpg`. Returns None when the
/// path ends with a slash.
pub fn last_path_segment(url: &Url) -> Option<&str> {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://tululu.org/").unwrap()
    }

    #[test]
    fn test_category_url() {
        let url = category_url(&base(), 55).unwrap();
        assert_eq!(url.as_str(), "https://tululu.org/l55/");
    }

    #[test]
    fn test_catalog_page_url() {
        let url = catalog_page_url(&base(), 55, 7).unwrap();
        assert_eq!(url.as_str(), "https://tululu.org/l55/7/");
    }

    #[test]
    fn test_catalog_page_url_ignores_base_path() {
        let base = Url::parse("http://127.0.0.1:8080/some/path").unwrap();
        let url = catalog_page_url(&base, 55, 1).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/l55/1/");
    }

    #[test]
    fn test_resolve_relative_link() {
        let page = Url::parse("https://tululu.org/l55/2/").unwrap();
        let url = resolve_link("/b239/", &page).unwrap();
        assert_eq!(url.as_str(), "https://tululu.org/b239/");
    }

    #[test]
    fn test_resolve_absolute_link() {
        let page = Url::parse("https://tululu.org/b1/").unwrap();
        let url = resolve_link("https://tululu.org/txt.php?id=1", &page).unwrap();
        assert_eq!(url.as_str(), "https://tululu.org/txt.php?id=1");
    }

    #[test]
    fn test_skip_fragment_and_empty() {
        let page = Url::parse("https://tululu.org/b1/").unwrap();
        assert!(resolve_link("#top", &page).is_none());
        assert!(resolve_link("   ", &page).is_none());
    }

    #[test]
    fn test_skip_non_http_scheme() {
        let page = Url::parse("https://tululu.org/b1/").unwrap();
        assert!(resolve_link("mailto:admin@tululu.org", &page).is_none());
        assert!(resolve_link("javascript:void(0)", &page).is_none());
    }

    #[test]
    fn test_last_path_segment() {
        let url = Url::parse("https://tululu.org/shots/9.jpg").unwrap();
        assert_eq!(last_path_segment(&url), Some("9.jpg"));
    }

    #[test]
    fn test_last_path_segment_ignores_query() {
        let url = Url::parse("https://tululu.org/images/nopic.gif?v=2").unwrap();
        assert_eq!(last_path_segment(&url), Some("nopic.gif"));
    }

    #[test]
    fn test_last_path_segment_trailing_slash() {
        let url = Url::parse("https://tululu.org/shots/").unwrap();
        assert_eq!(last_path_segment(&url), None);
    }
}
