//! HTML extraction for catalog and book pages
//!
//! Pure functions over a parsed document, no I/O:
//! - Book links of a catalog page
//! - Last page number from the catalog's pagination control
//! - Text download link of a book page
//! - Title, author, cover, comments and genres of a book page

use crate::storage::{sanitize_filename, MAX_BOOK_NAME_BYTES};
use crate::url::resolve_link;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use url::Url;

/// One listing entry on a catalog page
const CATALOG_ENTRY: &str = ".d_book";

/// Pagination links of a catalog page
const PAGINATION: &str = ".npage";

/// Position of the pagination element holding the last page number
const LAST_PAGE_INDEX: usize = 5;

/// Download link of the text body, inside the book metadata table
const TEXT_LINK: &str = r#"table.d_book tr a[href^="/txt"]"#;

const COVER_IMAGE: &str = ".bookimage img";
const COMMENT_BLOCK: &str = ".texts";
const COMMENT_TEXT: &str = ".black";
const GENRE_LINK: &str = "span.d_book a";

/// Separator between title and author in the book heading
pub const TITLE_SEPARATOR: &str = "::";

/// Structural problems found while extracting fields
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("Malformed catalog page: {0}")]
    MalformedCatalogPage(String),

    #[error("Malformed book page: {0}")]
    MalformedBookPage(String),

    #[error("Missing asset: {0}")]
    MissingAsset(String),

    #[error("Invalid selector '{0}'")]
    InvalidSelector(String),
}

/// Fields extracted from a book page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookPage {
    /// Sanitized, trimmed title (never empty)
    pub title: String,
    pub author: String,
    /// Absolute cover image URL
    pub img_src: Url,
    pub comments: Vec<String>,
    pub genres: Vec<String>,
}

fn selector(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|_| ExtractError::InvalidSelector(css.to_string()))
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>()
}

/// Extracts the book page links of a catalog page, in document order
///
/// The second anchor of every entry points at the book page (the first wraps
/// the cover). Entries without one are skipped.
pub fn extract_catalog_links(document: &Html, base_url: &Url) -> Result<Vec<Url>, ExtractError> {
    let entry_selector = selector(CATALOG_ENTRY)?;
    let anchor_selector = selector("a")?;

    let mut links = Vec::new();
    for entry in document.select(&entry_selector) {
        let href = entry
            .select(&anchor_selector)
            .nth(1)
            .and_then(|anchor| anchor.value().attr("href"));

        match href.and_then(|href| resolve_link(href, base_url)) {
            Some(url) => links.push(url),
            None => tracing::debug!("Catalog entry without a book link on {}", base_url),
        }
    }

    Ok(links)
}

/// Reads the last catalog page number from the pagination control
///
/// # Errors
///
/// `MalformedCatalogPage` when the control has fewer than six elements or the
/// element does not hold a number.
pub fn extract_last_page_number(document: &Html) -> Result<u32, ExtractError> {
    let pagination_selector = selector(PAGINATION)?;

    let element = document
        .select(&pagination_selector)
        .nth(LAST_PAGE_INDEX)
        .ok_or_else(|| {
            ExtractError::MalformedCatalogPage(format!(
                "expected at least {} pagination elements",
                LAST_PAGE_INDEX + 1
            ))
        })?;

    let text = element_text(element);
    text.trim().parse::<u32>().map_err(|_| {
        ExtractError::MalformedCatalogPage(format!("pagination element '{}' is not a number", text.trim()))
    })
}

/// Finds the text download link of a book page
///
/// # Errors
///
/// `MissingAsset` when the page offers no text download.
pub fn extract_text_download_link(document: &Html, page_url: &Url) -> Result<Url, ExtractError> {
    let link_selector = selector(TEXT_LINK)?;

    document
        .select(&link_selector)
        .next()
        .and_then(|anchor| anchor.value().attr("href"))
        .and_then(|href| resolve_link(href, page_url))
        .ok_or_else(|| ExtractError::MissingAsset(format!("no text download on {}", page_url)))
}

/// Splits a book heading into sanitized title and trimmed author
///
/// `"Title Name :: Author Name"` gives `("Title Name", "Author Name")`.
///
/// # Errors
///
/// `MalformedBookPage` unless the heading holds exactly one separator, or if
/// nothing of the title survives sanitization.
pub fn split_heading(heading: &str) -> Result<(String, String), ExtractError> {
    let mut parts = heading.split(TITLE_SEPARATOR);
    let (title, author) = match (parts.next(), parts.next(), parts.next()) {
        (Some(title), Some(author), None) => (title, author),
        _ => {
            return Err(ExtractError::MalformedBookPage(format!(
                "heading '{}' must contain exactly one '{}'",
                heading.trim(),
                TITLE_SEPARATOR
            )))
        }
    };

    let title = sanitize_filename(title, MAX_BOOK_NAME_BYTES);
    if title.is_empty() {
        return Err(ExtractError::MalformedBookPage(format!(
            "heading '{}' has an empty title",
            heading.trim()
        )));
    }

    Ok((title, author.trim().to_string()))
}

/// Extracts the description fields of a book page
///
/// # Errors
///
/// `MalformedBookPage` when the heading or the cover image is missing or
/// unusable.
pub fn extract_book_description(document: &Html, page_url: &Url) -> Result<BookPage, ExtractError> {
    let heading_selector = selector("h1")?;
    let heading = document
        .select(&heading_selector)
        .next()
        .map(element_text)
        .ok_or_else(|| ExtractError::MalformedBookPage(format!("no heading on {}", page_url)))?;
    let (title, author) = split_heading(&heading)?;

    let cover_selector = selector(COVER_IMAGE)?;
    let img_src = document
        .select(&cover_selector)
        .next()
        .and_then(|img| img.value().attr("src"))
        .and_then(|src| resolve_link(src, page_url))
        .ok_or_else(|| ExtractError::MalformedBookPage(format!("no cover image on {}", page_url)))?;

    let block_selector = selector(COMMENT_BLOCK)?;
    let comment_selector = selector(COMMENT_TEXT)?;
    let comments = document
        .select(&block_selector)
        .filter_map(|block| block.select(&comment_selector).next())
        .map(element_text)
        .collect();

    let genre_selector = selector(GENRE_LINK)?;
    let genres = document
        .select(&genre_selector)
        .map(element_text)
        .collect();

    Ok(BookPage {
        title,
        author,
        img_src,
        comments,
        genres,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_url() -> Url {
        Url::parse("https://tululu.org/b239/").unwrap()
    }

    const BOOK_PAGE: &str = r#"
        <html><body>
        <div id="content">
            <h1>Алиби&nbsp;   ::   &nbsp;Агата Кристи</h1>
            <div class="bookimage"><a href="/b239/"><img src="/shots/239.jpg" alt="Алиби"></a></div>
            <table class="d_book"><tr><td>
                <a href="/read239/">читать</a>
                <a href="/txt.php?id=239">скачать txt</a>
            </td></tr></table>
            <span class="d_book"><b>Жанр книги:</b>
                <a href="/l55/">Научная фантастика</a>,
                <a href="/l17/">Детективы</a>
            </span>
            <div class="texts"><b>Читатель</b><br><span class="black">Отличная книга!</span></div>
            <div class="texts"><b>Гость</b><br><span class="black">Так себе.</span></div>
        </div>
        </body></html>
    "#;

    fn catalog_page(entries: usize) -> String {
        let cards: String = (1..=entries)
            .map(|id| {
                format!(
                    r#"<table class="d_book"><tr><td><a href="/b{id}/"><img src="/shots/{id}.jpg"></a></td>
                       <td><a href="/b{id}/">Book {id}</a></td></tr></table>"#
                )
            })
            .collect();
        format!("<html><body>{}</body></html>", cards)
    }

    fn pagination(count: usize) -> String {
        let links: String = (1..=count)
            .map(|n| format!(r#"<a class="npage" href="/l55/{n}/">{n}</a>"#))
            .collect();
        format!(r#"<html><body><p class="center">{}</p></body></html>"#, links)
    }

    #[test]
    fn test_extract_catalog_links_in_order() {
        let base = Url::parse("https://tululu.org/l55/1/").unwrap();
        let document = Html::parse_document(&catalog_page(3));
        let links = extract_catalog_links(&document, &base).unwrap();

        let links: Vec<&str> = links.iter().map(Url::as_str).collect();
        assert_eq!(
            links,
            vec![
                "https://tululu.org/b1/",
                "https://tululu.org/b2/",
                "https://tululu.org/b3/"
            ]
        );
    }

    #[test]
    fn test_extract_catalog_links_uses_second_anchor() {
        let base = Url::parse("https://tululu.org/l55/1/").unwrap();
        let html = r#"<html><body><table class="d_book"><tr>
            <td><a href="/cover-only/"><img src="/shots/1.jpg"></a></td>
            <td><a href="/b77/">Book</a></td></tr></table></body></html>"#;
        let links = extract_catalog_links(&Html::parse_document(html), &base).unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].as_str(), "https://tululu.org/b77/");
    }

    #[test]
    fn test_extract_catalog_links_skips_entry_without_book_link() {
        let base = Url::parse("https://tululu.org/l55/1/").unwrap();
        let html = r#"<html><body>
            <table class="d_book"><tr><td><a href="/b1/">only one</a></td></tr></table>
            <table class="d_book"><tr><td><a href="/b2/">c</a><a href="/b2/">Book</a></td></tr></table>
            </body></html>"#;
        let links = extract_catalog_links(&Html::parse_document(html), &base).unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].as_str(), "https://tululu.org/b2/");
    }

    #[test]
    fn test_extract_catalog_links_empty_page() {
        let base = Url::parse("https://tululu.org/l55/1/").unwrap();
        let document = Html::parse_document("<html><body></body></html>");
        assert!(extract_catalog_links(&document, &base).unwrap().is_empty());
    }

    #[test]
    fn test_last_page_number_reads_sixth_control() {
        let document = Html::parse_document(&pagination(8));
        assert_eq!(extract_last_page_number(&document).unwrap(), 6);
    }

    #[test]
    fn test_last_page_number_with_exactly_six_controls() {
        let html = r#"<html><body>
            <a class="npage">1</a><a class="npage">2</a><a class="npage">3</a>
            <a class="npage">4</a><a class="npage">5</a><a class="npage"> 701 </a>
            </body></html>"#;
        let document = Html::parse_document(html);
        assert_eq!(extract_last_page_number(&document).unwrap(), 701);
    }

    #[test]
    fn test_last_page_number_too_few_controls() {
        let document = Html::parse_document(&pagination(5));
        assert!(matches!(
            extract_last_page_number(&document),
            Err(ExtractError::MalformedCatalogPage(_))
        ));
    }

    #[test]
    fn test_last_page_number_not_numeric() {
        let html = r#"<html><body>
            <a class="npage">1</a><a class="npage">2</a><a class="npage">3</a>
            <a class="npage">4</a><a class="npage">5</a><a class="npage">next</a>
            </body></html>"#;
        assert!(matches!(
            extract_last_page_number(&Html::parse_document(html)),
            Err(ExtractError::MalformedCatalogPage(_))
        ));
    }

    #[test]
    fn test_extract_text_download_link() {
        let document = Html::parse_document(BOOK_PAGE);
        let url = extract_text_download_link(&document, &page_url()).unwrap();
        assert_eq!(url.as_str(), "https://tululu.org/txt.php?id=239");
    }

    #[test]
    fn test_missing_text_download_link() {
        let html = r#"<html><body><table class="d_book"><tr><td>
            <a href="/read239/">читать</a></td></tr></table></body></html>"#;
        let result = extract_text_download_link(&Html::parse_document(html), &page_url());
        assert!(matches!(result, Err(ExtractError::MissingAsset(_))));
    }

    #[test]
    fn test_text_link_outside_metadata_table_ignored() {
        let html = r#"<html><body><a href="/txt.php?id=1">txt</a></body></html>"#;
        let result = extract_text_download_link(&Html::parse_document(html), &page_url());
        assert!(matches!(result, Err(ExtractError::MissingAsset(_))));
    }

    #[test]
    fn test_split_heading() {
        let (title, author) = split_heading("Title Name :: Author Name").unwrap();
        assert_eq!(title, "Title Name");
        assert_eq!(author, "Author Name");
    }

    #[test]
    fn test_split_heading_sanitizes_title() {
        let (title, author) = split_heading("  Кто? Я? ::  Автор  ").unwrap();
        assert_eq!(title, "Кто Я");
        assert_eq!(author, "Автор");
    }

    #[test]
    fn test_split_heading_long_title_fits_text_file_name() {
        let heading = format!("{}:: Составитель", "Сборник ".repeat(20));
        let (title, _) = split_heading(&heading).unwrap();
        assert!(title.len() <= MAX_BOOK_NAME_BYTES);
        assert!(title.starts_with("Сборник Сборник"));
    }

    #[test]
    fn test_split_heading_without_separator() {
        assert!(matches!(
            split_heading("Title Name - Author Name"),
            Err(ExtractError::MalformedBookPage(_))
        ));
    }

    #[test]
    fn test_split_heading_with_two_separators() {
        assert!(matches!(
            split_heading("A :: B :: C"),
            Err(ExtractError::MalformedBookPage(_))
        ));
    }

    #[test]
    fn test_split_heading_empty_title() {
        assert!(matches!(
            split_heading(" ??? :: Author"),
            Err(ExtractError::MalformedBookPage(_))
        ));
    }

    #[test]
    fn test_extract_book_description() {
        let document = Html::parse_document(BOOK_PAGE);
        let page = extract_book_description(&document, &page_url()).unwrap();

        assert_eq!(page.title, "Алиби");
        assert_eq!(page.author, "Агата Кристи");
        assert_eq!(page.img_src.as_str(), "https://tululu.org/shots/239.jpg");
        assert_eq!(page.comments, vec!["Отличная книга!", "Так себе."]);
        assert_eq!(page.genres, vec!["Научная фантастика", "Детективы"]);
    }

    #[test]
    fn test_extract_book_description_without_comments_or_genres() {
        let html = r#"<html><body><h1>Solaris :: Stanisław Lem</h1>
            <div class="bookimage"><img src="/images/nopic.gif"></div></body></html>"#;
        let page = extract_book_description(&Html::parse_document(html), &page_url()).unwrap();

        assert_eq!(page.title, "Solaris");
        assert_eq!(page.author, "Stanisław Lem");
        assert_eq!(page.img_src.as_str(), "https://tululu.org/images/nopic.gif");
        assert!(page.comments.is_empty());
        assert!(page.genres.is_empty());
    }

    #[test]
    fn test_extract_book_description_without_heading() {
        let html = r#"<html><body><div class="bookimage"><img src="/shots/1.jpg"></div></body></html>"#;
        assert!(matches!(
            extract_book_description(&Html::parse_document(html), &page_url()),
            Err(ExtractError::MalformedBookPage(_))
        ));
    }

    #[test]
    fn test_extract_book_description_without_cover() {
        let html = r#"<html><body><h1>Solaris :: Lem</h1></body></html>"#;
        assert!(matches!(
            extract_book_description(&Html::parse_document(html), &page_url()),
            Err(ExtractError::MalformedBookPage(_))
        ));
    }
}
