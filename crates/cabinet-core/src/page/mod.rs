//! Portal page markup: find drill handlers, download links and the banner.
//!
//! Every query parses the body, reads what it needs and drops the document
//! before returning; `scraper::Html` is not `Send` and must never be held
//! across an `.await`.

mod classify;

pub use classify::ContainerKind;

use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

/// Rows whose `id` starts with this prefix are candidate drill-down rows.
pub const ROW_SELECTOR: &str = r#"tr[id^="tr"]"#;
/// Expand control inside a row; its `onclick` holds the drill handler.
pub const EXPAND_SELECTOR: &str = r#"button[onclick^="reopenJumper"]"#;
/// Attachment anchor on a download listing.
pub const DOWNLOAD_SELECTOR: &str = r#"a[href^="/excel/"]"#;
const HEADING_SELECTOR: &str = "h1";
const STATUS_SELECTOR: &str = r#"div p[id="youare"]"#;

/// Relative path of one attachment, e.g. `/excel/2023/oo1_2023_ORG.xlsx`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DownloadLink(pub String);

impl DownloadLink {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DownloadLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Texts the root page shows about the logged-in organisation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageBanner {
    pub heading: String,
    pub status: String,
}

#[derive(Debug, Error)]
#[error("invalid selector {selector:?}: {reason}")]
pub struct SelectorError {
    pub selector: &'static str,
    pub reason: String,
}

/// Compiled selectors for the portal's fixed markup. Build once and share.
#[derive(Debug)]
pub struct PortalMarkup {
    row: Selector,
    expand: Selector,
    download: Selector,
    heading: Selector,
    status: Selector,
}

fn compile(selector: &'static str) -> Result<Selector, SelectorError> {
    Selector::parse(selector).map_err(|e| SelectorError {
        selector,
        reason: format!("{e:?}"),
    })
}

fn parse(body: &[u8]) -> Html {
    Html::parse_document(&String::from_utf8_lossy(body))
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

impl PortalMarkup {
    pub fn new() -> Result<Self, SelectorError> {
        Ok(Self {
            row: compile(ROW_SELECTOR)?,
            expand: compile(EXPAND_SELECTOR)?,
            download: compile(DOWNLOAD_SELECTOR)?,
            heading: compile(HEADING_SELECTOR)?,
            status: compile(STATUS_SELECTOR)?,
        })
    }

    /// Handler text of every row's expand control, in document order.
    ///
    /// Rows without an expand control, or with an empty handler, are skipped:
    /// they are leaves already shown by this listing.
    pub fn drill_handlers(&self, body: &[u8]) -> Vec<String> {
        let doc = parse(body);
        let handlers: Vec<String> = doc
            .select(&self.row)
            .filter_map(|row| {
                row.select(&self.expand)
                    .next()
                    .and_then(|button| button.value().attr("onclick"))
                    .map(str::trim)
                    .filter(|handler| !handler.is_empty())
                    .map(str::to_string)
            })
            .collect();
        handlers
    }

    /// The first attachment anchor, if the listing has one yet.
    pub fn download_link(&self, body: &[u8]) -> Option<DownloadLink> {
        let doc = parse(body);
        let link = doc
            .select(&self.download)
            .next()
            .and_then(|a| a.value().attr("href"))
            .map(str::trim)
            .filter(|href| !href.is_empty())
            .map(|href| DownloadLink(href.to_string()));
        link
    }

    /// `h1` text and the "you are" status paragraph; empty strings when absent.
    pub fn banner(&self, body: &[u8]) -> PageBanner {
        let doc = parse(body);
        let heading = doc.select(&self.heading).map(element_text).collect::<Vec<_>>().join(" ");
        let status = doc.select(&self.status).map(element_text).collect::<Vec<_>>().join(" ");
        PageBanner { heading, status }
    }
}
