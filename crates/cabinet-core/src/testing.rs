//! In-memory portal used by unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use url::Url;

use crate::handler::{parse_handler, NavigationRequest};
use crate::transport::{resolve_target, Transport, TransportError, TransportErrorKind};

/// Serves fixed bodies by absolute URL; unknown URLs answer 404.
pub(crate) struct StaticPortal {
    origin: Url,
    pages: HashMap<String, Vec<u8>>,
    failing: HashSet<String>,
    requests: Mutex<Vec<String>>,
}

impl StaticPortal {
    pub(crate) fn new(origin: &str) -> Self {
        Self {
            origin: Url::parse(origin).unwrap(),
            pages: HashMap::new(),
            failing: HashSet::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn origin_url(&self) -> Url {
        self.origin.clone()
    }

    pub(crate) fn with_page(mut self, target: &str, body: impl Into<Vec<u8>>) -> Self {
        self.add_page(target, body);
        self
    }

    pub(crate) fn add_page(&mut self, target: &str, body: impl Into<Vec<u8>>) {
        let url = resolve_target(&self.origin, target).unwrap();
        self.pages.insert(url.to_string(), body.into());
    }

    /// Page served for the request a handler drills into.
    pub(crate) fn add_drill_page(&mut self, handler: &str, body: impl Into<Vec<u8>>) {
        let request = NavigationRequest::build(&self.origin, &parse_handler(handler).unwrap());
        self.pages.insert(request.to_string(), body.into());
    }

    /// Make the request a handler drills into fail with HTTP 500.
    pub(crate) fn fail_drill(&mut self, handler: &str) {
        let request = NavigationRequest::build(&self.origin, &parse_handler(handler).unwrap());
        self.failing.insert(request.to_string());
    }

    pub(crate) fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl Transport for StaticPortal {
    fn origin(&self) -> &Url {
        &self.origin
    }

    fn fetch(&self, target: &str) -> Result<Vec<u8>, TransportError> {
        let url = resolve_target(&self.origin, target)?.to_string();
        self.requests.lock().unwrap().push(url.clone());
        if self.failing.contains(&url) {
            return Err(TransportError::new(url, TransportErrorKind::Http(500)));
        }
        match self.pages.get(&url) {
            Some(body) => Ok(body.clone()),
            None => Err(TransportError::new(url, TransportErrorKind::Http(404))),
        }
    }
}

pub(crate) fn jumper(id: &str, container_base: &str) -> String {
    format!(r#"reopenJumper("{id}", "0", "3", "7", "1", "{container_base}")"#)
}

/// Row list page with one expandable row per handler.
pub(crate) fn row_list(handlers: &[String]) -> String {
    let rows: String = handlers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            format!(
                "<tr id=\"tr{i}\"><td>row {i}</td><td><button onclick='{h}'>+</button></td></tr>"
            )
        })
        .collect();
    format!("<html><body><table>{rows}</table></body></html>")
}

/// Download listing page, optionally with an attachment anchor.
pub(crate) fn download_listing(href: Option<&str>) -> String {
    let anchor = href
        .map(|h| format!("<a href=\"{h}\">download</a>"))
        .unwrap_or_default();
    format!("<html><body><div class=\"upload\">{anchor}</div></body></html>")
}

/// Fills `portal` with a complete tree of row lists `depth` levels deep and
/// `branching` wide, whose leaves are download listings. Returns the root page
/// body and the links the leaves carry.
pub(crate) fn build_tree(
    portal: &mut StaticPortal,
    depth: u32,
    branching: usize,
) -> (String, Vec<String>) {
    fn level(
        portal: &mut StaticPortal,
        prefix: &str,
        level_no: u32,
        depth: u32,
        branching: usize,
        links: &mut Vec<String>,
    ) -> Vec<String> {
        let mut handlers = Vec::new();
        for i in 0..branching {
            let id = if prefix.is_empty() {
                i.to_string()
            } else {
                format!("{prefix}.{i}")
            };
            if level_no == depth {
                let handler = jumper(&id, "jupload");
                let href = format!("/excel/{id}/rep_{id}.xlsx");
                portal.add_drill_page(&handler, download_listing(Some(&href)));
                links.push(href);
                handlers.push(handler);
            } else {
                let handler = jumper(&id, "jslist");
                let children = level(portal, &id, level_no + 1, depth, branching, links);
                portal.add_drill_page(&handler, row_list(&children));
                handlers.push(handler);
            }
        }
        handlers
    }

    let mut links = Vec::new();
    if depth == 0 {
        return (row_list(&[]), links);
    }
    let root_handlers = level(portal, "", 1, depth, branching, &mut links);
    (row_list(&root_handlers), links)
}
