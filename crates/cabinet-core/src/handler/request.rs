//! Build the `edit.php` navigation URL from a parsed handler.

use std::fmt;

use url::Url;

use super::parse::{parse_handler, DrillHandlerCall, MalformedHandlerError};

/// Endpoint that renders nested listings, relative to the portal origin.
pub const EDIT_PATH: &str = "/object/ajax/edit.php";

/// Appended to the container name so the portal answers with a sub-listing.
pub const SUB_LISTING_SUFFIX: &str = "tr";

/// Fixed `edulevel` query value.
pub const EDU_LEVEL: &str = "2";

/// A request for one nested listing. Identity is the URL string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NavigationRequest {
    url: Url,
}

impl NavigationRequest {
    /// Maps the handler's fields onto `id, pid, type, form, reqtype, container, edulevel`.
    ///
    /// Deterministic: the same origin and call always produce the same URL.
    /// A path on `origin` is kept as a prefix of [`EDIT_PATH`].
    pub fn build(origin: &Url, call: &DrillHandlerCall) -> Self {
        let mut url = origin.clone();
        let base = origin.path().trim_end_matches('/');
        url.set_path(&format!("{base}{EDIT_PATH}"));
        url.set_query(None);
        url.set_fragment(None);

        let container = format!("{}{}", call.container_base, SUB_LISTING_SUFFIX);
        url.query_pairs_mut()
            .append_pair("id", &call.record_id)
            .append_pair("pid", &call.parent_id)
            .append_pair("type", &call.record_type)
            .append_pair("form", &call.form_id)
            .append_pair("reqtype", &call.request_type)
            .append_pair("container", &container)
            .append_pair("edulevel", EDU_LEVEL);

        Self { url }
    }

    /// Parses `handler` and builds the request. Nothing is built on parse failure.
    pub fn from_handler(origin: &Url, handler: &str) -> Result<Self, MalformedHandlerError> {
        let call = parse_handler(handler)?;
        Ok(Self::build(origin, &call))
    }

    #[cfg(test)]
    pub(crate) fn from_url(url: Url) -> Self {
        Self { url }
    }

    /// The `container` query value; empty when absent.
    pub fn container(&self) -> String {
        self.url
            .query_pairs()
            .find(|(k, _)| k == "container")
            .map(|(_, v)| v.into_owned())
            .unwrap_or_default()
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }
}

impl fmt::Display for NavigationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}
