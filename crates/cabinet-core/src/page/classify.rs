//! Decide what a response is from the request that produced it.

use crate::handler::NavigationRequest;

/// Container marker of a row list response.
pub const ROW_LIST_CONTAINER: &str = "jslisttr";
/// Container marker of a download listing response.
pub const DOWNLOAD_CONTAINER: &str = "juploadtr";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    /// Rows that may expand further.
    RowList,
    /// A listing carrying at most one attachment link.
    DownloadListing,
    /// Unknown or empty marker: nothing to do.
    Unknown,
}

impl ContainerKind {
    pub fn from_marker(container: &str) -> Self {
        match container {
            ROW_LIST_CONTAINER => ContainerKind::RowList,
            DOWNLOAD_CONTAINER => ContainerKind::DownloadListing,
            _ => ContainerKind::Unknown,
        }
    }

    /// Reads the request's `container` parameter, never the response.
    pub fn of(request: &NavigationRequest) -> Self {
        Self::from_marker(&request.container())
    }
}
