//! Session transport: authenticated GETs against the portal origin.
//!
//! The walker and the sink only see the [`Transport`] trait. [`Session`] is the
//! libcurl-backed implementation; it is blocking, so async callers go through
//! `spawn_blocking` (see [`fetch_blocking`]).

mod cookies;
mod session;

pub use cookies::{SessionCookies, COOKIE_OCF, COOKIE_OCY, COOKIE_OLOGIN, COOKIE_OPASSWORD};
pub use session::Session;

use std::sync::Arc;
use thiserror::Error;
use url::Url;

/// A GET against the portal failed. Carries the offending URL; never retried.
#[derive(Debug, Error)]
#[error("GET {url} failed: {kind}")]
pub struct TransportError {
    pub url: String,
    #[source]
    pub kind: TransportErrorKind,
}

#[derive(Debug, Error)]
pub enum TransportErrorKind {
    /// Target could not be turned into a URL under the portal origin.
    #[error("invalid target: {0}")]
    InvalidTarget(String),
    /// libcurl reported an error (timeout, connection, TLS, ...).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// Response had a non-2xx status.
    #[error("HTTP {0}")]
    Http(u32),
    /// The blocking fetch task was cancelled or panicked.
    #[error("fetch task aborted: {0}")]
    Aborted(String),
}

impl TransportError {
    pub fn new(url: impl Into<String>, kind: impl Into<TransportErrorKind>) -> Self {
        Self {
            url: url.into(),
            kind: kind.into(),
        }
    }

    /// HTTP status, if the failure was a non-2xx response.
    pub fn status(&self) -> Option<u32> {
        match self.kind {
            TransportErrorKind::Http(code) => Some(code),
            _ => None,
        }
    }
}

/// Blocking page/file source rooted at one portal origin.
pub trait Transport: Send + Sync {
    /// Portal origin every relative target is resolved against.
    fn origin(&self) -> &Url;

    /// GET `target` (absolute under the origin, or relative to it) and return the body.
    fn fetch(&self, target: &str) -> Result<Vec<u8>, TransportError>;

    /// Resolve `target` to an absolute URL under [`Transport::origin`].
    fn resolve(&self, target: &str) -> Result<Url, TransportError> {
        resolve_target(self.origin(), target)
    }
}

/// Absolute targets must share the origin; anything else is appended to it.
///
/// `"/excel/a.xlsx"`, `"excel/a.xlsx"` and `"{origin}/excel/a.xlsx"` all land
/// on the same URL.
pub fn resolve_target(origin: &Url, target: &str) -> Result<Url, TransportError> {
    if let Ok(absolute) = Url::parse(target) {
        if absolute.origin() == origin.origin() {
            return Ok(absolute);
        }
        return Err(TransportError::new(
            target,
            TransportErrorKind::InvalidTarget(format!("outside portal origin {}", origin)),
        ));
    }

    let base = origin.as_str().trim_end_matches('/');
    let path = target.trim_start_matches('/');
    let joined = format!("{base}/{path}");
    Url::parse(&joined).map_err(|e| {
        TransportError::new(joined.as_str(), TransportErrorKind::InvalidTarget(e.to_string()))
    })
}

/// Runs [`Transport::fetch`] on the blocking pool.
pub async fn fetch_blocking(
    transport: Arc<dyn Transport>,
    target: String,
) -> Result<Vec<u8>, TransportError> {
    let url = target.clone();
    tokio::task::spawn_blocking(move || transport.fetch(&target))
        .await
        .map_err(|e| TransportError::new(url, TransportErrorKind::Aborted(e.to_string())))?
}
