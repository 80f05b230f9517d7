//! libcurl-backed [`Transport`] carrying the portal session cookies.

use anyhow::{Context, Result};
use std::str;
use std::sync::RwLock;
use std::time::Duration;
use url::Url;

use crate::config::CabinetConfig;

use super::cookies::SessionCookies;
use super::{resolve_target, Transport, TransportError, TransportErrorKind};

/// Authenticated session against one portal origin.
///
/// Cookies given at construction are sent on every request; cookies the
/// portal sets in responses are kept and sent from then on, like a browser jar.
#[derive(Debug)]
pub struct Session {
    origin: Url,
    cookies: RwLock<SessionCookies>,
    connect_timeout: Duration,
    timeout: Duration,
    user_agent: Option<String>,
}

impl Session {
    /// Build a session for `cfg.origin`. Fails if the origin is not an http(s) base URL.
    pub fn from_config(cfg: &CabinetConfig, cookies: SessionCookies) -> Result<Self> {
        let origin = Url::parse(&cfg.origin)
            .with_context(|| format!("invalid portal origin: {}", cfg.origin))?;
        if origin.cannot_be_a_base() || !matches!(origin.scheme(), "http" | "https") {
            anyhow::bail!("portal origin must be an http(s) URL: {}", cfg.origin);
        }
        Ok(Self {
            origin,
            cookies: RwLock::new(cookies),
            connect_timeout: Duration::from_secs(cfg.connect_timeout_secs),
            timeout: Duration::from_secs(cfg.request_timeout_secs),
            user_agent: cfg.user_agent.clone(),
        })
    }

    /// Current cookie set, including any the portal has set.
    pub fn cookies(&self) -> SessionCookies {
        self.cookies
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn get(&self, url: &Url) -> Result<Vec<u8>, TransportErrorKind> {
        let mut body: Vec<u8> = Vec::new();
        let mut headers: Vec<String> = Vec::new();
        let cookie_header = self
            .cookies
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .header_value();

        let mut easy = curl::easy::Easy::new();
        easy.url(url.as_str())?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.timeout(self.timeout)?;
        if !cookie_header.is_empty() {
            easy.cookie(&cookie_header)?;
        }
        if let Some(agent) = &self.user_agent {
            easy.useragent(agent)?;
        }

        {
            let mut transfer = easy.transfer();
            transfer.header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    headers.push(s.trim_end().to_string());
                }
                true
            })?;
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        // Redirects are followed only while they stay on the portal.
        let landed = easy.effective_url()?.unwrap_or(url.as_str()).to_string();
        if !same_origin(&self.origin, &landed) {
            return Err(TransportErrorKind::InvalidTarget(format!(
                "redirected off the portal to {landed}"
            )));
        }

        {
            let mut jar = self.cookies.write().unwrap_or_else(|e| e.into_inner());
            for line in &headers {
                jar.absorb_set_cookie(line);
            }
        }

        let code = easy.response_code()?;
        if !(200..300).contains(&code) {
            return Err(TransportErrorKind::Http(code));
        }
        Ok(body)
    }
}

fn same_origin(origin: &Url, landed: &str) -> bool {
    Url::parse(landed)
        .map(|u| u.origin() == origin.origin())
        .unwrap_or(false)
}

impl Transport for Session {
    fn origin(&self) -> &Url {
        &self.origin
    }

    fn fetch(&self, target: &str) -> Result<Vec<u8>, TransportError> {
        let url = resolve_target(&self.origin, target)?;
        tracing::trace!(url = %url, "GET");
        self.get(&url)
            .map_err(|kind| TransportError::new(url.as_str(), kind))
    }
}
