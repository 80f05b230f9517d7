//! Session cookie set sent with every portal request.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use crate::config::ReportSelection;

pub const COOKIE_OLOGIN: &str = "ologin";
pub const COOKIE_OPASSWORD: &str = "opassword";
pub const COOKIE_OCF: &str = "ocf";
pub const COOKIE_OCY: &str = "ocy";

/// Ordered name/value pairs rendered as one `Cookie` header.
///
/// Ordering is by name so the header is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionCookies {
    pairs: BTreeMap<String, String>,
}

impl SessionCookies {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cookie set the portal's direct-login form produces for one report selection.
    pub fn portal_login(login: &str, password: &str, selection: &ReportSelection) -> Self {
        let mut cookies = Self::new();
        cookies.insert(COOKIE_OLOGIN, login);
        cookies.insert(COOKIE_OPASSWORD, password);
        cookies.insert("source", "direct");
        cookies.insert("ltype", "default");
        cookies.insert("ocel", "2");
        cookies.insert(COOKIE_OCF, &selection.report);
        cookies.insert(COOKIE_OCY, &selection.year);
        cookies
    }

    pub fn insert(&mut self, name: &str, value: &str) {
        self.pairs.insert(name.to_string(), value.to_string());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// `name=value; name2=value2`, or empty when there are no cookies.
    pub fn header_value(&self) -> String {
        self.pairs
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Apply one response header line if it is a `Set-Cookie`.
    ///
    /// Path and domain are ignored: the portal is a single origin. A cookie whose
    /// `Max-Age` is zero or negative, or whose `Expires` lies in the past, is
    /// removed from the jar (`Max-Age` wins when both are present).
    /// Returns true if the jar changed.
    pub fn absorb_set_cookie(&mut self, header_line: &str) -> bool {
        self.absorb_set_cookie_at(header_line, Utc::now())
    }

    fn absorb_set_cookie_at(&mut self, header_line: &str, now: DateTime<Utc>) -> bool {
        let Some((name, value)) = header_line.trim().split_once(':') else {
            return false;
        };
        if !name.trim().eq_ignore_ascii_case("set-cookie") {
            return false;
        }
        let mut parts = value.split(';');
        let pair = parts.next().unwrap_or("").trim();
        let Some((k, v)) = pair.split_once('=') else {
            return false;
        };
        let k = k.trim();
        if k.is_empty() {
            return false;
        }

        let mut max_age: Option<i64> = None;
        let mut expires: Option<DateTime<Utc>> = None;
        for attr in parts {
            let (attr_name, attr_value) = attr.split_once('=').unwrap_or((attr, ""));
            let attr_value = attr_value.trim();
            match attr_name.trim().to_ascii_lowercase().as_str() {
                "max-age" => max_age = attr_value.parse().ok().or(max_age),
                "expires" => expires = parse_cookie_date(attr_value).or(expires),
                _ => {}
            }
        }
        let expired = match (max_age, expires) {
            (Some(secs), _) => secs <= 0,
            (None, Some(at)) => at <= now,
            (None, None) => false,
        };

        if expired {
            self.pairs.remove(k).is_some()
        } else {
            self.insert(k, v.trim());
            true
        }
    }
}

/// `Expires` value: RFC 1123 (`Thu, 01 Jan 1970 00:00:01 GMT`) or the
/// Netscape form with dashes (`Thu, 01-Jan-1970 00:00:01 GMT`).
fn parse_cookie_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value)
        .or_else(|_| DateTime::parse_from_rfc2822(&value.replace('-', " ")))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
