//! Minimal HTTP/1.1 portal for integration tests.
//!
//! Serves fixed bodies keyed by request target (`/path?query`), answers 404 for
//! unknown targets and 500 for targets marked as failing. Optionally requires
//! a cookie and serves a login page to requests without it, the way the real
//! portal answers an expired session.

use std::collections::{HashMap, HashSet};
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

pub const LOGIN_PAGE: &str = "<html><body><form id=\"login\"><input name=\"login\"></form></body></html>";

#[derive(Debug, Default, Clone)]
pub struct PortalServer {
    routes: HashMap<String, Vec<u8>>,
    failing: HashSet<String>,
    required_cookie: Option<String>,
    set_cookie: HashMap<String, String>,
}

/// Handle to a running server.
pub struct RunningPortal {
    pub base_url: String,
    requests: Arc<Mutex<Vec<Request>>>,
}

#[derive(Debug, Clone)]
pub struct Request {
    pub target: String,
    pub cookie: Option<String>,
}

impl PortalServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, target: &str, body: impl Into<Vec<u8>>) -> Self {
        self.routes.insert(target.to_string(), body.into());
        self
    }

    pub fn fail(mut self, target: &str) -> Self {
        self.failing.insert(target.to_string());
        self
    }

    /// Requests whose `Cookie` header lacks `pair` (e.g. `ologin=user`) get [`LOGIN_PAGE`].
    pub fn require_cookie(mut self, pair: &str) -> Self {
        self.required_cookie = Some(pair.to_string());
        self
    }

    /// Answer `target` with `Set-Cookie: {pair}; Path=/`.
    pub fn set_cookie_on(mut self, target: &str, pair: &str) -> Self {
        self.set_cookie.insert(target.to_string(), pair.to_string());
        self
    }

    /// Starts the server in a background thread. It runs until the process exits.
    pub fn start(self) -> RunningPortal {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().unwrap().port();
        let server = Arc::new(self);
        let requests = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&requests);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let server = Arc::clone(&server);
                let log = Arc::clone(&log);
                thread::spawn(move || server.handle(stream, &log));
            }
        });
        RunningPortal {
            base_url: format!("http://127.0.0.1:{}/", port),
            requests,
        }
    }

    fn handle(&self, mut stream: TcpStream, log: &Mutex<Vec<Request>>) {
        let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
        let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
        let Some(head) = read_head(&mut stream) else {
            return;
        };
        let Some(request) = parse_request(&head) else {
            let _ = stream.write_all(b"HTTP/1.1 400 Bad Request\r\nConnection: close\r\n\r\n");
            return;
        };
        log.lock().unwrap().push(request.clone());

        let authenticated = match &self.required_cookie {
            Some(pair) => request
                .cookie
                .as_deref()
                .map(|c| c.split(';').any(|p| p.trim() == pair))
                .unwrap_or(false),
            None => true,
        };

        let (status, body): (&str, &[u8]) = if self.failing.contains(&request.target) {
            ("500 Internal Server Error", b"boom")
        } else if !authenticated {
            ("200 OK", LOGIN_PAGE.as_bytes())
        } else {
            match self.routes.get(&request.target) {
                Some(body) => ("200 OK", body.as_slice()),
                None => ("404 Not Found", b"not found"),
            }
        };
        let set_cookie = self
            .set_cookie
            .get(&request.target)
            .map(|pair| format!("Set-Cookie: {}; Path=/\r\n", pair))
            .unwrap_or_default();
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Length: {}\r\nContent-Type: text/html\r\n{}Connection: close\r\n\r\n",
            status,
            body.len(),
            set_cookie
        );
        let _ = stream.write_all(response.as_bytes());
        let _ = stream.write_all(body);
    }
}

impl RunningPortal {
    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }
}

/// Reads up to the blank line that ends the request head.
fn read_head(stream: &mut TcpStream) -> Option<String> {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    while !data.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => return None,
            Ok(n) => data.extend_from_slice(&buf[..n]),
        }
        if data.len() > 64 * 1024 {
            return None;
        }
    }
    String::from_utf8(data).ok()
}

fn parse_request(head: &str) -> Option<Request> {
    let mut lines = head.lines();
    let mut parts = lines.next()?.split_whitespace();
    let method = parts.next()?;
    if !method.eq_ignore_ascii_case("GET") {
        return None;
    }
    let target = parts.next()?.to_string();
    let cookie = lines
        .take_while(|l| !l.trim().is_empty())
        .filter_map(|l| l.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("cookie"))
        .map(|(_, value)| value.trim().to_string());
    Some(Request { target, cookie })
}
