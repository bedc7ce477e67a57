//! Connection abstraction and HTTP wire plumbing.
//!
//! The console core never owns a socket: all outbound I/O goes through the
//! [`Connection`] trait, and inbound requests arrive as parsed [`Request`]
//! values. A broken or congested client connection is the transport's
//! problem; writes are best-effort and handlers are never told about dropped
//! bytes.
//!
//! Responses use chunked transfer encoding: every body write is framed as one
//! chunk, and [`PageContext::done`](crate::PageContext::done) emits the
//! terminating zero-length chunk.

use std::collections::BTreeMap;
use std::io::{BufRead, Read, Write};
use std::net::TcpStream;

use log::debug;
use thiserror::Error;

/// Upper bound for an accepted request body. Forms on this console are small;
/// anything bigger is a client defect.
const MAX_BODY: usize = 16 * 1024;

/// Errors raised while reading a request off the wire.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed request line")]
    MalformedRequest,

    #[error("unsupported method: {0}")]
    UnsupportedMethod(String),

    #[error("request body exceeds {MAX_BODY} bytes")]
    BodyTooLarge,
}

/// HTTP request method. Only the two methods the console serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// One-way byte sink towards the client.
///
/// Sending to a closed or broken peer is a silent best-effort failure: the
/// bytes are dropped and the handler keeps running. There is nothing a page
/// handler could do about it anyway.
pub trait Connection {
    fn send(&mut self, data: &[u8]);
}

impl Connection for TcpStream {
    fn send(&mut self, data: &[u8]) {
        if let Err(e) = self.write_all(data) {
            debug!("dropped {} outbound bytes: {}", data.len(), e);
        }
    }
}

/// In-memory connection for tests and response capture.
impl Connection for Vec<u8> {
    fn send(&mut self, data: &[u8]) {
        self.extend_from_slice(data);
    }
}

/// A parsed inbound HTTP request.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    /// Path component of the request target, without the query string.
    pub uri: String,
    /// Raw query string (no leading `?`), empty if absent.
    pub query: String,
    /// Header names lowercased.
    pub headers: BTreeMap<String, String>,
    /// Raw urlencoded form body.
    pub body: String,
}

impl Request {
    /// Build a request directly, for dispatch outside a socket (tests, local
    /// loopback exchanges).
    pub fn new(method: Method, target: &str, body: &str) -> Self {
        let (uri, query) = match target.split_once('?') {
            Some((u, q)) => (u.to_string(), q.to_string()),
            None => (target.to_string(), String::new()),
        };
        Request {
            method,
            uri,
            query,
            headers: BTreeMap::new(),
            body: body.to_string(),
        }
    }

    /// Read one request from the wire.
    pub fn parse<R: BufRead>(reader: &mut R) -> Result<Self, TransportError> {
        let mut line = String::new();
        reader.read_line(&mut line)?;
        let mut parts = line.split_whitespace();
        let method = match parts.next() {
            Some("GET") => Method::Get,
            Some("POST") => Method::Post,
            Some(other) => return Err(TransportError::UnsupportedMethod(other.to_string())),
            None => return Err(TransportError::MalformedRequest),
        };
        let target = parts.next().ok_or(TransportError::MalformedRequest)?;
        let (uri, query) = match target.split_once('?') {
            Some((u, q)) => (u.to_string(), q.to_string()),
            None => (target.to_string(), String::new()),
        };

        let mut headers = BTreeMap::new();
        loop {
            let mut hline = String::new();
            reader.read_line(&mut hline)?;
            let hline = hline.trim_end();
            if hline.is_empty() {
                break;
            }
            if let Some((name, value)) = hline.split_once(':') {
                headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
            }
        }

        let content_length: usize = headers
            .get("content-length")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        if content_length > MAX_BODY {
            return Err(TransportError::BodyTooLarge);
        }
        let mut body = vec![0u8; content_length];
        reader.read_exact(&mut body)?;

        Ok(Request {
            method,
            uri,
            query,
            headers,
            body: String::from_utf8_lossy(&body).into_owned(),
        })
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(|v| v.as_str())
    }

    /// Value of one cookie from the `Cookie` header, if present.
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.header("cookie")?
            .split(';')
            .filter_map(|part| part.trim().split_once('='))
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
    }
}

/// Extract one variable from an urlencoded key/value string.
///
/// Returns `None` when the name is absent; decoding follows the form rules
/// (`+` means space, `%xx` percent escapes).
pub fn get_form_var(data: &str, name: &str) -> Option<String> {
    for pair in data.split('&') {
        let mut kv = pair.splitn(2, '=');
        let key = kv.next().unwrap_or("");
        if key == name {
            let raw = kv.next().unwrap_or("").replace('+', " ");
            return Some(urlencoding::decode(&raw).unwrap_or_default().into_owned());
        }
    }
    None
}

/// Reason phrase for the status codes the console emits.
pub fn status_text(code: u16) -> &'static str {
    match code {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        _ => "Error",
    }
}

/// Emit a minimal non-chunked error response (unknown routes, unreadable
/// requests, missing assets).
pub fn send_error(conn: &mut dyn Connection, code: u16, text: &str) {
    let response = format!(
        "HTTP/1.1 {} {}\r\n\
         Content-Type: text/plain; charset=utf-8\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\
         \r\n\
         {}",
        code,
        status_text(code),
        text.len(),
        text
    );
    conn.send(response.as_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_get_with_query() {
        let raw = b"GET /status?cmd=stat HTTP/1.1\r\nHost: vtu.local\r\n\r\n";
        let req = Request::parse(&mut Cursor::new(&raw[..])).unwrap();
        assert_eq!(req.method, Method::Get);
        assert_eq!(req.uri, "/status");
        assert_eq!(req.query, "cmd=stat");
        assert_eq!(req.header("host"), Some("vtu.local"));
        assert!(req.body.is_empty());
    }

    #[test]
    fn test_parse_post_with_body() {
        let raw = b"POST /cfg/vehicle HTTP/1.1\r\n\
                    Content-Type: application/x-www-form-urlencoded\r\n\
                    Content-Length: 19\r\n\
                    \r\n\
                    vehicleid=MYCAR01&x";
        let req = Request::parse(&mut Cursor::new(&raw[..])).unwrap();
        assert_eq!(req.method, Method::Post);
        assert_eq!(req.body, "vehicleid=MYCAR01&x");
    }

    #[test]
    fn test_parse_rejects_unknown_method() {
        let raw = b"DELETE / HTTP/1.1\r\n\r\n";
        assert!(matches!(
            Request::parse(&mut Cursor::new(&raw[..])),
            Err(TransportError::UnsupportedMethod(_))
        ));
    }

    #[test]
    fn test_parse_rejects_oversized_body() {
        let raw = format!("POST / HTTP/1.1\r\nContent-Length: {}\r\n\r\n", MAX_BODY + 1);
        assert!(matches!(
            Request::parse(&mut Cursor::new(raw.as_bytes())),
            Err(TransportError::BodyTooLarge)
        ));
    }

    #[test]
    fn test_cookie_lookup() {
        let raw = b"GET / HTTP/1.1\r\nCookie: a=1; vtu_session=authenticated\r\n\r\n";
        let req = Request::parse(&mut Cursor::new(&raw[..])).unwrap();
        assert_eq!(req.cookie("vtu_session"), Some("authenticated"));
        assert_eq!(req.cookie("missing"), None);
    }

    #[test]
    fn test_form_var_decoding() {
        let body = "apn=internet.t-mobile&apn_user=my+user&apn_pass=p%26w";
        assert_eq!(get_form_var(body, "apn").unwrap(), "internet.t-mobile");
        assert_eq!(get_form_var(body, "apn_user").unwrap(), "my user");
        assert_eq!(get_form_var(body, "apn_pass").unwrap(), "p&w");
        assert_eq!(get_form_var(body, "absent"), None);
    }

    #[test]
    fn test_send_error_shape() {
        let mut out: Vec<u8> = Vec::new();
        send_error(&mut out, 404, "Not found");
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("HTTP/1.1 404 Not Found\r\n"));
        assert!(text.ends_with("\r\n\r\nNot found"));
    }
}
