//! Embedded static asset delivery.
//!
//! Exactly two assets are served, both gzip-precompressed at build time and
//! embedded into the binary: the stylesheet and the page framework script.
//! No `Accept-Encoding` check is made; a browser that cannot inflate gzip is
//! not supported anyway. The cache validator (ETag) is derived from the asset
//! build timestamp and payload size; any other asset path is a 404.

use chrono::{TimeZone, Utc};
use log::debug;

use crate::context::PageContext;
use crate::registry::PageEntry;
use crate::server::WebConsole;

const STYLE_CSS_GZ: &[u8] = include_bytes!("../assets/style.css.gz");
const SCRIPT_JS_GZ: &[u8] = include_bytes!("../assets/script.js.gz");

/// Chunk size for streaming asset payloads.
const ASSET_CHUNK: usize = 1024;

fn mtime(env_value: &str) -> i64 {
    env_value.parse().unwrap_or(0)
}

fn http_date(secs: i64) -> String {
    Utc.timestamp_opt(secs, 0)
        .single()
        .unwrap_or_else(|| Utc.timestamp_opt(0, 0).unwrap())
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string()
}

/// Serve one of the embedded assets, or 404 for anything else under
/// `/assets/`.
pub fn handle_asset(_console: &WebConsole, _p: &PageEntry, c: &mut PageContext<'_>) {
    let (data, mtime, content_type) = match c.uri.as_str() {
        "/assets/style.css" => (
            STYLE_CSS_GZ,
            self::mtime(env!("VTU_ASSET_MTIME_STYLE_CSS")),
            "text/css",
        ),
        "/assets/script.js" => (
            SCRIPT_JS_GZ,
            self::mtime(env!("VTU_ASSET_MTIME_SCRIPT_JS")),
            "application/javascript",
        ),
        other => {
            debug!("asset not found: {}", other);
            c.error(404, "Not found");
            return;
        }
    };

    let etag = format!("\"{:x}.{}\"", mtime, data.len());
    let headers = format!(
        "Date: {}\r\n\
         Last-Modified: {}\r\n\
         Content-Type: {}\r\n\
         Content-Encoding: gzip\r\n\
         Etag: {}",
        http_date(Utc::now().timestamp()),
        http_date(mtime),
        content_type,
        etag
    );
    c.head(200, Some(&headers));
    for chunk in data.chunks(ASSET_CHUNK) {
        c.write_chunk(chunk);
    }
    c.done();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_assets_are_gzip() {
        // gzip magic bytes
        assert_eq!(&STYLE_CSS_GZ[..2], &[0x1f, 0x8b]);
        assert_eq!(&SCRIPT_JS_GZ[..2], &[0x1f, 0x8b]);
    }

    #[test]
    fn test_http_date_format() {
        assert_eq!(http_date(0), "Thu, 01 Jan 1970 00:00:00 GMT");
        assert_eq!(http_date(1700000000), "Tue, 14 Nov 2023 22:13:20 GMT");
    }
}
