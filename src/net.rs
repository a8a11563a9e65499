//! Synchronous page loading.
//!
//! The facade is a blocking, single-threaded surface, so loads are blocking
//! too: `http(s)://` goes through `reqwest::blocking`, `file://` reads the
//! filesystem relative to the platform file root. Responses are fully
//! buffered; no streaming, no retries.

use std::path::Path;

use http::HeaderMap;

use crate::errors::{Result, SurfaceError};

/// A fully buffered load result.
///
/// For text bodies, convert with `String::from_utf8_lossy(&resp.body)`.
/// `headers` is case-insensitive for header names; file loads leave it
/// empty.
#[derive(Debug)]
pub struct Response {
    /// Final URL (after redirects, if any).
    pub url: url::Url,

    /// HTTP status code; `200` for successful file loads.
    pub status: u16,

    /// Reason phrase, `"Unknown"` for non-standard codes.
    pub status_text: String,

    /// Response headers.
    pub headers: HeaderMap,

    /// Raw body bytes.
    pub body: Vec<u8>,
}

/// Load a URL, blocking until the body is fully buffered.
///
/// Relative `file://` paths (and bare paths without a scheme) resolve
/// against `file_root`. HTTP requests identify themselves with
/// `user_agent`.
pub fn fetch(raw_url: &str, file_root: &Path, user_agent: &str) -> Result<Response> {
    let url = parse(raw_url, file_root)?;

    match url.scheme() {
        "http" | "https" => fetch_http(url, user_agent),
        "file" => fetch_file(url, file_root),
        other => Err(SurfaceError::InvalidUrl(format!(
            "unsupported scheme {other:?}"
        ))),
    }
}

/// Parse and normalize a caller-supplied URL without loading it.
pub fn parse(raw_url: &str, file_root: &Path) -> Result<url::Url> {
    match url::Url::parse(raw_url) {
        Ok(url) => Ok(url),
        // Bare paths become file URLs under the platform root.
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let base = url::Url::from_directory_path(file_root)
                .map_err(|_| SurfaceError::InvalidUrl(raw_url.to_string()))?;
            base.join(raw_url)
                .map_err(|e| SurfaceError::InvalidUrl(format!("{raw_url}: {e}")))
        }
        Err(e) => Err(SurfaceError::InvalidUrl(format!("{raw_url}: {e}"))),
    }
}

fn fetch_http(url: url::Url, user_agent: &str) -> Result<Response> {
    let client = reqwest::blocking::Client::builder()
        .user_agent(user_agent)
        .build()
        .map_err(|e| SurfaceError::Load(e.to_string()))?;
    let res = client
        .get(url)
        .send()
        .map_err(|e| SurfaceError::Load(e.to_string()))?;

    let final_url = res.url().clone();
    let status = res.status().as_u16();
    let status_text = res
        .status()
        .canonical_reason()
        .unwrap_or("Unknown")
        .to_string();
    let headers = res.headers().clone();

    let body = res
        .bytes()
        .map_err(|e| SurfaceError::Load(e.to_string()))?
        .to_vec();

    Ok(Response {
        url: final_url,
        status,
        status_text,
        headers,
        body,
    })
}

fn fetch_file(url: url::Url, file_root: &Path) -> Result<Response> {
    let path = url
        .to_file_path()
        .unwrap_or_else(|_| file_root.join(url.path().trim_start_matches('/')));

    let body = std::fs::read(&path)
        .map_err(|e| SurfaceError::Load(format!("{}: {e}", path.display())))?;

    Ok(Response {
        url,
        status: 200,
        status_text: "OK".to_string(),
        headers: HeaderMap::new(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn bare_paths_resolve_against_the_file_root() {
        let dir = tempfile::tempdir().unwrap();
        let url = parse("page.html", dir.path()).unwrap();
        assert_eq!(url.scheme(), "file");
        assert!(url.path().ends_with("page.html"));
    }

    #[test]
    fn garbage_urls_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            fetch("ftp://example.com/x", dir.path(), "WebSurface/0.1"),
            Err(SurfaceError::InvalidUrl(_))
        ));
    }

    #[test]
    fn file_urls_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.html");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(b"<html><body>hi</body></html>").unwrap();

        let url = format!("file://{}", path.display());
        let resp = fetch(&url, dir.path(), "WebSurface/0.1").unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(resp.body, b"<html><body>hi</body></html>");
    }

    #[test]
    fn missing_files_surface_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("file://{}/nope.html", dir.path().display());
        assert!(matches!(
            fetch(&url, dir.path(), "WebSurface/0.1"),
            Err(SurfaceError::Load(_))
        ));
    }

    #[test]
    fn http_requests_carry_the_configured_user_agent() {
        use std::io::Read;
        use std::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        // One-shot server: capture the request, answer, hang up.
        let server = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0u8; 4096];
            let n = stream.read(&mut buf).unwrap();
            stream
                .write_all(
                    b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok",
                )
                .unwrap();
            String::from_utf8_lossy(&buf[..n]).into_owned()
        });

        let dir = tempfile::tempdir().unwrap();
        let resp = fetch(
            &format!("http://127.0.0.1:{port}/"),
            dir.path(),
            "SurfaceTest/1.0",
        )
        .unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(resp.body, b"ok");

        let request = server.join().unwrap();
        assert!(
            request.to_lowercase().contains("user-agent: surfacetest/1.0"),
            "request was: {request}"
        );
    }
}
