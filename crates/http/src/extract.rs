//! Request extractors shared by module handlers

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};

/// Scheme and host the client used to reach this server, honouring the usual
/// reverse-proxy headers. Used to build absolute `Location` URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOrigin {
    pub scheme: String,
    pub host: String,
}

impl RequestOrigin {
    /// Absolute URL for `path` on this origin. `path` must start with `/`.
    pub fn url(&self, path: &str) -> String {
        format!("{}://{}{}", self.scheme, self.host, path)
    }

    fn from_parts(parts: &Parts) -> Self {
        let scheme = forwarded_scheme(&parts.headers)
            .or_else(|| parts.uri.scheme_str().map(str::to_string))
            .unwrap_or_else(|| "http".to_string());

        let host = header_str(&parts.headers, header::HOST.as_str())
            .map(str::to_string)
            .or_else(|| parts.uri.authority().map(|a| a.as_str().to_string()))
            .unwrap_or_else(|| "localhost".to_string());

        Self { scheme, host }
    }
}

impl<S> FromRequestParts<S> for RequestOrigin
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(parts))
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn forwarded_scheme(headers: &HeaderMap) -> Option<String> {
    if let Some(proto) = header_str(headers, "x-forwarded-proto")
        .or_else(|| header_str(headers, "x-forwarded-protocol"))
    {
        // Proxy chains append; the first entry is the client-facing hop.
        return proto.split(',').next().map(|p| p.trim().to_ascii_lowercase());
    }
    if header_str(headers, "x-forwarded-ssl") == Some("on") {
        return Some("https".to_string());
    }
    header_str(headers, "x-url-scheme").map(str::to_ascii_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn origin_of(request: Request<()>) -> RequestOrigin {
        let (parts, _) = request.into_parts();
        RequestOrigin::from_parts(&parts)
    }

    #[test]
    fn plain_request_uses_host_header_and_http() {
        let origin = origin_of(
            Request::builder()
                .uri("/books")
                .header("host", "example.com")
                .body(())
                .unwrap(),
        );

        assert_eq!(origin.url("/books/1"), "http://example.com/books/1");
    }

    #[test]
    fn forwarded_proto_wins() {
        let origin = origin_of(
            Request::builder()
                .uri("/books")
                .header("host", "api.example.com:8443")
                .header("x-forwarded-proto", "HTTPS, http")
                .body(())
                .unwrap(),
        );

        assert_eq!(origin.scheme, "https");
        assert_eq!(origin.host, "api.example.com:8443");
    }

    #[test]
    fn forwarded_ssl_flag_means_https() {
        let origin = origin_of(
            Request::builder()
                .uri("/books")
                .header("host", "example.com")
                .header("x-forwarded-ssl", "on")
                .body(())
                .unwrap(),
        );

        assert_eq!(origin.scheme, "https");
    }

    #[test]
    fn absolute_uri_is_used_without_host_header() {
        let origin = origin_of(
            Request::builder()
                .uri("https://books.internal/books")
                .body(())
                .unwrap(),
        );

        assert_eq!(origin.url("/books/7"), "https://books.internal/books/7");
    }

    #[test]
    fn missing_host_falls_back_to_localhost() {
        let origin = origin_of(Request::builder().uri("/books").body(()).unwrap());

        assert_eq!(origin.url("/books/3"), "http://localhost/books/3");
    }
}
