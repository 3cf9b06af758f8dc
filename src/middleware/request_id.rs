//! Per-request correlation ids.
//!
//! A caller may supply its own UUID in `x-request-id`; anything else is
//! replaced with a fresh v4 id. The id is echoed on the response and recorded
//! on the request's trace span.

use std::fmt;
use std::str::FromStr;

use axum::{
    body::Body,
    extract::Request,
    http::{HeaderMap, HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

pub static REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RequestId(pub Uuid);

impl RequestId {
    /// The caller's id when `headers` carry a valid one, otherwise a new one
    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get(&REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse().ok())
            .unwrap_or_else(|| Self(Uuid::new_v4()))
    }

    fn header_value(self) -> Option<HeaderValue> {
        HeaderValue::from_str(&self.to_string()).ok()
    }
}

impl FromStr for RequestId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

pub async fn tag_request(mut request: Request, next: Next) -> Response {
    let request_id = RequestId::from_headers(request.headers());
    request.extensions_mut().insert(request_id);

    let mut response = next.run(request).await;
    if let Some(value) = request_id.header_value() {
        response
            .headers_mut()
            .insert(REQUEST_ID_HEADER.clone(), value);
    }

    response
}

/// `http_request` span with method, path and, once tagged, the request id
pub fn request_span(request: &Request<Body>) -> tracing::Span {
    let span = tracing::info_span!(
        "http_request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = tracing::field::Empty,
    );

    if let Some(request_id) = request.extensions().get::<RequestId>() {
        span.record("request_id", tracing::field::display(request_id));
    }

    span
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER.clone(), HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_valid_header_is_reused() {
        let id = "0f8fad5b-d9cb-469f-a165-70867728950e";
        let request_id = RequestId::from_headers(&headers(id));
        assert_eq!(request_id.to_string(), id);
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        let request_id: RequestId = " 0f8fad5b-d9cb-469f-a165-70867728950e ".parse().unwrap();
        assert_eq!(request_id.to_string(), "0f8fad5b-d9cb-469f-a165-70867728950e");
    }

    #[test]
    fn test_invalid_or_missing_header_gets_fresh_id() {
        let generated = RequestId::from_headers(&headers("not-a-uuid"));
        assert_ne!(generated.0, Uuid::nil());

        let other = RequestId::from_headers(&HeaderMap::new());
        assert_ne!(generated, other);
    }

    #[test]
    fn test_header_value_round_trips() {
        let request_id = RequestId(Uuid::new_v4());
        let value = request_id.header_value().unwrap();
        assert_eq!(value.to_str().unwrap().parse::<RequestId>().unwrap(), request_id);
    }
}
