//! Raw request channels.
//!
//! A [`RawRequest`] is the input contract the binder consumes: the external
//! transport layer fills it once per request (path segments, query pairs,
//! headers, cookies, body) and the binder reads it without further I/O.
//! Header names are stored lowercased; query and header channels preserve
//! repeated keys in arrival order.

use bytes::Bytes;
use indexmap::IndexMap;

/// The request body as handed over by the transport layer.
#[derive(Debug, Clone, Default)]
pub enum RawBody {
    /// No body.
    #[default]
    Empty,
    /// Undecoded bytes plus the content-type hint.
    Raw {
        /// The body bytes, already read off the wire.
        bytes: Bytes,
        /// The `Content-Type` header value, if any.
        content_type: Option<String>,
    },
    /// A structured body already decoded to a JSON tree.
    Json(serde_json::Value),
}

/// Raw wire data for one request, keyed by channel.
///
/// # Example
///
/// ```rust
/// use caliper_bind::RawRequest;
///
/// let raw = RawRequest::builder()
///     .path_param("item_id", "42")
///     .query_string("q=test&tag=a&tag=b")
///     .header("User-Agent", "curl/8.0")
///     .cookie("session", "abc123")
///     .build();
///
/// assert_eq!(raw.path_value("item_id"), Some("42"));
/// assert_eq!(raw.query_values("tag"), ["a", "b"]);
/// assert_eq!(raw.header_values("user-agent"), ["curl/8.0"]);
/// assert_eq!(raw.cookie_value("session"), Some("abc123"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RawRequest {
    path: IndexMap<String, String>,
    query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    cookies: IndexMap<String, String>,
    body: RawBody,
}

impl RawRequest {
    /// Starts building a raw request.
    #[must_use]
    pub fn builder() -> RawRequestBuilder {
        RawRequestBuilder::default()
    }

    /// Returns a path segment value by declared parameter name.
    #[must_use]
    pub fn path_value(&self, name: &str) -> Option<&str> {
        self.path.get(name).map(String::as_str)
    }

    /// All query pairs in arrival order (repeated keys preserved).
    #[must_use]
    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    /// Every query value for a key, in arrival order.
    #[must_use]
    pub fn query_values(&self, key: &str) -> Vec<&str> {
        self.query
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// All header pairs; names are lowercased at insertion.
    #[must_use]
    pub fn header_pairs(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Every header value for a lowercase name, in arrival order.
    #[must_use]
    pub fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Returns a cookie value by name.
    #[must_use]
    pub fn cookie_value(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// All cookies in arrival order.
    pub fn cookie_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cookies.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// All path parameters in arrival order.
    pub fn path_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.path.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The request body.
    #[must_use]
    pub fn body(&self) -> &RawBody {
        &self.body
    }
}

/// Builder for [`RawRequest`], filled by the transport layer.
///
/// Invalid fragments (an unparseable query string) are skipped rather than
/// panicking; binding then sees the channel as absent.
#[derive(Debug, Default)]
pub struct RawRequestBuilder {
    request: RawRequest,
}

impl RawRequestBuilder {
    /// Adds one path segment value.
    #[must_use]
    pub fn path_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.request.path.insert(name.into(), value.into());
        self
    }

    /// Adds one query pair. Repeated keys accumulate in arrival order.
    #[must_use]
    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.request.query.push((key.into(), value.into()));
        self
    }

    /// Parses a raw query string (`a=1&b=2&b=3`) into query pairs.
    #[must_use]
    pub fn query_string(mut self, raw: &str) -> Self {
        if let Ok(pairs) = serde_urlencoded::from_str::<Vec<(String, String)>>(raw) {
            self.request.query.extend(pairs);
        }
        self
    }

    /// Adds one header. The name is lowercased.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.request
            .headers
            .push((name.into().to_ascii_lowercase(), value.into()));
        self
    }

    /// Adds one cookie.
    #[must_use]
    pub fn cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.request.cookies.insert(name.into(), value.into());
        self
    }

    /// Parses a `Cookie` header value (`a=1; b=2`) into cookies.
    ///
    /// Surrounding quotes on values are stripped.
    #[must_use]
    pub fn cookie_header(mut self, header_value: &str) -> Self {
        for cookie in header_value.split(';') {
            if let Some((name, value)) = cookie.trim().split_once('=') {
                let value = value.trim().trim_matches('"');
                self.request
                    .cookies
                    .insert(name.trim().to_string(), value.to_string());
            }
        }
        self
    }

    /// Sets a structured body already decoded to a JSON tree.
    #[must_use]
    pub fn json_body(mut self, tree: serde_json::Value) -> Self {
        self.request.body = RawBody::Json(tree);
        self
    }

    /// Sets an undecoded byte body with its content-type hint.
    #[must_use]
    pub fn raw_body(mut self, bytes: impl Into<Bytes>, content_type: Option<&str>) -> Self {
        self.request.body = RawBody::Raw {
            bytes: bytes.into(),
            content_type: content_type.map(String::from),
        };
        self
    }

    /// Finishes the request.
    #[must_use]
    pub fn build(self) -> RawRequest {
        self.request
    }
}
