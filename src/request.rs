//! Staged request builder.
//!
//! The build sequence is enforced by the type at each step: a
//! [`RequestBuilder`] exposes the query surface and advances into a
//! [`HeaderBuilder`] for the header surface; either stage can execute.
//! Builders are single-use and single-owner: one instance is created,
//! configured, and consumed by exactly one call on one thread.

use std::time::SystemTime;

use http::header::{
    ACCEPT, ACCEPT_LANGUAGE, AUTHORIZATION, CACHE_CONTROL, CONTENT_DISPOSITION, CONTENT_TYPE,
    IF_MATCH, IF_MODIFIED_SINCE, IF_NONE_MATCH, IF_UNMODIFIED_SINCE, RANGE,
};
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{Error, Result};
use crate::response::Response;
use crate::transport::Transport;

/// Accumulated request state shared by both builder stages.
#[derive(Debug)]
struct Parts<'a> {
    transport: &'a Transport,
    method: Method,
    url: String,
    query: Vec<(String, String)>,
    headers: HeaderMap,
    body: Option<Vec<u8>>,
    deferred: Option<Error>,
}

impl<'a> Parts<'a> {
    fn new(transport: &'a Transport, method: Method, url: String) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Self {
            transport,
            method,
            url,
            query: Vec::new(),
            headers,
            body: None,
            deferred: None,
        }
    }

    /// Keep the first error; later ones would only mask it.
    fn defer(&mut self, error: Error) {
        if self.deferred.is_none() {
            self.deferred = Some(error);
        }
    }

    fn insert_header(&mut self, name: HeaderName, value: &str) {
        match HeaderValue::try_from(value) {
            Ok(value) => {
                self.headers.insert(name, value);
            }
            Err(_) => self.defer(Error::Encode(format!("invalid value for header `{name}`"))),
        }
    }

    fn set_named(&mut self, name: &str, value: &str) {
        match HeaderName::try_from(name) {
            Ok(name) => self.insert_header(name, value),
            Err(_) => self.defer(Error::Encode(format!("invalid header name `{name}`"))),
        }
    }

    fn append_named(&mut self, name: &str, value: &str) {
        match (HeaderName::try_from(name), HeaderValue::try_from(value)) {
            (Ok(name), Ok(value)) => {
                self.headers.append(name, value);
            }
            _ => self.defer(Error::Encode(format!("invalid header `{name}`"))),
        }
    }

    fn resolved_url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.url)
            .map_err(|e| Error::Configuration(format!("invalid request URL `{}`: {e}", self.url)))?;
        if !self.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in &self.query {
                pairs.append_pair(name, value);
            }
        }
        Ok(url)
    }

    fn send(mut self) -> Result<Response> {
        if let Some(deferred) = self.deferred.take() {
            return Err(deferred);
        }
        let url = self.resolved_url()?;
        let method = self.method.clone();

        let response = self
            .transport
            .dispatch(self.method, url.clone(), self.headers, self.body)?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            let body = response.text();
            tracing::error!(
                method = %method,
                url = %url,
                status = status.as_u16(),
                body = %body,
                "third-party call failed"
            );
            let error = if status.is_client_error() {
                Error::Client {
                    status: status.as_u16(),
                    body,
                }
            } else {
                Error::Server {
                    status: status.as_u16(),
                    body,
                }
            };
            return Err(error);
        }

        Ok(response)
    }
}

/// First builder stage: query parameters and body encoding.
///
/// Created by a [`crate::ProviderClient`] verb with the method, resolved URL,
/// auth header, and (for POST/PUT) the JSON-encoded body already in place.
#[derive(Debug)]
pub struct RequestBuilder<'a> {
    parts: Parts<'a>,
}

impl<'a> RequestBuilder<'a> {
    pub(crate) fn new(transport: &'a Transport, method: Method, url: String) -> Self {
        Self {
            parts: Parts::new(transport, method, url),
        }
    }

    pub(crate) fn with_body<B: Serialize + ?Sized>(
        transport: &'a Transport,
        method: Method,
        url: String,
        body: &B,
    ) -> Self {
        let mut builder = Self::new(transport, method, url);
        match serde_json::to_vec(body) {
            Ok(bytes) => builder.parts.body = Some(bytes),
            Err(e) => builder
                .parts
                .defer(Error::Encode(format!("json body: {e}"))),
        }
        builder
    }

    /// Append one header before handing the builder to the caller.
    pub(crate) fn initial_header(mut self, name: &str, value: &str) -> Self {
        self.parts.append_named(name, value);
        self
    }

    /// Append a query parameter. Repeated names repeat the key.
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.query.push((name.into(), value.into()));
        self
    }

    /// Append one query parameter once per value.
    pub fn query_all(
        mut self,
        name: impl Into<String>,
        values: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        let name = name.into();
        for value in values {
            self.parts.query.push((name.clone(), value.into()));
        }
        self
    }

    /// Merge query parameters from an externally built multimap.
    pub fn query_pairs(
        mut self,
        pairs: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>,
    ) -> Self {
        for (name, value) in pairs {
            self.parts.query.push((name.into(), value.into()));
        }
        self
    }

    /// Replace the body with a form-urlencoded one and adjust the content
    /// type accordingly.
    pub fn form<T: Serialize + ?Sized>(mut self, form: &T) -> Self {
        match serde_urlencoded::to_string(form) {
            Ok(encoded) => {
                self.parts.headers.insert(
                    CONTENT_TYPE,
                    HeaderValue::from_static("application/x-www-form-urlencoded"),
                );
                self.parts.body = Some(encoded.into_bytes());
            }
            Err(e) => self.parts.defer(Error::Encode(format!("form body: {e}"))),
        }
        self
    }

    /// Advance to the header surface.
    pub fn headers(self) -> HeaderBuilder<'a> {
        HeaderBuilder { parts: self.parts }
    }

    /// Execute and classify the response without decoding the body.
    pub fn send(self) -> Result<Response> {
        self.parts.send()
    }

    /// Execute and decode the response body into `T`.
    pub fn fetch<T: DeserializeOwned>(self) -> Result<T> {
        self.parts.send()?.json()
    }
}

/// Second builder stage: the standard header vocabulary.
pub struct HeaderBuilder<'a> {
    parts: Parts<'a>,
}

impl HeaderBuilder<'_> {
    /// Set the `Accept` header.
    pub fn accept(mut self, media_type: &str) -> Self {
        self.parts.insert_header(ACCEPT, media_type);
        self
    }

    /// Set the `Accept-Language` header.
    pub fn accept_language(mut self, languages: &str) -> Self {
        self.parts.insert_header(ACCEPT_LANGUAGE, languages);
        self
    }

    /// Set the `Cache-Control` header.
    pub fn cache_control(mut self, directives: &str) -> Self {
        self.parts.insert_header(CACHE_CONTROL, directives);
        self
    }

    /// Override the `Content-Type` header.
    pub fn content_type(mut self, media_type: &str) -> Self {
        self.parts.insert_header(CONTENT_TYPE, media_type);
        self
    }

    /// Set the `Content-Disposition` header.
    pub fn content_disposition(mut self, value: &str) -> Self {
        self.parts.insert_header(CONTENT_DISPOSITION, value);
        self
    }

    /// Set a form-data `Content-Disposition` with an optional filename.
    pub fn content_disposition_form_data(mut self, name: &str, filename: Option<&str>) -> Self {
        let value = match filename {
            Some(filename) => format!("form-data; name=\"{name}\"; filename=\"{filename}\""),
            None => format!("form-data; name=\"{name}\""),
        };
        self.parts.insert_header(CONTENT_DISPOSITION, &value);
        self
    }

    /// Set basic authentication from a username and optional password.
    pub fn basic_auth(self, username: &str, password: Option<&str>) -> Self {
        use base64::Engine;
        let credentials = format!("{username}:{}", password.unwrap_or_default());
        let encoded = base64::engine::general_purpose::STANDARD.encode(credentials);
        self.basic_auth_encoded(&encoded)
    }

    /// Set basic authentication from already-encoded credentials.
    pub fn basic_auth_encoded(mut self, encoded_credentials: &str) -> Self {
        let value = format!("Basic {encoded_credentials}");
        self.parts.insert_header(AUTHORIZATION, &value);
        self
    }

    /// Set bearer authentication.
    pub fn bearer_auth(mut self, token: &str) -> Self {
        let value = format!("Bearer {token}");
        self.parts.insert_header(AUTHORIZATION, &value);
        self
    }

    /// Set the `If-Match` header.
    pub fn if_match(mut self, etag: &str) -> Self {
        self.parts.insert_header(IF_MATCH, etag);
        self
    }

    /// Set the `If-None-Match` header.
    pub fn if_none_match(mut self, etag: &str) -> Self {
        self.parts.insert_header(IF_NONE_MATCH, etag);
        self
    }

    /// Set the `If-Modified-Since` header from a timestamp.
    pub fn if_modified_since(mut self, time: SystemTime) -> Self {
        let value = httpdate::fmt_http_date(time);
        self.parts.insert_header(IF_MODIFIED_SINCE, &value);
        self
    }

    /// Set the `If-Unmodified-Since` header from a timestamp.
    pub fn if_unmodified_since(mut self, time: SystemTime) -> Self {
        let value = httpdate::fmt_http_date(time);
        self.parts.insert_header(IF_UNMODIFIED_SINCE, &value);
        self
    }

    /// Set the `Range` header, e.g. `bytes=0-1023`.
    pub fn range(mut self, ranges: &str) -> Self {
        self.parts.insert_header(RANGE, ranges);
        self
    }

    /// Append a header, keeping any existing values for the same name.
    pub fn add(mut self, name: &str, value: &str) -> Self {
        self.parts.append_named(name, value);
        self
    }

    /// Append one header once per value.
    pub fn add_all(mut self, name: &str, values: impl IntoIterator<Item = impl AsRef<str>>) -> Self {
        for value in values {
            self.parts.append_named(name, value.as_ref());
        }
        self
    }

    /// Set a header, replacing any existing values for the same name.
    pub fn set(mut self, name: &str, value: &str) -> Self {
        self.parts.set_named(name, value);
        self
    }

    /// Set every header from a name/value sequence.
    pub fn set_all(
        mut self,
        values: impl IntoIterator<Item = (impl AsRef<str>, impl AsRef<str>)>,
    ) -> Self {
        for (name, value) in values {
            self.parts.set_named(name.as_ref(), value.as_ref());
        }
        self
    }

    /// Replace each named header with the given list of values.
    pub fn put_all(
        mut self,
        values: impl IntoIterator<Item = (impl AsRef<str>, Vec<String>)>,
    ) -> Self {
        for (name, list) in values {
            let name = name.as_ref();
            if let Ok(header) = HeaderName::try_from(name) {
                self.parts.headers.remove(&header);
            }
            for value in list {
                self.parts.append_named(name, &value);
            }
        }
        self
    }

    /// Execute and classify the response without decoding the body.
    pub fn send(self) -> Result<Response> {
        self.parts.send()
    }

    /// Execute and decode the response body into `T`.
    pub fn fetch<T: DeserializeOwned>(self) -> Result<T> {
        self.parts.send()?.json()
    }
}
