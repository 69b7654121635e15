use reqwest::{Client, Response, Url, header::AUTHORIZATION};
use serde_json::Value;
use tracing::debug;

use crate::{
    error::{Error, Result, classify},
    management::Credential,
    utils,
};

/// HTTP methods the Web API uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
            Method::Patch => reqwest::Method::PATCH,
        }
    }
}

/// A single query parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl QueryValue {
    fn render(&self) -> String {
        match self {
            QueryValue::Str(s) => s.clone(),
            QueryValue::Int(i) => i.to_string(),
            QueryValue::Float(f) => f.to_string(),
            QueryValue::Bool(b) => b.to_string(),
        }
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::Str(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::Str(value)
    }
}

impl From<&String> for QueryValue {
    fn from(value: &String) -> Self {
        QueryValue::Str(value.clone())
    }
}

impl From<bool> for QueryValue {
    fn from(value: bool) -> Self {
        QueryValue::Bool(value)
    }
}

impl From<f64> for QueryValue {
    fn from(value: f64) -> Self {
        QueryValue::Float(value)
    }
}

macro_rules! int_query_value {
    ($($t:ty),+) => {
        $(
            impl From<$t> for QueryValue {
                fn from(value: $t) -> Self {
                    QueryValue::Int(value as i64)
                }
            }
        )+
    };
}

int_query_value!(i32, i64, u8, u16, u32, u64, usize);

/// One request against the Web API, built fresh by an accessor.
///
/// Query entries whose value is `None` are kept but never sent, so optional
/// accessor arguments can be passed straight through.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    method: Method,
    path: String,
    segments: Vec<String>,
    query: Vec<(String, Option<QueryValue>)>,
    body: Option<Value>,
    headers: Vec<(String, String)>,
}

impl FetchRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            segments: Vec::new(),
            query: Vec::new(),
            body: None,
            headers: Vec::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::Patch, path)
    }

    /// Appends `value` as one path segment after `path`. Encoded as a whole,
    /// so ids can never escape into another resource.
    pub fn segment(mut self, value: impl Into<String>) -> Self {
        self.segments.push(value.into());
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.query.push((key.into(), Some(value.into())));
        self
    }

    pub fn query_opt<V: Into<QueryValue>>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
        self.query.push((key.into(), value.map(Into::into)));
        self
    }

    /// Adds every entry of a JSON object. `null` and nested values are skipped.
    pub fn params(mut self, params: &Value) -> Self {
        if let Some(map) = params.as_object() {
            for (key, value) in map {
                let value = match value {
                    Value::String(s) => Some(QueryValue::Str(s.clone())),
                    Value::Bool(b) => Some(QueryValue::Bool(*b)),
                    Value::Number(n) => n
                        .as_i64()
                        .map(QueryValue::Int)
                        .or_else(|| n.as_f64().map(QueryValue::Float)),
                    _ => None,
                };
                self.query.push((key.clone(), value));
            }
        }
        self
    }

    /// JSON body. Ignored for GET.
    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Header override. An `Authorization` header here replaces the bearer token.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Query pairs exactly as they go on the wire, absent values dropped.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.query
            .iter()
            .filter_map(|(key, value)| value.as_ref().map(|v| (key.clone(), v.render())))
            .collect()
    }

    fn has_authorization(&self) -> bool {
        self.headers
            .iter()
            .any(|(name, _)| name.eq_ignore_ascii_case(AUTHORIZATION.as_str()))
    }
}

/// The one place every accessor goes through to reach the Web API.
///
/// Stateless between calls: the credential is passed in every time, so any
/// number of fetches may run concurrently.
#[derive(Debug, Clone)]
pub struct Fetcher {
    http: Client,
    base_url: String,
}

impl Fetcher {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sends `request` with `credential` and returns the decoded JSON body.
    ///
    /// Empty success bodies (204, or the bare 200 of follow endpoints) decode to
    /// `Value::Null`. Failures are never retried here.
    pub async fn fetch(&self, credential: &Credential, request: FetchRequest) -> Result<Value> {
        let url = self.url(&request)?;
        let mut builder = self
            .http
            .request(request.method.into(), url)
            .query(&request.query_pairs());

        if !request.has_authorization() {
            builder = builder.bearer_auth(&credential.bearer_token);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if request.method != Method::Get {
            if let Some(body) = &request.body {
                builder = builder.json(body);
            }
        }

        let response = builder.send().await?;
        debug!(
            method = ?request.method,
            path = %request.path,
            status = response.status().as_u16(),
            "spotify request"
        );

        read_json(response).await
    }
}

impl Fetcher {
    fn url(&self, request: &FetchRequest) -> Result<Url> {
        let mut url = Url::parse(&utils::join_url(&self.base_url, &request.path))
            .map_err(|e| Error::unexpected(format!("invalid request url: {e}")))?;
        if request.segments.is_empty() {
            return Ok(url);
        }

        // `extend` silently drops these two
        if let Some(bad) = request.segments.iter().find(|s| matches!(s.as_str(), "." | "..")) {
            return Err(Error::unexpected(format!("invalid path segment: {bad}")));
        }
        url.path_segments_mut()
            .map_err(|_| Error::unexpected("api base url cannot carry a path"))?
            .pop_if_empty()
            .extend(&request.segments);
        Ok(url)
    }
}

/// Checks the status and decodes the body of any Spotify response.
pub(crate) async fn read_json(response: Response) -> Result<Value> {
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(classify(status, &headers, &body));
    }

    if body.trim().is_empty() {
        return Ok(Value::Null);
    }

    Ok(serde_json::from_str(&body)?)
}
