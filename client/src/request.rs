//! Request description and building.
//!
//! A [`RequestSpec`] names everything one call needs: verb, path template,
//! placeholder values, extra query parameters, body and auth mode. The
//! [`RequestBuilder`] turns it into an [`HttpRequest`] for the bound dialect
//! without touching the network, so every failure here is a [`BuildError`].

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::Method;
use thiserror::Error;
use url::Url;

use crate::config::Credentials;
use crate::formatter::{EncodedBody, FormatError, Formatter, Payload};

/// Everything outside RFC 3986 "unreserved" is escaped, `/` included.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

// ------------------------------------------------------------------ //
//  Errors                                                             //
// ------------------------------------------------------------------ //

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("placeholder '{{{0}}}' has no value")]
    UnresolvedPlaceholder(String),
    #[error("segment '{0}' is not used by the path template")]
    UnusedSegment(String),
    #[error("segment '{name}' has disallowed value '{value}'")]
    DisallowedSegment { name: String, value: String },
    #[error("malformed path template '{0}'")]
    MalformedTemplate(String),
    #[error("failed to encode request body")]
    Encode(#[source] FormatError),
}

// ------------------------------------------------------------------ //
//  Request spec                                                       //
// ------------------------------------------------------------------ //

/// Where the credentials for a call come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Auth {
    /// The client's configured username/password.
    Configured,
    /// No credentials at all (liveness and version probes).
    Anonymous,
    /// Credentials supplied for this call only.
    Explicit(Credentials),
}

/// Query-parameter names a dialect uses for credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthParams {
    pub username: &'static str,
    pub password: &'static str,
}

impl Default for AuthParams {
    fn default() -> Self {
        Self {
            username: "u",
            password: "p",
        }
    }
}

#[derive(Debug, Clone)]
pub struct RequestSpec<'a> {
    pub method: Method,
    pub template: &'static str,
    pub segments: BTreeMap<&'static str, String>,
    /// Caller parameters, sent in insertion order after the credentials.
    pub params: Vec<(&'static str, String)>,
    pub body: Option<Payload<'a>>,
    pub auth: Auth,
}

impl<'a> RequestSpec<'a> {
    pub fn new(method: Method, template: &'static str) -> Self {
        Self {
            method,
            template,
            segments: BTreeMap::new(),
            params: Vec::new(),
            body: None,
            auth: Auth::Configured,
        }
    }

    pub fn get(template: &'static str) -> Self {
        Self::new(Method::GET, template)
    }

    pub fn post(template: &'static str) -> Self {
        Self::new(Method::POST, template)
    }

    pub fn delete(template: &'static str) -> Self {
        Self::new(Method::DELETE, template)
    }

    pub fn segment(mut self, name: &'static str, value: impl ToString) -> Self {
        self.segments.insert(name, value.to_string());
        self
    }

    pub fn param(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.params.push((name, value.into()));
        self
    }

    pub fn body(mut self, payload: Payload<'a>) -> Self {
        self.body = Some(payload);
        self
    }

    pub fn anonymous(mut self) -> Self {
        self.auth = Auth::Anonymous;
        self
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.auth = Auth::Explicit(credentials);
        self
    }
}

// ------------------------------------------------------------------ //
//  Built request                                                      //
// ------------------------------------------------------------------ //

/// A fully resolved request, ready for the transport.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    /// The template the path was resolved from, kept for diagnostics.
    pub template: &'static str,
    pub url: Url,
    pub body: Option<EncodedBody>,
}

impl HttpRequest {
    pub fn path(&self) -> &str {
        self.url.path()
    }

    /// Decoded query parameters in wire order.
    #[cfg(test)]
    pub(crate) fn query_pairs(&self) -> Vec<(String, String)> {
        self.url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    #[cfg(test)]
    pub(crate) fn query_value(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    }
}

// ------------------------------------------------------------------ //
//  Builder                                                            //
// ------------------------------------------------------------------ //

#[derive(Debug, Clone)]
pub struct RequestBuilder {
    base_url: Url,
    credentials: Credentials,
    auth_params: AuthParams,
    formatter: Arc<dyn Formatter>,
}

impl RequestBuilder {
    pub fn new(
        base_url: Url,
        credentials: Credentials,
        auth_params: AuthParams,
        formatter: Arc<dyn Formatter>,
    ) -> Self {
        Self {
            base_url,
            credentials,
            auth_params,
            formatter,
        }
    }

    pub fn build(&self, spec: RequestSpec<'_>) -> Result<HttpRequest, BuildError> {
        let path = resolve_path(spec.template, &spec.segments)?;

        let mut url = self.base_url.clone();
        url.set_path(&format!("{}{}", self.base_url.path().trim_end_matches('/'), path));
        url.set_query(None);
        url.set_fragment(None);

        let credentials = match &spec.auth {
            Auth::Configured => Some(&self.credentials),
            Auth::Anonymous => None,
            Auth::Explicit(credentials) => Some(credentials),
        };
        let mut pairs: Vec<(&str, &str)> = Vec::with_capacity(spec.params.len() + 2);
        if let Some(c) = credentials {
            pairs.push((self.auth_params.username, c.username.as_str()));
            pairs.push((self.auth_params.password, c.password.as_str()));
        }
        pairs.extend(spec.params.iter().map(|(k, v)| (*k, v.as_str())));
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }

        let body = spec
            .body
            .map(|payload| self.formatter.encode(&payload))
            .transpose()
            .map_err(BuildError::Encode)?;

        Ok(HttpRequest {
            method: spec.method,
            template: spec.template,
            url,
            body,
        })
    }
}

/// Substitute every `{name}` in `template`. The placeholder set and the key
/// set of `segments` must match exactly.
fn resolve_path(
    template: &str,
    segments: &BTreeMap<&'static str, String>,
) -> Result<String, BuildError> {
    let malformed = || BuildError::MalformedTemplate(template.to_string());

    let mut resolved = String::with_capacity(template.len());
    let mut used = BTreeSet::new();
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        let literal = &rest[..open];
        if literal.contains('}') {
            return Err(malformed());
        }
        resolved.push_str(literal);

        let after = &rest[open + 1..];
        let close = after.find('}').ok_or_else(malformed)?;
        let name = &after[..close];
        if name.is_empty() || name.contains('{') {
            return Err(malformed());
        }

        let value = segments
            .get(name)
            .ok_or_else(|| BuildError::UnresolvedPlaceholder(name.to_string()))?;
        if value.is_empty() || value == "." || value == ".." {
            return Err(BuildError::DisallowedSegment {
                name: name.to_string(),
                value: value.clone(),
            });
        }
        resolved.extend(utf8_percent_encode(value, PATH_SEGMENT));
        used.insert(name);

        rest = &after[close + 1..];
    }

    if rest.contains('}') {
        return Err(malformed());
    }
    resolved.push_str(rest);

    if let Some(unused) = segments.keys().find(|k| !used.contains(**k)) {
        return Err(BuildError::UnusedSegment(unused.to_string()));
    }
    Ok(resolved)
}

// ------------------------------------------------------------------ //
//  Tests                                                              //
// ------------------------------------------------------------------ //
