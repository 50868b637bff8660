// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use rentadmin_app::{CollaboratorError, EntityBackend, Page, ResourceKind};
use reqwest::blocking::{Client as HttpClient, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

pub const DEFAULT_PAGE_SIZE: u32 = 1000;

/// The `{success, data, message, error}` wrapper around every response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    /// First non-empty of `message` and `error`.
    pub fn reason(&self) -> Option<&str> {
        [self.message.as_deref(), self.error.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|text| !text.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page: u32,
    pub size: u32,
    pub search: Option<String>,
}

impl ListQuery {
    pub fn first_page(size: u32) -> Self {
        Self {
            page: 1,
            size,
            search: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Client {
    base_url: String,
    timeout: Duration,
    token: Option<String>,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration, token: Option<String>) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_owned();
        if base_url.is_empty() {
            bail!("api.base_url must not be empty");
        }
        let parsed = Url::parse(&base_url)
            .with_context(|| format!("api.base_url {base_url:?} is not a valid URL"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            bail!(
                "api.base_url must use http or https, got {:?}",
                parsed.scheme()
            );
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            timeout,
            token: token.filter(|token| !token.trim().is_empty()),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn list<T: DeserializeOwned>(
        &self,
        resource: ResourceKind,
        query: &ListQuery,
    ) -> Result<Page<T>, CollaboratorError> {
        let page = query.page.to_string();
        let size = query.size.to_string();
        let mut params = vec![("page", page.as_str()), ("size", size.as_str())];
        if let Some(search) = query.search.as_deref().filter(|term| !term.is_empty()) {
            params.push(("q", search));
        }
        let url = Url::parse_with_params(&self.collection_url(resource), &params)
            .map_err(|error| CollaboratorError::Transport(format!("build list url: {error}")))?;

        let request = self.http.get(url);
        self.send::<Page<T>>(request, "list", resource)?
            .ok_or_else(|| missing_data("list", resource))
    }

    pub fn get<T: DeserializeOwned>(
        &self,
        resource: ResourceKind,
        id: i64,
    ) -> Result<T, CollaboratorError> {
        let request = self.http.get(self.item_url(resource, id));
        self.send(request, "get", resource)?
            .ok_or_else(|| missing_data("get", resource))
    }

    pub fn create<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        resource: ResourceKind,
        body: &B,
    ) -> Result<T, CollaboratorError> {
        let request = self.http.post(self.collection_url(resource)).json(body);
        self.send(request, "create", resource)?
            .ok_or_else(|| missing_data("create", resource))
    }

    pub fn update<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        resource: ResourceKind,
        id: i64,
        body: &B,
    ) -> Result<T, CollaboratorError> {
        let request = self.http.put(self.item_url(resource, id)).json(body);
        self.send(request, "update", resource)?
            .ok_or_else(|| missing_data("update", resource))
    }

    pub fn delete(&self, resource: ResourceKind, id: i64) -> Result<(), CollaboratorError> {
        let request = self.http.delete(self.item_url(resource, id));
        self.send::<serde_json::Value>(request, "delete", resource)?;
        Ok(())
    }

    /// Reachability check used by `--check`.
    pub fn ping(&self) -> Result<()> {
        self.list::<serde_json::Value>(ResourceKind::Properties, &ListQuery::first_page(1))
            .map_err(|error| match error {
                CollaboratorError::Transport(detail) => anyhow::anyhow!(
                    "cannot reach the rental API at {} -- is the server running? ({detail})",
                    self.base_url
                ),
                CollaboratorError::Business(detail) => anyhow::anyhow!(
                    "the rental API at {} refused the request -- check api.token ({detail})",
                    self.base_url
                ),
            })?;
        Ok(())
    }

    fn collection_url(&self, resource: ResourceKind) -> String {
        format!("{}/{}", self.base_url, resource.path())
    }

    fn item_url(&self, resource: ResourceKind, id: i64) -> String {
        format!("{}/{}/{id}", self.base_url, resource.path())
    }

    fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        action: &str,
        resource: ResourceKind,
    ) -> Result<Option<T>, CollaboratorError> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        tracing::debug!(action, resource = resource.path(), "api request");

        let response = request.send().map_err(|error| {
            CollaboratorError::Transport(format!("cannot reach {}: {error}", self.base_url))
        })?;
        let status = response.status();
        let body = response.text().map_err(|error| {
            CollaboratorError::Transport(format!("read {action} response: {error}"))
        })?;

        if !status.is_success() {
            let reason = serde_json::from_str::<Envelope<serde_json::Value>>(&body)
                .ok()
                .and_then(|envelope| envelope.reason().map(str::to_owned))
                .unwrap_or_else(|| format!("server returned {}", status.as_u16()));
            let detail = format!("{action} {} ({}): {reason}", resource.path(), status.as_u16());
            tracing::debug!(%detail, "api request failed");
            return Err(if status.is_server_error() {
                CollaboratorError::Transport(detail)
            } else {
                CollaboratorError::Business(detail)
            });
        }

        let envelope: Envelope<T> = serde_json::from_str(&body).map_err(|error| {
            CollaboratorError::Transport(format!(
                "decode {action} {} response: {error}",
                resource.path()
            ))
        })?;
        if !envelope.success {
            let reason = envelope.reason().unwrap_or("request failed").to_owned();
            return Err(CollaboratorError::Business(format!(
                "{action} {}: {reason}",
                resource.path()
            )));
        }
        Ok(envelope.data)
    }
}

fn missing_data(action: &str, resource: ResourceKind) -> CollaboratorError {
    CollaboratorError::Business(format!(
        "{action} {} succeeded without data",
        resource.path()
    ))
}

/// Engine backend for one resource: loads page 1 with `page_size` rows and
/// sends form inputs as JSON bodies.
pub fn backend<T, F>(client: &Client, resource: ResourceKind, page_size: u32) -> EntityBackend<T, F>
where
    T: DeserializeOwned + 'static,
    F: Serialize + 'static,
{
    let load = client.clone();
    let create = client.clone();
    let update = client.clone();
    let delete = client.clone();
    EntityBackend {
        load: Arc::new(move || load.list::<T>(resource, &ListQuery::first_page(page_size))),
        create: Arc::new(move |form: &F| create.create::<T, F>(resource, form)),
        update: Arc::new(move |id, form: &F| update.update::<T, F>(resource, id, form)),
        delete: Arc::new(move |id| delete.delete(resource, id)),
    }
}

#[cfg(test)]
mod tests {
    use super::{Client, Envelope};
    use std::time::Duration;

    #[test]
    fn envelope_reason_prefers_message_then_error() {
        let envelope: Envelope<()> =
            serde_json::from_str(r#"{"success":false,"message":"  ","error":"email taken"}"#)
                .expect("envelope should decode");
        assert_eq!(envelope.reason(), Some("email taken"));
        assert!(envelope.data.is_none());
    }

    #[test]
    fn new_rejects_bad_base_urls() {
        let timeout = Duration::from_secs(1);
        assert!(Client::new("", timeout, None).is_err());
        assert!(Client::new("not a url", timeout, None).is_err());
        assert!(Client::new("ftp://example.com/api", timeout, None).is_err());

        let client = Client::new("http://localhost:8000/api/", timeout, Some(" ".to_owned()))
            .expect("valid base url");
        assert_eq!(client.base_url(), "http://localhost:8000/api");
        assert!(!client.has_token());
    }
}
