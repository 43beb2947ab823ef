//! REST adapter for the Mae backend.
//!
//! Endpoints, relative to `ClientConfig::api_base()`:
//! - `POST auth/login`, `POST auth/signup`
//! - `GET|POST {endpoint}`, `PUT|DELETE {endpoint}/{id}`

use async_trait::async_trait;
use mae_core::config::ClientConfig;
use mae_core::entry::{Entry, EntryId, Fields};
use mae_core::session::{Credential, Identity};
use mae_core::{AuthBackend, CollectionBackend, LoginGrant, MaeError, Result};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

const LOGIN_FAILED: &str = "Incorrect email or password";
const SIGNUP_SUCCEEDED: &str = "Compte créé avec succès";
const SIGNUP_FAILED: &str = "Erreur lors de la création du compte";

#[derive(Debug, Serialize)]
struct CredentialsBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
    user: Identity,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    message: Option<String>,
}

/// HTTP implementation of both backend traits.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    api_base: String,
}

impl HttpBackend {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| MaeError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base: config.api_base(),
        })
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.api_base, path)
    }

    /// `{endpoint}/{id}`, with the id encoded as a single path segment.
    fn entry_url(&self, endpoint: &str, id: &EntryId) -> Result<Url> {
        let mut url = Url::parse(&self.url(endpoint))
            .map_err(|e| MaeError::config(format!("Invalid backend URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| MaeError::config("Backend URL cannot have a path"))?
            .pop_if_empty()
            .push(id.as_str());
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder, what: &str) -> Result<Response> {
        request.send().await.map_err(|e| {
            tracing::warn!("[HttpBackend] {} failed: {}", what, e);
            MaeError::network(format!("{}: {}", what, e))
        })
    }

    /// Turns a non-success response into an error, reading its body.
    async fn check(response: Response, what: &str) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::debug!("[HttpBackend] {} -> {}: {}", what, status, body);
        let message = error_message(&body).unwrap_or_else(|| fallback_message(status, &body));

        if status == StatusCode::UNAUTHORIZED {
            Err(MaeError::Authentication(message))
        } else {
            Err(MaeError::backend(status.as_u16(), message))
        }
    }

    async fn read_json(response: Response, what: &str) -> Result<Value> {
        response.json::<Value>().await.map_err(|e| MaeError::Serialization {
            format: "JSON".to_string(),
            message: format!("{}: {}", what, e),
        })
    }
}

#[async_trait]
impl AuthBackend for HttpBackend {
    async fn login(&self, identifier: &str, secret: &str) -> Result<LoginGrant> {
        let request = self.client.post(self.url("auth/login")).json(&CredentialsBody {
            email: identifier,
            password: secret,
        });
        let response = self.send(request, "login").await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = error_message(&body);
            tracing::debug!("[HttpBackend] login -> {}", status);
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::BAD_REQUEST => MaeError::Authentication(
                    message.unwrap_or_else(|| LOGIN_FAILED.to_string()),
                ),
                _ => MaeError::backend(
                    status.as_u16(),
                    message.unwrap_or_else(|| fallback_message(status, &body)),
                ),
            });
        }

        let body = Self::read_json(response, "login").await?;
        decode_login(body)
    }

    async fn signup(&self, identifier: &str, secret: &str) -> Result<String> {
        let request = self.client.post(self.url("auth/signup")).json(&CredentialsBody {
            email: identifier,
            password: secret,
        });
        let response = self.send(request, "signup").await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            let message = error_message(&body).unwrap_or_else(|| SIGNUP_FAILED.to_string());
            return Err(MaeError::backend(status.as_u16(), message));
        }

        Ok(serde_json::from_str::<MessageResponse>(&body)
            .ok()
            .and_then(|r| r.message)
            .unwrap_or_else(|| SIGNUP_SUCCEEDED.to_string()))
    }
}

#[async_trait]
impl CollectionBackend for HttpBackend {
    async fn fetch_all(&self, endpoint: &str, credential: &Credential) -> Result<Vec<Entry>> {
        let request = self
            .client
            .get(self.url(endpoint))
            .bearer_auth(credential.expose());
        let response = self.send(request, endpoint).await?;
        let response = Self::check(response, endpoint).await?;

        decode_entries(Self::read_json(response, endpoint).await?)
    }

    async fn insert(
        &self,
        endpoint: &str,
        credential: &Credential,
        fields: &Fields,
    ) -> Result<Entry> {
        let request = self
            .client
            .post(self.url(endpoint))
            .bearer_auth(credential.expose())
            .json(fields);
        let response = self.send(request, endpoint).await?;
        let response = Self::check(response, endpoint).await?;

        Entry::from_document(Self::read_json(response, endpoint).await?)
    }

    async fn replace(
        &self,
        endpoint: &str,
        credential: &Credential,
        id: &EntryId,
        fields: &Fields,
    ) -> Result<()> {
        let request = self
            .client
            .put(self.entry_url(endpoint, id)?)
            .bearer_auth(credential.expose())
            .json(fields);
        let response = self.send(request, endpoint).await?;
        Self::check(response, endpoint).await?;
        Ok(())
    }

    async fn remove(&self, endpoint: &str, credential: &Credential, id: &EntryId) -> Result<()> {
        let request = self
            .client
            .delete(self.entry_url(endpoint, id)?)
            .bearer_auth(credential.expose());
        let response = self.send(request, endpoint).await?;
        Self::check(response, endpoint).await?;
        Ok(())
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Extracts `detail` or `message` from a JSON error body.
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["detail", "message"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

fn fallback_message(status: StatusCode, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string()
    } else {
        body.to_string()
    }
}

fn decode_login(body: Value) -> Result<LoginGrant> {
    let response: LoginResponse = serde_json::from_value(body)?;
    Ok(LoginGrant {
        credential: Credential::new(response.token),
        identity: response.user,
    })
}

fn decode_entries(body: Value) -> Result<Vec<Entry>> {
    match body {
        Value::Array(documents) => documents.into_iter().map(Entry::from_document).collect(),
        _ => Err(MaeError::Serialization {
            format: "JSON".to_string(),
            message: "expected an array of entries".to_string(),
        }),
    }
}
