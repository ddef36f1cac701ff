use async_trait::async_trait;
use reqwest::{
    Client, Response,
    header::{self, HeaderMap, HeaderValue},
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::{
    auth::{OutgoingRequest, RequestAuthenticator},
    config::AppConfig,
    error::ClientError,
    models::{ApiEnvelope, Area, Credentials, SessionRecord},
};

// --- Transport ---

/// ApiClient
///
/// The single outgoing-call pipeline. Every request is described as an
/// `OutgoingRequest`, passed through the `RequestAuthenticator`, then sent with
/// reqwest. No retries: a failure is surfaced once.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    authenticator: RequestAuthenticator,
}

impl ApiClient {
    pub fn new(config: &AppConfig, authenticator: RequestAuthenticator) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            authenticator,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn authenticator(&self) -> &RequestAuthenticator {
        &self.authenticator
    }

    /// Absolute URLs pass through; API paths are joined onto the base URL.
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// send
    ///
    /// Authenticates and sends a request without a body. Non-2xx statuses become
    /// `ClientError::Status` carrying the response body.
    pub async fn send(&self, request: OutgoingRequest) -> Result<Response, ClientError> {
        self.dispatch(request, None).await
    }

    pub async fn send_json<B>(&self, request: OutgoingRequest, body: &B) -> Result<Response, ClientError>
    where
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_value(body)?;
        self.dispatch(request, Some(body)).await
    }

    pub async fn get_json<T>(&self, path: &str) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
    {
        let response = self.send(OutgoingRequest::get(path)).await?;
        decode(response).await
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send_json(OutgoingRequest::post(path), body).await?;
        decode(response).await
    }

    async fn dispatch(&self, request: OutgoingRequest, body: Option<Value>) -> Result<Response, ClientError> {
        let OutgoingRequest {
            method, url, headers, ..
        } = self.authenticator.authenticate(request);

        let target = self.url_for(&url);
        tracing::debug!(%method, url = %target, "Sending API request");

        let mut builder = self.http.request(method, target).headers(headers);
        if let Some(body) = body {
            builder = builder.json(&body);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(%status, url = %url, "API request rejected");
            return Err(ClientError::Status { status, body });
        }

        Ok(response)
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

// --- Remote Session Calls ---

/// SessionApi
///
/// The remote half of a session store: exchanging credentials for a token and
/// invalidating it. Abstracted so session stores can be tested without a server.
#[async_trait]
pub trait SessionApi: Send + Sync {
    async fn login(&self, area: Area, credentials: &Credentials) -> Result<SessionRecord, ClientError>;

    async fn logout(&self, area: Area) -> Result<(), ClientError>;
}

pub type SessionApiState = Arc<dyn SessionApi>;

/// HttpSessionApi
///
/// `SessionApi` over the portal backend:
/// - `POST /{area}/auth/login` with `{"email", "password"}`
/// - `POST /{area}/auth/logout`
///
/// Both go through the regular pipeline, so logout carries the area's token
/// while it is still stored.
#[derive(Clone)]
pub struct HttpSessionApi {
    client: Arc<ApiClient>,
}

impl HttpSessionApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SessionApi for HttpSessionApi {
    async fn login(&self, area: Area, credentials: &Credentials) -> Result<SessionRecord, ClientError> {
        let envelope: ApiEnvelope<Map<String, Value>> = self
            .client
            .post_json(&format!("/{area}/auth/login"), credentials)
            .await?;
        parse_login(area, envelope.data)
    }

    async fn logout(&self, area: Area) -> Result<(), ClientError> {
        self.client
            .send(OutgoingRequest::post(format!("/{area}/auth/logout")))
            .await?;
        Ok(())
    }
}

/// parse_login
///
/// Pulls the token and the area's user record out of a login payload such as
/// `{"token": "...", "admin": {...}}`. The record key is the area name.
pub fn parse_login(area: Area, mut data: Map<String, Value>) -> Result<SessionRecord, ClientError> {
    let token = match data.remove("token") {
        Some(Value::String(token)) if !token.is_empty() => token,
        _ => {
            return Err(ClientError::MalformedResponse(format!(
                "{area} login response has no token"
            )));
        }
    };
    let user = data.remove(area.as_str()).unwrap_or(Value::Null);
    Ok(SessionRecord { token, user })
}
