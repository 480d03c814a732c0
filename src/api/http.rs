//! Blocking HTTPS implementation of `ProxmoxApi`.

use super::types::{TaskHandle, TaskState, Vmid, parse_create_response, parse_next_id, parse_task_status};
use super::ProxmoxApi;
use crate::credentials::CredentialContext;
use crate::error::{ProvisionError, Result};
use crate::request::CreationRequest;
use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use std::error::Error as StdError;
use std::time::Duration;

/// Per-request timeout. Task status calls are quick; creation only queues a task.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Longest slice of an error body quoted back to the user.
const MAX_ERROR_BODY: usize = 512;

/// Proxmox API client authenticated with an API token.
pub struct HttpApi {
    client: Client,
    base_url: String,
}

impl HttpApi {
    /// Build a client from the credential context.
    ///
    /// The token travels in a default `Authorization` header marked
    /// sensitive, so reqwest keeps it out of its own debug output.
    pub fn new(credentials: &CredentialContext) -> Result<Self> {
        let mut auth = HeaderValue::from_str(credentials.authorization().expose_secret())
            .map_err(|_| {
                ProvisionError::CredentialError(
                    "API token contains characters not allowed in an HTTP header".to_string(),
                )
            })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("pve-lxc/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .danger_accept_invalid_certs(credentials.insecure())
            .build()
            .map_err(|e| {
                ProvisionError::TransportError(format!("failed to create HTTP client: {}", describe(&e)))
            })?;

        tracing::debug!(
            base_url = credentials.base_url(),
            user = credentials.user(),
            token = credentials.token_name(),
            insecure = credentials.insecure(),
            "API client ready"
        );

        Ok(Self {
            client,
            base_url: credentials.base_url().to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get(&self, path: &str) -> Result<String> {
        let url = self.url(path);
        tracing::debug!(%url, "GET");
        let response = self.client.get(&url).send().map_err(|e| send_error(&url, &e))?;
        read_body(&url, response)
    }

    fn post_form(&self, path: &str, body: String) -> Result<String> {
        let url = self.url(path);
        tracing::debug!(%url, "POST");
        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .map_err(|e| send_error(&url, &e))?;
        read_body(&url, response)
    }
}

impl ProxmoxApi for HttpApi {
    fn next_id(&self) -> Result<Vmid> {
        let body = self.get("/cluster/nextid")?;
        parse_next_id(&body)
    }

    fn create_container(&self, node: &str, request: &CreationRequest) -> Result<Option<TaskHandle>> {
        let path = format!("/nodes/{}/lxc", urlencoding::encode(node));
        let body = self.post_form(&path, request.to_form_body())?;
        Ok(parse_create_response(&body)?.map(|upid| TaskHandle {
            node: node.to_string(),
            upid,
        }))
    }

    fn task_status(&self, handle: &TaskHandle) -> Result<TaskState> {
        let path = format!(
            "/nodes/{}/tasks/{}/status",
            urlencoding::encode(&handle.node),
            urlencoding::encode(&handle.upid)
        );
        let body = self.get(&path)?;
        parse_task_status(&body)
    }
}

fn send_error(url: &str, err: &reqwest::Error) -> ProvisionError {
    ProvisionError::TransportError(format!("request to {} failed: {}", url, describe(err)))
}

fn read_body(url: &str, response: Response) -> Result<String> {
    let status = response.status();
    let body = response.text().map_err(|e| {
        ProvisionError::TransportError(format!(
            "failed to read response from {}: {}",
            url,
            describe(&e)
        ))
    })?;
    tracing::debug!(%url, %status, "response");

    check_status(url, status, &body)?;
    Ok(body)
}

/// Map an HTTP status onto the error taxonomy.
///
/// Authentication failures are transport problems (the run never got a
/// usable session); everything else non-2xx means the API answered with
/// something we cannot use.
pub(super) fn check_status(url: &str, status: StatusCode, body: &str) -> Result<()> {
    if status.is_success() {
        return Ok(());
    }

    let excerpt = excerpt(body);
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(ProvisionError::TransportError(format!(
            "authentication rejected by {} (HTTP {}){}",
            url,
            status.as_u16(),
            excerpt
        )));
    }

    Err(ProvisionError::ProtocolError(format!(
        "{} returned HTTP {}{}",
        url,
        status.as_u16(),
        excerpt
    )))
}

fn excerpt(body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        return String::new();
    }
    let cut: String = body.chars().take(MAX_ERROR_BODY).collect();
    format!(": {}", cut)
}

/// Render an error with its source chain, `outer: inner: root`.
fn describe(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
