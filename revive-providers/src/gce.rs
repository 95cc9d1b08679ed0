//! Google Compute Engine over the v1 REST API.

use async_trait::async_trait;
use reqwest::header::{CONTENT_LENGTH, HeaderValue};
use reqwest::{Client, Method, Url};
use revive_common::{ComputeError, InstanceDescriptor, InstanceRef, Operation};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::sleep;

use crate::{ComputeProvider, Connector};

pub const DEFAULT_API_BASE_URL: &str = "https://compute.googleapis.com/compute/v1";
pub const DEFAULT_METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

const ERROR_BODY_PREVIEW_CHARS: usize = 500;

#[derive(Debug, Clone)]
pub struct GceConfig {
    pub api_base_url: String,
    pub access_token: Option<String>,
    pub access_token_file: Option<PathBuf>,
    pub metadata_token_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for GceConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            access_token: None,
            access_token_file: None,
            metadata_token_url: DEFAULT_METADATA_TOKEN_URL.to_string(),
            connect_timeout: Duration::from_secs(5),
            // zoneOperations.wait holds the request open for up to ~2 minutes.
            request_timeout: Duration::from_secs(150),
            poll_interval: Duration::from_secs(1),
        }
    }
}

pub struct GceConnector {
    config: GceConfig,
}

impl GceConnector {
    pub fn new(config: GceConfig) -> Self {
        Self { config }
    }

    fn build_client(&self) -> Result<Client, ComputeError> {
        // Default reqwest client has no overall timeout. If the API stalls, the call hangs forever.
        Client::builder()
            .connect_timeout(self.config.connect_timeout)
            .timeout(self.config.request_timeout)
            .build()
            .map_err(|e| ComputeError::connection(format!("failed to build HTTP client: {}", e)))
    }

    fn base_url(&self) -> Result<Url, ComputeError> {
        let url = Url::parse(self.config.api_base_url.trim()).map_err(|e| {
            ComputeError::connection(format!(
                "invalid API base URL {:?}: {}",
                self.config.api_base_url, e
            ))
        })?;
        if url.cannot_be_a_base() {
            return Err(ComputeError::connection(format!(
                "invalid API base URL {:?}",
                self.config.api_base_url
            )));
        }
        Ok(url)
    }

    /// Token file, then static token, then the metadata server.
    async fn resolve_token(&self, client: &Client) -> Result<String, ComputeError> {
        let from_file = self.config.access_token_file.as_ref().and_then(|path| {
            match std::fs::read_to_string(path) {
                Ok(s) => Some(s.trim().to_string()),
                Err(e) => {
                    tracing::warn!(
                        "⚠️ [GCE API] cannot read access token file {}: {}",
                        path.display(),
                        e
                    );
                    None
                }
            }
        });
        let static_token = from_file
            .into_iter()
            .chain(self.config.access_token.iter().map(|s| s.trim().to_string()))
            .find(|s| !s.is_empty());
        if let Some(token) = static_token {
            return Ok(token);
        }

        fetch_metadata_token(client, &self.config.metadata_token_url).await
    }
}

#[derive(Deserialize)]
struct MetadataToken {
    access_token: String,
}

async fn fetch_metadata_token(client: &Client, url: &str) -> Result<String, ComputeError> {
    tracing::debug!("🔵 [GCE API] GET {} - fetching access token from metadata server", url);
    let resp = client
        .get(url)
        .header("Metadata-Flavor", "Google")
        .send()
        .await
        .map_err(|e| {
            ComputeError::connection(format!(
                "no access token configured and metadata server unreachable: {}",
                e
            ))
        })?;

    let status = resp.status();
    if !status.is_success() {
        return Err(ComputeError::connection(format!(
            "metadata server token request failed: status={}",
            status.as_u16()
        )));
    }

    let token: MetadataToken = resp.json().await.map_err(|e| {
        ComputeError::connection(format!("invalid metadata server token response: {}", e))
    })?;
    if token.access_token.trim().is_empty() {
        return Err(ComputeError::connection("metadata server returned an empty access token"));
    }
    Ok(token.access_token)
}

#[async_trait]
impl Connector for GceConnector {
    async fn connect(&self) -> Result<Box<dyn ComputeProvider>, ComputeError> {
        let base_url = self.base_url()?;
        let client = self.build_client()?;
        let token = self.resolve_token(&client).await?;
        Ok(Box::new(GceProvider {
            client,
            base_url,
            token,
            poll_interval: self.config.poll_interval,
        }))
    }
}

pub struct GceProvider {
    client: Client,
    base_url: Url,
    token: String,
    poll_interval: Duration,
}

impl GceProvider {
    /// `{base}/projects/{project}/zones/{zone}/{tail...}`, each segment percent-encoded.
    fn zonal_url(&self, instance: &InstanceRef, tail: &[&str]) -> Result<Url, ComputeError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ComputeError::request(None, format!("invalid API base URL {}", self.base_url))
            })?
            .pop_if_empty()
            .extend([
                "projects",
                instance.project_id.as_str(),
                "zones",
                instance.zone.as_str(),
            ])
            .extend(tail);
        Ok(url)
    }

    async fn call<T: DeserializeOwned>(&self, method: Method, url: Url) -> Result<T, ComputeError> {
        tracing::debug!("🔵 [GCE API] {} {}", method, url);

        let mut req = self
            .client
            .request(method.clone(), url.clone())
            .bearer_auth(&self.token);
        if method == Method::POST {
            req = req.header(CONTENT_LENGTH, HeaderValue::from_static("0"));
        }

        let resp = req
            .send()
            .await
            .map_err(|e| ComputeError::request(None, format!("{} {} failed: {}", method, url, e)))?;

        let status = resp.status();
        let status_code = status.as_u16();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            tracing::warn!(
                "❌ [GCE API] {} {} failed: status={}, response={}",
                method,
                url,
                status_code,
                preview(&text)
            );
            return Err(ComputeError::request(
                Some(status_code),
                format!("status={} {}", status_code, api_error_message(&text)),
            ));
        }

        tracing::debug!("✅ [GCE API] {} {} succeeded: status={}", method, url, status_code);
        resp.json::<T>().await.map_err(|e| {
            ComputeError::request(
                Some(status_code),
                format!("invalid response body from {} {}: {}", method, url, e),
            )
        })
    }
}

#[async_trait]
impl ComputeProvider for GceProvider {
    async fn get_instance(
        &self,
        instance: &InstanceRef,
    ) -> Result<InstanceDescriptor, ComputeError> {
        let url = self.zonal_url(instance, &["instances", instance.instance_name.as_str()])?;
        self.call(Method::GET, url).await
    }

    async fn start_instance(&self, instance: &InstanceRef) -> Result<Operation, ComputeError> {
        let url = self.zonal_url(
            instance,
            &["instances", instance.instance_name.as_str(), "start"],
        )?;
        let op: Operation = self.call(Method::POST, url).await?;
        tracing::debug!(
            "🔵 [GCE API] start accepted for {}: operation={}, status={:?}",
            instance,
            op.name,
            op.status
        );
        Ok(op)
    }

    async fn wait_operation(
        &self,
        instance: &InstanceRef,
        operation: Operation,
    ) -> Result<Operation, ComputeError> {
        let mut op = operation;
        while !op.is_done() {
            if op.name.is_empty() {
                return Err(ComputeError::request(
                    None,
                    format!("the operation name should be set, operation={:?}", op),
                ));
            }
            let url = self.zonal_url(instance, &["operations", op.name.as_str(), "wait"])?;
            let next: Operation = self.call(Method::POST, url).await?;
            if !next.is_done() && !self.poll_interval.is_zero() {
                sleep(self.poll_interval).await;
            }
            op = next;
        }

        if let Err(error) = op.to_result() {
            tracing::warn!("❌ [GCE API] operation {} finished with error: {}", op.name, error);
            return Err(ComputeError::Operation {
                operation: op.name.clone(),
                error,
            });
        }
        Ok(op)
    }
}

#[derive(Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

/// Human-readable message from a Google API error body, falling back to the raw text.
fn api_error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorEnvelope>(body) {
        Ok(env) => match env.error.status {
            Some(status) => format!("{}: {}", status, env.error.message),
            None => env.error.message,
        },
        Err(_) => preview(body),
    }
}

fn preview(text: &str) -> String {
    if text.chars().count() > ERROR_BODY_PREVIEW_CHARS {
        let head: String = text.chars().take(ERROR_BODY_PREVIEW_CHARS).collect();
        format!("{}... (truncated)", head)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_message_uses_status_and_message() {
        let body = r#"{"error":{"code":403,"message":"Required 'compute.instances.get' permission","status":"PERMISSION_DENIED"}}"#;
        assert_eq!(
            api_error_message(body),
            "PERMISSION_DENIED: Required 'compute.instances.get' permission"
        );
    }

    #[test]
    fn api_error_message_falls_back_to_body() {
        assert_eq!(api_error_message("Bad Gateway"), "Bad Gateway");
        let long = "x".repeat(ERROR_BODY_PREVIEW_CHARS + 10);
        assert!(api_error_message(&long).ends_with("... (truncated)"));
    }

    #[test]
    fn zonal_url_encodes_segments() {
        let provider = GceProvider {
            client: Client::new(),
            base_url: Url::parse("https://compute.googleapis.com/compute/v1/").unwrap(),
            token: "t".to_string(),
            poll_interval: Duration::ZERO,
        };
        let instance = InstanceRef::new("proj-a", "us-central1-a", "vm 1");
        let url = provider
            .zonal_url(&instance, &["instances", instance.instance_name.as_str(), "start"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://compute.googleapis.com/compute/v1/projects/proj-a/zones/us-central1-a/instances/vm%201/start"
        );
    }
}
