use std::time::Duration;

use async_trait::async_trait;
use reqwest::header;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use terreno_application::DashboardConfigSource;
use terreno_core::{AppError, AppResult, SessionIdentity};
use terreno_domain::{HierarchyPayload, ProfileConfigurationDocument, Role, WidgetConfigDocument};
use tracing::{debug, warn};
use url::Url;

/// HTTP adapter for the remote dashboard documents.
pub struct HttpDashboardConfigSource {
    http_client: reqwest::Client,
    base_url: Url,
    bearer_token: Option<String>,
    max_attempts: u8,
    retry_backoff_ms: u64,
}

impl HttpDashboardConfigSource {
    /// Creates a new HTTP document source rooted at `base_url`.
    pub fn new(
        http_client: reqwest::Client,
        base_url: &str,
        bearer_token: Option<String>,
        max_attempts: u8,
        retry_backoff_ms: u64,
    ) -> AppResult<Self> {
        let base_url = Url::parse(base_url).map_err(|error| {
            AppError::Validation(format!("invalid upstream URL '{base_url}': {error}"))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::Validation(format!(
                "upstream URL '{base_url}' cannot carry a path"
            )));
        }

        Ok(Self {
            http_client,
            base_url,
            bearer_token: bearer_token.filter(|token| !token.trim().is_empty()),
            max_attempts: max_attempts.max(1),
            retry_backoff_ms: retry_backoff_ms.max(50),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> AppResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                AppError::Internal(format!("upstream URL '{}' cannot carry a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn profile_endpoint(&self, role: Role) -> AppResult<Url> {
        self.endpoint(&["perfiles", role.as_str(), "configuracion"])
    }

    fn widget_endpoint(&self) -> AppResult<Url> {
        self.endpoint(&["dashboard", "configuracion"])
    }

    fn hierarchy_endpoint(&self, identity: &SessionIdentity) -> AppResult<Url> {
        let mut url = self.endpoint(&["red", "jerarquia"])?;
        if let Some(subject) = identity.subject() {
            url.query_pairs_mut().append_pair("lider_id", subject);
        }
        Ok(url)
    }

    async fn fetch_body(
        &self,
        url: &Url,
        identity: Option<&SessionIdentity>,
    ) -> AppResult<Vec<u8>> {
        let mut attempt = 0_u8;
        let mut last_error: Option<String> = None;

        while attempt < self.max_attempts {
            attempt = attempt.saturating_add(1);

            let mut request = self
                .http_client
                .get(url.clone())
                .header(header::ACCEPT, "application/json");
            if let Some(token) = &self.bearer_token {
                request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
            }
            if let Some(role_key) = identity.and_then(SessionIdentity::role_key) {
                request = request.header("x-terreno-role", role_key);
            }

            match request.send().await {
                Ok(response) if response.status().is_success() => {
                    debug!(url = %url, attempt, "fetched upstream document");
                    return response
                        .bytes()
                        .await
                        .map(|body| body.to_vec())
                        .map_err(|error| {
                            AppError::Unavailable(format!(
                                "failed to read upstream document from '{url}': {error}"
                            ))
                        });
                }
                Ok(response)
                    if response.status().is_server_error()
                        || response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS =>
                {
                    last_error = Some(format!(
                        "transient HTTP status {} from '{url}'",
                        response.status()
                    ));
                }
                Ok(response) => {
                    let status = response.status();
                    let body = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "<body unavailable>".to_owned());
                    return Err(match status {
                        reqwest::StatusCode::NOT_FOUND => {
                            AppError::NotFound(format!("upstream document '{url}' not found"))
                        }
                        reqwest::StatusCode::UNAUTHORIZED => AppError::Unauthorized(format!(
                            "upstream rejected credentials for '{url}'"
                        )),
                        reqwest::StatusCode::FORBIDDEN => {
                            AppError::Forbidden(format!("upstream denied access to '{url}'"))
                        }
                        _ => AppError::Internal(format!(
                            "upstream '{url}' returned status {}: {body}",
                            status.as_u16()
                        )),
                    });
                }
                Err(error) => {
                    last_error = Some(format!("upstream transport error for '{url}': {error}"));
                }
            }

            if attempt < self.max_attempts {
                warn!(url = %url, attempt, "retrying upstream document fetch");
                let delay = self.retry_backoff_ms.saturating_mul(u64::from(attempt));
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
        }

        Err(AppError::Unavailable(last_error.unwrap_or_else(|| {
            "upstream document fetch exhausted retries".to_owned()
        })))
    }
}

fn decode_document<T>(url: &Url, body: &[u8]) -> AppResult<T>
where
    T: DeserializeOwned,
{
    serde_json::from_slice(body).map_err(|error| {
        AppError::Internal(format!(
            "failed to parse upstream document from '{url}': {error}"
        ))
    })
}

/// Decodes a nested hierarchy of any depth; the stack grows on demand.
fn decode_hierarchy(url: &Url, body: &[u8]) -> AppResult<HierarchyPayload> {
    let unavailable = |error: serde_json::Error| {
        AppError::Unavailable(format!(
            "hierarchy unavailable: malformed payload from '{url}': {error}"
        ))
    };

    let mut json = serde_json::Deserializer::from_slice(body);
    json.disable_recursion_limit();
    let payload = HierarchyPayload::deserialize(serde_stacker::Deserializer::new(&mut json))
        .map_err(unavailable)?;
    json.end().map_err(unavailable)?;

    Ok(payload)
}

#[async_trait]
impl DashboardConfigSource for HttpDashboardConfigSource {
    async fn fetch_feature_permissions(
        &self,
        role: Role,
    ) -> AppResult<ProfileConfigurationDocument> {
        let url = self.profile_endpoint(role)?;
        let body = self.fetch_body(&url, None).await?;
        decode_document(&url, &body)
    }

    async fn fetch_widget_config(&self) -> AppResult<WidgetConfigDocument> {
        let url = self.widget_endpoint()?;
        let body = self.fetch_body(&url, None).await?;
        decode_document(&url, &body)
    }

    async fn fetch_hierarchy(&self, identity: &SessionIdentity) -> AppResult<HierarchyPayload> {
        let url = self.hierarchy_endpoint(identity)?;
        let body = self.fetch_body(&url, Some(identity)).await?;
        decode_hierarchy(&url, &body)
    }
}
