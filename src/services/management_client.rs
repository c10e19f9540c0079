//! Content Management API client implementing [`RemoteQueryPort`].
//!
//! Only count-bearing list endpoints are used: every request asks for
//! `include_count=true`, and count-only queries fetch a single item.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::errors::QueryError;
use crate::models::pagination::Page;
use crate::models::stats::ContentTypeRef;
use crate::services::query_port::RemoteQueryPort;

/// Request timeout for a single Management API call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Reqwest-backed Management API client.
#[derive(Debug, Clone)]
pub struct ManagementClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

/// `GET /v3/content_types` body.
#[derive(Debug, Deserialize)]
struct ContentTypesResponse {
    #[serde(default)]
    content_types: Vec<ContentTypeRef>,
    #[serde(default)]
    count: Option<u64>,
}

/// Any list body where only the count matters.
#[derive(Debug, Deserialize)]
struct CountResponse {
    #[serde(default)]
    count: Option<u64>,
}

/// Error body returned by the Management API.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error_message: Option<String>,
}

impl ManagementClient {
    /// Build a client for `{base_url}/v3`.
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self, QueryError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("stackstats/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        let base_url = Url::parse(base_url)
            .map_err(|e| QueryError::Transport(format!("invalid base URL {base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(QueryError::Transport(format!(
                "invalid base URL {base_url}: not a base"
            )));
        }

        Ok(Self {
            http,
            base_url,
            token,
        })
    }

    /// `{base_url}/v3/{segments...}`, each segment percent-encoded on its own.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push("v3").extend(segments);
        }
        url
    }

    async fn get<T: DeserializeOwned>(
        &self,
        stack_id: &str,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<T, QueryError> {
        let path = segments.join("/");
        let mut request = self
            .http
            .get(self.url(segments))
            .header("api_key", stack_id)
            .query(query);
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &path, &body));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| QueryError::Decode(format!("{path}: {e}")))
    }

    async fn count(&self, stack_id: &str, segments: &[&str]) -> Result<u64, QueryError> {
        let body: CountResponse = self.get(stack_id, segments, &count_query()).await?;
        Ok(body.count.unwrap_or(0))
    }
}

/// Query string for a count-only list request.
fn count_query() -> [(&'static str, String); 2] {
    [
        ("include_count", "true".to_string()),
        ("limit", "1".to_string()),
    ]
}

/// Map a non-success HTTP status to the query error taxonomy.
fn status_error(status: StatusCode, path: &str, body: &str) -> QueryError {
    let detail = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error_message)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            QueryError::PermissionDenied(format!("{path}: {detail}"))
        }
        StatusCode::NOT_FOUND => QueryError::NotFound(format!("{path}: {detail}")),
        _ => QueryError::Transport(format!("HTTP {} from {path}: {detail}", status.as_u16())),
    }
}

#[async_trait]
impl RemoteQueryPort for ManagementClient {
    async fn count_content_types(&self, stack_id: &str) -> Result<u64, QueryError> {
        self.count(stack_id, &["content_types"]).await
    }

    async fn count_assets(&self, stack_id: &str) -> Result<u64, QueryError> {
        self.count(stack_id, &["assets"]).await
    }

    async fn list_content_types_page(
        &self,
        stack_id: &str,
        offset: u64,
        limit: u64,
    ) -> Result<Page<ContentTypeRef>, QueryError> {
        let query = [
            ("include_count", "true".to_string()),
            ("skip", offset.to_string()),
            ("limit", limit.to_string()),
        ];
        let body: ContentTypesResponse = self.get(stack_id, &["content_types"], &query).await?;
        Ok(Page::new(body.content_types, body.count.unwrap_or(0)))
    }

    async fn count_entries(
        &self,
        stack_id: &str,
        content_type_uid: &str,
    ) -> Result<u64, QueryError> {
        self.count(stack_id, &["content_types", content_type_uid, "entries"])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forbidden_maps_to_permission_denied() {
        let body = r#"{"error_message":"You're not allowed in here unless you're logged in.","error_code":105}"#;
        let err = status_error(StatusCode::FORBIDDEN, "content_types/blog/entries", body);
        assert!(matches!(err, QueryError::PermissionDenied(_)));
        assert!(err.to_string().contains("not allowed"));
    }

    #[test]
    fn missing_content_type_maps_to_not_found() {
        let err = status_error(StatusCode::NOT_FOUND, "content_types/gone/entries", "");
        assert!(matches!(err, QueryError::NotFound(_)));
        assert!(err.is_access_denied());
    }

    #[test]
    fn server_error_maps_to_transport() {
        let err = status_error(StatusCode::BAD_GATEWAY, "assets", "<html>");
        assert_eq!(err.to_string(), "HTTP 502 from assets: Bad Gateway");
        assert!(!err.is_access_denied());
    }

    #[test]
    fn content_types_body_parses_with_extra_fields() {
        let body = r#"{"content_types":[{"uid":"blog","title":"Blog"},{"uid":"page"}],"count":2}"#;
        let parsed: ContentTypesResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.content_types, vec![ContentTypeRef::new("blog"), ContentTypeRef::new("page")]);
        assert_eq!(parsed.count, Some(2));
    }

    #[test]
    fn missing_count_reads_as_none() {
        let parsed: CountResponse = serde_json::from_str(r#"{"assets":[]}"#).unwrap();
        assert_eq!(parsed.count, None);
    }

    #[test]
    fn url_joins_version_prefix() {
        let client = ManagementClient::new("https://api.example.com/", None).unwrap();
        assert_eq!(client.url(&["assets"]).as_str(), "https://api.example.com/v3/assets");

        let client = ManagementClient::new("https://eu.example.com/cma", None).unwrap();
        assert_eq!(
            client.url(&["assets"]).as_str(),
            "https://eu.example.com/cma/v3/assets"
        );
    }

    #[test]
    fn content_type_uid_stays_one_path_segment() {
        let client = ManagementClient::new("https://api.example.com", None).unwrap();
        let url = client.url(&["content_types", "a/b?c#d", "entries"]);
        assert_eq!(
            url.as_str(),
            "https://api.example.com/v3/content_types/a%2Fb%3Fc%23d/entries"
        );
        assert_eq!(url.query(), None);
    }

    #[test]
    fn unparseable_base_url_is_rejected() {
        let err = ManagementClient::new("not a url", None).unwrap_err();
        assert!(err.to_string().starts_with("invalid base URL"), "{err}");
    }
}
