//! Remote configuration store
//!
//! [`ConfigSource`] is the seam between editor sessions and the console API.
//! [`ProjectApi`] implements it over the shared HTTP client:
//!
//! - `GET  /api/v3/projects/{id}/{kind}` returns the document
//! - `POST /api/v3/projects/{id}/{kind}` proposes a change on a new branch

use std::sync::Arc;

use async_trait::async_trait;
use fastbi_http::{HttpClientTrait, HttpError};
use serde::Deserialize;
use serde_yaml::Mapping;
use tracing::{debug, warn};
use url::Url;

use crate::{
    error::{EditorError, ParseError, Result},
    resource::{ConfigDocument, ResourceKind},
};

/// A proposed configuration change
#[derive(Debug, Clone, PartialEq)]
pub struct SaveRequest {
    pub kind: ResourceKind,
    pub owner_id: String,
    pub branch_name: String,
    pub content: Mapping,
}

impl SaveRequest {
    /// JSON body of the save call
    pub fn to_payload(&self) -> Result<serde_json::Value> {
        let content = serde_json::to_value(&self.content)
            .map_err(|e| EditorError::Validation(ParseError::new(e.to_string())))?;

        let mut payload = serde_json::Map::new();
        payload.insert(
            "branch_name".to_string(),
            serde_json::Value::String(self.branch_name.clone()),
        );
        payload.insert(
            "project_name".to_string(),
            serde_json::Value::String(self.owner_id.clone()),
        );
        payload.insert(self.kind.payload_field().to_string(), content);
        Ok(serde_json::Value::Object(payload))
    }
}

/// Server answer to a save
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SaveResponse {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub branch_name: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

fn default_success() -> bool {
    true
}

/// Where editor sessions load and save documents
#[async_trait]
pub trait ConfigSource: Send + Sync {
    /// Fetch the current document of `owner_id`
    async fn fetch(&self, kind: ResourceKind, owner_id: &str) -> Result<ConfigDocument>;

    /// Submit a change. A response with `success: false` is an error.
    async fn save(&self, request: &SaveRequest) -> Result<SaveResponse>;
}

/// Console API client for project configuration
#[derive(Clone)]
pub struct ProjectApi {
    http: Arc<dyn HttpClientTrait>,
}

impl ProjectApi {
    pub fn new(http: Arc<dyn HttpClientTrait>) -> Self {
        Self { http }
    }

    fn endpoint(&self, owner_id: &str, kind: ResourceKind) -> Result<String> {
        let mut url = Url::parse(self.http.base_url())
            .map_err(|e| HttpError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| HttpError::InvalidUrl("API base URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(["api", "v3", "projects", owner_id, kind.path_segment()]);
        Ok(url.into())
    }

    async fn post(&self, owner_id: &str, kind: ResourceKind, payload: &serde_json::Value) -> Result<SaveResponse> {
        let url = self.endpoint(owner_id, kind)?;
        let response = self.http.post_json(&url, payload).await?;
        let result: SaveResponse = response
            .json()
            .await
            .map_err(|e| HttpError::Decode(e.to_string()))?;

        if !result.success {
            let message = result
                .message
                .clone()
                .unwrap_or_else(|| format!("Failed to save {}", kind.path_segment()));
            warn!(owner_id, %kind, "Save rejected: {}", message);
            return Err(EditorError::ServerRejection(message));
        }

        Ok(result)
    }

    /// Change a single variable on a new branch without opening an editor
    pub async fn update_variable(
        &self,
        owner_id: &str,
        key: &str,
        value: serde_yaml::Value,
        branch_name: &str,
    ) -> Result<SaveResponse> {
        let value = serde_json::to_value(&value)
            .map_err(|e| EditorError::Validation(ParseError::new(e.to_string())))?;
        let mut variables = serde_json::Map::new();
        variables.insert(key.to_string(), value);
        let payload = serde_json::json!({
            "variables": variables,
            "branch_name": branch_name,
        });

        debug!(owner_id, key, branch_name, "Updating single variable");
        self.post(owner_id, ResourceKind::Variables, &payload).await
    }
}

#[async_trait]
impl ConfigSource for ProjectApi {
    async fn fetch(&self, kind: ResourceKind, owner_id: &str) -> Result<ConfigDocument> {
        let url = self.endpoint(owner_id, kind)?;
        debug!(owner_id, %kind, "Fetching configuration");

        let response = self.http.get(&url).await?;
        let body: serde_yaml::Value = response
            .json()
            .await
            .map_err(|e| HttpError::Decode(e.to_string()))?;

        let content = kind.extract_content(body).ok_or_else(|| {
            HttpError::Decode(format!("{} payload is not a mapping", kind.path_segment()))
        })?;

        Ok(ConfigDocument::new(owner_id, content))
    }

    async fn save(&self, request: &SaveRequest) -> Result<SaveResponse> {
        let payload = request.to_payload()?;
        debug!(
            owner_id = %request.owner_id,
            kind = %request.kind,
            branch = %request.branch_name,
            "Saving configuration"
        );
        self.post(&request.owner_id, request.kind, &payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fastbi_http::{HttpClient, HttpConfig};
    use wiremock::{
        matchers::{body_json, header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn api_for(server: &MockServer) -> ProjectApi {
        let config = HttpConfig::new()
            .with_base_url(server.uri())
            .with_api_key("test-key");
        ProjectApi::new(Arc::new(HttpClient::new(config).unwrap()))
    }

    fn mapping(text: &str) -> Mapping {
        serde_yaml::from_str(text).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_variables_unwraps_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/projects/proj1/variables"))
            .and(header("X-API-KEY", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "variables": {"DAG_OWNER": "ops", "PROJECT_LEVEL": 2}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let doc = api_for(&server)
            .fetch(ResourceKind::Variables, "proj1")
            .await
            .unwrap();
        assert_eq!(doc.owner_id, "proj1");
        assert_eq!(doc.content, mapping("DAG_OWNER: ops\nPROJECT_LEVEL: 2\n"));
    }

    #[tokio::test]
    async fn test_fetch_profiles_is_raw_mapping() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/projects/proj1/profiles"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "default": {"target": "dev"}
            })))
            .mount(&server)
            .await;

        let doc = api_for(&server)
            .fetch(ResourceKind::Profiles, "proj1")
            .await
            .unwrap();
        assert_eq!(doc.content, mapping("default:\n  target: dev\n"));
    }

    #[tokio::test]
    async fn test_owner_id_is_one_path_segment() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/projects/team%2Fproj/variables"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"variables": {}})))
            .expect(1)
            .mount(&server)
            .await;

        let doc = api_for(&server)
            .fetch(ResourceKind::Variables, "team/proj")
            .await
            .unwrap();
        assert!(doc.content.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_failure_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = api_for(&server)
            .fetch(ResourceKind::Variables, "proj1")
            .await
            .unwrap_err();
        assert!(matches!(err, EditorError::Transport(_)));
    }

    #[tokio::test]
    async fn test_save_posts_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v3/projects/proj1/profiles"))
            .and(body_json(serde_json::json!({
                "branch_name": "dbt_project_profiles_config_7",
                "project_name": "proj1",
                "profiles": {"default": {"target": "prod"}}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "branch_name": "dbt_project_profiles_config_7"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let request = SaveRequest {
            kind: ResourceKind::Profiles,
            owner_id: "proj1".to_string(),
            branch_name: "dbt_project_profiles_config_7".to_string(),
            content: mapping("default:\n  target: prod\n"),
        };
        let response = api_for(&server).save(&request).await.unwrap();
        assert!(response.success);
        assert_eq!(
            response.branch_name.as_deref(),
            Some("dbt_project_profiles_config_7")
        );
    }

    #[test]
    fn test_payload_carries_merged_profiles() {
        let content = crate::codec::deserialize(
            "base: &b\n  type: postgres\n  threads: 4\ndev:\n  <<: *b\n  schema: dev\n",
        )
        .unwrap();
        let request = SaveRequest {
            kind: ResourceKind::Profiles,
            owner_id: "proj1".to_string(),
            branch_name: "b".to_string(),
            content,
        };

        let payload = request.to_payload().unwrap();
        let dev = &payload["profiles"]["dev"];
        assert!(dev.get("<<").is_none());
        assert_eq!(dev["type"], "postgres");
        assert_eq!(dev["threads"], 4);
        assert_eq!(dev["schema"], "dev");
    }

    #[tokio::test]
    async fn test_save_success_false_is_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": false,
                "message": "Repository is locked"
            })))
            .mount(&server)
            .await;

        let request = SaveRequest {
            kind: ResourceKind::Variables,
            owner_id: "proj1".to_string(),
            branch_name: "b".to_string(),
            content: Mapping::new(),
        };
        let err = api_for(&server).save(&request).await.unwrap_err();
        assert!(matches!(err, EditorError::ServerRejection(ref m) if m == "Repository is locked"));
    }

    #[tokio::test]
    async fn test_save_error_status_with_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "success": false,
                "message": "Invalid project"
            })))
            .mount(&server)
            .await;

        let request = SaveRequest {
            kind: ResourceKind::Variables,
            owner_id: "proj1".to_string(),
            branch_name: "b".to_string(),
            content: Mapping::new(),
        };
        let err = api_for(&server).save(&request).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid project");
    }

    #[tokio::test]
    async fn test_update_variable_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v3/projects/proj1/variables"))
            .and(body_json(serde_json::json!({
                "variables": {"DAG_OWNER": "analytics"},
                "branch_name": "update_DAG_OWNER_1"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "branch_name": "update_DAG_OWNER_1"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = api_for(&server)
            .update_variable(
                "proj1",
                "DAG_OWNER",
                serde_yaml::Value::String("analytics".to_string()),
                "update_DAG_OWNER_1",
            )
            .await
            .unwrap();
        assert_eq!(response.branch_name.as_deref(), Some("update_DAG_OWNER_1"));
    }
}
