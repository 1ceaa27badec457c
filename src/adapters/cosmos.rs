//! Minimal Cosmos DB (SQL API) client over the REST interface.
//!
//! Only the calls the counter needs are implemented: point read and upsert of
//! a single document. Handles are cheap to create; the underlying
//! `reqwest::Client` and its connection pool are shared by every clone.

use crate::adapters::auth::{rfc1123_date, MasterKey};
use crate::config::{ConnectionString, FunctionConfig};
use crate::domain::model::CounterDocument;
use crate::domain::ports::CounterStore;
use crate::utils::error::{CounterError, Result};
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

pub const API_VERSION: &str = "2018-12-31";

const HEADER_DATE: &str = "x-ms-date";
const HEADER_VERSION: &str = "x-ms-version";
const HEADER_PARTITION_KEY: &str = "x-ms-documentdb-partitionkey";
const HEADER_IS_UPSERT: &str = "x-ms-documentdb-is-upsert";
const HEADER_RETRY_AFTER: &str = "x-ms-retry-after-ms";

#[derive(Debug, Clone)]
pub struct CosmosClient {
    http: Client,
    endpoint: Url,
    key: MasterKey,
}

impl CosmosClient {
    pub fn new(connection: &ConnectionString) -> Result<Self> {
        let mut endpoint = Url::parse(&connection.account_endpoint).map_err(|e| {
            CounterError::InvalidConfigValueError {
                field: "AccountEndpoint".to_string(),
                value: connection.account_endpoint.clone(),
                reason: format!("Invalid URL format: {}", e),
            }
        })?;
        if !endpoint.path().ends_with('/') {
            let path = format!("{}/", endpoint.path());
            endpoint.set_path(&path);
        }

        Ok(Self {
            http: Client::new(),
            endpoint,
            key: MasterKey::from_base64(&connection.account_key)?,
        })
    }

    pub fn from_connection_string(raw: &str) -> Result<Self> {
        Self::new(&ConnectionString::parse(raw)?)
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn database_client(&self, name: impl Into<String>) -> DatabaseClient {
        DatabaseClient {
            client: self.clone(),
            name: name.into(),
        }
    }

    /// Starts a signed request. `path` is relative to the account endpoint,
    /// `resource_link` is what the signature covers.
    fn request(&self, method: Method, path: &str, resource_link: &str) -> Result<reqwest::RequestBuilder> {
        let url = self
            .endpoint
            .join(path)
            .map_err(|e| CounterError::ConfigError {
                message: format!("Unable to build request URL for '{}': {}", path, e),
            })?;

        let date = rfc1123_date(chrono::Utc::now());
        let token = self
            .key
            .authorization_token(method.as_str(), "docs", resource_link, &date);

        Ok(self
            .http
            .request(method, url)
            .header(HEADER_DATE, date)
            .header(HEADER_VERSION, API_VERSION)
            .header(reqwest::header::AUTHORIZATION, token)
            .header(reqwest::header::ACCEPT, "application/json"))
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseClient {
    client: CosmosClient,
    name: String,
}

impl DatabaseClient {
    pub fn container_client(&self, name: impl Into<String>) -> ContainerClient {
        ContainerClient {
            client: self.client.clone(),
            link: format!("dbs/{}/colls/{}", self.name, name.into()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ContainerClient {
    client: CosmosClient,
    link: String,
}

impl ContainerClient {
    /// `dbs/{database}/colls/{container}`
    pub fn link(&self) -> &str {
        &self.link
    }

    pub async fn read_item<T: DeserializeOwned>(&self, id: &str, partition_key: &str) -> Result<T> {
        let document_link = format!("{}/docs/{}", self.link, id);
        tracing::debug!("Reading document {}", document_link);

        let response = self
            .client
            .request(Method::GET, &document_link, &document_link)?
            .header(HEADER_PARTITION_KEY, partition_key_header(partition_key)?)
            .send()
            .await?;

        let response = check_status(response, &document_link).await?;
        decode(response).await
    }

    pub async fn upsert_item<T>(&self, partition_key: &str, item: &T) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
    {
        let feed_path = format!("{}/docs", self.link);
        let body = serde_json::to_vec(item)?;
        tracing::debug!("Upserting document into {} ({} bytes)", feed_path, body.len());

        let response = self
            .client
            .request(Method::POST, &feed_path, &self.link)?
            .header(HEADER_PARTITION_KEY, partition_key_header(partition_key)?)
            .header(HEADER_IS_UPSERT, "True")
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let response = check_status(response, &feed_path).await?;
        decode(response).await
    }
}

fn partition_key_header(partition_key: &str) -> Result<HeaderValue> {
    let value = serde_json::to_string(&[partition_key])?;
    HeaderValue::from_str(&value).map_err(|e| CounterError::ConfigError {
        message: format!("Partition key cannot be sent as a header: {}", e),
    })
}

async fn check_status(response: Response, resource: &str) -> Result<Response> {
    let status = response.status();
    tracing::debug!("Cosmos response status for {}: {}", resource, status);

    if status.is_success() {
        return Ok(response);
    }

    match status {
        StatusCode::NOT_FOUND => Err(CounterError::NotFound {
            resource: resource.to_string(),
        }),
        StatusCode::TOO_MANY_REQUESTS => {
            let retry_after_ms = response
                .headers()
                .get(HEADER_RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<f64>().ok())
                .map(|ms| ms.ceil() as u64);
            Err(CounterError::Throttled { retry_after_ms })
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(CounterError::Unauthorized {
            status: status.as_u16(),
            message: error_message(response).await,
        }),
        _ => Err(CounterError::Http {
            status: status.as_u16(),
            message: error_message(response).await,
        }),
    }
}

// Cosmos error bodies look like {"code": "...", "message": "..."}.
async fn error_message(response: Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("Unknown error").to_string()
            } else {
                body
            }
        })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// `CounterStore` backed by the configured Cosmos container.
#[derive(Debug, Clone)]
pub struct CosmosCounterStore {
    client: CosmosClient,
    database_name: String,
    container_name: String,
}

impl CosmosCounterStore {
    pub fn new(client: CosmosClient, database_name: String, container_name: String) -> Self {
        Self {
            client,
            database_name,
            container_name,
        }
    }

    pub fn from_config(config: &FunctionConfig) -> Result<Self> {
        Ok(Self::new(
            CosmosClient::new(&config.connection)?,
            config.database_name.clone(),
            config.container_name.clone(),
        ))
    }

    fn container(&self) -> ContainerClient {
        self.client
            .database_client(self.database_name.as_str())
            .container_client(self.container_name.as_str())
    }
}

impl CounterStore for CosmosCounterStore {
    async fn read_item(&self, id: &str, partition_key: &str) -> Result<CounterDocument> {
        self.container().read_item(id, partition_key).await
    }

    async fn upsert_item(&self, document: &CounterDocument) -> Result<CounterDocument> {
        let partition_key = document
            .partition_key
            .as_deref()
            .unwrap_or(document.id.as_str());
        self.container().upsert_item(partition_key, document).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::ErrorCategory;
    use httpmock::prelude::*;
    use serde_json::json;

    const KEY: &str = "dmlzaXQtY291bnRlci10ZXN0LWtleQ==";
    const DOC_PATH: &str = "/dbs/CloudResumeChallengejad/colls/Counter/docs/1";
    const FEED_PATH: &str = "/dbs/CloudResumeChallengejad/colls/Counter/docs";

    fn store_for(server: &MockServer) -> CosmosCounterStore {
        let client = CosmosClient::from_connection_string(&format!(
            "AccountEndpoint={};AccountKey={};",
            server.base_url(),
            KEY
        ))
        .unwrap();
        CosmosCounterStore::new(
            client,
            "CloudResumeChallengejad".to_string(),
            "Counter".to_string(),
        )
    }

    #[test]
    fn test_endpoint_gets_trailing_slash() {
        let client = CosmosClient::from_connection_string(&format!(
            "AccountEndpoint=https://resume.documents.azure.com:443;AccountKey={}",
            KEY
        ))
        .unwrap();
        assert_eq!(client.endpoint().as_str(), "https://resume.documents.azure.com/");

        let container = client
            .database_client("CloudResumeChallengejad")
            .container_client("Counter");
        assert_eq!(container.link(), "dbs/CloudResumeChallengejad/colls/Counter");
    }

    #[tokio::test]
    async fn test_read_item_sends_signed_point_read() {
        let server = MockServer::start_async().await;
        let read_mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path(DOC_PATH)
                    .header("x-ms-documentdb-partitionkey", "[\"1\"]")
                    .header("x-ms-version", API_VERSION)
                    .header_exists("x-ms-date")
                    .header_exists("authorization");
                then.status(200)
                    .header("Content-Type", "application/json")
                    .json_body(json!({"id": "1", "partitionKey": "1", "value": 41, "_etag": "\"01\""}));
            })
            .await;

        let document = store_for(&server).read_item("1", "1").await.unwrap();

        read_mock.assert_async().await;
        assert_eq!(document.value, 41);
        assert_eq!(document.extra["_etag"], "\"01\"");
    }

    #[tokio::test]
    async fn test_upsert_item_posts_full_document() {
        let server = MockServer::start_async().await;
        let upsert_mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path(FEED_PATH)
                    .header("x-ms-documentdb-is-upsert", "True")
                    .header("x-ms-documentdb-partitionkey", "[\"1\"]")
                    .json_body_partial(r#"{"id": "1", "value": 42, "_etag": "\"01\""}"#);
                then.status(200)
                    .header("Content-Type", "application/json")
                    .json_body(json!({"id": "1", "partitionKey": "1", "value": 42, "_etag": "\"02\""}));
            })
            .await;

        let mut document: CounterDocument = serde_json::from_value(
            json!({"id": "1", "partitionKey": "1", "value": 41, "_etag": "\"01\""}),
        )
        .unwrap();
        document.value = 42;

        let stored = store_for(&server).upsert_item(&document).await.unwrap();

        upsert_mock.assert_async().await;
        assert_eq!(stored.value, 42);
        assert_eq!(stored.extra["_etag"], "\"02\"");
    }

    #[tokio::test]
    async fn test_missing_document_maps_to_not_found() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(DOC_PATH);
                then.status(404).json_body(json!({
                    "code": "NotFound",
                    "message": "Entity with the specified id does not exist in the system."
                }));
            })
            .await;

        let err = store_for(&server).read_item("1", "1").await.unwrap_err();
        assert_eq!(err.category(), ErrorCategory::NotFound);
    }

    #[tokio::test]
    async fn test_throttling_carries_retry_hint() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(DOC_PATH);
                then.status(429).header("x-ms-retry-after-ms", "12.5");
            })
            .await;

        let err = store_for(&server).read_item("1", "1").await.unwrap_err();
        assert!(matches!(err, CounterError::Throttled { retry_after_ms: Some(13) }));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_auth_failure_keeps_service_message() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(FEED_PATH);
                then.status(401).json_body(json!({
                    "code": "Unauthorized",
                    "message": "The input authorization token can't serve the request."
                }));
            })
            .await;

        let err = store_for(&server)
            .upsert_item(&CounterDocument::new("1", 1))
            .await
            .unwrap_err();
        match err {
            CounterError::Unauthorized { status, message } => {
                assert_eq!(status, 401);
                assert!(message.contains("authorization token"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_server_error_without_body_uses_reason() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(DOC_PATH);
                then.status(503);
            })
            .await;

        let err = store_for(&server).read_item("1", "1").await.unwrap_err();
        assert!(matches!(
            err,
            CounterError::Http { status: 503, ref message } if message == "Service Unavailable"
        ));
    }

    #[tokio::test]
    async fn test_malformed_body_is_reported() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(DOC_PATH);
                then.status(200).body("<html>not json</html>");
            })
            .await;

        let err = store_for(&server).read_item("1", "1").await.unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Malformed);
    }
}
