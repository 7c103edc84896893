//! HTTP client wrapper for interacting with the Easysearch cluster.

use std::time::Duration;

use reqwest::{Client, Method, StatusCode, header};
use serde_json::Value;

use crate::config::Config;
use crate::easysearch::shape::{APPLICATION_NDJSON, QueryParams};
use crate::easysearch::types::EasysearchError;

/// Request body accepted by the dispatch path.
///
/// Exactly one representation is ever sent: nothing, a structured JSON
/// document, or a pre-encoded newline-delimited payload with its own content
/// type. The enum makes the exclusivity structural.
#[derive(Debug)]
pub enum RequestBody<'a> {
    /// No request body.
    Empty,
    /// Structured document serialized as JSON.
    Json(&'a Value),
    /// Pre-encoded newline-delimited JSON sent verbatim.
    NdJson(&'a str),
}

/// Lightweight HTTP client for Easysearch operations.
///
/// Holds only the immutable connection settings; every request runs on its
/// own short-lived session, so no connection state leaks between calls and
/// the client is freely shareable across concurrent tool invocations.
pub struct EasysearchClient {
    base_url: String,
    username: String,
    password: String,
    verify_tls: bool,
    timeout: Duration,
}

impl EasysearchClient {
    /// Construct a new client from the resolved connection configuration.
    pub fn new(config: &Config) -> Result<Self, EasysearchError> {
        let base_url = normalize_base_url(&config.endpoint).map_err(EasysearchError::InvalidUrl)?;
        tracing::debug!(
            url = %base_url,
            username = %config.username,
            has_password = !config.password.is_empty(),
            verify_tls = config.verify_tls,
            timeout_secs = config.timeout_secs,
            "Initialized Easysearch HTTP client"
        );
        Ok(Self {
            base_url,
            username: config.username.clone(),
            password: config.password.clone(),
            verify_tls: config.verify_tls,
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }

    /// Build the session used for a single request.
    ///
    /// Dropping the returned client closes its connections; every request
    /// path drops it before returning, whether the call succeeded or failed.
    fn session(&self) -> Result<Client, EasysearchError> {
        let client = Client::builder()
            .user_agent(concat!("easysearch-mcp/", env!("CARGO_PKG_VERSION")))
            .timeout(self.timeout)
            .danger_accept_invalid_certs(!self.verify_tls)
            .build()?;
        Ok(client)
    }

    /// Issue exactly one HTTP call.
    ///
    /// An empty parameter set sends no query string. Transport failures
    /// surface immediately; status handling is left to the caller.
    async fn dispatch(
        &self,
        method: Method,
        path: &str,
        query: &QueryParams,
        body: RequestBody<'_>,
    ) -> Result<reqwest::Response, EasysearchError> {
        let session = self.session()?;
        let url = format_endpoint(&self.base_url, path);
        let mut request = session
            .request(method, url)
            .basic_auth(&self.username, Some(&self.password));
        if let Some(pairs) = query.as_pairs() {
            request = request.query(pairs);
        }
        request = match body {
            RequestBody::Empty => request,
            RequestBody::Json(document) => request.json(document),
            RequestBody::NdJson(payload) => request
                .header(header::CONTENT_TYPE, APPLICATION_NDJSON)
                .body(payload.to_string()),
        };
        Ok(request.send().await?)
    }

    async fn expect_json(response: reqwest::Response) -> Result<Value, EasysearchError> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            let error = EasysearchError::UnexpectedStatus { status, body };
            tracing::error!(error = %error, "Easysearch request failed");
            return Err(error);
        }
        Ok(serde_json::from_str(&body)?)
    }

    /// GET returning the parsed JSON body.
    pub async fn get(&self, path: &str, query: &QueryParams) -> Result<Value, EasysearchError> {
        let response = self
            .dispatch(Method::GET, path, query, RequestBody::Empty)
            .await?;
        Self::expect_json(response).await
    }

    /// GET returning the raw body for endpoints that produce plain text.
    pub async fn get_text(
        &self,
        path: &str,
        query: &QueryParams,
    ) -> Result<String, EasysearchError> {
        let response = self
            .dispatch(Method::GET, path, query, RequestBody::Empty)
            .await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            let error = EasysearchError::UnexpectedStatus { status, body };
            tracing::error!(error = %error, "Easysearch request failed");
            return Err(error);
        }
        Ok(body)
    }

    /// POST with an optional JSON body.
    pub async fn post(
        &self,
        path: &str,
        query: &QueryParams,
        body: Option<&Value>,
    ) -> Result<Value, EasysearchError> {
        let body = body.map_or(RequestBody::Empty, RequestBody::Json);
        let response = self.dispatch(Method::POST, path, query, body).await?;
        Self::expect_json(response).await
    }

    /// POST returning the raw body for formats other than JSON.
    pub async fn post_text(
        &self,
        path: &str,
        query: &QueryParams,
        body: Option<&Value>,
    ) -> Result<String, EasysearchError> {
        let body = body.map_or(RequestBody::Empty, RequestBody::Json);
        let response = self.dispatch(Method::POST, path, query, body).await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            let error = EasysearchError::UnexpectedStatus { status, body };
            tracing::error!(error = %error, "Easysearch request failed");
            return Err(error);
        }
        Ok(body)
    }

    /// POST a pre-encoded newline-delimited JSON payload.
    pub async fn post_ndjson(
        &self,
        path: &str,
        query: &QueryParams,
        payload: &str,
    ) -> Result<Value, EasysearchError> {
        let response = self
            .dispatch(Method::POST, path, query, RequestBody::NdJson(payload))
            .await?;
        Self::expect_json(response).await
    }

    /// PUT with an optional JSON body.
    pub async fn put(
        &self,
        path: &str,
        query: &QueryParams,
        body: Option<&Value>,
    ) -> Result<Value, EasysearchError> {
        let body = body.map_or(RequestBody::Empty, RequestBody::Json);
        let response = self.dispatch(Method::PUT, path, query, body).await?;
        Self::expect_json(response).await
    }

    /// DELETE with an optional JSON body.
    pub async fn delete(
        &self,
        path: &str,
        query: &QueryParams,
        body: Option<&Value>,
    ) -> Result<Value, EasysearchError> {
        let body = body.map_or(RequestBody::Empty, RequestBody::Json);
        let response = self.dispatch(Method::DELETE, path, query, body).await?;
        Self::expect_json(response).await
    }

    /// HEAD existence probe.
    ///
    /// Returns `true` only for HTTP 200; any other status, 404 included, maps
    /// to `false` rather than an error. Transport failures still propagate.
    pub async fn head(&self, path: &str) -> Result<bool, EasysearchError> {
        let response = self
            .dispatch(Method::HEAD, path, &QueryParams::new(), RequestBody::Empty)
            .await?;
        Ok(response.status() == StatusCode::OK)
    }
}

fn normalize_base_url(url: &str) -> Result<String, String> {
    let mut parsed = reqwest::Url::parse(url).map_err(|err| err.to_string())?;
    let path = parsed.path().trim_end_matches('/').to_string();
    parsed.set_path(&path);
    Ok(parsed.to_string())
}

fn format_endpoint(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, ConfigOverrides};
    use httpmock::{Method::GET, Method::HEAD, Method::POST, MockServer};
    use serde_json::json;

    fn test_client(base_url: &str) -> EasysearchClient {
        let config = Config {
            endpoint: base_url.to_string(),
            ..Config::resolve(ConfigOverrides::default()).expect("defaults")
        };
        EasysearchClient::new(&config).expect("client")
    }

    #[tokio::test]
    async fn remote_error_preserves_status_and_body() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/products/_doc/1");
                then.status(409)
                    .body("{\"error\":{\"type\":\"version_conflict_engine_exception\"}}");
            })
            .await;

        let client = test_client(&server.base_url());
        let error = client
            .post("/products/_doc/1", &QueryParams::new(), Some(&json!({})))
            .await
            .expect_err("conflict should fail");

        mock.assert();
        match error {
            EasysearchError::UnexpectedStatus { status, body } => {
                assert_eq!(status, StatusCode::CONFLICT);
                assert_eq!(
                    body,
                    "{\"error\":{\"type\":\"version_conflict_engine_exception\"}}"
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn head_maps_statuses_to_booleans_without_raising() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(HEAD).path("/present");
                then.status(200);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(HEAD).path("/missing");
                then.status(404);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(HEAD).path("/broken");
                then.status(500);
            })
            .await;

        let client = test_client(&server.base_url());
        assert!(client.head("/present").await.expect("present"));
        assert!(!client.head("/missing").await.expect("missing"));
        assert!(!client.head("/broken").await.expect("broken"));
    }

    #[tokio::test]
    async fn ndjson_payload_is_sent_verbatim_with_its_content_type() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/_bulk")
                    .header("content-type", APPLICATION_NDJSON)
                    .header_exists("authorization")
                    .body("{\"index\":{\"_index\":\"products\"}}\n{\"name\":\"A\"}\n");
                then.status(200).json_body(json!({
                    "took": 1,
                    "errors": false,
                    "items": [{ "index": { "status": 201 } }]
                }));
            })
            .await;

        let client = test_client(&server.base_url());
        let result = client
            .post_ndjson(
                "/_bulk",
                &QueryParams::new(),
                "{\"index\":{\"_index\":\"products\"}}\n{\"name\":\"A\"}\n",
            )
            .await
            .expect("bulk request");

        mock.assert();
        assert_eq!(result["errors"], json!(false));
    }

    #[tokio::test]
    async fn malformed_json_surfaces_as_decode_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/_cluster/health");
                then.status(200).body("not json");
            })
            .await;

        let client = test_client(&server.base_url());
        let error = client
            .get("/_cluster/health", &QueryParams::new())
            .await
            .expect_err("body should fail to parse");
        assert!(matches!(error, EasysearchError::Decode(_)));
    }

    #[tokio::test]
    async fn query_parameters_are_forwarded_when_present() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/_cat/indices")
                    .query_param("format", "json")
                    .query_param("health", "yellow");
                then.status(200).json_body(json!([]));
            })
            .await;

        let client = test_client(&server.base_url());
        let mut params = QueryParams::new();
        params.push("format", "json");
        params.push_opt("health", Some("yellow"));
        client
            .get("/_cat/indices", &params)
            .await
            .expect("cat request");
        mock.assert();
    }
}
