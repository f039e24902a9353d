//! HTTP client adapter for the portal
//!
//! All outbound requests go through [`PortalClient`]: one reqwest client
//! carrying the fixed header set, a per-call timeout, and transport-error
//! classification. Retry policy belongs to callers; this layer never retries.

use crate::config::PortalConfig;
use crate::portal::{body_prefix, PortalError};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// Browser-identifying user agent the portal expects
const PORTAL_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36";

/// HTTP client adapter for the upstream portal
pub struct PortalClient {
    client: Client,
    base_url: String,
}

impl PortalClient {
    /// Builds the client with the fixed portal header set
    ///
    /// # Arguments
    ///
    /// * `config` - The portal configuration (base URL)
    ///
    /// # Returns
    ///
    /// * `Ok(PortalClient)` - Successfully built client
    /// * `Err(PortalError)` - Failed to build the underlying HTTP client
    pub fn new(config: &PortalConfig) -> Result<Self, PortalError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(PORTAL_USER_AGENT));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/json, text/plain, */*"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(10))
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(|e| PortalError::Request {
                url: config.base_url.clone(),
                source: e,
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Issues a GET request and decodes the response as JSON
    ///
    /// # Arguments
    ///
    /// * `path` - Path under the base URL, e.g. "/portal/detail"
    /// * `query` - Query string parameters
    /// * `timeout` - Total timeout for this call
    pub async fn get_json(
        &self,
        path: &str,
        query: &[(&str, String)],
        timeout: Duration,
    ) -> Result<Value, PortalError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .query(query)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify_send_error(&url, e))?;

        decode_response(&url, response).await
    }

    /// Issues a POST request with a JSON body and decodes the response
    pub async fn post_json(
        &self,
        path: &str,
        body: &Value,
        timeout: Duration,
    ) -> Result<Value, PortalError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .json(body)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify_send_error(&url, e))?;

        decode_response(&url, response).await
    }
}

/// Classifies a reqwest send error into the portal error taxonomy
fn classify_send_error(url: &str, error: reqwest::Error) -> PortalError {
    if error.is_timeout() {
        PortalError::Timeout {
            url: url.to_string(),
        }
    } else {
        PortalError::Request {
            url: url.to_string(),
            source: error,
        }
    }
}

/// Checks the status line and decodes the body as JSON
async fn decode_response(url: &str, response: reqwest::Response) -> Result<Value, PortalError> {
    let status = response.status();
    let body = response.text().await.map_err(|e| {
        if e.is_timeout() {
            PortalError::Timeout {
                url: url.to_string(),
            }
        } else {
            PortalError::Request {
                url: url.to_string(),
                source: e,
            }
        }
    })?;

    if !status.is_success() {
        return Err(PortalError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
            body_prefix: body_prefix(&body),
        });
    }

    serde_json::from_str(&body).map_err(|_| PortalError::Decode {
        url: url.to_string(),
        body_prefix: body_prefix(&body),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PortalConfig;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_portal_config(base_url: &str) -> PortalConfig {
        PortalConfig {
            base_url: base_url.to_string(),
            tree_parent_id: "600007".to_string(),
            tree_site_id: "110".to_string(),
            category_code_prefix: "110-".to_string(),
            page_size: 15,
            exclude_district_prefixes: vec![],
            is_gov: true,
            is_province: true,
        }
    }

    #[test]
    fn test_build_client() {
        let config = test_portal_config("https://portal.example.gov/");
        let client = PortalClient::new(&config).unwrap();
        // Trailing slash is stripped so path joins stay clean
        assert_eq!(client.base_url, "https://portal.example.gov");
    }

    #[tokio::test]
    async fn test_get_json_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/portal/detail"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"success": true}"#))
            .mount(&server)
            .await;

        let client = PortalClient::new(&test_portal_config(&server.uri())).unwrap();
        let value = client
            .get_json("/portal/detail", &[], Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(value["success"], serde_json::json!(true));
    }

    #[tokio::test]
    async fn test_non_2xx_yields_http_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/portal/detail"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let client = PortalClient::new(&test_portal_config(&server.uri())).unwrap();
        let err = client
            .get_json("/portal/detail", &[], Duration::from_secs(5))
            .await
            .unwrap_err();
        match err {
            PortalError::HttpStatus {
                status,
                body_prefix,
                ..
            } => {
                assert_eq!(status, 502);
                assert_eq!(body_prefix, "bad gateway");
            }
            other => panic!("expected HttpStatus, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_json_yields_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/portal/detail"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
            .mount(&server)
            .await;

        let client = PortalClient::new(&test_portal_config(&server.uri())).unwrap();
        let err = client
            .get_json("/portal/detail", &[], Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, PortalError::Decode { .. }));
    }
}
