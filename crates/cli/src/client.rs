//! API client for communicating with the estimator service

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use url::Url;

/// API client for the estimator service
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = Url::parse(base_url).context("Invalid API URL")?;

        Ok(Self { client, base_url })
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("API error ({}): {}", status, body);
        }

        response.json().await.context("Failed to parse response")
    }

    /// Make a GET request, returning the status alongside the body so
    /// callers can render 503 probe responses instead of failing on them.
    pub async fn get_with_status(&self, path: &str) -> Result<(StatusCode, serde_json::Value)> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status();
        let body = response
            .json()
            .await
            .context("Failed to parse response")?;

        Ok((status, body))
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("API error ({}): {}", status, body);
        }

        response.json().await.context("Failed to parse response")
    }
}

// API response types

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimateResponse {
    pub estimate: f64,
    pub model_version: String,
    pub generated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaResponse {
    pub numeric_fields: Vec<String>,
    pub categorical_fields: Vec<CategoricalField>,
    pub feature_width: usize,
    pub model_version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoricalField {
    pub name: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_post_estimate_parses_response() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1/estimate")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "estimate": 4.85,
                    "model_version": "v1.2.0",
                    "generated_at": 1754000000
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let body = json!({"Year": 2018, "Fuel_Type": "Diesel"});
        let response: EstimateResponse = client.post("api/v1/estimate", &body).await.unwrap();

        mock.assert_async().await;
        assert_eq!(response.estimate, 4.85);
        assert_eq!(response.model_version, "v1.2.0");
    }

    #[tokio::test]
    async fn test_post_surfaces_error_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/v1/estimate")
            .with_status(422)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "error": "could not compute an estimate",
                    "code": "unknown_value",
                    "details": "field \"Fuel_Type\" has value \"Electric\" outside the trained vocabulary"
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let body = json!({"Fuel_Type": "Electric"});
        let err = client
            .post::<EstimateResponse, _>("api/v1/estimate", &body)
            .await
            .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("422"));
        assert!(message.contains("unknown_value"));
    }

    #[tokio::test]
    async fn test_get_with_status_keeps_probe_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/readyz")
            .with_status(503)
            .with_header("content-type", "application/json")
            .with_body(json!({"ready": false, "reason": "Estimator not yet initialized"}).to_string())
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let (status, body) = client.get_with_status("readyz").await.unwrap();

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["ready"], false);
    }

    #[test]
    fn test_invalid_url_rejected() {
        assert!(ApiClient::new("not a url").is_err());
    }
}
