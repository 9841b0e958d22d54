use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use url::Url;

use super::error::ApiError;

/// Jira Assets REST client scoped to a single workspace
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    base_url: String,
    workspace_id: String,
    user: String,
    password: String,
}

impl Client {
    /// Create a client for `api_url` (normally https://api.atlassian.com)
    pub fn new(
        api_url: &str,
        workspace_id: &str,
        user: &str,
        password: &str,
    ) -> Result<Self, ApiError> {
        let parsed =
            Url::parse(api_url).map_err(|e| ApiError::InvalidUrl(format!("{api_url}: {e}")))?;
        if parsed.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(api_url.to_string()));
        }

        let http_client = reqwest::Client::builder().build()?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http_client,
                base_url: api_url.trim_end_matches('/').to_string(),
                workspace_id: workspace_id.to_string(),
                user: user.to_string(),
                password: password.to_string(),
            }),
        })
    }

    pub fn workspace_id(&self) -> &str {
        &self.inner.workspace_id
    }

    /// Full URL for a path relative to the workspace API root
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/jsm/assets/workspace/{}/v1{}",
            self.inner.base_url,
            urlencoding::encode(&self.inner.workspace_id),
            path
        )
    }

    /// Object operations
    pub fn objects(&self) -> super::objects::ObjectsApi<'_> {
        super::objects::ObjectsApi::new(self)
    }

    /// Object schema and object type operations
    pub fn object_schema(&self) -> super::object_schema::ObjectSchemaApi<'_> {
        super::object_schema::ObjectSchemaApi::new(self)
    }

    /// Status type configuration
    pub fn status_types(&self) -> super::status_types::StatusTypesApi<'_> {
        super::status_types::StatusTypesApi::new(self)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path);
        tracing::debug!("GET request to: {}", url);

        let request = self.inner.http_client.get(&url);
        let response = self.send(Method::GET, &url, request).await?;
        Self::parse_body(&url, response).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        tracing::debug!("POST request to: {}", url);

        let request = self.inner.http_client.post(&url).json(body);
        let response = self.send(Method::POST, &url, request).await?;
        Self::parse_body(&url, response).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        tracing::debug!("PUT request to: {}", url);

        let request = self.inner.http_client.put(&url).json(body);
        let response = self.send(Method::PUT, &url, request).await?;
        Self::parse_body(&url, response).await
    }

    /// DELETE ignores any response body
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let url = self.url(path);
        tracing::debug!("DELETE request to: {}", url);

        let request = self.inner.http_client.delete(&url);
        self.send(Method::DELETE, &url, request).await?;
        Ok(())
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        request: RequestBuilder,
    ) -> Result<Response, ApiError> {
        let response = request
            .basic_auth(&self.inner.user, Some(&self.inner.password))
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Response status: {}", status);
        if status.is_success() {
            return Ok(response);
        }

        let headers = format!("{:?}", response.headers());
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        tracing::error!(
            method = %method,
            url = %url,
            status = status.as_u16(),
            headers = %headers,
            body = %body,
            "Assets API request failed"
        );

        Err(ApiError::Status {
            method: method.to_string(),
            url: url.to_string(),
            status: status.as_u16(),
            headers,
            body,
        })
    }

    async fn parse_body<T: DeserializeOwned>(url: &str, response: Response) -> Result<T, ApiError> {
        let text = response.text().await?;
        tracing::debug!("API response body: {}", text);

        serde_json::from_str(&text).map_err(|e| {
            tracing::error!("Failed to deserialize response: {}, body: {}", e, text);
            ApiError::Decode {
                url: url.to_string(),
                message: e.to_string(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    const WS_PATH: &str = "/jsm/assets/workspace/ws-1/v1";

    #[tokio::test]
    async fn client_sends_basic_auth() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", format!("{WS_PATH}/object/42").as_str())
            .match_header("authorization", "Basic dXNlcjpzZWNyZXQ=")
            .with_body(r#"{"id":"42","label":"web-01"}"#)
            .create_async()
            .await;

        let client = Client::new(&server.url(), "ws-1", "user", "secret").unwrap();
        let value: serde_json::Value = client.get("/object/42").await.unwrap();

        assert_eq!(value["label"], "web-01");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn client_strips_trailing_slash_from_api_url() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("DELETE", format!("{WS_PATH}/object/7").as_str())
            .with_status(204)
            .create_async()
            .await;

        let client = Client::new(&format!("{}/", server.url()), "ws-1", "user", "secret").unwrap();
        tokio_test::assert_ok!(client.delete("/object/7").await);

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn client_reports_status_with_request_context() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", format!("{WS_PATH}/object/404").as_str())
            .with_status(404)
            .with_header("x-request-id", "abc")
            .with_body(r#"{"errorMessages":["Object not found"]}"#)
            .create_async()
            .await;

        let client = Client::new(&server.url(), "ws-1", "user", "secret").unwrap();
        let err = client
            .get::<serde_json::Value>("/object/404")
            .await
            .unwrap_err();

        match &err {
            ApiError::Status {
                method,
                url,
                status,
                headers,
                body,
            } => {
                assert_eq!(method, "GET");
                assert!(url.ends_with("/object/404"));
                assert_eq!(*status, 404);
                assert!(headers.contains("x-request-id"));
                assert!(body.contains("Object not found"));
            }
            other => panic!("expected status error, got {other:?}"),
        }
        assert_eq!(err.status_code(), Some(404));
    }

    #[tokio::test]
    async fn client_reports_undecodable_body() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", format!("{WS_PATH}/object/1").as_str())
            .with_body("not json")
            .create_async()
            .await;

        let client = Client::new(&server.url(), "ws-1", "user", "secret").unwrap();
        let result = client.get::<serde_json::Value>("/object/1").await;

        assert!(matches!(result, Err(ApiError::Decode { .. })));
    }

    #[test]
    fn client_rejects_invalid_url() {
        assert!(matches!(
            Client::new("not a url", "ws-1", "user", "secret"),
            Err(ApiError::InvalidUrl(_))
        ));
    }

    #[test]
    fn url_is_scoped_to_workspace() {
        let client = Client::new("https://api.atlassian.com", "ws-1", "u", "p").unwrap();
        assert_eq!(
            client.url("/object/create"),
            "https://api.atlassian.com/jsm/assets/workspace/ws-1/v1/object/create"
        );
    }
}
