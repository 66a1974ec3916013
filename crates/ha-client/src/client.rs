//! HTTP client for the Home Assistant state API

use async_trait::async_trait;
use ha_core::EntityRecord;
use reqwest::{header, Client, RequestBuilder};
use std::time::Duration;
use tracing::debug;

use crate::error::{ClientError, ClientResult};

/// Legacy API password header
const HEADER_HA_ACCESS: &str = "x-ha-access";

/// Anything that can report the hub's current entities
#[async_trait]
pub trait StateSource: Send + Sync {
    /// Fetch every entity currently known to the hub
    async fn fetch_states(&self) -> ClientResult<Vec<EntityRecord>>;
}

/// REST client for a Home Assistant instance
#[derive(Clone)]
pub struct HaClient {
    client: Client,
    base_url: String,
    token: Option<String>,
    password: Option<String>,
}

impl HaClient {
    /// Create a client for the API rooted at `base_url` (e.g. `http://host:8123/api`)
    ///
    /// A bearer `token` takes the `Authorization` header; a legacy `password`
    /// is sent as `x-ha-access`. Both may be given.
    pub fn new(
        base_url: &str,
        token: Option<String>,
        password: Option<String>,
    ) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(ClientError::Build)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            password,
        })
    }

    fn authorize(&self, mut request: RequestBuilder) -> RequestBuilder {
        if let Some(ref token) = self.token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        if let Some(ref password) = self.password {
            request = request.header(HEADER_HA_ACCESS, password);
        }
        request
    }

    /// Make a GET request and return the raw body of a successful response
    pub async fn get(&self, path: &str) -> ClientResult<String> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        debug!("GET {}", url);

        let response = self
            .authorize(self.client.get(&url).header(header::ACCEPT, "application/json"))
            .send()
            .await
            .map_err(|e| ClientError::Request {
                url: url.clone(),
                source: e,
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| ClientError::Request {
            url: url.clone(),
            source: e,
        })?;

        if !status.is_success() {
            return Err(ClientError::Status { url, status, body });
        }

        Ok(body)
    }
}

#[async_trait]
impl StateSource for HaClient {
    async fn fetch_states(&self) -> ClientResult<Vec<EntityRecord>> {
        let body = self.get("states").await?;
        let states: Vec<EntityRecord> =
            serde_json::from_str(&body).map_err(|e| ClientError::Decode {
                url: format!("{}/states", self.base_url),
                source: e,
            })?;

        debug!("Fetched {} entities", states.len());
        Ok(states)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serve one canned HTTP response and hand back the raw request text
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&request).into_owned()
        });

        (format!("http://{}/api", addr), handle)
    }

    #[tokio::test]
    async fn test_fetch_states_with_token() {
        let (url, server) = serve_once(
            "200 OK",
            r#"[{"entity_id":"light.kitchen","state":"on","attributes":{"friendly_name":"Kitchen"}},
                {"entity_id":"sun.sun","state":"above_horizon"}]"#,
        )
        .await;

        let client = HaClient::new(&url, Some("abc".to_string()), None).unwrap();
        let states = client.fetch_states().await.unwrap();
        let request = server.await.unwrap().to_lowercase();

        assert_eq!(states.len(), 2);
        assert_eq!(states[0].entity_id, "light.kitchen");
        assert!(states[1].attributes.is_empty());
        assert!(request.starts_with("get /api/states "));
        assert!(request.contains("authorization: bearer abc"));
        assert!(!request.contains("x-ha-access"));
    }

    #[tokio::test]
    async fn test_fetch_states_with_legacy_password() {
        let (url, server) = serve_once("200 OK", "[]").await;

        let client = HaClient::new(&format!("{}/", url), None, Some("hunter2".to_string())).unwrap();
        let states = client.fetch_states().await.unwrap();
        let request = server.await.unwrap().to_lowercase();

        assert!(states.is_empty());
        assert!(request.contains("x-ha-access: hunter2"));
        assert!(!request.contains("authorization:"));
    }

    #[tokio::test]
    async fn test_error_status() {
        let (url, server) = serve_once("401 Unauthorized", r#"{"message":"401: Unauthorized"}"#).await;

        let client = HaClient::new(&url, None, None).unwrap();
        let result = client.fetch_states().await;
        server.await.unwrap();

        match result {
            Err(ClientError::Status { status, body, .. }) => {
                assert_eq!(status.as_u16(), 401);
                assert!(body.contains("Unauthorized"));
            }
            other => panic!("expected status error, got {:?}", other.map(|s| s.len())),
        }
    }

    #[tokio::test]
    async fn test_invalid_body() {
        let (url, server) = serve_once("200 OK", r#"{"not":"a list"}"#).await;

        let client = HaClient::new(&url, None, None).unwrap();
        let result = client.fetch_states().await;
        server.await.unwrap();

        assert!(matches!(result, Err(ClientError::Decode { .. })));
    }

    #[tokio::test]
    async fn test_unreachable_host() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = HaClient::new(&format!("http://{}/api", addr), None, None).unwrap();
        let result = client.fetch_states().await;
        assert!(matches!(result, Err(ClientError::Request { .. })));
    }
}
