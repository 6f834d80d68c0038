//! Existence checks against freshly issued media URLs.

use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Lightweight "is this URL servable yet?" check.
///
/// Implementations never fail: transport errors and bad statuses both mean
/// "not ready".
#[async_trait]
pub trait ExistenceCheck: Send + Sync {
    /// Returns true when the resource responds successfully.
    async fn exists(&self, url: &str) -> bool;
}

#[async_trait]
impl<E: ExistenceCheck + ?Sized> ExistenceCheck for std::sync::Arc<E> {
    async fn exists(&self, url: &str) -> bool {
        (**self).exists(url).await
    }
}

/// `HEAD`-request existence check. 2xx and 3xx count as servable.
#[derive(Debug, Clone)]
pub struct HttpExistenceCheck {
    client: reqwest::Client,
}

impl HttpExistenceCheck {
    /// Default per-check timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a check with the default timeout.
    pub fn new() -> Result<Self> {
        Self::with_timeout(Self::DEFAULT_TIMEOUT)
    }

    /// Creates a check whose requests give up after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        // Redirects are reported as-is so a 3xx counts as servable.
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    /// Wraps a preconfigured client. Configure it not to follow redirects
    /// if 3xx should count as servable.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ExistenceCheck for HttpExistenceCheck {
    async fn exists(&self, url: &str) -> bool {
        match self.client.head(url).send().await {
            Ok(response) => {
                let status = response.status();
                tracing::debug!(url = %url, status = status.as_u16(), "existence check");
                status.is_success() || status.is_redirection()
            }
            Err(e) => {
                tracing::debug!(url = %url, "existence check failed: {e}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves one canned response per connection, `count` times.
    async fn serve(status_line: &'static str, count: usize) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            for _ in 0..count {
                let (mut socket, _) = listener.accept().await.unwrap();
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                let response = format!(
                    "HTTP/1.1 {status_line}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n"
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });
        format!("http://{addr}/video/abc123.mp4")
    }

    fn local_check() -> HttpExistenceCheck {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .no_proxy()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        HttpExistenceCheck::with_client(client)
    }

    #[tokio::test]
    async fn test_ok_is_servable() {
        let url = serve("200 OK", 1).await;
        let check = local_check();
        assert!(check.exists(&url).await);
    }

    #[tokio::test]
    async fn test_redirect_is_servable() {
        let url = serve("302 Found", 1).await;
        let check = local_check();
        assert!(check.exists(&url).await);
    }

    #[tokio::test]
    async fn test_not_found_is_not_servable() {
        let url = serve("404 Not Found", 1).await;
        let check = local_check();
        assert!(!check.exists(&url).await);
    }

    #[tokio::test]
    async fn test_connection_refused_is_not_servable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let check = local_check();
        assert!(!check.exists(&format!("http://{addr}/missing.mp4")).await);
    }

    #[tokio::test]
    async fn test_malformed_url_is_not_servable() {
        let check = HttpExistenceCheck::new().unwrap();
        assert!(!check.exists("not a url").await);
    }
}
