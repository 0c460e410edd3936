use crate::constants::network::USER_AGENT;
use crate::errors::{ClientError, TransportError};
use crate::models::{HttpRequest, HttpResponse};
use crate::services::logger::Logger;
use crate::utils::fs_atomic::{ensure_dir_for_file, temp_sibling_path};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, Method};
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use url::Url;

/// One HTTP round trip. No retries happen at this layer.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;

    /// Fetches an unsigned URL (e.g. a presigned object-store link) into
    /// `destination` and returns the number of bytes written. On failure
    /// `destination` is left as it was.
    async fn download(&self, url: Url, destination: &Path) -> Result<u64, ClientError> {
        let response = self.send(HttpRequest::new(Method::GET, url)).await?;
        if !response.is_success() {
            return Err(ClientError::RequestRejected {
                status: response.status,
                body: response.body_snippet(),
            });
        }
        ensure_dir_for_file(destination)
            .map_err(|err| ClientError::io("Failed to create download directory", err))?;
        let temp = temp_sibling_path(destination);
        let written = async {
            tokio::fs::write(&temp, &response.body)
                .await
                .map_err(|err| ClientError::io(format!("Failed to write {}", temp.display()), err))?;
            commit_download(&temp, destination).await?;
            Ok::<_, ClientError>(response.body.len() as u64)
        }
        .await;
        if written.is_err() {
            discard_partial(&temp).await;
        }
        written
    }
}

async fn commit_download(temp: &Path, destination: &Path) -> Result<(), ClientError> {
    tokio::fs::rename(temp, destination)
        .await
        .map_err(|err| ClientError::io(format!("Failed to move download to {}", destination.display()), err))
}

async fn discard_partial(temp: &Path) {
    let _ = tokio::fs::remove_file(temp).await;
}

#[derive(Clone)]
pub struct ReqwestTransport {
    logger: Logger,
    client: Client,
    timeout_ms: u64,
}

impl ReqwestTransport {
    pub fn new(logger: Logger, timeout_ms: u64) -> Result<Self, ClientError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|err| ClientError::config(format!("Failed to build http client: {}", err)))?;
        Ok(Self {
            logger: logger.child("http"),
            client,
            timeout_ms,
        })
    }

    fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.logger.debug(
            "send",
            Some(&serde_json::json!({
                "method": request.method.as_str(),
                "url": request.url.as_str(),
            })),
        );
        let mut builder = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let timeout_ms = self.timeout_ms;
        let exchange = async move {
            let response = builder
                .send()
                .await
                .map_err(|err| TransportError::from_reqwest(err, timeout_ms))?;
            let status = response.status().as_u16();
            let headers = response.headers().clone();
            let body = response
                .bytes()
                .await
                .map_err(|err| TransportError::from_reqwest_body(err, timeout_ms))?;
            Ok::<_, TransportError>(HttpResponse {
                status,
                headers,
                body,
            })
        };
        let response = tokio::time::timeout(self.timeout(), exchange)
            .await
            .map_err(|_| TransportError::Timeout(self.timeout_ms))??;
        self.logger.debug(
            "received",
            Some(&serde_json::json!({ "status": response.status, "bytes": response.body.len() })),
        );
        Ok(response)
    }

    async fn download(&self, url: Url, destination: &Path) -> Result<u64, ClientError> {
        let temp = temp_sibling_path(destination);
        let outcome = tokio::time::timeout(self.timeout(), self.fetch_into(url, destination, &temp))
            .await
            .map_err(|_| ClientError::from(TransportError::Timeout(self.timeout_ms)))
            .and_then(|fetched| fetched);
        let written = match outcome {
            Ok(written) => written,
            Err(err) => {
                discard_partial(&temp).await;
                return Err(err);
            }
        };
        if let Err(err) = commit_download(&temp, destination).await {
            discard_partial(&temp).await;
            return Err(err);
        }
        self.logger.info(
            "download complete",
            Some(&serde_json::json!({ "path": destination.display().to_string(), "bytes": written })),
        );
        Ok(written)
    }
}

impl ReqwestTransport {
    /// Streams the body of `url` into `temp`. Runs entirely under the
    /// caller's timeout, headers and body alike.
    async fn fetch_into(&self, url: Url, destination: &Path, temp: &Path) -> Result<u64, ClientError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| TransportError::from_reqwest(err, self.timeout_ms))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::RequestRejected {
                status: status.as_u16(),
                body: HttpResponse::new(status.as_u16(), body).body_snippet(),
            });
        }

        ensure_dir_for_file(destination)
            .map_err(|err| ClientError::io("Failed to create download directory", err))?;
        let mut file = tokio::fs::File::create(temp)
            .await
            .map_err(|err| ClientError::io(format!("Failed to create {}", temp.display()), err))?;
        let mut written = 0u64;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|err| TransportError::from_reqwest_body(err, self.timeout_ms))?;
            file.write_all(&chunk)
                .await
                .map_err(|err| ClientError::io(format!("Failed to write {}", temp.display()), err))?;
            written += chunk.len() as u64;
        }
        file.flush()
            .await
            .map_err(|err| ClientError::io(format!("Failed to flush {}", temp.display()), err))?;
        Ok(written)
    }
}
