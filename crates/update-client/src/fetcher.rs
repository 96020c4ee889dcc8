use std::path::Path;

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use reqwest::Client;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;

use crate::config::Credentials;
use crate::error::FetchResult;

/// Snapshot of a download in flight.
#[derive(Debug, Clone, Copy)]
pub struct DownloadProgress {
    /// Bytes written to disk so far.
    pub bytes_received: u64,
    /// Total transfer size, when the server advertised one.
    pub total_bytes: Option<u64>,
}

/// Sender half of the progress channel handed to [`UpdateFetcher::fetch_file`].
pub type ProgressSender = mpsc::UnboundedSender<DownloadProgress>;

/// Abstraction over the remote reads the updater performs.
#[async_trait]
pub trait UpdateFetcher: Send + Sync {
    /// Fetch a UTF-8 text document.
    async fn fetch_text(&self, url: &str) -> FetchResult<String>;

    /// Stream the document at `url` into `dest`, reporting progress along
    /// the way. A partially written file is left in place on failure.
    async fn fetch_file(
        &self,
        url: &str,
        dest: &Path,
        progress: ProgressSender,
    ) -> FetchResult<()>;
}

/// Builder for [`HttpFetcher`].
#[derive(Default)]
pub struct HttpFetcherBuilder {
    client: Option<Client>,
    credentials: Option<Credentials>,
}

impl HttpFetcherBuilder {
    /// Provide a custom reqwest client instance.
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Basic-auth credentials applied to every request.
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Build the fetcher.
    pub fn build(self) -> HttpFetcher {
        HttpFetcher {
            client: self.client.unwrap_or_else(Client::new),
            credentials: self.credentials,
        }
    }
}

/// Production HTTP(S) transport.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    credentials: Option<Credentials>,
}

impl HttpFetcher {
    /// Create a new builder.
    pub fn builder() -> HttpFetcherBuilder {
        HttpFetcherBuilder::default()
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        let mut request = self.client.get(url);
        if let Some(credentials) = &self.credentials {
            request = request.basic_auth(&credentials.username, Some(&credentials.password));
        }
        request
    }
}

#[async_trait]
impl UpdateFetcher for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> FetchResult<String> {
        let response = self.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }

    async fn fetch_file(
        &self,
        url: &str,
        dest: &Path,
        progress: ProgressSender,
    ) -> FetchResult<()> {
        let response = self.get(url).send().await?.error_for_status()?;
        let total_bytes = response.content_length();

        let mut file = tokio::fs::File::create(dest).await?;
        let mut stream = response.bytes_stream();
        let mut bytes_received = 0u64;

        while let Some(chunk) = stream.next().await {
            let chunk: Bytes = chunk?;
            file.write_all(&chunk).await?;
            bytes_received += chunk.len() as u64;
            // The receiver may already be gone; the transfer still completes.
            let _ = progress.send(DownloadProgress {
                bytes_received,
                total_bytes,
            });
        }

        file.flush().await?;
        Ok(())
    }
}
