use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use reqwest::Url;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::config::UpdaterConfig;
use crate::error::{Result, UpdaterError};
use crate::fetcher::{DownloadProgress, HttpFetcher, UpdateFetcher};
use crate::net::{NetworkProbe, SystemNetworkProbe};
use crate::version::Version;

/// Client-side update lifecycle bound to one set of remote endpoints and one
/// local directory.
///
/// Each instance is logically single-owner: concurrent calls into the same
/// instance, or a second download started before the first completes, are
/// unsupported.
pub struct Updater<F> {
    config: UpdaterConfig,
    fetcher: Arc<F>,
    probe: Box<dyn NetworkProbe>,
}

impl Updater<HttpFetcher> {
    /// Construct an updater talking plain HTTP(S), creating the local
    /// directory if it does not exist yet.
    pub fn new(config: UpdaterConfig) -> Result<Self> {
        let mut builder = HttpFetcher::builder();
        if let Some(credentials) = config.credentials() {
            builder = builder.credentials(credentials.clone());
        }
        Self::with_fetcher(config, builder.build())
    }
}

impl<F> Updater<F>
where
    F: UpdateFetcher + 'static,
{
    /// Construct an updater over a custom transport.
    pub fn with_fetcher(config: UpdaterConfig, fetcher: F) -> Result<Self> {
        fs::create_dir_all(config.local_dir())?;
        Ok(Self {
            config,
            fetcher: Arc::new(fetcher),
            probe: Box::new(SystemNetworkProbe),
        })
    }

    /// Replace the network-availability probe.
    pub fn with_probe(mut self, probe: impl NetworkProbe + 'static) -> Self {
        self.probe = Box::new(probe);
        self
    }

    /// The configuration this updater was built from.
    pub fn config(&self) -> &UpdaterConfig {
        &self.config
    }

    /// Local path the update artifact is downloaded to.
    pub fn updater_path(&self) -> PathBuf {
        self.config.updater_path()
    }

    fn ensure_network(&self) -> Result<()> {
        if self.probe.is_available() {
            Ok(())
        } else {
            Err(UpdaterError::NetworkUnavailable)
        }
    }

    /// Read and parse the remote version marker.
    ///
    /// Not memoized: every call performs network I/O.
    pub async fn fetch_latest_version(&self) -> Result<Version> {
        self.ensure_network()?;
        debug!(url = self.config.version_url(), "fetching version marker");
        let text = self
            .fetcher
            .fetch_text(self.config.version_url())
            .await
            .map_err(UpdaterError::version_fetch)?;
        Version::parse(&text).map_err(UpdaterError::version_fetch)
    }

    /// Whether the remote version is strictly newer than `current`.
    pub async fn is_update_available(&self, current: Version) -> Result<bool> {
        Ok(self.fetch_latest_version().await? > current)
    }

    /// Start downloading the update artifact in the background.
    ///
    /// Returns immediately after the transfer has been initiated; the
    /// artifact must not be assumed on disk until the handle's completion
    /// channel fires. An interrupted transfer may leave a truncated file
    /// behind, which [`clean`](Updater::clean) removes. A started transfer
    /// cannot be aborted, and dropping the handle does not stop it.
    ///
    /// Must be called from within a tokio runtime.
    pub fn download_update(&self) -> Result<DownloadHandle> {
        self.ensure_network()?;
        let url = Url::parse(self.config.updater_url()).map_err(UpdaterError::update_fetch)?;
        let dest = self.config.updater_path();

        let (progress_tx, progress_rx) = mpsc::unbounded_channel();
        let (completion_tx, completion_rx) = oneshot::channel();
        let fetcher = Arc::clone(&self.fetcher);

        info!(url = %url, dest = %dest.display(), "starting update download");
        tokio::spawn(async move {
            let transfer = fetcher.fetch_file(url.as_str(), &dest, progress_tx).await;
            let outcome = transfer
                .map(|()| dest)
                .map_err(UpdaterError::update_fetch);
            match &outcome {
                Ok(path) => info!(path = %path.display(), "update download complete"),
                Err(err) => warn!(error = %err, "update download failed"),
            }
            let _ = completion_tx.send(outcome);
        });

        Ok(DownloadHandle {
            progress: progress_rx,
            completion: completion_rx,
        })
    }

    /// Fetch the remote changelog, trimmed of surrounding whitespace.
    ///
    /// Requires a changelog URL to be configured; without one this fails
    /// with the configuration error kind before any network activity.
    pub async fn fetch_changelog(&self) -> Result<String> {
        let url = self
            .config
            .changelog_url()
            .ok_or(UpdaterError::Config("changelog_url"))?;
        self.ensure_network()?;
        debug!(url, "fetching changelog");
        let text = self
            .fetcher
            .fetch_text(url)
            .await
            .map_err(UpdaterError::changelog)?;
        Ok(text.trim().to_owned())
    }

    /// Fetch the changelog and write it next to the update artifact, named
    /// after the changelog URL's final path segment.
    pub async fn save_changelog(&self) -> Result<PathBuf> {
        let text = self.fetch_changelog().await?;
        let path = self
            .config
            .changelog_path()
            .ok_or_else(|| UpdaterError::changelog("changelog URL does not name a file"))?;
        tokio::fs::write(&path, text.as_bytes())
            .await
            .map_err(UpdaterError::changelog)?;
        Ok(path)
    }

    /// Launch the downloaded artifact as a new OS process, optionally with a
    /// whitespace-separated argument string.
    ///
    /// Returns once the process has been spawned; the child is not awaited,
    /// so success means "launched", not "completed".
    pub fn run_update(&self, args: Option<&str>) -> Result<()> {
        let path = self.config.updater_path();
        if !path.is_file() {
            return Err(UpdaterError::run(format!(
                "no downloaded update at {}",
                path.display()
            )));
        }
        let mut command = Command::new(&path);
        if let Some(args) = args {
            command.args(args.split_whitespace());
        }
        command.spawn().map_err(UpdaterError::run)?;
        info!(path = %path.display(), "update launched");
        Ok(())
    }

    /// Delete the downloaded artifact and any saved changelog.
    ///
    /// Files that do not exist are skipped; calling this repeatedly is
    /// harmless.
    pub fn clean(&self) -> Result<()> {
        remove_if_exists(&self.config.updater_path())?;
        if let Some(changelog) = self.config.changelog_path() {
            remove_if_exists(&changelog)?;
        }
        Ok(())
    }
}

fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}

/// Subscription to an in-flight artifact download: a stream of progress
/// events plus a one-shot completion result.
pub struct DownloadHandle {
    progress: mpsc::UnboundedReceiver<DownloadProgress>,
    completion: oneshot::Receiver<Result<PathBuf>>,
}

impl DownloadHandle {
    /// Next progress event, or `None` once the transfer has stopped sending.
    pub async fn next_progress(&mut self) -> Option<DownloadProgress> {
        self.progress.recv().await
    }

    /// Wait for the transfer to finish and return the artifact path.
    pub async fn wait(self) -> Result<PathBuf> {
        match self.completion.await {
            Ok(outcome) => outcome,
            Err(_) => Err(UpdaterError::update_fetch(
                "download task stopped before reporting completion",
            )),
        }
    }

    /// Split into the raw progress and completion receivers.
    pub fn into_parts(
        self,
    ) -> (
        mpsc::UnboundedReceiver<DownloadProgress>,
        oneshot::Receiver<Result<PathBuf>>,
    ) {
        (self.progress, self.completion)
    }
}
