//! Plain HTTP(S) self-update client.
//!
//! This crate coordinates the client side of an application update: it reads
//! a plain-text integer version marker, streams the updater artifact into a
//! configured local directory while reporting progress, optionally fetches
//! and stores a changelog, launches the downloaded artifact, and cleans the
//! local state up afterwards. Remote endpoints and credentials are fixed in
//! an immutable [`UpdaterConfig`]; the HTTP transport sits behind the
//! [`UpdateFetcher`] trait with one production implementation,
//! [`HttpFetcher`].
//!
//! ```ignore
//! use update_client::{Updater, UpdaterConfig, Version};
//!
//! # async fn demo() -> update_client::Result<()> {
//! let config = UpdaterConfig::builder()
//!     .version_url("https://example.com/app/version.txt")
//!     .updater_url("https://example.com/app/updater.exe")
//!     .changelog_url("https://example.com/app/changelog.txt")
//!     .local_dir("/var/lib/app/update")
//!     .build()?;
//! let updater = Updater::new(config)?;
//!
//! if updater.is_update_available(Version(3)).await? {
//!     let mut download = updater.download_update()?;
//!     while let Some(progress) = download.next_progress().await {
//!         println!("{} bytes", progress.bytes_received);
//!     }
//!     let artifact = download.wait().await?;
//!     println!("downloaded {}", artifact.display());
//!     updater.run_update(None)?;
//!     updater.clean()?;
//! }
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod fetcher;
mod net;
mod updater;
mod version;

pub use config::{Credentials, UpdaterConfig, UpdaterConfigBuilder};
pub use error::{BoxError, FetchError, FetchResult, Result, UpdaterError};
pub use fetcher::{DownloadProgress, HttpFetcher, HttpFetcherBuilder, ProgressSender, UpdateFetcher};
pub use net::{NetworkProbe, SystemNetworkProbe};
pub use updater::{DownloadHandle, Updater};
pub use version::Version;
