use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{Result, UpdaterError};

/// Basic-auth credentials applied to every remote request.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Remote endpoints and local directory an updater is bound to.
///
/// Immutable after construction; build one through [`UpdaterConfig::builder`].
/// To change credentials or endpoints, construct a new configuration.
#[derive(Debug, Clone)]
pub struct UpdaterConfig {
    version_url: String,
    updater_url: String,
    changelog_url: Option<String>,
    local_dir: PathBuf,
    credentials: Option<Credentials>,
}

impl UpdaterConfig {
    /// Create a new builder.
    pub fn builder() -> UpdaterConfigBuilder {
        UpdaterConfigBuilder::default()
    }

    /// URL of the plain-text version marker.
    pub fn version_url(&self) -> &str {
        &self.version_url
    }

    /// URL of the update artifact.
    pub fn updater_url(&self) -> &str {
        &self.updater_url
    }

    /// URL of the plain-text changelog, when configured.
    pub fn changelog_url(&self) -> Option<&str> {
        self.changelog_url.as_deref()
    }

    /// Directory downloaded files are placed in.
    pub fn local_dir(&self) -> &Path {
        &self.local_dir
    }

    /// Basic-auth credentials, when configured.
    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// Local destination of the update artifact. Always derived from the
    /// configured updater URL so the two cannot drift apart.
    pub fn updater_path(&self) -> PathBuf {
        self.local_dir.join(url_basename(&self.updater_url))
    }

    /// Local destination of the saved changelog, when a changelog URL is
    /// configured and names a file.
    pub fn changelog_path(&self) -> Option<PathBuf> {
        let name = url_basename(self.changelog_url.as_deref()?);
        if name.is_empty() {
            None
        } else {
            Some(self.local_dir.join(name))
        }
    }
}

/// Builder for [`UpdaterConfig`].
#[derive(Debug, Default)]
pub struct UpdaterConfigBuilder {
    version_url: Option<String>,
    updater_url: Option<String>,
    changelog_url: Option<String>,
    local_dir: Option<PathBuf>,
    credentials: Option<Credentials>,
}

impl UpdaterConfigBuilder {
    /// URL of the plain-text version marker. Mandatory.
    pub fn version_url(mut self, url: impl Into<String>) -> Self {
        self.version_url = Some(url.into());
        self
    }

    /// URL of the update artifact. Mandatory; its final path segment names
    /// the local artifact file.
    pub fn updater_url(mut self, url: impl Into<String>) -> Self {
        self.updater_url = Some(url.into());
        self
    }

    /// URL of the plain-text changelog. Optional; an empty string is the
    /// same as leaving it unset.
    pub fn changelog_url(mut self, url: impl Into<String>) -> Self {
        self.changelog_url = Some(url.into());
        self
    }

    /// Directory downloaded files are placed in. Mandatory.
    pub fn local_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.local_dir = Some(dir.into());
        self
    }

    /// Basic-auth credentials for all remote requests. Two empty strings
    /// mean anonymous requests.
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some(Credentials {
            username: username.into(),
            password: password.into(),
        });
        self
    }

    /// Validate and build the configuration.
    pub fn build(self) -> Result<UpdaterConfig> {
        let version_url = required(self.version_url, "version_url")?;
        let updater_url = required(self.updater_url, "updater_url")?;
        let local_dir = self
            .local_dir
            .filter(|dir| !dir.as_os_str().is_empty())
            .ok_or(UpdaterError::Config("local_dir"))?;

        // The artifact file is named after the URL; an URL without a final
        // path segment cannot produce a usable destination.
        if url_basename(&updater_url).is_empty() {
            return Err(UpdaterError::Config("updater_url"));
        }

        let changelog_url = self.changelog_url.filter(|url| !url.is_empty());
        let credentials = self
            .credentials
            .filter(|c| !(c.username.is_empty() && c.password.is_empty()));

        Ok(UpdaterConfig {
            version_url,
            updater_url,
            changelog_url,
            local_dir,
            credentials,
        })
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(UpdaterError::Config(field))
}

/// Final path segment of a URL, with any query or fragment stripped.
pub(crate) fn url_basename(url: &str) -> &str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit('/').next().unwrap_or(path)
}
