use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;

/// Build the value of an HTTP `Authorization` header for basic auth.
///
/// Encodes `username:password` in Base64 and prepends `Basic `.
pub fn basic_auth_header(username: &str, password: &str) -> String {
    let credentials = format!("{username}:{password}");
    format!("Basic {}", BASE64.encode(credentials.as_bytes()))
}

/// Secrets persisted as a flat JSON map in a file readable only by its owner.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store located at `~/.jira-rest/credentials`.
    pub fn default_location() -> Result<Self> {
        let home = dirs::home_dir().context("Cannot determine home directory")?;
        Ok(Self::new(home.join(".jira-rest").join("credentials")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Store a secret with 600 permissions.
    pub fn set_secret(&self, account: &str, secret: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut creds = self.read()?;
        creds.insert(account.to_string(), secret.to_string());
        self.write(&creds)
    }

    pub fn get_secret(&self, account: &str) -> Result<Option<String>> {
        Ok(self.read()?.remove(account))
    }

    pub fn delete_secret(&self, account: &str) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }
        let mut creds = self.read()?;
        creds.remove(account);
        self.write(&creds)
    }

    /// A missing file is an empty store; an unparsable one is an error so it
    /// is never overwritten.
    fn read(&self) -> Result<HashMap<String, String>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let content = fs::read_to_string(&self.path)?;
        serde_json::from_str(&content)
            .with_context(|| format!("Malformed credentials file {}", self.path.display()))
    }

    fn write(&self, creds: &HashMap<String, String>) -> Result<()> {
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);

        let file = options
            .open(&self.path)
            .with_context(|| format!("Unable to write credentials {}", self.path.display()))?;
        serde_json::to_writer_pretty(file, creds)?;
        Ok(())
    }
}
