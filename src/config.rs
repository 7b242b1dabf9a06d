//! Runtime configuration for ddns6.

use crate::error::{DdnsError, Result};
use std::path::Path;
use std::time::Duration;

/// Default location of the provider credential file.
pub const DEFAULT_SECRET_PATH: &str = "/etc/node-ddns-controller/key";

/// Everything the daemon needs, assembled from the CLI at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Interface watched for a global IPv6 address.
    pub interface: String,
    /// DNS record name kept up to date.
    pub record: String,
    /// Zone (registered domain) the record belongs to.
    pub zone: String,
    /// Period of the check-and-update-if-changed trigger.
    pub check_interval: Duration,
    /// Period of the unconditional forced-refresh trigger.
    pub update_interval: Duration,
    /// Abort the process on mid-run resolution failures instead of
    /// skipping the tick.
    pub fatal_resolve_errors: bool,
}

/// Read the provider credential, stripping one trailing newline.
///
/// Read once at startup; an unreadable or empty file is fatal.
pub fn load_secret(path: &Path) -> Result<String> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        DdnsError::Config(format!("cannot read secret file {}: {}", path.display(), e))
    })?;

    let secret = raw.strip_suffix('\n').unwrap_or(&raw);
    let secret = secret.strip_suffix('\r').unwrap_or(secret);

    if secret.is_empty() {
        return Err(DdnsError::Config(format!(
            "secret file {} is empty",
            path.display()
        )));
    }

    Ok(secret.to_string())
}
