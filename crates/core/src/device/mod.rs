use std::fmt;

use crate::process::CommandOutcome;
use crate::render::Toolchain;
use crate::{PixcycleError, Result};

/// Opaque identifier of the target display as understood by the toolchain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceHandle(String);

impl DeviceHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Picks the first listing line that mentions `name` and returns the
/// identifier in front of ` (`.
///
/// Listing lines look like `abc123-device-id (Kitchen Display)`.
pub fn find_device(listing: &str, name: &str) -> Option<DeviceHandle> {
    listing
        .lines()
        .filter(|line| !line.trim().is_empty())
        .find(|line| line.contains(name))
        .map(|line| {
            let id = line.split(" (").next().unwrap_or(line);
            DeviceHandle::new(id.trim())
        })
}

/// Resolves a human readable device name through the toolchain.
pub async fn resolve_device<T: Toolchain>(toolchain: &T, name: &str) -> Result<DeviceHandle> {
    if name.trim().is_empty() {
        return Err(PixcycleError::config("device name must not be empty"));
    }

    let listing = match toolchain.devices().await {
        CommandOutcome::Success { stdout } => stdout,
        other => {
            tracing::error!(outcome = %other, "failed to list devices");
            return Err(PixcycleError::Discovery(other.to_string()));
        }
    };

    let device = find_device(&listing, name)
        .ok_or_else(|| PixcycleError::DeviceNotFound(name.to_string()))?;
    tracing::debug!(%device, name, "resolved device");
    Ok(device)
}
