//! Privilege elevation for forceful power transitions

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use super::platform::PowerPlatform;
use crate::errors::PowerError;

/// Enables named OS privileges and remembers which ones were granted.
///
/// Repeat calls for a granted privilege return `true` without touching the
/// OS again. A refusal is not cached, so a later call retries.
pub struct PrivilegeElevator {
    platform: Arc<dyn PowerPlatform>,
    granted: Mutex<HashSet<String>>,
}

impl PrivilegeElevator {
    pub fn new(platform: Arc<dyn PowerPlatform>) -> Self {
        Self {
            platform,
            granted: Mutex::new(HashSet::new()),
        }
    }

    pub async fn enable_privilege(&self, name: &str) -> bool {
        if self.is_granted(name) {
            debug!("Privilege '{}' already enabled", name);
            return true;
        }

        if self.platform.elevate_privilege(name).await {
            self.granted
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .insert(name.to_string());
            info!("Enabled privilege '{}'", name);
            true
        } else {
            let err = PowerError::ElevationFailure {
                privilege: name.to_string(),
            };
            warn!("{}", err);
            false
        }
    }

    pub fn is_granted(&self, name: &str) -> bool {
        self.granted
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains(name)
    }
}
