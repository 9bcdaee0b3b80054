use std::sync::Arc;

use super::{FantasyPlatform, Fleaflicker, PlatformKind, Sleeper};
use crate::config::PlatformConfig;
use crate::error::Result;

/// Build the adapter for a platform kind from the shared platform settings.
pub fn build_platform(kind: PlatformKind, config: &PlatformConfig) -> Result<Arc<dyn FantasyPlatform>> {
    match kind {
        PlatformKind::Sleeper => {
            let sleeper = Sleeper::new(
                config.sleeper_base_url.as_deref(),
                std::path::Path::new(&config.data_dir),
                config.player_refresh_secs,
            )?;
            Ok(Arc::new(sleeper))
        }
        PlatformKind::Fleaflicker => {
            let fleaflicker = Fleaflicker::new(config.fleaflicker_base_url.as_deref())?;
            Ok(Arc::new(fleaflicker))
        }
    }
}
