//! The artifact component.

use xenoarch_logic::unlock::UnlockNotice;
use xenoarch_logic::Artifact;

/// An artifact living in the world, with notifications not yet drained.
#[derive(Debug, Clone)]
pub struct ArtifactHost {
    pub artifact: Artifact,
    pub pending: Vec<UnlockNotice>,
}

impl ArtifactHost {
    pub fn new(artifact: Artifact) -> Self {
        Self {
            artifact,
            pending: Vec::new(),
        }
    }
}
