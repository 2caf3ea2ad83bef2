use serde::Serialize;

/// Lifecycle of one harvest run. Phases only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum HarvestPhase {
    #[default]
    Searching,
    Downloading,
    Complete,
}

impl HarvestPhase {
    pub fn next(self) -> Self {
        match self {
            HarvestPhase::Searching => HarvestPhase::Downloading,
            HarvestPhase::Downloading | HarvestPhase::Complete => HarvestPhase::Complete,
        }
    }

    pub fn is_complete(self) -> bool {
        self == HarvestPhase::Complete
    }
}
