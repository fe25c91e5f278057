use serde::Serialize;
use std::path::Path;
use tracing::debug;

use crate::config::EntriesConfig;

/// Entry files found for each role; an absent role is simply `None`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Entries {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frontend: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
}

/// Structural classification of a repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Topology {
    Fullstack,
    FrontendOnly,
    BackendOnly,
}

impl Entries {
    pub fn topology(&self) -> Topology {
        match (&self.frontend, &self.backend) {
            (Some(_), Some(_)) => Topology::Fullstack,
            (Some(_), None) => Topology::FrontendOnly,
            // No entries at all also lands here
            _ => Topology::BackendOnly,
        }
    }
}

/// Probes conventional entry file locations under a root
pub struct EntryPointDetector {
    frontend_candidates: Vec<String>,
    backend_candidates: Vec<String>,
}

impl EntryPointDetector {
    pub fn new(config: &EntriesConfig) -> Self {
        Self {
            frontend_candidates: config.frontend.clone(),
            backend_candidates: config.backend.clone(),
        }
    }

    /// Every candidate is probed; the last one that exists wins its role.
    pub fn detect<P: AsRef<Path>>(&self, root: P) -> Entries {
        let root = root.as_ref();

        let entries = Entries {
            frontend: last_existing(root, &self.frontend_candidates),
            backend: last_existing(root, &self.backend_candidates),
        };

        debug!("Detected entries: {:?} -> {:?}", entries, entries.topology());
        entries
    }
}

fn last_existing(root: &Path, candidates: &[String]) -> Option<String> {
    candidates
        .iter()
        .filter(|candidate| root.join(candidate.as_str()).exists())
        .last()
        .cloned()
}

impl Default for EntryPointDetector {
    fn default() -> Self {
        Self::new(&EntriesConfig::default())
    }
}
