use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse architectural bucket a source file belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    Frontend,
    Backend,
    Shared,
    Config,
    Other,
}

impl Layer {
    /// Classify a root-relative, `/`-separated path. First matching rule wins.
    pub fn classify(relative_path: &str) -> Layer {
        if relative_path.starts_with("src") {
            Layer::Frontend
        } else if relative_path.contains("Backend") || relative_path.contains("server") {
            Layer::Backend
        } else if relative_path.contains("shared") {
            Layer::Shared
        } else if ["config.ts", "config.js", "json"]
            .iter()
            .any(|suffix| relative_path.ends_with(suffix))
        {
            Layer::Config
        } else {
            Layer::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Layer::Frontend => "frontend",
            Layer::Backend => "backend",
            Layer::Shared => "shared",
            Layer::Config => "config",
            Layer::Other => "other",
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
