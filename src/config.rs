use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{Result, ScanError};

/// Category of a backend file the contract says should exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "&'static str", try_from = "String")]
pub enum FileCategory {
    Routes,
    Controllers,
    Services,
    Models,
    Middleware,
    Config,
}

impl FileCategory {
    pub const ALL: [FileCategory; 6] = [
        FileCategory::Routes,
        FileCategory::Controllers,
        FileCategory::Services,
        FileCategory::Models,
        FileCategory::Middleware,
        FileCategory::Config,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FileCategory::Routes => "routes",
            FileCategory::Controllers => "controllers",
            FileCategory::Services => "services",
            FileCategory::Models => "models",
            FileCategory::Middleware => "middleware",
            FileCategory::Config => "config",
        }
    }
}

impl From<FileCategory> for &'static str {
    fn from(category: FileCategory) -> Self {
        category.as_str()
    }
}

// Map keys in TOML are plain strings, so go through String both ways
impl TryFrom<String> for FileCategory {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        FileCategory::ALL
            .into_iter()
            .find(|category| category.as_str() == value)
            .ok_or_else(|| format!("unknown file category: {}", value))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Tree walk settings
    pub scan: ScanConfig,

    /// Entry point candidates
    pub entries: EntriesConfig,

    /// Backend inference settings
    pub inference: InferenceConfig,

    /// Report file names
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Directory names pruned wherever they appear in the tree
    pub skip_dirs: Vec<String>,

    /// File suffixes scanned by the architecture report
    pub architecture_extensions: Vec<String>,

    /// File suffixes scanned by the backend contract
    pub contract_extensions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EntriesConfig {
    /// Frontend entry candidates, probed in order
    pub frontend: Vec<String>,

    /// Backend entry candidates, probed in order
    pub backend: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Environment variables every inferred backend needs
    pub baseline_env: Vec<String>,

    /// Extra variables listed only in the backend contract
    pub contract_env: Vec<String>,

    /// Files present in every backend contract
    pub baseline_files: BTreeMap<FileCategory, Vec<String>>,

    /// Trigger rules mapping call URLs to backend artifacts
    pub rules: Vec<InferenceRule>,
}

/// A single "URL substring implies backend artifacts" rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceRule {
    /// Case-sensitive substring searched for in every call URL
    pub trigger: String,

    /// Entities the backend needs once the rule fires
    #[serde(default)]
    pub entities: Vec<EntityRule>,

    /// Files the backend needs once the rule fires
    #[serde(default)]
    pub files: BTreeMap<FileCategory, Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRule {
    pub name: String,

    #[serde(default)]
    pub fields: Vec<String>,

    /// Backing table; entities without one are not persisted models
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub architecture_report: PathBuf,
    pub contract_report: PathBuf,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            skip_dirs: strings(&[
                "node_modules", "venv", ".venv", "__pycache__", ".git",
                "dist", "build", ".next", ".output",
            ]),
            architecture_extensions: strings(&[".js", ".jsx", ".ts", ".tsx", ".py"]),
            contract_extensions: strings(&[".ts", ".tsx", ".js", ".jsx"]),
        }
    }
}

impl Default for EntriesConfig {
    fn default() -> Self {
        Self {
            frontend: strings(&["src/index.tsx", "src/main.tsx"]),
            backend: strings(&["Backend/server.js", "server.js", "app.js"]),
        }
    }
}

impl Default for InferenceConfig {
    fn default() -> Self {
        let mut baseline_files = BTreeMap::new();
        baseline_files.insert(FileCategory::Middleware, strings(&["auth.js"]));
        baseline_files.insert(FileCategory::Config, strings(&["db.js"]));

        let mut booking_files = BTreeMap::new();
        booking_files.insert(FileCategory::Routes, strings(&["bookingRoutes.js"]));
        booking_files.insert(FileCategory::Controllers, strings(&["bookingController.js"]));
        booking_files.insert(FileCategory::Services, strings(&["bookingService.js", "taxService.js"]));
        booking_files.insert(FileCategory::Models, strings(&["Booking.js"]));

        Self {
            baseline_env: strings(&["DB_HOST", "DB_USER", "DB_PASSWORD", "DB_NAME"]),
            contract_env: strings(&["JWT_SECRET"]),
            baseline_files,
            rules: vec![InferenceRule {
                trigger: "booking".to_string(),
                entities: vec![
                    EntityRule {
                        name: "Booking".to_string(),
                        fields: strings(&[
                            "id", "tbrId", "vendorId", "trekCompanyName",
                            "completedDate", "basefare", "status",
                        ]),
                        table: Some("bookings".to_string()),
                    },
                    EntityRule {
                        name: "Tax".to_string(),
                        fields: strings(&["gst", "commissionGst", "tcs", "tds", "totalLiability"]),
                        table: None,
                    },
                ],
                files: booking_files,
            }],
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            architecture_report: PathBuf::from("repo_architecture_report.json"),
            contract_report: PathBuf::from("backend_contract.json"),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| ScanError::Config(e.to_string()))?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ScanError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration with fallback to default
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(p) => {
                if p.as_ref().exists() {
                    Self::load(p)
                } else {
                    Ok(Self::default())
                }
            }
            None => {
                let candidates = ["Stackmap.toml", "stackmap.toml", ".stackmap.toml"];

                for candidate in &candidates {
                    if Path::new(candidate).exists() {
                        return Self::load(candidate);
                    }
                }

                Ok(Self::default())
            }
        }
    }
}
