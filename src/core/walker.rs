use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::config::ScanConfig;
use crate::error::{Result, ScanError};
use super::layer::Layer;
use super::patterns::{FileExtraction, PatternExtractor, RouteDecl, ScanProfile};

/// Everything known about one call target URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiCallRecord {
    /// Method of the most recent match for this URL
    pub method: String,
    pub called_from: Vec<String>,
    pub query_params: BTreeSet<String>,
    pub headers: BTreeSet<String>,
    pub response_fields: BTreeSet<String>,
}

impl Default for ApiCallRecord {
    fn default() -> Self {
        Self {
            method: "GET".to_string(),
            called_from: Vec::new(),
            query_params: BTreeSet::new(),
            headers: BTreeSet::new(),
            response_fields: BTreeSet::new(),
        }
    }
}

/// Accumulated output of one tree walk
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    /// Import targets per file, in extraction order
    pub imports: BTreeMap<String, Vec<String>>,
    /// Environment variable names per layer
    pub env_vars: BTreeMap<Layer, BTreeSet<String>>,
    /// Every route declaration found, from any file
    pub backend_routes: Vec<RouteDecl>,
    pub frontend_calls: BTreeSet<String>,
    pub files_by_layer: BTreeMap<Layer, Vec<String>>,
    /// One record per distinct call URL string
    pub api_calls: BTreeMap<String, ApiCallRecord>,
    /// Files that matched the extension filter but could not be read
    pub skipped: Vec<String>,
}

impl ScanResult {
    pub fn record_file(&mut self, relative_path: &str, layer: Layer) {
        self.files_by_layer
            .entry(layer)
            .or_default()
            .push(relative_path.to_string());
    }

    /// Fold one file's extraction in: sequences append, sets union,
    /// and a URL's method is overwritten by the latest match.
    pub fn merge(&mut self, relative_path: &str, layer: Layer, extraction: FileExtraction) {
        if !extraction.imports.is_empty() {
            self.imports
                .entry(relative_path.to_string())
                .or_default()
                .extend(extraction.imports);
        }

        if !extraction.env_vars.is_empty() {
            self.env_vars.entry(layer).or_default().extend(extraction.env_vars);
        }

        self.backend_routes.extend(extraction.routes);

        for call in extraction.api_calls {
            self.frontend_calls.insert(call.url.clone());

            let record = self.api_calls.entry(call.url).or_default();
            record.method = call.method;
            record.called_from.push(relative_path.to_string());

            if let Some(evidence) = &extraction.evidence {
                record.query_params.extend(evidence.query_params.iter().cloned());
                record.headers.extend(evidence.headers.iter().cloned());
                record.response_fields.extend(evidence.response_fields.iter().cloned());
            }
        }
    }

    pub fn file_count(&self) -> usize {
        self.files_by_layer.values().map(Vec::len).sum()
    }
}

/// Recursive directory walk feeding every code file through the pattern table
pub struct TreeWalker {
    skip_dirs: HashSet<String>,
    extensions: Vec<String>,
    extractor: PatternExtractor,
}

impl TreeWalker {
    pub fn new(config: &ScanConfig, profile: ScanProfile) -> Result<Self> {
        let extensions = match profile {
            ScanProfile::Architecture => config.architecture_extensions.clone(),
            ScanProfile::Contract => config.contract_extensions.clone(),
        };

        Ok(Self {
            skip_dirs: config.skip_dirs.iter().cloned().collect(),
            extensions,
            extractor: PatternExtractor::new(profile)?,
        })
    }

    /// Walk `root` depth-first. Unreadable files are listed in
    /// `ScanResult::skipped` and otherwise contribute nothing.
    pub fn walk<P: AsRef<Path>>(&self, root: P) -> Result<ScanResult> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(ScanError::FileSystem(format!(
                "Scan root is not a directory: {}",
                root.display()
            )));
        }

        let mut result = ScanResult::default();

        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !self.is_skipped_dir(entry));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            if entry.file_type().is_dir() || !self.is_code_file(&entry) {
                continue;
            }

            let relative_path = relative_path(root, entry.path());
            let layer = Layer::classify(&relative_path);
            result.record_file(&relative_path, layer);

            let content = match std::fs::read(entry.path()) {
                Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                Err(e) => {
                    warn!("Could not read {}: {}", relative_path, e);
                    result.skipped.push(relative_path);
                    continue;
                }
            };

            let extraction = self.extractor.extract(&content);
            debug!(
                "{} [{}]: {} imports, {} routes, {} calls",
                relative_path,
                layer,
                extraction.imports.len(),
                extraction.routes.len(),
                extraction.api_calls.len()
            );
            result.merge(&relative_path, layer, extraction);
        }

        info!(
            "Scanned {} files under {} ({} skipped)",
            result.file_count(),
            root.display(),
            result.skipped.len()
        );

        Ok(result)
    }

    fn is_skipped_dir(&self, entry: &DirEntry) -> bool {
        entry.file_type().is_dir()
            && self.skip_dirs.contains(entry.file_name().to_string_lossy().as_ref())
    }

    fn is_code_file(&self, entry: &DirEntry) -> bool {
        let name = entry.file_name().to_string_lossy();
        self.extensions.iter().any(|ext| name.ends_with(ext.as_str()))
    }
}

/// Root-relative path with `/` separators regardless of platform
fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn all_files(result: &ScanResult) -> Vec<String> {
        result.files_by_layer.values().flatten().cloned().collect()
    }

    fn walker(profile: ScanProfile) -> TreeWalker {
        TreeWalker::new(&ScanConfig::default(), profile).unwrap()
    }

    #[test]
    fn test_skip_dirs_pruned_at_any_depth() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "src/App.tsx", "fetch('/api/ok');");
        write(root, "node_modules/lib/index.js", "fetch('/api/hidden');");
        write(root, "src/deep/build/gen.js", "app.get('/hidden', h);");
        write(root, "packages/web/.next/chunk.js", "process.env.HIDDEN;");
        write(root, "src/builder/util.ts", "process.env.VISIBLE;");

        let result = walker(ScanProfile::Architecture).walk(root).unwrap();

        let files = all_files(&result);
        assert_eq!(files.len(), 2);
        assert!(files.contains(&"src/App.tsx".to_string()));
        assert!(files.contains(&"src/builder/util.ts".to_string()));
        assert!(result.backend_routes.is_empty());
        assert_eq!(result.frontend_calls.len(), 1);
        assert_eq!(
            result.env_vars.get(&Layer::Frontend).unwrap().iter().collect::<Vec<_>>(),
            vec!["VISIBLE"]
        );
    }

    #[test]
    fn test_extension_filter_per_profile() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "misc/readme.md", "fetch('/api/docs')");
        write(root, "tools/seed.py", "from db import connect");
        write(root, "package.json", "{\"name\": \"x\"}");
        write(root, "web/client.ts", "fetch('/api/client')");

        let architecture = walker(ScanProfile::Architecture).walk(root).unwrap();
        assert_eq!(all_files(&architecture), vec!["tools/seed.py", "web/client.ts"]);
        assert_eq!(architecture.imports.get("tools/seed.py").unwrap(), &vec!["db"]);

        let contract = walker(ScanProfile::Contract).walk(root).unwrap();
        assert_eq!(all_files(&contract), vec!["web/client.ts"]);
    }

    #[test]
    fn test_env_vars_aggregate_by_layer() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "src/a.ts", "const u = process.env.API_URL;");
        write(root, "src/b.tsx", "const u = import.meta.env.API_URL;");
        write(root, "Backend/db.js", "process.env.DB_HOST");

        let result = walker(ScanProfile::Architecture).walk(root).unwrap();

        let frontend = result.env_vars.get(&Layer::Frontend).unwrap();
        assert_eq!(frontend.len(), 1);
        assert!(frontend.contains("API_URL"));
        assert!(result.env_vars.get(&Layer::Backend).unwrap().contains("DB_HOST"));
    }

    #[test]
    fn test_routes_collected_globally() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "Backend/routes/bookings.js", "router.get('/api/bookings', list);");
        write(root, "server.js", "app.get(\"/api/bookings\", list);\napp.post(\"/api/login\", login);");

        let result = walker(ScanProfile::Architecture).walk(root).unwrap();

        let pairs: Vec<(String, String)> = result
            .backend_routes
            .iter()
            .map(|r| (r.method.clone(), r.path.clone()))
            .collect();
        assert_eq!(pairs.len(), 3);
        assert_eq!(
            pairs.iter().filter(|(m, p)| m == "GET" && p == "/api/bookings").count(),
            2
        );
    }

    #[test]
    fn test_call_records_merge() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(
            root,
            "src/a.ts",
            "fetch('/api/bookings');\nconst x = res.total;",
        );
        write(
            root,
            "src/b.ts",
            "axios.post('/api/bookings', b);\naxios.put('/api/bookings/', b);\nconst y = res.status;",
        );

        let result = walker(ScanProfile::Contract).walk(root).unwrap();

        assert_eq!(result.api_calls.len(), 2);
        let record = result.api_calls.get("/api/bookings").unwrap();
        assert_eq!(record.method, "POST");
        assert_eq!(record.called_from, vec!["src/a.ts", "src/b.ts"]);
        assert!(record.response_fields.contains("total"));
        assert!(record.response_fields.contains("status"));
        assert!(result.api_calls.contains_key("/api/bookings/"));
    }

    #[test]
    fn test_invalid_utf8_is_scanned() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        let mut bytes = b"fetch('/api/bytes');\n".to_vec();
        bytes.extend_from_slice(&[0xff, 0xfe, 0x00]);
        fs::write(root.join("client.js"), bytes).unwrap();

        let result = walker(ScanProfile::Architecture).walk(root).unwrap();
        assert!(result.frontend_calls.contains("/api/bytes"));
        assert!(result.skipped.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_file_is_skipped() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        std::os::unix::fs::symlink(root.join("missing.ts"), root.join("dangling.ts")).unwrap();
        write(root, "ok.ts", "fetch('/api/ok')");

        let result = walker(ScanProfile::Architecture).walk(root).unwrap();
        assert_eq!(result.skipped, vec!["dangling.ts"]);
        assert!(all_files(&result).contains(&"dangling.ts".to_string()));
        assert!(result.frontend_calls.contains("/api/ok"));
    }

    #[test]
    fn test_missing_root_is_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");

        assert!(matches!(
            walker(ScanProfile::Architecture).walk(&missing),
            Err(ScanError::FileSystem(_))
        ));
    }

    #[test]
    fn test_walk_is_deterministic() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        for name in ["c.ts", "a.ts", "b/z.js", "b/y.js"] {
            write(root, name, "import x from 'x';");
        }

        let walker = walker(ScanProfile::Architecture);
        let first = walker.walk(root).unwrap();
        let second = walker.walk(root).unwrap();

        assert_eq!(first.files_by_layer, second.files_by_layer);
        assert_eq!(all_files(&first), vec!["a.ts", "b/y.js", "b/z.js", "c.ts"]);
    }
}
