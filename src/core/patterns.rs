//! Regex pattern table for lexical extraction
//!
//! Nothing here parses code. Every pattern is applied to the raw file text and
//! contributes whatever it matches; false positives and negatives are expected.

use regex::{Captures, Regex};
use serde::{Serialize, Serializer};
use std::collections::BTreeSet;

use crate::error::Result;

/// Which analysis a scan feeds; decides call syntax and evidence collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanProfile {
    /// Whole-repository architecture report
    Architecture,
    /// Frontend-driven backend contract
    Contract,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    Import,
    EnvVar,
    Route,
    ApiCall,
}

/// A backend route declaration: upper-cased method and path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDecl {
    pub method: String,
    pub path: String,
}

impl Serialize for RouteDecl {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        (&self.method, &self.path).serialize(serializer)
    }
}

/// An outbound HTTP call target found in client code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiCall {
    pub method: String,
    pub url: String,
}

/// File-wide evidence about how call responses and requests are shaped
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallEvidence {
    pub query_params: BTreeSet<String>,
    pub headers: BTreeSet<String>,
    pub response_fields: BTreeSet<String>,
}

/// Everything the pattern table pulled out of one file
#[derive(Debug, Clone, Default)]
pub struct FileExtraction {
    pub imports: Vec<String>,
    pub env_vars: Vec<String>,
    pub routes: Vec<RouteDecl>,
    pub api_calls: Vec<ApiCall>,
    /// Present only for the contract profile, and only when a call matched
    pub evidence: Option<CallEvidence>,
}

enum Hit {
    Import(String),
    EnvVar(String),
    Route(RouteDecl),
    ApiCall(ApiCall),
}

struct Pattern {
    kind: PatternKind,
    regex: Regex,
    extract: fn(&Captures<'_>) -> Option<Hit>,
}

impl Pattern {
    fn new(kind: PatternKind, pattern: &str, extract: fn(&Captures<'_>) -> Option<Hit>) -> Result<Self> {
        Ok(Self {
            kind,
            regex: Regex::new(pattern)?,
            extract,
        })
    }
}

fn group(caps: &Captures<'_>, index: usize) -> Option<String> {
    caps.get(index).map(|m| m.as_str().to_string())
}

fn import_target(caps: &Captures<'_>) -> Option<Hit> {
    group(caps, 1).map(Hit::Import)
}

fn env_var(caps: &Captures<'_>) -> Option<Hit> {
    group(caps, 1).map(Hit::EnvVar)
}

fn route_decl(caps: &Captures<'_>) -> Option<Hit> {
    Some(Hit::Route(RouteDecl {
        method: group(caps, 1)?.to_uppercase(),
        path: group(caps, 2)?,
    }))
}

fn fetch_call(caps: &Captures<'_>) -> Option<Hit> {
    Some(Hit::ApiCall(ApiCall {
        method: "GET".to_string(),
        url: group(caps, 1)?,
    }))
}

fn axios_call(caps: &Captures<'_>) -> Option<Hit> {
    Some(Hit::ApiCall(ApiCall {
        method: group(caps, 1)?.to_uppercase(),
        url: group(caps, 2)?,
    }))
}

/// Field accesses too generic to say anything about a response shape
const FIELD_STOPLIST: [&str; 3] = ["map", "filter", "length"];

/// Applies the fixed pattern table to file contents
pub struct PatternExtractor {
    profile: ScanProfile,
    patterns: Vec<Pattern>,
    query_regex: Regex,
    header_regex: Regex,
    field_regex: Regex,
    object_key_regex: Regex,
}

impl PatternExtractor {
    pub fn new(profile: ScanProfile) -> Result<Self> {
        let mut patterns = vec![
            Pattern::new(PatternKind::Import, r#"import\s+.*?\s+from\s+['"](.+?)['"]"#, import_target)?,
            Pattern::new(PatternKind::Import, r#"import\s+['"](.+?)['"]"#, import_target)?,
            Pattern::new(PatternKind::Import, r#"require\(['"](.+?)['"]\)"#, import_target)?,
            Pattern::new(PatternKind::Import, r"from\s+(.+?)\s+import", import_target)?,
            Pattern::new(PatternKind::EnvVar, r"process\.env\.([A-Z0-9_]+)", env_var)?,
            Pattern::new(PatternKind::EnvVar, r"import\.meta\.env\.([A-Z0-9_]+)", env_var)?,
            Pattern::new(PatternKind::Route, r#"app\.(get|post|put|delete)\(['"](.+?)['"]"#, route_decl)?,
            Pattern::new(PatternKind::Route, r#"router\.(get|post|put|delete)\(['"](.+?)['"]"#, route_decl)?,
        ];

        // Contract scans also accept template literals and whitespace after "("
        match profile {
            ScanProfile::Architecture => {
                patterns.push(Pattern::new(PatternKind::ApiCall, r#"fetch\(['"](.+?)['"]"#, fetch_call)?);
                patterns.push(Pattern::new(
                    PatternKind::ApiCall,
                    r#"axios\.(get|post|put|delete)\(['"](.+?)['"]"#,
                    axios_call,
                )?);
            }
            ScanProfile::Contract => {
                patterns.push(Pattern::new(PatternKind::ApiCall, r#"fetch\(\s*[`'"](.+?)[`'"]"#, fetch_call)?);
                patterns.push(Pattern::new(
                    PatternKind::ApiCall,
                    r#"axios\.(get|post|put|delete)\(\s*[`'"](.+?)[`'"]"#,
                    axios_call,
                )?);
            }
        }

        Ok(Self {
            profile,
            patterns,
            query_regex: Regex::new(r"new URLSearchParams\(\s*\{([^}]+)\}")?,
            header_regex: Regex::new(r"headers\s*:\s*\{([^}]+)\}")?,
            field_regex: Regex::new(r"\.(\w+)")?,
            object_key_regex: Regex::new(r"(\w+)\s*:")?,
        })
    }

    pub fn profile(&self) -> ScanProfile {
        self.profile
    }

    /// Run every pattern over `content`. Within a kind, results follow the
    /// declared pattern order first and textual order second.
    pub fn extract(&self, content: &str) -> FileExtraction {
        let mut extraction = FileExtraction::default();

        for pattern in &self.patterns {
            for caps in pattern.regex.captures_iter(content) {
                match (pattern.extract)(&caps) {
                    Some(Hit::Import(target)) => extraction.imports.push(target),
                    Some(Hit::EnvVar(name)) => extraction.env_vars.push(name),
                    Some(Hit::Route(route)) => extraction.routes.push(route),
                    Some(Hit::ApiCall(call)) => extraction.api_calls.push(call),
                    None => {}
                }
            }
        }

        if self.profile == ScanProfile::Contract && !extraction.api_calls.is_empty() {
            extraction.evidence = Some(self.collect_evidence(content));
        }

        extraction
    }

    /// Only the patterns of one kind; handy when a caller needs a single category
    pub fn extract_kind(&self, kind: PatternKind, content: &str) -> Vec<String> {
        self.patterns
            .iter()
            .filter(|p| p.kind == kind)
            .flat_map(|p| p.regex.captures_iter(content).filter_map(move |caps| (p.extract)(&caps)))
            .map(|hit| match hit {
                Hit::Import(s) | Hit::EnvVar(s) => s,
                Hit::Route(route) => route.path,
                Hit::ApiCall(call) => call.url,
            })
            .collect()
    }

    /// Query keys, header names and dotted field accesses anywhere in the file.
    /// The evidence cannot be tied to a particular call.
    fn collect_evidence(&self, content: &str) -> CallEvidence {
        let mut evidence = CallEvidence::default();

        for caps in self.query_regex.captures_iter(content) {
            evidence.query_params.extend(self.object_keys(&caps[1]));
        }

        for caps in self.header_regex.captures_iter(content) {
            evidence.headers.extend(self.object_keys(&caps[1]));
        }

        for caps in self.field_regex.captures_iter(content) {
            let field = &caps[1];
            if !FIELD_STOPLIST.contains(&field) {
                evidence.response_fields.insert(field.to_string());
            }
        }

        evidence
    }

    fn object_keys<'a>(&'a self, body: &'a str) -> impl Iterator<Item = String> + 'a {
        self.object_key_regex
            .captures_iter(body)
            .map(|caps| caps[1].to_string())
    }
}
