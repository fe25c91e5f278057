//! Report assembly
//!
//! Set-valued fields are `BTreeSet`s so they serialize as sorted arrays;
//! list-valued fields keep discovery order.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::config::FileCategory;
use super::entries::{Entries, Topology};
use super::inference::{BackendInferrer, InferredBackendContract};
use super::layer::Layer;
use super::patterns::{RouteDecl, ScanProfile};
use super::walker::{ApiCallRecord, ScanResult};

#[derive(Debug, Clone, Serialize)]
pub struct RepoInfo {
    pub root: String,
    #[serde(rename = "type")]
    pub topology: Topology,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoutesSection {
    pub backend: Vec<RouteDecl>,
    pub frontend_calls: BTreeSet<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BackendInferred {
    pub required_routes: BTreeSet<String>,
    pub required_env: Vec<String>,
    pub required_models: BTreeSet<String>,
    pub required_tables: BTreeSet<String>,
}

impl From<InferredBackendContract> for BackendInferred {
    fn from(contract: InferredBackendContract) -> Self {
        Self {
            required_routes: contract.required_routes,
            required_env: contract.required_env,
            required_models: contract.models,
            required_tables: contract.tables,
        }
    }
}

/// Whole-repository architecture report
#[derive(Debug, Clone, Serialize)]
pub struct ArchitectureReport {
    pub repo: RepoInfo,
    pub entries: Entries,
    pub layers: BTreeMap<Layer, Vec<String>>,
    pub imports: BTreeMap<String, Vec<String>>,
    pub env: BTreeMap<Layer, BTreeSet<String>>,
    pub routes: RoutesSection,
    /// Only for frontend-only repositories
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend_inferred: Option<BackendInferred>,
}

impl ArchitectureReport {
    pub fn assemble(root: &Path, entries: Entries, scan: ScanResult, inferrer: &BackendInferrer) -> Self {
        let topology = entries.topology();

        let backend_inferred = (topology == Topology::FrontendOnly).then(|| {
            inferrer
                .infer(&scan.frontend_calls, ScanProfile::Architecture)
                .into()
        });

        Self {
            repo: RepoInfo {
                root: root.display().to_string(),
                topology,
            },
            entries,
            layers: scan.files_by_layer,
            imports: scan.imports,
            env: scan.env_vars,
            routes: RoutesSection {
                backend: scan.backend_routes,
                frontend_calls: scan.frontend_calls,
            },
            backend_inferred,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EntitySpec {
    pub fields: BTreeSet<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BackendRequired {
    pub routes: BTreeMap<String, ApiCallRecord>,
    pub entities: BTreeMap<String, EntitySpec>,
    pub files_to_create: BTreeMap<FileCategory, BTreeSet<String>>,
    pub env_required: Vec<String>,
}

/// Backend contract synthesized from frontend calls
#[derive(Debug, Clone, Serialize)]
pub struct ContractReport {
    pub backend_required: BackendRequired,
}

impl ContractReport {
    pub fn assemble(scan: ScanResult, inferrer: &BackendInferrer) -> Self {
        let inferred = inferrer.infer(scan.api_calls.keys(), ScanProfile::Contract);

        let entities = inferred
            .entities
            .into_iter()
            .map(|(name, fields)| (name, EntitySpec { fields }))
            .collect();

        Self {
            backend_required: BackendRequired {
                routes: scan.api_calls,
                entities,
                files_to_create: inferred.files,
                env_required: inferred.required_env,
            },
        }
    }
}
