// src/core/mod.rs
mod engine;
mod entries;
mod inference;
mod layer;
mod patterns;
mod report;
mod walker;

pub use entries::{Entries, EntryPointDetector, Topology};
pub use inference::{BackendInferrer, InferredBackendContract};
pub use layer::Layer;
pub use patterns::{
    ApiCall, CallEvidence, FileExtraction, PatternExtractor, PatternKind, RouteDecl, ScanProfile,
};
pub use report::{
    ArchitectureReport, BackendInferred, BackendRequired, ContractReport, EntitySpec, RepoInfo,
    RoutesSection,
};
pub use walker::{ApiCallRecord, ScanResult, TreeWalker};

// Export the main engine
pub use engine::Engine;
