//! ExamForge Core - LaTeX Exam Project Generator
//!
//! Scaffolds a DocStrip-based exam/quiz project from a resolved answer set.
//! The version-consistency gate runs before any file is written: an
//! inconsistent version configuration blocks generation entirely.

pub mod config;
mod filters;
pub mod manifest;
pub mod pipeline;
pub mod templates;
pub mod versions;

pub use config::{ConfigError, ProjectConfig};
pub use manifest::{canonical_json, compute_job_hash, compute_manifest_hash, GenerationManifest};
pub use pipeline::{GenerationPipeline, GenerationReport, PipelineError};
pub use templates::{RenderedFile, TemplateManifest, TemplateSet};
pub use versions::{VersionError, VersionField, VersionPlan};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
