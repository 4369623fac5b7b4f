//! Generation Pipeline - Single Entry Point
//!
//! CRITICAL: generate MUST run the version gate internally. No bypass.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use tera::Context;
use thiserror::Error;
use uuid::Uuid;

use crate::config::ProjectConfig;
use crate::manifest::{
    compute_job_hash, compute_manifest_hash, sha256_hex, GenerationManifest, ManifestFile,
};
use crate::templates::{TemplateError, TemplateManifest, TemplateSet};
use crate::versions::{self, VersionError, VersionPlan};
use crate::ENGINE_VERSION;

/// Filename of the manifest written into every generated project.
pub const MANIFEST_OUTPUT: &str = "manifest.json";

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] VersionError),

    #[error("template set '{name}' requires engine >= {required}, current is {current}")]
    EngineVersionMismatch {
        name: String,
        required: String,
        current: String,
    },

    #[error("project directory already exists: {0}")]
    ProjectExists(PathBuf),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("Generation error: {0}")]
    GenerationError(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Summary of one successful generation run.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    pub project_dir: PathBuf,
    pub files: Vec<String>,
    pub job_hash: String,
    pub manifest_hash: String,
}

/// The generation pipeline - single entry point for all project scaffolding
pub struct GenerationPipeline {
    templates: TemplateSet,
}

impl GenerationPipeline {
    pub fn new(templates: TemplateSet) -> Self {
        Self { templates }
    }

    /// Manifest of the active template set
    pub fn template_manifest(&self) -> &TemplateManifest {
        self.templates.manifest()
    }

    /// Run the version-consistency gate for a configuration.
    ///
    /// This is the ONLY validation entry point.
    pub fn validate_config(&self, config: &ProjectConfig) -> Result<VersionPlan, VersionError> {
        versions::validate(
            config.has_versions,
            &config.versions_csv,
            &config.versions_with_solutions,
            &config.version_randomization_groups,
        )
    }

    /// Generate a project under `output_dir/<exam_code>`.
    ///
    /// CRITICAL: the version gate ALWAYS runs first, and rendering happens
    /// before any filesystem work. A failed run leaves no scaffolded output.
    pub fn generate(
        &self,
        config: &ProjectConfig,
        output_dir: &Path,
    ) -> Result<GenerationReport, PipelineError> {
        // MANDATORY: validation is always called. This is non-negotiable.
        let plan = self.validate_config(config)?;

        self.check_engine_version()?;

        let context = build_context(config, &plan).map_err(|e| {
            PipelineError::GenerationError(format!("failed to build template context: {e}"))
        })?;
        let rendered = self.templates.render(&context)?;

        let project_dir = output_dir.join(&config.exam_code);
        if project_dir.exists() {
            return Err(PipelineError::ProjectExists(project_dir));
        }
        fs::create_dir_all(&project_dir)?;

        let mut files = Vec::new();
        for file in &rendered {
            let target = project_dir.join(&file.path);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&target, &file.content)?;
            files.push(ManifestFile {
                path: file.path.clone(),
                hash: sha256_hex(file.content.as_bytes()),
            });
        }

        let job_hash = compute_job_hash(&config.exam_code, config, ENGINE_VERSION)?;

        let mut manifest = GenerationManifest {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            engine_version: ENGINE_VERSION.to_string(),
            template_name: self.templates.manifest().name.clone(),
            exam_code: config.exam_code.clone(),
            job_hash,
            manifest_hash: String::new(), // Computed after
            files,
        };
        manifest.manifest_hash = compute_manifest_hash(&manifest)?;

        fs::write(
            project_dir.join(MANIFEST_OUTPUT),
            serde_json::to_string_pretty(&manifest)?,
        )?;

        Ok(GenerationReport {
            files: manifest.files.iter().map(|f| f.path.clone()).collect(),
            job_hash: manifest.job_hash,
            manifest_hash: manifest.manifest_hash,
            project_dir,
        })
    }

    fn check_engine_version(&self) -> Result<(), PipelineError> {
        let manifest = self.templates.manifest();
        let engine_ver = semver::Version::parse(ENGINE_VERSION)
            .map_err(|_| PipelineError::GenerationError("Invalid engine version".into()))?;
        let min_ver = semver::Version::parse(&manifest.engine_min_version)
            .map_err(|_| PipelineError::GenerationError("Invalid template min version".into()))?;

        if engine_ver < min_ver {
            return Err(PipelineError::EngineVersionMismatch {
                name: manifest.name.clone(),
                required: manifest.engine_min_version.clone(),
                current: ENGINE_VERSION.to_string(),
            });
        }

        Ok(())
    }
}

fn build_context(config: &ProjectConfig, plan: &VersionPlan) -> tera::Result<Context> {
    let mut context = Context::from_serialize(config)?;
    context.insert("versions", &plan.versions);
    context.insert("solution_versions", &plan.with_solutions);

    let seeds: Vec<serde_json::Value> = plan
        .seed_groups()
        .into_iter()
        .map(|(version, seed_group)| json!({ "version": version, "seed_group": seed_group }))
        .collect();
    context.insert("version_seeds", &seeds);

    Ok(context)
}
