//! Template Sets
//!
//! A template set is a Tera instance plus a `template.toml` manifest naming
//! the output files. The crate ships a built-in DocStrip quiz set; any
//! directory with the same layout can replace it.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tera::{Context, Tera};
use thiserror::Error;

use crate::filters;

const MANIFEST_FILENAME: &str = "template.toml";

const BUILTIN_MANIFEST: &str = include_str!("../templates/template.toml");
const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    ("quiz.dtx.tera", include_str!("../templates/quiz.dtx.tera")),
    ("build.lua.tera", include_str!("../templates/build.lua.tera")),
    ("README.md.tera", include_str!("../templates/README.md.tera")),
];

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    ManifestParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("template load error: {0}")]
    Load(tera::Error),

    #[error("render error for '{template}': {source}")]
    Render {
        template: String,
        source: tera::Error,
    },
}

/// Metadata for a template set, parsed from `template.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateManifest {
    /// Template set display name.
    pub name: String,

    /// What this set generates.
    pub description: String,

    /// Minimum engine version this set is written for.
    pub engine_min_version: String,

    /// Output files to generate.
    pub outputs: Vec<OutputFile>,
}

/// One output file of a template set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputFile {
    /// Tera template filename (e.g. `quiz.dtx.tera`).
    pub template: String,

    /// Output filename pattern; may contain Tera expressions.
    pub filename: String,

    /// Optional subdirectory for the output; may contain Tera expressions.
    #[serde(default)]
    pub subdir: Option<String>,
}

/// A rendered output file ready to be written to disk.
#[derive(Debug, Clone)]
pub struct RenderedFile {
    /// Path relative to the generated project directory.
    pub path: String,
    /// Rendered content.
    pub content: String,
}

/// A loaded template set with the project filters registered.
#[derive(Debug)]
pub struct TemplateSet {
    tera: Tera,
    manifest: TemplateManifest,
}

impl TemplateSet {
    /// The template set shipped with the engine.
    pub fn builtin() -> Result<Self, TemplateError> {
        let manifest = parse_manifest(BUILTIN_MANIFEST, Path::new("<builtin>/template.toml"))?;
        let mut tera = Tera::default();
        for (name, content) in BUILTIN_TEMPLATES {
            tera.add_raw_template(name, content)
                .map_err(TemplateError::Load)?;
        }
        Ok(Self::assemble(tera, manifest))
    }

    /// Load a template set from a directory containing `template.toml`.
    pub fn load_from_dir(dir: &Path) -> Result<Self, TemplateError> {
        let manifest_path = dir.join(MANIFEST_FILENAME);
        let contents = fs::read_to_string(&manifest_path).map_err(|e| TemplateError::Io {
            path: manifest_path.clone(),
            source: e,
        })?;
        let manifest = parse_manifest(&contents, &manifest_path)?;

        let mut tera = Tera::default();
        for output in &manifest.outputs {
            let path = dir.join(&output.template);
            let text = fs::read_to_string(&path).map_err(|e| TemplateError::Io {
                path: path.clone(),
                source: e,
            })?;
            tera.add_raw_template(&output.template, &text)
                .map_err(TemplateError::Load)?;
        }
        Ok(Self::assemble(tera, manifest))
    }

    fn assemble(mut tera: Tera, manifest: TemplateManifest) -> Self {
        tera.register_filter("localize_date", filters::localize_date);
        tera.register_filter("embrace", filters::embrace);
        Self { tera, manifest }
    }

    pub fn manifest(&self) -> &TemplateManifest {
        &self.manifest
    }

    /// Render every output file with the provided context.
    pub fn render(&self, context: &Context) -> Result<Vec<RenderedFile>, TemplateError> {
        let mut rendered = Vec::new();

        for output in &self.manifest.outputs {
            let content =
                self.tera
                    .render(&output.template, context)
                    .map_err(|e| TemplateError::Render {
                        template: output.template.clone(),
                        source: e,
                    })?;

            let filename = self.render_string(&output.filename, context)?;
            let path = match &output.subdir {
                Some(subdir) => {
                    let rendered_subdir = self.render_string(subdir, context)?;
                    format!("{rendered_subdir}/{filename}")
                }
                None => filename,
            };

            rendered.push(RenderedFile { path, content });
        }

        Ok(rendered)
    }

    fn render_string(&self, template_str: &str, context: &Context) -> Result<String, TemplateError> {
        // Cloned instance so the custom filters are available inline.
        let mut inline = self.tera.clone();
        inline
            .add_raw_template("__inline__", template_str)
            .map_err(|e| TemplateError::Render {
                template: template_str.to_string(),
                source: e,
            })?;
        inline
            .render("__inline__", context)
            .map_err(|e| TemplateError::Render {
                template: template_str.to_string(),
                source: e,
            })
    }
}

fn parse_manifest(text: &str, path: &Path) -> Result<TemplateManifest, TemplateError> {
    toml::from_str(text).map_err(|e| TemplateError::ManifestParse {
        path: path.to_path_buf(),
        source: e,
    })
}
