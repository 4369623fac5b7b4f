//! Generation Manifests
//!
//! Every generated project carries a `manifest.json` recording what was
//! written and under which configuration, with reproducible hashes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{to_string, Value};
use sha2::{Digest, Sha256};

/// Compute SHA-256 hash of bytes, return hex string
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    hex::encode(result)
}

/// Convert to canonical JSON (sorted keys, no whitespace)
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let v: Value = serde_json::to_value(value)?;
    let sorted = sort_value(&v);
    to_string(&sorted)
}

fn sort_value(v: &Value) -> Value {
    match v {
        Value::Object(map) => {
            let mut sorted: Vec<_> = map.iter().collect();
            sorted.sort_by(|a, b| a.0.cmp(b.0));
            let sorted_map: serde_json::Map<String, Value> = sorted
                .into_iter()
                .map(|(k, v)| (k.clone(), sort_value(v)))
                .collect();
            Value::Object(sorted_map)
        }
        Value::Array(arr) => Value::Array(arr.iter().map(sort_value).collect()),
        _ => v.clone(),
    }
}

/// Compute the manifest hash for a generated project
pub fn compute_manifest_hash<T: Serialize>(manifest: &T) -> Result<String, serde_json::Error> {
    let canonical = canonical_json(manifest)?;
    Ok(sha256_hex(canonical.as_bytes()))
}

/// Compute the job hash for a generation run
/// job_hash = sha256(exam_code + canonical_config + engine_version)
pub fn compute_job_hash(
    exam_code: &str,
    config: &impl Serialize,
    engine_version: &str,
) -> Result<String, serde_json::Error> {
    let canonical_config = canonical_json(config)?;
    let combined = format!("{}:{}:{}", exam_code, canonical_config, engine_version);
    Ok(sha256_hex(combined.as_bytes()))
}

/// One written file, path relative to the project directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestFile {
    pub path: String,
    pub hash: String,
}

/// Record of one generation run, written as `manifest.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationManifest {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub engine_version: String,
    pub template_name: String,
    pub exam_code: String,
    /// Deterministic over (exam_code, configuration, engine version).
    pub job_hash: String,
    /// Hash of the whole manifest; computed last.
    pub manifest_hash: String,
    pub files: Vec<ManifestFile>,
}

// We need hex encoding
mod hex {
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{:02x}", b)).collect()
    }
}
