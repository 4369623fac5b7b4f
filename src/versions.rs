//! Version Consistency Gate
//!
//! Parses the delimited version fields and cross-checks them before any
//! scaffolding work happens. Generation is all-or-nothing: a bad version
//! configuration aborts the run with a two-line diagnostic.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Which configuration field referenced an undeclared version code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionField {
    VersionsWithSolutions,
    VersionRandomizationGroups,
}

impl fmt::Display for VersionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionField::VersionsWithSolutions => f.write_str("versions_with_solutions"),
            VersionField::VersionRandomizationGroups => f.write_str("version_randomization_groups"),
        }
    }
}

/// The diagnostic text is a contract: downstream tooling greps for the
/// "not present in" phrasing, so the wording here must not drift.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VersionError {
    #[error(
        "The following version codes are invalid: {}\nVersion codes must be alphanumeric (letters and/or digits only).",
        .invalid.join(", ")
    )]
    InvalidVersionCode { invalid: Vec<String> },

    #[error(
        "{field} references version codes not present in versions_csv: {}\nEnsure all {field} entries appear in versions_csv.",
        .missing.join(", ")
    )]
    UndeclaredVersionReference {
        field: VersionField,
        missing: Vec<String>,
    },
}

/// Check whether a token is a usable version code.
///
/// Version codes become boolean guards in the generated DocStrip source.
/// `*`, `!`, `/`, `|`, and `&` belong to the guard expression syntax, `_`,
/// `$`, and `^` to TeX math mode, and `,` and `;` are the field delimiters
/// used here, so only alphanumeric codes are accepted.
pub fn is_valid_version_code(code: &str) -> bool {
    !code.is_empty() && code.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Parsed, cross-checked version configuration.
///
/// Produced by [`validate`] on success; the generation pipeline renders one
/// guard block per entry in `versions` and solution content only for
/// `with_solutions`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VersionPlan {
    /// Declared version codes, in declaration order.
    pub versions: Vec<String>,
    /// Versions whose rendered document includes solution content.
    pub with_solutions: Vec<String>,
    /// Versions that share question-randomization seeding.
    pub randomization_groups: Vec<Vec<String>>,
}

impl VersionPlan {
    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// Seed group number for every version, in declaration order.
    ///
    /// Versions in the same randomization group share a number; versions in
    /// no group each get a fresh one.
    pub fn seed_groups(&self) -> Vec<(String, u32)> {
        let mut next_solo = self.randomization_groups.len() as u32;
        self.versions
            .iter()
            .map(|v| {
                let group = self
                    .randomization_groups
                    .iter()
                    .position(|g| g.contains(v))
                    .map(|i| i as u32 + 1)
                    .unwrap_or_else(|| {
                        next_solo += 1;
                        next_solo
                    });
                (v.clone(), group)
            })
            .collect()
    }
}

/// Validate the version configuration.
///
/// With `has_versions == false` the other fields are ignored and the empty
/// plan is returned. Otherwise the checks run in a fixed order: code
/// well-formedness first (collecting every bad token), then the solution
/// subset, then the randomization groups (stopping at the first offending
/// group). Pure function over its inputs.
pub fn validate(
    has_versions: bool,
    versions_csv: &str,
    versions_with_solutions: &str,
    version_randomization_groups: &str,
) -> Result<VersionPlan, VersionError> {
    if !has_versions {
        return Ok(VersionPlan::default());
    }

    // Splitting "" on ',' yields a single empty token, which fails the code
    // check below: enabling versions without listing any is a configuration
    // error, not an empty plan.
    let versions: Vec<String> = versions_csv
        .split(',')
        .map(|v| v.trim().to_string())
        .collect();

    let invalid: Vec<String> = versions
        .iter()
        .filter(|v| !is_valid_version_code(v.as_str()))
        .cloned()
        .collect();
    if !invalid.is_empty() {
        return Err(VersionError::InvalidVersionCode { invalid });
    }

    let with_solutions = if versions_with_solutions.trim().is_empty() {
        vec![]
    } else {
        let subset = split_codes(versions_with_solutions, ',');
        let missing = undeclared(&versions, &subset);
        if !missing.is_empty() {
            return Err(VersionError::UndeclaredVersionReference {
                field: VersionField::VersionsWithSolutions,
                missing,
            });
        }
        subset
    };

    let mut randomization_groups = Vec::new();
    if !version_randomization_groups.trim().is_empty() {
        for group_str in version_randomization_groups.split(',') {
            let group = split_codes(group_str, ';');
            let missing = undeclared(&versions, &group);
            if !missing.is_empty() {
                // First offending group aborts; later groups stay unchecked.
                return Err(VersionError::UndeclaredVersionReference {
                    field: VersionField::VersionRandomizationGroups,
                    missing,
                });
            }
            randomization_groups.push(group);
        }
    }

    Ok(VersionPlan {
        versions,
        with_solutions,
        randomization_groups,
    })
}

fn split_codes(raw: &str, sep: char) -> Vec<String> {
    raw.split(sep)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn undeclared(universe: &[String], candidates: &[String]) -> Vec<String> {
    candidates
        .iter()
        .filter(|c| !universe.contains(*c))
        .cloned()
        .collect()
}
