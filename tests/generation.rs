//! Generation Invariant Tests
//!
//! These verify the pipeline-level guarantees: the version gate always runs,
//! a failed run leaves no output, and manifests are reproducible.

use std::fs;

use examforge_core::{
    config::ProjectConfig,
    pipeline::{GenerationPipeline, PipelineError},
    templates::TemplateSet,
};

fn base_config() -> ProjectConfig {
    ProjectConfig {
        quiz_number: 1,
        exam_code: "q01".to_string(),
        exam_name: "Quiz 1".to_string(),
        exam_date: "2025-10-31".to_string(),
        course_name: "Calculus I".to_string(),
        instructor_name: String::new(),
        term_name: "Fall 2025".to_string(),
        site_id: String::new(),
        number_copies: 45,
        use_nyu_fonts: false,
        has_versions: false,
        versions_csv: String::new(),
        versions_with_solutions: String::new(),
        version_randomization_groups: String::new(),
        bundle_name: String::new(),
        install_dir: String::new(),
    }
}

fn versioned_config() -> ProjectConfig {
    ProjectConfig {
        has_versions: true,
        versions_csv: "A,B,C".to_string(),
        versions_with_solutions: "A".to_string(),
        version_randomization_groups: "A;B".to_string(),
        ..base_config()
    }
}

fn create_pipeline() -> GenerationPipeline {
    GenerationPipeline::new(TemplateSet::builtin().unwrap())
}

#[test]
fn invariant_generate_calls_validate() {
    // Generating with a bad version code must fail through the same gate
    // the validate command uses.

    let pipeline = create_pipeline();
    let out = tempfile::tempdir().unwrap();

    let config = ProjectConfig {
        has_versions: true,
        versions_csv: "A,v1.0".to_string(),
        ..base_config()
    };

    let result = pipeline.generate(&config, out.path());
    assert!(result.is_err());
    let err = result.unwrap_err();
    assert!(err.to_string().contains("version codes are invalid"));

    // A failed run must not leave a scaffolded project behind.
    assert!(!out.path().join("q01").exists());
}

#[test]
fn invariant_undeclared_reference_blocks_generation() {
    let pipeline = create_pipeline();
    let out = tempfile::tempdir().unwrap();

    let config = ProjectConfig {
        has_versions: true,
        versions_csv: "A,B".to_string(),
        versions_with_solutions: "C".to_string(),
        ..base_config()
    };

    let err = pipeline.generate(&config, out.path()).unwrap_err();
    assert!(matches!(err, PipelineError::Validation(_)));
    let message = err.to_string();
    assert!(message.contains("not present in"));
    assert!(message.contains("versions_with_solutions"));
    assert!(!out.path().join("q01").exists());
}

#[test]
fn invariant_valid_config_generates() {
    let pipeline = create_pipeline();
    let out = tempfile::tempdir().unwrap();

    let report = pipeline.generate(&versioned_config(), out.path()).unwrap();

    let project_dir = out.path().join("q01");
    assert_eq!(report.project_dir, project_dir);
    for name in ["q01.dtx", "build.lua", "README.md", "manifest.json"] {
        assert!(project_dir.join(name).exists(), "{name} should exist");
    }
    assert!(!report.manifest_hash.is_empty());

    let dtx = fs::read_to_string(project_dir.join("q01.dtx")).unwrap();
    assert!(dtx.contains("October 31, 2025"));
    for v in ["A", "B", "C"] {
        assert!(dtx.contains(&format!("%<*{v}>")), "guard for {v} missing");
        assert!(dtx.contains(&format!("\\file{{q01-{v}.tex}}")));
    }
    // Only version A was declared with solutions.
    assert_eq!(dtx.matches("\\printanswerstrue").count(), 1);
    assert_eq!(dtx.matches("\\printanswersfalse").count(), 2);
    // A and B share a randomization group; C seeds alone.
    assert_eq!(dtx.matches("\\newcommand{\\randomizationseed}{1}").count(), 2);
    assert_eq!(dtx.matches("\\newcommand{\\randomizationseed}{2}").count(), 1);

    let readme = fs::read_to_string(project_dir.join("README.md")).unwrap();
    assert!(readme.contains("`A` (solutions included)"));

    let build = fs::read_to_string(project_dir.join("build.lua")).unwrap();
    assert!(build.contains(r#"module = "q01""#));
}

#[test]
fn invariant_unversioned_project_has_no_guards() {
    let pipeline = create_pipeline();
    let out = tempfile::tempdir().unwrap();

    pipeline.generate(&base_config(), out.path()).unwrap();

    let dtx = fs::read_to_string(out.path().join("q01/q01.dtx")).unwrap();
    assert!(dtx.contains("\\generate{\\file{q01.tex}{\\from{q01.dtx}{exam}}}"));
    assert!(!dtx.contains("%<*A>"));
}

#[test]
fn invariant_engine_gate_blocks_newer_templates() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("template.toml"),
        r#"
name = "future"
description = "Written for a newer engine"
engine_min_version = "99.0.0"

[[outputs]]
template = "out.txt.tera"
filename = "out.txt"
"#,
    )
    .unwrap();
    fs::write(dir.path().join("out.txt.tera"), "{{ exam_code }}\n").unwrap();

    let pipeline = GenerationPipeline::new(TemplateSet::load_from_dir(dir.path()).unwrap());
    let out = tempfile::tempdir().unwrap();

    let err = pipeline.generate(&base_config(), out.path()).unwrap_err();
    assert!(matches!(err, PipelineError::EngineVersionMismatch { .. }));
    assert!(!out.path().join("q01").exists());
}

#[test]
fn invariant_job_hash_stable() {
    // Identical answers must produce the same job hash and file list.
    let pipeline = create_pipeline();
    let out1 = tempfile::tempdir().unwrap();
    let out2 = tempfile::tempdir().unwrap();

    let report1 = pipeline.generate(&versioned_config(), out1.path()).unwrap();
    let report2 = pipeline.generate(&versioned_config(), out2.path()).unwrap();

    assert_eq!(report1.job_hash, report2.job_hash);
    assert_eq!(report1.files, report2.files);
}

#[test]
fn invariant_existing_project_is_not_overwritten() {
    let pipeline = create_pipeline();
    let out = tempfile::tempdir().unwrap();

    pipeline.generate(&base_config(), out.path()).unwrap();
    let err = pipeline.generate(&base_config(), out.path()).unwrap_err();
    assert!(matches!(err, PipelineError::ProjectExists(_)));
}

#[test]
fn replay_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let replay = dir.path().join("replay.json");
    fs::write(
        &replay,
        r#"{
            "answers": {
                "quiz_number": 3,
                "exam_code": "q03",
                "exam_name": "Quiz 3",
                "exam_date": "2026-03-09",
                "has_versions": true,
                "versions_csv": "A,B",
                "versions_with_solutions": "B"
            }
        }"#,
    )
    .unwrap();

    let config = ProjectConfig::from_replay_file(&replay).unwrap();
    let pipeline = create_pipeline();
    let out = tempfile::tempdir().unwrap();
    let report = pipeline.generate(&config, out.path()).unwrap();

    assert_eq!(report.project_dir, out.path().join("q03"));
    let dtx = fs::read_to_string(report.project_dir.join("q03.dtx")).unwrap();
    assert!(dtx.contains("March 9, 2026"));
    assert!(dtx.contains("%<*B>"));
}

#[test]
fn validate_only_passes_well_formed_config() {
    let pipeline = create_pipeline();
    let plan = pipeline.validate_config(&versioned_config()).unwrap();
    assert_eq!(plan.versions, ["A", "B", "C"]);
}
