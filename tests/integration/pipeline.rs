use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use protobuild::config::BuildConfig;
use protobuild::core::{ProtobuildError, find_protobuild_error};
use protobuild::pipeline::Pipeline;
use protobuild::schema::{ExclusionReason, ModulePath};
use protobuild::test_utils::{FakeSourceProvider, RecordingGenerator, init_test_logging, write_tree};
use tempfile::TempDir;

fn config(project: &Path) -> BuildConfig {
    BuildConfig::default()
        .with_project_dir(project)
        .with_base_module("mod")
        .with_common_files(["common.proto"])
        .with_excluded_subtrees(["skip"])
}

fn schema_tree() -> FakeSourceProvider {
    FakeSourceProvider::new([
        ("root.proto", "syntax = \"proto3\";\n"),
        ("a/b/child.proto", "syntax = \"proto3\";\nimport \"root.proto\";"),
        ("a/common.proto", "syntax = \"proto3\";\n"),
        ("skip/x.proto", "syntax = \"proto3\";\n"),
        ("README.md", "# schemas\n"),
    ])
}

fn tree_file(relative: &str) -> PathBuf {
    Path::new("proto").join(relative)
}

#[tokio::test]
async fn test_build_assigns_modules_and_cleans_up() {
    init_test_logging(None);
    let project = TempDir::new().unwrap();

    let pipeline = Pipeline::new(config(project.path()), schema_tree(), RecordingGenerator::succeeding());
    let report = pipeline.build().await.unwrap();

    let modules: BTreeMap<_, _> = report.modules.into_iter().collect();
    assert_eq!(modules.len(), 3);
    assert_eq!(modules[Path::new("root.proto")], ModulePath::new("mod"));
    assert_eq!(modules[Path::new("a/b/child.proto")], ModulePath::new("mod").child("a").child("b"));
    assert_eq!(modules[Path::new("a/common.proto")], ModulePath::new("mod").child("common"));
    assert_eq!(report.excluded, 2);

    assert!(!project.path().join("proto").exists(), "tree must be removed after the run");
}

#[tokio::test]
async fn test_generator_sees_annotated_files_only() {
    let project = TempDir::new().unwrap();
    let generator = RecordingGenerator::succeeding();
    let pipeline = Pipeline::new(config(project.path()), schema_tree(), &generator);
    pipeline.build().await.unwrap();

    let calls = generator.calls();
    assert_eq!(calls.len(), 1, "generator runs exactly once per build");
    let call = &calls[0];
    assert!(call.tree_existed);

    let mut files = call.request.files.clone();
    files.sort();
    assert_eq!(
        files,
        vec![tree_file("a/b/child.proto"), tree_file("a/common.proto"), tree_file("root.proto")]
    );
    assert!(!call.request.files.contains(&tree_file("skip/x.proto")));

    let contents: BTreeMap<_, _> = call.contents.iter().cloned().collect();
    assert_eq!(
        contents[&tree_file("root.proto")],
        "syntax = \"proto3\";\noption go_package = \"mod\";\n"
    );
    assert_eq!(
        contents[&tree_file("a/b/child.proto")],
        "syntax = \"proto3\";\nimport \"root.proto\";\noption go_package = \"mod/a/b\";\n"
    );
    assert_eq!(
        contents[&tree_file("a/common.proto")],
        "syntax = \"proto3\";\noption go_package = \"mod/common\";\n"
    );
}

#[tokio::test]
async fn test_generation_failure_still_removes_tree() {
    let project = TempDir::new().unwrap();
    let generator = RecordingGenerator::failing(3, "bad syntax");

    let pipeline = Pipeline::new(config(project.path()), schema_tree(), &generator);
    let err = pipeline.build().await.unwrap_err();

    match find_protobuild_error(&err) {
        Some(error @ ProtobuildError::GenerationFailed {
            ..
        }) => {
            assert_eq!(error.exit_code(), Some(3));
            assert_eq!(error.diagnostics(), Some("bad syntax"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(generator.calls().len(), 1);
    assert!(!project.path().join("proto").exists());
}

#[tokio::test]
async fn test_fetch_failure_removes_partial_tree_and_skips_generation() {
    let project = TempDir::new().unwrap();
    write_tree(project.path(), [("old/x.pb.go", "package old\n")]).unwrap();

    let provider = FakeSourceProvider::new([("partial.proto", "syntax")])
        .failing_after_write(128, "fatal: repository not found");
    let generator = RecordingGenerator::succeeding();

    let pipeline = Pipeline::new(config(project.path()), &provider, &generator);
    let err = pipeline.build().await.unwrap_err();

    let error = find_protobuild_error(&err).unwrap();
    assert!(matches!(error, ProtobuildError::FetchFailed { .. }));
    assert_eq!(error.exit_code(), Some(128));

    assert_eq!(provider.requests().len(), 1);
    assert!(generator.calls().is_empty());
    assert!(!project.path().join("proto").exists());
    // Sweep runs before the fetch
    assert!(!project.path().join("old/x.pb.go").exists());
}

#[tokio::test]
async fn test_stale_artifacts_are_swept_before_generation() {
    let project = TempDir::new().unwrap();
    write_tree(
        project.path(),
        [
            ("services/token.pb.go", "package services\n"),
            ("services/keep.go", "package services\n"),
            ("go.mod", "module example\n"),
        ],
    )
    .unwrap();

    let generator = RecordingGenerator::succeeding().with_output("services/token.pb.go", "// fresh\n");
    let pipeline = Pipeline::new(config(project.path()), schema_tree(), &generator);
    let report = pipeline.build().await.unwrap();

    assert_eq!(report.swept, 1);
    assert_eq!(fs::read_to_string(project.path().join("services/token.pb.go")).unwrap(), "// fresh\n");
    assert!(project.path().join("services/keep.go").exists());
    assert!(project.path().join("go.mod").exists());
}

#[tokio::test]
async fn test_leftover_tree_is_replaced() {
    let project = TempDir::new().unwrap();
    write_tree(project.path(), [("proto/stale.proto", "syntax = \"proto3\";\n")]).unwrap();

    let generator = RecordingGenerator::succeeding();
    let pipeline = Pipeline::new(config(project.path()), schema_tree(), &generator);
    pipeline.build().await.unwrap();

    let calls = generator.calls();
    assert!(!calls[0].request.files.contains(&tree_file("stale.proto")));
    assert!(!project.path().join("proto").exists());
}

#[tokio::test]
async fn test_files_without_trailing_newline_or_content() {
    let project = TempDir::new().unwrap();
    let provider = FakeSourceProvider::new([("empty.proto", ""), ("bare.proto", "syntax = \"proto3\";")]);
    let generator = RecordingGenerator::succeeding();

    Pipeline::new(config(project.path()), provider, &generator).build().await.unwrap();

    let contents: BTreeMap<_, _> = generator.calls()[0].contents.iter().cloned().collect();
    assert_eq!(contents[&tree_file("empty.proto")], "option go_package = \"mod\";\n");
    assert_eq!(
        contents[&tree_file("bare.proto")],
        "syntax = \"proto3\";\noption go_package = \"mod\";\n"
    );
}

#[tokio::test]
async fn test_plan_reports_modules_without_generating() {
    let project = TempDir::new().unwrap();
    let generator = RecordingGenerator::succeeding();

    let pipeline = Pipeline::new(config(project.path()), schema_tree(), &generator);
    let plan = pipeline.plan().await.unwrap();

    assert!(generator.calls().is_empty());
    assert!(!project.path().join("proto").exists());

    let common: Vec<_> = plan.files.iter().filter(|f| f.common).map(|f| f.file.clone()).collect();
    assert_eq!(common, vec![PathBuf::from("a/common.proto")]);

    let excluded: BTreeMap<_, _> = plan.excluded.iter().map(|s| (s.file.clone(), s.reason.clone())).collect();
    assert_eq!(excluded[Path::new("README.md")], ExclusionReason::NotSchema);
    assert_eq!(
        excluded[Path::new("skip/x.proto")],
        ExclusionReason::ExcludedSubtree {
            subtree: PathBuf::from("skip"),
        }
    );

    let json = serde_json::to_value(&plan).unwrap();
    assert_eq!(json["revision"], plan.revision.as_str());
    assert!(json["excluded"].as_array().unwrap().iter().any(|e| e["reason"] == "excluded_subtree"));
}

#[tokio::test]
async fn test_invalid_config_fails_before_touching_disk() {
    let project = TempDir::new().unwrap();
    write_tree(project.path(), [("x.pb.go", "package x\n")]).unwrap();
    let provider = schema_tree();

    let config = config(project.path()).with_base_module("");
    let err = Pipeline::new(config, &provider, RecordingGenerator::succeeding()).build().await.unwrap_err();

    assert!(matches!(find_protobuild_error(&err), Some(ProtobuildError::ConfigError { .. })));
    assert!(provider.requests().is_empty());
    assert!(project.path().join("x.pb.go").exists());
}

/// False when running with privileges that ignore file permissions.
#[cfg(unix)]
fn read_only_is_enforced(dir: &Path) -> bool {
    let path = dir.join("permission-check");
    fs::write(&path, "").unwrap();
    let mut permissions = fs::metadata(&path).unwrap().permissions();
    permissions.set_readonly(true);
    fs::set_permissions(&path, permissions).unwrap();
    let enforced = fs::OpenOptions::new().append(true).open(&path).is_err();
    fs::remove_file(&path).unwrap();
    enforced
}

#[cfg(unix)]
#[tokio::test]
async fn test_annotation_failure_skips_generation_and_removes_tree() {
    let scratch = TempDir::new().unwrap();
    if !read_only_is_enforced(scratch.path()) {
        return;
    }
    let project = TempDir::new().unwrap();
    let provider = schema_tree().with_read_only("a/b/child.proto");
    let generator = RecordingGenerator::succeeding();

    let err = Pipeline::new(config(project.path()), provider, &generator).build().await.unwrap_err();

    assert!(format!("{err:#}").contains("a/b/child.proto"));
    assert!(find_protobuild_error(&err).and_then(ProtobuildError::exit_code).is_none());
    assert!(generator.calls().is_empty());
    assert!(!project.path().join("proto").exists());
}

#[tokio::test]
async fn test_scan_failure_skips_generation() {
    let project = TempDir::new().unwrap();
    let provider = FakeSourceProvider::default().without_tree();
    let generator = RecordingGenerator::succeeding();

    let err = Pipeline::new(config(project.path()), &provider, &generator).build().await.unwrap_err();

    assert!(format!("{err:#}").contains("Failed to scan schema tree"));
    assert_eq!(provider.requests().len(), 1);
    assert!(generator.calls().is_empty());
    assert!(!project.path().join("proto").exists());
}

#[cfg(unix)]
#[tokio::test]
async fn test_sweep_failure_still_removes_leftover_tree() {
    use std::os::unix::fs::PermissionsExt;

    let project = TempDir::new().unwrap();
    write_tree(
        project.path(),
        [("proto/stale.proto", "syntax = \"proto3\";\n"), ("locked/x.pb.go", "package locked\n")],
    )
    .unwrap();
    let locked = project.path().join("locked");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();
    if fs::remove_file(locked.join("x.pb.go")).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let provider = schema_tree();
    let generator = RecordingGenerator::succeeding();
    let result = Pipeline::new(config(project.path()), &provider, &generator).build().await;
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    let err = result.unwrap_err();
    assert!(matches!(find_protobuild_error(&err), Some(ProtobuildError::FileSystemError { .. })));
    assert!(provider.requests().is_empty(), "fetch must not start after a failed sweep");
    assert!(generator.calls().is_empty());
    assert!(!project.path().join("proto").exists(), "leftover tree must not survive a failed sweep");
}
