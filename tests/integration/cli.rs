//! The `protobuild` binary against fake `git` and `protoc` executables.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Clones a small tree into the destination argument (`$6`).
const FAKE_GIT: &str = r#"
[ "$1" = "clone" ] || exit 9
dest="$6"
mkdir -p "$dest/services" "$dest/sdk" "$dest/mirror"
printf 'syntax = "proto3";\n' > "$dest/services/basic_types.proto"
printf 'syntax = "proto3";\nimport "basic_types.proto";\n' > "$dest/services/token_service.proto"
printf 'syntax = "proto3";' > "$dest/sdk/transaction_list.proto"
printf 'syntax = "proto3";\n' > "$dest/mirror/consensus_service.proto"
printf 'not a schema\n' > "$dest/README.md"
printf '%s\n' "$@" > clone-args.txt
"#;

const FAILING_GIT: &str = r#"
mkdir -p "$6/partial"
echo "fatal: could not read from remote repository" >&2
exit 128
"#;

/// Records every schema argument and its contents, then emits one artifact.
const FAKE_PROTOC: &str = r#"
for arg in "$@"; do
  case "$arg" in
    *.proto) printf '== %s\n' "$arg" >> captured.txt; cat "$arg" >> captured.txt ;;
  esac
done
printf '%s\n' "$@" > protoc-args.txt
mkdir -p services
echo "package services" > services/basic_types.pb.go
"#;

const FAILING_PROTOC: &str = r#"
echo "bad syntax" >&2
exit 3
"#;

fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

struct Project {
    _tools: TempDir,
    dir: TempDir,
    git: PathBuf,
    protoc: PathBuf,
}

impl Project {
    fn new(git: &str, protoc: &str) -> Self {
        let tools = TempDir::new().unwrap();
        let git = script(tools.path(), "git", git);
        let protoc = script(tools.path(), "protoc", protoc);
        Self {
            _tools: tools,
            dir: TempDir::new().unwrap(),
            git,
            protoc,
        }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("protobuild").unwrap();
        cmd.arg("--project-dir")
            .arg(self.path())
            .env("PROTOBUILD_NO_PROGRESS", "1")
            .env("PROTOBUILD_GIT", &self.git)
            .env("PROTOBUILD_PROTOC", &self.protoc)
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG");
        cmd
    }

    fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.path().join(relative)).unwrap()
    }
}

#[test]
fn test_build_annotates_generates_and_removes_tree() {
    let project = Project::new(FAKE_GIT, FAKE_PROTOC);
    fs::create_dir_all(project.path().join("services")).unwrap();
    fs::write(project.path().join("services/stale.pb.go"), "package services\n").unwrap();

    project
        .cmd()
        .arg("build")
        .assert()
        .success()
        .stdout(predicate::str::contains("Generation complete"))
        .stdout(predicate::str::contains("3 schema files generated"));

    assert!(!project.path().join("proto").exists());
    assert!(!project.path().join("services/stale.pb.go").exists());
    assert!(project.path().join("services/basic_types.pb.go").exists());

    let clone_args = project.read("clone-args.txt");
    assert!(clone_args.starts_with("clone\nhttps://github.com/hashgraph/hedera-protobufs\n--depth=1\n--revision\n"));
    assert!(clone_args.ends_with("proto\n"));

    let captured = project.read("captured.txt");
    assert!(captured.contains(
        "== proto/services/basic_types.proto\nsyntax = \"proto3\";\noption go_package = \"github.com/hashgraph/hedera-protobufs-go/common\";\n"
    ));
    assert!(captured.contains(
        "import \"basic_types.proto\";\noption go_package = \"github.com/hashgraph/hedera-protobufs-go/services\";\n"
    ));
    assert!(captured.contains(
        "== proto/sdk/transaction_list.proto\nsyntax = \"proto3\";\noption go_package = \"github.com/hashgraph/hedera-protobufs-go/sdk\";\n"
    ));
    assert!(!captured.contains("mirror"));
    assert!(!captured.contains("README"));

    let protoc_args = project.read("protoc-args.txt");
    assert!(protoc_args.starts_with(
        "--go_out=.\n--go_opt=module=github.com/hashgraph/hedera-protobufs-go\n--go-grpc_out=.\n"
    ));
    assert!(protoc_args.contains("-Iproto/services\n-Iproto/block\n-Iproto/sdk\n-Iproto/streams\n-Iproto/platform\n-Iproto\n"));
}

#[test]
fn test_generator_failure_propagates_exit_code_and_stderr() {
    let project = Project::new(FAKE_GIT, FAILING_PROTOC);

    project
        .cmd()
        .arg("build")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("bad syntax"));

    assert!(!project.path().join("proto").exists());
}

#[test]
fn test_fetch_failure_propagates_exit_code_and_removes_partial_tree() {
    let project = Project::new(FAILING_GIT, FAKE_PROTOC);

    project
        .cmd()
        .arg("build")
        .assert()
        .code(128)
        .stderr(predicate::str::contains("could not read from remote repository"));

    assert!(!project.path().join("proto").exists());
    assert!(!project.path().join("captured.txt").exists());
}

#[test]
fn test_missing_protoc_reports_tool_not_found() {
    let project = Project::new(FAKE_GIT, FAKE_PROTOC);

    project
        .cmd()
        .args(["build", "--protoc", "protobuild-no-such-protoc-91ab"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("protobuild-no-such-protoc-91ab"));

    assert!(!project.path().join("proto").exists());
}

#[test]
fn test_revision_override_reaches_git() {
    let project = Project::new(FAKE_GIT, FAKE_PROTOC);

    project.cmd().args(["build", "--revision", "0123abcd"]).assert().success();

    assert!(project.read("clone-args.txt").contains("--revision\n0123abcd\n"));
}

#[test]
fn test_plan_json_lists_modules_without_generating() {
    let project = Project::new(FAKE_GIT, FAILING_PROTOC);

    let output = project.cmd().args(["plan", "--format", "json"]).assert().success().get_output().stdout.clone();
    let plan: serde_json::Value = serde_json::from_slice(&output).unwrap();

    let files = plan["files"].as_array().unwrap();
    assert_eq!(files.len(), 3);
    assert!(files.iter().any(|f| f["file"] == "services/basic_types.proto"
        && f["module"] == "github.com/hashgraph/hedera-protobufs-go/common"
        && f["common"] == true));
    assert!(plan["excluded"].as_array().unwrap().iter().any(|e| e["file"] == "mirror/consensus_service.proto"));
    assert!(!project.path().join("proto").exists());
}

#[test]
fn test_sweep_removes_only_generated_files() {
    let project = Project::new(FAKE_GIT, FAKE_PROTOC);
    fs::create_dir_all(project.path().join("a/b")).unwrap();
    fs::write(project.path().join("a/b/x.pb.go"), "").unwrap();
    fs::write(project.path().join("y.pb.go"), "").unwrap();
    fs::write(project.path().join("a/main.go"), "").unwrap();

    project
        .cmd()
        .args(["sweep", "--list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 2 generated files"));

    assert!(!project.path().join("a/b/x.pb.go").exists());
    assert!(!project.path().join("y.pb.go").exists());
    assert!(project.path().join("a/main.go").exists());

    // Nothing left to remove
    project.cmd().arg("sweep").assert().success().stdout(predicate::str::contains("Removed 0 generated files"));
}

#[test]
fn test_no_progress_accepts_boolean_like_values() {
    let project = Project::new(FAKE_GIT, FAKE_PROTOC);

    for value in ["1", "true", "0", "false", ""] {
        project
            .cmd()
            .env("PROTOBUILD_NO_PROGRESS", value)
            .arg("sweep")
            .assert()
            .success()
            .stdout(predicate::str::contains("Removed 0 generated files"));
    }
    project.cmd().args(["--no-progress", "sweep"]).assert().success();
}
