// Integration tests for the factory-loader binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const PERCLICK: &str = "policies.create=perclick&url=https://github.com/org/repo";

struct CliFixture {
    dir: TempDir,
}

impl CliFixture {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn devfile(&self, name: &str) -> PathBuf {
        self.write(
            "devfile.yaml",
            &format!("schemaVersion: 2.2.0\nmetadata:\n  name: {name}\n"),
        )
    }

    /// One stopped workspace stamped with `factory_id`.
    fn existing(&self, name: &str, factory_id: &str) -> PathBuf {
        self.write(
            "existing.yaml",
            &format!(
                "- uid: uid-1\n  name: {name}\n  namespace: user-che\n  phase: Stopped\n  annotations:\n    che.eclipse.org/devfile-source: \"factory:\\n  params: {factory_id}\\n\"\n"
            ),
        )
    }

    fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("factory-loader").unwrap();
        cmd.env("LOG_OUTPUT", "none")
            .env("FACTORY_MIN_STEP_DURATION_MS", "0")
            .env_remove("FACTORY_NAMESPACE")
            .current_dir(self.dir.path());
        cmd
    }
}

#[test]
fn test_id_prints_parsed_parameters() {
    let fixture = CliFixture::new();
    fixture
        .command()
        .args(["id", PERCLICK])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("factory id:  {PERCLICK}")))
        .stdout(predicate::str::contains("policy:      perclick"))
        .stdout(predicate::str::contains("source kind: devfile"))
        .stdout(predicate::str::contains("storage:     default"));
}

#[test]
fn test_id_rejects_query_without_url() {
    let fixture = CliFixture::new();
    fixture
        .command()
        .args(["id", "policies.create=perclick"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("❌ Failed"));
}

#[test]
fn test_prepare_stamps_factory_params() {
    let fixture = CliFixture::new();
    let devfile = fixture.devfile("new-project");
    fixture
        .command()
        .args(["prepare", PERCLICK, "--devfile"])
        .arg(&devfile)
        .assert()
        .success()
        .stdout(predicate::str::contains("schemaVersion: 2.2.0"))
        .stdout(predicate::str::contains("che.eclipse.org/devfile-source"))
        .stdout(predicate::str::contains("name: new-project"));
}

#[test]
fn test_simulate_creates_workspace() {
    let fixture = CliFixture::new();
    let devfile = fixture.devfile("new-project");
    fixture
        .command()
        .args(["simulate", "url=https://github.com/org/repo", "--devfile"])
        .arg(&devfile)
        .assert()
        .success()
        .stdout(predicate::str::contains("✓"))
        .stdout(predicate::str::contains(
            "✅ Workspace ready: user-che/new-project",
        ));
}

#[test]
fn test_simulate_stops_at_conflict() {
    let fixture = CliFixture::new();
    let devfile = fixture.devfile("new-project");
    let existing = fixture.existing("new-project", PERCLICK);
    fixture
        .command()
        .args(["simulate", PERCLICK, "--devfile"])
        .arg(&devfile)
        .arg("--existing")
        .arg(&existing)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "an existing workspace 'new-project' matches this factory",
        ));
}

#[test]
fn test_simulate_opens_existing_on_request() {
    let fixture = CliFixture::new();
    let devfile = fixture.devfile("new-project");
    let existing = fixture.existing("new-project", PERCLICK);
    fixture
        .command()
        .args(["simulate", PERCLICK, "--devfile"])
        .arg(&devfile)
        .arg("--existing")
        .arg(&existing)
        .args(["--on-conflict", "open-existing"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "✅ Workspace ready: user-che/new-project",
        ));
}

#[test]
fn test_simulate_reads_config_file() {
    let fixture = CliFixture::new();
    let devfile = fixture.devfile("new-project");
    let config = fixture.write("loader.yaml", "create_timeout_secs: 5\nmin_step_duration_ms: 0\n");
    fixture
        .command()
        .args(["simulate", "url=https://github.com/org/repo", "--devfile"])
        .arg(&devfile)
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("user-che/new-project"));
}
