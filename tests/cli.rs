use std::error::Error;
use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn cli(workspace: &Path) -> Result<Command, Box<dyn Error>> {
    let mut cmd = Command::cargo_bin("construction_utils")?;
    cmd.current_dir(workspace).arg("--no-log-file");
    Ok(cmd)
}

/// Config pointing FreeCAD at a program that cannot exist, without xvfb.
const UNRUNNABLE_EXPORT: &str = "[export]\n\
cad_command = \"construction-utils-test-no-such-freecad\"\n\
virtual_display = \"never\"\n";

#[test]
fn create_project_then_generate_docs() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;

    cli(dir.path())?
        .args(["create_project", "cable_clip"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created"));

    let descriptor = fs::read_to_string(dir.path().join("cable_clip/construction.json"))?;
    assert!(descriptor.contains(r#""name": "cable_clip","#));
    for subdir in ["source", "3d", "resources", "img", "gcode"] {
        assert!(dir.path().join("cable_clip").join(subdir).join(".gitignore").is_file());
    }

    cli(dir.path())?
        .args(["generate_docs", "--no-export"])
        .assert()
        .success()
        .stdout(predicate::str::contains("README → cable_clip/README.md"))
        .stdout(predicate::str::contains("Export: disabled"));

    let readme = fs::read_to_string(dir.path().join("README.md"))?;
    assert!(readme.contains("[cable_clip](cable_clip/README.md)"));
    assert!(dir.path().join("cable_clip/README.md").is_file());
    Ok(())
}

#[test]
fn create_project_twice_keeps_existing() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    cli(dir.path())?.args(["create_project", "clip"]).assert().success();
    fs::write(dir.path().join("clip/construction.json"), "edited")?;

    cli(dir.path())?
        .args(["create_project", "clip"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
    assert_eq!(fs::read_to_string(dir.path().join("clip/construction.json"))?, "edited");
    Ok(())
}

#[test]
fn create_project_rejects_path_names() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    cli(dir.path())?
        .args(["create_project", "../outside"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid project name"));
    Ok(())
}

#[test]
fn gen_config_prints_stock_file() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    cli(dir.path())?
        .arg("gen_config")
        .assert()
        .success()
        .stdout(predicate::str::contains("[export]"))
        .stdout(predicate::str::contains("stale_threshold_secs = 2.0"));
    Ok(())
}

#[test]
fn malformed_descriptor_fails_generate_docs() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    fs::create_dir_all(dir.path().join("broken"))?;
    fs::write(dir.path().join("broken/construction.json"), r#"{"name": "Broken"}"#)?;

    cli(dir.path())?
        .args(["generate_docs", "--no-export"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("construction.json"));
    assert!(!dir.path().join("README.md").exists());
    Ok(())
}

#[test]
fn failed_export_only_fails_when_strict() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    fs::write(dir.path().join("construction_utils.toml"), UNRUNNABLE_EXPORT)?;
    cli(dir.path())?.args(["create_project", "clip"]).assert().success();
    fs::write(dir.path().join("clip/source/clip.FCStd"), "cad")?;

    cli(dir.path())?
        .arg("generate_docs")
        .assert()
        .success()
        .stdout(predicate::str::contains("Export failed"));
    assert!(dir.path().join("README.md").is_file());

    cli(dir.path())?
        .args(["generate_docs", "--strict-export"])
        .assert()
        .failure();
    Ok(())
}

#[test]
fn check_reports_missing_previews() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    cli(dir.path())?.args(["create_project", "clip"]).assert().success();
    fs::write(dir.path().join("clip/source/clip.FCStd"), "cad")?;

    cli(dir.path())?
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "CAD: source/clip.FCStd → img/previews/clip.png (missing)",
        ))
        .stdout(predicate::str::contains("1 construction, 1 CAD source, 1 preview missing"));
    assert!(!dir.path().join("README.md").exists());
    Ok(())
}

#[test]
fn invalid_config_is_reported() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    fs::write(dir.path().join("construction_utils.toml"), "[export]\nbogus = 1\n")?;
    cli(dir.path())?
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("bogus"));
    Ok(())
}

#[test]
fn log_file_is_written_by_default() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    Command::cargo_bin("construction_utils")?
        .current_dir(dir.path())
        .args(["create_project", "clip"])
        .assert()
        .success();
    assert!(dir.path().join(".logs/construction_utils.log").is_file());
    Ok(())
}

#[test]
fn check_writes_no_log_file() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    Command::cargo_bin("construction_utils")?
        .current_dir(dir.path())
        .arg("check")
        .assert()
        .success();
    assert!(!dir.path().join(".logs").exists());
    Ok(())
}
