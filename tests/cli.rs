use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;

fn linfa_train(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_linfa-train"))
        .args(args)
        .current_dir(dir)
        .env_remove("LINFA_TRAIN_MODE")
        .env_remove("LINFA_TRAIN_MODEL")
        .env_remove("LINFA_TRAIN_MODEL_PATH")
        .env("RUST_LOG", "off")
        .output()
        .unwrap()
}

fn document(output: &Output) -> Value {
    let stdout = String::from_utf8(output.stdout.clone()).unwrap();
    assert_eq!(stdout.lines().count(), 1, "expected one JSON line: {}", stdout);
    serde_json::from_str(&stdout).unwrap()
}

#[test]
fn default_run_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let output = linfa_train(dir.path(), &["--model-path", "out/model.bin"]);

    assert_eq!(output.status.code(), Some(0));
    let json = document(&output);
    assert_eq!(json["success"], true);
    assert_eq!(json["mode"], "iris");
    assert_eq!(json["model_type"], "randomforest");
    assert_eq!(json["n_samples"], 150);
    assert!(dir.path().join("out").join("model.bin").exists());
}

#[test]
fn model_path_from_environment() {
    let dir = tempfile::tempdir().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_linfa-train"))
        .args(["--model", "gradientboosting"])
        .current_dir(dir.path())
        .env("LINFA_TRAIN_MODEL_PATH", dir.path().join("env.bin"))
        .env("RUST_LOG", "off")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(document(&output)["model_type"], "gradientboosting");
    assert!(dir.path().join("env.bin").exists());
}

#[test]
fn unknown_model_falls_back_to_random_forest() {
    let dir = tempfile::tempdir().unwrap();
    let output = linfa_train(
        dir.path(),
        &["--model", "xgboost", "--model-path", "model.bin"],
    );

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(document(&output)["model_type"], "randomforest");
}

#[test]
fn warnings_stay_quiet_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_linfa-train"))
        .args([
            "--model",
            "xgboost",
            "--files",
            "ignored.csv",
            "--model-path",
            "model.bin",
        ])
        .current_dir(dir.path())
        .env_remove("RUST_LOG")
        .env_remove("LINFA_TRAIN_MODE")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(document(&output)["model_type"], "randomforest");
    assert!(output.stderr.is_empty(), "{}", String::from_utf8_lossy(&output.stderr));
}

#[test]
fn warnings_are_logged_on_request() {
    let dir = tempfile::tempdir().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_linfa-train"))
        .args(["--model", "xgboost", "--model-path", "model.bin"])
        .current_dir(dir.path())
        .env("RUST_LOG", "warn")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown model kind"));
}

#[test]
fn csv_mode_without_files_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = linfa_train(dir.path(), &["--mode", "csv", "--model-path", "model.bin"]);

    assert_eq!(output.status.code(), Some(1));
    let json = document(&output);
    assert_eq!(json["success"], false);
    assert_eq!(json["kind"], "input");
    assert!(json["error"].as_str().unwrap().contains("No CSV files"));
    assert!(!dir.path().join("model.bin").exists());
}

#[test]
fn missing_csv_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = linfa_train(
        dir.path(),
        &["--mode", "csv", "--files", "nope.csv", "--model-path", "model.bin"],
    );

    assert_eq!(output.status.code(), Some(1));
    let error = document(&output)["error"].as_str().unwrap().to_string();
    assert!(error.starts_with("CSV file not found"));
    assert!(error.contains("nope.csv"));
}

#[test]
fn csv_without_label_fails() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("data.csv"), "a,b\n1,2\n3,4\n").unwrap();
    let output = linfa_train(
        dir.path(),
        &["--mode", "csv", "--files", "data.csv", "--model-path", "model.bin"],
    );

    assert_eq!(output.status.code(), Some(1));
    let error = document(&output)["error"].as_str().unwrap().to_string();
    assert!(error.contains("'label'"));
}

#[test]
fn relative_csv_paths_resolve_against_working_directory() {
    let dir = tempfile::tempdir().unwrap();
    let mut content = String::from("x;label\n");
    for i in 0..20 {
        content.push_str(&format!("{};{}\n", i, if i < 10 { "low" } else { "high" }));
    }
    fs::write(dir.path().join("data.csv"), content).unwrap();

    let output = linfa_train(
        dir.path(),
        &[
            "--mode",
            "csv",
            "--files",
            "data.csv",
            "--delimiter",
            ";",
            "--model",
            "svm",
            "--model-path",
            "model.bin",
        ],
    );

    assert_eq!(output.status.code(), Some(0));
    let json = document(&output);
    assert_eq!(json["n_test"], 4);
    assert_eq!(json["feature_names"], serde_json::json!(["x"]));
    assert!(json["report"]["high"].is_object());
}

#[test]
fn invalid_arguments_become_failure_document() {
    let dir = tempfile::tempdir().unwrap();
    let output = linfa_train(dir.path(), &["--mode", "parquet"]);

    assert_eq!(output.status.code(), Some(1));
    let json = document(&output);
    assert_eq!(json["success"], false);
    assert_eq!(json["kind"], "input");
}

#[test]
fn help_is_printed() {
    let dir = tempfile::tempdir().unwrap();
    let output = linfa_train(dir.path(), &["--help"]);

    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("--model-path"));
}
