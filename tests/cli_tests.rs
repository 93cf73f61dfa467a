use regex::Regex;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

struct TestContext {
    _dir: TempDir,
    trace_path: PathBuf,
    config_path: PathBuf,
}

impl TestContext {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let trace_path = dir.path().join("hello.csv");
        let config_path = dir.path().join("config.json");

        // h -> e -> l (loop) -> o on the bundled 100-unit QWERTY
        let mut trace = File::create(&trace_path).unwrap();
        writeln!(trace, "x,y,t").unwrap();
        for (x, y) in [
            (600.0, 150.0),
            (425.0, 100.0),
            (250.0, 50.0),
            (575.0, 100.0),
            (900.0, 150.0),
            (925.0, 175.0),
            (925.0, 125.0),
            (875.0, 125.0),
            (875.0, 175.0),
            (850.0, 50.0),
        ] {
            writeln!(trace, "{},{},0", x, y).unwrap();
        }

        let mut config = File::create(&config_path).unwrap();
        writeln!(config, r#"{{ "sampling_points": 120, "parallel_scoring": false }}"#).unwrap();

        Self {
            _dir: dir,
            trace_path,
            config_path,
        }
    }
}

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_glideforge"))
        .args(args)
        .output()
        .expect("Failed to execute binary")
}

#[test]
fn test_cli_suggest_ranks_traced_word() {
    let ctx = TestContext::new();
    let output = run(&["suggest", "--trace", ctx.trace_path.to_str().unwrap(), "-n", "3"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    let first_row = Regex::new(r"\|\s*1\s*\|\s*(\S+)\s*\|").unwrap();
    let caps = first_row.captures(&stdout).expect("no ranked rows in output");
    assert!(caps[1].contains("hello"), "first row: {}", &caps[0]);
}

#[test]
fn test_cli_config_file_and_overrides() {
    let ctx = TestContext::new();
    let output = run(&[
        "suggest",
        "--config",
        ctx.config_path.to_str().unwrap(),
        "--shape-std",
        "30",
        "--debug",
        "--trace",
        ctx.trace_path.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(String::from_utf8_lossy(&output.stdout).contains("hello"));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Loading config"));
}

#[test]
fn test_cli_simulate_reports_accuracy() {
    let output = run(&["simulate", "--limit", "10", "--seed", "7", "--jitter", "5"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    let summary = Regex::new(r"Top-1: (\d+)/(\d+) \((\d+\.\d)%\)").unwrap();
    let caps = summary.captures(&stdout).expect("missing accuracy summary");
    let total: usize = caps[2].parse().unwrap();
    let hits: usize = caps[1].parse().unwrap();
    assert_eq!(total, 10);
    assert!(hits <= total);

    let topk = Regex::new(r"Top-5: (\d+)/").unwrap();
    let ranked: usize = topk.captures(&stdout).expect("missing top-k summary")[1]
        .parse()
        .unwrap();
    let via = Regex::new(r"Matched via plain: (\d+), looped: (\d+)").unwrap();
    let caps = via.captures(&stdout).expect("missing variant breakdown");
    let plain: usize = caps[1].parse().unwrap();
    let looped: usize = caps[2].parse().unwrap();
    assert_eq!(plain + looped, ranked);
}

#[test]
fn test_cli_missing_layout_fails() {
    let ctx = TestContext::new();
    let output = run(&[
        "suggest",
        "--layout",
        "does/not/exist.json",
        "--trace",
        ctx.trace_path.to_str().unwrap(),
    ]);
    assert!(!output.status.success());
}
