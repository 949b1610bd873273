use std::fs;
use std::path::PathBuf;
use std::process::Command;

fn aegean_maps_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("demos")
        .join("aegean")
        .join("maps")
        .join("random")
}

#[test]
fn run_aegean_demo_exports_map_data() {
    let bin = env!("CARGO_BIN_EXE_mg-cli");
    let export_out = std::env::temp_dir().join(format!(
        "mg-cli-smoke-{}.json",
        std::process::id()
    ));

    let output = Command::new(bin)
        .arg("run")
        .arg("aegean_sea.rhai")
        .arg("--cwd")
        .arg(aegean_maps_dir())
        .arg("--export-out")
        .arg(&export_out)
        .arg("--quiet-export")
        .output()
        .expect("cli should execute");

    let stdout = String::from_utf8_lossy(&output.stdout);
    if !output.status.success() {
        panic!(
            "aegean demo failed\nstdout:\n{}\nstderr:\n{}",
            stdout,
            String::from_utf8_lossy(&output.stderr)
        );
    }
    assert!(stdout.contains("RESULT:OK"), "stdout missing RESULT:OK");
    assert!(stdout.contains("EXPORTS:1"), "stdout missing export count");
    assert!(stdout.contains("PROGRESS:100"), "stdout missing progress");

    let written = fs::read_to_string(&export_out).expect("export file should exist");
    let exports: serde_json::Value = serde_json::from_str(&written).expect("export json");
    let map = &exports[0];
    assert_eq!(map["name"], "Unnamed map");
    assert_eq!(map["rmgen"], 1.0);
    assert_eq!(map["tiles"], 128.0);
    assert_eq!(map["forests"], 35.0);
    assert_eq!(map["spearmanFood"], 50.0);
    assert_eq!(map["spearmanCiv"], "athen");
    assert_eq!(map["players"].as_array().map(Vec::len), Some(8));
    assert_eq!(map["players"][7]["civ"], "spart");
    assert_eq!(map["players"][7]["angle"], 315.0);
    assert_eq!(
        map["biomes"],
        serde_json::json!([
            "../../simulation/data/biomes/generic/temperate.json",
            "../../simulation/data/biomes/mediterranean.json"
        ])
    );
}

#[test]
fn run_reports_inheritance_loop_as_script_error() {
    let bin = env!("CARGO_BIN_EXE_mg-cli");
    let output = Command::new(bin)
        .arg("run")
        .arg("inheritance_loop.rhai")
        .arg("--cwd")
        .arg(aegean_maps_dir())
        .output()
        .expect("cli should execute");

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("RESULT:ERROR"));
    assert!(stdout.contains("ERROR_CODE:SCRIPT_ERROR"));
    assert!(stdout.contains("Probable infinite inheritance loop"));
}

#[test]
fn run_reports_missing_script_as_library_not_found() {
    let bin = env!("CARGO_BIN_EXE_mg-cli");
    let output = Command::new(bin)
        .arg("run")
        .arg("no_such_map.rhai")
        .arg("--cwd")
        .arg(aegean_maps_dir())
        .output()
        .expect("cli should execute");

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ERROR_CODE:LIBRARY_NOT_FOUND"));
    assert!(stdout.contains("ERROR_MSG_JSON:\"Library no_such_map.rhai not found.\""));
}
