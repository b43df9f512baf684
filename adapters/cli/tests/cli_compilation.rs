use std::process::Command;

#[test]
fn cli_compiles_without_warnings() {
    let status = Command::new(env!("CARGO"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args(["check", "--quiet", "--bin", "horde"])
        .status()
        .expect("failed to invoke cargo check for the horde CLI binary");

    assert!(status.success(), "cargo check --bin horde should succeed");
}

#[test]
fn bundled_manifest_runs_to_victory() {
    let workspace = concat!(env!("CARGO_MANIFEST_DIR"), "/../..");
    let output = Command::new(env!("CARGO"))
        .current_dir(workspace)
        .args([
            "run",
            "--quiet",
            "--bin",
            "horde",
            "--",
            "--manifest",
            "assets/waves.toml",
            "--kill-rate",
            "40",
            "--chaining",
            "automatic",
        ])
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to run the horde CLI binary");

    assert!(output.status.success(), "horde should exit cleanly");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"outcome\": \"Victory\""), "{stdout}");
}
