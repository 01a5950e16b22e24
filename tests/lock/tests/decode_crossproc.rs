//! Cross-process determinism: the `decode_fixture` binary prints identical
//! reports regardless of cwd, locale and unrelated environment variables.

use std::path::Path;
use std::process::Command;

fn workspace_root() -> String {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("tests/ exists")
        .parent()
        .expect("workspace root exists")
        .to_string_lossy()
        .to_string()
}

/// `cargo test` puts test binaries in `target/<profile>/deps/`; the
/// `decode_fixture` binary lives one level up.
fn binary_path() -> String {
    let mut path = std::env::current_exe()
        .expect("can resolve test binary path")
        .parent()
        .expect("binary dir exists")
        .parent()
        .expect("deps parent exists")
        .to_path_buf();
    path.push("decode_fixture");
    path.to_string_lossy().to_string()
}

/// Run the binary with the given cwd and environment overrides.
/// Returns stdout as a string.
fn run_variant(work_dir: &str, env_overrides: &[(&str, &str)]) -> String {
    let bin = binary_path();
    let mut command = Command::new(&bin);
    command
        .current_dir(work_dir)
        .env_remove("LC_ALL")
        .env_remove("LC_COLLATE")
        .env_remove("LANG")
        .env_remove("LANGUAGE")
        .env_remove("NETWORK")
        .env_remove("RUST_LOG");
    for &(key, val) in env_overrides {
        command.env(key, val);
    }

    let output = command.output().unwrap_or_else(|e| {
        panic!("failed to spawn {bin} (work_dir={work_dir}, overrides={env_overrides:?}): {e}")
    });
    assert!(
        output.status.success(),
        "decode_fixture exited with {}: stderr={}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("stdout is valid UTF-8")
}

// ---------------------------------------------------------------------------
// ACCEPTANCE: DECODE-DETERMINISM-CROSSPROC
// ---------------------------------------------------------------------------

#[test]
fn crossproc_determinism_env_variants() {
    let root = workspace_root();
    let baseline = run_variant(&root, &[]);

    assert!(baseline.contains("registration_v2="));
    assert!(baseline.contains("\"input_digest\":\"sha256:"));
    assert!(baseline.ends_with("fixture_count=4\n"));

    let scratch = tempfile::tempdir().expect("create scratch dir");
    let alt_cwd = scratch.path().to_string_lossy().to_string();
    assert_eq!(
        baseline,
        run_variant(&alt_cwd, &[]),
        "output differs when cwd changes from {root} to {alt_cwd}"
    );
    assert_eq!(
        baseline,
        run_variant(&root, &[("LC_ALL", "C"), ("LANG", "C")]),
        "output differs when LC_ALL=C LANG=C"
    );
    assert_eq!(
        baseline,
        run_variant(
            &root,
            &[
                ("NETWORK", "0"),
                ("RUST_LOG", "trace"),
                ("TZ", "America/New_York"),
                ("HOME", "/nonexistent"),
            ],
        ),
        "output differs with unrelated env vars (NETWORK, RUST_LOG, TZ, HOME)"
    );
}

#[test]
fn fixture_reports_have_expected_shape() {
    let output = run_variant(&workspace_root(), &[]);
    let reports: Vec<(&str, serde_json::Value)> = output
        .lines()
        .filter(|line| !line.starts_with("fixture_count="))
        .map(|line| {
            let (name, json) = line.split_once('=').expect("name=json line");
            (name, serde_json::from_str(json).expect("report is JSON"))
        })
        .collect();
    assert_eq!(reports.len(), 4);

    let (_, registration) = &reports[0];
    assert_eq!(registration["tx_type"], "cip36");
    assert_eq!(registration["metadata_label"], 61284);
    assert_eq!(registration["nonce"], 42);

    let (_, document) = &reports[1];
    assert_eq!(document["payload"][1]["title"], "Open tooling");
    assert_eq!(document["payload"][1]["budget"], 25_000);

    let (_, onion) = &reports[2];
    assert_eq!(onion["payload"]["1"], "core");

    let (_, undecodable) = &reports[3];
    assert!(undecodable["payload_error"]
        .as_str()
        .unwrap()
        .starts_with("Failed to decode: "));
}
