mod common;

use common::{HIGH_RISK_BODY, MockService, WALLET, make_temp_home, run, walletrisk_cmd, write_file};

#[test]
fn config_show_emits_effective_config() {
    let home = make_temp_home("config");
    write_file(
        home.join(".config/walletrisk/config.toml").as_path(),
        br#"
[ui]
max_table_rows = 3
"#,
    );

    let out = run(&home, &["config", "--show"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("max_table_rows = 3"), "stdout={stdout}");
    assert!(stdout.contains("timeout_secs = 30"), "stdout={stdout}");
    assert!(stdout.contains("config_path"), "stdout={stdout}");

    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn env_overrides_config_file() {
    let home = make_temp_home("config");
    write_file(
        home.join(".config/walletrisk/config.toml").as_path(),
        br#"
[service]
endpoint = "http://127.0.0.1:1/from-file"
timeout_secs = 5

[ui]
max_table_rows = 3
"#,
    );

    let out = walletrisk_cmd(&home)
        .env("WALLETRISK_SERVICE_ENDPOINT", "http://127.0.0.1:2/from-env")
        .env("WALLETRISK_UI_MAX_TABLE_ROWS", "7")
        .args(["--json", "config", "--show"])
        .output()
        .expect("run walletrisk");
    assert!(out.status.success());

    let v: serde_json::Value = serde_json::from_slice(&out.stdout).expect("parse json");
    assert_eq!(v["service"]["endpoint"], "http://127.0.0.1:2/from-env");
    assert_eq!(v["service"]["timeout_secs"], 5);
    assert_eq!(v["ui"]["max_table_rows"], 7);

    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn explicit_config_path_must_exist() {
    let home = make_temp_home("config");
    let missing = home.join("nope.toml");
    let out = run(
        &home,
        &["--config", missing.to_str().expect("utf8 path"), "config", "--show"],
    );
    assert_eq!(out.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("config file does not exist"), "{stderr}");

    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn invalid_env_value_exits_2() {
    let home = make_temp_home("config");
    let out = walletrisk_cmd(&home)
        .env("WALLETRISK_SERVICE_TIMEOUT_SECS", "soon")
        .args(["config", "--show"])
        .output()
        .expect("run walletrisk");
    assert_eq!(out.status.code(), Some(2));

    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn table_row_limit_applies_to_lookup() {
    let home = make_temp_home("config");
    let service = MockService::start(200, HIGH_RISK_BODY);
    write_file(
        home.join(".config/walletrisk/config.toml").as_path(),
        format!(
            "[service]\nendpoint = \"{}\"\n\n[ui]\nmax_table_rows = 2\n",
            service.url()
        )
        .as_bytes(),
    );

    let out = run(&home, &["lookup", WALLET]);
    assert!(
        out.status.success(),
        "stderr={}",
        String::from_utf8_lossy(&out.stderr)
    );
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(
        stdout.contains("Feature Summary (2 shown / 4 total):"),
        "stdout={stdout}"
    );
    assert!(stdout.contains("...(2 more)"), "stdout={stdout}");

    let _ = std::fs::remove_dir_all(&home);
}
