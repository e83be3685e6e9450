// End-to-end tests for the `rowlink` binary.
// Run with: cargo test -p rowlink-cli --test cli_tests

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const PEOPLE: &str = "\
Name,Email,Phone
Ann,ann@x.com,(555) 000-1111
Bo,ANN@X.COM,
Cy,cy@x.com,555.000.1111
Di,,
";

fn rowlink() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_rowlink"));
    cmd.env_remove("RUST_LOG");
    cmd
}

fn write_input(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn read_rows(path: &Path) -> Vec<Vec<String>> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .unwrap()
        .records()
        .map(|r| r.unwrap().iter().map(String::from).collect())
        .collect()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

#[test]
fn group_by_email_writes_default_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "people.csv", PEOPLE);

    let out = rowlink()
        .args(["group", input.to_str().unwrap(), "--match-as", "email", "--field", "Email"])
        .args(["--sequential-ids"])
        .output()
        .unwrap();
    assert!(out.status.success(), "{}", stderr(&out));
    assert!(stderr(&out).contains("grouped 4 row(s) into 3 group(s)"));

    let rows = read_rows(&dir.path().join("people.csv.grouped"));
    assert_eq!(rows[0], ["UUID", "Name", "Email", "Phone"]);
    assert_eq!(rows[1], ["g000001", "Ann", "ann@x.com", "(555) 000-1111"]);
    assert_eq!(rows[2][0], "g000001");
    assert_eq!(rows[3][0], "g000002");
    assert_eq!(rows[4], ["g000003", "Di", "", ""]);
}

#[test]
fn group_email_or_phone_links_across_fields() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "people.csv", PEOPLE);
    let output = dir.path().join("out.csv");

    let out = rowlink()
        .arg("group")
        .arg(&input)
        .args(["-m", "email_or_phone", "-f", "Email=email", "-f", "Phone=phone"])
        .arg("-o")
        .arg(&output)
        .output()
        .unwrap();
    assert!(out.status.success(), "{}", stderr(&out));

    let rows = read_rows(&output);
    let ids: Vec<&str> = rows[1..].iter().map(|r| r[0].as_str()).collect();
    assert_eq!(ids[0], ids[1]);
    assert_eq!(ids[0], ids[2]);
    assert_ne!(ids[0], ids[3]);
    assert_eq!(ids[0].len(), 32);
}

#[test]
fn group_with_config_file_and_json_summary() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "people.csv", PEOPLE);
    let config = write_input(
        dir.path(),
        "grouping.toml",
        "match_as = \"phone\"\nfields = [\"phone\"]\noutput_suffix = \"linked\"\n",
    );

    let out = rowlink()
        .arg("group")
        .arg(&input)
        .arg("--config")
        .arg(&config)
        .args(["--json", "--quiet"])
        .output()
        .unwrap();
    assert!(out.status.success(), "{}", stderr(&out));
    assert!(dir.path().join("people.csv.linked").exists());

    let summary: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(summary["rows_processed"], 4);
    assert_eq!(summary["groups_created"], 3);
    assert_eq!(summary["keys_stored"], 1);
    assert_eq!(summary["conflicts"], 0);
}

#[test]
fn group_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "people.csv", PEOPLE);

    let out = rowlink()
        .arg("group")
        .arg(&input)
        .args(["-m", "email", "-f", "email", "-o", "-", "-q", "--sequential-ids"])
        .output()
        .unwrap();
    assert!(out.status.success(), "{}", stderr(&out));
    assert!(stderr(&out).is_empty());
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout.starts_with("UUID,Name,Email,Phone\ng000001,Ann,"));
}

#[test]
fn unknown_matcher_type_exits_3_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "people.csv", PEOPLE);

    let out = rowlink()
        .arg("group")
        .arg(&input)
        .args(["--match-as", "carrier_pigeon", "--field", "Email"])
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(3));
    assert!(stderr(&out).contains("carrier_pigeon"));
    assert!(!dir.path().join("people.csv.grouped").exists());
}

#[test]
fn ragged_input_exits_4() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "bad.csv", "email,name\na@x.com,Ann\nb@x.com\n");

    let out = rowlink()
        .arg("group")
        .arg(&input)
        .args(["-m", "email", "-f", "email"])
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(4));
    assert!(stderr(&out).contains("malformed record at line 3"));
}

#[test]
fn missing_input_exits_5() {
    let dir = tempfile::tempdir().unwrap();
    let out = rowlink()
        .arg("group")
        .arg(dir.path().join("nope.csv"))
        .args(["-m", "email", "-f", "email"])
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(5));
}

#[test]
fn matcher_is_required() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "people.csv", PEOPLE);
    let out = rowlink().arg("group").arg(&input).output().unwrap();
    assert_eq!(out.status.code(), Some(2));
    assert!(stderr(&out).contains("--config or --match-as"));
}

#[test]
fn json_to_stdout_is_a_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "people.csv", PEOPLE);
    let out = rowlink()
        .arg("group")
        .arg(&input)
        .args(["-m", "email", "-f", "email", "-o", "-", "--json"])
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn validate_reports_fields() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_input(
        dir.path(),
        "grouping.toml",
        "match_as = \"email_or_phone\"\n[fields]\nEmail = \"email\"\nPhone = \"phone\"\n",
    );
    let out = rowlink().arg("validate").arg(&config).output().unwrap();
    assert!(out.status.success(), "{}", stderr(&out));
    assert!(stderr(&out).contains("valid: match_as email_or_phone on 2 field(s): email=email, phone=phone"));
}

#[test]
fn validate_rejects_bad_sub_type() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_input(
        dir.path(),
        "grouping.toml",
        "match_as = \"email_or_phone\"\n[fields]\nEmail = \"pager\"\n",
    );
    let out = rowlink().arg("validate").arg(&config).output().unwrap();
    assert_eq!(out.status.code(), Some(3));
    assert!(stderr(&out).contains("pager"));
}

#[test]
fn version_prints_package_version() {
    let out = rowlink().arg("--version").output().unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert_eq!(stdout.trim(), format!("rowlink {}", env!("CARGO_PKG_VERSION")));
}
