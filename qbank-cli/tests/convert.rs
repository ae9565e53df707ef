use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

const GIFT: &str = "$CATEGORY: $course$/top/Planets\n\n::Closest::Which planet is closest to the sun? {=Mercury ~Venus ~Mars}\n\n::Blue::Is the sky blue? {T}\n";

#[test]
fn convert_is_the_default_command() {
    let dir = tempdir().unwrap();
    let input_path = dir.path().join("planets.gift");
    fs::write(&input_path, GIFT).unwrap();

    let mut cmd = cargo_bin_cmd!("qbank");
    cmd.arg(input_path.as_os_str()).arg("--to").arg("aiken");

    cmd.assert().success().stdout(
        "Which planet is closest to the sun?\nA. Mercury\nB. Venus\nC. Mars\nANSWER: A\n\n",
    );
}

#[test]
fn skipped_questions_are_reported_on_stderr() {
    let dir = tempdir().unwrap();
    let input_path = dir.path().join("planets.gift");
    fs::write(&input_path, GIFT).unwrap();

    let mut cmd = cargo_bin_cmd!("qbank");
    cmd.env_remove("RUST_LOG")
        .arg("convert")
        .arg(input_path.as_os_str())
        .arg("--to")
        .arg("aiken");

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("skipped"));
}

#[test]
fn convert_writes_output_file() {
    let dir = tempdir().unwrap();
    let input_path = dir.path().join("planets.gift");
    let output_path = dir.path().join("planets.json");
    fs::write(&input_path, GIFT).unwrap();

    let mut cmd = cargo_bin_cmd!("qbank");
    cmd.arg("convert")
        .arg(input_path.as_os_str())
        .arg("--to")
        .arg("json")
        .arg("-o")
        .arg(output_path.as_os_str());
    cmd.assert().success().stdout("");

    let json = fs::read_to_string(&output_path).unwrap();
    assert!(json.contains("\"Closest\""));

    // and back again
    let mut cmd = cargo_bin_cmd!("qbank");
    cmd.arg(output_path.as_os_str()).arg("--to").arg("gift");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("$CATEGORY: $course$/top/Planets"))
        .stdout(predicate::str::contains("::Blue::Is the sky blue? {TRUE}"));
}

#[test]
fn extra_params_reach_the_serializer() {
    let dir = tempdir().unwrap();
    let input_path = dir.path().join("planets.gift");
    fs::write(&input_path, GIFT).unwrap();

    let mut cmd = cargo_bin_cmd!("qbank");
    cmd.arg(input_path.as_os_str())
        .arg("--to")
        .arg("json")
        .arg("--extra-pretty")
        .arg("false");
    let output = cmd.assert().success().get_output().stdout.clone();
    assert_eq!(String::from_utf8(output).unwrap().lines().count(), 1);

    let mut cmd = cargo_bin_cmd!("qbank");
    cmd.arg(input_path.as_os_str())
        .arg("--to")
        .arg("json")
        .arg("--extra-colour");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("colour"));
}

#[test]
fn unknown_extension_needs_from() {
    let dir = tempdir().unwrap();
    let input_path = dir.path().join("planets.txt");
    fs::write(&input_path, GIFT).unwrap();

    let mut cmd = cargo_bin_cmd!("qbank");
    cmd.arg(input_path.as_os_str()).arg("--to").arg("aiken");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("--from"));

    let mut cmd = cargo_bin_cmd!("qbank");
    cmd.arg(input_path.as_os_str())
        .arg("--from")
        .arg("gift")
        .arg("--to")
        .arg("aiken");
    cmd.assert().success();
}

#[test]
fn parse_errors_fail() {
    let dir = tempdir().unwrap();
    let input_path = dir.path().join("broken.aiken");
    fs::write(&input_path, "Stem\nA. only option\n").unwrap();

    let mut cmd = cargo_bin_cmd!("qbank");
    cmd.arg(input_path.as_os_str()).arg("--to").arg("json");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Parse error"));
}
