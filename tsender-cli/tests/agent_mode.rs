use std::io::Write;
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::NamedTempFile;

const TSENDER: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";
const TOKEN: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
const ALICE: &str = "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359";
const BOB: &str = "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB";

fn tsender() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("tsender"))
}

fn run_total(amounts: &str, extra: &[&str]) -> Output {
    let mut cmd = tsender();
    cmd.arg("total")
        .arg("--amounts")
        .arg(amounts)
        .arg("--output")
        .arg("json")
        .args(extra);
    cmd.output().expect("failed to run tsender")
}

fn run_plan(recipients: &str, amounts: &str, extra: &[&str]) -> Output {
    let mut cmd = tsender();
    cmd.arg("plan")
        .arg("--token")
        .arg(TOKEN)
        .arg("--recipients")
        .arg(recipients)
        .arg("--amounts")
        .arg(amounts)
        .arg("--tsender")
        .arg(TSENDER)
        .arg("--output")
        .arg("json")
        .args(extra);
    cmd.output().expect("failed to run tsender")
}

fn parse_stdout(output: &Output) -> Value {
    let stdout = String::from_utf8(output.stdout.clone()).expect("stdout should be UTF-8");
    serde_json::from_str(stdout.trim()).expect("stdout should contain JSON")
}

fn parse_agent_error(output: &Output) -> Value {
    let stderr = String::from_utf8(output.stderr.clone()).expect("stderr should be UTF-8");
    serde_json::from_str(stderr.trim()).expect("stderr should contain JSON error payload")
}

#[test]
fn total_reports_sum_and_renderings() {
    let output = run_total("1000000000000000000,,\n2000000000000000000,", &[]);
    assert!(output.status.success());

    let payload = parse_stdout(&output);
    assert_eq!(payload["total"], 3e18);
    assert_eq!(payload["wei"], "3000000000000000000");
    assert_eq!(payload["tokens"], "3.000000");
    assert_eq!(payload["count"], 2);
}

#[test]
fn total_of_malformed_list_is_zero() {
    let output = run_total("1, abc, 3", &[]);
    assert!(output.status.success());

    let payload = parse_stdout(&output);
    assert_eq!(payload["total"], 0.0);
    assert_eq!(payload["tokens"], "0");
}

#[test]
fn strict_total_names_the_bad_entry() {
    let output = run_total("1, 2.5.5, 3", &["--strict"]);
    assert_eq!(output.status.code(), Some(1));

    let payload = parse_agent_error(&output);
    assert_eq!(payload["error"], "validation_failed");
    let details = payload["details"]
        .as_array()
        .expect("details should be an array");
    assert_eq!(details.len(), 1);
    assert_eq!(details[0]["entry"], 2);
    assert!(details[0]["message"]
        .as_str()
        .map(|m| m.contains("decimal point"))
        .unwrap_or(false));
}

#[test]
fn total_reads_amounts_file() {
    let mut file = NamedTempFile::new().expect("failed to create temp file");
    writeln!(file, "1.5\n2.5\n\n3").expect("failed to write amounts");
    file.flush().expect("failed to flush amounts");

    let output = tsender()
        .arg("total")
        .arg("--amounts-file")
        .arg(file.path())
        .arg("--output")
        .arg("json")
        .output()
        .expect("failed to run tsender");
    assert!(output.status.success());
    assert_eq!(parse_stdout(&output)["total"], 7.0);
}

#[test]
fn plan_requires_force_in_agent_mode() {
    let mut cmd = tsender();
    cmd.args(["plan", "--token", TOKEN, "--recipients", ALICE, "--amounts", "1"])
        .args(["--tsender", TSENDER, "--output", "json"]);
    let output = cmd.output().expect("failed to run tsender");
    assert_eq!(output.status.code(), Some(2));
    assert_eq!(parse_agent_error(&output)["error"], "confirmation_required");
}

#[test]
fn plan_includes_approval_when_allowance_is_short() {
    let output = run_plan(
        &format!("{ALICE}\n{BOB}"),
        "100\n200",
        &["--force", "--allowance", "250"],
    );
    assert!(output.status.success());

    let plan = parse_stdout(&output);
    assert_eq!(plan["chain_id"], 31337);
    assert_eq!(plan["approval_required"], true);
    assert_eq!(plan["recipient_count"], 2);

    let steps = plan["steps"].as_array().expect("steps should be an array");
    assert_eq!(steps.len(), 2);
    assert_eq!(steps[0]["kind"], "approve");
    assert_eq!(steps[0]["amount"], "300");
    assert_eq!(steps[0]["spender"], TSENDER);
    assert_eq!(steps[1]["kind"], "airdrop");
    assert_eq!(steps[1]["recipients"][1], BOB);
    assert_eq!(steps[1]["amounts"][1], "200");
    assert_eq!(steps[1]["total"], "300");
}

#[test]
fn plan_skips_approval_when_allowance_covers_total() {
    let output = run_plan(ALICE, "100", &["--force", "--allowance", "100"]);
    assert!(output.status.success());

    let plan = parse_stdout(&output);
    assert_eq!(plan["approval_required"], false);
    assert_eq!(plan["steps"].as_array().map(Vec::len), Some(1));
}

#[test]
fn plan_rejects_bad_entries_with_details() {
    let output = run_plan(&format!("{ALICE}, 0x12314"), "1, -2", &["--force"]);
    assert_eq!(output.status.code(), Some(1));

    let payload = parse_agent_error(&output);
    assert_eq!(payload["error"], "validation_failed");
    let details = payload["details"]
        .as_array()
        .expect("details should be an array");

    assert!(details.iter().any(|issue| {
        issue["field"] == "recipients"
            && issue["entry"] == 2
            && issue["message"]
                .as_str()
                .map(|m| m.contains("40 hex characters"))
                .unwrap_or(false)
    }));
    assert!(details.iter().any(|issue| {
        issue["field"] == "amounts"
            && issue["message"]
                .as_str()
                .map(|m| m.contains("negative"))
                .unwrap_or(false)
    }));
}

#[test]
fn plan_uses_registry_file_for_chain() {
    let mut registry = NamedTempFile::new().expect("failed to create temp registry");
    write!(registry, r#"{{"324": {{"tsender": "{BOB}"}}}}"#).expect("failed to write registry");
    registry.flush().expect("failed to flush registry");

    let output = tsender()
        .args(["plan", "--chain-id", "324", "--token", TOKEN, "--recipients", ALICE])
        .args(["--amounts", "5", "--force", "--output", "json"])
        .arg("--registry")
        .arg(registry.path())
        .output()
        .expect("failed to run tsender");
    assert!(output.status.success());

    let plan = parse_stdout(&output);
    assert_eq!(plan["chain"], "zksync");
    assert_eq!(plan["steps"][1]["tsender"], BOB);
}

#[test]
fn plan_for_unconfigured_chain_is_rejected() {
    let mut registry = NamedTempFile::new().expect("failed to create temp registry");
    write!(registry, r#"{{"1": {{"tsender": "{BOB}"}}}}"#).expect("failed to write registry");
    registry.flush().expect("failed to flush registry");

    let output = tsender()
        .args(["plan", "--chain-id", "31337", "--token", TOKEN, "--recipients", ALICE])
        .args(["--amounts", "5", "--force", "--output", "json"])
        .arg("--registry")
        .arg(registry.path())
        .output()
        .expect("failed to run tsender");
    assert_eq!(output.status.code(), Some(1));

    let payload = parse_agent_error(&output);
    assert!(payload["details"][0]["message"]
        .as_str()
        .map(|m| m.contains("chain id 31337"))
        .unwrap_or(false));
}
