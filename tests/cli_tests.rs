//! End-to-end tests of the `siteledger` binary against a temporary data
//! directory.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const COMPANY: &str = "Acme Construções";

fn siteledger(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("siteledger").unwrap();
    cmd.env("SITELEDGER_DATA_DIR", dir.path())
        .env_remove("SITELEDGER_COMPANY")
        .env_remove("SITELEDGER_USER")
        .env_remove("SITELEDGER_PASSWORD")
        .env_remove("SITELEDGER_NEW_PASSWORD")
        .env_remove("SITELEDGER_LOG");
    cmd
}

fn run(dir: &TempDir, args: &[&str]) -> String {
    let output = siteledger(dir).args(["--company", COMPANY]).args(args).output().unwrap();
    assert!(
        output.status.success(),
        "{:?} failed:\n{}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).unwrap()
}

/// First `ent-` token printed by a command
fn entry_id(stdout: &str) -> String {
    stdout
        .split_whitespace()
        .find(|w| w.starts_with("ent-"))
        .unwrap()
        .to_string()
}

fn setup_project(dir: &TempDir) {
    siteledger(dir)
        .args(["tenant", "register", COMPANY])
        .assert()
        .success()
        .stdout(predicate::str::contains("acme-construções"));
    run(
        dir,
        &["project", "create", "Bridge", "--client", "State", "--budget", "10000", "--start", "2025-01-01"],
    );
}

#[test]
fn test_without_company_fails() {
    let dir = TempDir::new().unwrap();
    siteledger(&dir)
        .args(["project", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no company selected"));
}

#[test]
fn test_unregistered_company_fails() {
    let dir = TempDir::new().unwrap();
    siteledger(&dir)
        .args(["--company", "Nobody", "project", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_colliding_company_names_are_rejected() {
    let dir = TempDir::new().unwrap();
    siteledger(&dir)
        .args(["tenant", "register", "ACME  Ltd"])
        .assert()
        .success();
    siteledger(&dir)
        .args(["tenant", "register", "acme ltd "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already registered"));
}

#[test]
fn test_milestone_flow_and_forecast() {
    let dir = TempDir::new().unwrap();
    setup_project(&dir);

    run(&dir, &["rates", "set", "--tax", "6", "--commission", "15"]);
    run(
        &dir,
        &["cost", "add", "Bridge", "Cement", "1000", "--category", "material", "--date", "2025-02-01"],
    );
    let planned = run(
        &dir,
        &["income", "plan", "Bridge", "Nov measurement", "4000", "--date", "2025-11-30"],
    );
    let id = entry_id(&planned);

    let due = run(&dir, &["income", "due", "Bridge", "--as-of", "2025-12-01"]);
    assert!(due.contains("Nov measurement"));

    let confirmed = run(&dir, &["income", "confirm", &id, "--date", "2025-12-01"]);
    assert!(confirmed.contains("2025-12-01"));

    let json = run(&dir, &["summary", "--json"]);
    let summary: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(summary["total_realized_income"], 400_000);
    assert_eq!(summary["total_planned_income"], 0);
    assert_eq!(summary["total_cost"], 100_000);
    assert_eq!(summary["outstanding_receivable"], 600_000);
    assert_eq!(summary["projected_tax"], 36_000);
    assert_eq!(summary["projected_commission"], 84_600);
    assert_eq!(summary["forecast_profit"], 779_400);

    // confirming twice is refused: the entry is no longer planned
    siteledger(&dir)
        .args(["--company", COMPANY, "income", "confirm", &id])
        .assert()
        .failure();
}

#[test]
fn test_zero_budget_is_rejected() {
    let dir = TempDir::new().unwrap();
    siteledger(&dir).args(["tenant", "register", COMPANY]).assert().success();
    siteledger(&dir)
        .args(["--company", COMPANY, "project", "create", "Shed", "--client", "X", "--budget", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("greater than zero"));
}

#[test]
fn test_unknown_category_is_rejected() {
    let dir = TempDir::new().unwrap();
    setup_project(&dir);
    siteledger(&dir)
        .args(["--company", COMPANY, "cost", "add", "Bridge", "Fuel", "50", "--category", "snacks"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown cost category"));
}

#[test]
fn test_users_gate_the_ledger() {
    let dir = TempDir::new().unwrap();
    setup_project(&dir);

    siteledger(&dir)
        .args(["--company", COMPANY, "user", "add", "maria"])
        .env("SITELEDGER_NEW_PASSWORD", "s3cret")
        .assert()
        .success()
        .stdout(predicate::str::contains("maria (admin)"));

    siteledger(&dir)
        .args(["--company", COMPANY, "project", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("requires --user"));

    siteledger(&dir)
        .args(["--company", COMPANY, "--user", "maria", "project", "list"])
        .env("SITELEDGER_PASSWORD", "wrong")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid credentials"));

    siteledger(&dir)
        .args(["--company", COMPANY, "--user", "maria", "project", "list"])
        .env("SITELEDGER_PASSWORD", "s3cret")
        .assert()
        .success()
        .stdout(predicate::str::contains("Bridge"));
}

#[test]
fn test_export_import_between_companies() {
    let dir = TempDir::new().unwrap();
    setup_project(&dir);
    run(&dir, &["cost", "add", "Bridge", "Rebar", "250.75", "--category", "material"]);

    let export_path = dir.path().join("acme.json");
    let export_arg = export_path.to_str().unwrap();
    run(&dir, &["export", "--format", "json", "--output", export_arg]);

    siteledger(&dir).args(["tenant", "register", "Beta"]).assert().success();
    siteledger(&dir)
        .args(["--company", "Beta", "import", export_arg])
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 1 projects"));

    siteledger(&dir)
        .args(["--company", "Beta", "project", "show", "Bridge"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rebar"));

    // a second import must be forced
    siteledger(&dir)
        .args(["--company", "Beta", "import", export_arg])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
}

#[test]
fn test_csv_export_to_stdout() {
    let dir = TempDir::new().unwrap();
    setup_project(&dir);
    run(&dir, &["cost", "add", "Bridge", "Sand", "80", "--category", "material"]);

    let csv = run(&dir, &["export", "--format", "csv"]);
    assert!(csv.starts_with("project_id,project,collection"));
    assert!(csv.contains(",cost,"));
    assert!(csv.contains("80.00"));
}

#[test]
fn test_audit_log_records_changes() {
    let dir = TempDir::new().unwrap();
    setup_project(&dir);
    let added = run(&dir, &["cost", "add", "Bridge", "Sand", "80"]);
    run(&dir, &["cost", "remove", &entry_id(&added)]);

    let audit = run(&dir, &["audit"]);
    assert!(audit.contains("CREATE Project"));
    assert!(audit.contains("CREATE CostEntry"));
    assert!(audit.contains("DELETE CostEntry"));
}

#[test]
fn test_tenant_use_sets_default_company() {
    let dir = TempDir::new().unwrap();
    setup_project(&dir);
    siteledger(&dir).args(["tenant", "use", COMPANY]).assert().success();

    siteledger(&dir)
        .args(["project", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Bridge"));
}

#[cfg(unix)]
#[test]
fn test_receipt_scan_uses_extractor() {
    let dir = TempDir::new().unwrap();
    setup_project(&dir);

    let script = dir.path().join("extract.sh");
    std::fs::write(
        &script,
        "cat > /dev/null\nprintf '{\"description\":\"Sand\",\"amount\":\"45,50\",\"category\":\"Material\"}'\n",
    )
    .unwrap();
    let settings = serde_json::json!({
        "extractor_command": format!("sh {}", script.display()),
    });
    std::fs::write(dir.path().join("config.json"), settings.to_string()).unwrap();

    let receipt = dir.path().join("receipt.png");
    std::fs::write(&receipt, b"not really a png").unwrap();

    let output = run(&dir, &["cost", "scan", "Bridge", receipt.to_str().unwrap()]);
    assert!(output.contains("Sand"));
    assert!(output.contains("45.50"));
}
