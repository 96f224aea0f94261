//! Driver tests over temporary scenario trees

use raa_cli::commands::{self, BecomeMethod};
use raa_cli::{run_with_args, Settings};
use raa_test_utils::{assert_single_tag, flags, Fixture};
use std::ffi::OsString;

const SITE: &str = "\
- hosts: all
  become: true
  tasks:
    - name: install
      apt:
        name: nginx
";

const BASE_POLICY: &str = r#"{"version": "3.0.0", "roles": [{"name": "rar_ansible"}]}"#;

const SCENARIO_POLICY: &str = r#"{
    "roles": [{"name": "web", "purpose": "web", "tasks": [{"name": "install", "purpose": "install"}]}]
}"#;

const GENERATED_POLICY: &str = r#"{
    "roles": [{"name": "r_1", "purpose": "web", "tasks": [{"name": "t_1", "purpose": "install"}]}]
}"#;

fn scenario_settings(fixture: &Fixture, program: &str) -> Settings {
    Settings {
        scenario_dir: fixture.path("scenario"),
        build_dir: fixture.path("build"),
        ansible_playbook: program.to_string(),
        ..Settings::default()
    }
}

fn write_policies(fixture: &Fixture, dir: &str) {
    fixture.write(&format!("{dir}/templates/sr_rootasrole.json"), BASE_POLICY);
    fixture.write(&format!("{dir}/templates/sr_scenario.json"), SCENARIO_POLICY);
    fixture.write(&format!("{dir}/templates/result.json"), GENERATED_POLICY);
}

#[tokio::test]
async fn inject_command_tags_tree() {
    let fixture = Fixture::new();
    fixture.write("site.yml", SITE);

    run_with_args(["raa", "inject", fixture.root().to_str().unwrap()])
        .await
        .unwrap();

    let doc = fixture.load("site.yml");
    assert_single_tag(flags(&doc[0]["tasks"][0]), "site.yml");
}

#[tokio::test]
async fn inject_command_reports_missing_root() {
    let fixture = Fixture::new();
    let missing = fixture.path("nowhere");

    assert!(run_with_args(["raa", "inject", missing.to_str().unwrap()])
        .await
        .is_err());
}

#[tokio::test]
async fn merge_policy_command_with_explicit_paths() {
    let fixture = Fixture::new();
    write_policies(&fixture, "policies");
    let templates = fixture.path("policies/templates");
    let output = fixture.path("merged.json");

    let args: Vec<OsString> = vec![
        "raa".into(),
        "--json".into(),
        "merge-policy".into(),
        "--base".into(),
        templates.join("sr_rootasrole.json").into_os_string(),
        "--scenario".into(),
        templates.join("sr_scenario.json").into_os_string(),
        "--generated".into(),
        templates.join("result.json").into_os_string(),
        "--output".into(),
        output.clone().into_os_string(),
    ];
    run_with_args(args).await.unwrap();

    let merged: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(output).unwrap()).unwrap();
    assert_eq!(merged["roles"][1]["name"], "r_1");
    assert_eq!(merged["roles"][1]["tasks"][0]["name"], "t_1");
}

#[cfg(unix)]
#[tokio::test]
async fn discover_tags_build_copy_only() {
    let fixture = Fixture::new();
    fixture.write("scenario/playbooks/main.yml", SITE);
    let settings = scenario_settings(&fixture, "true");

    let report = commands::discover(&settings).await.unwrap();

    assert_eq!(report.tagged, 1);
    let built = fixture.load("build/playbooks/main.yml");
    assert_single_tag(flags(&built[0]["tasks"][0]), "playbooks/main.yml");
    assert_eq!(fixture.read("scenario/playbooks/main.yml"), SITE);
}

#[cfg(unix)]
#[tokio::test]
async fn discover_fails_with_failing_playbook() {
    let fixture = Fixture::new();
    fixture.write("scenario/playbooks/main.yml", SITE);

    assert!(commands::discover(&scenario_settings(&fixture, "false"))
        .await
        .is_err());
}

#[cfg(unix)]
#[tokio::test]
async fn enforce_writes_merged_policy() {
    let fixture = Fixture::new();
    write_policies(&fixture, "build");
    let settings = scenario_settings(&fixture, "true");

    let summary = commands::enforce(&settings).await.unwrap();

    assert_eq!(summary.roles_appended, 1);
    assert!(fixture
        .path("build/templates/result_sr_rootasrole.json")
        .is_file());
}

#[tokio::test]
async fn enforce_without_generated_policy_fails() {
    let fixture = Fixture::new();
    fixture.write("build/templates/sr_rootasrole.json", BASE_POLICY);
    fixture.write("build/templates/sr_scenario.json", SCENARIO_POLICY);

    let err = commands::enforce(&scenario_settings(&fixture, "true"))
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("merging policies"));
}

#[test]
fn wrap_uses_the_injected_tag() {
    let fixture = Fixture::new();
    fixture.write("site.yml", SITE);
    commands::inject(fixture.root()).unwrap();
    let doc = fixture.load("site.yml");
    let tag = flags(&doc[0]["tasks"][0]).unwrap().to_string();

    let line =
        commands::wrap(&fixture.path("site.yml"), "install", BecomeMethod::Dosr, "id").unwrap();

    assert_eq!(line, format!(" dosr {tag} id "));
}

#[test]
fn wrap_for_gensr_carries_task_name() {
    let fixture = Fixture::new();
    fixture.write("site.yml", SITE);
    commands::inject(fixture.root()).unwrap();

    let line =
        commands::wrap(&fixture.path("site.yml"), "install", BecomeMethod::Gensr, "id").unwrap();

    assert!(line.contains("gensr generate -r site.yml -t "), "{line}");
    assert!(line.ends_with("-p \"install\" -c \"/tmp/capable_output.json\" -- id"), "{line}");
}

#[test]
fn wrap_requires_a_tagged_task() {
    let fixture = Fixture::new();
    fixture.write("site.yml", SITE);

    let err =
        commands::wrap(&fixture.path("site.yml"), "install", BecomeMethod::Sr, "id").unwrap_err();

    assert!(err.to_string().contains("no task named \"install\""), "{err}");
}

#[tokio::test]
async fn wrap_command_parses_method() {
    let fixture = Fixture::new();
    fixture.write("site.yml", SITE);
    commands::inject(fixture.root()).unwrap();
    let document = fixture.path("site.yml");

    run_with_args([
        "raa",
        "wrap",
        "--document",
        document.to_str().unwrap(),
        "--task",
        "install",
        "--method",
        "sr",
        "/bin/sh -c 'id'",
    ])
    .await
    .unwrap();
}
