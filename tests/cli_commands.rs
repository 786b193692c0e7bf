//! End-to-end runs of the generate, learn and evaluate commands

use std::path::Path;

use clap::Parser;
use mountain_rescue::cli::commands::{
    evaluate::{self, EvaluateArgs},
    generate::{self, GenerateArgs},
    learn::{self, LearnArgs},
};
use tempfile::tempdir;

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

fn read_json(path: &Path) -> serde_json::Value {
    let contents = std::fs::read_to_string(path).unwrap();
    serde_json::from_str(&contents).unwrap()
}

fn generate_dataset(dir: &Path, size: usize) -> (std::path::PathBuf, usize) {
    let dataset = dir.join("mdp.csv");
    let stranded_file = dir.join("stranded.json");
    let size_arg = size.to_string();

    let args = GenerateArgs::parse_from([
        "rescue-generate",
        &size_arg,
        "--output",
        path_str(&dataset),
        "--seed",
        "7",
        "--stranded-out",
        path_str(&stranded_file),
    ]);
    generate::execute(args).expect("generate should succeed");

    let stranded = read_json(&stranded_file)["stranded"].as_u64().unwrap() as usize;
    (dataset, stranded)
}

#[test]
fn generate_writes_dataset_terrain_and_stranded_files() {
    let tmp = tempdir().unwrap();
    let dataset = tmp.path().join("mdp.csv");
    let terrain = tmp.path().join("terrain.csv");
    let stranded = tmp.path().join("stranded.json");

    let args = GenerateArgs::parse_from([
        "rescue-generate",
        "5",
        "-o",
        path_str(&dataset),
        "--seed",
        "3",
        "--terrain-out",
        path_str(&terrain),
        "--stranded-out",
        path_str(&stranded),
        "--show-terrain",
    ]);
    generate::execute(args).unwrap();

    let rows = std::fs::read_to_string(&dataset).unwrap();
    assert!(rows.starts_with("s,a,r,sp,d\n"));
    assert_eq!(rows.lines().count(), 1 + 4 * 25 - 4 * 5);

    let cells = std::fs::read_to_string(&terrain).unwrap();
    assert!(cells.starts_with("row,column,height,density\n"));
    assert_eq!(cells.lines().count(), 1 + 25);

    let location = read_json(&stranded);
    assert_eq!(location["size"], 5);
    assert_eq!(location["seed"], 3);
    let id = location["stranded"].as_u64().unwrap();
    assert!((1..=25).contains(&id));
}

#[test]
fn generate_rejects_zero_size() {
    let tmp = tempdir().unwrap();
    let args = GenerateArgs::parse_from([
        "rescue-generate",
        "0",
        "-o",
        path_str(&tmp.path().join("mdp.csv")),
    ]);
    assert!(generate::execute(args).is_err());
}

#[test]
fn learn_then_evaluate_with_both_solvers() {
    let tmp = tempdir().unwrap();
    let (dataset, stranded) = generate_dataset(tmp.path(), 4);

    let vi_policy = tmp.path().join("vi.txt");
    let summary = tmp.path().join("vi_summary.json");
    let args = LearnArgs::parse_from([
        "rescue-learn",
        "value-iteration",
        path_str(&dataset),
        path_str(&vi_policy),
        "--summary",
        path_str(&summary),
        "--show-policy",
    ]);
    learn::execute(args).expect("value iteration should succeed");

    let policy_lines = std::fs::read_to_string(&vi_policy).unwrap();
    assert_eq!(policy_lines.lines().count(), 16);
    assert!(
        policy_lines
            .lines()
            .all(|line| matches!(line, "1" | "2" | "3" | "4"))
    );
    let report = read_json(&summary);
    assert_eq!(report["solver"], "Value Iteration");
    assert_eq!(report["num_states"], 16);

    let config = tmp.path().join("q.json");
    std::fs::write(&config, r#"{ "discount": 0.8, "max_epochs": 40 }"#).unwrap();
    let q_policy = tmp.path().join("q.txt");
    let observations = tmp.path().join("q.jsonl");
    let args = LearnArgs::parse_from([
        "rescue-learn",
        "q-learning",
        path_str(&dataset),
        path_str(&q_policy),
        "--config",
        path_str(&config),
        "--max-epochs",
        "12",
        "--stability-epsilon",
        "0",
        "--seed",
        "5",
        "--observations",
        path_str(&observations),
    ]);
    learn::execute(args).expect("q-learning should succeed");

    let epochs = std::fs::read_to_string(&observations).unwrap();
    assert_eq!(epochs.lines().count(), 12);
    let first: serde_json::Value = serde_json::from_str(epochs.lines().next().unwrap()).unwrap();
    assert_eq!(first["solver"], "Q-Learning");

    let export = tmp.path().join("evaluation.json");
    let stranded_arg = stranded.to_string();
    let args = EvaluateArgs::parse_from([
        "rescue-evaluate",
        path_str(&dataset),
        path_str(&q_policy),
        &stranded_arg,
        "--trials",
        "2000",
        "--seed",
        "11",
        "--export",
        path_str(&export),
    ]);
    evaluate::execute(args).expect("evaluation should succeed");

    let comparison = read_json(&export);
    assert_eq!(comparison["policy"]["trials"], 2000);
    assert_eq!(comparison["policy"]["horizon"], 8);
    assert!(comparison["policy"]["rescue_rate"].is_number());
    let difference = comparison["difference"].as_f64().unwrap();
    let policy_mean = comparison["policy"]["mean_reward"].as_f64().unwrap();
    let baseline_mean = comparison["baseline"]["mean_reward"].as_f64().unwrap();
    assert!((difference - (policy_mean - baseline_mean)).abs() < 1e-9);
}

#[test]
fn evaluate_rejects_out_of_range_stranded_state() {
    let tmp = tempdir().unwrap();
    let (dataset, _) = generate_dataset(tmp.path(), 3);
    let policy = tmp.path().join("policy.txt");
    learn::execute(LearnArgs::parse_from([
        "rescue-learn",
        "value-iteration",
        path_str(&dataset),
        path_str(&policy),
    ]))
    .unwrap();

    let args = EvaluateArgs::parse_from([
        "rescue-evaluate",
        path_str(&dataset),
        path_str(&policy),
        "10",
        "--trials",
        "10",
    ]);
    let err = evaluate::execute(args).unwrap_err();
    assert!(err.to_string().contains("outside 1..=9"), "{err}");
}

#[test]
fn learn_reports_missing_dataset() {
    let tmp = tempdir().unwrap();
    let missing = tmp.path().join("missing.csv");
    let args = LearnArgs::parse_from([
        "rescue-learn",
        "q-learning",
        path_str(&missing),
        path_str(&tmp.path().join("policy.txt")),
    ]);

    let err = learn::execute(args).unwrap_err();
    assert!(format!("{err:#}").contains("missing.csv"));
}

#[test]
fn learn_requires_dataset_and_policy_arguments() {
    let result = LearnArgs::try_parse_from(["rescue-learn", "q-learning", "mdp.csv"]);
    assert!(result.is_err());
}

#[test]
fn evaluate_rejects_policy_longer_than_dataset() {
    let tmp = tempdir().unwrap();
    let (dataset, _) = generate_dataset(tmp.path(), 3);
    let policy = tmp.path().join("policy.txt");
    std::fs::write(&policy, "3\n".repeat(10)).unwrap();

    let args = EvaluateArgs::parse_from([
        "rescue-evaluate",
        path_str(&dataset),
        path_str(&policy),
        "--trials",
        "10",
    ]);
    let err = evaluate::execute(args).unwrap_err();
    assert!(err.to_string().contains("policy covers 10 states"), "{err}");
}
