use epigrid::model::StatsRecord;
use std::{
    env, fs,
    path::{Path, PathBuf},
    process::{Command, Output},
};

const CONFIG: &str = r#"
[params]
infection_rate = 0.5
incubation_time = 2
recovery_time = 5
reinfection_probability = 0.02
quarantine_threshold = 0.05
quarantine_reduction_factor = 0.5

[init]
population_size = 256
seed = 2024

[output]
n_rounds = 120
rounds_per_log = 40
"#;

fn setup_dir(name: &str, config: &str) -> PathBuf {
    let test_dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join(name);

    fs::remove_dir_all(&test_dir).ok();
    fs::create_dir(&test_dir).expect("failed to create test directory");
    fs::write(test_dir.join("config.toml"), config).expect("failed to write config file");

    test_dir
}

fn run_bin(test_dir: &Path, command: &str) -> Output {
    let bin = PathBuf::from(env!("CARGO_BIN_EXE_epigrid"));
    let test_dir_str = test_dir
        .to_str()
        .expect("failed to convert test directory to string");

    Command::new(bin)
        .args(["--sim-dir", test_dir_str, command])
        .output()
        .expect("failed to execute command")
}

fn assert_success(output: &Output) {
    let stdout_str =
        std::str::from_utf8(&output.stdout).expect("failed to convert stdout to string");
    let stderr_str =
        std::str::from_utf8(&output.stderr).expect("failed to convert stderr to string");

    assert!(
        output.status.success(),
        "binary failed\nstdout:\n{stdout_str}\nstderr:\n{stderr_str}\n"
    );
}

fn read_records(file: &Path) -> Vec<StatsRecord> {
    let bytes = fs::read(file).expect("failed to read records file");
    let mut reader = bytes.as_slice();
    let mut records = Vec::new();
    while !reader.is_empty() {
        let record = rmp_serde::decode::from_read(&mut reader).expect("failed to decode record");
        records.push(record);
    }
    records
}

#[test]
fn basic_workflow() {
    let test_dir = setup_dir("basic_workflow", CONFIG);

    assert_success(&run_bin(&test_dir, "create"));
    assert_success(&run_bin(&test_dir, "create"));

    let records_0 = read_records(&test_dir.join("run-0000").join("records.msgpack"));
    let records_1 = read_records(&test_dir.join("run-0001").join("records.msgpack"));
    assert_eq!(records_0.len(), 121);
    for (round, record) in records_0.iter().enumerate() {
        assert_eq!(record.round, round);
        assert_eq!(record.total(), 256);
    }
    assert_eq!(records_0[0].infected, 1);
    assert_eq!(records_0[0].healthy, 255);
    // Same seed, same trajectory.
    assert_eq!(records_0, records_1);

    assert_success(&run_bin(&test_dir, "analyze"));

    let results = fs::read_to_string(test_dir.join("run-0000").join("results.json"))
        .expect("failed to read results");
    let results: serde_json::Value =
        serde_json::from_str(&results).expect("failed to parse results");
    assert_eq!(results.as_array().map(Vec::len), Some(5));
    assert_eq!(results[4]["final_counts"]["round"], 120);

    assert_success(&run_bin(&test_dir, "clean"));
    assert!(!test_dir.join("run-0000").exists());
    assert!(!test_dir.join("run-0001").exists());

    fs::remove_dir_all(&test_dir).ok();
}

#[test]
fn rejects_invalid_config() {
    let config = CONFIG.replace("population_size = 256", "population_size = 250");
    let test_dir = setup_dir("rejects_invalid_config", &config);

    let output = run_bin(&test_dir, "create");
    assert!(!output.status.success());
    assert!(!test_dir.join("run-0000").exists());

    fs::remove_dir_all(&test_dir).ok();
}
