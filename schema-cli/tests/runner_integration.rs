//! End-to-end tests: model in, exit code and handler calls out

use rstest::rstest;
use schema_cli::{
    CliConfig, CliModel, Cmd, CmdSpec, FailedExecution, Runner, EXIT_ERROR, EXIT_SUCCESS,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serial_test::serial;
use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;
use tempfile::NamedTempFile;

const TEST_ENV_VAR: &str = "SCHEMA_CLI_IT_JSON_CONFIG";

/// Runner that records every model its handler receives
fn recording<M: CliModel + Clone>() -> (Runner, Rc<RefCell<Vec<M>>>) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    let runner = Runner::new(CmdSpec::with_handler(move |model: M| {
        sink.borrow_mut().push(model);
        Ok(EXIT_SUCCESS)
    }))
    .name("test-cli");
    (runner, seen)
}

fn json_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
struct Options {
    input_file: String,
    max_records: i64,
}

impl CliModel for Options {}

#[test]
fn test_all_required_flags_given() {
    let (runner, seen) = recording::<Options>();
    let code = runner.run(["--input_file", "f.txt", "--max_records", "10"]);
    assert_eq!(code, EXIT_SUCCESS);
    assert_eq!(
        seen.borrow().as_slice(),
        &[Options {
            input_file: "f.txt".to_string(),
            max_records: 10,
        }]
    );
}

#[test]
fn test_missing_required_flag() {
    let (runner, seen) = recording::<Options>();
    assert_eq!(runner.run(["--input_file", "f.txt"]), EXIT_ERROR);
    assert!(seen.borrow().is_empty());
}

#[test]
fn test_unparseable_integer() {
    let (runner, seen) = recording::<Options>();
    assert_eq!(
        runner.run(["--input_file", "f.txt", "--max_records", "ten"]),
        EXIT_ERROR
    );
    assert!(seen.borrow().is_empty());
}

#[test]
fn test_abbreviated_long_flag() {
    let (runner, seen) = recording::<Options>();
    assert_eq!(
        runner.run(["--input_file", "f.txt", "--max_rec", "1234"]),
        EXIT_SUCCESS
    );
    assert_eq!(seen.borrow()[0].max_records, 1234);
}

#[rstest]
#[case(&["--help"])]
#[case(&["-h"])]
#[case(&["--input_file", "f.txt", "--help"])]
#[case(&["--version"])]
fn test_eager_flags_skip_handler(#[case] args: &[&str]) {
    let (runner, seen) = recording::<Options>();
    let runner = runner.version("1.2.3");
    assert_eq!(runner.run(args.iter().copied()), EXIT_SUCCESS);
    assert_eq!(runner.run(args.iter().copied()), EXIT_SUCCESS);
    assert!(seen.borrow().is_empty());
}

#[test]
fn test_version_flag_absent_without_version() {
    let (runner, seen) = recording::<Options>();
    assert_eq!(runner.run(["--version"]), EXIT_ERROR);
    assert!(seen.borrow().is_empty());
}

#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
enum State {
    RUNNING,
    FAILED,
    SUCCESSFUL,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
struct StateOptions {
    state: State,
}

impl CliModel for StateOptions {}

#[test]
fn test_enum_choice_accepted() {
    let (runner, seen) = recording::<StateOptions>();
    assert_eq!(runner.run(["--state", "FAILED"]), EXIT_SUCCESS);
    assert_eq!(seen.borrow()[0].state, State::FAILED);
}

#[test]
fn test_enum_choice_rejected() {
    let (runner, seen) = recording::<StateOptions>();
    assert_eq!(runner.run(["--state", "BAD_STATE"]), EXIT_ERROR);
    assert!(seen.borrow().is_empty());
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
struct ListOptions {
    states: Vec<State>,
    filters: Vec<String>,
}

impl CliModel for ListOptions {}

#[rstest]
#[case(1)]
#[case(2)]
#[case(5)]
fn test_sequence_takes_every_token(#[case] count: usize) {
    let (runner, seen) = recording::<ListOptions>();
    let filters: Vec<String> = (0..count).map(|i| format!("f{i}")).collect();
    let mut args = vec!["--states".to_string(), "RUNNING".to_string(), "SUCCESSFUL".to_string()];
    args.push("--filters".to_string());
    args.extend(filters.iter().cloned());

    assert_eq!(runner.run(args), EXIT_SUCCESS);
    let seen = seen.borrow();
    assert_eq!(seen[0].filters, filters);
    assert_eq!(seen[0].states, vec![State::RUNNING, State::SUCCESSFUL]);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
struct Switches {
    /// Required boolean with no default
    alpha: bool,
    #[serde(default)]
    beta: bool,
    #[serde(default = "default_true")]
    gamma: bool,
    #[serde(default)]
    delta: Option<bool>,
}

fn default_true() -> bool {
    true
}

impl CliModel for Switches {}

#[rstest]
#[case(&["--enable-alpha"], (true, false, true, None))]
#[case(&["--disable-alpha"], (false, false, true, None))]
#[case(&["--enable-alpha", "--enable-beta"], (true, true, true, None))]
#[case(&["--enable-alpha", "--disable-gamma"], (true, false, false, None))]
#[case(&["--enable-alpha", "--enable-delta"], (true, false, true, Some(true)))]
#[case(&["--enable-alpha", "--disable-delta"], (true, false, true, Some(false)))]
fn test_boolean_switches(
    #[case] args: &[&str],
    #[case] expected: (bool, bool, bool, Option<bool>),
) {
    let (runner, seen) = recording::<Switches>();
    assert_eq!(runner.run(args.iter().copied()), EXIT_SUCCESS);
    let model = seen.borrow()[0].clone();
    assert_eq!((model.alpha, model.beta, model.gamma, model.delta), expected);
}

#[rstest]
#[case(&[])]
#[case(&["--enable-alpha", "--disable-alpha"])]
#[case(&["--enable-alpha", "--disable-beta"])]
#[case(&["--enable-alpha", "--enable-delta", "--disable-delta"])]
fn test_boolean_switch_errors(#[case] args: &[&str]) {
    let (runner, seen) = recording::<Switches>();
    assert_eq!(runner.run(args.iter().copied()), EXIT_ERROR);
    assert!(seen.borrow().is_empty());
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
struct CustomOptions {
    input_file: String,
    hdf_file: String,
    #[serde(default)]
    epsilon: bool,
}

impl CliModel for CustomOptions {
    fn cli_config() -> CliConfig {
        CliConfig::new()
            .flag("input_file", ["-i"])
            .flag("hdf_file", ["-f", "--hdf5"])
            .flag("epsilon", ["--epsilon", "--disable-epsilon"])
    }
}

#[test]
fn test_custom_flags() {
    let (runner, seen) = recording::<CustomOptions>();
    assert_eq!(
        runner.run(["-i", "in.txt", "--hdf5", "data.h5", "--epsilon"]),
        EXIT_SUCCESS
    );
    assert_eq!(runner.run(["--input_file", "in.txt", "-f", "data.h5"]), EXIT_SUCCESS);

    let seen = seen.borrow();
    assert_eq!(seen[0].input_file, "in.txt");
    assert_eq!(seen[0].hdf_file, "data.h5");
    assert!(seen[0].epsilon);
    assert!(!seen[1].epsilon);
}

#[test]
fn test_custom_flag_replaces_default_long() {
    let (runner, seen) = recording::<CustomOptions>();
    assert_eq!(runner.run(["-i", "in.txt", "--hdf_file", "data.h5"]), EXIT_ERROR);
    assert!(seen.borrow().is_empty());
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
struct JsonOptions {
    input_file: String,
    max_records: i64,
    #[serde(default)]
    verbose: bool,
}

impl CliModel for JsonOptions {
    fn cli_config() -> CliConfig {
        CliConfig::new()
            .json_enable(true)
            .json_config_env_var(TEST_ENV_VAR)
    }
}

#[test]
#[serial]
fn test_json_config_supplies_required_field() {
    std::env::remove_var(TEST_ENV_VAR);
    let file = json_file(r#"{"max_records": 99}"#);
    let path = file.path().to_str().unwrap();
    let (runner, seen) = recording::<JsonOptions>();

    assert_eq!(
        runner.run(["--input_file", "f.txt", "--json-config", path]),
        EXIT_SUCCESS
    );
    assert_eq!(
        runner.run(["--input_file", "f.txt", "--json-config", path, "--max_records", "5"]),
        EXIT_SUCCESS
    );

    let seen = seen.borrow();
    assert_eq!(seen[0].max_records, 99);
    assert_eq!(seen[1].max_records, 5);
}

#[test]
#[serial]
fn test_json_config_precedence() {
    let from_env = json_file(r#"{"input_file": "env.txt", "max_records": 1}"#);
    let from_flag = json_file(r#"{"input_file": "flag.txt", "max_records": 2}"#);
    std::env::set_var(TEST_ENV_VAR, from_env.path());
    let (runner, seen) = recording::<JsonOptions>();

    let env_only = runner.run(Vec::<String>::new());
    let flag_wins = runner.run(["--json-config", from_flag.path().to_str().unwrap()]);
    let explicit_wins = runner.run(["--max_records", "3"]);
    std::env::remove_var(TEST_ENV_VAR);

    assert_eq!((env_only, flag_wins, explicit_wins), (0, 0, 0));
    let seen = seen.borrow();
    assert_eq!((seen[0].input_file.as_str(), seen[0].max_records), ("env.txt", 1));
    assert_eq!((seen[1].input_file.as_str(), seen[1].max_records), ("flag.txt", 2));
    assert_eq!((seen[2].input_file.as_str(), seen[2].max_records), ("env.txt", 3));
}

#[test]
#[serial]
fn test_abbreviated_json_config_flag() {
    std::env::remove_var(TEST_ENV_VAR);
    let file = json_file(r#"{"max_records": 99}"#);
    let path = file.path().to_str().unwrap();
    let (runner, seen) = recording::<JsonOptions>();

    for flag in ["--json", "--json-conf"] {
        assert_eq!(runner.run(["--input_file", "f.txt", flag, path]), EXIT_SUCCESS);
    }
    let seen = seen.borrow();
    assert_eq!((seen[0].max_records, seen[1].max_records), (99, 99));
}

#[test]
#[serial]
fn test_abbreviated_json_config_flag_beats_env_var() {
    let from_env = json_file(r#"{"input_file": "env.txt", "max_records": 1}"#);
    let from_flag = json_file(r#"{"input_file": "flag.txt", "max_records": 2}"#);
    std::env::set_var(TEST_ENV_VAR, from_env.path());
    let (runner, seen) = recording::<JsonOptions>();

    let inline = format!("--json={}", from_flag.path().display());
    let code = runner.run([inline.as_str()]);
    std::env::remove_var(TEST_ENV_VAR);

    assert_eq!(code, EXIT_SUCCESS);
    let seen = seen.borrow();
    assert_eq!((seen[0].input_file.as_str(), seen[0].max_records), ("flag.txt", 2));
}

#[test]
#[serial]
fn test_model_round_trips_through_json_config() {
    std::env::remove_var(TEST_ENV_VAR);
    let original = JsonOptions {
        input_file: "records.csv".to_string(),
        max_records: 42,
        verbose: true,
    };
    let file = json_file(&serde_json::to_string(&original).unwrap());
    let (runner, seen) = recording::<JsonOptions>();

    assert_eq!(
        runner.run(["--json-config", file.path().to_str().unwrap()]),
        EXIT_SUCCESS
    );
    assert_eq!(seen.borrow().as_slice(), &[original]);
}

#[test]
#[serial]
fn test_invalid_json_config_fails() {
    std::env::remove_var(TEST_ENV_VAR);
    let file = json_file("[1, 2, 3]");
    let (runner, seen) = recording::<JsonOptions>();
    assert_eq!(
        runner.run(["--input_file", "f", "--max_records", "1", "--json-config", file.path().to_str().unwrap()]),
        EXIT_ERROR
    );
    assert!(seen.borrow().is_empty());
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
struct Bounded {
    #[schemars(range(min = 1, max = 100))]
    max_records: i64,
}

impl CliModel for Bounded {
    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.max_records != 13, "max_records must not be 13");
        Ok(())
    }
}

#[rstest]
#[case("50", EXIT_SUCCESS)]
#[case("0", EXIT_ERROR)]
#[case("101", EXIT_ERROR)]
#[case("13", EXIT_ERROR)]
fn test_model_validation(#[case] value: &str, #[case] expected: i32) {
    let (runner, seen) = recording::<Bounded>();
    assert_eq!(runner.run(["--max_records", value]), expected);
    assert_eq!(seen.borrow().len(), usize::from(expected == EXIT_SUCCESS));
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
struct Flaky {
    code: i32,
}

impl CliModel for Flaky {}

impl Cmd for Flaky {
    fn run(&self) -> anyhow::Result<()> {
        if self.code == 0 {
            return Ok(());
        }
        Err(FailedExecution::new(self.code, "flaky failure").into())
    }
}

#[rstest]
#[case("0", 0)]
#[case("3", 3)]
#[case("70", 70)]
fn test_failed_execution_code_is_exit_code(#[case] code: &str, #[case] expected: i32) {
    let runner = schema_cli::to_runner::<Flaky>().exception_handler(|_| EXIT_ERROR);
    assert_eq!(runner.run(["--code", code]), expected);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
struct Alpha {
    name: String,
}

impl CliModel for Alpha {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
struct Beta {
    count: i64,
}

impl CliModel for Beta {}

#[test]
fn test_subcommands_dispatch() {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let alpha_calls = calls.clone();
    let beta_calls = calls.clone();
    let runner = Runner::subcommands([
        (
            "alpha",
            CmdSpec::with_handler(move |a: Alpha| {
                alpha_calls.borrow_mut().push(format!("alpha:{}", a.name));
                Ok(EXIT_SUCCESS)
            })
            .description("Run alpha"),
        ),
        (
            "beta",
            CmdSpec::with_handler(move |b: Beta| {
                beta_calls.borrow_mut().push(format!("beta:{}", b.count));
                Ok(EXIT_SUCCESS)
            }),
        ),
    ])
    .name("multi");

    assert_eq!(runner.run(["alpha", "--name", "x"]), EXIT_SUCCESS);
    assert_eq!(runner.run(["beta", "--count", "2"]), EXIT_SUCCESS);
    assert_eq!(runner.run(["beta", "--name", "x"]), EXIT_ERROR);
    assert_eq!(runner.run(Vec::<String>::new()), EXIT_ERROR);
    assert_eq!(runner.run(["--help"]), EXIT_SUCCESS);
    assert_eq!(runner.run(["alpha", "--help"]), EXIT_SUCCESS);
    assert_eq!(calls.borrow().as_slice(), &["alpha:x", "beta:2"]);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
struct Completing {
    input_file: String,
}

impl CliModel for Completing {
    fn cli_config() -> CliConfig {
        CliConfig::new().shell_completion(true)
    }
}

#[test]
fn test_completion_is_eager() {
    let (runner, seen) = recording::<Completing>();
    assert_eq!(runner.run(["--emit-completion", "bash"]), EXIT_SUCCESS);
    assert_eq!(runner.run(["--emit-completion", "no-such-shell"]), EXIT_ERROR);
    assert!(seen.borrow().is_empty());
}

#[rstest]
#[case(&["--input_file", "f", "--emit", "zsh"])]
#[case(&["--emit-comp=bash", "--input_file", "f"])]
#[case(&["--emit", "fish"])]
fn test_abbreviated_completion_flag_is_eager(#[case] args: &[&str]) {
    let (runner, seen) = recording::<Completing>();
    assert_eq!(runner.run(args.iter().copied()), EXIT_SUCCESS);
    assert!(seen.borrow().is_empty());
}

#[test]
fn test_repeated_scalar_flag_keeps_last_value() {
    let (runner, seen) = recording::<Options>();
    assert_eq!(
        runner.run(["--input_file", "a.txt", "--max_records", "1", "--max_records", "2", "--input_file", "b.txt"]),
        EXIT_SUCCESS
    );
    let seen = seen.borrow();
    assert_eq!((seen[0].input_file.as_str(), seen[0].max_records), ("b.txt", 2));
}

#[test]
fn test_epilogue_receives_exit_code() {
    let codes = Rc::new(RefCell::new(Vec::new()));
    let sink = codes.clone();
    let (runner, _) = recording::<Options>();
    let runner = runner.epilogue_handler(move |code, _| sink.borrow_mut().push(code));

    runner.run(["--input_file", "f", "--max_records", "1"]);
    runner.run(["--max_records", "1"]);
    assert_eq!(codes.borrow().as_slice(), &[EXIT_SUCCESS, EXIT_ERROR]);
}
