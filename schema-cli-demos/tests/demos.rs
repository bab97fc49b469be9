//! In-process runs of every demo

mod common;

use common::{run_config, TempJson, JSON_CONFIG_ENV_VAR};
use rstest::rstest;
use schema_cli_demos::{
    boolean, boolean_custom, custom, enums, json_config, json_config_not_found, list,
    rich_schema, simple, subcommands,
};
use serde_json::json;
use serial_test::serial;

#[rstest]
#[case(&["--input_file", "/path/to/file.txt", "--max_records", "1234"], 0)]
#[case(&["--input_file", "/path/to/file.txt"], 1)]
#[case(&["--input_file", "/path/to/file.txt", "--max_records", "many"], 1)]
#[case(&["--help"], 0)]
#[case(&["--version"], 0)]
fn test_simple(#[case] args: &[&str], #[case] exit_code: i32) {
    run_config(simple::runner(), args, exit_code);
}

#[rstest]
#[case(&["--input_file", "/path/to/file.txt"], 0)]
#[case(&["--input_file", "/path/to/file.txt", "--disable-run_training", "--enable-dry_run"], 0)]
#[case(&["--input_file", "/path/to/file.txt", "--enable-run_training"], 1)]
#[case(&["--input_file", "/path/to/file.txt", "--disable-dry_run"], 1)]
fn test_boolean(#[case] args: &[&str], #[case] exit_code: i32) {
    run_config(boolean::runner(), args, exit_code);
}

const BOOLEAN_CUSTOM_REQUIRED: &[&str] = &[
    "--input_file",
    "/path/to/file.txt",
    "--input_file2",
    "/path/2.txt",
    "-f",
    "/path/to/file.h5",
    "--report_json",
    "output.json",
    "--states",
    "RUNNING",
    "FAILED",
    "--filter_mode",
    "1",
];

#[rstest]
#[case(&["--enable-alpha", "--enable-gamma", "--enable-zeta_mode"], 0)]
#[case(&["--disable-alpha", "--disable-gamma", "--disable-zeta_mode", "--fasta", "output.fasta"], 0)]
#[case(&["--enable-alpha", "--enable-gamma", "--enable-zeta_mode", "-b", "--epsilon"], 0)]
#[case(&["--enable-alpha", "--enable-gamma", "--enable-zeta_mode", "--disable-delta"], 0)]
#[case(&["--enable-alpha", "--enable-gamma"], 1)]
#[case(&["--enable-alpha", "--disable-alpha", "--enable-gamma", "--enable-zeta_mode"], 1)]
#[case(&["--enable-alpha", "--enable-gamma", "--enable-zeta_mode", "--disable-epsilon"], 1)]
fn test_boolean_custom(#[case] extra: &[&str], #[case] exit_code: i32) {
    let args: Vec<&str> = BOOLEAN_CUSTOM_REQUIRED.iter().chain(extra).copied().collect();
    run_config(boolean_custom::runner(), &args, exit_code);
}

#[test]
fn test_boolean_custom_hdf5_long_flag() {
    let args = [
        "--input_file", "a", "--input_file2", "b", "--hdf5", "c.h5", "--report_json", "r.json",
        "--enable-alpha", "--enable-gamma", "--enable-zeta_mode", "--states", "SUCCESSFUL",
        "--filter_mode", "x",
    ];
    run_config(boolean_custom::runner(), &args, 0);
}

#[rstest]
#[case(&["-i", "/path/to/file.txt", "-f", "1.0"], 0)]
#[case(&["--input", "/path/to/file.txt", "--filter-score", "1.0", "-m", "2"], 0)]
#[case(&["-i", "/path/to/file.txt", "-f", "1.0", "--log_level", "DEBUG"], 0)]
#[case(&["-i", "/path/to/file.txt", "-f", "1.0", "--log_level", "VERBOSE"], 1)]
#[case(&["-i", "/path/to/file.txt"], 1)]
fn test_custom(#[case] args: &[&str], #[case] exit_code: i32) {
    run_config(custom::runner(), args, exit_code);
}

#[rstest]
#[case(&["--states", "RUNNING", "FAILED", "--mode", "alpha"], 0)]
#[case(&["--states", "RUNNING", "RUNNING", "--mode", "beta", "--max_records", "3"], 0)]
#[case(&["--states", "running", "--mode", "alpha"], 1)]
#[case(&["--states", "RUNNING", "--mode", "gamma"], 1)]
fn test_enums(#[case] args: &[&str], #[case] exit_code: i32) {
    run_config(enums::runner(), args, exit_code);
}

#[rstest]
#[case(&["--input_file", "a.fasta", "b.fasta", "--filters", "x", "y", "x", "--max_records", "10"], 0)]
#[case(&["--input_file", "a.fasta", "--filters", "x", "--max_records", "10"], 0)]
#[case(&["--input_file", "--filters", "x", "--max_records", "10"], 1)]
fn test_list(#[case] args: &[&str], #[case] exit_code: i32) {
    run_config(list::runner(), args, exit_code);
}

#[test]
#[serial]
fn test_json_config_full_preset() {
    std::env::remove_var(JSON_CONFIG_ENV_VAR);
    let preset = TempJson::new(&json!({
        "hdf_file": "/path/to/file.hdf5",
        "max_records": 12,
        "min_filter_score": 1.024,
        "alpha": 1.234,
        "beta": 9.854,
    }));
    run_config(
        json_config::runner(),
        &["--json-training", preset.path_str()],
        0,
    );
}

#[test]
#[serial]
fn test_json_config_partial_preset() {
    std::env::remove_var(JSON_CONFIG_ENV_VAR);
    let preset = TempJson::new(&json!({
        "max_records": 12,
        "min_filter_score": 1.024,
        "alpha": 1.234,
        "beta": 9.854,
    }));
    run_config(
        json_config::runner(),
        &["--json-training", preset.path_str(), "--hdf_file", "/path/to/file.hdf5"],
        0,
    );
    run_config(json_config::runner(), &["--json-training", preset.path_str()], 1);
}

#[test]
#[serial]
fn test_json_config_from_env() {
    let preset = TempJson::new(&json!({
        "hdf_file": "/path/to/file.hdf5",
        "min_filter_score": 1.0,
        "alpha": 2.0,
        "beta": 3.0,
    }));
    std::env::set_var(JSON_CONFIG_ENV_VAR, preset.path());
    run_config(json_config::runner(), &[], 0);
    run_config(json_config::runner(), &["--alpha", "4.5"], 0);
    std::env::remove_var(JSON_CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_json_config_missing_explicit_file() {
    std::env::remove_var(JSON_CONFIG_ENV_VAR);
    run_config(
        json_config::runner(),
        &[
            "--json-training", "/no/such/preset.json", "--hdf_file", "f", "--min_filter_score",
            "1", "--alpha", "1", "--beta", "1",
        ],
        1,
    );
}

#[test]
#[serial]
fn test_json_config_not_found_is_ignored() {
    std::env::remove_var(JSON_CONFIG_ENV_VAR);
    run_config(
        json_config_not_found::runner(),
        &["--input_file", "/path/to/file.txt", "--max_record", "1234"],
        0,
    );
    run_config(
        json_config_not_found::runner(),
        &["--input_file", "/path/to/file.txt", "--json-config", "/does/not/exist.json"],
        0,
    );
}

#[test]
#[serial]
fn test_json_config_not_found_with_env() {
    let preset = TempJson::new(&json!({
        "input_file": "/path/to/input.txt",
        "max_records": 12345,
    }));
    std::env::set_var(JSON_CONFIG_ENV_VAR, preset.path());
    run_config(
        json_config_not_found::runner(),
        &["--input_file", "/path/to/file.txt", "--max_record", "1234"],
        0,
    );
    run_config(json_config_not_found::runner(), &[], 0);
    std::env::remove_var(JSON_CONFIG_ENV_VAR);
}

#[rstest]
#[case("-f /path/to/file.txt --max_records 1234 -s 1.234 --max-filter-score 10.234 -n none", 0)]
#[case("-f /path/to/file.txt -m 1234 -s 1.234 -S 10.234 --filter-name alphax", 0)]
#[case("-f /path/to/file.txt -s 1.234 -n beta.v2", 0)]
#[case("-f /path/to/file.txt -m 0 -s 1.234 -n beta.v2", 1)]
#[case("-f /path/to/file.txt -s 5.0 -S 1.0 -n beta.v2", 1)]
#[case("-f /path/to/file.txt -s 1.234", 1)]
#[case("--emit-completion zsh", 0)]
#[case("--emit-completion bash", 0)]
fn test_rich_schema(#[case] args: &str, #[case] exit_code: i32) {
    let args: Vec<&str> = args.split_whitespace().collect();
    run_config(rich_schema::runner(), &args, exit_code);
}

#[rstest]
#[case("alpha -i /path/to/file.txt -m 1234", 0)]
#[case("alpha --input /path/to/file.txt --log_level WARN", 0)]
#[case("beta --url http://google.com -n 3", 0)]
#[case("beta --url google.com", 1)]
#[case("beta -i /path/to/file.txt", 1)]
#[case("gamma", 1)]
#[case("--help", 0)]
#[case("beta --help", 0)]
#[serial]
fn test_subcommands(#[case] args: &str, #[case] exit_code: i32) {
    std::env::remove_var(JSON_CONFIG_ENV_VAR);
    let args: Vec<&str> = args.split_whitespace().collect();
    run_config(subcommands::runner(), &args, exit_code);
}
