fn main() {
    schema_cli_demos::json_config::runner().run_and_exit()
}
