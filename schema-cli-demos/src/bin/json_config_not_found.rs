fn main() {
    schema_cli_demos::json_config_not_found::runner().run_and_exit()
}
