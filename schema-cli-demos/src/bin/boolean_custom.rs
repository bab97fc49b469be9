fn main() {
    schema_cli_demos::boolean_custom::runner().run_and_exit()
}
