fn main() {
    schema_cli_demos::custom::runner().run_and_exit()
}
