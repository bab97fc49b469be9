fn main() {
    schema_cli_demos::boolean::runner().run_and_exit()
}
