fn main() {
    schema_cli_demos::enums::runner().run_and_exit()
}
