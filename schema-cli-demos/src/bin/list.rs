fn main() {
    schema_cli_demos::list::runner().run_and_exit()
}
