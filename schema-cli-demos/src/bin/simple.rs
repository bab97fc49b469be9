fn main() {
    schema_cli_demos::simple::runner().run_and_exit()
}
