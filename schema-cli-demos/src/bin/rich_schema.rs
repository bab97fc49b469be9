fn main() {
    schema_cli_demos::rich_schema::runner().run_and_exit()
}
