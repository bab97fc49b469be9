fn main() {
    schema_cli_demos::subcommands::runner().run_and_exit()
}
