use super::*;
use clap::CommandFactory;


#[test]
fn command_definition_is_valid() {
    Cli::command().debug_assert();
}
