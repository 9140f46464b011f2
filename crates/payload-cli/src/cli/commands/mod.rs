mod list;
mod pack;

use super::args::{Cli, Command};

pub fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Pack(args) => pack::run(args),
        Command::List(args) => list::run(args),
    }
}
