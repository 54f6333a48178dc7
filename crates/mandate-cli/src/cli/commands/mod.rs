pub mod create;
pub mod hash;
pub mod keygen;
pub mod sign;
pub mod store;
pub mod verify;

use super::args::{Cli, Command};
use crate::exit_codes;

pub async fn dispatch(cli: Cli) -> i32 {
    match cli.cmd {
        Command::Keygen(args) => keygen::cmd_keygen(args),
        Command::Create(args) => create::cmd_create(args),
        Command::Sign(args) => sign::cmd_sign(args).await,
        Command::Verify(args) => verify::cmd_verify(args),
        Command::Hash(args) => hash::cmd_hash(args),
        Command::Publish(args) => store::cmd_publish(args).await,
        Command::Fetch(args) => store::cmd_fetch(args).await,
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            exit_codes::SUCCESS
        }
    }
}
