use crate::{apply, create, info};

#[derive(Clone, Debug, clap::Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  #[command(subcommand)]
  pub command: CommandKind,
}

#[derive(Clone, Debug, clap::Subcommand)]
#[command(about)]
pub enum CommandKind {
  Encode(create::Args),
  Decode(apply::Args),
  Info(info::Args),
}
