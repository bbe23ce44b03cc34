use std::process;

mod apply;
mod cli;
mod create;
mod info;
mod log;
mod outfile;

fn main() -> process::ExitCode {
  use cli::CommandKind::*;

  log::init();
  let args: cli::Args = match clap::Parser::try_parse() {
    Ok(args) => args,
    Err(err) => {
      let _ = err.print();
      return process::ExitCode::from(1);
    }
  };
  let result = match args.command {
    Encode(args) => args.call().map_err(Error::from),
    Decode(args) => args.call().map_err(Error::from),
    Info(args) => args.call().map_err(Error::from),
  };
  match result {
    Ok(()) => process::ExitCode::SUCCESS,
    Err(err) => {
      let code = err.exit_code();
      eprintln!("{:?}", miette::Report::new(err));
      process::ExitCode::from(code)
    }
  }
}

#[non_exhaustive]
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
enum Error {
  #[error(transparent)]
  #[diagnostic(transparent)]
  Encode(#[from] create::Error),
  #[error(transparent)]
  #[diagnostic(transparent)]
  Decode(#[from] apply::Error),
  #[error(transparent)]
  #[diagnostic(transparent)]
  Info(#[from] info::Error),
}

impl Error {
  fn exit_code(&self) -> u8 {
    match self {
      Error::Encode(err) => err.exit_code(),
      Error::Decode(err) => err.exit_code(),
      Error::Info(err) => err.exit_code(),
    }
  }
}
