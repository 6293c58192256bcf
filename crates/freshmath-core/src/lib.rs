pub mod backend;
pub mod cli;
pub mod commands;
pub mod config;
pub mod datastore;
pub mod notify;
pub mod relay;
pub mod render;

use std::ffi::OsString;

use clap::{
  CommandFactory,
  Parser
};
use tracing::{
  debug,
  info
};

#[tracing::instrument(skip_all)]
pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let pre =
    cli::preprocess_args(&raw_args)?;
  let cli = cli::GlobalCli::parse_from(
    pre.cleaned_args
  );

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting freshmath CLI"
  );
  debug!(?pre.rc_overrides, "preprocessed rc overrides");

  let mut cfg = config::Config::load(
    cli.rcfile.as_deref()
  )?;
  cfg.apply_overrides(
    pre.rc_overrides.into_iter().chain(
      cli
        .rc_overrides
        .into_iter()
        .map(|kv| (kv.key, kv.value))
    )
  );

  let Some(command) = cli.command else {
    cli::GlobalCli::command()
      .print_help()?;
    return Ok(());
  };

  let mut renderer =
    render::Renderer::new(&cfg)?;

  commands::dispatch(
    &cfg,
    cli.data.as_deref(),
    &mut renderer,
    command
  )?;

  info!("done");
  Ok(())
}
