pub mod cli;
pub mod commands;
pub mod logging;

#[cfg(test)]
pub mod test_util;

use std::io::Write;

use clap::Parser;

use docsift_lib::output::ConsoleIO;
use docsift_lib::runtime::Runtime;

use cli::{Cli, Command, GlobalArgs, ModelCommand};

/// Parse `args` and run the selected command.
///
/// `build_runtime` is only called by commands that talk to the backends, so
/// `namespace` and `model download` work without any credentials.
pub async fn try_run<F, OUT, ERR>(
    args: &[&str],
    build_runtime: F,
    io: &mut dyn ConsoleIO<OUT, ERR>,
) -> anyhow::Result<()>
where
    F: FnOnce(&GlobalArgs) -> anyhow::Result<Runtime>,
    OUT: Write,
    ERR: Write,
{
    let cli = Cli::try_parse_from(args)?;
    run(cli, build_runtime, io).await
}

/// Run an already parsed command line.
pub async fn run<F, OUT, ERR>(
    cli: Cli,
    build_runtime: F,
    io: &mut dyn ConsoleIO<OUT, ERR>,
) -> anyhow::Result<()>
where
    F: FnOnce(&GlobalArgs) -> anyhow::Result<Runtime>,
    OUT: Write,
    ERR: Write,
{
    match cli.command {
        Command::Ingest { file_key } => {
            let runtime = build_runtime(&cli.global)?;
            commands::ingest::run_ingest(&file_key, &runtime, io).await
        }
        Command::Query { file_key, text } => {
            let runtime = build_runtime(&cli.global)?;
            commands::query::run_query(&file_key, &text, &runtime, io).await
        }
        Command::Namespace { file_key } => commands::namespace::run_namespace(&file_key, io),
        Command::Model { model_command } => match model_command {
            ModelCommand::Download { force } => {
                commands::model::run_model_download(force, &cli.global.model_dir(), io)
            }
        },
    }
}
