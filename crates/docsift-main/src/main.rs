use clap::Parser;

use docsift_cli::cli::Cli;
use docsift_lib::output::StdIO;
use docsift_lib::runtime::Runtime;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    docsift_cli::logging::init(cli.global.log_format);

    let mut io = StdIO::new();
    docsift_cli::run(
        cli,
        |args| Runtime::from_settings(&args.settings()?),
        &mut io,
    )
    .await
}
