use crate::prelude::*;
use clap::Parser;

mod error;
mod explore;
mod prelude;
mod render;
mod scan;
mod source;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Find runs of repeated characters in PDF documents"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Whether to display additional information.
    #[clap(long, env = "CHARRUNS_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Analyse a document and print its ranked runs
    Scan(crate::scan::ScanOptions),

    /// Analyse a document, then filter its runs interactively from stdin
    Explore(crate::explore::ExploreOptions),
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    match app.command {
        SubCommands::Scan(options) => crate::scan::run(options, app.global).await,
        SubCommands::Explore(options) => crate::explore::run(options, app.global).await,
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}
