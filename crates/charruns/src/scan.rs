use std::io::IsTerminal;

use charruns_core::session::{Session, SessionState};

use crate::prelude::{print, println, *};
use crate::source::{self, Submitted};

#[derive(Debug, clap::Args, serde::Serialize, serde::Deserialize, Clone)]
pub struct ScanOptions {
    /// Path to the PDF file
    path: std::path::PathBuf,

    /// Only show runs of this character, or runs containing this text
    #[arg(short, long, env = "CHARRUNS_FILTER", default_value = "")]
    filter: String,

    /// Output as JSON
    #[arg(long, env = "CHARRUNS_JSON")]
    json: bool,
}

pub async fn run(options: ScanOptions, global: crate::Global) -> Result<()> {
    let mut session = Session::new();
    session.set_filter(options.filter.as_str());

    let show_progress = !options.json && std::io::stderr().is_terminal();
    let submitted = source::submit(&mut session, &options.path, &global, show_progress).await?;

    if submitted == Submitted::Ignored {
        return Ok(());
    }

    if let SessionState::Failed { message } = session.state() {
        return Err(eyre!(
            "Failed to analyse {}: {}",
            options.path.display(),
            message
        ));
    }

    if options.json {
        println!("{}", crate::render::format_json(&session)?);
    } else {
        print!("{}", crate::render::format_session(&session));
    }

    Ok(())
}
