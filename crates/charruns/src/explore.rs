//! Interactive filtering.
//!
//! Every stdin line is one input event: a new filter expression, or a command
//! prefixed with `:`. Each event re-renders the session once, as does each
//! finished analysis. Opening a document while another is still being read
//! abandons the earlier one.

use std::io::IsTerminal;
use std::path::PathBuf;

use charruns_core::session::Session;
use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::prelude::{eprintln, print, *};
use crate::source::{self, Analysis, Pending, Submitted};

const PROMPT: &str = "filter> ";

const HELP: &str = "Type a filter and press Enter (empty line clears it).
Commands: :open <PATH>  analyse another document
          :quit         exit
Start a filter with '::' to search for text beginning with ':'.";

#[derive(Debug, clap::Args, serde::Serialize, serde::Deserialize, Clone)]
pub struct ExploreOptions {
    /// Path to the PDF file
    path: PathBuf,
}

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Filter(String),
    Open(PathBuf),
    Help,
    Quit,
    Invalid(String),
}

pub fn parse_input(line: &str) -> Input {
    let trimmed = line.trim();

    if let Some(escaped) = trimmed.strip_prefix("::") {
        return Input::Filter(f!(":{escaped}"));
    }

    let Some(command) = trimmed.strip_prefix(':') else {
        return Input::Filter(trimmed.to_string());
    };
    if command.is_empty() {
        return Input::Filter(trimmed.to_string());
    }

    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };

    match (name, arg) {
        ("q" | "quit", _) => Input::Quit,
        ("h" | "help", _) => Input::Help,
        ("o" | "open", "") => Input::Invalid("':open' needs a path".to_string()),
        ("o" | "open", path) => Input::Open(PathBuf::from(path)),
        (other, _) => Input::Invalid(f!("Unknown command ':{other}' (try ':help')")),
    }
}

fn prompt(interactive: bool) {
    if interactive {
        anstream::eprint!("{}", PROMPT.bright_black());
    }
}

/// What woke the loop up.
enum Event {
    Line(Option<String>),
    Analysed(std::result::Result<Analysis, Error>),
}

/// Resolves when the in-flight analysis finishes; never, if there is none.
async fn analysed(pending: &mut Option<Pending>) -> std::result::Result<Analysis, Error> {
    match pending {
        Some(pending) => pending.analysis().await,
        None => std::future::pending().await,
    }
}

pub async fn run(options: ExploreOptions, global: crate::Global) -> Result<()> {
    let interactive = std::io::stdin().is_terminal();
    let show_progress = std::io::stderr().is_terminal();

    let mut session = Session::new();
    let mut pending = source::begin(&mut session, &options.path, show_progress).await?;
    print!("{}", crate::render::format_session(&session));

    if interactive {
        eprintln!("\n{}", HELP.bright_black());
    }
    prompt(interactive);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    loop {
        if !stdin_open && pending.is_none() {
            break;
        }

        // Filters and new documents are accepted while pages are still
        // being read.
        let event = tokio::select! {
            result = analysed(&mut pending) => Event::Analysed(result),
            line = lines.next_line(), if stdin_open => {
                Event::Line(line.wrap_err("Failed to read from stdin")?)
            }
        };

        match event {
            Event::Analysed(result) => {
                let Some(done) = pending.take() else {
                    continue;
                };
                if done.complete(&mut session, result, &global)? == Submitted::Applied {
                    print!("\n{}", crate::render::format_session(&session));
                    prompt(interactive);
                }
            }
            Event::Line(None) => stdin_open = false,
            Event::Line(Some(line)) => {
                match parse_input(&line) {
                    Input::Quit => break,
                    Input::Help => eprintln!("{}", HELP),
                    Input::Invalid(message) => eprintln!("{}", message.yellow()),
                    Input::Filter(expr) => {
                        session.set_filter(expr);
                        print!("\n{}", crate::render::format_session(&session));
                    }
                    Input::Open(path) => {
                        match source::begin(&mut session, &path, show_progress).await? {
                            None => log::info!("ignored {}: not a PDF", path.display()),
                            Some(next) => {
                                if let Some(previous) = pending.replace(next) {
                                    previous.abandon();
                                }
                                print!("\n{}", crate::render::format_session(&session));
                            }
                        }
                    }
                }
                prompt(interactive);
            }
        }
    }

    if let Some(unfinished) = pending.take() {
        unfinished.abandon();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filter() {
        assert_eq!(parse_input("y"), Input::Filter("y".to_string()));
        assert_eq!(parse_input("  00  \n"), Input::Filter("00".to_string()));
    }

    #[test]
    fn test_parse_empty_line_clears_filter() {
        assert_eq!(parse_input(""), Input::Filter(String::new()));
        assert_eq!(parse_input("   "), Input::Filter(String::new()));
    }

    #[test]
    fn test_parse_lone_colon_is_a_filter() {
        assert_eq!(parse_input(":"), Input::Filter(":".to_string()));
    }

    #[test]
    fn test_parse_escaped_colon() {
        assert_eq!(parse_input("::quit"), Input::Filter(":quit".to_string()));
        assert_eq!(parse_input("::"), Input::Filter(":".to_string()));
    }

    #[test]
    fn test_parse_quit() {
        assert_eq!(parse_input(":quit"), Input::Quit);
        assert_eq!(parse_input(":q"), Input::Quit);
    }

    #[test]
    fn test_parse_open() {
        assert_eq!(
            parse_input(":open  reports/q3 final.pdf "),
            Input::Open(PathBuf::from("reports/q3 final.pdf"))
        );
        assert_eq!(
            parse_input(":o a.pdf"),
            Input::Open(PathBuf::from("a.pdf"))
        );
    }

    #[test]
    fn test_parse_open_without_path() {
        assert!(matches!(parse_input(":open"), Input::Invalid(_)));
        assert!(matches!(parse_input(":open   "), Input::Invalid(_)));
    }

    #[test]
    fn test_parse_unknown_command() {
        assert_eq!(
            parse_input(":frobnicate"),
            Input::Invalid("Unknown command ':frobnicate' (try ':help')".to_string())
        );
    }

    #[test]
    fn test_parse_help() {
        assert_eq!(parse_input(":help"), Input::Help);
    }
}
