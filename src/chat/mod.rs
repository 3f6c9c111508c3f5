// Interactive terminal chat over the knowledge base


use anyhow::Result;
use console::style;
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, warn};

use crate::processor::Chunk;
use crate::rag::{QueryResponse, RagSystem};
use crate::session::{Session, SessionUpdate, source_preview};

const HELP: &str = "\
Commands:
  /upload <path>...  Add PDF or TXT files to the knowledge base
  /url <url>         Add a web page to the knowledge base
  /list              Show documents added this session
  /clear             Remove all documents from the knowledge base
  /help              Show this help
  /quit              Leave the chat
Anything else is asked as a question about your documents.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    Upload(Vec<PathBuf>),
    Url(String),
    List,
    Clear,
    Help,
    Quit,
    Ask(String),
    /// A slash command that needs an argument it didn't get
    Usage(&'static str),
    Unknown(String),
    Empty,
}

impl ChatCommand {
    #[inline]
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Self::Empty;
        }
        if !line.starts_with('/') {
            return Self::Ask(line.to_string());
        }

        let mut parts = line.split_whitespace();
        let command = parts.next().unwrap_or_default();
        let args: Vec<&str> = parts.collect();

        match command {
            "/upload" if args.is_empty() => Self::Usage("/upload <path>..."),
            "/upload" => Self::Upload(args.into_iter().map(PathBuf::from).collect()),
            "/url" => match args.as_slice() {
                [url] => Self::Url((*url).to_string()),
                _ => Self::Usage("/url <url>"),
            },
            "/list" => Self::List,
            "/clear" => Self::Clear,
            "/help" | "/?" => Self::Help,
            "/quit" | "/exit" => Self::Quit,
            other => Self::Unknown(other.to_string()),
        }
    }
}

/// Run the chat loop until the user quits or input ends
#[inline]
pub fn run_chat(rag: &RagSystem) -> Result<()> {
    let mut session = Session::new(rag);

    eprintln!("{}", style("📚 Simple RAG Chat").bold().cyan());
    eprintln!("Add documents, then ask questions about their content.");
    eprintln!("Type {} for commands.", style("/help").cyan());
    eprintln!();

    loop {
        let line = match Input::<String>::new()
            .with_prompt("You")
            .allow_empty(true)
            .interact_text()
        {
            Ok(line) => line,
            Err(e) => {
                debug!("Input ended: {}", e);
                break;
            }
        };

        match ChatCommand::parse(&line) {
            ChatCommand::Empty => {}
            ChatCommand::Quit => break,
            ChatCommand::Help => eprintln!("{}", HELP),
            ChatCommand::Usage(usage) => eprintln!("Usage: {}", style(usage).cyan()),
            ChatCommand::Unknown(command) => eprintln!(
                "{} Unknown command {}. Type /help for commands.",
                style("⚠").yellow(),
                command
            ),
            ChatCommand::List => print_documents(&session),
            ChatCommand::Clear => match session.clear() {
                Ok(()) => eprintln!("{}", style("✓ Knowledge base cleared").green()),
                Err(e) => report_error("Failed to clear knowledge base", &e),
            },
            ChatCommand::Upload(paths) => {
                for path in paths {
                    let bar = spinner(format!("Processing {}...", path.display()));
                    let result = session.upload_file(&path);
                    bar.finish_and_clear();
                    report_update(&path.display().to_string(), &result);
                }
            }
            ChatCommand::Url(url) => {
                let bar = spinner(format!("Fetching {}...", url));
                let result = session.add_url(&url);
                bar.finish_and_clear();
                report_update(&url, &result);
            }
            ChatCommand::Ask(question) => {
                let bar = spinner("Thinking...".to_string());
                let result = session.ask(&question);
                bar.finish_and_clear();
                match result {
                    Ok(response) => print_response(&response),
                    Err(e) => report_error("Failed to answer", &e),
                }
            }
        }
    }

    eprintln!("Goodbye!");
    Ok(())
}

fn spinner(message: String) -> ProgressBar {
    if !console::user_attended_stderr() {
        return ProgressBar::hidden();
    }

    let bar = ProgressBar::new_spinner().with_message(message);
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        bar.set_style(style);
    }
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

fn report_update(label: &str, result: &crate::Result<SessionUpdate>) {
    match result {
        Ok(SessionUpdate::Ingested { chunks }) => eprintln!(
            "{} Added {} ({} chunks)",
            style("✓").green(),
            label,
            chunks
        ),
        Ok(SessionUpdate::AlreadyPresent) => {
            eprintln!("{} already added this session", label);
        }
        Err(e) => report_error(&format!("Failed to add {}", label), e),
    }
}

fn report_error(context: &str, error: &crate::RagError) {
    warn!("{}: {}", context, error);
    eprintln!("{} {}: {}", style("✗").red(), context, error);
    if error.is_service_unavailable() {
        eprintln!("  Check that Ollama and Qdrant are running, or run 'simple-rag config'.");
    }
}

fn print_documents(session: &Session<'_>) {
    if session.uploaded_files().is_empty() && session.urls().is_empty() {
        eprintln!("No documents added this session.");
        return;
    }

    if !session.uploaded_files().is_empty() {
        eprintln!("{}", style("Uploaded Files:").bold());
        for file in session.uploaded_files() {
            eprintln!("- {}", file);
        }
    }
    if !session.urls().is_empty() {
        eprintln!("{}", style("URLs:").bold());
        for url in session.urls() {
            eprintln!("- {}", url);
        }
    }
}

/// Print an answer and a preview of every source chunk to stdout
#[inline]
pub fn print_response(response: &QueryResponse) {
    println!();
    println!("{}", style("Answer").bold().yellow());
    println!("{}", response.answer.trim());

    if !response.sources.is_empty() {
        println!();
        println!("{}", style("Sources").bold().yellow());
        print!("{}", format_sources(&response.sources));
    }
    println!();
}

/// `Source i:` followed by a preview of the chunk, numbered from one
#[inline]
pub fn format_sources(sources: &[Chunk]) -> String {
    sources
        .iter()
        .enumerate()
        .map(|(i, chunk)| format!("Source {}:\n{}\n", i + 1, source_preview(&chunk.content)))
        .collect::<Vec<_>>()
        .concat()
}
