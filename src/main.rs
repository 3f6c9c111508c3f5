use clap::{Parser, Subcommand};
use simple_rag::Result;
use simple_rag::commands::{add_documents, ask, chat, clear, show_status};
use simple_rag::config::{run_interactive_config, show_config};

#[derive(Parser)]
#[command(name = "simple-rag")]
#[command(about = "Ask questions about your PDF, text and web documents using local models")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure Ollama and Qdrant connection settings
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
    /// Add PDF/TXT files or web pages to the knowledge base
    Add {
        /// File paths or http(s) URLs
        #[arg(required = true)]
        inputs: Vec<String>,
    },
    /// Ask a question about the added documents
    Ask {
        question: String,
    },
    /// Remove all documents from the knowledge base
    Clear {
        /// Do not ask for confirmation
        #[arg(long, short)]
        yes: bool,
    },
    /// Show service health and knowledge base size
    Status,
    /// Start an interactive chat session
    Chat,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Config { show } => {
            if show {
                show_config()?;
            } else {
                run_interactive_config()?;
            }
        }
        Commands::Add { inputs } => {
            add_documents(&inputs)?;
        }
        Commands::Ask { question } => {
            ask(&question)?;
        }
        Commands::Clear { yes } => {
            clear(yes)?;
        }
        Commands::Status => {
            show_status()?;
        }
        Commands::Chat => {
            chat()?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn chat_command() {
        let cli = Cli::try_parse_from(["simple-rag", "chat"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            assert!(matches!(parsed.command, Commands::Chat));
        }
    }

    #[test]
    fn add_command_with_several_inputs() {
        let cli = Cli::try_parse_from([
            "simple-rag",
            "add",
            "notes.txt",
            "https://example.com/post",
        ]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Add { inputs } = parsed.command {
                assert_eq!(inputs, vec!["notes.txt", "https://example.com/post"]);
            }
        }
    }

    #[test]
    fn add_command_requires_input() {
        let cli = Cli::try_parse_from(["simple-rag", "add"]);
        assert!(cli.is_err());

        if let Err(err) = cli {
            assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        }
    }

    #[test]
    fn ask_command() {
        let cli = Cli::try_parse_from(["simple-rag", "ask", "What is RAG?"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Ask { question } = parsed.command {
                assert_eq!(question, "What is RAG?");
            }
        }
    }

    #[test]
    fn clear_yes_flag() {
        let cli = Cli::try_parse_from(["simple-rag", "clear", "-y"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Clear { yes } = parsed.command {
                assert!(yes);
            }
        }
    }

    #[test]
    fn config_show_flag() {
        let cli = Cli::try_parse_from(["simple-rag", "config", "--show"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Config { show } = parsed.command {
                assert!(show);
            }
        }
    }

    #[test]
    fn invalid_command() {
        let cli = Cli::try_parse_from(["simple-rag", "invalid"]);
        assert!(cli.is_err());

        if let Err(err) = cli {
            assert_eq!(err.kind(), ErrorKind::InvalidSubcommand);
        }
    }

    #[test]
    fn help_message() {
        let cli = Cli::try_parse_from(["simple-rag", "--help"]);
        assert!(cli.is_err());

        if let Err(err) = cli {
            assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        }
    }
}
