use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use docchat_core::bootstrap::{build_chat, load_config, resolve_config_path};
use docchat_core::prompt::build_system_prompt;

#[derive(Parser, Debug)]
#[command(
    name = "docchat",
    version,
    about = "Index documents and retrieve context for questions about them"
)]
struct Cli {
    /// Path to the TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Chunk, embed, and index the document stored under KEY.
    Ingest { key: String },
    /// Print the context retrieved for QUESTION.
    Context {
        key: String,
        question: String,
        /// Number of passages to fetch.
        #[arg(long)]
        top_k: Option<usize>,
        /// Byte budget for the joined context.
        #[arg(long)]
        max_bytes: Option<usize>,
    },
    /// Print the full system prompt for QUESTION.
    Prompt { key: String, question: String },
    /// Print the storage URL of KEY.
    Url { key: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_subscriber();

    let cli = Cli::parse();
    let config_path = resolve_config_path(cli.config.as_deref());
    tracing::debug!(path = %config_path.display(), "loading config");
    let config = load_config(&config_path)
        .await
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;
    let chat = build_chat(&config)?;

    match cli.command {
        Command::Ingest { key } => {
            let report = chat
                .ingest(&key)
                .await
                .with_context(|| format!("failed to ingest {key}"))?;
            println!(
                "indexed {key} into {}: {} pages, {} chunks, {} records",
                report.namespace, report.pages, report.chunks, report.records
            );
        }
        Command::Context {
            key,
            question,
            top_k,
            max_bytes,
        } => {
            let context = chat
                .retrieve_context_with(
                    &question,
                    &key,
                    top_k.unwrap_or(config.retrieval.top_k),
                    max_bytes.unwrap_or(config.retrieval.max_context_bytes),
                )
                .await
                .with_context(|| format!("failed to retrieve context for {key}"))?;
            println!("{context}");
        }
        Command::Prompt { key, question } => {
            let context = chat.prompt_context(&question, &key).await;
            println!("{}", build_system_prompt(&context));
        }
        Command::Url { key } => println!("{}", chat.object_url(&key)),
    }
    Ok(())
}

fn init_subscriber() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ingest_with_global_config() {
        let cli = Cli::try_parse_from(["docchat", "ingest", "a.pdf", "--config", "x.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
        assert!(matches!(cli.command, Command::Ingest { key } if key == "a.pdf"));
    }

    #[test]
    fn parses_context_overrides() {
        let cli = Cli::try_parse_from([
            "docchat",
            "context",
            "a.pdf",
            "What is the refund policy?",
            "--top-k",
            "3",
            "--max-bytes",
            "500",
        ])
        .unwrap();
        match cli.command {
            Command::Context {
                key,
                question,
                top_k,
                max_bytes,
            } => {
                assert_eq!(key, "a.pdf");
                assert_eq!(question, "What is the refund policy?");
                assert_eq!(top_k, Some(3));
                assert_eq!(max_bytes, Some(500));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn context_requires_question() {
        assert!(Cli::try_parse_from(["docchat", "context", "a.pdf"]).is_err());
    }

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
