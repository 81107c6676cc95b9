//! `Ephrem` - resolve scripture citations and print API.Bible passages.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use ephrem::api_bible::ContentType;
use ephrem::config::{split_list, Config};
use ephrem::{FetchOptions, ResolveOptions, Session};

#[derive(Parser, Debug)]
#[command(name = "ephrem", version, about = "Resolve scripture citations against API.Bible")]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Download bibles and book names for the given languages
    Setup {
        /// Comma-separated ISO 639-3 language ids (defaults to EPHREM_LANGUAGES)
        #[arg(short, long)]
        languages: Option<String>,
    },
    /// Print the canonical references and passage ids of citations
    Resolve {
        /// Citations, e.g. "John 3:16-20 (KJV, BSB); Gen 1"
        input: String,
        #[command(flatten)]
        resolve: ResolveArgs,
    },
    /// Print the passages of citations
    Passage {
        /// Citations, e.g. "John 3:16-20 (KJV)"
        input: String,
        /// Fetch even when the passage is cached
        #[arg(long)]
        force: bool,
        /// Content format: text, html, or json
        #[arg(long, value_parser = parse_content_type)]
        content_type: Option<ContentType>,
        #[command(flatten)]
        resolve: ResolveArgs,
    },
}

#[derive(Args, Debug)]
struct ResolveArgs {
    /// Comma-separated language ids used to identify book names
    #[arg(short, long)]
    languages: Option<String>,
    /// Separator between citations
    #[arg(short, long)]
    delimiter: Option<String>,
    /// Do not fall back to the majority book id
    #[arg(long)]
    no_fallback: bool,
    /// Refetch bibles and book names before resolving
    #[arg(long)]
    refresh: bool,
}

impl ResolveArgs {
    fn apply(&self, mut options: ResolveOptions) -> ResolveOptions {
        if let Some(languages) = &self.languages {
            options.languages = split_list(languages);
        }
        if let Some(delimiter) = &self.delimiter {
            options.delimiter.clone_from(delimiter);
        }
        options.use_majority_fallback &= !self.no_fallback;
        options.force_update_cache = self.refresh;
        options
    }
}

fn parse_content_type(value: &str) -> std::result::Result<ContentType, String> {
    ContentType::parse(value).ok_or_else(|| format!("unknown content type {value:?}"))
}

fn init_logging(verbose: bool) {
    let fallback = if verbose { "ephrem=debug" } else { "ephrem=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_content(content: &Value) -> Result<()> {
    match content {
        Value::String(text) => println!("{}", text.trim()),
        other => println!("{}", serde_json::to_string_pretty(other)?),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load().context("Failed to load configuration")?;
    let mut session = Session::open(config).await?;

    match cli.command {
        Command::Setup { languages } => {
            let languages = languages.as_deref().map(split_list).unwrap_or_default();
            session.setup(&languages).await?;
            println!(
                "Cached {} bible abbreviations in {}",
                session.bibles().bibles.len(),
                session.cache_dir().display()
            );
        }
        Command::Resolve { input, resolve } => {
            let options = resolve.apply(session.resolve_options());
            for group in session.resolve(&input, &options).await? {
                println!("{}", group.citation);
                for reference in &group.references {
                    println!("  {reference}  {}", reference.passage_id());
                }
            }
        }
        Command::Passage {
            input,
            force,
            content_type,
            resolve,
        } => {
            let options = resolve.apply(session.resolve_options());
            let mut fetch = FetchOptions::new(session.config().passage_options);
            fetch.force_fetch = force;
            if let Some(content_type) = content_type {
                fetch.passage.content_type = content_type;
            }

            for group in session.get_passages(&input, &fetch, &options).await? {
                for resolved in &group.passages {
                    let data = &resolved.passage.data;
                    println!("== {} ({}) ==", data.reference, resolved.reference.bible);
                    print_content(&data.content)?;
                    if !data.copyright.is_empty() {
                        println!("{}", data.copyright.trim());
                    }
                    println!();
                }
            }
        }
    }

    Ok(())
}
