use std::{
    fs,
    io::{self, Read, Write},
};

use clap::{Parser as ClapParser, Subcommand};
use selector_lang::{
    cli::{self, CliError, QueryOptions, QueryResult},
    format::Format,
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(ClapParser)]
#[command(name = "sel")]
#[command(about = "sel - query and modify structured documents with selectors")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a selector against a document
    Query {
        /// The selector to execute
        selector: String,

        /// Document input (reads from stdin if neither this nor --file is given)
        #[arg(short, long, conflicts_with = "file")]
        input: Option<String>,

        /// Read the document from a file
        #[arg(short, long)]
        file: Option<String>,

        /// Input format
        #[arg(short, long, default_value = "json")]
        read: Format,

        /// Output format
        #[arg(short, long, default_value = "json")]
        write: Format,

        /// Single-line output
        #[arg(long)]
        compact: bool,

        /// Only validate syntax, don't execute
        #[arg(long)]
        syntax_only: bool,
    },
}

fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Query {
            selector,
            input,
            file,
            read,
            write,
            compact,
            syntax_only,
        } => read_input(input, file).and_then(|input| {
            run_query(QueryOptions {
                selector,
                input,
                read,
                write,
                compact,
                syntax_only,
            })
        }),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn read_input(input: Option<String>, file: Option<String>) -> Result<Option<String>, CliError> {
    match (input, file) {
        (Some(s), _) => Ok(Some(s)),
        (None, Some(path)) => Ok(Some(fs::read_to_string(path)?)),
        (None, None) if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(Some(buffer))
        }
        (None, None) => Ok(None),
    }
}

fn run_query(options: QueryOptions) -> Result<(), CliError> {
    match cli::execute_query(&options)? {
        QueryResult::SyntaxValid => println!("Syntax is valid"),
        QueryResult::Output(bytes) => io::stdout().write_all(&bytes)?,
    }
    Ok(())
}
