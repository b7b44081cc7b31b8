//! Housing CLI Client
//!
//! Command-line interface for querying the app server.

use std::time::Duration;
use clap::{Parser, Subcommand};
use housing::client::Client;
use housing::config::DEFAULT_APP_ADDR;
use housing::protocol::{encode_record, Response};
use tracing_subscriber::{fmt, EnvFilter};

/// Housing CLI
#[derive(Parser, Debug)]
#[command(name = "housing-cli")]
#[command(about = "CLI for the housing search service")]
struct Args {
    /// App server address
    #[arg(short, long, default_value = DEFAULT_APP_ADDR)]
    server: String,

    /// Response timeout in milliseconds
    #[arg(short, long, default_value = "10000")]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List all available listings
    List,

    /// Search by city and/or max price
    Search {
        /// City to match (case-insensitive)
        #[arg(short, long)]
        city: Option<String>,

        /// Maximum price (inclusive)
        #[arg(short, long)]
        max_price: Option<u64>,
    },

    /// Send a raw command line and print the raw response
    Send {
        /// The command line, e.g. "SEARCH city=Irvine"
        line: String,
    },
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> housing::Result<()> {
    let timeout = (args.timeout_ms > 0).then(|| Duration::from_millis(args.timeout_ms));
    let mut client = Client::connect(&args.server, timeout)?;

    match args.command {
        Commands::List => print_response(&client.list()?),
        Commands::Search { city, max_price } => {
            print_response(&client.search(city.as_deref(), max_price)?)
        }
        Commands::Send { line } => print!("{}", client.send_raw(&line)?),
    }

    client.quit()
}

fn print_response(response: &Response) {
    match response {
        Response::Results(listings) => {
            println!("{} listing(s)", listings.len());
            for listing in listings {
                println!("  {}", encode_record(listing));
            }
        }
        Response::Error(message) => println!("ERROR {}", message),
        Response::Bye => println!("Session closed"),
    }
}
