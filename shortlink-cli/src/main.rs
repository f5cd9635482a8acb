//! Shortlink CLI - run and inspect the URL shortener.
//!
//! ```bash
//! shortlink serve --port 8000
//! shortlink encode 125
//! shortlink decode 21
//! ```
//!
//! See `shortlink --help` for all available commands and options.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "shortlink", about = "LRU-cached URL shortener", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Config file (default: shortlink.toml, if present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Bind host, overrides config and SL_HOST
        #[arg(long)]
        host: Option<String>,

        /// Bind port, overrides config and SL_PORT
        #[arg(short, long)]
        port: Option<u16>,

        /// Public prefix of short URLs, overrides config and SL_BASE_URL
        #[arg(long)]
        base_url: Option<String>,
    },
    /// Print the Base62 code for a number
    Encode {
        number: u64,
    },
    /// Print the number behind a Base62 code
    Decode {
        code: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve {
            config,
            host,
            port,
            base_url,
        } => commands::serve::run(commands::serve::ServeArgs {
            config,
            host,
            port,
            base_url,
        })
        .map_err(|e| format!("{:#}", e)),
        Commands::Encode { number } => {
            println!("{}", commands::codec::encode(number));
            Ok(())
        }
        Commands::Decode { code } => commands::codec::decode(&code).map(|n| println!("{}", n)),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
