//! cidkv CLI
//!
//! Command-line access to a SQLite-backed cidkv database.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use cidkv::config::parse_codec;
use cidkv::{keccak256, CidKvError, Config, Database, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// cidkv CLI
#[derive(Parser, Debug)]
#[command(name = "cidkv-cli")]
#[command(about = "Key-value access to a content-addressed block store")]
#[command(version)]
struct Args {
    /// SQLite database file
    #[arg(short, long, default_value = "./cidkv.db")]
    db: PathBuf,

    /// Multicodec tag for derived CIDs (decimal or 0x-hex)
    #[arg(short, long, default_value = "0x96")]
    codec: String,

    /// Reject puts whose key is not keccak-256(value)
    #[arg(long)]
    verify: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the CID for a key
    Cid {
        /// Key (hex)
        key: String,
    },

    /// Store a value; the key defaults to keccak-256(value)
    Put {
        /// Value (hex)
        value: String,

        /// Key (hex)
        #[arg(short, long)]
        key: Option<String>,
    },

    /// Get a value by key
    Get {
        /// Key (hex)
        key: String,
    },

    /// Check whether a key is stored locally
    Has {
        /// Key (hex)
        key: String,
    },

    /// Delete a key
    Del {
        /// Key (hex)
        key: String,
    },

    /// List indexed keys in order
    Iter {
        /// Key prefix (hex)
        #[arg(short, long, default_value = "")]
        prefix: String,

        /// Start after prefix ++ start (hex)
        #[arg(short, long, default_value = "")]
        start: String,

        /// Maximum number of pairs to print
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Print a database property
    Stat {
        /// Property name ("exchange" or "online")
        property: String,
    },
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,cidkv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let config = Config::builder()
        .codec(parse_codec(&args.codec)?)
        .verify_digests(args.verify)
        .build();

    let db = Database::open_path(&args.db, config)?;

    match args.command {
        Commands::Cid { key } => {
            println!("{}", db.deriver().derive(&decode_hex(&key)?)?);
        }
        Commands::Put { value, key } => {
            let value = decode_hex(&value)?;
            let key = match key {
                Some(key) => decode_hex(&key)?,
                None => keccak256(&value).to_vec(),
            };
            db.put(&key, &value)?;
            println!("{}", hex::encode(&key));
        }
        Commands::Get { key } => {
            let value = db.get(&decode_hex(&key)?)?;
            println!("{}", hex::encode(value));
        }
        Commands::Has { key } => {
            println!("{}", db.has(&decode_hex(&key)?)?);
        }
        Commands::Del { key } => {
            db.delete(&decode_hex(&key)?)?;
        }
        Commands::Iter {
            prefix,
            start,
            limit,
        } => {
            let mut iter = db.new_iterator(&decode_hex(&prefix)?, &decode_hex(&start)?);
            let mut printed = 0;
            while limit.map_or(true, |limit| printed < limit) && iter.next() {
                if let (Some(key), Some(value)) = (iter.key(), iter.value()) {
                    println!("{} {}", hex::encode(key), hex::encode(value));
                }
                printed += 1;
            }
            if let Some(e) = iter.error() {
                tracing::warn!("iteration stopped early: {}", e);
            }
            iter.release();
        }
        Commands::Stat { property } => {
            println!("{}", db.stat(&property)?);
        }
    }

    db.close()
}

fn decode_hex(input: &str) -> Result<Vec<u8>> {
    let digits = input.strip_prefix("0x").unwrap_or(input);
    hex::decode(digits).map_err(|e| CidKvError::InvalidKey(format!("{:?}: {}", input, e)))
}
