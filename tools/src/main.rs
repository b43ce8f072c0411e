use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use ptdsave_tools::{decode_payload_json, inspect_mirror, PayloadKind};

#[derive(Parser)]
#[command(
    name = "ptdsave-tools",
    version,
    about = "ptdsave payload inspection and decoding tools"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply the substitution cipher to a payload.
    Encipher {
        /// The plain payload.
        payload: String,
    },
    /// Reverse the substitution cipher on a payload.
    Decipher {
        /// The cipher-encoded payload.
        payload: String,
    },
    /// Recompute the story checksum over a payload.
    Checksum {
        /// The cipher-encoded payload, without the salt.
        payload: String,
    },
    /// Decode a captured payload into structured JSON.
    Decode {
        /// The cipher-encoded payload.
        payload: String,
        /// Which payload this is.
        #[arg(long, value_enum, default_value_t = DecodeKind::Party)]
        kind: DecodeKind,
        /// Nickname for a payload position, as `<position>=<name>`. Repeatable.
        #[arg(long = "nick")]
        nicks: Vec<String>,
    },
    /// Summarize a store mirror file.
    Inspect {
        /// Path to the mirror JSON file.
        mirror_path: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DecodeKind {
    Party,
    Items,
    Extras,
}

impl From<DecodeKind> for PayloadKind {
    fn from(kind: DecodeKind) -> Self {
        match kind {
            DecodeKind::Party => Self::Party,
            DecodeKind::Items => Self::Items,
            DecodeKind::Extras => Self::Extras,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Encipher { payload } => {
            println!("{}", wire::encipher(&payload));
        }
        Command::Decipher { payload } => {
            println!("{}", wire::decipher(&payload));
        }
        Command::Checksum { payload } => {
            let salt = wire::encipher("12345");
            let checksum = wire::story_checksum(&format!("{payload}{salt}"));
            println!("{}", wire::encipher(&checksum.to_string()));
        }
        Command::Decode {
            payload,
            kind,
            nicks,
        } => {
            let nicknames = parse_nicks(&nicks)?;
            let value = decode_payload_json(kind.into(), &payload, &nicknames)?;
            let json = serde_json::to_string_pretty(&value).context("serialize json")?;
            println!("{json}");
        }
        Command::Inspect { mirror_path } => {
            let report = inspect_mirror(&mirror_path)?;
            println!("{} records", report.records);
            for key in &report.keys {
                println!("  {key}");
            }
        }
    }
    Ok(())
}

fn parse_nicks(nicks: &[String]) -> Result<BTreeMap<u64, String>> {
    let mut nicknames = BTreeMap::new();
    for nick in nicks {
        let (position, name) = nick
            .split_once('=')
            .with_context(|| format!("--nick {nick:?} is not <position>=<name>"))?;
        let position: u64 = position
            .parse()
            .with_context(|| format!("--nick position {position:?} is not a number"))?;
        nicknames.insert(position, name.to_owned());
    }
    Ok(nicknames)
}
