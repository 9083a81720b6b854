//! fairplay CLI
//!
//! Run the casino API, mint a committed seed, or verify and replay a round
//! from its revealed seed without any server.

use clap::{Parser, Subcommand};
use fairplay::{
    api::ApiServer,
    build_service,
    config::{ConfigLoader, DeckMode},
    fairness::{self, RevealedSeed},
    games::{replay, ChickenDifficulty, ReplayRequest, TowersDifficulty},
    logging::init_tracing,
};
use serde::de::DeserializeOwned;
use std::{path::PathBuf, process::ExitCode, sync::Arc};

/// Provably fair casino engine
#[derive(Parser)]
#[command(name = "fairplay")]
#[command(about = "Provably fair casino engine: serve rounds, verify and replay them")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Configuration file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override the configured listen host
        #[arg(long)]
        host: Option<String>,

        /// Override the configured listen port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Generate a fresh committed seed and print all of its parts
    Seed,

    /// Check a commitment hash against revealed seed parts
    Verify {
        #[command(flatten)]
        seed: SeedArgs,
    },

    /// Recompute a round's outcome from its revealed seed
    Replay {
        #[command(flatten)]
        seed: SeedArgs,

        #[command(subcommand)]
        game: ReplayGame,
    },
}

#[derive(clap::Args)]
struct SeedArgs {
    #[arg(long)]
    server_seed: String,

    #[arg(long)]
    client_seed: String,

    #[arg(long)]
    nonce: String,

    /// Commitment hash shown before the round
    #[arg(long)]
    hash: String,
}

#[derive(Subcommand)]
enum ReplayGame {
    Coinflip,
    Slots,
    Crash {
        #[arg(long, default_value_t = fairness::generators::DEFAULT_CRASH_HOUSE_EDGE)]
        house_edge: f64,
    },
    Mines {
        #[arg(long)]
        mines: u8,

        #[arg(long, default_value_t = 25)]
        board: u8,
    },
    Towers {
        #[arg(long, value_parser = parse_lowercase::<TowersDifficulty>)]
        difficulty: TowersDifficulty,

        #[arg(long, default_value_t = 8)]
        rows: u8,
    },
    Blackjack {
        /// Total cards dealt in the round
        #[arg(long, default_value_t = 4)]
        cards: usize,

        /// Round was dealt from a shuffled deck
        #[arg(long)]
        shuffled: bool,
    },
    Chicken {
        #[arg(long, value_parser = parse_lowercase::<ChickenDifficulty>)]
        difficulty: ChickenDifficulty,

        #[arg(long, default_value_t = 20)]
        max_steps: u32,
    },
}

impl From<ReplayGame> for ReplayRequest {
    fn from(game: ReplayGame) -> Self {
        match game {
            ReplayGame::Coinflip => ReplayRequest::CoinFlip,
            ReplayGame::Slots => ReplayRequest::Slots,
            ReplayGame::Crash { house_edge } => ReplayRequest::Crash { house_edge },
            ReplayGame::Mines { mines, board } => ReplayRequest::Mines {
                mine_count: mines,
                board_size: board,
            },
            ReplayGame::Towers { difficulty, rows } => ReplayRequest::Towers { difficulty, rows },
            ReplayGame::Blackjack { cards, shuffled } => ReplayRequest::Blackjack {
                cards,
                deck_mode: if shuffled {
                    DeckMode::Shuffled
                } else {
                    DeckMode::IndependentDraws
                },
            },
            ReplayGame::Chicken {
                difficulty,
                max_steps,
            } => ReplayRequest::Chicken {
                difficulty,
                max_steps,
            },
        }
    }
}

/// Parse a lowercase serde enum name such as `expert`
fn parse_lowercase<T: DeserializeOwned>(s: &str) -> Result<T, String> {
    serde_json::from_value(serde_json::Value::String(s.to_lowercase())).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config, host, port } => {
            serve(config, host, port).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Seed => {
            let seed = fairness::create_seed()?;
            println!("{}", serde_json::to_string_pretty(&seed.reveal())?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Verify { seed } => {
            let valid = fairness::verify(&seed.server_seed, &seed.client_seed, &seed.nonce, &seed.hash);
            println!("{}", if valid { "valid" } else { "INVALID" });
            Ok(if valid { ExitCode::SUCCESS } else { ExitCode::FAILURE })
        }
        Commands::Replay { seed, game } => {
            let nonce = fairness::parse_nonce(&seed.nonce)
                .ok_or_else(|| format!("nonce must be a plain decimal integer, got '{}'", seed.nonce))?;
            let revealed = RevealedSeed {
                server_seed: seed.server_seed,
                client_seed: seed.client_seed,
                nonce,
                commitment_hash: seed.hash,
            };

            let report = replay(&revealed, &game.into())?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            if !report.commitment_valid {
                eprintln!("commitment hash does not match the revealed seed");
                return Ok(ExitCode::FAILURE);
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn serve(
    config_path: Option<PathBuf>,
    host: Option<String>,
    port: Option<u16>,
) -> Result<(), Box<dyn std::error::Error>> {
    let loader = match config_path {
        Some(path) => ConfigLoader::new().with_path(path),
        None => ConfigLoader::new(),
    };
    let mut config = loader.load()?;
    if let Some(host) = host {
        config.api.host = host;
    }
    if let Some(port) = port {
        config.api.port = port;
    }

    init_tracing(&config.logging);
    tracing::info!(
        crash_edge = config.fairness.crash_house_edge,
        deck = ?config.fairness.blackjack_deck,
        "Configuration loaded"
    );

    let api_config = config.api.clone();
    let service = Arc::new(build_service(config)?);
    ApiServer::new(api_config, service).run().await
}
