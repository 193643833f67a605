//! CLI for trustgate — craft signed frames and drive the real-time
//! actuation pipeline against a simulated rig.

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "trustgate")]
#[command(about = "trustgate — safety-gated actuation pipeline toolkit")]
#[command(version = trustgate_core::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build one encrypted, MAC'd intent frame
    Craft {
        /// Sequence number
        #[arg(long, default_value = "1")]
        seq: u32,

        /// Timestamp in milliseconds
        #[arg(long, default_value = "0")]
        t_ms: u32,

        /// Intent: noop, brake, move, turn
        #[arg(long, default_value = "noop")]
        intent: String,

        /// Action parameter (interpretation depends on intent)
        #[arg(long, default_value = "0")]
        v0: i16,

        /// Confidence in [0.0, 1.0]
        #[arg(long, default_value = "1.0")]
        confidence: f32,

        /// Write raw 64 bytes to this path instead of printing hex
        #[arg(long)]
        output: Option<String>,
    },

    /// Run N synthetic cycles through the real-time loop against a simulated HAL
    Sim {
        /// Number of cycles to run
        #[arg(long, default_value = "10")]
        count: u32,

        /// Replay the previous frame at this cycle (1-indexed)
        #[arg(long)]
        replay_at: Option<u32>,

        /// Flip a ciphertext bit at this cycle, forcing a MAC failure
        #[arg(long)]
        bitflip_at: Option<u32>,

        /// Send a zero-confidence frame at this cycle, forcing a gate denial
        #[arg(long)]
        low_confidence_at: Option<u32>,
    },

    /// Decode the plaintext header fields of a 64-byte frame
    Inspect {
        /// Frame as a hex string
        hex: Option<String>,

        /// Path to a 64-byte raw frame file
        #[arg(long)]
        file: Option<String>,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Craft {
            seq,
            t_ms,
            intent,
            v0,
            confidence,
            output,
        } => commands::craft::run(commands::craft::CraftConfig {
            seq,
            t_ms,
            intent: &intent,
            v0,
            confidence,
            output: output.as_deref(),
        }),
        Commands::Sim {
            count,
            replay_at,
            bitflip_at,
            low_confidence_at,
        } => commands::sim::run(commands::sim::SimConfig {
            count,
            replay_at,
            bitflip_at,
            low_confidence_at,
        }),
        Commands::Inspect { hex, file } => commands::inspect::run(hex.as_deref(), file.as_deref()),
    }
}
