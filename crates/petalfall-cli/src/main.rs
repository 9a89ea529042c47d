//! Petalfall CLI - headless driver for the petal simulation

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{config, simulate, tree};

#[derive(Parser)]
#[command(name = "petalfall")]
#[command(about = "Falling-petal simulation driver", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the simulation headless at a fixed frame rate and print statistics
    Simulate {
        /// Simulation config (TOML); defaults are used when omitted
        #[arg(long)]
        config: Option<String>,

        /// Tree config (TOML)
        #[arg(long)]
        tree: Option<String>,

        /// Seed for tree generation and the simulation
        #[arg(long)]
        seed: Option<u32>,

        /// Simulated seconds to run
        #[arg(long, default_value = "60")]
        seconds: f32,

        /// Fixed frame rate
        #[arg(long, default_value = "60")]
        fps: u32,

        /// Keep running past `seconds` until shutdown is requested
        #[arg(long)]
        until_shutdown: bool,

        /// Pace frames to the wall clock and step by measured frame time
        #[arg(long)]
        realtime: bool,

        /// Raise the rise pulse every N seconds
        #[arg(long)]
        rise_every: Option<f32>,

        /// Observer position (comma-separated x,y,z)
        #[arg(long, value_parser = parse_vec3, default_value = "0,1.7,-8", allow_hyphen_values = true)]
        observer: [f32; 3],

        /// Directory with a/, b/, c/, d/ one-shot folders plus optional
        /// noise.ogg and pads/ (requires the `kira` feature)
        #[arg(long)]
        audio: Option<String>,
    },

    /// Generate a tree and print its statistics
    Tree {
        /// Tree config (TOML)
        #[arg(long)]
        config: Option<String>,

        /// Generation seed
        #[arg(long)]
        seed: Option<u32>,
    },

    /// Print the default configuration as TOML
    Config {
        /// Print the tree config instead of the simulation config
        #[arg(long)]
        tree: bool,
    },
}

fn parse_vec3(s: &str) -> Result<[f32; 3], String> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 3 {
        return Err(format!("expected 3 comma-separated values, got {}", parts.len()));
    }
    let x: f32 = parts[0].trim().parse().map_err(|e| format!("invalid x: {}", e))?;
    let y: f32 = parts[1].trim().parse().map_err(|e| format!("invalid y: {}", e))?;
    let z: f32 = parts[2].trim().parse().map_err(|e| format!("invalid z: {}", e))?;
    Ok([x, y, z])
}

/// Log level requested by `-v` repetitions; `None` leaves `RUST_LOG` in charge
fn verbosity_filter(verbose: u8) -> Option<log::LevelFilter> {
    match verbose {
        0 => None,
        1 => Some(log::LevelFilter::Info),
        2 => Some(log::LevelFilter::Debug),
        _ => Some(log::LevelFilter::Trace),
    }
}

/// `RUST_LOG` (default `warn`), overridden by `-v` when given
fn logger(verbose: u8) -> env_logger::Builder {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if let Some(level) = verbosity_filter(verbose) {
        builder.filter_level(level);
    }
    builder
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logger(cli.verbose).init();

    match cli.command {
        Commands::Simulate {
            config,
            tree,
            seed,
            seconds,
            fps,
            until_shutdown,
            realtime,
            rise_every,
            observer,
            audio,
        } => simulate::run(simulate::SimulateArgs {
            config,
            tree,
            seed,
            seconds,
            fps,
            until_shutdown,
            realtime,
            rise_every,
            observer,
            audio,
        }),
        Commands::Tree { config, seed } => tree::run(config.as_deref(), seed),
        Commands::Config { tree } => config::run(tree),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_vec3_accepts_spaces() {
        assert_eq!(parse_vec3("1, 2.5 ,-3").unwrap(), [1.0, 2.5, -3.0]);
        assert!(parse_vec3("1,2").is_err());
        assert!(parse_vec3("a,b,c").is_err());
    }

    #[test]
    fn verbose_flag_raises_log_level() {
        assert_eq!(verbosity_filter(0), None);
        assert_eq!(verbosity_filter(1), Some(log::LevelFilter::Info));
        assert_eq!(verbosity_filter(2), Some(log::LevelFilter::Debug));
        assert_eq!(verbosity_filter(5), Some(log::LevelFilter::Trace));

        let cli = Cli::try_parse_from(["petalfall", "-vv", "config"]).unwrap();
        assert_eq!(verbosity_filter(cli.verbose), Some(log::LevelFilter::Debug));
    }

    #[test]
    fn simulate_accepts_realtime_and_negative_observer() {
        let cli = Cli::try_parse_from(["petalfall", "simulate", "--realtime", "--observer", "-1,2,-3"]).unwrap();
        match cli.command {
            Commands::Simulate {
                realtime, observer, ..
            } => {
                assert!(realtime);
                assert_eq!(observer, [-1.0, 2.0, -3.0]);
            }
            _ => panic!("expected simulate"),
        }
    }

    #[test]
    fn verbose_level_reaches_the_logger() {
        let logger = logger(1).build();
        let metadata = log::Metadata::builder()
            .level(log::Level::Info)
            .target("petalfall_sim")
            .build();
        assert!(log::Log::enabled(&logger, &metadata));
        assert_eq!(logger.filter(), log::LevelFilter::Info);
    }
}
