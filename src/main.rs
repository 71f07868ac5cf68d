//! Crofthold - Entry Point
//!
//! Builds the world (optionally seeded with the starting settlement),
//! attaches the standard views, and runs the read-eval loop: one command per
//! line, one discrete tick per `go`.

use clap::Parser;
use crofthold::command::{self, CommandExecutor, Outcome};
use crofthold::core::config::WorldConfig;
use crofthold::core::error::Result;
use crofthold::world::World;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "crofthold", about = "Tick-driven settlement simulation")]
struct Args {
    /// Path to a TOML config overriding the default tuning constants
    #[arg(long)]
    config: Option<PathBuf>,

    /// Tracing filter for log output
    #[arg(long, default_value = "crofthold=warn")]
    log_filter: String,

    /// Start with an empty world instead of the default settlement
    #[arg(long)]
    empty: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(args.log_filter.as_str())
        .with_target(false)
        .init();

    let config = match &args.config {
        Some(path) => WorldConfig::load(path)?,
        None => WorldConfig::default(),
    };
    let mut world = if args.empty {
        World::new(config)?
    } else {
        World::with_default_settlement(config)?
    };
    let executor = CommandExecutor::new(&mut world);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("\nTime {}: Enter command: ", world.time());
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match command::parse(input, &world).and_then(|c| executor.execute(&mut world, c)) {
            Ok(Outcome::Quit) => {
                println!("Done");
                break;
            }
            Ok(Outcome::Continue) => {}
            Err(error) => println!("{}", error),
        }
    }
    Ok(())
}
