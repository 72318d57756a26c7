use pokesim::{run, RunnerOptions};
use std::env;

fn usage() -> ! {
    eprintln!(
        "Usage: cargo run --release -- [--battles N] [--seed SEED] [--max-turns N] [--doubles] [--verify-replays]"
    );
    std::process::exit(1);
}

fn parse_args() -> anyhow::Result<RunnerOptions> {
    let mut options = RunnerOptions::default();
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--battles" => {
                let val = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--battles requires a number"))?;
                options.battles = val.parse()?;
            }
            "--seed" => {
                let val = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--seed requires a number"))?;
                options.base_seed = val.parse()?;
            }
            "--max-turns" => {
                let val = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--max-turns requires a number"))?;
                options.max_turns = val.parse()?;
            }
            "--doubles" => options.doubles = true,
            "--verify-replays" => options.verify_replays = true,
            "--help" | "-h" => usage(),
            other => return Err(anyhow::anyhow!("Unknown argument {other}")),
        }
    }
    Ok(options)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
    let options = parse_args()?;
    let summary = run(&options)?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
