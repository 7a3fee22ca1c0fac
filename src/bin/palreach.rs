//! palreach CLI
//!
//! Loads a JSON rule set and prints every species reachable from an owned list.

use std::path::PathBuf;
use std::process::exit;

use tracing_subscriber::EnvFilter;

use palreach::{
    EngineConfig, Entity, EntityId, PairStrategy, ProductionTable, ReachabilityEngine, RuleSet,
    ValidationError,
};

/// CLI configuration
struct Config {
    /// Rule-set document
    rules: PathBuf,
    /// Owned species names; repeats count as extra instances
    owned: Vec<String>,
    /// Engine settings
    engine: EngineConfig,
    /// Emit JSON instead of text
    json: bool,
}

fn usage() {
    println!("palreach - breeding reachability calculator");
    println!();
    println!("USAGE:");
    println!("    palreach --rules <FILE> --owned <NAME[,NAME...]> [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    -r, --rules <FILE>          JSON rule set");
    println!("    -o, --owned <NAMES>         Comma-separated owned species (repeatable)");
    println!("    -w, --workers <N>           Evaluation workers [default: all cores]");
    println!("        --strategy <S>          full | frontier [default: full]");
    println!("        --max-iterations <N>    Abort after N iterations");
    println!("        --timeout-ms <MS>       Abort after MS milliseconds");
    println!("        --json                  Print a JSON summary");
    println!("    -h, --help                  Print help information");
    println!();
    println!("Log level is read from PALREACH_LOG (default: warn).");
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("error: {message}");
    exit(1);
}

fn value<'a>(args: &'a [String], i: usize, flag: &str) -> &'a str {
    match args.get(i + 1) {
        Some(v) => v.as_str(),
        None => fail(format!("{flag} requires a value")),
    }
}

fn number<T: std::str::FromStr>(raw: &str, flag: &str) -> T {
    raw.parse().unwrap_or_else(|_| fail(format!("invalid value for {flag}: {raw}")))
}

fn name_of(table: &ProductionTable, id: EntityId) -> &str {
    table.entity(id).map_or("?", |e| e.name.as_str())
}

fn parse_args() -> Config {
    let args: Vec<String> = std::env::args().collect();
    let mut rules = None;
    let mut owned = Vec::new();
    let mut engine = EngineConfig::default();
    let mut json = false;

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--rules" | "-r" => {
                rules = Some(PathBuf::from(value(&args, i, flag)));
                i += 2;
            }
            "--owned" | "-o" => {
                owned.extend(
                    value(&args, i, flag)
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string),
                );
                i += 2;
            }
            "--workers" | "-w" => {
                engine.workers = number(value(&args, i, flag), flag);
                i += 2;
            }
            "--strategy" => {
                engine.pair_strategy = match value(&args, i, flag) {
                    "full" => PairStrategy::Full,
                    "frontier" => PairStrategy::Frontier,
                    other => fail(format!("unknown strategy: {other}")),
                };
                i += 2;
            }
            "--max-iterations" => {
                engine.max_iterations = Some(number(value(&args, i, flag), flag));
                i += 2;
            }
            "--timeout-ms" => {
                engine.timeout_ms = Some(number(value(&args, i, flag), flag));
                i += 2;
            }
            "--json" => {
                json = true;
                i += 1;
            }
            "--help" | "-h" => {
                usage();
                exit(0);
            }
            arg => fail(format!("unknown argument: {arg}")),
        }
    }

    let Some(rules) = rules else {
        fail("--rules is required");
    };
    Config {
        rules,
        owned,
        engine,
        json,
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_env("PALREACH_LOG").unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let config = parse_args();

    let text = std::fs::read_to_string(&config.rules)?;
    let table = RuleSet::from_json(&text)?.into_table()?;

    let owned = config
        .owned
        .iter()
        .map(|name| {
            table
                .entity_by_name(name)
                .cloned()
                .ok_or_else(|| ValidationError::UnknownEntity { name: name.clone() })
        })
        .collect::<Result<Vec<Entity>, _>>()?;

    let engine = ReachabilityEngine::new(config.engine)?;
    let reachable = engine.compute(&table, owned)?;

    if config.json {
        println!("{}", serde_json::to_string_pretty(&reachable)?);
        return Ok(());
    }

    for discovery in reachable.discoveries() {
        println!(
            "+ {} (iteration {}, from {} x {})",
            discovery.entity.name,
            discovery.iteration,
            name_of(&table, discovery.parents.0),
            name_of(&table, discovery.parents.1)
        );
    }
    println!(
        "{} reachable, {} new, {} iterations, {} pairs",
        reachable.len(),
        reachable.discoveries().len(),
        reachable.iterations(),
        reachable.pairs_evaluated()
    );
    Ok(())
}
