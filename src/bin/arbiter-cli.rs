//! Developer debugging harness for the arbiter (SPEC_FULL.md §6): loads
//! a scenario file and prints the grant/wait decision for its queued
//! builds. Not a CRUD surface over resources — that is out of scope
//! per spec.md's Non-goals.

use std::sync::Arc;

use clap::Parser;
use shared_resource_arbiter::affinity::ResourceAffinity;
use shared_resource_arbiter::arbiter::Arbiter;
use shared_resource_arbiter::config::StaticConfig;
use shared_resource_arbiter::loader::scenario::load_scenario_file;
use shared_resource_arbiter::logger;
use shared_resource_arbiter::store::{LockStore, MemoryLockStore};

#[derive(Parser, Debug)]
#[command(name = "arbiter-cli", about = "Replay a shared-resource scenario against the arbiter")]
struct Cli {
    /// Path to a scenario JSON file (SPEC_FULL.md §6).
    scenario: String,

    /// Only evaluate the queued build with this id, instead of all of them.
    #[arg(long)]
    build: Option<String>,

    /// Decide without reserving Custom values or stamping attributes.
    #[arg(long)]
    emulate: bool,

    /// Disable the build-chain composition rule for this run.
    #[arg(long)]
    no_chains: bool,
}

fn main() {
    logger::init();

    let cli = Cli::parse();

    let scenario = match load_scenario_file(&cli.scenario) {
        Ok(s) => s,
        Err(err) => {
            eprintln!("failed to load scenario '{}': {err}", cli.scenario);
            std::process::exit(1);
        }
    };

    let lock_store: Arc<dyn LockStore> = Arc::new(MemoryLockStore::new());
    let config = Arc::new(StaticConfig { resources_in_chains_enabled: !cli.no_chains });
    let arbiter = Arbiter::new(scenario.registry, lock_store, ResourceAffinity::new(), config);

    let targets: Vec<_> = match &cli.build {
        Some(id) => scenario.queued.iter().filter(|b| b.promotion_id().as_str() == id).cloned().collect(),
        None => scenario.queued.clone(),
    };

    if targets.is_empty() {
        eprintln!("no matching queued build in scenario");
        std::process::exit(1);
    }

    for build in &targets {
        match arbiter.arbitrate(build, &scenario.running, &scenario.queued, cli.emulate) {
            None => println!("{}: GRANTED", build.promotion_id()),
            Some(reason) => println!("{}: WAITING — {reason}", build.promotion_id()),
        }
    }
}
