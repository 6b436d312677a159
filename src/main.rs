use clap::{Parser, Subcommand};
use dotenv::dotenv;
use rootstore_rs::persist::FileStorage;
use rootstore_rs::store::{Action, Command, StoreModule, StoreRegistry};

use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

const INCREMENT: &str = "INCREMENT";
const DECREMENT: &str = "DECREMENT";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path of the JSON file backing the durable medium
    #[arg(short, long, default_value = "rootstore.json")]
    store_file: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the counter state
    Show,
    /// Increment the counter
    Increment {
        /// Amount to add
        #[arg(short, long, default_value_t = 1)]
        by: i64,
    },
    /// Decrement the counter
    Decrement {
        /// Amount to subtract
        #[arg(short, long, default_value_t = 1)]
        by: i64,
    },
}

/// The demo reducer module: `count` resets every process, `lastCount`
/// survives restarts.
fn counter_module() -> StoreModule {
    StoreModule::new("counter")
        .default_state(json!({"count": 0, "lastCount": 0}))
        .persistent_props(["lastCount"])
        .reducer(|state, action| {
            let mut next = state.clone();
            let by = action.payload.as_i64().unwrap_or(0);
            let count = state.get("count").and_then(Value::as_i64).unwrap_or(0);
            let last = state.get("lastCount").and_then(Value::as_i64).unwrap_or(0);
            match action.kind.as_str() {
                INCREMENT => {
                    next.insert("count".to_string(), json!(count + by));
                    next.insert("lastCount".to_string(), json!(last + by));
                }
                DECREMENT => {
                    next.insert("count".to_string(), json!(count - by));
                    next.insert("lastCount".to_string(), json!(last - by));
                }
                _ => {}
            }
            next
        })
        .action("increment", |payload| {
            Command::Dispatch(Action::with_payload(INCREMENT, payload))
        })
        .action("decrement", |payload| {
            Command::Dispatch(Action::with_payload(DECREMENT, payload))
        })
}

fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();

    let storage = Arc::new(FileStorage::open(&args.store_file)?);
    log::info!("Using store file: {}", args.store_file);

    let mut other_data = HashMap::new();
    other_data.insert("config".to_string(), json!({"storeFile": args.store_file}));

    let registry = StoreRegistry::new();
    let store = registry.create_store("root", vec![counter_module()], other_data, storage);

    match args.command {
        Commands::Show => {}
        Commands::Increment { by } => {
            store.call("counter", "increment", json!(by))?;
            println!("Incremented by {}", by);
        }
        Commands::Decrement { by } => {
            store.call("counter", "decrement", json!(by))?;
            println!("Decremented by {}", by);
        }
    }

    let state = store
        .state("counter")
        .ok_or_else(|| anyhow::anyhow!("counter module missing"))?;
    println!(
        "count = {} (this run), lastCount = {} (survives restarts)",
        state.get("count").cloned().unwrap_or(Value::Null),
        state.get("lastCount").cloned().unwrap_or(Value::Null)
    );

    Ok(())
}
