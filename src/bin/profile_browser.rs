//! Minimal command-line view over a `ProfileStore`: load once, filter,
//! print the resulting state.
//!
//! ```text
//! profile-browser --query al
//! RUST_LOG=profile_store=debug profile-browser --base-url http://localhost:3000 --json
//! ```

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use profile_store::{HttpProfileSource, LoadOutcome, ProfileStore, StoreConfig, ViewState};

#[derive(Parser, Debug)]
#[command(name = "profile-browser", about = "Fetch, filter and print user profiles")]
struct Args {
    /// JSON config file; flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Base URL of the profile service.
    #[arg(long)]
    base_url: Option<String>,

    /// Case-insensitive name filter, applied to the fetched list.
    #[arg(long, short, default_value = "")]
    query: String,

    /// Give up on the fetch after this many seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Print the final state as JSON.
    #[arg(long)]
    json: bool,
}

impl Args {
    fn store_config(&self) -> Result<StoreConfig> {
        let mut config = match &self.config {
            Some(path) => StoreConfig::load(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => StoreConfig::default(),
        };
        if let Some(base_url) = &self.base_url {
            config.source.base_url = base_url.clone();
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_fetch_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let args = Args::parse();
    let config = args.store_config()?;
    info!(url = %config.source.users_url(), query = %args.query, "starting");

    let source = HttpProfileSource::from_config(&config.source)?;
    let store = ProfileStore::builder(source).config(config).build();

    // The query is active immediately, so the load below already applies it.
    store.set_query(args.query.as_str());
    let outcome = store.load().outcome().await;
    info!(?outcome, "load finished");

    let state = store.state();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&state)?);
    } else {
        print!("{}", render_state(&state));
    }

    exit_status(outcome)
}

fn render_state(state: &ViewState) -> String {
    match state {
        ViewState::Loading => "Loading...\n".to_string(),
        ViewState::Error(message) => format!("{message}\n"),
        ViewState::Success(profiles) if profiles.is_empty() => "No matching profiles\n".to_string(),
        ViewState::Success(profiles) => {
            let mut out = format!("User Profiles ({})\n", profiles.len());
            for profile in profiles {
                out.push_str(&format!(
                    "  #{:<4} {:<28} Age: {}\n",
                    profile.id, profile.name, profile.age
                ));
            }
            out
        }
    }
}

/// `Err` (and so a non-zero exit) unless the load completed.
fn exit_status(outcome: LoadOutcome) -> Result<()> {
    match outcome {
        LoadOutcome::Loaded(_) => Ok(()),
        LoadOutcome::Failed(err) => bail!("{err}"),
        other => bail!("load did not complete: {other:?}"),
    }
}
