use std::env;
use std::path::PathBuf;

use sands_engine::{LoopConfig, WorldLayout};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use super::world_file::load_world_layout;

const WORLD_FILE_ENV_VAR: &str = "LANDS_WORLD_FILE";
const RNG_SEED_ENV_VAR: &str = "LANDS_RNG_SEED";

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) layout: WorldLayout,
    pub(crate) rng_seed: Option<u64>,
}

pub(crate) fn build_app() -> AppWiring {
    init_tracing();
    info!(version = env!("CARGO_PKG_VERSION"), "=== Lands of Sand Startup ===");

    let layout = resolve_world_layout(env::var_os(WORLD_FILE_ENV_VAR).map(PathBuf::from));
    let rng_seed = resolve_rng_seed(env::var(RNG_SEED_ENV_VAR).ok());

    AppWiring {
        config: LoopConfig::default(),
        layout,
        rng_seed,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn resolve_world_layout(world_file: Option<PathBuf>) -> WorldLayout {
    let Some(path) = world_file else {
        return WorldLayout::default();
    };
    match load_world_layout(&path) {
        Ok(layout) => {
            info!(path = %path.display(), "world_file_loaded");
            layout
        }
        Err(error) => {
            warn!(
                env_var = WORLD_FILE_ENV_VAR,
                error = %error,
                "invalid world file; falling back to built-in town"
            );
            WorldLayout::default()
        }
    }
}

fn resolve_rng_seed(raw: Option<String>) -> Option<u64> {
    let raw = raw?;
    match raw.trim().parse::<u64>() {
        Ok(seed) => Some(seed),
        Err(_) => {
            warn!(
                env_var = RNG_SEED_ENV_VAR,
                value = raw.as_str(),
                "invalid rng seed; falling back to entropy"
            );
            None
        }
    }
}
