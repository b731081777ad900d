use std::path::PathBuf;

use scroll_engine::{LoopConfig, SimConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::gameplay::LevelLibrary;

const LEVEL_FILE_ENV_VAR: &str = "SCROLL_LEVEL";

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) sim_config: SimConfig,
    pub(crate) levels: LevelLibrary,
}

pub(crate) fn build_app() -> AppWiring {
    init_tracing();
    info!("=== Scroll Startup ===");

    let sim_config = SimConfig::default();
    let mut levels = LevelLibrary::new(sim_config);
    if let Some(path) = level_file_from(std::env::var(LEVEL_FILE_ENV_VAR).ok()) {
        info!(path = %path.display(), "level_file_override");
        levels = levels.with_start_file(path);
    }

    AppWiring {
        config: LoopConfig::default(),
        sim_config,
        levels,
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

fn level_file_from(raw: Option<String>) -> Option<PathBuf> {
    raw.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_level_override_is_ignored() {
        assert_eq!(level_file_from(None), None);
        assert_eq!(level_file_from(Some("   ".to_string())), None);
        assert_eq!(
            level_file_from(Some(" levels/custom.json ".to_string())),
            Some(PathBuf::from("levels/custom.json"))
        );
    }
}
