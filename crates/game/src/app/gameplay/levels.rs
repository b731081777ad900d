use std::path::{Path, PathBuf};

use scroll_engine::{LevelSource, LevelTransition, LoadedLevel, SimConfig};
use tracing::debug;

use super::hero::Hero;
use super::level_file::{build_level, load_level_file, parse_level, LevelFile, LevelFileError};

pub(crate) const START_LEVEL: &str = "1-1";

const BUILT_IN_LEVELS: &[(&str, &str)] = &[
    ("1-1", include_str!("../../../assets/levels/1-1.json")),
    ("1-2", include_str!("../../../assets/levels/1-2.json")),
];

/// Resolves level names to fresh level instances.
///
/// Warps look for `<name>.json` next to the start file first, then fall
/// back to the levels compiled into the binary.
pub(crate) struct LevelLibrary {
    config: SimConfig,
    start_file: Option<PathBuf>,
    current: Option<LevelFile>,
}

impl LevelLibrary {
    pub(crate) fn new(config: SimConfig) -> Self {
        Self {
            config,
            start_file: None,
            current: None,
        }
    }

    pub(crate) fn with_start_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.start_file = Some(path.into());
        self
    }

    fn starting_file(&self) -> Result<LevelFile, LevelFileError> {
        match self.start_file.as_deref() {
            Some(path) => load_level_file(path),
            None => built_in(START_LEVEL),
        }
    }

    fn resolve(&self, name: &str) -> Result<LevelFile, LevelFileError> {
        if let Some(dir) = self.start_file.as_deref().and_then(Path::parent) {
            let candidate = dir.join(format!("{name}.json"));
            if candidate.is_file() {
                return load_level_file(&candidate);
            }
        }
        built_in(name)
    }
}

fn built_in(name: &str) -> Result<LevelFile, LevelFileError> {
    let (_, raw) = BUILT_IN_LEVELS
        .iter()
        .find(|(built_in_name, _)| *built_in_name == name)
        .ok_or_else(|| LevelFileError::UnknownLevel {
            name: name.to_string(),
        })?;
    parse_level(raw)
}

impl LevelSource<Hero> for LevelLibrary {
    type Error = LevelFileError;

    fn load(
        &mut self,
        transition: Option<&LevelTransition>,
    ) -> Result<LoadedLevel<Hero>, LevelFileError> {
        let file = match (transition, self.current.as_ref()) {
            (None, _) | (Some(LevelTransition::Restart), None) => self.starting_file()?,
            (Some(LevelTransition::Restart), Some(current)) => current.clone(),
            (Some(LevelTransition::Warp { level }), _) => self.resolve(level)?,
        };
        let loaded = build_level(&file, &self.config)?;
        debug!(
            level = %loaded.name,
            blocks = file.blocks.len(),
            entities = file.entities.len(),
            "level_built"
        );
        self.current = Some(file);
        Ok(loaded)
    }
}
