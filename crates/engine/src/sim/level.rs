use std::fmt;

use super::config::SimConfig;
use super::entity::{Bumpable, Renderable};
use super::entity_list::{CompactStats, EntityList};
use super::grid::TileGrid;
use super::surface::Color;

/// Static and dynamic contents of one level.
///
/// Built once by a level loader and replaced wholesale on transitions. The
/// level has no behavior of its own; the simulation drives its contents.
pub struct Level<P> {
    pub background: Color,
    pub auto_scroll: bool,
    pub scenery: TileGrid<Box<dyn Renderable>>,
    pub statics: TileGrid<Box<dyn Renderable>>,
    pub blocks: TileGrid<Box<dyn Bumpable<P>>>,
    pub items: EntityList<P>,
    pub enemies: EntityList<P>,
    pub pipes: EntityList<P>,
}

impl<P> Level<P> {
    pub fn new(background: Color, auto_scroll: bool, config: &SimConfig) -> Self {
        Self {
            background,
            auto_scroll,
            scenery: TileGrid::new(config.grid_rows),
            statics: TileGrid::new(config.grid_rows),
            blocks: TileGrid::new(config.grid_rows),
            items: EntityList::new(),
            enemies: EntityList::new(),
            pipes: EntityList::new(),
        }
    }

    /// Statics and blocks both stop movement.
    pub fn is_solid(&self, row: usize, column: i32) -> bool {
        self.statics.is_occupied(row, column) || self.blocks.is_occupied(row, column)
    }

    pub fn entity_count(&self) -> usize {
        self.items.len() + self.enemies.len() + self.pipes.len()
    }

    pub(crate) fn compact(&mut self) -> CompactStats {
        self.items
            .compact()
            .merge(self.enemies.compact())
            .merge(self.pipes.compact())
    }
}

impl<P> fmt::Debug for Level<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Level")
            .field("background", &self.background)
            .field("auto_scroll", &self.auto_scroll)
            .field("width", &self.statics.width().max(self.scenery.width()))
            .field("items", &self.items.len())
            .field("enemies", &self.enemies.len())
            .field("pipes", &self.pipes.len())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelTransition {
    /// Reload the current level from scratch, e.g. after a death.
    Restart,
    Warp { level: String },
}

pub struct LoadedLevel<P> {
    pub name: String,
    pub level: Level<P>,
    pub player: P,
}

/// Builds levels on demand for the host loop.
pub trait LevelSource<P> {
    type Error: std::error::Error + Send + Sync + 'static;

    /// `None` asks for the starting level.
    fn load(&mut self, transition: Option<&LevelTransition>)
        -> Result<LoadedLevel<P>, Self::Error>;
}
