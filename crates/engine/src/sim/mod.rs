mod config;
mod entity;
mod entity_list;
mod grid;
mod input;
mod level;
mod projectiles;
mod simulation;
mod surface;
#[cfg(test)]
mod test_support;
mod viewport;

pub use config::{SimConfig, DEFAULT_GRID_ROWS, DEFAULT_TILE_SIZE};
pub use entity::{
    Aabb, Bumpable, Collidable, Entity, EntityContext, FrameContext, Player, PlayerContext,
    PlayerStatus, Renderable, Strike, Updatable,
};
pub use entity_list::{CompactStats, EntityList};
pub use grid::{ColumnWindow, GridCell, GridError, TileGrid};
pub use input::{Button, ButtonStates, InputState};
pub use level::{Level, LevelSource, LevelTransition, LoadedLevel};
pub use projectiles::ProjectileSet;
pub use simulation::{
    ActiveStatics, FrameScheduler, SimulationLoop, TickReport, UpdateReport, World,
};
pub use surface::{Color, ColorParseError, Surface};
pub use viewport::{CameraRule, Viewport};
