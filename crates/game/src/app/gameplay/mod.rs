mod blocks;
mod draw;
mod enemies;
mod fireball;
mod hero;
mod items;
mod level_file;
mod levels;
mod physics;
mod pipe;
mod tiles;

/// Edge length of one grid cell in level units.
pub(crate) const TILE: f32 = 16.0;
/// Width of the visible playfield in level units.
pub(crate) const SCREEN_WIDTH: f32 = 256.0;

pub(crate) use hero::Hero;
pub(crate) use levels::LevelLibrary;
