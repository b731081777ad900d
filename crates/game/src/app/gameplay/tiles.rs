use scroll_engine::{Aabb, Renderable, Surface};

use super::draw::{
    fill_level_rect, BRICK_RED, BUSH_GREEN, CLOUD_WHITE, GROUND_BROWN, HILL_GREEN, MORTAR,
    PIPE_GREEN, PIPE_HIGHLIGHT,
};
use super::TILE;

/// Non-interactive cell kinds. Whether a tile blocks movement depends only
/// on the grid it is placed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TileKind {
    Ground,
    HardBlock,
    Pipe,
    Cloud,
    Bush,
    Hill,
}

impl TileKind {
    pub(crate) fn from_name(name: &str) -> Option<Self> {
        match name {
            "ground" => Some(Self::Ground),
            "hard_block" => Some(Self::HardBlock),
            "pipe" => Some(Self::Pipe),
            "cloud" => Some(Self::Cloud),
            "bush" => Some(Self::Bush),
            "hill" => Some(Self::Hill),
            _ => None,
        }
    }
}

pub(crate) struct Tile {
    kind: TileKind,
    x: f32,
    y: f32,
}

impl Tile {
    pub(crate) fn boxed(kind: TileKind, row: usize, column: i32) -> Box<dyn Renderable> {
        Box::new(Self {
            kind,
            x: column as f32 * TILE,
            y: row as f32 * TILE,
        })
    }
}

impl Renderable for Tile {
    fn render(&self, surface: &mut dyn Surface, scroll_x: f32, scroll_y: f32) {
        let cell = Aabb::new(self.x, self.y, TILE, TILE);
        match self.kind {
            TileKind::Ground => {
                fill_level_rect(surface, cell, scroll_x, scroll_y, GROUND_BROWN);
                let seam = Aabb::new(self.x, self.y + TILE - 1.0, TILE, 1.0);
                fill_level_rect(surface, seam, scroll_x, scroll_y, MORTAR);
            }
            TileKind::HardBlock => {
                fill_level_rect(surface, cell, scroll_x, scroll_y, MORTAR);
                let face = Aabb::new(self.x + 1.0, self.y + 1.0, TILE - 2.0, TILE - 2.0);
                fill_level_rect(surface, face, scroll_x, scroll_y, BRICK_RED);
            }
            TileKind::Pipe => {
                fill_level_rect(surface, cell, scroll_x, scroll_y, PIPE_GREEN);
                let shine = Aabb::new(self.x + 3.0, self.y, 2.0, TILE);
                fill_level_rect(surface, shine, scroll_x, scroll_y, PIPE_HIGHLIGHT);
            }
            TileKind::Cloud => {
                let puff = Aabb::new(self.x, self.y + 4.0, TILE, TILE - 6.0);
                fill_level_rect(surface, puff, scroll_x, scroll_y, CLOUD_WHITE);
            }
            TileKind::Bush => {
                let leaves = Aabb::new(self.x, self.y + 6.0, TILE, TILE - 6.0);
                fill_level_rect(surface, leaves, scroll_x, scroll_y, BUSH_GREEN);
            }
            TileKind::Hill => fill_level_rect(surface, cell, scroll_x, scroll_y, HILL_GREEN),
        }
    }
}
