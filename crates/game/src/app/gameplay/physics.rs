use scroll_engine::{Aabb, GridCell, Level};

use super::TILE;

/// Largest integration step any body takes. Longer frames are integrated
/// as if they were this long so a stalled frame cannot tunnel through
/// floors.
pub(crate) const MAX_STEP_SECONDS: f32 = 1.0 / 20.0;
pub(crate) const GRAVITY: f32 = 1500.0;
pub(crate) const MAX_FALL_SPEED: f32 = 420.0;

const EDGE_EPSILON: f32 = 0.01;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct Contacts {
    pub(crate) wall_left: bool,
    pub(crate) wall_right: bool,
    pub(crate) landed: bool,
    /// Solid cell hit from below, nearest the body's center.
    pub(crate) ceiling: Option<GridCell>,
}

impl Contacts {
    pub(crate) fn hit_wall(&self) -> bool {
        self.wall_left || self.wall_right
    }
}

/// Axis-aligned mover resolved against the level's solid cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Body {
    pub(crate) x: f32,
    pub(crate) y: f32,
    pub(crate) width: f32,
    pub(crate) height: f32,
    pub(crate) vel_x: f32,
    pub(crate) vel_y: f32,
}

impl Body {
    pub(crate) fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            vel_x: 0.0,
            vel_y: 0.0,
        }
    }

    pub(crate) fn hitbox(&self) -> Aabb {
        Aabb::new(self.x, self.y, self.width, self.height)
    }

    pub(crate) fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub(crate) fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    /// Keeps the feet in place while the height changes.
    pub(crate) fn set_height(&mut self, height: f32) {
        let bottom = self.bottom();
        self.height = height;
        self.y = bottom - height;
    }

    pub(crate) fn apply_gravity(&mut self, gravity: f32, dt: f32) {
        self.vel_y = (self.vel_y + gravity * dt).min(MAX_FALL_SPEED);
    }

    /// Moves without any collision, e.g. for death arcs.
    pub(crate) fn drift(&mut self, dt: f32) {
        self.x += self.vel_x * dt;
        self.y += self.vel_y * dt;
    }

    /// Moves horizontally, then vertically, stopping at solid cells.
    pub(crate) fn move_through<P>(&mut self, level: &Level<P>, dt: f32) -> Contacts {
        let mut contacts = Contacts::default();

        self.x += self.vel_x * dt;
        if self.vel_x > 0.0 {
            let column = tile_index(self.x + self.width - EDGE_EPSILON);
            if self.column_blocked(level, column) {
                self.x = column as f32 * TILE - self.width;
                self.vel_x = 0.0;
                contacts.wall_right = true;
            }
        } else if self.vel_x < 0.0 {
            let column = tile_index(self.x);
            if self.column_blocked(level, column) {
                self.x = (column + 1) as f32 * TILE;
                self.vel_x = 0.0;
                contacts.wall_left = true;
            }
        }

        self.y += self.vel_y * dt;
        if self.vel_y > 0.0 {
            let row = tile_index(self.bottom() - EDGE_EPSILON);
            if self.row_blocked(level, row) {
                self.y = row as f32 * TILE - self.height;
                self.vel_y = 0.0;
                contacts.landed = true;
            }
        } else if self.vel_y < 0.0 {
            let row = tile_index(self.y);
            if let Some(cell) = self.ceiling_cell(level, row) {
                self.y = (row + 1) as f32 * TILE;
                self.vel_y = 0.0;
                contacts.ceiling = Some(cell);
            }
        }

        contacts
    }

    fn column_blocked<P>(&self, level: &Level<P>, column: i32) -> bool {
        rows_spanned(self.y, self.height).any(|row| solid_at(level, row, column))
    }

    fn row_blocked<P>(&self, level: &Level<P>, row: i32) -> bool {
        columns_spanned(self.x, self.width).any(|column| solid_at(level, row, column))
    }

    fn ceiling_cell<P>(&self, level: &Level<P>, row: i32) -> Option<GridCell> {
        let row_index = usize::try_from(row).ok()?;
        let center = tile_index(self.center_x());
        columns_spanned(self.x, self.width)
            .filter(|column| level.is_solid(row_index, *column))
            .min_by_key(|column| (column - center).abs())
            .map(|column| GridCell::new(row_index, column))
    }
}

pub(crate) fn tile_index(coordinate: f32) -> i32 {
    (coordinate / TILE).floor() as i32
}

/// Rows above the level are open sky; rows below it are a pit.
pub(crate) fn solid_at<P>(level: &Level<P>, row: i32, column: i32) -> bool {
    usize::try_from(row).map_or(false, |row| level.is_solid(row, column))
}

pub(crate) fn level_bottom<P>(level: &Level<P>) -> f32 {
    level.statics.row_count() as f32 * TILE
}

fn rows_spanned(y: f32, height: f32) -> std::ops::RangeInclusive<i32> {
    tile_index(y)..=tile_index(y + height - EDGE_EPSILON)
}

fn columns_spanned(x: f32, width: f32) -> std::ops::RangeInclusive<i32> {
    tile_index(x)..=tile_index(x + width - EDGE_EPSILON)
}
