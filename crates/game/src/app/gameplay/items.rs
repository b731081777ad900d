use scroll_engine::{
    Aabb, Collidable, Entity, EntityContext, Renderable, Strike, Surface, Updatable,
};
use tracing::trace;

use super::draw::{
    fill_level_rect, BRICK_RED, COIN_YELLOW, FLAG_GREEN, HERO_FIRE, HERO_RED, POLE_GRAY,
};
use super::hero::{Hero, PowerUp};
use super::physics::{level_bottom, Body, GRAVITY, MAX_STEP_SECONDS};
use super::TILE;

const COIN_WIDTH: f32 = 8.0;
const POPUP_SPEED: f32 = 300.0;
const POPUP_SECONDS: f32 = 0.5;
const EMERGE_SPEED: f32 = 32.0;
const MUSHROOM_SPEED: f32 = 60.0;
const MUSHROOM_HOP_SPEED: f32 = 220.0;
const FLAG_SIZE: f32 = 12.0;
const FLAG_DROP_SPEED: f32 = 120.0;
const DEBRIS_SECONDS: f32 = 1.0;
const DEBRIS_SIZE: f32 = 6.0;

/// Coin placed directly in the level.
pub(crate) struct Coin {
    bounds: Aabb,
    /// Knocked loose by a block bump; credited on the next update.
    bumped: bool,
    collected: bool,
}

impl Coin {
    pub(crate) fn new(row: usize, column: i32) -> Self {
        Self {
            bounds: Aabb::new(
                column as f32 * TILE + (TILE - COIN_WIDTH) / 2.0,
                row as f32 * TILE + 2.0,
                COIN_WIDTH,
                TILE - 4.0,
            ),
            bumped: false,
            collected: false,
        }
    }
}

impl Renderable for Coin {
    fn render(&self, surface: &mut dyn Surface, scroll_x: f32, scroll_y: f32) {
        fill_level_rect(surface, self.bounds, scroll_x, scroll_y, COIN_YELLOW);
    }
}

impl Updatable<Hero> for Coin {
    fn update(&mut self, ctx: &mut EntityContext<'_, Hero>) {
        if self.bumped && !self.collected {
            ctx.player.collect_coin();
            self.collected = true;
        }
    }
}

impl Collidable<Hero> for Coin {
    fn check_collisions(&mut self, ctx: &mut EntityContext<'_, Hero>) {
        if self.bumped || self.collected || !ctx.player.can_interact() {
            return;
        }
        if ctx.player.hitbox().intersects(&self.bounds) {
            ctx.player.collect_coin();
            self.collected = true;
        }
    }

    fn hitbox(&self) -> Option<Aabb> {
        (!self.bumped && !self.collected).then_some(self.bounds)
    }

    fn strike(&mut self, strike: Strike) -> bool {
        if strike != Strike::Bump || self.bumped || self.collected {
            return false;
        }
        self.bumped = true;
        true
    }
}

impl Entity<Hero> for Coin {
    fn debug_name(&self) -> &'static str {
        "coin"
    }

    fn is_expired(&self) -> bool {
        self.collected
    }
}

/// Coin that jumps out of a question block and is credited immediately.
pub(crate) struct CoinPopup {
    x: f32,
    y: f32,
    vel_y: f32,
    elapsed: f32,
    credited: bool,
}

impl CoinPopup {
    pub(crate) fn new(row: usize, column: i32) -> Self {
        Self {
            x: column as f32 * TILE + (TILE - COIN_WIDTH) / 2.0,
            y: (row as f32 - 1.0) * TILE,
            vel_y: -POPUP_SPEED,
            elapsed: 0.0,
            credited: false,
        }
    }
}

impl Renderable for CoinPopup {
    fn render(&self, surface: &mut dyn Surface, scroll_x: f32, scroll_y: f32) {
        let bounds = Aabb::new(self.x, self.y, COIN_WIDTH, TILE - 2.0);
        fill_level_rect(surface, bounds, scroll_x, scroll_y, COIN_YELLOW);
    }
}

impl Updatable<Hero> for CoinPopup {
    fn update(&mut self, ctx: &mut EntityContext<'_, Hero>) {
        if !self.credited {
            ctx.player.collect_coin();
            self.credited = true;
        }
        let dt = ctx.frame.dt.min(MAX_STEP_SECONDS);
        self.vel_y += GRAVITY * dt;
        self.y += self.vel_y * dt;
        self.elapsed += dt;
    }
}

impl Collidable<Hero> for CoinPopup {}

impl Entity<Hero> for CoinPopup {
    fn debug_name(&self) -> &'static str {
        "coin_popup"
    }

    fn is_expired(&self) -> bool {
        self.elapsed >= POPUP_SECONDS
    }
}

/// Rise out of the block before the item becomes live.
#[derive(Debug, Clone, Copy)]
struct Emerge {
    target_y: f32,
}

impl Emerge {
    fn from_block(row: usize) -> Self {
        Self {
            target_y: (row as f32 - 1.0) * TILE,
        }
    }

    /// Returns true once the item has fully cleared the block.
    fn advance(&self, body: &mut Body, dt: f32) -> bool {
        body.y = (body.y - EMERGE_SPEED * dt).max(self.target_y);
        body.y <= self.target_y
    }
}

pub(crate) struct Mushroom {
    body: Body,
    emerge: Option<Emerge>,
    expired: bool,
}

impl Mushroom {
    pub(crate) fn emerging(row: usize, column: i32) -> Self {
        Self {
            body: Body::new(column as f32 * TILE, row as f32 * TILE, TILE, TILE),
            emerge: Some(Emerge::from_block(row)),
            expired: false,
        }
    }
}

impl Renderable for Mushroom {
    fn render(&self, surface: &mut dyn Surface, scroll_x: f32, scroll_y: f32) {
        let body = self.body.hitbox();
        let cap = Aabb::new(body.x, body.y, body.width, body.height / 2.0);
        let stem = Aabb::new(body.x + 4.0, body.y + body.height / 2.0, 8.0, body.height / 2.0);
        fill_level_rect(surface, cap, scroll_x, scroll_y, HERO_RED);
        fill_level_rect(surface, stem, scroll_x, scroll_y, HERO_FIRE);
    }
}

impl Updatable<Hero> for Mushroom {
    fn update(&mut self, ctx: &mut EntityContext<'_, Hero>) {
        let dt = ctx.frame.dt.min(MAX_STEP_SECONDS);
        if let Some(emerge) = self.emerge {
            if emerge.advance(&mut self.body, dt) {
                self.emerge = None;
                self.body.vel_x = MUSHROOM_SPEED;
            }
            return;
        }
        self.body.apply_gravity(GRAVITY, dt);
        let contacts = self.body.move_through(&*ctx.level, dt);
        if contacts.wall_left {
            self.body.vel_x = MUSHROOM_SPEED;
        } else if contacts.wall_right {
            self.body.vel_x = -MUSHROOM_SPEED;
        }
        if self.body.y > level_bottom(&*ctx.level) {
            self.expired = true;
        }
    }
}

impl Collidable<Hero> for Mushroom {
    fn check_collisions(&mut self, ctx: &mut EntityContext<'_, Hero>) {
        if self.emerge.is_some() || !ctx.player.can_interact() {
            return;
        }
        if ctx.player.hitbox().intersects(&self.body.hitbox()) {
            ctx.player.power_up(PowerUp::Mushroom);
            self.expired = true;
        }
    }

    fn hitbox(&self) -> Option<Aabb> {
        self.emerge.is_none().then(|| self.body.hitbox())
    }

    fn strike(&mut self, strike: Strike) -> bool {
        if strike != Strike::Bump || self.emerge.is_some() {
            return false;
        }
        self.body.vel_y = -MUSHROOM_HOP_SPEED;
        true
    }
}

impl Entity<Hero> for Mushroom {
    fn debug_name(&self) -> &'static str {
        "mushroom"
    }

    fn is_expired(&self) -> bool {
        self.expired
    }
}

pub(crate) struct FireFlower {
    body: Body,
    emerge: Option<Emerge>,
    expired: bool,
}

impl FireFlower {
    pub(crate) fn emerging(row: usize, column: i32) -> Self {
        Self {
            body: Body::new(column as f32 * TILE, row as f32 * TILE, TILE, TILE),
            emerge: Some(Emerge::from_block(row)),
            expired: false,
        }
    }
}

impl Renderable for FireFlower {
    fn render(&self, surface: &mut dyn Surface, scroll_x: f32, scroll_y: f32) {
        let body = self.body.hitbox();
        let petals = Aabb::new(body.x + 2.0, body.y, body.width - 4.0, 8.0);
        let stem = Aabb::new(body.x + 7.0, body.y + 8.0, 2.0, body.height - 8.0);
        fill_level_rect(surface, petals, scroll_x, scroll_y, HERO_RED);
        fill_level_rect(surface, stem, scroll_x, scroll_y, FLAG_GREEN);
    }
}

impl Updatable<Hero> for FireFlower {
    fn update(&mut self, ctx: &mut EntityContext<'_, Hero>) {
        let dt = ctx.frame.dt.min(MAX_STEP_SECONDS);
        if let Some(emerge) = self.emerge {
            if emerge.advance(&mut self.body, dt) {
                self.emerge = None;
            }
        }
    }
}

impl Collidable<Hero> for FireFlower {
    fn check_collisions(&mut self, ctx: &mut EntityContext<'_, Hero>) {
        if self.emerge.is_some() || !ctx.player.can_interact() {
            return;
        }
        if ctx.player.hitbox().intersects(&self.body.hitbox()) {
            ctx.player.power_up(PowerUp::Flower);
            self.expired = true;
        }
    }

    fn hitbox(&self) -> Option<Aabb> {
        self.emerge.is_none().then(|| self.body.hitbox())
    }
}

impl Entity<Hero> for FireFlower {
    fn debug_name(&self) -> &'static str {
        "fire_flower"
    }

    fn is_expired(&self) -> bool {
        self.expired
    }
}

/// End-of-level pole. Touching it hands the hero to the exit sequence.
pub(crate) struct Flagpole {
    pole_x: f32,
    top_y: f32,
    base_y: f32,
    flag_y: f32,
    next: Option<String>,
    grabbed: bool,
}

impl Flagpole {
    /// `base_row` is the row of the block the pole stands on.
    pub(crate) fn new(column: i32, top_row: usize, base_row: usize, next: Option<String>) -> Self {
        let top_y = top_row as f32 * TILE;
        Self {
            pole_x: column as f32 * TILE + TILE / 2.0,
            top_y,
            base_y: base_row as f32 * TILE,
            flag_y: top_y + 4.0,
            next,
            grabbed: false,
        }
    }

    fn pole(&self) -> Aabb {
        Aabb::new(self.pole_x - 1.0, self.top_y, 2.0, self.base_y - self.top_y)
    }
}

impl Renderable for Flagpole {
    fn render(&self, surface: &mut dyn Surface, scroll_x: f32, scroll_y: f32) {
        fill_level_rect(surface, self.pole(), scroll_x, scroll_y, POLE_GRAY);
        let flag = Aabb::new(self.pole_x - FLAG_SIZE - 1.0, self.flag_y, FLAG_SIZE, FLAG_SIZE);
        fill_level_rect(surface, flag, scroll_x, scroll_y, FLAG_GREEN);
    }
}

impl Updatable<Hero> for Flagpole {
    fn update(&mut self, ctx: &mut EntityContext<'_, Hero>) {
        if self.grabbed {
            let dt = ctx.frame.dt.min(MAX_STEP_SECONDS);
            let lowest = self.base_y - TILE - FLAG_SIZE;
            self.flag_y = (self.flag_y + FLAG_DROP_SPEED * dt).min(lowest);
        }
    }
}

impl Collidable<Hero> for Flagpole {
    fn check_collisions(&mut self, ctx: &mut EntityContext<'_, Hero>) {
        if self.grabbed || !ctx.player.can_interact() {
            return;
        }
        if ctx.player.hitbox().intersects(&self.pole()) {
            trace!(pole_x = self.pole_x, "flagpole_reached");
            self.grabbed = true;
            ctx.player.grab_flag(self.pole_x, self.base_y, self.next.clone());
        }
    }
}

impl Entity<Hero> for Flagpole {
    fn debug_name(&self) -> &'static str {
        "flagpole"
    }
}

/// Fragments of a broken brick. Purely visual.
pub(crate) struct BrickDebris {
    pieces: [Body; 4],
    elapsed: f32,
    fell_out: bool,
}

impl BrickDebris {
    pub(crate) fn new(row: usize, column: i32) -> Self {
        let x = column as f32 * TILE;
        let y = row as f32 * TILE;
        let piece = |dx: f32, dy: f32, vel_x: f32, vel_y: f32| {
            let mut body = Body::new(x + dx, y + dy, DEBRIS_SIZE, DEBRIS_SIZE);
            body.vel_x = vel_x;
            body.vel_y = vel_y;
            body
        };
        Self {
            pieces: [
                piece(0.0, 0.0, -60.0, -360.0),
                piece(8.0, 0.0, 60.0, -360.0),
                piece(0.0, 8.0, -60.0, -240.0),
                piece(8.0, 8.0, 60.0, -240.0),
            ],
            elapsed: 0.0,
            fell_out: false,
        }
    }
}

impl Renderable for BrickDebris {
    fn render(&self, surface: &mut dyn Surface, scroll_x: f32, scroll_y: f32) {
        for piece in &self.pieces {
            fill_level_rect(surface, piece.hitbox(), scroll_x, scroll_y, BRICK_RED);
        }
    }
}

impl Updatable<Hero> for BrickDebris {
    fn update(&mut self, ctx: &mut EntityContext<'_, Hero>) {
        let dt = ctx.frame.dt.min(MAX_STEP_SECONDS);
        for piece in &mut self.pieces {
            piece.apply_gravity(GRAVITY, dt);
            piece.drift(dt);
        }
        self.elapsed += dt;
        let bottom = level_bottom(&*ctx.level);
        self.fell_out = self.pieces.iter().all(|piece| piece.y > bottom);
    }
}

impl Collidable<Hero> for BrickDebris {}

impl Entity<Hero> for BrickDebris {
    fn debug_name(&self) -> &'static str {
        "brick_debris"
    }

    fn is_expired(&self) -> bool {
        self.fell_out || self.elapsed >= DEBRIS_SECONDS
    }
}
