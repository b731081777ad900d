use scroll_engine::{
    Aabb, Collidable, Entity, EntityContext, Renderable, Strike, Surface, Updatable,
};
use tracing::trace;

use super::draw::{fill_level_rect, GOOMBA_BROWN, MORTAR};
use super::hero::Hero;
use super::physics::{level_bottom, Body, GRAVITY, MAX_STEP_SECONDS};
use super::{SCREEN_WIDTH, TILE};

const WALK_SPEED: f32 = 30.0;
const SQUASHED_SECONDS: f32 = 0.5;
const FLIP_HOP_SPEED: f32 = 200.0;
/// Stomps only count when the hero's feet are in the top part of the body.
const STOMP_MARGIN: f32 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq)]
enum GoombaState {
    /// Waits off screen until the camera reaches it.
    Dormant,
    Walking,
    Squashed { remaining: f32 },
    /// Knocked out by a fireball or a bump; falls out of the level.
    Flipped,
}

pub(crate) struct Goomba {
    body: Body,
    state: GoombaState,
    expired: bool,
}

impl Goomba {
    pub(crate) fn new(row: usize, column: i32) -> Self {
        Self {
            body: Body::new(column as f32 * TILE, row as f32 * TILE, TILE, TILE),
            state: GoombaState::Dormant,
            expired: false,
        }
    }

    fn is_alive(&self) -> bool {
        matches!(self.state, GoombaState::Dormant | GoombaState::Walking)
    }

    fn walk(&mut self, ctx: &mut EntityContext<'_, Hero>, dt: f32) {
        self.body.apply_gravity(GRAVITY, dt);
        let contacts = self.body.move_through(&*ctx.level, dt);
        if contacts.wall_left {
            self.body.vel_x = WALK_SPEED;
        } else if contacts.wall_right {
            self.body.vel_x = -WALK_SPEED;
        }
        if self.body.y > level_bottom(&*ctx.level) {
            self.expired = true;
        }
    }

    /// Walking enemies turn around when they meet each other.
    fn turn_at_neighbors(&mut self, ctx: &EntityContext<'_, Hero>) {
        let hitbox = self.body.hitbox();
        let heading = self.body.vel_x.signum();
        for other in ctx.level.enemies.iter() {
            if other.is_expired() {
                continue;
            }
            let Some(other_box) = other.hitbox() else {
                continue;
            };
            let ahead = (other_box.x - hitbox.x).signum() == heading;
            if ahead && other_box.intersects(&hitbox) {
                self.body.vel_x = -self.body.vel_x;
                return;
            }
        }
    }
}

impl Renderable for Goomba {
    fn render(&self, surface: &mut dyn Surface, scroll_x: f32, scroll_y: f32) {
        let body = self.body.hitbox();
        match self.state {
            GoombaState::Squashed { .. } => {
                let flat = Aabb::new(body.x, body.bottom() - 6.0, body.width, 6.0);
                fill_level_rect(surface, flat, scroll_x, scroll_y, GOOMBA_BROWN);
            }
            GoombaState::Flipped => {
                fill_level_rect(surface, body, scroll_x, scroll_y, GOOMBA_BROWN);
                let feet = Aabb::new(body.x + 2.0, body.y, body.width - 4.0, 4.0);
                fill_level_rect(surface, feet, scroll_x, scroll_y, MORTAR);
            }
            GoombaState::Dormant | GoombaState::Walking => {
                fill_level_rect(surface, body, scroll_x, scroll_y, GOOMBA_BROWN);
                let feet = Aabb::new(body.x + 2.0, body.bottom() - 4.0, body.width - 4.0, 4.0);
                fill_level_rect(surface, feet, scroll_x, scroll_y, MORTAR);
            }
        }
    }
}

impl Updatable<Hero> for Goomba {
    fn update(&mut self, ctx: &mut EntityContext<'_, Hero>) {
        let dt = ctx.frame.dt.min(MAX_STEP_SECONDS);
        match self.state {
            GoombaState::Dormant => {
                if self.body.x < ctx.frame.scroll_x + SCREEN_WIDTH + TILE {
                    self.state = GoombaState::Walking;
                    self.body.vel_x = -WALK_SPEED;
                    self.walk(ctx, dt);
                }
            }
            GoombaState::Walking => self.walk(ctx, dt),
            GoombaState::Squashed { remaining } => {
                let remaining = remaining - dt;
                if remaining <= 0.0 {
                    self.expired = true;
                }
                self.state = GoombaState::Squashed { remaining };
            }
            GoombaState::Flipped => {
                self.body.apply_gravity(GRAVITY, dt);
                self.body.drift(dt);
                if self.body.y > level_bottom(&*ctx.level) {
                    self.expired = true;
                }
            }
        }
    }
}

impl Collidable<Hero> for Goomba {
    fn check_collisions(&mut self, ctx: &mut EntityContext<'_, Hero>) {
        if self.state != GoombaState::Walking {
            return;
        }
        self.turn_at_neighbors(ctx);

        let hero = &mut *ctx.player;
        if !hero.can_interact() {
            return;
        }
        let hitbox = self.body.hitbox();
        let hero_box = hero.hitbox();
        if !hero_box.intersects(&hitbox) {
            return;
        }
        if hero.is_falling() && hero_box.bottom() < hitbox.y + STOMP_MARGIN {
            trace!(x = self.body.x, "goomba_stomped");
            self.state = GoombaState::Squashed {
                remaining: SQUASHED_SECONDS,
            };
            self.body.vel_x = 0.0;
            hero.bounce();
        } else {
            hero.hurt();
        }
    }

    fn hitbox(&self) -> Option<Aabb> {
        self.is_alive().then(|| self.body.hitbox())
    }

    fn strike(&mut self, strike: Strike) -> bool {
        if !self.is_alive() {
            return false;
        }
        trace!(x = self.body.x, ?strike, "goomba_knocked_out");
        self.state = GoombaState::Flipped;
        self.body.vel_x = 0.0;
        self.body.vel_y = -FLIP_HOP_SPEED;
        true
    }
}

impl Entity<Hero> for Goomba {
    fn debug_name(&self) -> &'static str {
        "goomba"
    }

    fn is_expired(&self) -> bool {
        self.expired
    }
}
