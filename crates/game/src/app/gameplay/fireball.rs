use scroll_engine::{
    Aabb, Collidable, Entity, EntityContext, Renderable, Strike, Surface, Updatable,
};

use super::draw::{fill_level_rect, FIREBALL_ORANGE};
use super::hero::{Facing, Hero};
use super::physics::{level_bottom, Body, MAX_STEP_SECONDS};
use super::{SCREEN_WIDTH, TILE};

pub(crate) const MAX_LIVE_FIREBALLS: usize = 2;

const SIZE: f32 = 8.0;
const SPEED: f32 = 240.0;
const GRAVITY: f32 = 900.0;
const BOUNCE_SPEED: f32 = 180.0;

pub(crate) struct Fireball {
    body: Body,
    expired: bool,
}

impl Fireball {
    pub(crate) fn new(x: f32, y: f32, facing: Facing) -> Self {
        let mut body = Body::new(x, y, SIZE, SIZE);
        body.vel_x = SPEED * facing.sign();
        body.vel_y = BOUNCE_SPEED / 2.0;
        Self {
            body,
            expired: false,
        }
    }

    fn is_off_screen(&self, scroll_x: f32, bottom: f32) -> bool {
        self.body.x + SIZE < scroll_x - TILE
            || self.body.x > scroll_x + SCREEN_WIDTH + TILE
            || self.body.y > bottom
    }
}

impl Renderable for Fireball {
    fn render(&self, surface: &mut dyn Surface, scroll_x: f32, scroll_y: f32) {
        fill_level_rect(surface, self.body.hitbox(), scroll_x, scroll_y, FIREBALL_ORANGE);
    }
}

impl Updatable<Hero> for Fireball {
    fn update(&mut self, ctx: &mut EntityContext<'_, Hero>) {
        let dt = ctx.frame.dt.min(MAX_STEP_SECONDS);
        self.body.apply_gravity(GRAVITY, dt);
        let contacts = self.body.move_through(&*ctx.level, dt);
        if contacts.landed {
            self.body.vel_y = -BOUNCE_SPEED;
        }
        if contacts.hit_wall() || self.is_off_screen(ctx.frame.scroll_x, level_bottom(&*ctx.level))
        {
            self.expired = true;
        }
    }
}

impl Collidable<Hero> for Fireball {
    fn check_collisions(&mut self, ctx: &mut EntityContext<'_, Hero>) {
        let hitbox = self.body.hitbox();
        for enemy in ctx.level.enemies.iter_mut() {
            if enemy.is_expired() {
                continue;
            }
            let touching = enemy
                .hitbox()
                .map_or(false, |other| other.intersects(&hitbox));
            if touching && enemy.strike(Strike::Projectile) {
                self.expired = true;
                return;
            }
        }
    }

    fn hitbox(&self) -> Option<Aabb> {
        Some(self.body.hitbox())
    }
}

impl Entity<Hero> for Fireball {
    fn debug_name(&self) -> &'static str {
        "fireball"
    }

    fn is_expired(&self) -> bool {
        self.expired
    }
}
