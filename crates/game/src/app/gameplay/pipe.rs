use scroll_engine::{
    Aabb, Collidable, Entity, EntityContext, Player, Renderable, Surface, Updatable,
};

use super::draw::{fill_level_rect, MORTAR, PIPE_GREEN, PIPE_HIGHLIGHT};
use super::hero::Hero;
use super::TILE;

/// Pipes are two cells wide; the cap overhangs the body by this much.
pub(crate) const PIPE_COLUMNS: i32 = 2;
const CAP_HEIGHT: f32 = 8.0;
const CAP_OVERHANG: f32 = 2.0;

/// Visual front of a pipe. The solid cells behind it live in the statics
/// grid; this entity draws over the hero and handles warps.
pub(crate) struct WarpPipe {
    column: i32,
    top_row: usize,
    height: usize,
    destination: Option<String>,
}

impl WarpPipe {
    pub(crate) fn new(
        column: i32,
        top_row: usize,
        height: usize,
        destination: Option<String>,
    ) -> Self {
        Self {
            column,
            top_row,
            height,
            destination,
        }
    }

    fn left(&self) -> f32 {
        self.column as f32 * TILE
    }

    fn top(&self) -> f32 {
        self.top_row as f32 * TILE
    }

    fn width(&self) -> f32 {
        PIPE_COLUMNS as f32 * TILE
    }
}

impl Renderable for WarpPipe {
    fn render(&self, surface: &mut dyn Surface, scroll_x: f32, scroll_y: f32) {
        let (left, top, width) = (self.left(), self.top(), self.width());
        let body = Aabb::new(
            left,
            top + CAP_HEIGHT,
            width,
            self.height as f32 * TILE - CAP_HEIGHT,
        );
        fill_level_rect(surface, body, scroll_x, scroll_y, PIPE_GREEN);
        let shine = Aabb::new(left + 4.0, body.y, 3.0, body.height);
        fill_level_rect(surface, shine, scroll_x, scroll_y, PIPE_HIGHLIGHT);

        let cap = Aabb::new(
            left - CAP_OVERHANG,
            top,
            width + 2.0 * CAP_OVERHANG,
            CAP_HEIGHT,
        );
        fill_level_rect(surface, cap, scroll_x, scroll_y, MORTAR);
        let cap_face = Aabb::new(cap.x + 1.0, cap.y + 1.0, cap.width - 2.0, cap.height - 2.0);
        fill_level_rect(surface, cap_face, scroll_x, scroll_y, PIPE_GREEN);
    }
}

impl Updatable<Hero> for WarpPipe {
    fn update(&mut self, _ctx: &mut EntityContext<'_, Hero>) {}
}

impl Collidable<Hero> for WarpPipe {
    fn check_collisions(&mut self, ctx: &mut EntityContext<'_, Hero>) {
        let Some(destination) = self.destination.as_ref() else {
            return;
        };
        let hero = &mut *ctx.player;
        if !hero.can_interact() || !hero.status().crouching {
            return;
        }
        let left = self.left();
        if hero.is_standing_on(self.top(), left, left + self.width()) {
            hero.enter_pipe(left + self.width() / 2.0, destination.clone());
        }
    }
}

impl Entity<Hero> for WarpPipe {
    fn debug_name(&self) -> &'static str {
        "warp_pipe"
    }
}

#[cfg(test)]
mod tests {
    use scroll_engine::{Color, FrameContext, Level, PlayerContext, ProjectileSet, SimConfig};

    use super::*;
    use crate::app::gameplay::tiles::{Tile, TileKind};

    fn level_with_pipe() -> Level<Hero> {
        let mut level = Level::new(Color::BLACK, true, &SimConfig::default());
        for column in 0..20 {
            level
                .statics
                .set(13, column, Tile::boxed(TileKind::Ground, 13, column))
                .expect("floor");
        }
        for row in 11..13 {
            for column in 6..8 {
                level
                    .statics
                    .set(row, column, Tile::boxed(TileKind::Pipe, row, column))
                    .expect("pipe");
            }
        }
        level
    }

    fn settle_on_pipe(level: &mut Level<Hero>) -> Hero {
        let mut hero = Hero::new(104.0, 9.0 * TILE);
        let mut fireballs = ProjectileSet::default();
        for _ in 0..30 {
            let mut ctx = PlayerContext {
                frame: FrameContext {
                    dt: 1.0 / 60.0,
                    ..FrameContext::default()
                },
                level: &mut *level,
                fireballs: &mut fireballs,
            };
            hero.update(&mut ctx);
        }
        hero
    }

    fn check(pipe: &mut WarpPipe, level: &mut Level<Hero>, hero: &mut Hero) {
        let mut fireballs = ProjectileSet::default();
        let mut ctx = EntityContext {
            frame: FrameContext::default(),
            level,
            fireballs: &mut fireballs,
            player: hero,
        };
        pipe.check_collisions(&mut ctx);
    }

    #[test]
    fn crouching_on_a_warp_pipe_enters_it() {
        let mut level = level_with_pipe();
        let mut hero = settle_on_pipe(&mut level);
        let mut pipe = WarpPipe::new(6, 11, 2, Some("1-2".to_string()));

        check(&mut pipe, &mut level, &mut hero);
        assert!(!hero.status().piping);

        hero.crouch();
        check(&mut pipe, &mut level, &mut hero);
        let status = hero.status();
        assert!(status.piping);
        assert_eq!(status.x + hero.hitbox().width / 2.0, 7.0 * TILE);
    }

    #[test]
    fn plain_pipes_ignore_crouching() {
        let mut level = level_with_pipe();
        let mut hero = settle_on_pipe(&mut level);
        let mut pipe = WarpPipe::new(6, 11, 2, None);

        hero.crouch();
        check(&mut pipe, &mut level, &mut hero);

        assert!(!hero.status().piping);
    }
}
