use scroll_engine::{
    Aabb, Bumpable, Collidable, Entity, EntityContext, Renderable, Surface, Updatable,
};
use serde::Deserialize;
use tracing::trace;

use super::draw::{fill_level_rect, BRICK_RED, MORTAR, QUESTION_DIM, QUESTION_GOLD, USED_BLOCK};
use super::hero::Hero;
use super::items::{BrickDebris, CoinPopup, FireFlower, Mushroom};
use super::TILE;

const BOUNCE_SECONDS: f32 = 0.15;
const BOUNCE_HEIGHT: f32 = 6.0;
/// Full cycles of the question mark glint per second.
const SHIMMER_HZ: f64 = 1.5;

/// What a question block releases on its first bump.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum BlockContents {
    #[default]
    Coin,
    /// A mushroom for a small hero, a fire flower otherwise.
    PowerUp,
}

/// Short upward pop played when a block is hit without breaking.
#[derive(Debug, Clone, Copy, Default)]
struct Bounce {
    remaining: f32,
}

impl Bounce {
    fn start(&mut self) {
        self.remaining = BOUNCE_SECONDS;
    }

    fn advance(&mut self, dt: f32) {
        self.remaining = (self.remaining - dt).max(0.0);
    }

    fn offset(&self) -> f32 {
        if self.remaining <= 0.0 {
            return 0.0;
        }
        let progress = 1.0 - self.remaining / BOUNCE_SECONDS;
        -BOUNCE_HEIGHT * (progress * std::f32::consts::PI).sin()
    }
}

pub(crate) struct Brick {
    row: usize,
    column: i32,
    bounce: Bounce,
    broken: bool,
}

impl Brick {
    pub(crate) fn boxed(row: usize, column: i32) -> Box<dyn Bumpable<Hero>> {
        Box::new(Self {
            row,
            column,
            bounce: Bounce::default(),
            broken: false,
        })
    }
}

impl Renderable for Brick {
    fn render(&self, surface: &mut dyn Surface, scroll_x: f32, scroll_y: f32) {
        let x = self.column as f32 * TILE;
        let y = self.row as f32 * TILE + self.bounce.offset();
        fill_level_rect(surface, Aabb::new(x, y, TILE, TILE), scroll_x, scroll_y, MORTAR);
        for (dx, dy, width) in [(0.0, 1.0, 7.0), (8.0, 1.0, 7.0), (4.0, 9.0, 8.0)] {
            let face = Aabb::new(x + dx, y + dy, width, 6.0);
            fill_level_rect(surface, face, scroll_x, scroll_y, BRICK_RED);
        }
    }
}

impl Updatable<Hero> for Brick {
    fn update(&mut self, ctx: &mut EntityContext<'_, Hero>) {
        self.bounce.advance(ctx.frame.dt);
    }
}

impl Collidable<Hero> for Brick {}

impl Entity<Hero> for Brick {
    fn debug_name(&self) -> &'static str {
        "brick"
    }

    fn is_expired(&self) -> bool {
        self.broken
    }
}

impl Bumpable<Hero> for Brick {
    fn bump(&mut self, strong: bool) -> Option<Box<dyn Entity<Hero>>> {
        if !strong {
            self.bounce.start();
            return None;
        }
        trace!(row = self.row, column = self.column, "brick_broken");
        self.broken = true;
        Some(Box::new(BrickDebris::new(self.row, self.column)))
    }
}

pub(crate) struct QuestionBlock {
    row: usize,
    column: i32,
    contents: BlockContents,
    used: bool,
    bounce: Bounce,
    game_time: f64,
}

impl QuestionBlock {
    pub(crate) fn boxed(
        row: usize,
        column: i32,
        contents: BlockContents,
    ) -> Box<dyn Bumpable<Hero>> {
        Box::new(Self {
            row,
            column,
            contents,
            used: false,
            bounce: Bounce::default(),
            game_time: 0.0,
        })
    }

    fn release(&self, strong: bool) -> Box<dyn Entity<Hero>> {
        match self.contents {
            BlockContents::Coin => Box::new(CoinPopup::new(self.row, self.column)),
            BlockContents::PowerUp if strong => {
                Box::new(FireFlower::emerging(self.row, self.column))
            }
            BlockContents::PowerUp => Box::new(Mushroom::emerging(self.row, self.column)),
        }
    }
}

impl Renderable for QuestionBlock {
    fn render(&self, surface: &mut dyn Surface, scroll_x: f32, scroll_y: f32) {
        let x = self.column as f32 * TILE;
        let y = self.row as f32 * TILE + self.bounce.offset();
        let cell = Aabb::new(x, y, TILE, TILE);
        if self.used {
            fill_level_rect(surface, cell, scroll_x, scroll_y, USED_BLOCK);
            return;
        }
        let glint = (self.game_time * SHIMMER_HZ).fract() < 0.5;
        let face = if glint { QUESTION_GOLD } else { QUESTION_DIM };
        fill_level_rect(surface, cell, scroll_x, scroll_y, face);
        let mark = Aabb::new(x + 6.0, y + 3.0, 4.0, 7.0);
        fill_level_rect(surface, mark, scroll_x, scroll_y, MORTAR);
        let dot = Aabb::new(x + 6.0, y + 11.0, 4.0, 2.0);
        fill_level_rect(surface, dot, scroll_x, scroll_y, MORTAR);
    }
}

impl Updatable<Hero> for QuestionBlock {
    fn update(&mut self, ctx: &mut EntityContext<'_, Hero>) {
        self.game_time = ctx.frame.game_time;
        self.bounce.advance(ctx.frame.dt);
    }
}

impl Collidable<Hero> for QuestionBlock {}

impl Entity<Hero> for QuestionBlock {
    fn debug_name(&self) -> &'static str {
        "question_block"
    }
}

impl Bumpable<Hero> for QuestionBlock {
    fn bump(&mut self, strong: bool) -> Option<Box<dyn Entity<Hero>>> {
        if self.used {
            return None;
        }
        self.used = true;
        self.bounce.start();
        trace!(
            row = self.row,
            column = self.column,
            contents = ?self.contents,
            "question_block_emptied"
        );
        Some(self.release(strong))
    }
}
