use scroll_engine::{
    Aabb, Color, GridCell, Level, LevelTransition, Player, PlayerContext, PlayerStatus, Renderable,
    Strike, Surface,
};
use tracing::debug;

use super::draw::{fill_level_rect, HERO_FIRE, HERO_OVERALLS, HERO_RED};
use super::fireball::{Fireball, MAX_LIVE_FIREBALLS};
use super::physics::{level_bottom, Body, GRAVITY, MAX_STEP_SECONDS};
use super::TILE;

const WIDTH: f32 = 12.0;
const SMALL_HEIGHT: f32 = 16.0;
const BIG_HEIGHT: f32 = 32.0;

const WALK_SPEED: f32 = 90.0;
const RUN_SPEED: f32 = 150.0;
const ACCELERATION: f32 = 360.0;
const DECELERATION: f32 = 480.0;
const JUMP_SPEED: f32 = 330.0;
const JUMP_HOLD_SECONDS: f32 = 0.25;
const HOLD_GRAVITY: f32 = 600.0;
const STOMP_BOUNCE_SPEED: f32 = 250.0;

pub(crate) const POWER_CHANGE_FRAMES: usize = 48;
const INVINCIBILITY_FRAMES: u32 = 120;
const DEATH_SECONDS: f32 = 3.0;
const DEATH_PAUSE_SECONDS: f32 = 0.5;
const DEATH_HOP_SPEED: f32 = 380.0;
const PIPE_SECONDS: f32 = 1.0;
const PIPE_SINK_SPEED: f32 = 32.0;
const FLAG_SLIDE_SPEED: f32 = 120.0;
const EXIT_WALK_DISTANCE: f32 = 6.0 * TILE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PowerState {
    Small,
    Big,
    Fire,
}

impl PowerState {
    fn height(self) -> f32 {
        match self {
            PowerState::Small => SMALL_HEIGHT,
            PowerState::Big | PowerState::Fire => BIG_HEIGHT,
        }
    }

    fn suit(self) -> Suit {
        match self {
            PowerState::Fire => Suit {
                shirt: HERO_FIRE,
                overalls: HERO_RED,
            },
            PowerState::Small | PowerState::Big => Suit {
                shirt: HERO_RED,
                overalls: HERO_OVERALLS,
            },
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Suit {
    shirt: Color,
    overalls: Color,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PowerUp {
    Mushroom,
    Flower,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Facing {
    Left,
    Right,
}

impl Facing {
    pub(crate) fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Walk {
    Idle,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy)]
struct PowerChange {
    to: PowerState,
    frames_left: usize,
}

#[derive(Debug, Clone, Copy)]
struct Death {
    elapsed: f32,
    hopped: bool,
}

#[derive(Debug, Clone)]
struct PipeTransit {
    remaining: f32,
    destination: String,
}

#[derive(Debug, Clone)]
enum ExitSequence {
    Slide { base_y: f32, next: Option<String> },
    Walk { remaining: f32, next: Option<String> },
    Done,
}

/// The player character.
pub struct Hero {
    body: Body,
    facing: Facing,
    power: PowerState,
    walk: Walk,
    running: bool,
    crouching: bool,
    grounded: bool,
    jump_held: bool,
    jump_ready: bool,
    jump_boost: f32,
    fire_requested: bool,
    invincibility: u32,
    coins: u32,
    powering: Option<PowerChange>,
    death: Option<Death>,
    pipe: Option<PipeTransit>,
    exit: Option<ExitSequence>,
    transition: Option<LevelTransition>,
    transition_sent: bool,
}

impl Hero {
    /// `x`/`y` is the top-left of the spawn cell.
    pub(crate) fn new(x: f32, y: f32) -> Self {
        Self {
            body: Body::new(x + (TILE - WIDTH) / 2.0, y + TILE - SMALL_HEIGHT, WIDTH, SMALL_HEIGHT),
            facing: Facing::Right,
            power: PowerState::Small,
            walk: Walk::Idle,
            running: false,
            crouching: false,
            grounded: false,
            jump_held: false,
            jump_ready: true,
            jump_boost: 0.0,
            fire_requested: false,
            invincibility: 0,
            coins: 0,
            powering: None,
            death: None,
            pipe: None,
            exit: None,
            transition: None,
            transition_sent: false,
        }
    }

    pub(crate) fn hitbox(&self) -> Aabb {
        self.body.hitbox()
    }

    pub(crate) fn power(&self) -> PowerState {
        self.power
    }

    pub(crate) fn coins(&self) -> u32 {
        self.coins
    }

    /// False while a scripted sequence owns the hero.
    pub(crate) fn can_interact(&self) -> bool {
        self.death.is_none()
            && self.pipe.is_none()
            && self.exit.is_none()
            && self.powering.is_none()
    }

    pub(crate) fn is_falling(&self) -> bool {
        self.body.vel_y > 0.0
    }

    pub(crate) fn is_standing_on(&self, top_y: f32, left: f32, right: f32) -> bool {
        self.grounded
            && (self.body.bottom() - top_y).abs() < 0.5
            && self.body.x >= left
            && self.body.x + self.body.width <= right
    }

    pub(crate) fn bounce(&mut self) {
        self.body.vel_y = -STOMP_BOUNCE_SPEED;
        self.grounded = false;
        self.jump_boost = if self.jump_held {
            JUMP_HOLD_SECONDS
        } else {
            0.0
        };
    }

    pub(crate) fn collect_coin(&mut self) {
        self.coins = self.coins.saturating_add(1);
    }

    pub(crate) fn power_up(&mut self, power_up: PowerUp) {
        let target = match (power_up, self.power) {
            (PowerUp::Mushroom, PowerState::Small) => PowerState::Big,
            (PowerUp::Flower, PowerState::Small | PowerState::Big) => PowerState::Fire,
            _ => return,
        };
        self.start_power_change(target);
    }

    /// Damage from an enemy. Ignored while invincible.
    pub(crate) fn hurt(&mut self) {
        if self.invincibility > 0 || !self.can_interact() {
            return;
        }
        match self.power {
            PowerState::Small => self.die(),
            PowerState::Big | PowerState::Fire => {
                self.start_power_change(PowerState::Small);
                self.invincibility = INVINCIBILITY_FRAMES;
            }
        }
    }

    pub(crate) fn die(&mut self) {
        if self.death.is_some() {
            return;
        }
        debug!(
            x = self.body.x,
            y = self.body.y,
            coins = self.coins(),
            power = ?self.power(),
            "hero_died"
        );
        self.death = Some(Death {
            elapsed: 0.0,
            hopped: false,
        });
        self.powering = None;
        self.body.vel_x = 0.0;
        self.body.vel_y = 0.0;
    }

    pub(crate) fn enter_pipe(&mut self, center_x: f32, destination: String) {
        if self.pipe.is_some() {
            return;
        }
        debug!(destination = destination.as_str(), "hero_entered_pipe");
        self.body.x = center_x - self.body.width / 2.0;
        self.body.vel_x = 0.0;
        self.body.vel_y = 0.0;
        self.pipe = Some(PipeTransit {
            remaining: PIPE_SECONDS,
            destination,
        });
    }

    /// Starts the flagpole sequence: slide to `base_y`, then walk off.
    pub(crate) fn grab_flag(&mut self, pole_x: f32, base_y: f32, next: Option<String>) {
        if self.exit.is_some() {
            return;
        }
        debug!(pole_x, "hero_grabbed_flag");
        self.body.x = pole_x - self.body.width;
        self.body.vel_x = 0.0;
        self.body.vel_y = 0.0;
        self.exit = Some(ExitSequence::Slide { base_y, next });
    }

    fn start_power_change(&mut self, to: PowerState) {
        self.powering = Some(PowerChange {
            to,
            frames_left: POWER_CHANGE_FRAMES,
        });
    }

    fn set_power(&mut self, power: PowerState) {
        self.power = power;
        self.body.set_height(power.height());
    }

    fn request(&mut self, transition: LevelTransition) {
        if self.transition_sent {
            return;
        }
        self.transition_sent = true;
        self.transition = Some(transition);
    }

    fn update_death(&mut self, dt: f32) {
        let Some(death) = self.death.as_mut() else {
            return;
        };
        death.elapsed += dt;
        let elapsed = death.elapsed;
        if elapsed >= DEATH_PAUSE_SECONDS {
            if !death.hopped {
                death.hopped = true;
                self.body.vel_y = -DEATH_HOP_SPEED;
            }
            self.body.apply_gravity(GRAVITY, dt);
            self.body.drift(dt);
        }
        if elapsed >= DEATH_SECONDS {
            self.request(LevelTransition::Restart);
        }
    }

    fn update_power_change(&mut self) {
        let Some(change) = self.powering.as_mut() else {
            return;
        };
        change.frames_left = change.frames_left.saturating_sub(1);
        if change.frames_left == 0 {
            let to = change.to;
            self.powering = None;
            self.set_power(to);
        }
    }

    fn update_pipe(&mut self, dt: f32) {
        let Some(transit) = self.pipe.as_mut() else {
            return;
        };
        transit.remaining -= dt;
        let arrived = (transit.remaining <= 0.0).then(|| transit.destination.clone());
        self.body.y += PIPE_SINK_SPEED * dt;
        if let Some(level) = arrived {
            self.request(LevelTransition::Warp { level });
        }
    }

    fn update_exit(&mut self, level: &Level<Hero>, dt: f32) {
        self.exit = match self.exit.take() {
            Some(ExitSequence::Slide { base_y, next }) => {
                self.body.y = (self.body.y + FLAG_SLIDE_SPEED * dt).min(base_y - self.body.height);
                if self.body.bottom() >= base_y {
                    self.facing = Facing::Right;
                    Some(ExitSequence::Walk {
                        remaining: EXIT_WALK_DISTANCE,
                        next,
                    })
                } else {
                    Some(ExitSequence::Slide { base_y, next })
                }
            }
            Some(ExitSequence::Walk { remaining, next }) => {
                let start_x = self.body.x;
                self.body.vel_x = WALK_SPEED;
                self.body.apply_gravity(GRAVITY, dt);
                let contacts = self.body.move_through(level, dt);
                self.grounded = contacts.landed;
                let remaining = remaining - (self.body.x - start_x).abs();
                if remaining <= 0.0 || contacts.hit_wall() {
                    self.request(match next {
                        Some(level) => LevelTransition::Warp { level },
                        None => LevelTransition::Restart,
                    });
                    Some(ExitSequence::Done)
                } else {
                    Some(ExitSequence::Walk { remaining, next })
                }
            }
            other => other,
        };
    }

    fn update_motion(&mut self, ctx: &mut PlayerContext<'_, Hero>, dt: f32) {
        let speed = if self.running { RUN_SPEED } else { WALK_SPEED };
        let mut target = match self.walk {
            Walk::Idle => 0.0,
            Walk::Left => -speed,
            Walk::Right => speed,
        };
        if self.crouching && self.power != PowerState::Small && self.grounded {
            target = 0.0;
        }
        let rate = if target == 0.0 {
            DECELERATION
        } else {
            ACCELERATION
        };
        self.body.vel_x = approach(self.body.vel_x, target, rate * dt);

        let gravity = if self.jump_held && self.jump_boost > 0.0 && self.body.vel_y < 0.0 {
            self.jump_boost -= dt;
            HOLD_GRAVITY
        } else {
            self.jump_boost = 0.0;
            GRAVITY
        };
        self.body.apply_gravity(gravity, dt);

        let contacts = self.body.move_through(&*ctx.level, dt);
        self.grounded = contacts.landed;
        if let Some(cell) = contacts.ceiling {
            self.jump_boost = 0.0;
            self.bump_block(&mut *ctx.level, cell);
        }

        // The camera never scrolls back, so neither may the hero.
        let left_edge = ctx.frame.scroll_x;
        if self.body.x < left_edge {
            self.body.x = left_edge;
            self.body.vel_x = self.body.vel_x.max(0.0);
        }

        if self.fire_requested {
            self.fire_requested = false;
            if self.power == PowerState::Fire && ctx.fireballs.live_count() < MAX_LIVE_FIREBALLS {
                let muzzle_x = match self.facing {
                    Facing::Left => self.body.x - 4.0,
                    Facing::Right => self.body.x + self.body.width,
                };
                ctx.fireballs.spawn(Box::new(Fireball::new(
                    muzzle_x,
                    self.body.y + 4.0,
                    self.facing,
                )));
            }
        }
    }

    fn bump_block(&mut self, level: &mut Level<Hero>, cell: GridCell) {
        let strong = self.power != PowerState::Small;
        let Some(block) = level.blocks.get_mut(cell.row, cell.column) else {
            return;
        };
        let released = block.bump(strong);
        let broken = block.is_expired();
        if broken {
            level.blocks.take(cell.row, cell.column);
        }
        if let Some(item) = released {
            level.items.spawn(item);
        }

        let above = Aabb::new(
            cell.column as f32 * TILE,
            (cell.row as f32 - 1.0) * TILE,
            TILE,
            TILE,
        );
        for entity in level.enemies.iter_mut().chain(level.items.iter_mut()) {
            if entity.is_expired() {
                continue;
            }
            if entity
                .hitbox()
                .map_or(false, |hitbox| hitbox.intersects(&above))
            {
                entity.strike(Strike::Bump);
            }
        }
        debug!(row = cell.row, column = cell.column, strong, broken, "block_bumped");
    }

    #[cfg(test)]
    pub(crate) fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    #[cfg(test)]
    pub(crate) fn set_power_for_test(&mut self, power: PowerState) {
        self.set_power(power);
    }
}

fn approach(current: f32, target: f32, step: f32) -> f32 {
    if current < target {
        (current + step).min(target)
    } else {
        (current - step).max(target)
    }
}

impl Renderable for Hero {
    fn render(&self, surface: &mut dyn Surface, scroll_x: f32, scroll_y: f32) {
        // Alternate between the old and new form while transforming.
        let form = match self.powering {
            Some(change) if change.frames_left % 8 >= 4 => change.to,
            _ => self.power,
        };
        let height = form.height();
        let suit = form.suit();
        let top = self.body.bottom() - height;
        let shirt = Aabb::new(self.body.x, top, self.body.width, height / 2.0);
        let legs = Aabb::new(self.body.x, top + height / 2.0, self.body.width, height / 2.0);
        fill_level_rect(surface, shirt, scroll_x, scroll_y, suit.shirt);
        fill_level_rect(surface, legs, scroll_x, scroll_y, suit.overalls);
    }
}

impl Player for Hero {
    fn status(&self) -> PlayerStatus {
        PlayerStatus {
            x: self.body.x,
            y: self.body.y,
            running: self.running,
            jumping: !self.grounded && self.body.vel_y < 0.0,
            crouching: self.crouching,
            dying: self.death.is_some(),
            piping: self.pipe.is_some(),
            exiting: matches!(
                self.exit,
                Some(ExitSequence::Walk { .. } | ExitSequence::Done)
            ),
            no_input: self.exit.is_some(),
            invincibility_timer: self.invincibility,
            powering_frames: self.powering.map_or(0, |change| change.frames_left),
        }
    }

    fn run(&mut self) {
        // Fire shoots on the press edge of the run button.
        if !self.running && self.power == PowerState::Fire {
            self.fire_requested = true;
        }
        self.running = true;
    }

    fn no_run(&mut self) {
        self.running = false;
    }

    fn jump(&mut self) {
        if self.grounded && self.jump_ready {
            self.body.vel_y = -JUMP_SPEED;
            self.jump_boost = JUMP_HOLD_SECONDS;
            self.grounded = false;
            self.jump_ready = false;
        }
        self.jump_held = true;
    }

    fn no_jump(&mut self) {
        self.jump_held = false;
        self.jump_ready = true;
        self.jump_boost = 0.0;
    }

    fn crouch(&mut self) {
        self.crouching = true;
    }

    fn no_crouch(&mut self) {
        self.crouching = false;
    }

    fn move_left(&mut self) {
        self.walk = Walk::Left;
        self.facing = Facing::Left;
    }

    fn move_right(&mut self) {
        self.walk = Walk::Right;
        self.facing = Facing::Right;
    }

    fn no_walk(&mut self) {
        self.walk = Walk::Idle;
    }

    fn update(&mut self, ctx: &mut PlayerContext<'_, Self>) {
        let dt = ctx.frame.dt.min(MAX_STEP_SECONDS);
        if self.death.is_some() {
            self.update_death(dt);
            return;
        }
        if self.powering.is_some() {
            self.update_power_change();
            return;
        }
        self.invincibility = self.invincibility.saturating_sub(1);
        if self.pipe.is_some() {
            self.update_pipe(dt);
            return;
        }
        if self.exit.is_some() {
            self.update_exit(&*ctx.level, dt);
            return;
        }
        self.update_motion(ctx, dt);
    }

    fn check_collisions(&mut self, ctx: &mut PlayerContext<'_, Self>) {
        if self.death.is_some() || self.pipe.is_some() {
            return;
        }
        if self.body.y > level_bottom(&*ctx.level) {
            self.die();
        }
    }

    fn take_transition(&mut self) -> Option<LevelTransition> {
        self.transition.take()
    }
}
