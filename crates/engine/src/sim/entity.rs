use super::level::{Level, LevelTransition};
use super::projectiles::ProjectileSet;
use super::surface::Surface;

/// Per-frame values every collaborator may read.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameContext {
    /// Seconds since the previous tick, unclamped.
    pub dt: f32,
    /// Seconds of accumulated game time, this frame included.
    pub game_time: f64,
    pub scroll_x: f32,
    pub scroll_y: f32,
}

/// Axis-aligned box in level units; `y` grows downward.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Aabb {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Aabb {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn intersects(&self, other: &Aabb) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strike {
    Projectile,
    /// The block underneath was bumped from below.
    Bump,
}

pub trait Renderable {
    fn render(&self, surface: &mut dyn Surface, scroll_x: f32, scroll_y: f32);
}

pub trait Updatable<P> {
    fn update(&mut self, ctx: &mut EntityContext<'_, P>);
}

pub trait Collidable<P> {
    fn check_collisions(&mut self, _ctx: &mut EntityContext<'_, P>) {}

    fn hitbox(&self) -> Option<Aabb> {
        None
    }

    /// Returns `true` when the strike had an effect.
    fn strike(&mut self, _strike: Strike) -> bool {
        false
    }
}

/// Anything living in the item, enemy, pipe, or projectile collections.
pub trait Entity<P>: Updatable<P> + Collidable<P> + Renderable {
    fn debug_name(&self) -> &'static str {
        "entity"
    }

    /// Expired entities are skipped for the rest of the frame and dropped at
    /// the end-of-frame compaction.
    fn is_expired(&self) -> bool {
        false
    }
}

/// Block cells. A bump may release an item for the caller to spawn.
pub trait Bumpable<P>: Entity<P> {
    fn bump(&mut self, strong: bool) -> Option<Box<dyn Entity<P>>>;
}

/// Snapshot of the player flags the simulation schedules around.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerStatus {
    pub x: f32,
    pub y: f32,
    pub running: bool,
    pub jumping: bool,
    pub crouching: bool,
    pub dying: bool,
    pub piping: bool,
    pub exiting: bool,
    pub no_input: bool,
    pub invincibility_timer: u32,
    /// Frames left in a power-up/down transformation; zero when none plays.
    pub powering_frames: usize,
}

impl PlayerStatus {
    pub fn accepts_input(&self) -> bool {
        !self.piping && !self.dying && !self.no_input
    }

    pub fn freezes_world(&self) -> bool {
        self.powering_frames > 0 || self.dying
    }

    pub fn is_visible(&self) -> bool {
        self.invincibility_timer % 2 == 0
    }
}

pub trait Player: Renderable + Sized + 'static {
    fn status(&self) -> PlayerStatus;

    fn run(&mut self);
    fn no_run(&mut self);
    fn jump(&mut self);
    /// Called every input frame the jump button is up; jump height depends
    /// on the release edge.
    fn no_jump(&mut self);
    fn crouch(&mut self);
    fn no_crouch(&mut self);
    fn move_left(&mut self);
    fn move_right(&mut self);
    fn no_walk(&mut self);

    fn update(&mut self, ctx: &mut PlayerContext<'_, Self>);
    fn check_collisions(&mut self, ctx: &mut PlayerContext<'_, Self>);

    /// Hands over a pending level change, at most once per request.
    fn take_transition(&mut self) -> Option<LevelTransition> {
        None
    }
}

pub struct PlayerContext<'a, P> {
    pub frame: FrameContext,
    pub level: &'a mut Level<P>,
    pub fireballs: &'a mut ProjectileSet<P>,
}

pub struct EntityContext<'a, P> {
    pub frame: FrameContext,
    pub level: &'a mut Level<P>,
    pub fireballs: &'a mut ProjectileSet<P>,
    pub player: &'a mut P,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_edges_do_not_intersect() {
        let a = Aabb::new(0.0, 0.0, 16.0, 16.0);

        assert!(a.intersects(&Aabb::new(15.0, 15.0, 4.0, 4.0)));
        assert!(!a.intersects(&Aabb::new(16.0, 0.0, 16.0, 16.0)));
        assert!(!a.intersects(&Aabb::new(0.0, -16.0, 16.0, 16.0)));
    }

    #[test]
    fn zero_invincibility_is_visible() {
        let mut status = PlayerStatus::default();
        assert!(status.is_visible());

        status.invincibility_timer = 7;
        assert!(!status.is_visible());
        status.invincibility_timer = 6;
        assert!(status.is_visible());
    }

    #[test]
    fn input_gate_and_freeze_follow_flags() {
        let idle = PlayerStatus::default();
        assert!(idle.accepts_input());
        assert!(!idle.freezes_world());

        let piping = PlayerStatus {
            piping: true,
            ..PlayerStatus::default()
        };
        assert!(!piping.accepts_input());
        assert!(!piping.freezes_world());

        let powering = PlayerStatus {
            powering_frames: 3,
            ..PlayerStatus::default()
        };
        assert!(powering.accepts_input());
        assert!(powering.freezes_world());

        let dying = PlayerStatus {
            dying: true,
            ..PlayerStatus::default()
        };
        assert!(!dying.accepts_input());
        assert!(dying.freezes_world());
    }
}
