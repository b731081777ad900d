//! Recording doubles for scheduling tests. Every call lands in one shared
//! log so ordering across entities, the player, and the surface is visible.

use std::cell::RefCell;
use std::rc::Rc;

use super::entity::{
    Aabb, Bumpable, Collidable, Entity, EntityContext, Player, PlayerContext, PlayerStatus,
    Renderable, Strike, Updatable,
};
use super::level::LevelTransition;
use super::simulation::FrameScheduler;
use super::surface::{Color, Surface};

#[derive(Debug, Clone, Default)]
pub(crate) struct CallLog {
    entries: Rc<RefCell<Vec<String>>>,
}

impl CallLog {
    pub(crate) fn push(&self, entry: impl Into<String>) {
        self.entries.borrow_mut().push(entry.into());
    }

    pub(crate) fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.entries.borrow_mut())
    }

    pub(crate) fn snapshot(&self) -> Vec<String> {
        self.entries.borrow().clone()
    }

    pub(crate) fn contains(&self, entry: &str) -> bool {
        self.entries.borrow().iter().any(|logged| logged == entry)
    }

    pub(crate) fn with_prefix(&self, prefix: &str) -> Vec<String> {
        self.entries
            .borrow()
            .iter()
            .filter(|logged| logged.starts_with(prefix))
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProbeAction {
    /// Strike every enemy visible in the level with a projectile hit.
    StrikeEnemies,
    SpawnItem(&'static str),
    SpawnFireball(&'static str),
    ExpireSelf,
}

pub(crate) struct Probe {
    name: &'static str,
    log: CallLog,
    expired: bool,
    dies_on_strike: bool,
    on_update: Vec<ProbeAction>,
}

impl Probe {
    pub(crate) fn new(name: &'static str, log: &CallLog) -> Self {
        Self {
            name,
            log: log.clone(),
            expired: false,
            dies_on_strike: true,
            on_update: Vec::new(),
        }
    }

    pub(crate) fn boxed(name: &'static str, log: &CallLog) -> Box<dyn Entity<ProbePlayer>> {
        Box::new(Self::new(name, log))
    }

    pub(crate) fn expired(name: &'static str, log: &CallLog) -> Box<dyn Entity<ProbePlayer>> {
        let mut probe = Self::new(name, log);
        probe.expired = true;
        Box::new(probe)
    }

    pub(crate) fn acting(
        name: &'static str,
        log: &CallLog,
        actions: &[ProbeAction],
    ) -> Box<dyn Entity<ProbePlayer>> {
        let mut probe = Self::new(name, log);
        probe.on_update = actions.to_vec();
        Box::new(probe)
    }
}

impl Renderable for Probe {
    fn render(&self, _surface: &mut dyn Surface, _scroll_x: f32, _scroll_y: f32) {
        self.log.push(format!("render:{}", self.name));
    }
}

impl Updatable<ProbePlayer> for Probe {
    fn update(&mut self, ctx: &mut EntityContext<'_, ProbePlayer>) {
        self.log.push(format!("update:{}", self.name));
        for action in self.on_update.clone() {
            match action {
                ProbeAction::StrikeEnemies => {
                    for enemy in ctx.level.enemies.iter_mut() {
                        enemy.strike(Strike::Projectile);
                    }
                }
                ProbeAction::SpawnItem(name) => ctx.level.items.spawn(Probe::boxed(name, &self.log)),
                ProbeAction::SpawnFireball(name) => {
                    ctx.fireballs.spawn(Probe::boxed(name, &self.log))
                }
                ProbeAction::ExpireSelf => self.expired = true,
            }
        }
    }
}

impl Collidable<ProbePlayer> for Probe {
    fn check_collisions(&mut self, _ctx: &mut EntityContext<'_, ProbePlayer>) {
        self.log.push(format!("collide:{}", self.name));
    }

    fn hitbox(&self) -> Option<Aabb> {
        Some(Aabb::new(0.0, 0.0, 16.0, 16.0))
    }

    fn strike(&mut self, strike: Strike) -> bool {
        self.log.push(format!("strike:{}:{strike:?}", self.name));
        if self.dies_on_strike {
            self.expired = true;
        }
        self.dies_on_strike
    }
}

impl Entity<ProbePlayer> for Probe {
    fn debug_name(&self) -> &'static str {
        self.name
    }

    fn is_expired(&self) -> bool {
        self.expired
    }
}

pub(crate) struct ProbeTile {
    name: &'static str,
    log: CallLog,
}

impl ProbeTile {
    pub(crate) fn boxed(name: &'static str, log: &CallLog) -> Box<dyn Renderable> {
        Box::new(Self {
            name,
            log: log.clone(),
        })
    }
}

impl Renderable for ProbeTile {
    fn render(&self, _surface: &mut dyn Surface, _scroll_x: f32, _scroll_y: f32) {
        self.log.push(format!("render:{}", self.name));
    }
}

pub(crate) struct ProbeBlock {
    inner: Probe,
}

impl ProbeBlock {
    pub(crate) fn boxed(name: &'static str, log: &CallLog) -> Box<dyn Bumpable<ProbePlayer>> {
        Box::new(Self {
            inner: Probe::new(name, log),
        })
    }

    pub(crate) fn breaking(name: &'static str, log: &CallLog) -> Box<dyn Bumpable<ProbePlayer>> {
        let mut inner = Probe::new(name, log);
        inner.on_update.push(ProbeAction::ExpireSelf);
        Box::new(Self { inner })
    }
}

impl Renderable for ProbeBlock {
    fn render(&self, surface: &mut dyn Surface, scroll_x: f32, scroll_y: f32) {
        self.inner.render(surface, scroll_x, scroll_y);
    }
}

impl Updatable<ProbePlayer> for ProbeBlock {
    fn update(&mut self, ctx: &mut EntityContext<'_, ProbePlayer>) {
        self.inner.update(ctx);
    }
}

impl Collidable<ProbePlayer> for ProbeBlock {}

impl Entity<ProbePlayer> for ProbeBlock {
    fn debug_name(&self) -> &'static str {
        self.inner.name
    }

    fn is_expired(&self) -> bool {
        self.inner.expired
    }
}

impl Bumpable<ProbePlayer> for ProbeBlock {
    fn bump(&mut self, _strong: bool) -> Option<Box<dyn Entity<ProbePlayer>>> {
        self.inner.log.push(format!("bump:{}", self.inner.name));
        None
    }
}

/// Player double with directly settable flags.
pub(crate) struct ProbePlayer {
    pub(crate) status: PlayerStatus,
    pub(crate) log: CallLog,
    /// Added to `x` on every update.
    pub(crate) stride: f32,
    pub(crate) on_update: Vec<ProbeAction>,
    pub(crate) last_frame_dt: Option<f32>,
    pub(crate) last_scroll_x: Option<f32>,
    pub(crate) transition: Option<LevelTransition>,
}

impl ProbePlayer {
    pub(crate) fn new(log: &CallLog) -> Self {
        Self {
            status: PlayerStatus::default(),
            log: log.clone(),
            stride: 0.0,
            on_update: Vec::new(),
            last_frame_dt: None,
            last_scroll_x: None,
            transition: None,
        }
    }

    pub(crate) fn at(log: &CallLog, x: f32) -> Self {
        let mut player = Self::new(log);
        player.status.x = x;
        player
    }
}

impl Renderable for ProbePlayer {
    fn render(&self, _surface: &mut dyn Surface, _scroll_x: f32, _scroll_y: f32) {
        self.log.push("render:player");
    }
}

impl Player for ProbePlayer {
    fn status(&self) -> PlayerStatus {
        self.status
    }

    fn run(&mut self) {
        self.log.push("intent:run");
    }

    fn no_run(&mut self) {
        self.log.push("intent:no_run");
    }

    fn jump(&mut self) {
        self.log.push("intent:jump");
    }

    fn no_jump(&mut self) {
        self.log.push("intent:no_jump");
    }

    fn crouch(&mut self) {
        self.log.push("intent:crouch");
    }

    fn no_crouch(&mut self) {
        self.log.push("intent:no_crouch");
    }

    fn move_left(&mut self) {
        self.log.push("intent:move_left");
    }

    fn move_right(&mut self) {
        self.log.push("intent:move_right");
    }

    fn no_walk(&mut self) {
        self.log.push("intent:no_walk");
    }

    fn update(&mut self, ctx: &mut PlayerContext<'_, Self>) {
        self.log.push("update:player");
        self.last_frame_dt = Some(ctx.frame.dt);
        self.last_scroll_x = Some(ctx.frame.scroll_x);
        self.status.x += self.stride;
        for action in self.on_update.clone() {
            if let ProbeAction::SpawnFireball(name) = action {
                ctx.fireballs.spawn(Probe::boxed(name, &self.log));
            }
        }
    }

    fn check_collisions(&mut self, _ctx: &mut PlayerContext<'_, Self>) {
        self.log.push("collide:player");
    }

    fn take_transition(&mut self) -> Option<LevelTransition> {
        self.transition.take()
    }
}

pub(crate) struct RecordingSurface {
    log: CallLog,
}

impl RecordingSurface {
    pub(crate) fn new(log: &CallLog) -> Self {
        Self { log: log.clone() }
    }
}

impl Surface for RecordingSurface {
    fn fill(&mut self, color: Color) {
        self.log.push(format!(
            "fill:#{:02x}{:02x}{:02x}",
            color.r, color.g, color.b
        ));
    }

    fn fill_rect(&mut self, _x: i32, _y: i32, _width: u32, _height: u32, _color: Color) {}
}

#[derive(Debug, Default)]
pub(crate) struct CountingScheduler {
    pub(crate) requests: u32,
}

impl FrameScheduler for CountingScheduler {
    fn request_frame(&mut self) {
        self.requests += 1;
    }
}
