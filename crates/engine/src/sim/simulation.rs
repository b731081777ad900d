use std::time::Instant;

use tracing::{debug, trace};

use super::config::SimConfig;
use super::entity::{EntityContext, FrameContext, Player, PlayerContext};
use super::entity_list::{CompactStats, EntityList};
use super::grid::{ColumnWindow, GridCell};
use super::input::{Button, InputState};
use super::level::{Level, LevelTransition};
use super::projectiles::ProjectileSet;
use super::surface::Surface;
use super::viewport::{CameraRule, Viewport};

/// Host hook that re-arms the loop before the next paint.
pub trait FrameScheduler {
    fn request_frame(&mut self);
}

/// Everything one frame mutates, owned in one place.
pub struct World<P> {
    pub viewport: Viewport,
    pub level: Level<P>,
    pub player: P,
    pub fireballs: ProjectileSet<P>,
}

/// Block cells seen by the last render, double buffered.
///
/// Render fills `collecting` and publishes it as `pending` when it finishes;
/// the next update drives exactly the published cells before anything else.
#[derive(Debug, Default)]
pub struct ActiveStatics {
    collecting: Vec<GridCell>,
    pending: Vec<GridCell>,
}

impl ActiveStatics {
    pub fn pending(&self) -> &[GridCell] {
        &self.pending
    }

    fn begin_collect(&mut self) {
        self.collecting.clear();
    }

    fn record(&mut self, cell: GridCell) {
        self.collecting.push(cell);
    }

    fn publish(&mut self) {
        std::mem::swap(&mut self.collecting, &mut self.pending);
        self.collecting.clear();
    }

    fn clear(&mut self) {
        self.collecting.clear();
        self.pending.clear();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Collection {
    Items,
    Enemies,
    Fireballs,
    Pipes,
}

const COLLECTION_ORDER: [Collection; 4] = [
    Collection::Items,
    Collection::Enemies,
    Collection::Fireballs,
    Collection::Pipes,
];

impl Collection {
    fn list<'w, P>(
        self,
        level: &'w mut Level<P>,
        fireballs: &'w mut ProjectileSet<P>,
    ) -> &'w mut EntityList<P> {
        match self {
            Collection::Items => &mut level.items,
            Collection::Enemies => &mut level.enemies,
            Collection::Fireballs => fireballs.list_mut(),
            Collection::Pipes => &mut level.pipes,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Update,
    Collide,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateReport {
    pub input_applied: bool,
    pub camera: CameraRule,
    pub frozen: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub dt: f32,
    pub update: UpdateReport,
    pub collisions_resolved: bool,
    pub compacted: CompactStats,
    pub transition: Option<LevelTransition>,
}

/// Frame orchestrator: update, then collisions, then render, in fixed order.
pub struct SimulationLoop<P: Player> {
    config: SimConfig,
    world: World<P>,
    active_statics: ActiveStatics,
    game_time: f64,
    last_dt: f32,
    last_tick: Option<Instant>,
    frozen: bool,
}

impl<P: Player> SimulationLoop<P> {
    pub fn new(config: SimConfig, level: Level<P>, player: P) -> Self {
        let loop_state = Self {
            config,
            world: World {
                viewport: Viewport::from_config(&config),
                level,
                player,
                fireballs: ProjectileSet::default(),
            },
            active_statics: ActiveStatics::default(),
            game_time: 0.0,
            last_dt: 0.0,
            last_tick: None,
            frozen: false,
        };
        debug!(
            entity_count = loop_state.world.level.entity_count(),
            auto_scroll = loop_state.world.level.auto_scroll,
            "level_loaded"
        );
        loop_state
    }

    /// Swaps in a freshly loaded level. The camera returns to the origin and
    /// frame-scoped state from the old level is dropped.
    pub fn load_level(&mut self, level: Level<P>, player: P) {
        self.world.level = level;
        self.world.player = player;
        self.world.viewport.reset();
        self.world.fireballs.clear();
        self.active_statics.clear();
        self.frozen = false;
        debug!(
            entity_count = self.world.level.entity_count(),
            auto_scroll = self.world.level.auto_scroll,
            "level_loaded"
        );
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn world(&self) -> &World<P> {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World<P> {
        &mut self.world
    }

    pub fn viewport(&self) -> &Viewport {
        &self.world.viewport
    }

    pub fn level(&self) -> &Level<P> {
        &self.world.level
    }

    pub fn player(&self) -> &P {
        &self.world.player
    }

    pub fn player_mut(&mut self) -> &mut P {
        &mut self.world.player
    }

    pub fn fireballs(&self) -> &ProjectileSet<P> {
        &self.world.fireballs
    }

    pub fn active_statics(&self) -> &ActiveStatics {
        &self.active_statics
    }

    pub fn game_time(&self) -> f64 {
        self.game_time
    }

    /// Sets the reference instant for the first tick's delta.
    pub fn start(&mut self, now: Instant) {
        self.last_tick = Some(now);
    }

    /// One host frame. The delta is wall-clock time since the previous tick
    /// and is passed through unclamped.
    pub fn tick(
        &mut self,
        now: Instant,
        input: &dyn InputState,
        surface: &mut dyn Surface,
        scheduler: &mut dyn FrameScheduler,
    ) -> TickReport {
        let dt = match self.last_tick {
            Some(last) => now.saturating_duration_since(last).as_secs_f32(),
            None => 0.0,
        };
        self.last_tick = Some(now);

        let report = self.step(dt, input);
        self.render(surface);
        scheduler.request_frame();
        report
    }

    /// Update and collision resolution for one frame, then end-of-frame
    /// compaction of every entity collection.
    pub fn step(&mut self, dt: f32, input: &dyn InputState) -> TickReport {
        let update = self.update(dt, input);
        let collisions_resolved = self.check_collisions();
        let compacted = self.compact();
        let transition = self.world.player.take_transition();
        if let Some(transition) = &transition {
            debug!(?transition, "level_transition_requested");
        }
        TickReport {
            dt,
            update,
            collisions_resolved,
            compacted,
            transition,
        }
    }

    pub fn update(&mut self, dt: f32, input: &dyn InputState) -> UpdateReport {
        self.game_time += f64::from(dt);
        self.last_dt = dt;

        let input_applied = self.apply_input(input);

        let frame = self.frame_context();
        {
            let World {
                level,
                player,
                fireballs,
                ..
            } = &mut self.world;
            let mut ctx = PlayerContext {
                frame,
                level,
                fireballs,
            };
            player.update(&mut ctx);
        }

        self.update_active_statics();

        let status = self.world.player.status();
        let camera = self.world.viewport.track(
            status.x,
            status.exiting,
            self.world.level.auto_scroll,
            &self.config,
        );

        let frozen = status.freezes_world();
        if frozen != self.frozen {
            debug!(
                frozen,
                dying = status.dying,
                powering_frames = status.powering_frames,
                "world_freeze_changed"
            );
            self.frozen = frozen;
        }
        if !frozen {
            for collection in COLLECTION_ORDER {
                self.drive(collection, Phase::Update);
            }
        }

        UpdateReport {
            input_applied,
            camera,
            frozen,
        }
    }

    /// Returns `false` when the world is frozen and nothing was resolved.
    pub fn check_collisions(&mut self) -> bool {
        if self.world.player.status().freezes_world() {
            return false;
        }

        let frame = self.frame_context();
        {
            let World {
                level,
                player,
                fireballs,
                ..
            } = &mut self.world;
            let mut ctx = PlayerContext {
                frame,
                level,
                fireballs,
            };
            player.check_collisions(&mut ctx);
        }

        for collection in COLLECTION_ORDER {
            self.drive(collection, Phase::Collide);
        }
        true
    }

    pub fn compact(&mut self) -> CompactStats {
        let stats = self
            .world
            .level
            .compact()
            .merge(self.world.fireballs.compact());
        if stats != CompactStats::default() {
            trace!(removed = stats.removed, spawned = stats.spawned, "entities_compacted");
        }
        stats
    }

    pub fn render(&mut self, surface: &mut dyn Surface) {
        self.active_statics.begin_collect();

        let scroll_x = self.world.viewport.scroll_x();
        let scroll_y = self.world.viewport.scroll_y();
        let window = ColumnWindow::around(scroll_x, &self.config);
        let level = &self.world.level;

        surface.fill(level.background);

        for row in 0..self.config.grid_rows {
            for column in window.columns() {
                if let Some(tile) = level.scenery.get(row, column) {
                    tile.render(surface, scroll_x, scroll_y);
                }
            }
        }

        let lower_layers = level
            .items
            .iter()
            .chain(level.enemies.iter())
            .chain(self.world.fireballs.iter());
        for entity in lower_layers.filter(|entity| !entity.is_expired()) {
            entity.render(surface, scroll_x, scroll_y);
        }

        for row in 0..self.config.grid_rows {
            for column in window.columns() {
                if let Some(tile) = level.statics.get(row, column) {
                    tile.render(surface, scroll_x, scroll_y);
                }
                if let Some(block) = level.blocks.get(row, column) {
                    block.render(surface, scroll_x, scroll_y);
                    self.active_statics.record(GridCell::new(row, column));
                }
            }
        }

        if self.world.player.status().is_visible() {
            self.world.player.render(surface, scroll_x, scroll_y);
        }

        // Pipes cover the player so pipe transit reads as going inside.
        for pipe in level.pipes.iter().filter(|pipe| !pipe.is_expired()) {
            pipe.render(surface, scroll_x, scroll_y);
        }

        self.active_statics.publish();
    }

    fn apply_input(&mut self, input: &dyn InputState) -> bool {
        if !self.world.player.status().accepts_input() {
            return false;
        }

        let player = &mut self.world.player;
        if input.is_down(Button::Run) {
            player.run();
        } else {
            player.no_run();
        }
        if input.is_down(Button::Jump) {
            player.jump();
        } else {
            player.no_jump();
        }
        if input.is_down(Button::Down) {
            player.crouch();
        } else {
            player.no_crouch();
        }
        if input.is_down(Button::Left) {
            player.move_left();
        } else if input.is_down(Button::Right) {
            player.move_right();
        } else {
            player.no_walk();
        }
        true
    }

    fn update_active_statics(&mut self) {
        let frame = self.frame_context();
        let World {
            level,
            player,
            fireballs,
            ..
        } = &mut self.world;

        for cell in self.active_statics.pending() {
            // The cell may have been emptied since it was drawn.
            let Some(mut block) = level.blocks.take(cell.row, cell.column) else {
                continue;
            };
            {
                let mut ctx = EntityContext {
                    frame,
                    level: &mut *level,
                    fireballs: &mut *fireballs,
                    player: &mut *player,
                };
                block.update(&mut ctx);
            }
            if block.is_expired() {
                trace!(row = cell.row, column = cell.column, "block_removed");
            } else {
                level.blocks.restore(cell.row, cell.column, block);
            }
        }
    }

    fn drive(&mut self, collection: Collection, phase: Phase) {
        let frame = self.frame_context();
        let World {
            level,
            player,
            fireballs,
            ..
        } = &mut self.world;

        let slot_count = collection.list(level, fireballs).slot_count();
        for index in 0..slot_count {
            let Some(mut entity) = collection.list(level, fireballs).take(index) else {
                continue;
            };
            if !entity.is_expired() {
                let mut ctx = EntityContext {
                    frame,
                    level: &mut *level,
                    fireballs: &mut *fireballs,
                    player: &mut *player,
                };
                match phase {
                    Phase::Update => entity.update(&mut ctx),
                    Phase::Collide => entity.check_collisions(&mut ctx),
                }
            }
            collection.list(level, fireballs).restore(index, entity);
        }
    }

    fn frame_context(&self) -> FrameContext {
        FrameContext {
            dt: self.last_dt,
            game_time: self.game_time,
            scroll_x: self.world.viewport.scroll_x(),
            scroll_y: self.world.viewport.scroll_y(),
        }
    }
}

#[cfg(test)]
mod tests {
    include!("simulation_tests.rs");
}
