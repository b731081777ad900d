use std::cell::RefCell;
use std::env;
use std::rc::Rc;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use pixels::{Error as PixelsError, Pixels, SurfaceTexture};
use thiserror::Error;
use tracing::{info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::{Window, WindowBuilder};

use crate::sim::{
    FrameScheduler, LevelSource, LevelTransition, LoadedLevel, Player, SimConfig, SimulationLoop,
};

use super::frame_buffer::FrameBuffer;
use super::input::InputCollector;
use super::metrics::FrameMetrics;

pub const SLOW_FRAME_ENV_VAR: &str = "SCROLL_SLOW_FRAME_MS";

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    /// Framebuffer resolution; the window scales it up.
    pub logical_width: u32,
    pub logical_height: u32,
    pub metrics_log_interval: Duration,
    /// Frames slower than this are logged. They are never clamped.
    pub stall_warning: Duration,
    pub simulated_slow_frame_ms: u64,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Scroll".to_string(),
            window_width: 762,
            window_height: 720,
            logical_width: 256,
            logical_height: 240,
            metrics_log_interval: Duration::from_secs(1),
            stall_warning: Duration::from_millis(250),
            simulated_slow_frame_ms: 0,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("failed to present frame: {0}")]
    Present(#[source] PixelsError),
    #[error("failed to load level: {0}")]
    LevelLoad(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

/// Re-arms the event loop by asking the window for another redraw.
struct WindowRedraw<'w> {
    window: &'w Window,
}

impl FrameScheduler for WindowRedraw<'_> {
    fn request_frame(&mut self) {
        self.window.request_redraw();
    }
}

pub fn run_app<P, L>(
    config: LoopConfig,
    sim_config: SimConfig,
    mut levels: L,
) -> Result<(), AppError>
where
    P: Player,
    L: LevelSource<P> + 'static,
{
    let LoadedLevel {
        name,
        level,
        player,
    } = load_from(&mut levels, None)?;
    let mut simulation = SimulationLoop::new(sim_config, level, player);
    info!(
        level = %name,
        entity_count = simulation.level().entity_count(),
        "level_loaded"
    );

    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let size = window.inner_size();
    let mut pixels = Pixels::new(
        config.logical_width,
        config.logical_height,
        SurfaceTexture::new(size.width, size.height, Arc::clone(&window)),
    )
    .map_err(AppError::CreateRenderer)?;

    // Redraws are requested only by the simulation tick; nothing polls.
    event_loop.set_control_flow(ControlFlow::Wait);

    let metrics_log_interval =
        normalize_non_zero_duration(config.metrics_log_interval, Duration::from_secs(1));
    let slow_frame_delay = resolve_slow_frame_delay(config.simulated_slow_frame_ms);
    info!(
        logical_width = config.logical_width,
        logical_height = config.logical_height,
        metrics_log_interval_ms = metrics_log_interval.as_millis() as u64,
        slow_frame_delay_ms = slow_frame_delay.as_millis() as u64,
        "loop_config"
    );

    let mut input_collector = InputCollector::default();
    let start = Instant::now();
    let mut frame_metrics = FrameMetrics::new(metrics_log_interval, start);
    simulation.start(start);
    window.request_redraw();

    let failure: Rc<RefCell<Option<AppError>>> = Rc::new(RefCell::new(None));
    let failure_in_loop = Rc::clone(&failure);
    let window_for_loop = Arc::clone(&window);

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window_for_loop.id() => {
                match event {
                    WindowEvent::CloseRequested => {
                        input_collector.mark_quit_requested();
                        info!(reason = "window_close", "shutdown_requested");
                        window_target.exit();
                    }
                    WindowEvent::Resized(new_size) => {
                        if new_size.width == 0 || new_size.height == 0 {
                            return;
                        }
                        if let Err(error) = pixels.resize_surface(new_size.width, new_size.height)
                        {
                            warn!(error = %error, "renderer_resize_failed");
                            window_target.exit();
                        }
                    }
                    WindowEvent::Focused(false) => {
                        input_collector.handle_focus_lost();
                    }
                    WindowEvent::KeyboardInput { event, .. } => {
                        input_collector.handle_keyboard_input(&event);
                        if input_collector.quit_requested() {
                            info!(reason = "escape_key", "shutdown_requested");
                            window_target.exit();
                        }
                    }
                    WindowEvent::RedrawRequested => {
                        if slow_frame_delay > Duration::ZERO {
                            thread::sleep(slow_frame_delay);
                        }

                        let now = Instant::now();
                        let Some(mut frame) = FrameBuffer::new(
                            pixels.frame_mut(),
                            config.logical_width,
                            config.logical_height,
                        ) else {
                            warn!("framebuffer_size_mismatch");
                            window_target.exit();
                            return;
                        };
                        let mut scheduler = WindowRedraw {
                            window: &window_for_loop,
                        };
                        let report = simulation.tick(
                            now,
                            input_collector.buttons(),
                            &mut frame,
                            &mut scheduler,
                        );

                        if let Err(error) = pixels.render() {
                            warn!(error = %error, "renderer_draw_failed");
                            *failure_in_loop.borrow_mut() = Some(AppError::Present(error));
                            window_target.exit();
                            return;
                        }

                        let frame_dt = Duration::from_secs_f32(report.dt.max(0.0));
                        let stalled = is_stall(frame_dt, config.stall_warning);
                        if stalled {
                            warn!(
                                frame_ms = frame_dt.as_millis() as u64,
                                "frame_stall"
                            );
                        }
                        frame_metrics.record_frame(frame_dt, stalled);

                        if let Some(transition) = report.transition {
                            match load_from(&mut levels, Some(&transition)) {
                                Ok(loaded) => {
                                    info!(
                                        ?transition,
                                        level = %loaded.name,
                                        entity_count = loaded.level.entity_count(),
                                        "level_transition"
                                    );
                                    simulation.load_level(loaded.level, loaded.player);
                                }
                                Err(error) => {
                                    warn!(error = %error, ?transition, "level_load_failed");
                                    *failure_in_loop.borrow_mut() = Some(error);
                                    window_target.exit();
                                    return;
                                }
                            }
                        }

                        if let Some(summary) = frame_metrics.take_interval(now) {
                            info!(
                                fps = summary.fps,
                                avg_frame_ms = summary.avg_frame_ms,
                                worst_frame_ms = summary.worst_frame_ms,
                                stalls = summary.stalls,
                                entity_count = simulation.level().entity_count(),
                                scroll_x = simulation.viewport().scroll_x(),
                                "loop_metrics"
                            );
                        }
                    }
                    _ => {}
                }
            }
            Event::LoopExiting => {
                let totals = frame_metrics.totals();
                info!(
                    game_time = simulation.game_time(),
                    frames = totals.frames,
                    stalls = totals.stalls,
                    "shutdown"
                );
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)?;

    let failure = failure.borrow_mut().take();
    match failure {
        Some(error) => Err(error),
        None => Ok(()),
    }
}

fn load_from<P, L>(
    levels: &mut L,
    transition: Option<&LevelTransition>,
) -> Result<LoadedLevel<P>, AppError>
where
    L: LevelSource<P>,
{
    levels
        .load(transition)
        .map_err(|error| AppError::LevelLoad(Box::new(error)))
}

fn is_stall(frame_dt: Duration, threshold: Duration) -> bool {
    !threshold.is_zero() && frame_dt > threshold
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

fn resolve_slow_frame_delay(config_slow_frame_ms: u64) -> Duration {
    slow_frame_delay_from(env::var(SLOW_FRAME_ENV_VAR), config_slow_frame_ms)
}

fn slow_frame_delay_from(
    value: Result<String, env::VarError>,
    config_slow_frame_ms: u64,
) -> Duration {
    match value {
        Ok(value) => match value.trim().parse::<u64>() {
            Ok(ms) => Duration::from_millis(ms),
            Err(_) => {
                warn!(
                    env_var = SLOW_FRAME_ENV_VAR,
                    value = value.as_str(),
                    "invalid slow-frame env var value; falling back to config"
                );
                Duration::from_millis(config_slow_frame_ms)
            }
        },
        Err(env::VarError::NotPresent) => Duration::from_millis(config_slow_frame_ms),
        Err(err) => {
            warn!(
                env_var = SLOW_FRAME_ENV_VAR,
                error = %err,
                "unable to read slow-frame env var; falling back to config"
            );
            Duration::from_millis(config_slow_frame_ms)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;

    use super::*;

    #[test]
    fn default_config_matches_three_times_logical_size() {
        let config = LoopConfig::default();

        assert_eq!((config.logical_width, config.logical_height), (256, 240));
        assert_eq!((config.window_width, config.window_height), (762, 720));
    }

    #[test]
    fn slow_frame_env_value_overrides_config() {
        assert_eq!(
            slow_frame_delay_from(Ok("40".to_string()), 0),
            Duration::from_millis(40)
        );
    }

    #[test]
    fn invalid_slow_frame_value_falls_back_to_config() {
        assert_eq!(
            slow_frame_delay_from(Ok("fast".to_string()), 12),
            Duration::from_millis(12)
        );
        assert_eq!(
            slow_frame_delay_from(Err(env::VarError::NotUnicode(OsString::from("x"))), 7),
            Duration::from_millis(7)
        );
    }

    #[test]
    fn missing_slow_frame_value_uses_config() {
        assert_eq!(
            slow_frame_delay_from(Err(env::VarError::NotPresent), 0),
            Duration::ZERO
        );
    }

    #[test]
    fn stall_detection_is_strictly_above_threshold() {
        let threshold = Duration::from_millis(250);

        assert!(!is_stall(Duration::from_millis(250), threshold));
        assert!(is_stall(Duration::from_millis(251), threshold));
        assert!(!is_stall(Duration::from_secs(5), Duration::ZERO));
    }

    #[test]
    fn zero_metrics_interval_falls_back() {
        assert_eq!(
            normalize_non_zero_duration(Duration::ZERO, Duration::from_secs(1)),
            Duration::from_secs(1)
        );
        assert_eq!(
            normalize_non_zero_duration(Duration::from_millis(500), Duration::from_secs(1)),
            Duration::from_millis(500)
        );
    }
}
