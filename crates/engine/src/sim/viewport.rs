use super::config::SimConfig;

/// Scroll window over the level, in level units.
///
/// `scroll_x` only moves forward during play. [`Viewport::reset`] is the one
/// way back to the origin and is reserved for level (re)loads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    scroll_x: f32,
    scroll_y: f32,
    width: f32,
    height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraRule {
    /// Flagpole sequence: the exit lead applies regardless of auto-scroll.
    ExitLead,
    AutoScroll,
    Hold,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            scroll_x: 0.0,
            scroll_y: 0.0,
            width,
            height,
        }
    }

    pub fn from_config(config: &SimConfig) -> Self {
        Self::new(config.viewport_width, config.viewport_height)
    }

    pub fn scroll_x(&self) -> f32 {
        self.scroll_x
    }

    pub fn scroll_y(&self) -> f32 {
        self.scroll_y
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn reset(&mut self) {
        self.scroll_x = 0.0;
        self.scroll_y = 0.0;
    }

    /// Applies one frame of camera tracking and reports which rule was in
    /// effect. At most one rule moves the camera per frame.
    pub(crate) fn track(
        &mut self,
        player_x: f32,
        exiting: bool,
        auto_scroll: bool,
        config: &SimConfig,
    ) -> CameraRule {
        if exiting {
            if player_x > self.scroll_x + config.exit_lead {
                self.advance_to(player_x - config.exit_lead);
            }
            return CameraRule::ExitLead;
        }
        if auto_scroll && player_x > self.scroll_x + config.camera_lead {
            self.advance_to(player_x - config.camera_lead);
            return CameraRule::AutoScroll;
        }
        CameraRule::Hold
    }

    fn advance_to(&mut self, target_x: f32) {
        // Also rejects NaN targets.
        if target_x > self.scroll_x {
            self.scroll_x = target_x;
        }
    }
}
