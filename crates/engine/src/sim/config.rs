/// Tuning shared by the orchestrator, the grids, and the camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimConfig {
    pub tile_size: f32,
    pub grid_rows: usize,
    /// Columns drawn to the left of the first visible column.
    pub overscan_columns: i32,
    /// Total width of the column scan, overscan included.
    pub window_columns: i32,
    pub camera_lead: f32,
    pub exit_lead: f32,
    pub viewport_width: f32,
    pub viewport_height: f32,
}

pub const DEFAULT_TILE_SIZE: f32 = 16.0;
pub const DEFAULT_GRID_ROWS: usize = 15;

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
            grid_rows: DEFAULT_GRID_ROWS,
            overscan_columns: 1,
            window_columns: 21,
            camera_lead: 80.0,
            exit_lead: 96.0,
            viewport_width: 256.0,
            viewport_height: 240.0,
        }
    }
}
