pub mod app;
pub mod sim;

pub use app::{run_app, AppError, FrameBuffer, LoopConfig, SLOW_FRAME_ENV_VAR};
pub use sim::{
    Aabb, Bumpable, Button, ButtonStates, CameraRule, Collidable, Color, ColorParseError,
    Entity, EntityContext, EntityList, FrameContext, FrameScheduler, GridCell, GridError,
    InputState, Level, LevelSource, LevelTransition, LoadedLevel, Player, PlayerContext,
    PlayerStatus, ProjectileSet, Renderable, SimConfig, SimulationLoop, Strike, Surface,
    TickReport, TileGrid, Updatable, Viewport,
};
