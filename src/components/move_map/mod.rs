mod api;
mod component;
mod config;
mod error;
mod gesture;
mod lines;
mod mode;
mod overlay;
mod state;
mod types;

pub use component::MoveMapCanvas;
pub use config::MoveMapConfig;
pub use types::MoveMapData;
