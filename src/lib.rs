//! Procedural terrain viewer core: heightfield synthesis, lighting normals and
//! a free-flying camera driven by a fixed-rate tick.

pub mod camera;
pub mod config;
pub mod display;
pub mod heightfield;
pub mod math;
pub mod normals;
pub mod sim;
pub mod terrain;
pub mod world;

pub use camera::{FlyCamera, MoveDirection, Projection};
pub use config::ViewerConfig;
pub use heightfield::{GridSize, Heightfield, NormalField};
pub use sim::{FixedClock, Viewer};
pub use world::Terrain;
