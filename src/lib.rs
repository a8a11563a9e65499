//! Off-screen web surface registry.
//!
//! Create headless page surfaces, pump their render loop, read back RGBA8
//! frames under an explicit pixel lock, forward synthetic input, and
//! evaluate script in a per-surface context. Rust callers own an explicit
//! [`Registry`]; C callers get the same operations through the flat ABI in
//! [`ffi`].

pub mod bitmap;
pub mod config;
pub mod errors;
pub mod event;
pub mod ffi;
pub mod net;
pub mod platform;
pub mod registry;
pub mod renderer;
pub mod script;
pub mod view;

pub use config::{PlatformConfig, ViewConfig};
pub use errors::{Result, SurfaceError};
pub use registry::{Registry, SurfaceId};
pub use script::EvalOutcome;
pub use view::{PixelView, View};
