//! YTML: a retained-mode UI document (markup + stylesheet + layout) drawn
//! over a paintable terrain grid, with a ring of frame resources so the CPU
//! can record frame N+1 while the GPU consumes frame N.

pub mod app;
pub mod config;
pub mod scene;
pub mod style;
pub mod terrain;
pub mod ui;
pub mod view;

pub use app::{App, AppError, Diagnostics, FrameReport, FrameTime, PointerButton};
pub use config::{Config, ConfigError};
