pub mod cli;
pub mod config;
pub mod core;
pub mod demo;
pub mod traits;

pub use crate::config::PresenterConfig;
pub use crate::core::{DirtyUpdate, FramePlan, FrameStatus, Presenter};
pub use crate::traits::{DisplaySink, PresentableSurface, TextureDevice};
