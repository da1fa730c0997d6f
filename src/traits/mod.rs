pub mod display_sink;
pub mod surface;
pub mod texture_device;

pub use display_sink::*;
pub use surface::*;
pub use texture_device::*;
