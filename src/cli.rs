// cli.rs - Command-line interface configuration
use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "fb-presenter")]
#[command(about = "Presents a framebuffer source with a cursor overlay on a GPU surface", long_about = None)]
pub struct Cli {
    /// JSON presenter config
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Initial window width in logical pixels
    #[arg(long, default_value_t = 800)]
    pub width: u32,

    /// Initial window height in logical pixels
    #[arg(long, default_value_t = 600)]
    pub height: u32,

    /// Height of the chrome band above the content
    #[arg(long = "title-height", default_value_t = 0.0)]
    pub title_height: f32,

    /// Mark the chrome as blurred
    #[arg(long)]
    pub blurred: bool,

    /// Present without waiting for vertical sync
    #[arg(long = "no-vsync")]
    pub no_vsync: bool,
}
