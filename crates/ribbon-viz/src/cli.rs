//! Command-line argument parsing.

use clap::Parser;

/// Command line arguments
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "ribbon-viz")]
#[command(about = "Audio-reactive ribbon visualizer", long_about = None)]
pub struct Args {
    /// List audio devices with their indices and exit
    #[arg(long)]
    pub list_devices: bool,

    /// Capture device index from --list-devices (remembered in the config)
    #[arg(long, value_name = "INDEX")]
    pub device: Option<usize>,
}
