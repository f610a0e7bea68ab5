use std::path::PathBuf;

use clap::{Parser, Subcommand};
use viewpipe_common::SizeHint;
use viewpipe_config::WindowDefaults;

/// viewpipe: open native webview windows and drive them from the terminal.
#[derive(Parser, Debug)]
#[command(name = "viewpipe", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log filter override, e.g. `debug` or `viewpipe=trace`.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Open one or more windows and wait until they are all closed.
    Open(OpenArgs),
    /// Print the effective configuration as JSON.
    Config,
}

#[derive(clap::Args, Debug, Default)]
pub struct OpenArgs {
    /// Page to load once the window is ready.
    #[arg(long)]
    pub url: Option<String>,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub width: Option<u32>,

    #[arg(long)]
    pub height: Option<u32>,

    /// Size hint: none, min, max or fixed.
    #[arg(long)]
    pub hint: Option<SizeHint>,

    /// Number of independent windows to open.
    #[arg(long, default_value_t = 1)]
    pub windows: usize,

    /// Forward native stderr at info level.
    #[arg(short, long)]
    pub verbose: bool,
}

impl OpenArgs {
    /// Overlay command-line values on the configured window defaults.
    pub fn window_settings(&self, defaults: &WindowDefaults) -> WindowDefaults {
        WindowDefaults {
            title: self.title.clone().unwrap_or_else(|| defaults.title.clone()),
            width: self.width.unwrap_or(defaults.width),
            height: self.height.unwrap_or(defaults.height),
            size_hint: self.hint.unwrap_or(defaults.size_hint),
            url: self.url.clone().or_else(|| defaults.url.clone()),
        }
    }
}

pub fn parse() -> Args {
    Args::parse()
}
