use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::LevelFilter;
use tracer_shared::RaytracerConfig;

use crate::renderer::RenderMode;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Renderer used by a windowless run
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HeadlessMode {
    Cpu,
    Compute,
    Fragment,
}

#[derive(Parser, Debug)]
#[command(name = "sphere_tracer")]
#[command(about = "Interactive Phong sphere ray tracer with GPU and CPU paths")]
pub struct Args {
    /// Window width in pixels
    #[arg(long, default_value_t = RaytracerConfig::WINDOW_WIDTH, value_parser = clap::value_parser!(u32).range(1..))]
    pub width: u32,

    /// Window height in pixels
    #[arg(long, default_value_t = RaytracerConfig::WINDOW_HEIGHT, value_parser = clap::value_parser!(u32).range(1..))]
    pub height: u32,

    /// GPU path used at startup
    #[arg(long, value_enum, default_value = "compute")]
    pub mode: RenderMode,

    /// Directory screenshots are written to
    #[arg(long, default_value = "output")]
    pub output_dir: PathBuf,

    /// Screenshot file name prefix
    #[arg(long, default_value = "screenshot")]
    pub prefix: String,

    #[arg(long, value_enum, default_value = "info", help = "Set the logging level")]
    pub log_level: LogLevel,

    /// Render a single frame without a window, save it and exit
    #[arg(long, value_enum)]
    pub headless: Option<HeadlessMode>,
}
