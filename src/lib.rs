pub mod commands;
pub mod config;
pub mod logging;
pub mod services;

pub use config::AppConfig;
pub use services::{parse, RenderedBlock, SectionKind, SolutionParser};
