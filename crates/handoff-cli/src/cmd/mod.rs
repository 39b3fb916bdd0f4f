pub mod analytics;
pub mod config;
pub mod list;
pub mod monitor;
pub mod resume;
pub mod run;
pub mod show;
pub mod template;
