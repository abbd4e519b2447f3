pub mod analytics;
pub mod calc;
pub mod catalog;
pub mod db;
pub mod export;
pub mod ipc;
pub mod logging;
pub mod model;
pub mod ranking;
pub mod recompute;
pub mod revision;
pub mod seed;
