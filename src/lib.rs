pub mod cli;
pub mod config;
pub mod model;
pub mod render;
pub mod store;
