pub mod actions;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod http;
pub mod map;
pub mod metrics;
pub mod selection;
pub mod services;
pub mod state;
pub mod store;
