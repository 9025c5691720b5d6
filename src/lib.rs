pub mod app;
pub mod broker;
pub mod config;
pub mod error;
pub mod event;
pub mod logging;
pub mod metrics;
pub mod server;
pub mod stomp;
