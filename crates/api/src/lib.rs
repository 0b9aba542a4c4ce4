//! HTTP front end: server wiring, routing, rendering and error mapping.

pub mod app;
pub mod config;
pub mod middleware;
