//! Concrete adapters for the ports declared in `application::ports`,
//! plus the composition root (`config`, `state`) that wires them up.

pub mod config;
pub mod gateway;
pub mod http;
pub mod persistence;
pub mod scheduler;
pub mod state;
