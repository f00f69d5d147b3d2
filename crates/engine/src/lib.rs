//! Session-scheduling core for the Coup game server: a hexagonal
//! application (`use_cases` orchestrated over `application::ports`
//! trait objects) with sqlx/reqwest/axum adapters in `infrastructure`.

pub mod application;
pub mod infrastructure;
pub mod run;
pub mod use_cases;
