pub mod config;
pub mod error;
pub mod features;
pub mod flags;
pub mod middleware;
pub mod openapi;
pub mod rate_limit;
pub mod routes;
pub mod state;

#[cfg(test)]
mod testing;
