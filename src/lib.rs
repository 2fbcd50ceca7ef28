pub mod config;
pub mod correlation;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod startup;
pub mod telemetry;
pub mod validation;
