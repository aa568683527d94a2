pub mod config;
pub mod contentieux;
pub mod error;
pub mod immobilier;
pub mod import;
pub mod recouvrement;
pub mod store;
pub mod telemetry;
pub mod web;
