//! Core translation front-end module

pub mod config;
pub mod detect;
pub mod engine;
pub mod errors;
pub mod lang;
pub mod models;
pub mod registry;
pub mod service;
