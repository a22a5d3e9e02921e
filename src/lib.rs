//! Provider Console Library
//!
//! API clients for hospital provider administration, the response cache they
//! share, and the pieces of the command-line front end used by integration
//! tests.

pub mod app;
pub mod cache;
pub mod cli;
pub mod config;
pub mod data;
pub mod session;
