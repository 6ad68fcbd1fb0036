//! toolrunner — tool-calling agent service.
//!
//! Sends a user's request to a hosted chat model together with a set of
//! tools, executes the tools the model asks for, feeds the results back and
//! repeats until the model answers.

pub mod agent;
pub mod api;
pub mod app;
pub mod config;
pub mod inference;
pub mod remote;
pub mod tools;
pub mod types;
