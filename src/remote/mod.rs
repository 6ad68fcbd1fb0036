pub mod client;

pub use client::{RemoteClient, RemoteError};
