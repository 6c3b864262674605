//! Network Module
//!
//! TCP server and client handling.
//!
//! ## Architecture
//! - Single acceptor loop
//! - One thread per connection
//! - Commands routed through Engine
//! - Sweep and snapshot run from accept hooks

mod server;
mod connection;
mod hooks;
mod client;

pub use server::{Server, ShutdownHandle};
pub use connection::Connection;
pub use hooks::{AcceptHook, DefaultHooks, NoHooks};
pub use client::{Client, CONTINUATION_THRESHOLD, CONTINUATION_WAIT, REPLY_BUFFER_SIZE};
