//! Minimal STOMP 1.2 client support: frame codec plus a connected session.
//!
//! Only the connect/send/disconnect subset the gateway needs is implemented;
//! subscriptions and transactions are out of scope.

pub mod client;
pub mod frame;

pub use client::StompClient;
pub use frame::Frame;
