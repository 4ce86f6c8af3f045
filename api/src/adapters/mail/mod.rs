//! Mail adapter
//!
//! Implementations of the mailer port.

pub mod client;

pub use client::{HttpMailer, LogMailer, MailTransport};
