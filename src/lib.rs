//! Draftsmith — an email drafting assistant.
//!
//! Drafts replies and new emails through a chat-completions API, with
//! anti-parroting and reply-formatting safeguards. Exposed as a library, an
//! interactive CLI, and a small localhost HTTP service.
//!
//! See `DESIGN.md` for full architecture documentation.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod credentials;
pub mod logging;
pub mod providers;

pub mod catalog;
pub mod extract;
pub mod format;
pub mod parse;
pub mod prompt;
pub mod similarity;

pub mod composer;

pub mod mailclient;
pub mod server;
