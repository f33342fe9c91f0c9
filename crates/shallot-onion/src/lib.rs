//! # shallot-onion
//!
//! The onion-layering protocol core:
//!
//! - [`selector`] - injectable circuit path selection
//! - [`circuit`] - circuit representation and layered-encryption construction
//! - [`relay`] - the peel-and-forward relay node
//! - [`user`] - the user node: sender and destination inbox
//!
//! ## Layering
//!
//! A message to user `u` over circuit `[entry, middle, exit]` becomes
//!
//! ```text
//! Relay{next: middle, E_entry(S1), S1( Relay{next: exit, E_middle(S2),
//!     S2( Final{u, E_exit(S3), S3(message)} )} )}
//! ```
//!
//! where `E_n` wraps a session key to node `n`'s public key and `S_i(...)` is
//! symmetric encryption under session key `i`. Every hop removes exactly one
//! layer; the exit hop performs the final decryption and delivers plaintext
//! to the destination inbox.

pub mod circuit;
pub mod relay;
pub mod selector;
pub mod user;

pub use shallot_types::error::{ProtocolError, Result};
pub use shallot_types::CIRCUIT_HOPS;
