//! # shallot-transport
//!
//! Service seams and in-process transport for the shallot overlay.
//!
//! The protocol core never talks to a concrete transport: relays expose the
//! [`Forwarding`](traits::Forwarding) interface, destinations expose
//! [`Inbox`](traits::Inbox), and anything that needs to reach another
//! component resolves it through the [`Network`](traits::Network) seam.
//!
//! [`LoopbackNetwork`](loopback::LoopbackNetwork) is the in-process
//! implementation used by the simulation: a routing table of service
//! instances with a bounded per-hop timeout. Many independent nodes coexist
//! in one process; delivery is a strictly synchronous awaited call chain.
//!
//! - [`traits`] — `Forwarding`, `Inbox`, `Network`
//! - [`loopback`] — in-process network with per-hop timeout
//! - [`json`] — JSON codec helpers with protocol error mapping

pub mod json;
pub mod loopback;
pub mod traits;

pub use loopback::LoopbackNetwork;
pub use traits::{Forwarding, Inbox, Network};

/// Default bound on a single hop's response time, in milliseconds.
pub const DEFAULT_HOP_TIMEOUT_MS: u64 = 2000;
