//! Wire-protocol types shared between the proxy client and any compatible
//! server or test-harness implementation.

pub mod protocol;

pub use protocol::Envelope;
