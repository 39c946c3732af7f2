//! GOWA backend integration layer: HTTP client, wire shapes, and the response
//! envelope contract.

pub mod client;
pub mod credentials;
pub mod envelope;
pub mod wire;

pub use client::GowaClient;
pub use credentials::SharedCredentials;
pub use envelope::GowaError;
