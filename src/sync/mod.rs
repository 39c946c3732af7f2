//! Polling-based data sync: cached bindings over the backend, background
//! interval workers, and auto-reconnect planning.

pub mod cache;
pub mod hub;
pub mod poller;
pub mod reconnect;

pub use hub::{GowaBackend, SyncHub};
pub use poller::IntervalWorker;
pub use reconnect::ReconnectPlanner;
