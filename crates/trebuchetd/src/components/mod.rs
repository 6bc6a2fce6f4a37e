//! Components shipped with the daemon.

mod listener;

pub use listener::{LISTENER_IDENTITY, ListenerSettings, NetworkListener};
