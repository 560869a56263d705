//! Notification emitter adapters.

mod in_memory;
mod logging;

pub use in_memory::InMemoryNotificationEmitter;
pub use logging::LoggingNotificationEmitter;
