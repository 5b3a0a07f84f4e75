pub mod debouncer;
pub mod engine;
pub mod event_source;
pub mod notifier;
pub mod resolver;
pub mod virtual_device;

pub use engine::IntentionEngine;
pub use event_source::create_event_source;
pub use notifier::{ChangeHandler, Notifier};
pub use virtual_device::VirtualDevice;
