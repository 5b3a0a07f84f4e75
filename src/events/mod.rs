pub mod input;
pub mod intention;
pub mod modifiers;

pub use input::{Feed, FeedHandle, FeedKind, FeedScope, InputEvent, KeyCode, SourceEvent};
pub use intention::Intention;
pub use modifiers::{Modifier, ModifierFlags, ModifierSet};
