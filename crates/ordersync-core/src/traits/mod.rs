//! Seams between the pipeline and the outside world.

pub mod notifier;
pub mod source;

pub use notifier::Notifier;
pub use source::{OrderPage, OrderSource};
