//! Which handler answers which reference
//!
//! [`BindingIndex`] is built once from configuration and groups
//! [`Binding`]s by catalog. [`SharedBindingIndex`] publishes it so it can be
//! rebuilt without blocking readers.

mod index;
mod shared;

pub use index::{Binding, BindingIndex, SkippedBinding};
pub use shared::SharedBindingIndex;
