//! Optimistic like toggling.
//!
//! A toggle is shown at once and confirmed in the background. Every toggle
//! is recorded as a [`MutationIntent`] carrying the state it replaced and a
//! per-post sequence number; only the intent holding the newest number may
//! confirm or roll back.

pub mod intent;
pub mod like;

pub use intent::{LikeSnapshot, LikeState, LikeView, MutationIntent};
pub use like::{LikeEngine, Resolution};
