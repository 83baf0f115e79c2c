//! Views over server data.
//!
//! Every `load` bumps the controller's generation before anything is sent
//! and commits only if the generation is unchanged when the reply arrives.
//! A superseded reply resolves to [`ClientError::Stale`] and touches
//! nothing.

use crate::errors::ClientError;

pub mod feed;
pub mod post;

pub use feed::{FeedController, FeedSnapshot};
pub use post::{PostActions, PostController, PostSnapshot};

/// `loading`/`submitting` plus the inline error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Phase {
    pub pending: bool,
    pub error: Option<String>,
}

impl Phase {
    fn begin(&mut self) { self.pending = true; }

    fn succeed(&mut self) {
        self.pending = false;
        self.error = None;
    }

    fn fail(&mut self, e: &ClientError) {
        self.pending = false;
        self.error = Some(e.user_message());
    }

    fn reject(&mut self, message: impl Into<String>) {
        self.pending = false;
        self.error = Some(message.into());
    }
}
