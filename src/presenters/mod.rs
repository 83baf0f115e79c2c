//! What the core asks of its environment.

use async_trait::async_trait;

use crate::guard::View;

pub mod impls;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visit {
    pub view: View,
    pub notice: Option<String>,
}

pub trait Navigator {
    fn navigate(&self, view: View, notice: Option<String>);
}

#[async_trait]
pub trait Confirm {
    async fn confirm(&self, message: &str) -> bool;
}
