use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use super::super::{Confirm, Navigator, Visit};
use crate::guard::View;

pub struct ReturnNavigator {
    pub ret: mpsc::UnboundedSender<Visit>,
}

impl ReturnNavigator {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Visit>) {
        let (ret, rx) = mpsc::unbounded_channel();
        (Self { ret }, rx)
    }
}

impl Navigator for ReturnNavigator {
    fn navigate(&self, view: View, notice: Option<String>) {
        if self.ret.send(Visit { view, notice }).is_err() {
            tracing::debug!("navigation dropped, nobody is listening");
        }
    }
}

/// Answers confirmations from a script; declines once it runs dry.
#[derive(Default)]
pub struct ScriptedConfirm {
    answers: Mutex<VecDeque<bool>>,
    asked: Mutex<Vec<String>>,
}

impl ScriptedConfirm {
    pub fn answering(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            asked: Mutex::new(vec![]),
        }
    }

    pub fn asked(&self) -> Vec<String> { self.asked.lock().clone() }
}

#[async_trait]
impl Confirm for ScriptedConfirm {
    async fn confirm(&self, message: &str) -> bool {
        self.asked.lock().push(message.to_string());
        self.answers.lock().pop_front().unwrap_or(false)
    }
}
