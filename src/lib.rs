pub mod cmds;
pub mod conductors;
pub mod config;
mod constructors;
pub mod controllers;
pub mod entities;
pub mod errors;
pub mod gateway;
pub mod guard;
pub mod interactors;
pub mod optimistic;
pub mod presenters;
pub mod session;
pub mod storage;
pub mod usecases;
pub(crate) mod utils;

pub use constructors::*;
