pub mod ret;
pub mod terminal;
