/// UI module exports

pub mod components;
pub mod newtab;
mod chat_panel;
mod todo_panel;
