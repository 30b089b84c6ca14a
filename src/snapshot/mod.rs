pub mod classify;
pub mod element;
pub mod parser;
