pub mod action;
pub mod board;
