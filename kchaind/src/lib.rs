pub mod args;
pub mod daemon;
pub mod protocol;
