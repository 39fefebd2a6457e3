pub mod log;

pub use crate::log::{debug, error, info, trace, warn};
