#![forbid(unsafe_code)]

mod advisory;
mod encoder;

pub use advisory::{InputAdvisory, review};
pub use encoder::encode;
