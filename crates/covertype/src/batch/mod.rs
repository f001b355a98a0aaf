#![forbid(unsafe_code)]

mod input;
mod outcome;

pub use input::{BatchInput, MAX_REPORTED_ROWS};
pub use outcome::{BatchOutcome, PREDICTED_NAME_COLUMN, PREDICTED_NUMBER_COLUMN};
