pub mod enums;
pub mod message;
pub mod round;
pub mod symptom;

pub use enums::*;
pub use message::*;
pub use round::*;
pub use symptom::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Invalid {field} value: '{value}'")]
    InvalidEnum { field: String, value: String },
}
