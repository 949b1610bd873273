pub mod error;
pub mod value;

pub use error::MapgenError;
pub use value::*;
