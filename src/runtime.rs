pub mod error;
pub mod value;

pub use error::RuntimeError;
pub use value::{Dict, FunctionObject, Value};
