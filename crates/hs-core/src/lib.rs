pub mod error;
pub mod object;
pub mod types;
pub mod value;

pub use error::ScriptError;
pub use object::*;
pub use types::*;
pub use value::*;
