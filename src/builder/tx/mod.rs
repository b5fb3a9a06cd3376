mod built;
mod error;
mod staging;

pub use built::*;
pub use error::*;
pub use staging::*;
