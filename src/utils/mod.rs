// Utility functions
pub mod error;
pub mod hobbies;

pub use error::*;
pub use hobbies::*;
