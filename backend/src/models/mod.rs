pub mod catalog;
pub mod macros;
pub mod product;

pub use catalog::*;
pub use product::*;
