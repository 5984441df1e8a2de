pub mod basket;
pub mod error;
pub mod order;
pub mod region;

pub use basket::*;
pub use error::*;
pub use order::*;
pub use region::*;
