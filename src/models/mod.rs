pub(crate) mod lenient;
mod order;
mod product;

pub use order::*;
pub use product::*;
