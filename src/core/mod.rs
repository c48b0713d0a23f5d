pub mod interner;
pub mod spl;
pub mod value;

pub use value::{ArrayKey, ObjectData, PhpArray, Symbol, Value, Visibility};
