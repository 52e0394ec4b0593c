//! The tools offered to the model, one module per chat variant.
pub mod container;
pub mod weather;
