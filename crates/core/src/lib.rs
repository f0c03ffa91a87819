//! Identity profile editing and h-card rendering.
//!
//! Pure domain logic: no HTTP and no storage backends. Storage is reached
//! only through the traits in [`ports`], which callers inject.

pub mod controller;
pub mod error;
pub mod feedback;
pub mod form;
pub mod help;
pub mod ports;
pub mod profile;
pub mod render;
pub mod row_editor;
pub mod types;
pub mod validation;

#[cfg(test)]
mod testing;
