//! Plain data types of the presentation model.
//!
//! These types carry no reference to a loaded package: keys, enums and
//! geometry values that views in [`crate::pptx`] produce and consume.

mod geometry;
mod placeholder;
mod resource;
mod shape;
mod text;

pub use geometry::*;
pub use placeholder::*;
pub use resource::*;
pub use shape::*;
pub use text::*;
