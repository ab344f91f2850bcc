//! 3D text: typeface fonts, glyph outlines and bevelled extrusion.
//!
//! The pipeline runs glyph outlines through [`path`] into filled shapes,
//! triangulates their faces in [`triangulate`] and sweeps them into solids in
//! [`extrude`].

pub mod extrude;
pub mod path;
pub mod triangulate;
pub mod typeface;

pub use extrude::{TextGeometryParams, text_geometry};
pub use path::Shape;
pub use typeface::Font;
