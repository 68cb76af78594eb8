//! # nexus-media
//!
//! Images for the `Midia` table: deterministic web fetches from a Lorem
//! Picsum compatible endpoint and locally rendered PNG placeholders.

pub mod hash;
pub mod label;
pub mod placeholder;
pub mod source;

mod error;

pub use error::MediaError;
pub use label::{MediaKind, media_label};
pub use placeholder::{Organism, placeholder_png};
pub use source::{FetchedImage, ImageSource};
