//! Decoding and text rendering of PE/COFF image headers.

pub mod error;
pub mod header;
pub mod image;
pub mod inspect;
pub mod reader;
pub mod report;
pub mod tables;

pub use error::{Error, Result};
pub use header::*;
pub use image::Image;
pub use inspect::*;
pub use reader::FieldReader;
pub use report::{Block, Render};
