pub mod coff;
pub mod dos;
pub mod optional;

pub use coff::CoffHeader;
pub use dos::DosHeader;
pub use optional::{OptionalHeader, Width};

pub trait Header: std::fmt::Debug {
    /// Returns the number of bytes the decoder consumed for this header.
    fn size(&self) -> usize;

    /// Returns a short name used in logs and report banners.
    fn name(&self) -> &'static str;
}

/// A decoded header together with the file offset it was read from.
#[derive(Debug, Clone)]
pub struct Decoded<H> {
    pub header: H,
    pub offset: usize,
}

impl<H: Header> Decoded<H> {
    /// File offset of the first byte after this header.
    pub fn end(&self) -> usize {
        self.offset + self.header.size()
    }
}
