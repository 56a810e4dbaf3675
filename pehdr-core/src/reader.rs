use crate::error::{Error, Result};
use byteorder::{ByteOrder, LE};

/// Bounds-checked little-endian accessor over an image.
///
/// Every read validates `offset + width <= len` before touching the bytes and
/// assembles the value from the raw span, so packed and unaligned fields are
/// read the same way as aligned ones.
#[derive(Debug, Clone, Copy)]
pub struct FieldReader<'a> {
    data: &'a [u8],
}

impl<'a> FieldReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the `width` bytes starting at `offset`, or a bounds violation.
    pub fn span(&self, offset: usize, width: usize) -> Result<&'a [u8]> {
        let end = offset
            .checked_add(width)
            .ok_or_else(|| Error::out_of_bounds(offset, width, self.data.len()))?;
        if end > self.data.len() {
            return Err(Error::out_of_bounds(offset, width, self.data.len()));
        }
        Ok(&self.data[offset..end])
    }

    pub fn bytes<const N: usize>(&self, offset: usize) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.span(offset, N)?);
        Ok(out)
    }

    pub fn u8(&self, offset: usize) -> Result<u8> {
        Ok(self.span(offset, 1)?[0])
    }

    pub fn u16(&self, offset: usize) -> Result<u16> {
        Ok(LE::read_u16(self.span(offset, 2)?))
    }

    pub fn i16(&self, offset: usize) -> Result<i16> {
        Ok(LE::read_i16(self.span(offset, 2)?))
    }

    pub fn u32(&self, offset: usize) -> Result<u32> {
        Ok(LE::read_u32(self.span(offset, 4)?))
    }

    pub fn i32(&self, offset: usize) -> Result<i32> {
        Ok(LE::read_i32(self.span(offset, 4)?))
    }

    pub fn u64(&self, offset: usize) -> Result<u64> {
        Ok(LE::read_u64(self.span(offset, 8)?))
    }

    /// Starts a sequential cursor at `offset`.
    pub fn cursor(&self, offset: usize) -> FieldCursor<'a> {
        FieldCursor {
            reader: *self,
            start: offset,
            pos: offset,
        }
    }
}

/// Sequential view used by the header decoders to walk a fixed layout.
#[derive(Debug)]
pub struct FieldCursor<'a> {
    reader: FieldReader<'a>,
    start: usize,
    pos: usize,
}

impl<'a> FieldCursor<'a> {
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes consumed since the cursor was created.
    pub fn consumed(&self) -> usize {
        self.pos - self.start
    }

    fn advance(&mut self, width: usize) -> Result<usize> {
        let at = self.pos;
        self.reader.span(at, width)?;
        self.pos += width;
        Ok(at)
    }

    pub fn bytes<const N: usize>(&mut self) -> Result<[u8; N]> {
        let at = self.advance(N)?;
        self.reader.bytes::<N>(at)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let at = self.advance(1)?;
        self.reader.u8(at)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        let at = self.advance(2)?;
        self.reader.u16(at)
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        let at = self.advance(2)?;
        self.reader.i16(at)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let at = self.advance(4)?;
        self.reader.u32(at)
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        let at = self.advance(4)?;
        self.reader.i32(at)
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        let at = self.advance(8)?;
        self.reader.u64(at)
    }

    pub fn read_i16_array<const N: usize>(&mut self) -> Result<[i16; N]> {
        let mut out = [0i16; N];
        for slot in out.iter_mut() {
            *slot = self.read_i16()?;
        }
        Ok(out)
    }
}
