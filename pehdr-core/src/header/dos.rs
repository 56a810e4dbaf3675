use crate::error::Result;
use crate::header::{Decoded, Header};
use crate::reader::FieldReader;

/// Legacy MS-DOS stub header (`IMAGE_DOS_HEADER`) found at offset 0.
///
/// Only `e_lfanew` matters for walking the image; the remaining fields are
/// kept for display. Counts and sizes are signed 16-bit, segment registers
/// unsigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DosHeader {
    /// Two signature bytes, expected to be `"MZ"`.
    pub signature: [u8; 2],
    /// Bytes on the last 512-byte page.
    pub last_size: i16,
    /// Number of 512-byte pages.
    pub num_blocks: i16,
    pub num_reloc: i16,
    /// Header size in 16-byte paragraphs.
    pub hdr_size: i16,
    pub min_alloc: i16,
    pub max_alloc: i16,
    pub ss: u16,
    pub sp: u16,
    pub checksum: i16,
    pub ip: u16,
    pub cs: u16,
    pub reloc_pos: i16,
    pub num_overlays: i16,
    pub reserved1: [i16; 4],
    pub oem_id: i16,
    pub oem_info: i16,
    pub reserved2: [i16; 10],
    /// File offset of the `PE\0\0` signature that precedes the COFF header.
    pub e_lfanew: i32,
}

impl DosHeader {
    pub const SIZE: usize = 64;
    pub const SIGNATURE: [u8; 2] = *b"MZ";

    pub fn decode(reader: &FieldReader, offset: usize) -> Result<Decoded<Self>> {
        let mut cur = reader.cursor(offset);

        let header = DosHeader {
            signature: cur.bytes::<2>()?,
            last_size: cur.read_i16()?,
            num_blocks: cur.read_i16()?,
            num_reloc: cur.read_i16()?,
            hdr_size: cur.read_i16()?,
            min_alloc: cur.read_i16()?,
            max_alloc: cur.read_i16()?,
            ss: cur.read_u16()?,
            sp: cur.read_u16()?,
            checksum: cur.read_i16()?,
            ip: cur.read_u16()?,
            cs: cur.read_u16()?,
            reloc_pos: cur.read_i16()?,
            num_overlays: cur.read_i16()?,
            reserved1: cur.read_i16_array::<4>()?,
            oem_id: cur.read_i16()?,
            oem_info: cur.read_i16()?,
            reserved2: cur.read_i16_array::<10>()?,
            e_lfanew: cur.read_i32()?,
        };
        debug_assert_eq!(cur.consumed(), Self::SIZE);

        if !header.has_valid_signature() {
            log::warn!(
                "DOS signature is {:02x?}, expected \"MZ\"; continuing",
                header.signature
            );
        }

        Ok(Decoded { header, offset })
    }

    pub fn has_valid_signature(&self) -> bool {
        self.signature == Self::SIGNATURE
    }
}

impl Header for DosHeader {
    fn size(&self) -> usize {
        Self::SIZE
    }

    fn name(&self) -> &'static str {
        "DOS Header"
    }
}
