use crate::error::Result;
use crate::header::{Decoded, Header};
use crate::reader::{FieldCursor, FieldReader};
use crate::tables;

/// Physical layout of the optional header, chosen from the COFF machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    /// PE32: 32-bit image base and stack/heap sizes, has `BaseOfData`.
    Pe32,
    /// PE32+: 64-bit image base and stack/heap sizes.
    Pe32Plus,
}

impl Width {
    pub fn from_pe32_plus(is_pe32_plus: bool) -> Self {
        if is_pe32_plus {
            Width::Pe32Plus
        } else {
            Width::Pe32
        }
    }

    /// Bytes of the fixed part of the layout, data directories excluded.
    pub fn fixed_size(self) -> usize {
        match self {
            Width::Pe32 => 96,
            Width::Pe32Plus => 112,
        }
    }

    /// Hex digits used to print a pointer-sized field.
    pub fn word_digits(self) -> usize {
        match self {
            Width::Pe32 => 8,
            Width::Pe32Plus => 16,
        }
    }

    fn read_word(self, cur: &mut FieldCursor) -> Result<u64> {
        match self {
            Width::Pe32 => cur.read_u32().map(u64::from),
            Width::Pe32Plus => cur.read_u64(),
        }
    }
}

/// Optional header (`IMAGE_OPTIONAL_HEADER32` / `IMAGE_OPTIONAL_HEADER64`).
///
/// Pointer-sized fields are widened to `u64`; `width` records how many bytes
/// they occupied in the file. The data directory table that follows
/// `number_of_rva_and_sizes` is not decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionalHeader {
    pub width: Width,
    pub magic: u16,
    pub major_linker_version: u8,
    pub minor_linker_version: u8,
    pub size_of_code: u32,
    pub size_of_initialized_data: u32,
    pub size_of_uninitialized_data: u32,
    pub address_of_entry_point: u32,
    pub base_of_code: u32,
    /// Only present in PE32.
    pub base_of_data: Option<u32>,
    pub image_base: u64,
    pub section_alignment: u32,
    pub file_alignment: u32,
    pub major_operating_system_version: u16,
    pub minor_operating_system_version: u16,
    pub major_image_version: u16,
    pub minor_image_version: u16,
    pub major_subsystem_version: u16,
    pub minor_subsystem_version: u16,
    pub win32_version_value: u32,
    pub size_of_image: u32,
    pub size_of_headers: u32,
    pub checksum: u32,
    pub subsystem: u16,
    pub dll_characteristics: u16,
    pub size_of_stack_reserve: u64,
    pub size_of_stack_commit: u64,
    pub size_of_heap_reserve: u64,
    pub size_of_heap_commit: u64,
    pub loader_flags: u32,
    pub number_of_rva_and_sizes: u32,
}

impl OptionalHeader {
    pub const PE32_MAGIC: u16 = 0x10b;
    pub const PE32_PLUS_MAGIC: u16 = 0x20b;
    pub const ROM_MAGIC: u16 = 0x107;

    pub fn decode(reader: &FieldReader, offset: usize, width: Width) -> Result<Decoded<Self>> {
        let mut cur = reader.cursor(offset);

        let magic = cur.read_u16()?;
        let major_linker_version = cur.read_u8()?;
        let minor_linker_version = cur.read_u8()?;
        let size_of_code = cur.read_u32()?;
        let size_of_initialized_data = cur.read_u32()?;
        let size_of_uninitialized_data = cur.read_u32()?;
        let address_of_entry_point = cur.read_u32()?;
        let base_of_code = cur.read_u32()?;
        let base_of_data = match width {
            Width::Pe32 => Some(cur.read_u32()?),
            Width::Pe32Plus => None,
        };

        let header = OptionalHeader {
            width,
            magic,
            major_linker_version,
            minor_linker_version,
            size_of_code,
            size_of_initialized_data,
            size_of_uninitialized_data,
            address_of_entry_point,
            base_of_code,
            base_of_data,
            image_base: width.read_word(&mut cur)?,
            section_alignment: cur.read_u32()?,
            file_alignment: cur.read_u32()?,
            major_operating_system_version: cur.read_u16()?,
            minor_operating_system_version: cur.read_u16()?,
            major_image_version: cur.read_u16()?,
            minor_image_version: cur.read_u16()?,
            major_subsystem_version: cur.read_u16()?,
            minor_subsystem_version: cur.read_u16()?,
            win32_version_value: cur.read_u32()?,
            size_of_image: cur.read_u32()?,
            size_of_headers: cur.read_u32()?,
            checksum: cur.read_u32()?,
            subsystem: cur.read_u16()?,
            dll_characteristics: cur.read_u16()?,
            size_of_stack_reserve: width.read_word(&mut cur)?,
            size_of_stack_commit: width.read_word(&mut cur)?,
            size_of_heap_reserve: width.read_word(&mut cur)?,
            size_of_heap_commit: width.read_word(&mut cur)?,
            loader_flags: cur.read_u32()?,
            number_of_rva_and_sizes: cur.read_u32()?,
        };
        debug_assert_eq!(cur.consumed(), width.fixed_size());

        Ok(Decoded { header, offset })
    }

    /// Descriptive name of the magic; it never changes the decoded layout.
    pub fn magic_name(&self) -> &'static str {
        tables::optional_magic_name(self.magic)
    }

    pub fn subsystem_name(&self) -> &'static str {
        // the on-disk field is read signed, so 0x8000.. lands below zero
        tables::subsystem_name(i32::from(self.subsystem as i16))
    }

    pub fn dll_characteristic_flags(&self) -> Vec<&'static str> {
        tables::flags(tables::DLL_CHARACTERISTICS, self.dll_characteristics)
    }
}

impl Header for OptionalHeader {
    fn size(&self) -> usize {
        self.width.fixed_size()
    }

    fn name(&self) -> &'static str {
        match self.width {
            Width::Pe32 => "Optional Header (PE32)",
            Width::Pe32Plus => "Optional Header (PE32+)",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    // Writes `value` as `len` little-endian bytes at `at`.
    fn put(data: &mut [u8], at: usize, value: u64, len: usize) {
        data[at..at + len].copy_from_slice(&value.to_le_bytes()[..len]);
    }

    fn pe32() -> Vec<u8> {
        let mut d = vec![0u8; 96];
        put(&mut d, 0, 0x10b, 2);
        d[2] = 14;
        d[3] = 29;
        put(&mut d, 16, 0x1234, 4);
        put(&mut d, 24, 0x3000, 4);
        put(&mut d, 28, 0x0040_0000, 4);
        put(&mut d, 32, 0x1000, 4);
        put(&mut d, 36, 0x200, 4);
        put(&mut d, 40, 6, 2);
        put(&mut d, 68, 3, 2);
        put(&mut d, 70, 0x8140, 2);
        put(&mut d, 72, 0x10_0000, 4);
        put(&mut d, 76, 0x1000, 4);
        put(&mut d, 92, 16, 4);
        d
    }

    fn pe32_plus() -> Vec<u8> {
        let mut d = vec![0u8; 112];
        put(&mut d, 0, 0x20b, 2);
        put(&mut d, 16, 0x1_4a0, 4);
        put(&mut d, 24, 0x0000_0001_4000_0000, 8);
        put(&mut d, 68, 2, 2);
        put(&mut d, 72, 0x10_0000, 8);
        put(&mut d, 96, 0x1000, 8);
        put(&mut d, 104, 0xdead, 4);
        put(&mut d, 108, 16, 4);
        d
    }

    #[test]
    fn decodes_pe32_layout() {
        let data = pe32();
        let decoded = OptionalHeader::decode(&FieldReader::new(&data), 0, Width::Pe32).unwrap();
        let hdr = decoded.header;
        assert_eq!(hdr.magic_name(), "PE32");
        assert_eq!((hdr.major_linker_version, hdr.minor_linker_version), (14, 29));
        assert_eq!(hdr.address_of_entry_point, 0x1234);
        assert_eq!(hdr.base_of_data, Some(0x3000));
        assert_eq!(hdr.image_base, 0x0040_0000);
        assert_eq!(hdr.section_alignment, 0x1000);
        assert_eq!(hdr.file_alignment, 0x200);
        assert_eq!(hdr.major_operating_system_version, 6);
        assert_eq!(hdr.subsystem_name(), "Windows console");
        assert_eq!(
            hdr.dll_characteristic_flags(),
            vec!["RELOCATABLE", "DEP-COMPATIBLE", "TERMINAL-SERVER-AWARE"]
        );
        assert_eq!(hdr.size_of_stack_reserve, 0x10_0000);
        assert_eq!(hdr.size_of_stack_commit, 0x1000);
        assert_eq!(hdr.number_of_rva_and_sizes, 16);
        assert_eq!(decoded.end(), 96);
    }

    #[test]
    fn decodes_pe32_plus_layout() {
        let data = pe32_plus();
        let decoded =
            OptionalHeader::decode(&FieldReader::new(&data), 0, Width::Pe32Plus).unwrap();
        let hdr = decoded.header;
        assert_eq!(hdr.magic_name(), "PE32+");
        assert_eq!(hdr.base_of_data, None);
        assert_eq!(hdr.image_base, 0x0000_0001_4000_0000);
        assert_eq!(hdr.subsystem_name(), "Windows GUI");
        assert_eq!(hdr.size_of_stack_reserve, 0x10_0000);
        assert_eq!(hdr.size_of_heap_commit, 0x1000);
        assert_eq!(hdr.loader_flags, 0xdead);
        assert_eq!(hdr.number_of_rva_and_sizes, 16);
        assert_eq!(decoded.end(), 112);
    }

    #[test]
    fn magic_does_not_change_layout() {
        let mut data = pe32_plus();
        put(&mut data, 0, 0x10b, 2);
        let hdr = OptionalHeader::decode(&FieldReader::new(&data), 0, Width::Pe32Plus)
            .unwrap()
            .header;
        assert_eq!(hdr.magic_name(), "PE32");
        assert_eq!(hdr.image_base, 0x0000_0001_4000_0000);
    }

    #[test]
    fn subsystem_outside_table_is_unknown() {
        let mut data = pe32();
        for code in [17u64, 99, 0x7fff, 0x8000, 0xffff] {
            put(&mut data, 68, code, 2);
            let hdr = OptionalHeader::decode(&FieldReader::new(&data), 0, Width::Pe32)
                .unwrap()
                .header;
            assert_eq!(hdr.subsystem_name(), "Unknown subsystem", "code {code:#x}");
        }
    }

    #[test]
    fn one_byte_short_fails() {
        let data = pe32_plus();
        let err = OptionalHeader::decode(&FieldReader::new(&data[..111]), 0, Width::Pe32Plus)
            .unwrap_err();
        assert!(matches!(err, Error::BoundsViolation { offset: 108, width: 4, .. }));
    }
}
