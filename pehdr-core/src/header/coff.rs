use crate::error::Result;
use crate::header::{Decoded, Header};
use crate::reader::FieldReader;
use crate::tables::{self, MACHINE_AMD64};

/// `"PE\0\0"`, stored at `e_lfanew` right before the COFF header.
pub const PE_SIGNATURE: [u8; 4] = *b"PE\0\0";

/// COFF file header (`IMAGE_FILE_HEADER`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoffHeader {
    pub machine: u16,
    pub number_of_sections: u16,
    pub time_date_stamp: u32,
    pub pointer_to_symbol_table: u32,
    pub number_of_symbols: u32,
    pub size_of_optional_header: u16,
    pub characteristics: u16,
}

impl CoffHeader {
    pub const SIZE: usize = 20;

    pub fn decode(reader: &FieldReader, offset: usize) -> Result<Decoded<Self>> {
        let mut cur = reader.cursor(offset);

        let header = CoffHeader {
            machine: cur.read_u16()?,
            number_of_sections: cur.read_u16()?,
            time_date_stamp: cur.read_u32()?,
            pointer_to_symbol_table: cur.read_u32()?,
            number_of_symbols: cur.read_u32()?,
            size_of_optional_header: cur.read_u16()?,
            characteristics: cur.read_u16()?,
        };
        debug_assert_eq!(cur.consumed(), Self::SIZE);

        Ok(Decoded { header, offset })
    }

    /// Only AMD64 selects the 64-bit optional header; every other machine
    /// falls back to the 32-bit layout.
    pub fn is_pe32_plus(&self) -> bool {
        self.machine == MACHINE_AMD64
    }

    pub fn machine_name(&self) -> &'static str {
        tables::machine_name(self.machine)
    }

    pub fn characteristic_flags(&self) -> Vec<&'static str> {
        tables::flags(tables::FILE_CHARACTERISTICS, self.characteristics)
    }
}

impl Header for CoffHeader {
    fn size(&self) -> usize {
        Self::SIZE
    }

    fn name(&self) -> &'static str {
        "COFF Header"
    }
}

/// Reads the four magic bytes at `offset`, whatever they are.
pub fn read_signature(reader: &FieldReader, offset: usize) -> Result<[u8; 4]> {
    let magic = reader.bytes::<4>(offset)?;
    if magic != PE_SIGNATURE {
        log::warn!(
            "PE signature at {offset:#x} is {magic:02x?}, expected \"PE\\0\\0\"; continuing"
        );
    }
    Ok(magic)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn coff(machine: u16, characteristics: u16) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&machine.to_le_bytes());
        data.extend_from_slice(&3u16.to_le_bytes());
        data.extend_from_slice(&0x5215_8fd9u32.to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(&7u32.to_le_bytes());
        data.extend_from_slice(&0xe0u16.to_le_bytes());
        data.extend_from_slice(&characteristics.to_le_bytes());
        data
    }

    #[test]
    fn decodes_fields() {
        let data = coff(0x014c, 0x0102);
        let decoded = CoffHeader::decode(&FieldReader::new(&data), 0).unwrap();
        let hdr = decoded.header;
        assert_eq!(hdr.machine_name(), "Intel 386");
        assert_eq!(hdr.number_of_sections, 3);
        assert_eq!(hdr.time_date_stamp, 0x5215_8fd9);
        assert_eq!(hdr.number_of_symbols, 7);
        assert_eq!(hdr.size_of_optional_header, 0xe0);
        assert_eq!(hdr.characteristic_flags(), vec!["EXECUTABLE"]);
        assert!(!hdr.is_pe32_plus());
        assert_eq!(decoded.end(), CoffHeader::SIZE);
    }

    #[test]
    fn amd64_selects_pe32_plus() {
        let data = coff(0x8664, 0x0022);
        let hdr = CoffHeader::decode(&FieldReader::new(&data), 0).unwrap().header;
        assert!(hdr.is_pe32_plus());
        assert_eq!(hdr.machine_name(), "x64 / AMD AMD64");
    }

    #[test]
    fn other_machines_use_pe32() {
        for machine in [0x01c0, 0x0200, 0xaa64, 0x0000] {
            let data = coff(machine, 0);
            let hdr = CoffHeader::decode(&FieldReader::new(&data), 0).unwrap().header;
            assert!(!hdr.is_pe32_plus(), "machine {machine:#x}");
        }
    }

    #[test]
    fn signature_is_read_permissively() {
        let reader = FieldReader::new(b"PE\0\0NE\0\0");
        assert_eq!(read_signature(&reader, 0).unwrap(), PE_SIGNATURE);
        assert_eq!(&read_signature(&reader, 4).unwrap(), b"NE\0\0");
        assert!(matches!(
            read_signature(&reader, 6),
            Err(Error::BoundsViolation { .. })
        ));
    }

    #[test]
    fn truncated_header_fails() {
        let data = coff(0x014c, 0);
        assert!(CoffHeader::decode(&FieldReader::new(&data[..19]), 0).is_err());
    }
}
