//! Text rendering of decoded headers.
//!
//! Rendering never touches the image; it only formats values that a decoder
//! already produced.

use crate::header::{CoffHeader, DosHeader, Header, OptionalHeader};
use std::fmt;

/// Total width of a banner line.
pub const LINE_LENGTH: usize = 80;

/// Banner line: `-- Title ` padded with dashes to [`LINE_LENGTH`].
pub fn banner(title: &str) -> String {
    let tail = LINE_LENGTH.saturating_sub(title.len() + 4);
    format!("-- {title} {}", "-".repeat(tail))
}

/// `0x` followed by `value` zero-padded to `digits` hex digits.
pub fn hex(value: u64, digits: usize) -> String {
    format!("0x{value:0digits$x}")
}

/// Labels joined by spaces with nothing else; unmatched bits are dropped.
pub fn label_text(labels: &[&str]) -> String {
    labels.join(" ")
}

/// Labels joined by spaces followed by the raw mask, or `None (0x0000)`.
pub fn flag_text(labels: &[&str], mask: u16) -> String {
    if mask == 0 {
        return "None (0x0000)".to_string();
    }
    if labels.is_empty() {
        format!("({})", hex(mask.into(), 4))
    } else {
        format!("{} ({})", labels.join(" "), hex(mask.into(), 4))
    }
}

/// One rendered header: a banner, aligned `label: value` lines and a
/// trailing blank line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    title: String,
    fields: Vec<(&'static str, String)>,
}

impl Block {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            fields: Vec::new(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn text(mut self, label: &'static str, value: impl Into<String>) -> Self {
        self.fields.push((label, value.into()));
        self
    }

    /// `0x` + width-matched hex followed by the decimal value.
    pub fn number(self, label: &'static str, value: u64, digits: usize) -> Self {
        let text = format!("{} ({value})", hex(value, digits));
        self.text(label, text)
    }

    pub fn dec16(self, label: &'static str, value: u16) -> Self {
        self.number(label, value.into(), 4)
    }

    /// Signed 16-bit value: two's-complement hex followed by the signed decimal.
    pub fn sdec16(self, label: &'static str, value: i16) -> Self {
        let text = format!("{} ({value})", hex(u64::from(value as u16), 4));
        self.text(label, text)
    }

    pub fn dec32(self, label: &'static str, value: u32) -> Self {
        self.number(label, value.into(), 8)
    }

    /// Address-only shape: width-matched hex without the decimal.
    pub fn address(self, label: &'static str, value: u64, digits: usize) -> Self {
        self.text(label, hex(value, digits))
    }

    pub fn addr16(self, label: &'static str, value: u16) -> Self {
        self.address(label, value.into(), 4)
    }

    pub fn addr32(self, label: &'static str, value: u32) -> Self {
        self.address(label, value.into(), 8)
    }

    pub fn version(
        self,
        label: &'static str,
        major: impl fmt::Display,
        minor: impl fmt::Display,
    ) -> Self {
        self.text(label, format!("{major}.{minor}"))
    }

    /// Value of the field labelled `label`, if present.
    pub fn field(&self, label: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, v)| v.as_str())
    }

    pub fn lines(&self) -> Vec<String> {
        let width = self.fields.iter().map(|(l, _)| l.len()).max().unwrap_or(0);
        let mut lines = Vec::with_capacity(self.fields.len() + 3);
        lines.push(banner(&self.title));
        lines.push(String::new());
        for (label, value) in &self.fields {
            lines.push(format!("{label:>width$}: {value}"));
        }
        lines.push(String::new());
        lines
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.lines() {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

pub trait Render {
    fn render(&self) -> Block;
}

impl Render for DosHeader {
    fn render(&self) -> Block {
        Block::new(self.name())
            .text("signature", format!("'{}'", self.signature.escape_ascii()))
            .sdec16("lastSize", self.last_size)
            .sdec16("numBlocks", self.num_blocks)
            .sdec16("numReloc", self.num_reloc)
            .sdec16("hdrSize", self.hdr_size)
            .sdec16("minAlloc", self.min_alloc)
            .sdec16("maxAlloc", self.max_alloc)
            .addr16("SS", self.ss)
            .addr16("SP", self.sp)
            .sdec16("checksum", self.checksum)
            .addr16("IP", self.ip)
            .addr16("CS", self.cs)
            .sdec16("relocPos", self.reloc_pos)
            .sdec16("numOverlays", self.num_overlays)
            .sdec16("OEM Id", self.oem_id)
            .sdec16("OEM Info", self.oem_info)
            .text(
                "LFA New",
                format!("{} ({})", hex(u64::from(self.e_lfanew as u32), 8), self.e_lfanew),
            )
    }
}

impl Render for CoffHeader {
    fn render(&self) -> Block {
        Block::new(self.name())
            .text("Machine", self.machine_name())
            .dec16("Number of sections", self.number_of_sections)
            .dec32("Time/Date stamp", self.time_date_stamp)
            .addr32("Symbol table", self.pointer_to_symbol_table)
            .dec32("Number of symbols", self.number_of_symbols)
            .dec16("Optional header size", self.size_of_optional_header)
            .text(
                "Characteristics",
                label_text(&self.characteristic_flags()),
            )
    }
}

impl Render for OptionalHeader {
    fn render(&self) -> Block {
        let word = self.width.word_digits();

        let mut block = Block::new(self.name())
            .text("Magic", format!("{} ({})", self.magic_name(), hex(self.magic.into(), 4)))
            .version("Linker version", self.major_linker_version, self.minor_linker_version)
            .dec32("Size of code", self.size_of_code)
            .dec32("Size of initialized data", self.size_of_initialized_data)
            .dec32("Size of uninitialized data", self.size_of_uninitialized_data)
            .addr32("Entry point", self.address_of_entry_point)
            .addr32("Base of code", self.base_of_code);
        if let Some(base_of_data) = self.base_of_data {
            block = block.addr32("Base of data", base_of_data);
        }

        block
            .address("Image base", self.image_base, word)
            .dec32("Section alignment", self.section_alignment)
            .dec32("File alignment", self.file_alignment)
            .version(
                "OS version",
                self.major_operating_system_version,
                self.minor_operating_system_version,
            )
            .version("Image version", self.major_image_version, self.minor_image_version)
            .version(
                "Subsystem version",
                self.major_subsystem_version,
                self.minor_subsystem_version,
            )
            .dec32("Win32 version value", self.win32_version_value)
            .dec32("Size of image", self.size_of_image)
            .dec32("Size of headers", self.size_of_headers)
            .dec32("Checksum", self.checksum)
            .text("Subsystem", self.subsystem_name())
            .text(
                "DLL characteristics",
                flag_text(&self.dll_characteristic_flags(), self.dll_characteristics),
            )
            .number("Stack reserve size", self.size_of_stack_reserve, word)
            .number("Stack commit size", self.size_of_stack_commit, word)
            .number("Heap reserve size", self.size_of_heap_reserve, word)
            .number("Heap commit size", self.size_of_heap_commit, word)
            .dec32("Loader flags", self.loader_flags)
            .dec32("Number of RVA and sizes", self.number_of_rva_and_sizes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banner_is_eighty_columns() {
        let line = banner("DOS Header");
        assert_eq!(line.len(), LINE_LENGTH);
        assert!(line.starts_with("-- DOS Header -"));
        assert!(line.ends_with('-'));
    }

    #[test]
    fn long_title_does_not_underflow() {
        let title = "x".repeat(100);
        assert!(banner(&title).starts_with("-- xxx"));
    }

    #[test]
    fn number_shapes() {
        let block = Block::new("T")
            .dec16("a", 0x90)
            .sdec16("s", -1)
            .dec32("b", 0x1000)
            .addr16("c", 0xb8)
            .address("d", 0x1_4000_0000, 16);
        assert_eq!(block.field("a"), Some("0x0090 (144)"));
        assert_eq!(block.field("s"), Some("0xffff (-1)"));
        assert_eq!(block.field("b"), Some("0x00001000 (4096)"));
        assert_eq!(block.field("c"), Some("0x00b8"));
        assert_eq!(block.field("d"), Some("0x0000000140000000"));
    }

    #[test]
    fn labels_are_right_aligned() {
        let lines = Block::new("T").text("ab", "1").text("abcd", "2").lines();
        assert_eq!(lines[1], "");
        assert_eq!(lines[2], "  ab: 1");
        assert_eq!(lines[3], "abcd: 2");
        assert_eq!(lines.last().map(String::as_str), Some(""));
    }

    #[test]
    fn coff_characteristics_are_labels_only() {
        assert_eq!(label_text(&["EXECUTABLE", "DLL"]), "EXECUTABLE DLL");
        assert_eq!(label_text(&[]), "");
    }

    #[test]
    fn zero_mask_is_none() {
        assert_eq!(flag_text(&[], 0), "None (0x0000)");
        assert_eq!(flag_text(&["RELOCATABLE"], 0x0040), "RELOCATABLE (0x0040)");
        assert_eq!(flag_text(&[], 0x0001), "(0x0001)");
    }
}
