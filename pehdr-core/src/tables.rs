//! Static code-to-name tables for COFF and optional header fields.

/// Maps a numeric code to a display label.
pub type LookupTable = &'static [(u16, &'static str)];

/// Maps a single bit to a flag label; matches are reported in table order.
pub type FlagTable = &'static [(u16, &'static str)];

pub const UNKNOWN_MACHINE: &str = "Unknown";
pub const UNKNOWN_SUBSYSTEM: &str = "Unknown subsystem";

pub const MACHINE_I386: u16 = 0x014c;
pub const MACHINE_AMD64: u16 = 0x8664;

pub const MACHINES: LookupTable = &[
    (MACHINE_I386, "Intel 386"),
    (MACHINE_AMD64, "x64 / AMD AMD64"),
    (0x0162, "MIPS R3000"),
    (0x0168, "MIPS R10000"),
    (0x0169, "MIPS little endian WCI v2"),
    (0x0183, "Old Alpha AXP"),
    (0x0184, "Alpha AXP"),
    (0x01a2, "Hitachi SH3"),
    (0x01a3, "Hitachi SH3 DSP"),
    (0x01a6, "Hitachi SH4"),
    (0x01a8, "Hitachi SH5"),
    (0x01c0, "ARM little endian"),
    (0x01c2, "Thumb"),
    (0x01d3, "Matsushita AM33"),
    (0x01f0, "PowerPC little endian"),
    (0x01f1, "PowerPC with floating point support"),
    (0x0200, "Intel IA64"),
    (0x0266, "MIPS16"),
    (0x0268, "Motorola 68000 series"),
    (0x0284, "Alpha AXP 64-bit"),
    (0x0366, "MIPS with FPU"),
    (0x0466, "MIPS16 with FPU"),
    (0x0ebc, "EFI Byte Code"),
    (0x9041, "Mitsubishi M32R little endian"),
    (0xc0ee, "CLR pure MSIL"),
];

/// Indexed directly by subsystem code; slot 0 doubles as the fallback.
pub const SUBSYSTEMS: [&str; 17] = [
    UNKNOWN_SUBSYSTEM,
    "Native",
    "Windows GUI",
    "Windows console",
    UNKNOWN_SUBSYSTEM,
    "OS/2 console",
    UNKNOWN_SUBSYSTEM,
    "POSIX console",
    "Native Win9x driver",
    "Windows CE GUI",
    "EFI application",
    "EFI boot service driver",
    "EFI runtime driver",
    "EFI ROM",
    "Xbox",
    UNKNOWN_SUBSYSTEM,
    "Windows boot application",
];

// Curated subset of the COFF characteristics; 0x0200 reports as NON-RELOCATABLE.
pub const FILE_CHARACTERISTICS: FlagTable = &[
    (0x0002, "EXECUTABLE"),
    (0x0200, "NON-RELOCATABLE"),
    (0x2000, "DLL"),
];

pub const DLL_CHARACTERISTICS: FlagTable = &[
    (0x0040, "RELOCATABLE"),
    (0x0080, "INTEGRITY-FORCED"),
    (0x0100, "DEP-COMPATIBLE"),
    (0x0200, "NO-ISOLATION"),
    (0x0400, "NO-SEH"),
    (0x0800, "NO-BIND"),
    (0x2000, "WDM-DRIVER"),
    (0x8000, "TERMINAL-SERVER-AWARE"),
];

pub fn lookup(table: LookupTable, code: u16) -> Option<&'static str> {
    table
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

/// Labels of every bit in `mask` that `table` knows about.
pub fn flags(table: FlagTable, mask: u16) -> Vec<&'static str> {
    table
        .iter()
        .filter(|(bit, _)| mask & bit != 0)
        .map(|(_, name)| *name)
        .collect()
}

pub fn machine_name(code: u16) -> &'static str {
    lookup(MACHINES, code).unwrap_or(UNKNOWN_MACHINE)
}

/// Codes outside `0..=16`, negative ones included, clamp to slot 0.
pub fn subsystem_name(code: i32) -> &'static str {
    let index = usize::try_from(code)
        .ok()
        .filter(|&i| i < SUBSYSTEMS.len())
        .unwrap_or(0);
    SUBSYSTEMS[index]
}

pub fn optional_magic_name(magic: u16) -> &'static str {
    match magic {
        0x10b => "PE32",
        0x20b => "PE32+",
        0x107 => "ROM",
        _ => "Unknown",
    }
}
