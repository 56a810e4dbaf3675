use crate::error::{Error, Result};
use crate::header::coff::{read_signature, PE_SIGNATURE};
use crate::header::{CoffHeader, Decoded, DosHeader, Header, OptionalHeader, Width};
use crate::image::Image;
use crate::reader::FieldReader;
use crate::report::{Block, Render};
use std::io::Write;
use std::path::Path;

/// Length of the `PE\0\0` magic between `e_lfanew` and the COFF header.
pub const PE_SIGNATURE_LEN: usize = PE_SIGNATURE.len();

/// Every header decoded from one image.
#[derive(Debug, Clone)]
pub struct Headers {
    pub dos: Decoded<DosHeader>,
    pub pe_signature: [u8; 4],
    pub coff: Decoded<CoffHeader>,
    pub optional: Decoded<OptionalHeader>,
}

/// Position of the inspection; transitions only move forward.
#[derive(Debug, Clone, Default)]
pub enum State {
    Start,
    DosDecoded {
        dos: Decoded<DosHeader>,
    },
    CoffDecoded {
        dos: Decoded<DosHeader>,
        pe_signature: [u8; 4],
        coff: Decoded<CoffHeader>,
    },
    OptionalDecoded(Box<Headers>),
    Done(Box<Headers>),
    /// A decode failed; nothing further is read.
    #[default]
    Failed,
}

/// Walks an image left to right: DOS, COFF, then the optional header whose
/// width the COFF machine selects.
#[derive(Debug)]
pub struct Inspector<'a> {
    reader: FieldReader<'a>,
    state: State,
}

impl<'a> Inspector<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            reader: FieldReader::new(bytes),
            state: State::Start,
        }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    /// Decodes the next header and returns its rendering, or `None` once
    /// there is nothing left to decode.
    ///
    /// A failed step leaves the inspector in [`State::Failed`].
    pub fn step(&mut self) -> Result<Option<Block>> {
        let (next, block) = match std::mem::take(&mut self.state) {
            State::Start => {
                let dos = DosHeader::decode(&self.reader, 0)?;
                log::debug!("decoded DOS header, e_lfanew = {:#x}", dos.header.e_lfanew);
                let block = dos.header.render();
                (State::DosDecoded { dos }, Some(block))
            }
            State::DosDecoded { dos } => {
                let pe_offset = self.pe_offset(&dos.header)?;
                let pe_signature = read_signature(&self.reader, pe_offset)?;
                let coff = CoffHeader::decode(&self.reader, pe_offset + PE_SIGNATURE_LEN)?;
                log::debug!(
                    "decoded COFF header at {:#x}, machine = {:#06x}",
                    coff.offset,
                    coff.header.machine
                );
                let block = coff.header.render();
                (
                    State::CoffDecoded {
                        dos,
                        pe_signature,
                        coff,
                    },
                    Some(block),
                )
            }
            State::CoffDecoded {
                dos,
                pe_signature,
                coff,
            } => {
                let width = Width::from_pe32_plus(coff.header.is_pe32_plus());
                log::info!("using {width:?} optional header layout");
                let optional = OptionalHeader::decode(&self.reader, coff.end(), width)?;
                check_optional_size(&coff.header, &optional.header);
                let block = optional.header.render();
                let headers = Headers {
                    dos,
                    pe_signature,
                    coff,
                    optional,
                };
                (State::OptionalDecoded(Box::new(headers)), Some(block))
            }
            State::OptionalDecoded(headers) => {
                log::debug!("inspection finished");
                (State::Done(headers), None)
            }
            done @ (State::Done(_) | State::Failed) => (done, None),
        };
        self.state = next;
        Ok(block)
    }

    /// Runs every remaining step, writing each block to `out` as soon as its
    /// header decoded.
    pub fn run<W: Write>(mut self, out: &mut W) -> Result<Headers> {
        while let Some(block) = self.step()? {
            write!(out, "{block}")?;
        }
        match self.state {
            State::Done(headers) => Ok(*headers),
            _ => Err(Error::InspectionFailed),
        }
    }

    /// The decoded headers, once every header has been read.
    pub fn headers(&self) -> Option<&Headers> {
        match &self.state {
            State::OptionalDecoded(headers) | State::Done(headers) => Some(headers.as_ref()),
            _ => None,
        }
    }

    fn pe_offset(&self, dos: &DosHeader) -> Result<usize> {
        usize::try_from(dos.e_lfanew).map_err(|_| Error::BoundsViolation {
            offset: i64::from(dos.e_lfanew),
            width: PE_SIGNATURE_LEN,
            len: self.reader.len(),
        })
    }
}

fn check_optional_size(coff: &CoffHeader, optional: &OptionalHeader) {
    let declared = usize::from(coff.size_of_optional_header);
    if declared < optional.size() {
        log::warn!(
            "COFF header declares a {declared}-byte optional header, smaller than the {} bytes of the {:?} layout",
            optional.size(),
            optional.width
        );
    }
}

/// Decodes every header of `bytes`, writing the report to `out`.
pub fn inspect<W: Write>(bytes: &[u8], out: &mut W) -> Result<Headers> {
    Inspector::new(bytes).run(out)
}

/// Maps the file at `path`, inspects it and releases the mapping.
pub fn inspect_file<P: AsRef<Path>, W: Write>(path: P, out: &mut W) -> Result<Headers> {
    let image = Image::open(path)?;
    inspect(image.bytes(), out)
}
