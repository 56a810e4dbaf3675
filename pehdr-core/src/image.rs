use crate::error::{Error, Result};
use memmap2::Mmap;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Read-only memory mapping of a whole executable.
///
/// The mapping is released when the `Image` is dropped, so every exit path
/// out of an inspection unmaps the file.
#[derive(Debug)]
pub struct Image {
    path: PathBuf,
    map: Mmap,
}

impl Image {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let unavailable = |source| Error::SourceUnavailable {
            path: path.clone(),
            source,
        };

        let file = File::open(&path).map_err(unavailable)?;
        let size = file.metadata().map_err(unavailable)?.len();
        if size == 0 {
            return Err(Error::EmptySource { path: path.clone() });
        }

        // SAFETY: the map is read-only and never outlives `self`; external
        // truncation of the file while mapped is outside what we guard against.
        let map = unsafe { Mmap::map(&file) }.map_err(unavailable)?;
        log::debug!("mapped {} ({} bytes)", path.display(), map.len());

        Ok(Self { path, map })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn bytes(&self) -> &[u8] {
        &self.map
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl Drop for Image {
    fn drop(&mut self) {
        log::debug!("released {}", self.path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("pehdr-image-{}-{name}", std::process::id()))
    }

    #[test]
    fn maps_whole_file() {
        let path = temp_path("whole");
        let mut f = File::create(&path).unwrap();
        f.write_all(b"MZ\x90\x00hello").unwrap();
        drop(f);

        let image = Image::open(&path).unwrap();
        assert_eq!(image.len(), 9);
        assert_eq!(&image.bytes()[..2], b"MZ");
        assert_eq!(image.path(), path.as_path());
        drop(image);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn empty_file_is_rejected() {
        let path = temp_path("empty");
        File::create(&path).unwrap();
        let err = Image::open(&path).unwrap_err();
        assert!(matches!(err, Error::EmptySource { .. }));
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn missing_file_is_unavailable() {
        let err = Image::open(temp_path("does-not-exist")).unwrap_err();
        assert!(matches!(err, Error::SourceUnavailable { .. }));
    }
}
