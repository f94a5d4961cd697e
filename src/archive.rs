use std::io::{Seek, Write};

use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::foundation::error::{SkinError, SkinResult};

/// Append-file/finalize wrapper around the zip writer.
///
/// Writes are serialized by construction: one archive, one writer. Any zip
/// failure maps to [`SkinError::Archive`], the only run-fatal error.
pub struct SkinArchive<W: Write + Seek> {
    writer: ZipWriter<W>,
}

impl<W: Write + Seek> SkinArchive<W> {
    /// Start a new archive over `inner`.
    pub fn new(inner: W) -> Self {
        Self {
            writer: ZipWriter::new(inner),
        }
    }

    /// Append one file under its archive-internal name.
    pub fn add_file(&mut self, name: &str, bytes: &[u8]) -> SkinResult<()> {
        self.writer
            .start_file(name, SimpleFileOptions::default())
            .map_err(|err| SkinError::archive(format!("add '{name}': {err}")))?;
        self.writer
            .write_all(bytes)
            .map_err(|err| SkinError::archive(format!("write '{name}': {err}")))?;
        Ok(())
    }

    /// Write the central directory and hand back the underlying writer.
    pub fn finish(self) -> SkinResult<W> {
        self.writer
            .finish()
            .map_err(|err| SkinError::archive(format!("finalize archive: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};

    #[test]
    fn round_trips_entries() {
        let mut archive = SkinArchive::new(Cursor::new(Vec::new()));
        archive.add_file("a.png", b"png bytes").unwrap();
        archive.add_file("info.json", b"{}").unwrap();
        let cursor = archive.finish().unwrap();

        let mut read_back = zip::ZipArchive::new(Cursor::new(cursor.into_inner())).unwrap();
        assert_eq!(read_back.len(), 2);
        let mut contents = String::new();
        read_back
            .by_name("a.png")
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        assert_eq!(contents, "png bytes");
    }
}
