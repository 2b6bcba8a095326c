use std::fs;
use std::io;
use std::path::Path;

/// Something that knows how to produce the content of a single file.
///
/// The tree hands over the file's absolute path when it is invoked; the
/// handler performs the write itself.
pub trait FileHandler {
    fn write(&self, path: &Path) -> io::Result<()>;
}

impl<F> FileHandler for F
where
    F: Fn(&Path) -> io::Result<()>,
{
    fn write(&self, path: &Path) -> io::Result<()> {
        self(path)
    }
}

/// Writes a fixed set of bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticFile {
    contents: Vec<u8>,
}

impl StaticFile {
    pub fn new(contents: impl Into<Vec<u8>>) -> Self {
        Self {
            contents: contents.into(),
        }
    }

    pub fn contents(&self) -> &[u8] {
        &self.contents
    }
}

impl FileHandler for StaticFile {
    fn write(&self, path: &Path) -> io::Result<()> {
        fs::write(path, &self.contents)
    }
}
