use cfg_error::IncludeError;
use cfg_position::Cursor;
use std::collections::VecDeque;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

/// One level of the include stack.
#[derive(Debug)]
pub enum Frame {
    File(FileFrame),
    Buffer(BufferFrame),
}

/// A file or directory/glob-expanded group of files.
///
/// `pending` holds paths not yet opened; the currently open one is
/// tracked by `name`/`reader`. A fresh frame (just pushed, nothing
/// activated) has `reader: None` — [`IncludeStack::advance`] treats that
/// the same as a frame whose active file just hit EOF.
#[derive(Debug)]
pub struct FileFrame {
    name: String,
    pub(crate) pending: VecDeque<PathBuf>,
    reader: Option<BufReader<std::fs::File>>,
    pub cursor: Cursor,
}

impl FileFrame {
    pub(crate) fn pending(name: String, paths: Vec<PathBuf>) -> Self {
        FileFrame { name, pending: paths.into(), reader: None, cursor: Cursor::default() }
    }

    pub fn active_name(&self) -> &str {
        &self.name
    }

    pub(crate) fn activate(&mut self, path: &Path) -> Result<(), IncludeError> {
        let file = std::fs::File::open(path).map_err(|_| IncludeError::NotFound(path.display().to_string()))?;
        self.name = path.display().to_string();
        self.reader = Some(BufReader::new(file));
        self.cursor = Cursor::default();
        Ok(())
    }

    pub(crate) fn read_byte(&mut self) -> std::io::Result<Option<u8>> {
        let Some(reader) = self.reader.as_mut() else { return Ok(None) };
        let mut byte = [0u8; 1];
        match reader.read(&mut byte)? {
            0 => Ok(None),
            _ => {
                self.cursor.advance(byte[0]);
                Ok(Some(byte[0]))
            }
        }
    }
}

/// An in-memory input frame: block-generator output, a pragma expansion,
/// or the top-level buffer the driver hands the lexer to start with.
#[derive(Debug)]
pub struct BufferFrame {
    name: String,
    content: String,
    pos: usize,
    pub cursor: Cursor,
    suppress_backticks: bool,
}

impl BufferFrame {
    pub(crate) fn new(name: String, content: String) -> Self {
        BufferFrame { name, content, pos: 0, cursor: Cursor::default(), suppress_backticks: false }
    }

    /// Marks this buffer as already backtick-substituted, so the lexer
    /// does not run the substitutor over it a second time. Set on output
    /// pushed by a block generator, which substitutes once up front.
    pub fn with_backticks_suppressed(mut self) -> Self {
        self.suppress_backticks = true;
        self
    }

    pub fn suppresses_backticks(&self) -> bool {
        self.suppress_backticks
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn read_byte(&mut self) -> Option<u8> {
        let byte = *self.content.as_bytes().get(self.pos)?;
        self.pos += 1;
        self.cursor.advance(byte);
        Some(byte)
    }
}
