//! Bounded stack of include frames: files, directories expanded into a
//! pending-file queue, glob patterns expanded the same way, and in-memory
//! buffers (block-generator output, pragma expansions).
//!
//! At most one frame is ever "active" (its bytes being read) at a time —
//! the top of the stack. [`IncludeStack::advance`] is the single place
//! that decides what happens when the active frame runs out of input:
//! move to the next pending path at the same level, or pop the level and
//! resume whatever is beneath it.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

mod frame;

use cfg_error::{IncludeError, Location};
use cfg_position::Cursor;
use std::path::{Path, PathBuf};

pub use frame::{BufferFrame, Frame, FileFrame};

/// Matches the reference lexer's fixed-size include stack; exceeding it
/// is a configuration error, not a panic.
pub const MAX_INCLUDE_DEPTH: usize = 256;

/// A stack of include frames with at most one active leaf.
#[derive(Debug, Default)]
pub struct IncludeStack {
    frames: Vec<Frame>,
}

impl IncludeStack {
    pub fn new() -> Self {
        IncludeStack::default()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn top(&self) -> Option<&Frame> {
        self.frames.last()
    }

    /// Push a file or directory include. `search_path` is the
    /// colon-separated list the `include-path` global holds; relative
    /// `path`s are resolved against it in order.
    pub fn push_file_or_directory(&mut self, path: &str, search_path: &str) -> Result<(), IncludeError> {
        self.check_depth()?;
        if is_glob_pattern(path) {
            return self.push_glob(path);
        }
        let resolved = resolve_path(path, search_path)?;
        if resolved.is_dir() {
            self.push_directory(&resolved)
        } else {
            self.push_pending(resolved.display().to_string(), vec![resolved]);
            Ok(())
        }
    }

    /// Push a named in-memory buffer (block-generator output, a pragma
    /// expansion). Active immediately — buffers have no pending queue.
    pub fn push_buffer(&mut self, name: impl Into<String>, content: impl Into<String>) -> Result<(), IncludeError> {
        self.check_depth()?;
        self.frames.push(Frame::Buffer(BufferFrame::new(name.into(), content.into())));
        Ok(())
    }

    /// Push a block generator's already-substituted output, marking the
    /// buffer so the lexer does not run backtick substitution over it a
    /// second time.
    pub fn push_generated_buffer(&mut self, name: impl Into<String>, content: impl Into<String>) -> Result<(), IncludeError> {
        self.check_depth()?;
        self.frames.push(Frame::Buffer(BufferFrame::new(name.into(), content.into()).with_backticks_suppressed()));
        Ok(())
    }

    fn push_directory(&mut self, dir: &Path) -> Result<(), IncludeError> {
        let read_dir = std::fs::read_dir(dir)
            .map_err(|_| IncludeError::DirectoryUnreadable(dir.display().to_string()))?;
        let mut entries = Vec::new();
        for entry in read_dir.flatten() {
            let file_name = entry.file_name();
            let name = file_name.to_string_lossy().to_string();
            if name.starts_with('.') {
                tracing::debug!(filename = %name, "skipping include file, it cannot begin with .");
                continue;
            }
            if !name.chars().all(is_admissible_char) {
                tracing::debug!(filename = %name, "skipping include file, does not match pattern [-_a-zA-Z0-9.]+");
                continue;
            }
            let full = dir.join(&file_name);
            if full.is_dir() {
                tracing::debug!(filename = %name, "skipping include file as it is a directory");
                continue;
            }
            entries.push((name, full));
        }
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        if entries.is_empty() {
            tracing::debug!(dir = %dir.display(), "no files in this include directory");
            return Ok(());
        }
        let paths = entries.into_iter().map(|(_, path)| path).collect();
        self.push_pending(dir.display().to_string(), paths);
        Ok(())
    }

    fn push_glob(&mut self, pattern: &str) -> Result<(), IncludeError> {
        let mut matches: Vec<PathBuf> = glob::glob(pattern)
            .map_err(|e| IncludeError::GlobFailure(pattern.to_string(), e.to_string()))?
            .filter_map(Result::ok)
            .collect();
        matches.sort();
        if matches.is_empty() {
            tracing::debug!(pattern, "glob pattern matched no files");
            return Ok(());
        }
        self.push_pending(pattern.to_string(), matches);
        Ok(())
    }

    fn push_pending(&mut self, name: String, pending: Vec<PathBuf>) {
        self.frames.push(Frame::File(FileFrame::pending(name, pending)));
        // A freshly pushed file level has nothing open yet; `advance`
        // performs the same "pop next pending, open it" step whether
        // called here or later when the active file hits EOF.
        self.advance();
    }

    fn check_depth(&self) -> Result<(), IncludeError> {
        if self.frames.len() >= MAX_INCLUDE_DEPTH {
            Err(IncludeError::DepthExceeded { max: MAX_INCLUDE_DEPTH })
        } else {
            Ok(())
        }
    }

    /// Called when the active frame's input is exhausted. Returns `true`
    /// if a frame is active afterward (same level advanced to its next
    /// pending path, or a lower level resumed), `false` if the stack is
    /// now empty.
    pub fn advance(&mut self) -> bool {
        loop {
            match self.frames.last_mut() {
                None => return false,
                Some(Frame::File(file)) => match file.pending.pop_front() {
                    Some(path) => match file.activate(&path) {
                        Ok(()) => return true,
                        Err(err) => {
                            tracing::warn!(path = %path.display(), error = %err, "skipping include file that failed to open");
                        }
                    },
                    None => {
                        self.frames.pop();
                        return !self.frames.is_empty();
                    }
                },
                Some(Frame::Buffer(_)) => {
                    self.frames.pop();
                    return !self.frames.is_empty();
                }
            }
        }
    }

    /// Read the next byte from the active frame, advancing its cursor.
    /// `None` means the active frame is exhausted — the caller should
    /// call [`advance`](Self::advance) and retry.
    pub fn read_byte(&mut self) -> std::io::Result<Option<u8>> {
        match self.frames.last_mut() {
            None => Ok(None),
            Some(Frame::File(file)) => file.read_byte(),
            Some(Frame::Buffer(buffer)) => Ok(buffer.read_byte()),
        }
    }

    /// The location to report a diagnostic at: the active frame's
    /// position, tagged with the nearest enclosing file's name (or
    /// `#buffer` if only buffers are on the stack).
    pub fn top_location(&self) -> Location {
        let position = match self.frames.last() {
            Some(Frame::File(file)) => file.cursor.position(),
            Some(Frame::Buffer(buffer)) => buffer.cursor.position(),
            None => cfg_position::Position::START,
        };
        for frame in self.frames.iter().rev() {
            if let Frame::File(file) = frame {
                return Location::new(file.active_name().to_string(), position.line, position.column);
            }
        }
        Location::buffer(position.line, position.column)
    }
}

fn is_admissible_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.'
}

fn is_glob_pattern(path: &str) -> bool {
    path.contains(['*', '?', '['])
}

fn resolve_path(path: &str, search_path: &str) -> Result<PathBuf, IncludeError> {
    let candidate = Path::new(path);
    if candidate.is_absolute() {
        return if candidate.exists() {
            Ok(candidate.to_path_buf())
        } else {
            Err(IncludeError::NotFound(path.to_string()))
        };
    }
    for dir in search_path.split(':').filter(|d| !d.is_empty()) {
        let joined = Path::new(dir).join(path);
        if joined.exists() {
            return Ok(joined);
        }
    }
    if candidate.exists() {
        return Ok(candidate.to_path_buf());
    }
    Err(IncludeError::NotFound(path.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Write;

    proptest! {
        #[test]
        fn depth_never_exceeds_bound_and_drains_to_empty(push_attempts in 0usize..300) {
            let mut stack = IncludeStack::new();
            for _ in 0..push_attempts {
                if stack.push_buffer("b", "x").is_err() {
                    break;
                }
                prop_assert!(stack.depth() <= MAX_INCLUDE_DEPTH);
            }
            prop_assert!(stack.depth() <= MAX_INCLUDE_DEPTH);
            while !stack.is_empty() {
                stack.advance();
            }
            prop_assert!(stack.is_empty());
        }
    }

    #[test]
    fn buffer_frame_is_active_immediately() {
        let mut stack = IncludeStack::new();
        stack.push_buffer("#generated", "source s { };").unwrap();
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.read_byte().unwrap(), Some(b's'));
    }

    #[test]
    fn generated_buffer_reports_suppressed_backticks() {
        let mut stack = IncludeStack::new();
        stack.push_generated_buffer("#block", "x").unwrap();
        let Some(Frame::Buffer(buffer)) = stack.top() else { panic!("expected buffer frame") };
        assert!(buffer.suppresses_backticks());
    }

    #[test]
    fn top_location_falls_back_to_buffer_sentinel() {
        let mut stack = IncludeStack::new();
        stack.push_buffer("ignored-name", "x").unwrap();
        assert_eq!(stack.top_location().file, "#buffer");
    }

    #[test]
    fn depth_bound_is_enforced() {
        let mut stack = IncludeStack::new();
        for _ in 0..MAX_INCLUDE_DEPTH {
            stack.push_buffer("b", "x").unwrap();
        }
        let err = stack.push_buffer("b", "x").unwrap_err();
        assert_eq!(err, IncludeError::DepthExceeded { max: MAX_INCLUDE_DEPTH });
    }

    #[test]
    fn directory_include_filters_dotfiles_and_bad_characters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.conf", "a.conf", ".hidden", "bad name.conf"] {
            let mut f = std::fs::File::create(dir.path().join(name)).unwrap();
            writeln!(f, "# {name}").unwrap();
        }
        std::fs::create_dir(dir.path().join("subdir")).unwrap();

        let mut stack = IncludeStack::new();
        stack.push_file_or_directory(dir.path().to_str().unwrap(), "").unwrap();
        assert_eq!(stack.depth(), 1);

        let Some(Frame::File(file)) = stack.top() else { panic!("expected file frame") };
        assert_eq!(file.active_name(), dir.path().join("a.conf").display().to_string());
        assert_eq!(file.pending.len(), 1);
        assert_eq!(file.pending[0], dir.path().join("b.conf"));
    }

    #[test]
    fn empty_directory_pushes_no_frame() {
        let dir = tempfile::tempdir().unwrap();
        let mut stack = IncludeStack::new();
        stack.push_file_or_directory(dir.path().to_str().unwrap(), "").unwrap();
        assert!(stack.is_empty());
    }

    #[test]
    fn advance_moves_through_directory_entries_then_pops() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.conf"), "A").unwrap();
        std::fs::write(dir.path().join("b.conf"), "B").unwrap();

        let mut stack = IncludeStack::new();
        stack.push_file_or_directory(dir.path().to_str().unwrap(), "").unwrap();
        assert_eq!(stack.read_byte().unwrap(), Some(b'A'));
        assert_eq!(stack.read_byte().unwrap(), None);

        assert!(stack.advance());
        assert_eq!(stack.read_byte().unwrap(), Some(b'B'));
        assert_eq!(stack.read_byte().unwrap(), None);

        assert!(!stack.advance());
        assert!(stack.is_empty());
    }

    #[test]
    fn missing_file_resolved_against_search_path_fails() {
        let mut stack = IncludeStack::new();
        let err = stack.push_file_or_directory("nope.conf", "/does/not/exist").unwrap_err();
        assert_eq!(err, IncludeError::NotFound("nope.conf".to_string()));
    }
}
