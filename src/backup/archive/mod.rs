pub mod directory;

use crate::backup::result_error::result::Result;
use dyn_iter::DynIter;
use std::path::Path;
use std::sync::Arc;

/// Represents a single filesystem entry to be written into an archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Source file/directory path on the filesystem
    pub src: Arc<Path>,

    /// Path of the entry inside the archive, relative to the archive root
    pub dst: Arc<Path>,
}

impl ArchiveEntry {
    pub fn new<A: Into<Arc<Path>>, B: Into<Arc<Path>>>(src: A, dst: B) -> ArchiveEntry {
        Self {
            src: src.into(),
            dst: dst.into(),
        }
    }
}

/// Produces the entries of one archive.
///
/// The iterator yields Results so that an entry failing mid-walk (permission
/// denied, file vanished) surfaces to the archive writer instead of being
/// silently skipped.
pub trait ArchiveEntryIterable {
    fn archive_entry_iterator<'a>(&self) -> Result<DynIter<'a, Result<ArchiveEntry>>>;
}
