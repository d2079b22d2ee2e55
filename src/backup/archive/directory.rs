use crate::backup::archive::{ArchiveEntry, ArchiveEntryIterable};
use crate::backup::function_path;
use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::Result;
use crate::backup::result_error::ErrorContext;

use dyn_iter::{DynIter, IntoDynIterator};
use function_name::named;
use getset::Getters;
use walkdir::{DirEntry, WalkDir};

use std::path::{Path, PathBuf};

/// Fallback archive root when a source path has no final component (`/`).
static ROOT_FALLBACK_NAME: &str = "root";

/// Recursive walk of one source directory.
///
/// Every entry is placed under the directory's own name inside the archive,
/// so `/srv/projects/a.txt` is stored as `projects/a.txt` and extraction
/// recreates `projects/` rather than an absolute path.
#[derive(Clone, Debug, PartialEq, Eq, Getters)]
#[getset(get = "pub")]
pub struct DirectorySource {
    src_dir: PathBuf,
    root_name: PathBuf,
}

impl DirectorySource {
    pub fn new<P: Into<PathBuf>>(src_dir: P) -> Result<Self> {
        let src_dir = src_dir.into();
        let root_name = match src_dir.file_name() {
            Some(name) => PathBuf::from(name),
            None => src_dir
                .canonicalize()?
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(ROOT_FALLBACK_NAME)),
        };

        Ok(Self { src_dir, root_name })
    }
}

impl ArchiveEntryIterable for DirectorySource {
    #[named]
    fn archive_entry_iterator<'a>(&self) -> Result<DynIter<'a, Result<ArchiveEntry>>> {
        tracing::debug!(
            "Scanning directory {:?} as archive root {:?}",
            self.src_dir,
            self.root_name
        );

        let src_dir = self.src_dir.clone();
        let root_name = self.root_name.clone();
        let entries = WalkDir::new(&self.src_dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .map(move |res| {
                res.map_err(Error::from)
                    .and_then(|de| process_dir_entry(de, &src_dir, &root_name))
                    .add_fn_name(function_path!())
            });

        Ok(entries.into_dyn_iter())
    }
}

fn process_dir_entry<P1: AsRef<Path>, P2: AsRef<Path>>(
    de: DirEntry,
    base_src_dir: P1,
    root_name: P2,
) -> Result<ArchiveEntry> {
    let p = de.into_path();
    let stripped = p
        .strip_prefix(base_src_dir.as_ref())
        .map_err(Error::from)
        .with_msg(format!(
            "Stripping {:?} from {:?} failed",
            base_src_dir.as_ref(),
            p
        ))?;

    let dst = if stripped.as_os_str().is_empty() {
        root_name.as_ref().to_path_buf()
    } else {
        root_name.as_ref().join(stripped)
    };
    tracing::trace!("Including: {:?} -> {:?}", p, dst);
    Ok(ArchiveEntry::new(p, dst))
}
