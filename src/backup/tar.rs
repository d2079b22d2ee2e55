use crate::backup::archive::directory::DirectorySource;
use crate::backup::archive::ArchiveEntryIterable;
use crate::backup::compress::{CompressorBuilder, CompressorConfig};
use crate::backup::function_path;
use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::Result;
use crate::backup::result_error::ErrorContext;
use function_name::named;
use std::io::{BufWriter, IntoInnerError};
use std::path::{Path, PathBuf};

/// `{source_name}_{timestamp}.{ext}`, e.g. `docs_20240101_020000.tar.xz`
pub fn archive_file_name(source_name: &str, timestamp: &str, compressor: &CompressorConfig) -> String {
    format!("{source_name}_{timestamp}.{}", compressor.archive_ext())
}

/// Archives `source_path` into `destination_dir` and returns the archive path.
///
/// The archive is built under a hidden temporary name in `destination_dir`,
/// finished and synced, and only then renamed to its final name. If anything
/// fails the temporary file is removed when it goes out of scope.
pub fn create_archive<P1: AsRef<Path>, P2: AsRef<Path>>(
    source_name: &str,
    source_path: P1,
    destination_dir: P2,
    timestamp: &str,
    compressor: &CompressorConfig,
) -> Result<PathBuf> {
    write_archive(
        source_name,
        source_path.as_ref(),
        destination_dir.as_ref(),
        timestamp,
        compressor,
    )
}

#[named]
fn write_archive(
    source_name: &str,
    source_path: &Path,
    destination_dir: &Path,
    timestamp: &str,
    compressor: &CompressorConfig,
) -> Result<PathBuf> {
    let file_name = archive_file_name(source_name, timestamp, compressor);
    let file_path = destination_dir.join(&file_name);
    tracing::info!("Creating archive for {} from {:?}", source_name, source_path);

    let file_path_tmp = tempfile::Builder::new()
        .prefix(&format!(".{file_name}."))
        .suffix(".tmp")
        .tempfile_in(destination_dir)
        .map_err(Error::from)
        .add_fn_name(function_path!())?;

    let entries = DirectorySource::new(source_path)?.archive_entry_iterator()?;

    let mut writer = compressor
        .build_compressor(BufWriter::new(file_path_tmp.as_file()))
        .map(BufWriter::new)
        .map(tar::Builder::new)?;
    writer.follow_symlinks(true);

    let mut entry_count = 0;
    for entry in entries {
        let entry = entry?;
        writer
            .append_path_with_name(&entry.src, &entry.dst)
            .map_err(Error::from)
            .add_fn_name(function_path!())?;
        entry_count += 1;
    }

    writer
        .into_inner()?
        .into_inner()
        .map_err(IntoInnerError::into_error)?
        .finish()?
        .into_inner()
        .map_err(IntoInnerError::into_error)?
        .sync_all()?;

    file_path_tmp
        .persist(&file_path)
        .map_err(|e| Error::from(e.error))
        .add_fn_name(function_path!())?;

    tracing::info!(
        "Archive created at {:?} with {} entries",
        file_path,
        entry_count
    );
    Ok(file_path)
}
