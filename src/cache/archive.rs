//! Streaming tar.gz capture and restore of install directories
//!
//! Capture pipes a tar builder through a gzip encoder straight into a
//! temporary file next to the destination, then renames it into place.
//! Readers checking `exists()` never see a half-written archive.
//!
//! Restore pipes the archive file through an (auto-detected) gzip decoder
//! straight into the tar unpacker.

use crate::cache::store::PARTIAL_PREFIX;
use crate::error::{DepcacheError, DepcacheResult};
use flate2::bufread::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
#[cfg(test)]
use std::path::PathBuf;
use tracing::debug;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Archive `source` into `destination` (tar.gz, paths relative to `source`)
pub async fn capture(source: &Path, destination: &Path) -> DepcacheResult<()> {
    let source = source.to_path_buf();
    let destination = destination.to_path_buf();

    tokio::task::spawn_blocking(move || capture_blocking(&source, &destination))
        .await
        .map_err(|e| DepcacheError::Internal(format!("archive capture task failed: {e}")))?
}

/// Unpack `archive` into `destination`, creating it if needed
pub async fn restore(archive: &Path, destination: &Path) -> DepcacheResult<()> {
    let archive = archive.to_path_buf();
    let destination = destination.to_path_buf();

    tokio::task::spawn_blocking(move || restore_blocking(&archive, &destination))
        .await
        .map_err(|e| DepcacheError::Internal(format!("archive restore task failed: {e}")))?
}

fn capture_blocking(source: &Path, destination: &Path) -> DepcacheResult<()> {
    if !source.is_dir() {
        return Err(DepcacheError::archive(
            source,
            "source directory does not exist",
        ));
    }

    let parent = destination
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let tmp = tempfile::Builder::new()
        .prefix(PARTIAL_PREFIX)
        .tempfile_in(parent)
        .map_err(|e| DepcacheError::io(format!("creating temp archive in {}", parent.display()), e))?;

    let mut builder = tar::Builder::new(GzEncoder::new(tmp, Compression::default()));
    builder.follow_symlinks(false);
    builder
        .append_dir_all(".", source)
        .map_err(|e| DepcacheError::archive(source, format!("tar append failed: {e}")))?;

    let tmp = builder
        .into_inner()
        .and_then(GzEncoder::finish)
        .map_err(|e| DepcacheError::io(format!("finishing archive {}", destination.display()), e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| DepcacheError::io(format!("syncing archive {}", destination.display()), e))?;

    tmp.persist(destination).map_err(|e| {
        DepcacheError::io(format!("moving archive into {}", destination.display()), e.error)
    })?;

    debug!("Captured {} into {}", source.display(), destination.display());
    Ok(())
}

fn restore_blocking(archive: &Path, destination: &Path) -> DepcacheResult<()> {
    let file = File::open(archive)
        .map_err(|e| DepcacheError::io(format!("opening archive {}", archive.display()), e))?;
    fs::create_dir_all(destination)
        .map_err(|e| DepcacheError::io(format!("creating directory {}", destination.display()), e))?;

    let mut reader = BufReader::new(file);
    let gzipped = reader
        .fill_buf()
        .map_err(|e| DepcacheError::io(format!("reading archive {}", archive.display()), e))?
        .starts_with(&GZIP_MAGIC);

    let stream: Box<dyn Read> = if gzipped {
        Box::new(GzDecoder::new(reader))
    } else {
        Box::new(reader)
    };

    let mut unpacker = tar::Archive::new(stream);
    unpacker.set_overwrite(true);
    unpacker.set_preserve_permissions(true);
    unpacker
        .unpack(destination)
        .map_err(|e| classify_unpack_error(archive, destination, e))?;

    debug!(
        "Restored {} into {} (gzip: {})",
        archive.display(),
        destination.display(),
        gzipped
    );
    Ok(())
}

/// Corrupt or truncated data is an archive problem; anything else is the filesystem's
fn classify_unpack_error(archive: &Path, destination: &Path, e: io::Error) -> DepcacheError {
    match e.kind() {
        io::ErrorKind::InvalidData
        | io::ErrorKind::InvalidInput
        | io::ErrorKind::UnexpectedEof
        | io::ErrorKind::Other => DepcacheError::archive(archive, e.to_string()),
        _ => DepcacheError::io(format!("unpacking into {}", destination.display()), e),
    }
}

/// Relative paths of every regular file under `root`, sorted
#[cfg(test)]
pub(crate) fn list_files(root: &Path) -> io::Result<Vec<PathBuf>> {
    fn walk(root: &Path, dir: &Path, out: &mut Vec<PathBuf>) -> io::Result<()> {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if entry.file_type()?.is_dir() {
                walk(root, &path, out)?;
            } else if let Ok(rel) = path.strip_prefix(root) {
                out.push(rel.to_path_buf());
            }
        }
        Ok(())
    }

    let mut files = Vec::new();
    walk(root, root, &mut files)?;
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn populate(root: &Path) {
        fs::create_dir_all(root.join("left-pad/lib")).unwrap();
        fs::create_dir_all(root.join(".bin")).unwrap();
        fs::write(root.join("left-pad/package.json"), b"{\"name\":\"left-pad\"}").unwrap();
        fs::write(root.join("left-pad/lib/index.js"), b"module.exports = pad;\n").unwrap();
        fs::write(root.join(".bin/tool"), [0u8, 159, 146, 150, 255]).unwrap();
    }

    #[tokio::test]
    async fn capture_restore_roundtrip() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        populate(src.path());

        let archive = out.path().join("cache").join("abc.tar.gz");
        fs::create_dir_all(archive.parent().unwrap()).unwrap();
        capture(src.path(), &archive).await.unwrap();

        let dest = out.path().join("restored");
        restore(&archive, &dest).await.unwrap();

        let files = list_files(&dest).unwrap();
        assert_eq!(files, list_files(src.path()).unwrap());
        for rel in files {
            assert_eq!(
                fs::read(dest.join(&rel)).unwrap(),
                fs::read(src.path().join(&rel)).unwrap(),
                "content mismatch for {}",
                rel.display()
            );
        }
    }

    #[tokio::test]
    async fn capture_writes_gzip_and_no_temp_files() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        populate(src.path());

        let archive = out.path().join("abc.tar.gz");
        capture(src.path(), &archive).await.unwrap();

        let bytes = fs::read(&archive).unwrap();
        assert!(bytes.starts_with(&GZIP_MAGIC));
        let names: Vec<_> = fs::read_dir(out.path()).unwrap().collect();
        assert_eq!(names.len(), 1);
    }

    #[tokio::test]
    async fn capture_overwrites_existing_archive() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        populate(src.path());

        let archive = out.path().join("abc.tar.gz");
        fs::write(&archive, b"stale").unwrap();
        capture(src.path(), &archive).await.unwrap();

        assert!(fs::read(&archive).unwrap().starts_with(&GZIP_MAGIC));
    }

    #[tokio::test]
    async fn capture_missing_source_is_archive_error() {
        let out = TempDir::new().unwrap();
        let err = capture(&out.path().join("missing"), &out.path().join("a.tar.gz"))
            .await
            .unwrap_err();

        assert!(matches!(err, DepcacheError::Archive { .. }));
        assert!(!out.path().join("a.tar.gz").exists());
    }

    #[tokio::test]
    async fn restore_plain_tar() {
        let out = TempDir::new().unwrap();
        let archive = out.path().join("plain.tar");
        {
            let file = File::create(&archive).unwrap();
            let mut builder = tar::Builder::new(file);
            let content = b"plain";
            let mut header = tar::Header::new_gnu();
            header.set_path("pkg/readme.md").unwrap();
            header.set_size(content.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append(&header, &content[..]).unwrap();
            builder.finish().unwrap();
        }

        let dest = out.path().join("dest");
        restore(&archive, &dest).await.unwrap();
        assert_eq!(fs::read(dest.join("pkg/readme.md")).unwrap(), b"plain");
    }

    #[tokio::test]
    async fn restore_garbage_is_archive_error() {
        let out = TempDir::new().unwrap();
        let archive = out.path().join("bad.tar.gz");
        fs::write(&archive, vec![b'x'; 1024]).unwrap();

        let err = restore(&archive, &out.path().join("dest")).await.unwrap_err();
        assert!(matches!(err, DepcacheError::Archive { .. }));
    }

    #[tokio::test]
    async fn restore_corrupt_gzip_is_archive_error() {
        let out = TempDir::new().unwrap();
        let archive = out.path().join("bad.tar.gz");
        let mut bytes = GZIP_MAGIC.to_vec();
        bytes.extend_from_slice(&[0xff; 64]);
        fs::write(&archive, bytes).unwrap();

        let err = restore(&archive, &out.path().join("dest")).await.unwrap_err();
        assert!(matches!(err, DepcacheError::Archive { .. }));
    }

    #[tokio::test]
    async fn restore_missing_archive_is_io_error() {
        let out = TempDir::new().unwrap();
        let err = restore(&out.path().join("none.tar.gz"), &out.path().join("dest"))
            .await
            .unwrap_err();
        assert!(matches!(err, DepcacheError::Io { .. }));
    }
}
