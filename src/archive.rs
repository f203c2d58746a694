//! Tool archive unpacking.
//!
//! The upstream kiwix-tools release is a gzip-compressed tarball wrapping
//! its binaries in a single versioned top-level directory. Unpacking always
//! happens in a process-local staging area; only the flattened payload is
//! copied onto the target volume.

use crate::error::{Result, ShelfError};
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use log::debug;

/// Unpack a `.tar.gz` archive into `dest`.
pub fn unpack_tarball(archive: &Path, dest: &Path) -> Result<()> {
    let file = File::open(archive)
        .map_err(|e| ShelfError::archive_extract(format!("{}: {e}", archive.display())))?;
    let mut tarball = tar::Archive::new(GzDecoder::new(BufReader::new(file)));
    tarball
        .unpack(dest)
        .map_err(|e| ShelfError::archive_extract(format!("{}: {e}", archive.display())))?;
    debug!("unpacked {} into {}", archive.display(), dest.display());
    Ok(())
}

/// Copy the unpacked payload into `target`, overwriting existing files.
///
/// Release tarballs wrap their files in one top-level directory; when the
/// unpacked tree consists of exactly one directory, its contents are the
/// payload. `std::fs::copy` carries permission bits, so unix execute bits
/// on the binaries survive.
pub fn flatten_into(unpacked: &Path, target: &Path) -> Result<()> {
    let payload_root = payload_root(unpacked)?;
    copy_dir_contents(&payload_root, target)
}

fn payload_root(unpacked: &Path) -> Result<PathBuf> {
    let entries: Vec<PathBuf> = fs::read_dir(unpacked)
        .map_err(|e| ShelfError::archive_extract(format!("{}: {e}", unpacked.display())))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect();

    match entries.as_slice() {
        [single] if single.is_dir() => Ok(single.clone()),
        [] => Err(ShelfError::archive_extract(format!(
            "{}: archive is empty",
            unpacked.display()
        ))),
        _ => Ok(unpacked.to_path_buf()),
    }
}

fn copy_dir_contents(from: &Path, to: &Path) -> Result<()> {
    fs::create_dir_all(to).map_err(|e| ShelfError::fs_write(to, e))?;
    for entry in fs::read_dir(from).map_err(|e| ShelfError::archive_extract(e.to_string()))? {
        let entry = entry.map_err(|e| ShelfError::archive_extract(e.to_string()))?;
        let dest = to.join(entry.file_name());
        if entry.path().is_dir() {
            copy_dir_contents(&entry.path(), &dest)?;
        } else {
            fs::copy(entry.path(), &dest).map_err(|e| ShelfError::fs_write(&dest, e))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    /// Build a tarball shaped like the upstream release: one versioned
    /// top-level directory wrapping the binaries.
    fn build_tarball(dir: &Path, top_level: &str) -> PathBuf {
        let archive_path = dir.join("tools.tar.gz");
        let file = File::create(&archive_path).expect("create archive");
        let encoder = GzEncoder::new(file, Compression::default());
        let mut builder = tar::Builder::new(encoder);

        let mut header = tar::Header::new_gnu();
        let body = b"#!/bin/sh\nexit 0\n";
        header.set_size(body.len() as u64);
        header.set_mode(0o755);
        header.set_cksum();
        builder
            .append_data(
                &mut header,
                format!("{top_level}/kiwix-serve"),
                body.as_slice(),
            )
            .expect("append serve");

        let mut header = tar::Header::new_gnu();
        header.set_size(body.len() as u64);
        header.set_mode(0o755);
        header.set_cksum();
        builder
            .append_data(
                &mut header,
                format!("{top_level}/kiwix-manage"),
                body.as_slice(),
            )
            .expect("append manage");

        builder
            .into_inner()
            .expect("finish tar")
            .finish()
            .expect("finish gzip")
            .flush()
            .expect("flush");
        archive_path
    }

    #[test]
    fn test_unpack_and_flatten_strips_top_level_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        let archive = build_tarball(dir.path(), "kiwix-tools_linux-x86_64-3.7.0");

        let unpacked = dir.path().join("unpacked");
        unpack_tarball(&archive, &unpacked).expect("unpack");

        let tools = dir.path().join("tools");
        flatten_into(&unpacked, &tools).expect("flatten");

        assert!(tools.join("kiwix-serve").is_file());
        assert!(tools.join("kiwix-manage").is_file());
    }

    #[test]
    fn test_flatten_overwrites_prior_tools() {
        let dir = tempfile::tempdir().expect("tempdir");
        let archive = build_tarball(dir.path(), "kiwix-tools");
        let unpacked = dir.path().join("unpacked");
        unpack_tarball(&archive, &unpacked).expect("unpack");

        let tools = dir.path().join("tools");
        fs::create_dir_all(&tools).expect("mkdir");
        fs::write(tools.join("kiwix-serve"), b"stale").expect("seed stale tool");

        flatten_into(&unpacked, &tools).expect("flatten");
        let refreshed = fs::read(tools.join("kiwix-serve")).expect("read");
        assert_ne!(refreshed, b"stale");
    }

    #[cfg(unix)]
    #[test]
    fn test_flatten_preserves_execute_bits() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().expect("tempdir");
        let archive = build_tarball(dir.path(), "kiwix-tools");
        let unpacked = dir.path().join("unpacked");
        unpack_tarball(&archive, &unpacked).expect("unpack");

        let tools = dir.path().join("tools");
        flatten_into(&unpacked, &tools).expect("flatten");

        let mode = fs::metadata(tools.join("kiwix-serve"))
            .expect("metadata")
            .permissions()
            .mode();
        assert_ne!(mode & 0o111, 0, "execute bit must survive the copy");
    }

    #[test]
    fn test_corrupt_archive_is_extract_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let bogus = dir.path().join("bogus.tar.gz");
        fs::write(&bogus, b"this is not a tarball").expect("write");

        let err = unpack_tarball(&bogus, &dir.path().join("out")).expect_err("must fail");
        assert!(matches!(err, ShelfError::ArchiveExtract(_)));
    }
}
