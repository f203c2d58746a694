// Integration tests for deployment staging.
//
// These verify the testable properties of the provisioning workflow:
// - staging is idempotent (content survives re-runs byte-identical)
// - tools and generated documents reflect the latest run
// - nothing outside the deployment subtree is touched

use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use shelfport::config::Settings;
use shelfport::layout::DeploymentLayout;
use shelfport::{docsgen, staging};

/// Build a tarball shaped like the upstream tools release: one versioned
/// top-level directory wrapping the executables.
fn build_tool_tarball(dir: &Path) -> PathBuf {
    let archive_path = dir.join("kiwix-tools.tar.gz");
    let file = File::create(&archive_path).expect("create archive");
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = tar::Builder::new(encoder);

    for name in ["kiwix-serve", "kiwix-manage"] {
        let body = b"#!/bin/sh\nexit 0\n";
        let mut header = tar::Header::new_gnu();
        header.set_size(body.len() as u64);
        header.set_mode(0o755);
        header.set_cksum();
        builder
            .append_data(
                &mut header,
                format!("kiwix-tools_linux-x86_64-3.7.0/{name}"),
                body.as_slice(),
            )
            .expect("append tool");
    }

    builder
        .into_inner()
        .expect("finish tar")
        .finish()
        .expect("finish gzip")
        .flush()
        .expect("flush");
    archive_path
}

/// Run the on-disk staging steps (everything except the network fetch).
fn stage_from_archive(layout: &DeploymentLayout, archive: &Path) {
    staging::ensure_layout(layout).expect("ensure layout");
    staging::install_tools(layout, archive).expect("install tools");
    docsgen::write_all(layout, &Settings::default()).expect("write docs");
}

#[test]
fn test_staging_creates_the_full_layout() {
    let volume = tempfile::tempdir().expect("tempdir");
    let scratch = tempfile::tempdir().expect("tempdir");
    let layout = DeploymentLayout::on_volume(volume.path());
    let archive = build_tool_tarball(scratch.path());

    stage_from_archive(&layout, &archive);

    assert!(layout.is_staged());
    assert!(layout.server_bin().is_file());
    assert!(layout.manage_bin().is_file());
    assert!(layout.readme_file().is_file());
    assert!(layout.launcher_file().is_file());
    assert!(
        layout.content_dir().read_dir().expect("read").next().is_none(),
        "content starts empty"
    );
}

#[test]
fn test_restaging_preserves_content_byte_identical() {
    let volume = tempfile::tempdir().expect("tempdir");
    let scratch = tempfile::tempdir().expect("tempdir");
    let layout = DeploymentLayout::on_volume(volume.path());
    let archive = build_tool_tarball(scratch.path());

    stage_from_archive(&layout, &archive);

    let keeper = layout.content_dir().join("wikipedia_en_all.zim");
    fs::write(&keeper, b"operator-supplied archive bytes").expect("seed content");

    stage_from_archive(&layout, &archive);

    assert_eq!(
        fs::read(&keeper).expect("read"),
        b"operator-supplied archive bytes",
        "re-staging must not touch content archives"
    );
}

#[test]
fn test_restaging_refreshes_tools_and_documents() {
    let volume = tempfile::tempdir().expect("tempdir");
    let scratch = tempfile::tempdir().expect("tempdir");
    let layout = DeploymentLayout::on_volume(volume.path());
    let archive = build_tool_tarball(scratch.path());

    stage_from_archive(&layout, &archive);

    // Simulate drift: stale tool build and an operator-edited README.
    fs::write(layout.server_bin(), b"stale build").expect("seed stale tool");
    fs::write(layout.readme_file(), "operator scribbles").expect("seed readme");

    stage_from_archive(&layout, &archive);

    assert_ne!(fs::read(layout.server_bin()).expect("read"), b"stale build");
    let readme = fs::read_to_string(layout.readme_file()).expect("read");
    assert!(!readme.contains("operator scribbles"));
}

#[test]
fn test_staging_never_touches_files_outside_its_subtree() {
    let volume = tempfile::tempdir().expect("tempdir");
    let scratch = tempfile::tempdir().expect("tempdir");

    // Unrelated user data already on the volume.
    let user_file = volume.path().join("vacation-photos.txt");
    fs::write(&user_file, b"precious").expect("seed user data");
    let user_dir = volume.path().join("backups");
    fs::create_dir(&user_dir).expect("mkdir");
    fs::write(user_dir.join("notes.md"), b"more precious").expect("seed");

    let layout = DeploymentLayout::on_volume(volume.path());
    let archive = build_tool_tarball(scratch.path());
    stage_from_archive(&layout, &archive);

    assert_eq!(fs::read(&user_file).expect("read"), b"precious");
    assert_eq!(
        fs::read(user_dir.join("notes.md")).expect("read"),
        b"more precious"
    );

    // The volume root gained exactly one entry: the deployment root.
    let mut entries: Vec<String> = fs::read_dir(volume.path())
        .expect("read volume root")
        .filter_map(|e| e.ok().map(|e| e.file_name().to_string_lossy().to_string()))
        .collect();
    entries.sort();
    assert_eq!(entries, vec!["backups", "shelf", "vacation-photos.txt"]);
}

#[test]
fn test_unconfirmed_stage_makes_no_changes() {
    let volume = tempfile::tempdir().expect("tempdir");
    let layout = DeploymentLayout::on_volume(volume.path());
    let client = shelfport::fetch::client().expect("client");

    let result = staging::stage(&layout, &Settings::default(), false, &client);
    assert!(result.is_err());
    assert!(!layout.root().exists());
}
