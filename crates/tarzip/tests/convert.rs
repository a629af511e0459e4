//! End-to-end conversion tests: tar (or tgz) fixture in, zip out.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use flate2::{write::GzEncoder, Compression};
use similar_asserts::assert_eq;
use tar_parser::{EntryType, Header};
use tarzip::{convert_to_zip, ConvertError, ExtractOptions, JobSource, JobSpec};
use zip::ZipArchive;

fn append_file(builder: &mut tar::Builder<Vec<u8>>, path: &str, content: &[u8], mode: u32) {
    let mut header = tar::Header::new_ustar();
    header.set_size(content.len() as u64);
    header.set_mode(mode);
    header.set_mtime(1_700_000_000);
    header.set_entry_type(tar::EntryType::Regular);
    builder.append_data(&mut header, path, content).unwrap();
}

/// Hand-rolled raw entry, for paths the `tar` crate refuses to write
/// (absolute, parent traversal).
fn raw_file(path: &str, content: &[u8], mode: u32) -> Vec<u8> {
    let mut header = Header::new_ustar();
    header.set_path(path).unwrap();
    header.set_size(content.len() as u64);
    header.set_mode(mode);
    header.set_mtime(1_700_000_000);
    header.set_entry_type(EntryType::Regular);
    header.set_checksum();

    let mut buf = header.as_bytes().to_vec();
    buf.extend_from_slice(content);
    while buf.len() % 512 != 0 {
        buf.push(0);
    }
    buf
}

fn convert_buffer(archive: Vec<u8>, dest: &Path, options: ExtractOptions) -> Result<PathBuf, ConvertError> {
    convert_to_zip(&JobSpec {
        source: JobSource::Buffer(archive),
        dest: dest.to_owned(),
        options,
    })
}

fn zip_names(path: &Path) -> Vec<String> {
    let archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
    archive.file_names().map(str::to_owned).collect()
}

fn zip_content(path: &Path, name: &str) -> Vec<u8> {
    let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut content = Vec::new();
    archive
        .by_name(name)
        .unwrap()
        .read_to_end(&mut content)
        .unwrap();
    content
}

#[test]
fn test_malicious_entries_dropped() {
    // A package tarball carrying an absolute path and a parent
    // traversal alongside its real files. Both hostile entries vanish
    // without failing the conversion.
    let mut archive = Vec::new();
    archive.extend(raw_file("pkg/package.json", b"{\"name\":\"pkg\"}", 0o644));
    archive.extend(raw_file("pkg/index.js", b"module.exports = 1;\n", 0o644));
    archive.extend(raw_file("/etc/passwd", b"root:x:0:0::/root:/bin/sh\n", 0o644));
    archive.extend(raw_file("pkg/../../escape.txt", b"got out\n", 0o644));
    archive.extend_from_slice(&[0u8; 1024]);

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("pkg.zip");
    let options = ExtractOptions {
        strip_components: 1,
        ..ExtractOptions::default()
    };
    let result = convert_buffer(archive, &dest, options).unwrap();
    assert_eq!(result, dest);

    let mut names = zip_names(&dest);
    names.sort();
    assert_eq!(names, vec!["index.js", "package.json"]);
    assert_eq!(zip_content(&dest, "package.json"), b"{\"name\":\"pkg\"}");
}

#[test]
fn test_gzipped_archive_from_file() {
    let mut builder = tar::Builder::new(Vec::new());
    append_file(&mut builder, "pkg/readme.md", b"# hi\n", 0o644);
    append_file(&mut builder, "pkg/bin/tool", b"#!/bin/sh\nexit 0\n", 0o755);
    let tar_bytes = builder.into_inner().unwrap();

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&tar_bytes).unwrap();
    let tgz = encoder.finish().unwrap();

    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("pkg.tgz");
    std::fs::write(&source, tgz).unwrap();
    let dest = dir.path().join("pkg.zip");

    convert_to_zip(&JobSpec {
        source: JobSource::Path(source),
        dest: dest.clone(),
        options: ExtractOptions::default(),
    })
    .unwrap();

    let mut names = zip_names(&dest);
    names.sort();
    assert_eq!(
        names,
        vec!["pkg/", "pkg/bin/", "pkg/bin/tool", "pkg/readme.md"]
    );
    assert_eq!(zip_content(&dest, "pkg/readme.md"), b"# hi\n");
}

#[test]
fn test_sentinel_timestamp_and_modes() {
    let mut builder = tar::Builder::new(Vec::new());
    append_file(&mut builder, "a/script.sh", b"#!/bin/sh\n", 0o750);
    append_file(&mut builder, "a/notes.txt", b"text", 0o640);
    let tar_bytes = builder.into_inner().unwrap();

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("out.zip");
    convert_buffer(tar_bytes, &dest, ExtractOptions::default()).unwrap();

    let expected = zip::DateTime::from_date_and_time(1984, 6, 22, 21, 50, 0).unwrap();
    let mut archive = ZipArchive::new(File::open(&dest).unwrap()).unwrap();
    for i in 0..archive.len() {
        let entry = archive.by_index(i).unwrap();
        assert_eq!(entry.last_modified(), Some(expected), "{}", entry.name());
    }
    // Mask off the file-type bits unix_mode() carries alongside the
    // permissions.
    assert_eq!(
        archive
            .by_name("a/script.sh")
            .unwrap()
            .unix_mode()
            .map(|mode| mode & 0o777),
        Some(0o755)
    );
    assert_eq!(
        archive
            .by_name("a/notes.txt")
            .unwrap()
            .unix_mode()
            .map(|mode| mode & 0o777),
        Some(0o644)
    );
}

#[test]
fn test_prefix_path() {
    let mut builder = tar::Builder::new(Vec::new());
    append_file(&mut builder, "pkg/index.js", b"x", 0o644);
    let tar_bytes = builder.into_inner().unwrap();

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("out.zip");
    let options = ExtractOptions {
        strip_components: 1,
        prefix_path: PathBuf::from("node_modules/dep"),
        ..ExtractOptions::default()
    };
    convert_buffer(tar_bytes, &dest, options).unwrap();

    assert_eq!(
        zip_names(&dest),
        vec!["node_modules/", "node_modules/dep/", "node_modules/dep/index.js"]
    );
}

#[test]
fn test_buffer_and_path_sources_agree() {
    let mut builder = tar::Builder::new(Vec::new());
    append_file(&mut builder, "pkg/a.txt", &[7u8; 2000], 0o644);
    append_file(&mut builder, "pkg/b.txt", b"small", 0o644);
    let tar_bytes = builder.into_inner().unwrap();

    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("pkg.tar");
    std::fs::write(&source, &tar_bytes).unwrap();

    let from_buffer = dir.path().join("buffer.zip");
    let from_path = dir.path().join("path.zip");
    convert_buffer(tar_bytes, &from_buffer, ExtractOptions::default()).unwrap();
    convert_to_zip(&JobSpec {
        source: JobSource::Path(source),
        dest: from_path.clone(),
        options: ExtractOptions::default(),
    })
    .unwrap();

    assert_eq!(
        std::fs::read(&from_buffer).unwrap(),
        std::fs::read(&from_path).unwrap()
    );
}

#[test]
fn test_deterministic_output() {
    let mut builder = tar::Builder::new(Vec::new());
    append_file(&mut builder, "pkg/data.bin", &[42u8; 10_000], 0o644);
    let tar_bytes = builder.into_inner().unwrap();

    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.zip");
    let second = dir.path().join("second.zip");
    convert_buffer(tar_bytes.clone(), &first, ExtractOptions::default()).unwrap();
    convert_buffer(tar_bytes, &second, ExtractOptions::default()).unwrap();

    assert_eq!(
        std::fs::read(&first).unwrap(),
        std::fs::read(&second).unwrap()
    );
}

#[test]
fn test_corrupt_gzip_fails_inflate() {
    let mut tgz = vec![0x1f, 0x8b, 0x08, 0x00];
    tgz.extend_from_slice(&[0xAA; 600]);

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("out.zip");
    let err = convert_buffer(tgz, &dest, ExtractOptions::default()).unwrap_err();
    assert!(
        matches!(err, ConvertError::Inflate(_) | ConvertError::Decode(_)),
        "{err:?}"
    );
}

#[test]
fn test_truncated_tar_fails_decode() {
    let mut builder = tar::Builder::new(Vec::new());
    append_file(&mut builder, "pkg/a.txt", &[1u8; 900], 0o644);
    let mut tar_bytes = builder.into_inner().unwrap();
    tar_bytes.truncate(700);

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("out.zip");
    let err = convert_buffer(tar_bytes, &dest, ExtractOptions::default()).unwrap_err();
    assert!(matches!(err, ConvertError::Decode(_)), "{err:?}");
}

#[test]
fn test_empty_input_is_an_empty_zip() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("out.zip");
    convert_buffer(vec![0u8; 1024], &dest, ExtractOptions::default()).unwrap();
    assert!(zip_names(&dest).is_empty());
}
