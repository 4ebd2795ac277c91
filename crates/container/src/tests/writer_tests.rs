use crate::*;
use anyhow::Result;
use std::fs;
use std::io::Write;
use tempfile::tempdir;

fn staging_dirs(dir: &std::path::Path) -> Vec<String> {
    fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|n| n.starts_with(".mapgen-sections-"))
        .collect()
}

#[test]
fn sections_are_laid_out_in_registration_order() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("out.mwm");

    let mut w = ContainerWriter::create(&path)?;
    let a = w.add_section("alpha")?;
    let b = w.add_section("beta")?;
    // Interleaved writes never interleave bytes in the output.
    w.sink(b).write_all(b"BB")?;
    w.sink(a).write_all(b"A1")?;
    w.sink(b).write_all(b"B2")?;
    w.sink(a).write_all(b"A2")?;
    assert_eq!(w.sink(a).pos(), 4);
    w.write_section("gamma", b"ggg")?;

    let entries = w.finish()?;
    let tags: Vec<_> = entries.iter().map(|e| e.tag.as_str()).collect();
    assert_eq!(tags, vec!["alpha", "beta", "gamma"]);
    assert_eq!((entries[0].offset, entries[0].len), (0, 4));
    assert_eq!((entries[1].offset, entries[1].len), (4, 4));
    assert_eq!((entries[2].offset, entries[2].len), (8, 3));

    let data = fs::read(&path)?;
    assert_eq!(&data[..11], b"A1A2BBB2ggg");
    let magic = u32::from_le_bytes(data[data.len() - 4..].try_into()?);
    assert_eq!(magic, CONTAINER_MAGIC);
    Ok(())
}

#[test]
fn finish_removes_staging_and_tmp_files() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("out.mwm");

    let mut w = ContainerWriter::create(&path)?;
    assert_eq!(staging_dirs(dir.path()).len(), 1);
    w.write_section("dat", b"payload")?;
    w.finish()?;

    assert!(path.exists());
    assert!(staging_dirs(dir.path()).is_empty());
    assert!(!dir.path().join("out.mwm.tmp").exists());
    Ok(())
}

#[test]
fn dropped_writer_leaves_nothing_behind() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("out.mwm");
    {
        let mut w = ContainerWriter::create(&path)?;
        w.write_section("dat", b"half a build")?;
    }
    assert!(!path.exists());
    assert!(staging_dirs(dir.path()).is_empty());
    Ok(())
}

#[test]
fn duplicate_and_invalid_tags_are_rejected() -> Result<()> {
    let dir = tempdir()?;
    let mut w = ContainerWriter::create(dir.path().join("out.mwm"))?;
    w.add_section("dat")?;
    assert!(matches!(w.add_section("dat"), Err(ContainerError::DuplicateTag(_))));
    assert!(matches!(w.add_section(""), Err(ContainerError::InvalidTag(_))));
    let long = "x".repeat(MAX_TAG_LEN + 1);
    assert!(matches!(w.add_section(&long), Err(ContainerError::InvalidTag(_))));
    assert_eq!(w.section_id("dat"), w.section_id("dat"));
    assert!(w.section_id("nope").is_none());
    Ok(())
}

#[test]
fn empty_container_is_valid() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("empty.mwm");
    let entries = ContainerWriter::create(&path)?.finish()?;
    assert!(entries.is_empty());
    // count(u32) + footer
    assert_eq!(fs::metadata(&path)?.len(), 4 + FOOTER_BYTES);
    Ok(())
}

#[test]
fn missing_parent_dir_is_reported_with_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("no/such/dir/out.mwm");
    match ContainerWriter::create(&path) {
        Err(ContainerError::Io { op, path: p, .. }) => {
            assert_eq!(op, "create staging dir");
            assert!(p.ends_with("no/such/dir"));
        }
        Err(other) => panic!("unexpected error {:?}", other),
        Ok(_) => panic!("expected an error"),
    }
}
