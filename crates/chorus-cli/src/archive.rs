//! Gzipped tar bundles of in-memory files.

use std::path::Path;

use anyhow::Context;

/// One file inside an archive bundle.
pub struct ArchiveEntry {
    pub name: String,
    pub contents: Vec<u8>,
}

impl ArchiveEntry {
    pub fn new(name: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
        }
    }
}

/// Write `entries` as a `.tar.gz` at `archive_path`, creating parent
/// directories as needed. Entries keep their given order.
pub fn write_tar_gz(archive_path: &Path, entries: &[ArchiveEntry]) -> anyhow::Result<()> {
    if let Some(parent) = archive_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory '{}'", parent.display()))?;
    }

    let file = std::fs::File::create(archive_path)
        .with_context(|| format!("failed to create archive '{}'", archive_path.display()))?;
    let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
    let mut tar = tar::Builder::new(encoder);

    for entry in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(entry.contents.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        tar.append_data(&mut header, &entry.name, entry.contents.as_slice())
            .with_context(|| format!("failed to add '{}' to archive", entry.name))?;
    }

    let encoder = tar.into_inner().context("failed to finish tar stream")?;
    encoder.finish().context("failed to finish gzip stream")?;
    tracing::debug!(path = %archive_path.display(), files = entries.len(), "archive written");
    Ok(())
}

/// Read every file of a `.tar.gz` back as `(name, contents)`.
#[cfg(test)]
pub fn read_tar_gz(archive_path: &Path) -> anyhow::Result<Vec<(String, String)>> {
    use std::io::Read;

    let file = std::fs::File::open(archive_path)?;
    let mut archive = tar::Archive::new(flate2::read::GzDecoder::new(file));
    let mut out = Vec::new();
    for entry in archive.entries()? {
        let mut entry = entry?;
        let name = entry.path()?.to_string_lossy().into_owned();
        let mut contents = String::new();
        entry.read_to_string(&mut contents)?;
        out.push((name, contents));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn round_trips_entries_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("bundle.tar.gz");

        write_tar_gz(
            &path,
            &[
                ArchiveEntry::new("b.csv", "x\n"),
                ArchiveEntry::new("a.csv", "y,z\n1,2\n"),
            ],
        )
        .unwrap();

        assert_eq!(
            read_tar_gz(&path).unwrap(),
            vec![
                ("b.csv".to_string(), "x\n".to_string()),
                ("a.csv".to_string(), "y,z\n1,2\n".to_string()),
            ]
        );
    }
}
