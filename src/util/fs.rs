//! Atomic file replacement through a uniquely named sibling temp file.

use std::io::{self, Write};
use std::path::Path;

/// Replace `path` with `content`. Readers see the old file or the new one,
/// never a partial write; concurrent writers each stage in their own file.
pub fn write_atomic(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut staged = tempfile::Builder::new()
        .prefix(".staged-")
        .suffix(".tmp")
        .tempfile_in(dir)?;
    staged.write_all(content)?;
    staged.as_file().sync_all()?;
    staged.persist(path).map_err(|err| err.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use tempfile::TempDir;

    use super::*;

    fn leftovers(dir: &Path) -> Vec<String> {
        std::fs::read_dir(dir)
            .expect("read dir")
            .filter_map(Result::ok)
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| name.ends_with(".tmp"))
            .collect()
    }

    #[test]
    fn replaces_existing_file_and_creates_parents() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("nested/data.json");

        write_atomic(&path, b"[1]").expect("first write");
        write_atomic(&path, b"[1,2]").expect("second write");

        assert_eq!(std::fs::read(&path).expect("read"), b"[1,2]");
        assert!(leftovers(&dir.path().join("nested")).is_empty());
    }

    #[test]
    fn concurrent_writers_never_share_a_staging_file() {
        let dir = Arc::new(TempDir::new().expect("tempdir"));
        let writers: Vec<_> = ["[\"a\"]", "[\"b\"]"]
            .into_iter()
            .map(|value| {
                let dir = Arc::clone(&dir);
                thread::spawn(move || {
                    for _ in 0..50 {
                        write_atomic(&dir.path().join("projects.json"), value.as_bytes())
                            .expect("write");
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().expect("writer thread");
        }

        let stored = std::fs::read_to_string(dir.path().join("projects.json")).expect("read");
        assert!(stored == "[\"a\"]" || stored == "[\"b\"]", "torn write: {stored}");
        assert!(leftovers(dir.path()).is_empty());
    }
}
