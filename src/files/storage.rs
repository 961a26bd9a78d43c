//! Collision-safe landing of uploaded files.
//!
//! Uploads are staged under a hidden temp name in the destination directory
//! and published with an exclusive rename, so a name is claimed atomically
//! and a partially-written file is never visible under a final name.

use anyhow::{Context, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Final resting place of one upload.
pub struct StoredUpload {
    pub name: String,
    pub path: PathBuf,
}

/// Split a filename into stem and extension chain at the first dot, so
/// `archive.tar.gz` keeps `.tar.gz` intact. Dotfiles count as all stem.
fn split_name(name: &str) -> (&str, &str) {
    match name.find('.') {
        Some(0) | None => (name, ""),
        Some(pos) => name.split_at(pos),
    }
}

fn candidate_name(name: &str, attempt: u32) -> String {
    if attempt == 0 {
        return name.to_string();
    }
    let (stem, ext) = split_name(name);
    format!("{stem}_{attempt}{ext}")
}

/// Copy `payload` into `dir` under `name`, or under `name_1`, `name_2`, ...
/// if taken. Two concurrent uploads declaring the same name both land intact
/// under distinct names; existing files are never overwritten.
pub async fn store_upload(dir: &Path, name: &str, payload: &Path) -> Result<StoredUpload> {
    // Multipart bodies are spooled on the system tmp filesystem; stage a copy
    // next to the destination so the final publish is a same-device rename.
    let staging = NamedTempFile::new_in(dir).context("create staging file")?;
    tokio::fs::copy(payload, staging.path())
        .await
        .context("write staged upload")?;
    publish(dir, name, staging)
}

fn publish(dir: &Path, name: &str, mut staging: NamedTempFile) -> Result<StoredUpload> {
    for attempt in 0u32.. {
        let final_name = candidate_name(name, attempt);
        let target = dir.join(&final_name);
        match staging.persist_noclobber(&target) {
            Ok(_) => {
                return Ok(StoredUpload {
                    name: final_name,
                    path: target,
                })
            }
            // Lost the race for this name; reclaim the staging file and walk on
            Err(err) if err.error.kind() == ErrorKind::AlreadyExists => {
                staging = err.file;
            }
            Err(err) => {
                return Err(err.error)
                    .with_context(|| format!("store upload as {}", target.display()))
            }
        }
    }
    unreachable!("candidate names are unbounded")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_name_suffixes_before_extension() {
        assert_eq!(candidate_name("photo.jpg", 0), "photo.jpg");
        assert_eq!(candidate_name("photo.jpg", 1), "photo_1.jpg");
        assert_eq!(candidate_name("photo.jpg", 2), "photo_2.jpg");
        assert_eq!(candidate_name("archive.tar.gz", 1), "archive_1.tar.gz");
        assert_eq!(candidate_name("no_ext", 3), "no_ext_3");
        assert_eq!(candidate_name(".env", 1), ".env_1");
    }

    #[tokio::test]
    async fn store_upload_renames_on_collision() {
        let src = tempfile::tempdir().expect("create source dir");
        let dest = tempfile::tempdir().expect("create dest dir");

        let payload = src.path().join("payload");
        tokio::fs::write(&payload, b"first").await.expect("write payload");
        let first = store_upload(dest.path(), "photo.jpg", &payload)
            .await
            .expect("first upload");
        assert_eq!(first.name, "photo.jpg");

        tokio::fs::write(&payload, b"second").await.expect("write payload");
        let second = store_upload(dest.path(), "photo.jpg", &payload)
            .await
            .expect("second upload");
        assert_eq!(second.name, "photo_1.jpg");

        assert_eq!(
            tokio::fs::read(&first.path).await.expect("read first"),
            b"first"
        );
        assert_eq!(
            tokio::fs::read(&second.path).await.expect("read second"),
            b"second"
        );
    }

    #[tokio::test]
    async fn store_upload_leaves_no_staging_files() {
        let src = tempfile::tempdir().expect("create source dir");
        let dest = tempfile::tempdir().expect("create dest dir");

        let payload = src.path().join("payload");
        tokio::fs::write(&payload, b"data").await.expect("write payload");
        for _ in 0..3 {
            store_upload(dest.path(), "note.txt", &payload)
                .await
                .expect("upload");
        }

        let mut names: Vec<String> = std::fs::read_dir(dest.path())
            .expect("read dest")
            .map(|e| e.expect("dir entry").file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, ["note.txt", "note_1.txt", "note_2.txt"]);
    }

    #[tokio::test]
    async fn concurrent_same_name_uploads_get_distinct_files() {
        let src = tempfile::tempdir().expect("create source dir");
        let dest = tempfile::tempdir().expect("create dest dir");

        let mut tasks = Vec::new();
        for i in 0..8 {
            let payload = src.path().join(format!("payload{i}"));
            std::fs::write(&payload, format!("body-{i}")).expect("write payload");
            let dest = dest.path().to_path_buf();
            tasks.push(tokio::spawn(async move {
                store_upload(&dest, "same.bin", &payload).await.expect("upload")
            }));
        }

        let mut names = std::collections::HashSet::new();
        for task in tasks {
            let stored = task.await.expect("upload task");
            assert!(names.insert(stored.name.clone()), "duplicate final name");
        }
        assert_eq!(names.len(), 8);
        assert!(names.contains("same.bin"));
    }
}
