//! Locating the artifact the engine produced.
//!
//! The engine names its output after content metadata, and post-processing
//! (audio conversion, container merge) may change the extension after the
//! name was reported. The newest file with the expected extension wins; if
//! there is none, the reported name with the expected extension is tried.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::extractor::MediaMetadata;

/// Find the produced artifact in `dir` for the expected extension `ext`.
///
/// # Errors
///
/// Returns [`mg_core::Error::ArtifactNotFound`] if neither the directory scan
/// nor the metadata-derived name yields an existing file.
pub fn locate_artifact(dir: &Path, ext: &str, metadata: &MediaMetadata) -> mg_core::Result<PathBuf> {
    if let Some(path) = newest_with_extension(dir, ext)? {
        tracing::debug!("Located artifact by scan: {}", path.display());
        return Ok(path);
    }

    if let Some(path) = from_reported_name(dir, ext, metadata) {
        tracing::debug!("Located artifact from reported name: {}", path.display());
        return Ok(path);
    }

    tracing::warn!(
        "No *.{ext} artifact in {} (reported name: {:?})",
        dir.display(),
        metadata.reported_filename()
    );
    Err(mg_core::Error::ArtifactNotFound)
}

/// Most recently modified regular file in `dir` whose extension equals `ext`
/// (ASCII case-insensitive). Ties are broken by name.
fn newest_with_extension(dir: &Path, ext: &str) -> mg_core::Result<Option<PathBuf>> {
    let mut best: Option<(SystemTime, PathBuf)> = None;

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(ext));
        if !matches {
            continue;
        }

        let meta = entry.metadata()?;
        if !meta.is_file() {
            continue;
        }
        let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);

        let newer = match &best {
            None => true,
            Some((t, p)) => modified > *t || (modified == *t && path > *p),
        };
        if newer {
            best = Some((modified, path));
        }
    }

    Ok(best.map(|(_, p)| p))
}

/// `<dir>/<stem of reported name>.<ext>`, if that file exists.
fn from_reported_name(dir: &Path, ext: &str, metadata: &MediaMetadata) -> Option<PathBuf> {
    let reported = Path::new(metadata.reported_filename()?);
    let stem = reported.file_stem()?;

    let mut name = stem.to_os_string();
    name.push(".");
    name.push(ext);

    let candidate = dir.join(name);
    candidate.is_file().then_some(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::Duration;

    fn touch(path: &Path, age_secs: u64) {
        let file = File::create(path).unwrap();
        let mtime = SystemTime::now() - Duration::from_secs(age_secs);
        file.set_modified(mtime).unwrap();
    }

    fn meta_with(name: &str) -> MediaMetadata {
        MediaMetadata {
            planned_filename: Some(name.into()),
            ..Default::default()
        }
    }

    #[test]
    fn picks_newest_matching_file() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("old.mp3"), 100);
        touch(&dir.path().join("new.mp3"), 1);
        touch(&dir.path().join("newest.webm"), 0);

        let found = locate_artifact(dir.path(), "mp3", &MediaMetadata::default()).unwrap();
        assert_eq!(found, dir.path().join("new.mp3"));
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("Clip.MP4"), 0);
        let found = locate_artifact(dir.path(), "mp4", &MediaMetadata::default()).unwrap();
        assert_eq!(found, dir.path().join("Clip.MP4"));
    }

    #[test]
    fn ignores_directories_and_other_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("weird.mp3")).unwrap();
        touch(&dir.path().join("cookies.txt"), 0);
        let err = locate_artifact(dir.path(), "mp3", &MediaMetadata::default()).unwrap_err();
        assert!(matches!(err, mg_core::Error::ArtifactNotFound));
    }

    #[test]
    fn reported_name_swaps_extension() {
        let dir = tempfile::tempdir().unwrap();
        let expected = dir.path().join("Song.mp3");
        touch(&expected, 0);
        let found = from_reported_name(dir.path(), "mp3", &meta_with("/other/dir/Song.webm"));
        assert_eq!(found, Some(expected));
    }

    #[cfg(unix)]
    #[test]
    fn falls_back_to_reported_name_when_scan_misses() {
        // The scan only accepts regular files; a symlinked artifact is only
        // reachable through the reported name.
        let store = tempfile::tempdir().unwrap();
        let real = store.path().join("payload");
        touch(&real, 0);

        let dir = tempfile::tempdir().unwrap();
        let link = dir.path().join("Song.mp3");
        std::os::unix::fs::symlink(&real, &link).unwrap();

        assert!(locate_artifact(dir.path(), "mp3", &MediaMetadata::default()).is_err());
        let found = locate_artifact(dir.path(), "mp3", &meta_with("Song.webm")).unwrap();
        assert_eq!(found, link);
    }

    #[test]
    fn reported_name_missing_on_disk_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = locate_artifact(dir.path(), "mp4", &meta_with("Ghost.webm")).unwrap_err();
        assert!(matches!(err, mg_core::Error::ArtifactNotFound));
        assert_eq!(err.http_status(), 500);
    }

    #[test]
    fn missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("gone");
        let err = locate_artifact(&gone, "mp3", &MediaMetadata::default()).unwrap_err();
        assert!(matches!(err, mg_core::Error::Io { .. }));
    }
}
