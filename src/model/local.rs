use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::track::{SourceRef, Track, ZERO_DURATION};

pub const LOCAL_ARTIST: &str = "Local File";

fn is_audio_file(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            extensions
                .iter()
                .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
                .any(|e| !e.is_empty() && e == ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Turn files and directories into in-memory tracks.
///
/// Directories are walked recursively, skipping hidden entries. Files
/// with an extension outside `extensions` are ignored. Each track gets a
/// synthetic `local-<unix millis>-<index>` id and is never persisted.
pub fn import_paths(paths: &[PathBuf], extensions: &[String]) -> Vec<Track> {
    let stamp = chrono::Utc::now().timestamp_millis();
    let mut files: Vec<PathBuf> = Vec::new();

    for root in paths {
        if root.is_file() {
            if is_audio_file(root, extensions) {
                files.push(root.clone());
            }
            continue;
        }
        if !root.is_dir() {
            tracing::warn!(path = %root.display(), "Import path does not exist");
            continue;
        }

        let mut found: Vec<PathBuf> = WalkDir::new(root)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e.path()))
            .filter_map(Result::ok)
            .map(|e| e.into_path())
            .filter(|p| p.is_file() && is_audio_file(p, extensions))
            .collect();
        found.sort();
        files.extend(found);
    }

    let tracks: Vec<Track> = files
        .into_iter()
        .enumerate()
        .map(|(i, path)| {
            let title = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("UNKNOWN")
                .to_string();
            Track {
                id: format!("local-{stamp}-{i}"),
                title,
                artist: LOCAL_ARTIST.to_string(),
                thumbnail_url: String::new(),
                duration_label: ZERO_DURATION.to_string(),
                source_ref: SourceRef::Local(path),
            }
        })
        .collect();

    tracing::info!(count = tracks.len(), "Imported local files");
    tracks
}

/// Split a typed path list. Whitespace separates entries; quote a path
/// that contains spaces.
pub fn parse_path_list(input: &str) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    let mut current = String::new();
    let mut quoted = false;

    for c in input.chars() {
        match c {
            '"' => quoted = !quoted,
            c if c.is_whitespace() && !quoted => {
                if !current.is_empty() {
                    paths.push(expand_home(&current));
                    current.clear();
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        paths.push(expand_home(&current));
    }
    paths
}

fn expand_home(raw: &str) -> PathBuf {
    match raw.strip_prefix("~/") {
        Some(rest) => std::env::var_os("HOME")
            .map(|home| PathBuf::from(home).join(rest))
            .unwrap_or_else(|| PathBuf::from(raw)),
        None => PathBuf::from(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn exts() -> Vec<String> {
        vec!["mp3".into(), ".FLAC".into()]
    }

    #[test]
    fn directories_are_walked_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("album")).unwrap();
        fs::create_dir_all(dir.path().join(".hidden")).unwrap();
        fs::write(dir.path().join("b.mp3"), b"").unwrap();
        fs::write(dir.path().join("album/a.FLAC"), b"").unwrap();
        fs::write(dir.path().join("cover.jpg"), b"").unwrap();
        fs::write(dir.path().join(".hidden/secret.mp3"), b"").unwrap();

        let tracks = import_paths(&[dir.path().to_path_buf()], &exts());
        let titles: Vec<&str> = tracks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b"]);

        for (i, t) in tracks.iter().enumerate() {
            assert!(t.id.starts_with("local-"));
            assert!(t.id.ends_with(&format!("-{i}")));
            assert_eq!(t.artist, LOCAL_ARTIST);
            assert_eq!(t.duration_label, "0:00");
            assert!(matches!(t.source_ref, SourceRef::Local(_)));
        }
    }

    #[test]
    fn single_files_and_missing_paths() {
        let dir = tempfile::tempdir().unwrap();
        let song = dir.path().join("My Song.mp3");
        let text = dir.path().join("notes.txt");
        fs::write(&song, b"").unwrap();
        fs::write(&text, b"").unwrap();

        let tracks = import_paths(&[song.clone(), text, dir.path().join("gone")], &exts());
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].title, "My Song");
        assert_eq!(tracks[0].source_ref, SourceRef::Local(song));
    }

    #[test]
    fn path_list_respects_quotes() {
        let paths = parse_path_list(r#"/a/b.mp3  "/music/with space"   /c"#);
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/a/b.mp3"),
                PathBuf::from("/music/with space"),
                PathBuf::from("/c"),
            ]
        );
        assert!(parse_path_list("   ").is_empty());
    }
}
