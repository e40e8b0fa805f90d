use std::path::{Path, PathBuf};

use jwalk::WalkDir;

fn hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map_or(true, |name| name.starts_with('.'))
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
}

/// Every non-hidden file below `dir` with one of `extensions`, sorted by
/// path. A missing directory has no files.
pub fn files_with(dir: &Path, extensions: &[&str]) -> Vec<PathBuf> {
    if !dir.is_dir() {
        return vec![];
    }

    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .sort(true)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::warn!("skipping unreadable entry in {}: {e}", dir.display());
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.path())
        .filter(|path| !hidden(path) && has_extension(path, extensions))
        .collect();

    files.sort();
    files
}

/// The first template library in `dir`: an Elementor `.json` export or a
/// `.xml` WXR file.
pub fn library_file(dir: &Path) -> Option<PathBuf> {
    files_with(dir, &["json", "xml"]).into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.yaml", "a/z.yml", "a/.hidden.yaml", "c.md", "D.JSON"] {
            let path = dir.path().join(name);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, "").unwrap();
        }

        let files: Vec<_> = files_with(dir.path(), &["yaml", "yml", "json"])
            .into_iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();

        assert_eq!(files, [PathBuf::from("D.JSON"), "a/z.yml".into(), "b.yaml".into()]);
        assert!(files_with(&dir.path().join("missing"), &["yaml"]).is_empty());
        assert_eq!(library_file(dir.path()), Some(dir.path().join("D.JSON")));
    }
}
