use std::{
    fs, io,
    path::{Path, PathBuf},
};
use tracing::info;

const PRESENTATION_EXTENSION: &str = "md";

/// A directory presentations are saved into and loaded from.
pub struct PresentationStore {
    root: PathBuf,
}

impl PresentationStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// Save a presentation under the given file name.
    ///
    /// The name is sanitized so it can't escape the store's directory and gets a `.md` suffix if
    /// it doesn't have one. The path the presentation was written to is returned.
    pub fn save(&self, file_name: &str, contents: &str) -> Result<PathBuf, StorageError> {
        let mut file_name = secure_file_name(file_name);
        if file_name.is_empty() {
            return Err(StorageError::InvalidFileName);
        }
        if !file_name.ends_with(".md") {
            file_name.push_str(".md");
        }
        fs::create_dir_all(&self.root).map_err(|e| StorageError::io(&self.root, e))?;
        let path = self.root.join(file_name);
        fs::write(&path, contents).map_err(|e| StorageError::io(&path, e))?;
        info!(path = %path.display(), bytes = contents.len(), "saved presentation");
        Ok(path)
    }

    /// Load a presentation's markdown.
    ///
    /// Only `.md` files are accepted.
    pub fn load(path: &Path) -> Result<String, StorageError> {
        if path.extension().is_none_or(|extension| extension != PRESENTATION_EXTENSION) {
            return Err(StorageError::InvalidFileType(path.to_path_buf()));
        }
        let contents = fs::read_to_string(path).map_err(|e| StorageError::io(path, e))?;
        Ok(contents)
    }
}

/// Turn an arbitrary string into a file name that is safe to use within a directory.
///
/// Path separators and whitespace become underscores, anything that isn't an ASCII letter, digit,
/// `.`, `-` or `_` is dropped, and leading/trailing dots and underscores are trimmed.
pub(crate) fn secure_file_name(name: &str) -> String {
    let name = name.replace(['/', '\\'], " ");
    let joined = name.split_whitespace().collect::<Vec<_>>().join("_");
    let filtered: String =
        joined.chars().filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_')).collect();
    filtered.trim_matches(|c| c == '.' || c == '_').to_string()
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("invalid file name")]
    InvalidFileName,

    #[error("invalid file type for {}: only .md files are supported", .0.display())]
    InvalidFileType(PathBuf),

    #[error("{}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
}

impl StorageError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io { path: path.to_path_buf(), source }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::plain("talk.md", "talk.md")]
    #[case::spaces("my  great talk.md", "my_great_talk.md")]
    #[case::traversal("../../etc/passwd", "etc_passwd")]
    #[case::windows("..\\secrets\\talk.md", "secrets_talk.md")]
    #[case::hidden(".hidden", "hidden")]
    #[case::symbols("t@lk!#.md", "tlk.md")]
    #[case::non_ascii("発表.md", "md")]
    fn sanitizing(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(secure_file_name(input), expected);
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().expect("failed to create dir");
        let store = PresentationStore::new(dir.path().join("uploads"));
        let path = store.save("talk", "# hi").expect("save failed");
        assert_eq!(path, dir.path().join("uploads").join("talk.md"));

        let contents = PresentationStore::load(&path).expect("load failed");
        assert_eq!(contents, "# hi");
    }

    #[test]
    fn save_keeps_extension() {
        let dir = tempfile::tempdir().expect("failed to create dir");
        let store = PresentationStore::new(dir.path());
        let path = store.save("talk.md", "").expect("save failed");
        assert_eq!(path.file_name().and_then(|name| name.to_str()), Some("talk.md"));
    }

    #[rstest]
    #[case::empty("")]
    #[case::only_dots("...")]
    #[case::only_symbols("@#!")]
    fn save_invalid_name(#[case] name: &str) {
        let dir = tempfile::tempdir().expect("failed to create dir");
        let store = PresentationStore::new(dir.path());
        let result = store.save(name, "# hi");
        assert!(matches!(result, Err(StorageError::InvalidFileName)), "unexpected result: {result:?}");
    }

    #[rstest]
    #[case::text("notes.txt")]
    #[case::none("notes")]
    #[case::uppercase("notes.MD")]
    fn load_invalid_type(#[case] name: &str) {
        let dir = tempfile::tempdir().expect("failed to create dir");
        let path = dir.path().join(name);
        fs::write(&path, "# hi").expect("write failed");
        let result = PresentationStore::load(&path);
        assert!(matches!(result, Err(StorageError::InvalidFileType(_))), "unexpected result: {result:?}");
    }

    #[test]
    fn load_missing() {
        let dir = tempfile::tempdir().expect("failed to create dir");
        let result = PresentationStore::load(&dir.path().join("missing.md"));
        assert!(matches!(result, Err(StorageError::Io { .. })), "unexpected result: {result:?}");
    }
}
