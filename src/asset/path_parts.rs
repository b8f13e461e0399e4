use std::fmt;
use std::path::{Path, PathBuf};

/**
 * Deconstructed path to a file or directory.
 * Segments are resolved lexically, so the file system is never consulted.
 * Both `/` and `\` are accepted as separators. `/` is used when displayed.
 */
#[derive(Clone, Eq, PartialEq, Default, Debug, Hash)]
pub struct AssetPath {
    absolute: bool,
    parts: Vec<String>,
}

impl AssetPath {

    pub fn parse(path: &str) -> Self {
        let absolute = path.starts_with('/') || path.starts_with('\\');
        let mut result = Self { absolute, parts: Vec::new() };
        for part in path.split(|c: char| c == '/' || c == '\\') {
            result.push(part);
        }
        result
    }

    pub fn from_path(path: &Path) -> Self {
        Self::parse(&path.to_string_lossy())
    }

    /// Appends a single segment, collapsing "." and "..".
    fn push(&mut self, part: &str) {
        match part {
            "" | "." => {},
            ".." => match self.parts.last().map(String::as_str) {
                Some("..") => self.parts.push(String::from("..")),
                Some(_) => { self.parts.pop(); },
                None if self.absolute => {},
                None => self.parts.push(String::from("..")),
            },
            _ => self.parts.push(String::from(part)),
        }
    }

    /// Parent directory of this file.
    /// None if it's at the root.
    pub fn parent(&self) -> Option<AssetPath> {
        if self.parts.is_empty() { return None }
        Some(self.join(".."))
    }

    /// Joins a relative path onto this one.
    /// Absolute paths replace this one entirely.
    pub fn join(&self, relative: &str) -> AssetPath {
        let relative_path = AssetPath::parse(relative);
        if relative_path.absolute {
            return relative_path;
        }
        let mut result = self.clone();
        for part in relative.split(|c: char| c == '/' || c == '\\') {
            result.push(part);
        }
        result
    }

    /// Path of this file as seen from the directory `base_dir`.
    /// None when no lexical answer exists, IE: the base climbs above a directory this path does not name.
    pub fn relative_to(&self, base_dir: &AssetPath) -> Option<AssetPath> {
        if self.absolute != base_dir.absolute { return None }
        let common = self.parts
            .iter()
            .zip(base_dir.parts.iter())
            .take_while(|(a, b)| a == b)
            .count();
        let base_remainder = &base_dir.parts[common..];
        if base_remainder.iter().any(|part| part == "..") {
            return None;
        }
        let mut parts: Vec<String> = base_remainder.iter().map(|_| String::from("..")).collect();
        parts.extend(self.parts[common..].iter().cloned());
        Some(AssetPath { absolute: false, parts })
    }

    /// Last segment, if it names a file or directory.
    pub fn file_name(&self) -> Option<&str> {
        match self.parts.last().map(String::as_str) {
            Some("..") | None => None,
            Some(name) => Some(name),
        }
    }

    /// Extension of the file, without the dot.
    pub fn extension(&self) -> Option<&str> {
        let name = self.file_name()?;
        match name.rsplit_once('.') {
            Some((stem, extension)) if !stem.is_empty() => Some(extension),
            _ => None,
        }
    }

    pub fn to_path_buf(&self) -> PathBuf {
        PathBuf::from(self.to_string())
    }
}

impl From<&str> for AssetPath {
    fn from(path: &str) -> Self {
        Self::parse(path)
    }
}

impl From<&Path> for AssetPath {
    fn from(path: &Path) -> Self {
        Self::from_path(path)
    }
}

impl fmt::Display for AssetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let body = self.parts.join("/");
        match (self.absolute, body.is_empty()) {
            (true, _) => write!(f, "/{body}"),
            (false, true) => write!(f, "."),
            (false, false) => write!(f, "{body}"),
        }
    }
}
