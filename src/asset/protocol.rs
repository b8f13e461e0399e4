use anyhow::anyhow;
use crate::{AssetPath, HashMap};

/**
 * A method of receiving bytes from files.
 * IE: file system, memory.
 */
pub trait Protocol: Send + Sync + 'static {
    /**
     * Name of the protocol. IE: file, memory.
     * Should not change across invocations.
     */
    fn name(&self) -> &str;
    /**
     * Retrieves raw bytes from the path specified.
     */
    fn read(&self, path: &AssetPath) -> anyhow::Result<Vec<u8>>;
    /**
     * True if a file exists at the path specified.
     */
    fn exists(&self, path: &AssetPath) -> bool;
}

/**
 * An implementation of [`Protocol`] that fetches bytes from the file system.
 */
#[derive(Copy, Clone, Debug)]
pub struct FileProtocol;
impl Protocol for FileProtocol {
    fn name(&self) -> &str { return "file" }
    fn read(&self, path: &AssetPath) -> anyhow::Result<Vec<u8>> {
        let bytes = std::fs::read(path.to_path_buf())?;
        Ok(bytes)
    }
    fn exists(&self, path: &AssetPath) -> bool {
        path.to_path_buf().is_file()
    }
}

/**
 * An implementation of [`Protocol`] that serves files stored in memory.
 * Useful for testing purposes.
 */
#[derive(Clone, Default, Debug)]
pub struct MemoryProtocol {
    files: HashMap<AssetPath, Vec<u8>>,
}

impl MemoryProtocol {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<AssetPath>, bytes: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), bytes.into());
    }

    pub fn with(mut self, path: impl Into<AssetPath>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(path, bytes);
        self
    }
}

impl Protocol for MemoryProtocol {
    fn name(&self) -> &str { return "memory" }
    fn read(&self, path: &AssetPath) -> anyhow::Result<Vec<u8>> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow!("No file stored at '{path}'"))
    }
    fn exists(&self, path: &AssetPath) -> bool {
        self.files.contains_key(path)
    }
}
