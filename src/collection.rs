use std::io;
use std::path::{Path, PathBuf};
use derive_more::*;
use tracing::instrument;
use walkdir::WalkDir;
use crate::{probe_dimensions, AssetPath, Grid, Image, Orientation, Protocol, Tile, Tileset};

/// Builds a collection-of-images tileset, assigning ids in insertion order.
#[derive(Clone, Debug)]
pub struct CollectionBuilder {
    name: String,
    version: String,
    tiled_version: String,
    images: Vec<CollectedImage>,
}

#[derive(Clone, Debug)]
struct CollectedImage {
    path: AssetPath,
    width: u32,
    height: u32,
}

impl CollectionBuilder {

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: String::from("1.8"),
            tiled_version: String::from("1.8.2"),
            images: Vec::new(),
        }
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn tiled_version(mut self, tiled_version: impl Into<String>) -> Self {
        self.tiled_version = tiled_version.into();
        self
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Adds an image whose size is already known.
    pub fn add_image(&mut self, path: AssetPath, width: u32, height: u32) -> &mut Self {
        self.images.push(CollectedImage { path, width, height });
        self
    }

    /// Adds an image, reading its size from the file.
    pub fn add_probed(&mut self, path: AssetPath, protocol: &dyn Protocol) -> Result<&mut Self, CollectError> {
        let bytes = protocol
            .read(&path)
            .map_err(|err| CollectError::Read { path: path.to_string(), reason: format!("{err:#}") })?;
        let (width, height) = probe_dimensions(&bytes)
            .map_err(|source| CollectError::Image { path: path.to_string(), source })?;
        log::debug!("Collected {path} ({width}x{height})");
        Ok(self.add_image(path, width, height))
    }

    /// Produces the tileset to be stored at `tileset_path`.
    /// Sources are written relative to the directory of that file.
    #[instrument(skip_all)]
    pub fn build(&self, tileset_path: &AssetPath) -> Result<Tileset, CollectError> {
        let base_dir = tileset_path.parent().unwrap_or_default();
        let mut tiles = Vec::with_capacity(self.images.len());
        for (id, collected) in self.images.iter().enumerate() {
            let source = collected.path
                .relative_to(&base_dir)
                .ok_or_else(|| CollectError::UnrelatablePath { path: collected.path.to_string(), base: base_dir.to_string() })?;
            tiles.push(Tile {
                id: id as u32,
                image: Some(Image {
                    source: source.to_string(),
                    width: Some(collected.width),
                    height: Some(collected.height),
                    ..Default::default()
                }),
                ..Default::default()
            });
        }
        let tile_width = self.images.iter().map(|image| image.width).max().unwrap_or_default();
        let tile_height = self.images.iter().map(|image| image.height).max().unwrap_or_default();
        log::info!("Built collection '{}' with {} tiles", self.name, tiles.len());
        Ok(Tileset {
            version: self.version.clone(),
            tiled_version: self.tiled_version.clone(),
            name: self.name.clone(),
            tile_width,
            tile_height,
            tile_count: tiles.len() as u32,
            columns: 0,
            grid: Some(Grid { orientation: Orientation::Orthogonal, width: 1, height: 1 }),
            tiles,
            ..Default::default()
        })
    }
}

/// Finds image files beneath each root, sorted by path within each root.
/// Extensions are matched case-insensitively.
pub fn collect_images(roots: &[PathBuf], extensions: &[String]) -> io::Result<Vec<PathBuf>> {
    let mut all_paths = Vec::new();
    for root in roots {
        let mut paths = find_images(root, extensions)?;
        paths.sort();
        all_paths.extend(paths);
    }
    Ok(all_paths)
}

/// Follows symbolic links, skipping any that lead back into a directory already being walked.
fn find_images(root: &Path, extensions: &[String]) -> io::Result<Vec<PathBuf>> {
    let mut image_paths = vec![];
    for entry in WalkDir::new(root).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.loop_ancestor().is_some() => {
                log::warn!("Skipping symbolic link loop: {err}");
                continue;
            },
            Err(err) => return Err(err.into()),
        };
        if entry.file_type().is_file() && has_extension(entry.path(), extensions) {
            image_paths.push(entry.into_path());
        }
    }
    Ok(image_paths)
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    let Some(extension) = path.extension().and_then(|ext| ext.to_str()) else { return false };
    extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(extension))
}

#[derive(Error, Display, Debug)]
pub enum CollectError {
    #[display(fmt="Failed to read '{path}': {reason}")]
    Read { path: String, reason: String },
    #[display(fmt="'{path}' is not a readable image: {source}")]
    Image { path: String, source: image::ImageError },
    #[display(fmt="'{path}' cannot be expressed relative to '{base}'")]
    UnrelatablePath { path: String, base: String },
}
