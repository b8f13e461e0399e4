use rayon::prelude::*;
use tracing::instrument;
use crate::{resolve_source, AssetPath, CheckSettings, HashSet, Image, Issue, IssueKind, Protocol, Tileset, ValidationReport};
use super::probe_dimensions;

/// Checks the integrity of tilesets against the files they reference.
pub struct Validator<'a> {
    protocol: &'a dyn Protocol,
    settings: CheckSettings,
}

impl<'a> Validator<'a> {

    pub fn new(protocol: &'a dyn Protocol) -> Self {
        Self { protocol, settings: CheckSettings::default() }
    }

    pub fn with_settings(protocol: &'a dyn Protocol, settings: CheckSettings) -> Self {
        Self { protocol, settings }
    }

    /// Runs every enabled check on a tileset stored at `tileset_path`.
    #[instrument(skip_all)]
    pub fn validate(&self, tileset: &Tileset, tileset_path: &AssetPath) -> ValidationReport {
        let mut report = ValidationReport::default();
        self.check_version(tileset, &mut report);
        self.check_ids(tileset, &mut report);
        self.check_declarations(tileset, &mut report);
        if self.settings.images {
            self.check_images(tileset, tileset_path, &mut report);
        }
        report.sort();

        for issue in &report.issues {
            log::warn!("{tileset_path}: {issue}");
        }
        log::info!(
            "Checked '{}' at {tileset_path}: {} errors, {} warnings",
            tileset.name,
            report.errors().count(),
            report.warnings().count(),
        );
        report
    }

    fn check_version(&self, tileset: &Tileset, report: &mut ValidationReport) {
        if !self.settings.supported_versions.contains(&tileset.version) {
            report.issues.push(Issue::tileset(IssueKind::UnsupportedVersion { version: tileset.version.clone() }));
        }
    }

    /// Ids must be unique everywhere.
    /// Collections must also declare every id from 0 and match tilecount.
    fn check_ids(&self, tileset: &Tileset, report: &mut ValidationReport) {
        let mut seen = HashSet::default();
        let mut reported = HashSet::default();
        for tile in &tileset.tiles {
            if !seen.insert(tile.id) && reported.insert(tile.id) {
                report.issues.push(Issue::tile(tile.id, IssueKind::DuplicateId { id: tile.id }));
            }
        }
        if !tileset.is_collection() {
            return;
        }

        let actual = tileset.tiles.len() as u32;
        if tileset.tile_count != actual {
            report.issues.push(Issue::tileset(IssueKind::TileCountMismatch { declared: tileset.tile_count, actual }));
        }
        if self.settings.contiguous_ids {
            let max_id = seen.iter().copied().max();
            let missing: Vec<u32> = match max_id {
                Some(max_id) => (0..=max_id).filter(|id| !seen.contains(id)).collect(),
                None => Vec::new(),
            };
            if !missing.is_empty() {
                report.issues.push(Issue::tileset(IssueKind::NonContiguousIds { missing }));
            }
        }
    }

    /// Checks that need nothing beyond the document itself.
    fn check_declarations(&self, tileset: &Tileset, report: &mut ValidationReport) {
        if !tileset.is_collection() {
            if let Some(image) = &tileset.image {
                let path = image.source.clone();
                match image.size() {
                    None => report.issues.push(Issue::tileset(IssueKind::MissingDimensions { path })),
                    Some((0, _) | (_, 0)) => report.issues.push(Issue::tileset(IssueKind::ZeroDimensions { path })),
                    Some(_) => {},
                }
            }
            return;
        }
        let grid = (tileset.tile_width, tileset.tile_height);
        for tile in &tileset.tiles {
            let Some(image) = &tile.image else {
                report.issues.push(Issue::tile(tile.id, IssueKind::MissingImage));
                continue;
            };
            let path = image.source.clone();
            match image.size() {
                None => report.issues.push(Issue::tile(tile.id, IssueKind::MissingDimensions { path })),
                Some((0, _) | (_, 0)) => report.issues.push(Issue::tile(tile.id, IssueKind::ZeroDimensions { path })),
                Some(size) => {
                    if self.settings.grid_bounds && (size.0 > grid.0 || size.1 > grid.1) {
                        report.issues.push(Issue::tile(tile.id, IssueKind::TileExceedsGrid { size, grid }));
                    }
                },
            }
        }
    }

    /// Resolves and decodes every referenced image in parallel.
    fn check_images(&self, tileset: &Tileset, tileset_path: &AssetPath, report: &mut ValidationReport) {
        let mut images: Vec<(Option<u32>, &Image)> = tileset.tiles
            .iter()
            .filter_map(|tile| Some((Some(tile.id), tile.image.as_ref()?)))
            .collect();
        if let Some(image) = &tileset.image {
            images.push((None, image));
        }
        let issues: Vec<Issue> = images
            .par_iter()
            .filter_map(|(tile, image)| {
                let kind = self.check_image(image, tileset_path)?;
                Some(Issue { tile: *tile, kind })
            })
            .collect();
        report.issues.extend(issues);
    }

    fn check_image(&self, image: &Image, tileset_path: &AssetPath) -> Option<IssueKind> {
        let path = resolve_source(&image.source, tileset_path);
        if !self.protocol.exists(&path) {
            return Some(IssueKind::ImageNotFound { path: path.to_string() });
        }
        let bytes = match self.protocol.read(&path) {
            Ok(bytes) => bytes,
            Err(err) => return Some(IssueKind::ImageUnreadable { path: path.to_string(), reason: format!("{err:#}") }),
        };
        let actual = match probe_dimensions(&bytes) {
            Ok(actual) => actual,
            Err(err) => return Some(IssueKind::ImageUnreadable { path: path.to_string(), reason: err.to_string() }),
        };
        log::trace!("{path} is {}x{}", actual.0, actual.1);
        // Zero sizes are already reported without the bitmap.
        let declared = image.size().filter(|&(width, height)| width > 0 && height > 0)?;
        if self.settings.dimensions && declared != actual {
            return Some(IssueKind::DimensionMismatch { path: path.to_string(), declared, actual });
        }
        None
    }
}
