use std::fmt;
use derive_more::*;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Display)]
pub enum Severity {
    #[display(fmt="warning")]
    Warning,
    #[display(fmt="error")]
    Error,
}

/// A single integrity problem found in a tileset.
/// `tile` is None for problems concerning the tileset as a whole.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Issue {
    pub tile: Option<u32>,
    pub kind: IssueKind,
}

impl Issue {
    pub fn tileset(kind: IssueKind) -> Self {
        Self { tile: None, kind }
    }

    pub fn tile(id: u32, kind: IssueKind) -> Self {
        Self { tile: Some(id), kind }
    }

    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tile {
            Some(id) => write!(f, "{}: tile {id}: {}", self.severity(), self.kind),
            None => write!(f, "{}: {}", self.severity(), self.kind),
        }
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Display)]
pub enum IssueKind {
    #[display(fmt="id {id} is used by more than one tile")]
    DuplicateId { id: u32 },
    #[display(fmt="ids are not contiguous from 0, missing {missing:?}")]
    NonContiguousIds { missing: Vec<u32> },
    #[display(fmt="tilecount is {declared} but {actual} tiles are defined")]
    TileCountMismatch { declared: u32, actual: u32 },
    #[display(fmt="tile has no image")]
    MissingImage,
    #[display(fmt="image '{path}' does not exist")]
    ImageNotFound { path: String },
    #[display(fmt="image '{path}' could not be read: {reason}")]
    ImageUnreadable { path: String, reason: String },
    #[display(fmt="image '{path}' is declared {}x{} but is {}x{}", "declared.0", "declared.1", "actual.0", "actual.1")]
    DimensionMismatch { path: String, declared: (u32, u32), actual: (u32, u32) },
    #[display(fmt="image '{path}' does not declare its width and height")]
    MissingDimensions { path: String },
    #[display(fmt="image '{path}' declares a zero width or height")]
    ZeroDimensions { path: String },
    #[display(fmt="format version '{version}' is not a known Tiled version")]
    UnsupportedVersion { version: String },
    #[display(fmt="image is {}x{} which exceeds the tile size {}x{}", "size.0", "size.1", "grid.0", "grid.1")]
    TileExceedsGrid { size: (u32, u32), grid: (u32, u32) },
}

impl IssueKind {
    pub fn severity(&self) -> Severity {
        match self {
            Self::MissingDimensions { .. } | Self::UnsupportedVersion { .. } | Self::TileExceedsGrid { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Position used to order issues on the same tile.
    pub(crate) fn rank(&self) -> u8 {
        match self {
            Self::UnsupportedVersion { .. } => 0,
            Self::TileCountMismatch { .. } => 1,
            Self::NonContiguousIds { .. } => 2,
            Self::DuplicateId { .. } => 3,
            Self::MissingImage => 4,
            Self::MissingDimensions { .. } | Self::ZeroDimensions { .. } => 5,
            Self::TileExceedsGrid { .. } => 6,
            Self::ImageNotFound { .. } => 7,
            Self::ImageUnreadable { .. } => 8,
            Self::DimensionMismatch { .. } => 9,
        }
    }
}

/// Outcome of checking a tileset.
#[derive(Clone, Eq, PartialEq, Default, Debug)]
pub struct ValidationReport {
    pub issues: Vec<Issue>,
}

impl ValidationReport {
    /// True when no errors were found. Warnings are allowed.
    pub fn is_ok(&self) -> bool {
        self.errors().next().is_none()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|issue| issue.severity() == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|issue| issue.severity() == Severity::Warning)
    }

    pub(crate) fn sort(&mut self) {
        self.issues.sort_by(|a, b| {
            a.tile
                .cmp(&b.tile)
                .then(a.kind.rank().cmp(&b.kind.rank()))
        });
    }
}
