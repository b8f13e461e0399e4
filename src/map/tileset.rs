use derive_more::*;
use crate::{AssetPath, Extras, Image, Properties, Protocol, Tile, TsxParseError};

/// In-memory form of a .tsx document.
/// Tiles are kept in document order.
#[derive(Clone, PartialEq, Default, Debug)]
pub struct Tileset {
    pub version: String,
    pub tiled_version: String,
    pub name: String,
    pub class: String,
    pub tile_width: u32,
    pub tile_height: u32,
    pub spacing: u32,
    pub margin: u32,
    pub tile_count: u32,
    pub columns: u32,
    pub object_alignment: ObjectAlignment,
    pub tile_render_size: TileRenderSize,
    pub fill_mode: FillMode,
    pub tile_offset: Option<TileOffset>,
    pub grid: Option<Grid>,
    pub properties: Properties,
    pub image: Option<Image>,
    pub tiles: Vec<Tile>,
    /// Wang sets, transformations and anything else newer formats add.
    pub extras: Extras,
}

impl Tileset {

    /// Reads and parses a .tsx file.
    pub fn load(path: &AssetPath, protocol: &dyn Protocol) -> Result<Self, LoadError> {
        let bytes = protocol
            .read(path)
            .map_err(|err| LoadError::Read { path: path.to_string(), reason: format!("{err:#}") })?;
        let tileset = Self::parse_bytes(&bytes)?;
        log::debug!(
            "Loaded tileset '{}' from {}://{path} with {} tiles",
            tileset.name,
            protocol.name(),
            tileset.tiles.len(),
        );
        Ok(tileset)
    }

    /// Writes this tileset to the file system in Tiled's layout.
    pub fn save(&self, path: &AssetPath) -> Result<(), LoadError> {
        std::fs::write(path.to_path_buf(), self.to_tsx())?;
        log::debug!("Wrote tileset '{}' to {path}", self.name);
        Ok(())
    }

    /// Tile with the id specified.
    pub fn tile(&self, id: u32) -> Option<&Tile> {
        self.tiles.iter().find(|tile| tile.id == id)
    }

    /// True if every tile is its own image rather than a region of one spritesheet.
    pub fn is_collection(&self) -> bool {
        self.columns == 0 && self.image.is_none()
    }

    /// Largest declared width and height across all tile images.
    pub fn max_tile_size(&self) -> Option<(u32, u32)> {
        self.tiles
            .iter()
            .filter_map(|tile| tile.image.as_ref()?.size())
            .reduce(|(max_w, max_h), (w, h)| (max_w.max(w), max_h.max(h)))
    }

    /// Location of a tile's image, resolved against the directory containing the tileset file.
    pub fn resolve_image(&self, tile: &Tile, tileset_path: &AssetPath) -> Option<AssetPath> {
        let image = tile.image.as_ref()?;
        Some(resolve_source(&image.source, tileset_path))
    }

    /// Major and minor components of the format version. IE: "1.8" => (1, 8).
    pub fn format_version(&self) -> Option<(u32, u32)> {
        let (major, minor) = self.version.split_once('.')?;
        Some((major.parse().ok()?, minor.parse().ok()?))
    }

    /// Format versions before 1.9 name the tile class "type".
    pub(crate) fn uses_type_attribute(&self) -> bool {
        match self.format_version() {
            Some(version) => version < (1, 9),
            None => false,
        }
    }
}

/// Resolves an image source relative to the tileset file that references it.
pub fn resolve_source(source: &str, tileset_path: &AssetPath) -> AssetPath {
    match tileset_path.parent() {
        Some(parent) => parent.join(source),
        None => AssetPath::parse(source),
    }
}

#[derive(Error, Display, From, Debug)]
pub enum LoadError {
    #[display(fmt="Failed to read '{path}': {reason}")]
    #[from(ignore)]
    Read { path: String, reason: String },
    #[display(fmt="{_0}")]
    Parse(TsxParseError),
    #[display(fmt="{_0}")]
    Io(std::io::Error),
}

#[derive(Copy, Clone, Eq, PartialEq, Default, Debug)]
pub enum Orientation {
    #[default]
    Orthogonal,
    Isometric,
    Staggered,
    Hexagonal,
}

impl Orientation {
    pub fn parse(str: &str) -> Result<Self, TsxParseError> {
        match str {
            "orthogonal" => Ok(Self::Orthogonal),
            "isometric" => Ok(Self::Isometric),
            "staggered" => Ok(Self::Staggered),
            "hexagonal" => Ok(Self::Hexagonal),
            _ => Err(TsxParseError::invalid_value("orientation", str)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Orthogonal => "orthogonal",
            Self::Isometric => "isometric",
            Self::Staggered => "staggered",
            Self::Hexagonal => "hexagonal",
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Default, Debug)]
pub enum ObjectAlignment {
    #[default]
    Unspecified,
    TopLeft,
    Top,
    TopRight,
    Left,
    Center,
    Right,
    BottomLeft,
    Bottom,
    BottomRight,
}

impl ObjectAlignment {
    pub fn parse(str: &str) -> Result<Self, TsxParseError> {
        match str {
            "unspecified" => Ok(Self::Unspecified),
            "topleft" => Ok(Self::TopLeft),
            "top" => Ok(Self::Top),
            "topright" => Ok(Self::TopRight),
            "left" => Ok(Self::Left),
            "center" => Ok(Self::Center),
            "right" => Ok(Self::Right),
            "bottomleft" => Ok(Self::BottomLeft),
            "bottom" => Ok(Self::Bottom),
            "bottomright" => Ok(Self::BottomRight),
            _ => Err(TsxParseError::invalid_value("objectalignment", str)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unspecified => "unspecified",
            Self::TopLeft => "topleft",
            Self::Top => "top",
            Self::TopRight => "topright",
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
            Self::BottomLeft => "bottomleft",
            Self::Bottom => "bottom",
            Self::BottomRight => "bottomright",
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Default, Debug)]
pub enum TileRenderSize {
    #[default]
    Tile,
    Grid,
}

impl TileRenderSize {
    pub fn parse(str: &str) -> Result<Self, TsxParseError> {
        match str {
            "tile" => Ok(Self::Tile),
            "grid" => Ok(Self::Grid),
            _ => Err(TsxParseError::invalid_value("tilerendersize", str)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tile => "tile",
            Self::Grid => "grid",
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Default, Debug)]
pub enum FillMode {
    #[default]
    Stretch,
    PreserveAspectFit,
}

impl FillMode {
    pub fn parse(str: &str) -> Result<Self, TsxParseError> {
        match str {
            "stretch" => Ok(Self::Stretch),
            "preserve-aspect-fit" => Ok(Self::PreserveAspectFit),
            _ => Err(TsxParseError::invalid_value("fillmode", str)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stretch => "stretch",
            Self::PreserveAspectFit => "preserve-aspect-fit",
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Default, Debug)]
pub struct TileOffset { pub x: i32, pub y: i32 }

/// Cell layout used when placing tiles of a collection.
/// A 1x1 grid means every tile keeps its own image size.
#[derive(Copy, Clone, Eq, PartialEq, Default, Debug)]
pub struct Grid {
    pub orientation: Orientation,
    pub width: u32,
    pub height: u32,
}
