use std::num::ParseIntError;
use std::str::Utf8Error;
use derive_more::*;
use roxmltree::{Document, Node};
use crate::{FillMode, Grid, Image, ObjectAlignment, Orientation, Properties, Property, Tile, TileOffset, TileRenderSize, Tileset};

impl Tileset {

    pub fn parse_bytes(bytes: &[u8]) -> Result<Self, TsxParseError> {
        let source = std::str::from_utf8(bytes)?;
        Self::parse_str(source)
    }

    pub fn parse_str(source: &str) -> Result<Self, TsxParseError> {
        let doc = Document::parse(source)?;
        Self::parse_doc(doc)
    }

    pub fn parse_doc(doc: Document) -> Result<Self, TsxParseError> {
        let root = doc.root_element();
        if root.tag_name().name() != "tileset" {
            return Err(TsxParseError::MissingRoot);
        }
        let mut tileset = Tileset::default();
        tileset.parse(root)?;
        Ok(tileset)
    }

    fn parse(&mut self, tileset_node: Node) -> Result<(), TsxParseError> {

        // Parses attributes
        for attribute in tileset_node.attributes() {
            let name = attribute.name();
            let value = attribute.value();
            match name {
                "version" => self.version = String::from(value),
                "tiledversion" => self.tiled_version = String::from(value),
                "name" => self.name = String::from(value),
                "class" => self.class = String::from(value),
                "tilewidth" => self.tile_width = value.parse()?,
                "tileheight" => self.tile_height = value.parse()?,
                "spacing" => self.spacing = value.parse()?,
                "margin" => self.margin = value.parse()?,
                "tilecount" => self.tile_count = value.parse()?,
                "columns" => self.columns = value.parse()?,
                "objectalignment" => self.object_alignment = ObjectAlignment::parse(value)?,
                "tilerendersize" => self.tile_render_size = TileRenderSize::parse(value)?,
                "fillmode" => self.fill_mode = FillMode::parse(value)?,
                _ => self.extras.push_attribute(name, value),
            }
        }

        // Parses children
        let mut known = 0;
        for child in tileset_node.children().filter(Node::is_element) {
            match child.tag_name().name() {
                "tileoffset" => self.tile_offset = Some(parse_tile_offset(child)?),
                "grid" => self.grid = Some(parse_grid(child)?),
                "properties" => self.properties = parse_properties(child),
                "image" => self.image = Some(Image::parse(child)?),
                "tile" => self.tiles.push(Tile::parse(child)?),
                _ => {
                    self.extras.push_element(known, child);
                    continue;
                }
            }
            known += 1;
        }
        Ok(())
    }
}

impl Tile {
    fn parse(tile_node: Node) -> Result<Tile, TsxParseError> {
        let id = tile_node
            .attribute("id")
            .ok_or_else(|| TsxParseError::missing_attribute("tile", "id"))?
            .parse()?;
        let mut tile = Tile { id, ..Default::default() };
        for attribute in tile_node.attributes() {
            match attribute.name() {
                "id" => {}
                "type" | "class" => tile.class = String::from(attribute.value()),
                name => tile.extras.push_attribute(name, attribute.value()),
            }
        }
        let mut known = 0;
        for child in tile_node.children().filter(Node::is_element) {
            match child.tag_name().name() {
                "properties" => tile.properties = parse_properties(child),
                "image" => tile.image = Some(Image::parse(child)?),
                _ => {
                    tile.extras.push_element(known, child);
                    continue;
                }
            }
            known += 1;
        }
        Ok(tile)
    }
}

impl Image {
    fn parse(image_node: Node) -> Result<Image, TsxParseError> {
        let mut image = Image::default();
        for attribute in image_node.attributes() {
            let name = attribute.name();
            let value = attribute.value();
            match name {
                "format" => image.format = String::from(value),
                "source" => image.source = String::from(value),
                "trans" => image.trans = Some(String::from(value)),
                "width" => image.width = Some(value.parse()?),
                "height" => image.height = Some(value.parse()?),
                _ => image.extras.push_attribute(name, value),
            }
        }
        for child in image_node.children().filter(Node::is_element) {
            image.extras.push_element(0, child);
        }
        Ok(image)
    }
}

fn parse_tile_offset(node: Node) -> Result<TileOffset, TsxParseError> {
    let mut offset = TileOffset::default();
    for attribute in node.attributes() {
        match attribute.name() {
            "x" => offset.x = attribute.value().parse()?,
            "y" => offset.y = attribute.value().parse()?,
            _ => {}
        }
    }
    Ok(offset)
}

fn parse_grid(node: Node) -> Result<Grid, TsxParseError> {
    let mut grid = Grid::default();
    for attribute in node.attributes() {
        let value = attribute.value();
        match attribute.name() {
            "orientation" => grid.orientation = Orientation::parse(value)?,
            "width" => grid.width = value.parse()?,
            "height" => grid.height = value.parse()?,
            _ => {}
        }
    }
    Ok(grid)
}

/// Multiline string values are stored as text rather than in the value attribute.
/// Class properties hold their members in a nested <properties>.
fn parse_properties(node: Node) -> Properties {
    node.children()
        .filter(|child| child.has_tag_name("property"))
        .map(|child| {
            let members = child.children().find(|member| member.has_tag_name("properties"));
            let value = match (child.attribute("value"), members) {
                (Some(value), _) => value,
                (None, None) => child.text().unwrap_or_default(),
                (None, Some(_)) => "",
            };
            Property {
                name: String::from(child.attribute("name").unwrap_or_default()),
                kind: String::from(child.attribute("type").unwrap_or_default()),
                property_type: String::from(child.attribute("propertytype").unwrap_or_default()),
                value: String::from(value),
                properties: members.map(parse_properties).unwrap_or_default(),
            }
        })
        .collect()
}

#[derive(Error, Display, From, Debug)]
pub enum TsxParseError {
    #[display(fmt="{_0}")]
    XmlError(roxmltree::Error),
    #[display(fmt="{_0}")]
    Utf8Error(Utf8Error),
    #[display(fmt="{_0}")]
    ParseIntError(ParseIntError),
    #[display(fmt="Root element is not <tileset>")]
    #[from(ignore)]
    MissingRoot,
    #[display(fmt="Element <{element}> is missing attribute '{attribute}'")]
    #[from(ignore)]
    MissingAttribute { element: String, attribute: String },
    #[display(fmt="Unexpected value '{value}' for attribute '{attribute}'")]
    #[from(ignore)]
    InvalidAttributeValue { attribute: String, value: String },
}

impl TsxParseError {
    pub(crate) fn missing_attribute(element: &str, attribute: &str) -> Self {
        Self::MissingAttribute { element: String::from(element), attribute: String::from(attribute) }
    }

    pub(crate) fn invalid_value(attribute: &str, value: &str) -> Self {
        Self::InvalidAttributeValue { attribute: String::from(attribute), value: String::from(value) }
    }
}


#[cfg(test)]
mod test {
    use crate::{FillMode, Grid, ObjectAlignment, Orientation, Property, TileOffset, Tileset, TsxParseError};

    const GRASS: &str = include_str!("../../data/levels/tilesets/grass.tsx");

    #[test]
    fn grass_header() {
        let tileset = Tileset::parse_str(GRASS).unwrap();
        assert_eq!("1.8", tileset.version);
        assert_eq!("1.8.2", tileset.tiled_version);
        assert_eq!("grass", tileset.name);
        assert_eq!((128, 128), (tileset.tile_width, tileset.tile_height));
        assert_eq!(24, tileset.tile_count);
        assert_eq!(0, tileset.columns);
        assert!(tileset.is_collection());
        assert_eq!(Some(Grid { orientation: Orientation::Orthogonal, width: 1, height: 1 }), tileset.grid);
    }

    #[test]
    fn grass_tiles() {
        let tileset = Tileset::parse_str(GRASS).unwrap();
        assert_eq!(24, tileset.tiles.len());
        let ids: Vec<u32> = tileset.tiles.iter().map(|tile| tile.id).collect();
        assert_eq!((0..24).collect::<Vec<u32>>(), ids);

        let first = tileset.tile(0).unwrap().image.as_ref().unwrap();
        assert_eq!("../../graphics/grass/grass_1.png", first.source);
        assert_eq!(Some((64, 64)), first.size());

        let narrow = tileset.tile(14).unwrap().image.as_ref().unwrap();
        assert_eq!("../../graphics/objects/11.png", narrow.source);
        assert_eq!(Some((64, 128)), narrow.size());

        let last = tileset.tile(23).unwrap().image.as_ref().unwrap();
        assert_eq!("../../graphics/objects/20.png", last.source);
        assert_eq!(Some((128, 128)), last.size());
    }

    #[test]
    fn optional_attributes() {
        let source = r#"<?xml version="1.0" encoding="UTF-8"?>
<tileset version="1.10" tiledversion="1.10.2" name="sheet" class="terrain" tilewidth="16" tileheight="16" spacing="1" margin="2" tilecount="4" columns="2" objectalignment="bottom" tilerendersize="grid" fillmode="preserve-aspect-fit">
 <tileoffset x="-4" y="8"/>
 <properties>
  <property name="solid" type="bool" value="true"/>
  <property name="note">first
second</property>
 </properties>
 <image source="sheet.png" trans="ff00ff" width="34" height="34"/>
 <tile id="3" class="water">
  <properties>
   <property name="depth" type="int" value="2"/>
  </properties>
 </tile>
</tileset>"#;
        let tileset = Tileset::parse_str(source).unwrap();
        assert_eq!("terrain", tileset.class);
        assert_eq!((1, 2), (tileset.spacing, tileset.margin));
        assert_eq!(ObjectAlignment::Bottom, tileset.object_alignment);
        assert_eq!(FillMode::PreserveAspectFit, tileset.fill_mode);
        assert_eq!(Some(TileOffset { x: -4, y: 8 }), tileset.tile_offset);
        assert!(!tileset.is_collection());
        assert_eq!(Some(String::from("ff00ff")), tileset.image.as_ref().unwrap().trans);
        assert_eq!(
            Property { name: String::from("note"), value: String::from("first\nsecond"), ..Default::default() },
            tileset.properties[1]
        );
        let tile = tileset.tile(3).unwrap();
        assert_eq!("water", tile.class);
        assert_eq!("2", tile.properties[0].value);
        assert_eq!(None, tile.image);
    }

    #[test]
    fn errors() {
        let not_xml = Tileset::parse_str("<tileset");
        assert!(matches!(not_xml, Err(TsxParseError::XmlError(_))));

        let wrong_root = Tileset::parse_str("<map/>");
        assert!(matches!(wrong_root, Err(TsxParseError::MissingRoot)));

        let bad_int = Tileset::parse_str(r#"<tileset tilewidth="wide"/>"#);
        assert!(matches!(bad_int, Err(TsxParseError::ParseIntError(_))));

        let bad_enum = Tileset::parse_str(r#"<tileset><grid orientation="round" width="1" height="1"/></tileset>"#);
        assert!(matches!(bad_enum, Err(TsxParseError::InvalidAttributeValue { .. })));

        let missing_id = Tileset::parse_str(r#"<tileset><tile><image source="a.png"/></tile></tileset>"#);
        assert_eq!(
            "Element <tile> is missing attribute 'id'",
            missing_id.unwrap_err().to_string()
        );

        let negative_id = Tileset::parse_str(r#"<tileset><tile id="-1"/></tileset>"#);
        assert!(matches!(negative_id, Err(TsxParseError::ParseIntError(_))));

        let bad_utf8 = Tileset::parse_bytes(&[0x3c, 0xff, 0xfe]);
        assert!(matches!(bad_utf8, Err(TsxParseError::Utf8Error(_))));
    }
}
