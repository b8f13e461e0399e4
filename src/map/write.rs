use crate::{Extras, FillMode, Image, ObjectAlignment, Properties, RawElement, Tile, TileRenderSize, Tileset};

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

impl Tileset {

    /// Writes the tileset as a .tsx document, laid out the way Tiled saves it.
    /// Attributes at their default value are omitted.
    pub fn to_tsx(&self) -> String {
        let root = Element::new("tileset")
            .attr_if(!self.version.is_empty(), "version", &self.version)
            .attr_if(!self.tiled_version.is_empty(), "tiledversion", &self.tiled_version)
            .attr("name", &self.name)
            .attr_if(!self.class.is_empty(), "class", &self.class)
            .attr("tilewidth", self.tile_width)
            .attr("tileheight", self.tile_height)
            .attr_if(self.spacing != 0, "spacing", self.spacing)
            .attr_if(self.margin != 0, "margin", self.margin)
            .attr("tilecount", self.tile_count)
            .attr("columns", self.columns)
            .attr_if(self.object_alignment != ObjectAlignment::Unspecified, "objectalignment", self.object_alignment.as_str())
            .attr_if(self.tile_render_size != TileRenderSize::Tile, "tilerendersize", self.tile_render_size.as_str())
            .attr_if(self.fill_mode != FillMode::Stretch, "fillmode", self.fill_mode.as_str());

        let mut children = Vec::new();
        if let Some(offset) = self.tile_offset {
            children.push(Element::new("tileoffset").attr("x", offset.x).attr("y", offset.y));
        }
        if let Some(grid) = self.grid {
            children.push(Element::new("grid")
                .attr("orientation", grid.orientation.as_str())
                .attr("width", grid.width)
                .attr("height", grid.height)
            );
        }
        if !self.properties.is_empty() {
            children.push(properties_element(&self.properties));
        }
        if let Some(image) = &self.image {
            let element = Element::new("image")
                .attr_if(!image.format.is_empty(), "format", &image.format)
                .attr("source", &image.source)
                .attr_opt("trans", image.trans.as_ref())
                .attr_opt("width", image.width)
                .attr_opt("height", image.height)
                .with_extras(Vec::new(), &image.extras);
            children.push(element);
        }
        let class_attribute = if self.uses_type_attribute() { "type" } else { "class" };
        for tile in &self.tiles {
            children.push(tile_element(tile, class_attribute));
        }
        let root = root.with_extras(children, &self.extras);

        let mut out = String::from(XML_DECLARATION);
        root.write(&mut out, 0);
        log::trace!("Wrote {} bytes for tileset '{}'", out.len(), self.name);
        out
    }
}

fn tile_element(tile: &Tile, class_attribute: &str) -> Element {
    let mut children = Vec::new();
    if !tile.properties.is_empty() {
        children.push(properties_element(&tile.properties));
    }
    if let Some(image) = &tile.image {
        children.push(tile_image_element(image));
    }
    Element::new("tile")
        .attr("id", tile.id)
        .attr_if(!tile.class.is_empty(), class_attribute, &tile.class)
        .with_extras(children, &tile.extras)
}

/// Tile images put their size before the source, unlike the tileset image.
fn tile_image_element(image: &Image) -> Element {
    Element::new("image")
        .attr_if(!image.format.is_empty(), "format", &image.format)
        .attr_opt("width", image.width)
        .attr_opt("height", image.height)
        .attr("source", &image.source)
        .attr_opt("trans", image.trans.as_ref())
        .with_extras(Vec::new(), &image.extras)
}

/// Class properties carry no value of their own, only members.
fn properties_element(properties: &Properties) -> Element {
    let mut element = Element::new("properties");
    for property in properties {
        let multiline = property.value.contains('\n');
        let bare_class = property.kind == "class" && property.value.is_empty();
        let mut child = Element::new("property")
            .attr("name", &property.name)
            .attr_if(!property.kind.is_empty(), "type", &property.kind)
            .attr_if(!property.property_type.is_empty(), "propertytype", &property.property_type)
            .attr_if(!multiline && !bare_class, "value", &property.value);
        if multiline {
            child.text = Some(property.value.clone());
        } else if !property.properties.is_empty() {
            child.push(properties_element(&property.properties));
        }
        element.push(child);
    }
    element
}

/// Minimal XML element tree, rendered with one space of indentation per level.
struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
    text: Option<String>,
}

impl Element {
    fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), attributes: Vec::new(), children: Vec::new(), text: None }
    }

    fn attr(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.attributes.push((name.into(), value.to_string()));
        self
    }

    fn attr_if(self, condition: bool, name: impl Into<String>, value: impl ToString) -> Self {
        if condition { self.attr(name, value) } else { self }
    }

    fn attr_opt(self, name: impl Into<String>, value: Option<impl ToString>) -> Self {
        match value {
            Some(value) => self.attr(name, value),
            None => self,
        }
    }

    fn push(&mut self, child: Element) {
        self.children.push(child);
    }

    /// Appends unmodelled attributes, then places the modelled children with the
    /// unmodelled ones back where they were read.
    fn with_extras(mut self, known: Vec<Element>, extras: &Extras) -> Self {
        self.attributes.extend(extras.attributes.iter().cloned());
        let mut raw = extras.elements.iter().peekable();
        for (index, child) in known.into_iter().enumerate() {
            while let Some((_, element)) = raw.next_if(|(before, _)| *before <= index) {
                self.push(Element::from(element));
            }
            self.push(child);
        }
        for (_, element) in raw {
            self.push(Element::from(element));
        }
        self
    }

    fn write(&self, out: &mut String, depth: usize) {
        let indent = " ".repeat(depth);
        out.push_str(&indent);
        out.push('<');
        out.push_str(&self.name);
        for (name, value) in &self.attributes {
            out.push_str(&format!(" {name}=\"{}\"", escape(value, true)));
        }
        match (&self.text, self.children.is_empty()) {
            (None, true) => out.push_str("/>\n"),
            (Some(text), _) => {
                out.push_str(&format!(">{}</{}>\n", escape(text, false), self.name));
            },
            (None, false) => {
                out.push_str(">\n");
                for child in &self.children {
                    child.write(out, depth + 1);
                }
                out.push_str(&format!("{indent}</{}>\n", self.name));
            },
        }
    }
}

impl From<&RawElement> for Element {
    fn from(raw: &RawElement) -> Self {
        Self {
            name: raw.name.clone(),
            attributes: raw.attributes.clone(),
            children: raw.children.iter().map(Element::from).collect(),
            text: raw.text.clone(),
        }
    }
}

/// Whitespace in attribute values is written as character references, since
/// parsers normalize literal newlines and tabs there to spaces.
fn escape(value: &str, quotes: bool) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' if quotes => escaped.push_str("&quot;"),
            '\n' if quotes => escaped.push_str("&#10;"),
            '\r' if quotes => escaped.push_str("&#13;"),
            '\t' if quotes => escaped.push_str("&#9;"),
            _ => escaped.push(c),
        }
    }
    escaped
}


#[cfg(test)]
mod test {
    use crate::{Image, Property, Tile, TileOffset, Tileset};

    const GRASS: &str = include_str!("../../data/levels/tilesets/grass.tsx");

    #[test]
    fn grass_reproduces_byte_for_byte() {
        let tileset = Tileset::parse_str(GRASS).unwrap();
        assert_eq!(GRASS, tileset.to_tsx());
    }

    #[test]
    fn minimal_tileset() {
        let tileset = Tileset {
            name: String::from("empty"),
            tile_width: 32,
            tile_height: 16,
            ..Default::default()
        };
        let expected =
"<?xml version=\"1.0\" encoding=\"UTF-8\"?>
<tileset name=\"empty\" tilewidth=\"32\" tileheight=\"16\" tilecount=\"0\" columns=\"0\"/>
";
        assert_eq!(expected, tileset.to_tsx());
    }

    #[test]
    fn tile_class_and_properties() {
        let tileset = Tileset {
            version: String::from("1.8"),
            name: String::from("props"),
            tiles: vec![Tile {
                id: 0,
                class: String::from("bush"),
                properties: vec![
                    Property { name: String::from("hp"), kind: String::from("int"), value: String::from("3"), ..Default::default() },
                    Property { name: String::from("note"), value: String::from("a <b>\n\"c\""), ..Default::default() },
                ],
                image: Some(Image {
                    source: String::from("bush & co.png"),
                    width: Some(8),
                    height: Some(8),
                    ..Default::default()
                }),
                ..Default::default()
            }],
            ..Default::default()
        };
        let expected =
"<?xml version=\"1.0\" encoding=\"UTF-8\"?>
<tileset version=\"1.8\" name=\"props\" tilewidth=\"0\" tileheight=\"0\" tilecount=\"0\" columns=\"0\">
 <tile id=\"0\" type=\"bush\">
  <properties>
   <property name=\"hp\" type=\"int\" value=\"3\"/>
   <property name=\"note\">a &lt;b&gt;
\"c\"</property>
  </properties>
  <image width=\"8\" height=\"8\" source=\"bush &amp; co.png\"/>
 </tile>
</tileset>
";
        let written = tileset.to_tsx();
        assert_eq!(expected, written);
        assert_eq!(tileset, Tileset::parse_str(&written).unwrap());
    }

    #[test]
    fn spritesheet_survives_rewrite() {
        let source = r#"<?xml version="1.0" encoding="UTF-8"?>
<tileset version="1.10" tiledversion="1.10.2" name="sheet" tilewidth="16" tileheight="16" spacing="1" margin="2" tilecount="4" columns="2" objectalignment="center" tilerendersize="grid" fillmode="preserve-aspect-fit">
 <tileoffset x="0" y="-8"/>
 <grid orientation="isometric" width="32" height="16"/>
 <image source="sheet.png" trans="ff00ff" width="34" height="34"/>
 <tile id="2" class="water"/>
</tileset>
"#;
        let tileset = Tileset::parse_str(source).unwrap();
        assert_eq!(Some(TileOffset { x: 0, y: -8 }), tileset.tile_offset);
        assert_eq!(source, tileset.to_tsx());
    }

    #[test]
    fn unmodelled_content_survives_rewrite() {
        let source = r##"<?xml version="1.0" encoding="UTF-8"?>
<tileset version="1.10" tiledversion="1.10.2" name="shapes" tilewidth="64" tileheight="64" tilecount="1" columns="0" backgroundcolor="#202020">
 <grid orientation="orthogonal" width="1" height="1"/>
 <transformations hflip="1" vflip="0" rotate="0" preferuntransformed="0"/>
 <properties>
  <property name="spawn" type="class" propertytype="Spawn">
   <properties>
    <property name="count" type="int" value="3"/>
   </properties>
  </property>
 </properties>
 <tile id="0" probability="0.5">
  <image width="64" height="64" source="a.png"/>
  <objectgroup draworder="index" id="2">
   <object id="1" x="0" y="32" width="64" height="32"/>
   <object id="2" x="4" y="4">
    <ellipse/>
   </object>
  </objectgroup>
  <animation>
   <frame tileid="0" duration="100"/>
  </animation>
 </tile>
 <wangsets>
  <wangset name="paths" type="edge" tile="-1">
   <wangcolor name="dirt" color="#ff0000" tile="-1" probability="1"/>
  </wangset>
 </wangsets>
</tileset>
"##;
        let tileset = Tileset::parse_str(source).unwrap();
        let tile = tileset.tile(0).unwrap();
        assert_eq!(vec![(String::from("probability"), String::from("0.5"))], tile.extras.attributes);
        let names: Vec<&str> = tile.extras.elements.iter().map(|(_, element)| element.name.as_str()).collect();
        assert_eq!(vec!["objectgroup", "animation"], names);
        assert_eq!("Spawn", tileset.properties[0].property_type);
        assert_eq!("3", tileset.properties[0].properties[0].value);
        assert_eq!(source, tileset.to_tsx());
    }

    #[test]
    fn whitespace_in_attributes() {
        let tileset = Tileset {
            name: String::from("a\nb\tc"),
            tiles: vec![Tile {
                id: 0,
                properties: vec![Property { name: String::from("x\ry"), value: String::from("1"), ..Default::default() }],
                ..Default::default()
            }],
            ..Default::default()
        };
        let written = tileset.to_tsx();
        assert!(written.contains("name=\"a&#10;b&#9;c\""));
        assert!(written.contains("name=\"x&#13;y\""));
        assert_eq!(tileset, Tileset::parse_str(&written).unwrap());
    }
}
