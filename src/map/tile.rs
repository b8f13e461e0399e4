use crate::Extras;

#[derive(Clone, PartialEq, Default, Debug)]
pub struct Tile {
    /// ID of tile local to its tileset
    pub id: u32,
    pub class: String,
    pub properties: Properties,
    pub image: Option<Image>,
    /// Collision shapes, animation, probability and the like.
    pub extras: Extras,
}

/// Reference to a bitmap, with the source exactly as written in the document.
#[derive(Clone, Eq, PartialEq, Default, Debug)]
pub struct Image {
    pub format: String,
    pub source: String,
    pub trans: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub extras: Extras,
}

impl Image {
    /// Declared width and height, if both are present.
    pub fn size(&self) -> Option<(u32, u32)> {
        Some((self.width?, self.height?))
    }
}

/// Custom properties in document order.
pub type Properties = Vec<Property>;

#[derive(Clone, Eq, PartialEq, Default, Debug)]
pub struct Property {
    pub name: String,
    /// Empty for plain strings.
    pub kind: String,
    /// Name of the custom type for class and enum properties.
    pub property_type: String,
    pub value: String,
    /// Members of a class property.
    pub properties: Properties,
}
