use roxmltree::Node;

/// An element the model has no field for, kept verbatim so it can be written back.
/// IE: a tile's <objectgroup> or <animation>, a tileset's <wangsets>.
#[derive(Clone, Eq, PartialEq, Default, Debug)]
pub struct RawElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<RawElement>,
    /// Text content of elements without children. IE: base64 <data>.
    pub text: Option<String>,
}

impl RawElement {
    pub(crate) fn parse(node: Node) -> Self {
        let children: Vec<RawElement> = node
            .children()
            .filter(Node::is_element)
            .map(RawElement::parse)
            .collect();
        let text = match children.is_empty() {
            true => node.text().filter(|text| !text.trim().is_empty()).map(String::from),
            false => None,
        };
        Self {
            name: String::from(node.tag_name().name()),
            attributes: node
                .attributes()
                .map(|attribute| (String::from(attribute.name()), String::from(attribute.value())))
                .collect(),
            children,
            text,
        }
    }
}

/// Attributes and child elements of a modelled element that the model does not hold.
#[derive(Clone, Eq, PartialEq, Default, Debug)]
pub struct Extras {
    pub attributes: Vec<(String, String)>,
    /// Each element is paired with the number of modelled children preceding it.
    pub elements: Vec<(usize, RawElement)>,
}

impl Extras {
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.elements.is_empty()
    }

    pub(crate) fn push_attribute(&mut self, name: &str, value: &str) {
        self.attributes.push((String::from(name), String::from(value)));
    }

    pub(crate) fn push_element(&mut self, known_before: usize, node: Node) {
        log::trace!("Keeping unmodelled element <{}>", node.tag_name().name());
        self.elements.push((known_before, RawElement::parse(node)));
    }
}
