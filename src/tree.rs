//! The document tree that optimization plugins operate on.

/// A parsed SVG document.
#[derive(Debug, Clone)]
pub struct Document {
    /// XML declaration, if the source carried one.
    pub xml_declaration: Option<XmlDeclaration>,
    /// DOCTYPE body, if the source carried one.
    pub doctype: Option<String>,
    /// The root `<svg>` element.
    pub root: Element,
}

/// Attributes of an `<?xml ...?>` declaration.
#[derive(Debug, Clone)]
pub struct XmlDeclaration {
    pub version: String,
    pub encoding: Option<String>,
    pub standalone: Option<bool>,
}

/// A possibly-prefixed name ("rect", "xlink:href", "inkscape:label").
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    pub prefix: Option<String>,
    pub local: String,
}

impl QName {
    pub fn local(local: impl Into<String>) -> Self {
        Self {
            prefix: None,
            local: local.into(),
        }
    }

    /// Split "prefix:local" into its parts; plain names have no prefix.
    pub fn parse(s: &str) -> Self {
        match s.split_once(':') {
            Some((prefix, local)) => Self {
                prefix: Some(prefix.into()),
                local: local.into(),
            },
            None => Self::local(s),
        }
    }

    /// An `xmlns` or `xmlns:prefix` namespace declaration.
    pub fn is_xmlns(&self) -> bool {
        self.prefix.as_deref() == Some("xmlns") || (self.prefix.is_none() && self.local == "xmlns")
    }

    pub fn full(&self) -> String {
        match &self.prefix {
            Some(p) => format!("{}:{}", p, self.local),
            None => self.local.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: QName,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: QName::parse(&name.into()),
            value: value.into(),
        }
    }
}

/// One node in the tree.
#[derive(Debug, Clone)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
    CData(String),
    ProcessingInstruction {
        target: String,
        content: Option<String>,
    },
}

#[derive(Debug, Clone)]
pub struct Element {
    pub name: QName,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: QName::parse(&name.into()),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Tag check by local name.
    pub fn is(&self, local: &str) -> bool {
        self.name.local == local && self.name.prefix.is_none()
    }

    pub fn attr(&self, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.prefix.is_none() && a.name.local == local)
            .map(|a| a.value.as_str())
    }

    pub fn has_attr(&self, local: &str) -> bool {
        self.attr(local).is_some()
    }

    pub fn set_attr(&mut self, local: impl Into<String>, value: impl Into<String>) {
        let local = local.into();
        if let Some(a) = self
            .attributes
            .iter_mut()
            .find(|a| a.name.prefix.is_none() && a.name.local == local)
        {
            a.value = value.into();
        } else {
            self.attributes.push(Attribute {
                name: QName::local(local),
                value: value.into(),
            });
        }
    }

    /// Remove an unprefixed attribute; returns its value when present.
    pub fn take_attr(&mut self, local: &str) -> Option<String> {
        let idx = self
            .attributes
            .iter()
            .position(|a| a.name.prefix.is_none() && a.name.local == local)?;
        Some(self.attributes.remove(idx).value)
    }

    pub fn remove_attr(&mut self, local: &str) {
        self.attributes
            .retain(|a| !(a.name.prefix.is_none() && a.name.local == local));
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    pub fn child_elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }
}

impl Document {
    /// Depth-first mutable visit of every element, root included.
    pub fn visit_elements_mut(&mut self, mut f: impl FnMut(&mut Element)) {
        fn walk(elem: &mut Element, f: &mut impl FnMut(&mut Element)) {
            f(elem);
            for child in elem.child_elements_mut() {
                walk(child, f);
            }
        }
        walk(&mut self.root, &mut f);
    }

    /// Depth-first visit of every element, root included.
    pub fn visit_elements(&self, mut f: impl FnMut(&Element)) {
        fn walk(elem: &Element, f: &mut impl FnMut(&Element)) {
            f(elem);
            for child in elem.child_elements() {
                walk(child, f);
            }
        }
        walk(&self.root, &mut f);
    }
}

/// Recursively drop child nodes failing the predicate, at every depth.
///
/// The predicate sees nodes bottom-up so that a container emptied by the
/// current pass can itself be judged empty by the same predicate.
pub fn retain_nodes(elem: &mut Element, keep: &impl Fn(&Node) -> bool) {
    for child in elem.child_elements_mut() {
        retain_nodes(child, keep);
    }
    elem.children.retain(keep);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qname_parse() {
        let q = QName::parse("inkscape:label");
        assert_eq!(q.prefix.as_deref(), Some("inkscape"));
        assert_eq!(q.local, "label");
        assert_eq!(q.full(), "inkscape:label");
        assert!(QName::parse("xmlns:xlink").is_xmlns());
        assert!(QName::parse("xmlns").is_xmlns());
        assert!(!QName::parse("width").is_xmlns());
    }

    #[test]
    fn attr_accessors() {
        let mut e = Element::new("rect");
        e.set_attr("width", "10");
        assert_eq!(e.attr("width"), Some("10"));
        e.set_attr("width", "20");
        assert_eq!(e.attr("width"), Some("20"));
        assert_eq!(e.take_attr("width").as_deref(), Some("20"));
        assert!(!e.has_attr("width"));
    }

    #[test]
    fn prefixed_attr_not_shadowed() {
        let mut e = Element::new("use");
        e.attributes.push(Attribute::new("xlink:href", "#a"));
        // attr() only sees unprefixed names
        assert_eq!(e.attr("href"), None);
    }
}
