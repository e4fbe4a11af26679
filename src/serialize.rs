//! Document tree back to compact markup.
//!
//! The serializer is faithful: whatever is still in the tree gets written.
//! Dropping declarations, comments or whitespace is plugin work, which keeps
//! a zero-plugin pass lossless and multi-pass output at a stable fixed point.

use crate::tree::*;

/// Serialize a [`Document`] to markup.
pub fn serialize(doc: &Document) -> String {
    let mut out = String::new();

    if let Some(decl) = &doc.xml_declaration {
        out.push_str("<?xml version=\"");
        out.push_str(&decl.version);
        out.push('"');
        if let Some(enc) = &decl.encoding {
            out.push_str(" encoding=\"");
            out.push_str(enc);
            out.push('"');
        }
        if let Some(standalone) = decl.standalone {
            out.push_str(" standalone=\"");
            out.push_str(if standalone { "yes" } else { "no" });
            out.push('"');
        }
        out.push_str("?>");
    }

    if let Some(dt) = &doc.doctype {
        out.push_str("<!DOCTYPE ");
        out.push_str(dt);
        out.push('>');
    }

    serialize_element(&mut out, &doc.root);
    out
}

fn serialize_element(out: &mut String, elem: &Element) {
    out.push('<');
    out.push_str(&elem.name.full());

    for attr in &elem.attributes {
        out.push(' ');
        out.push_str(&attr.name.full());
        out.push_str("=\"");
        push_escaped_attr(out, &attr.value);
        out.push('"');
    }

    if elem.children.is_empty() {
        out.push_str("/>");
        return;
    }

    out.push('>');
    for child in &elem.children {
        serialize_node(out, child);
    }
    out.push_str("</");
    out.push_str(&elem.name.full());
    out.push('>');
}

fn serialize_node(out: &mut String, node: &Node) {
    match node {
        Node::Element(elem) => serialize_element(out, elem),
        Node::Text(text) => push_escaped_text(out, text),
        Node::Comment(comment) => {
            out.push_str("<!--");
            out.push_str(comment);
            out.push_str("-->");
        }
        Node::CData(data) => {
            out.push_str("<![CDATA[");
            out.push_str(data);
            out.push_str("]]>");
        }
        Node::ProcessingInstruction { target, content } => {
            out.push_str("<?");
            out.push_str(target);
            if let Some(c) = content {
                out.push(' ');
                out.push_str(c);
            }
            out.push_str("?>");
        }
    }
}

fn push_escaped_attr(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '"' => out.push_str("&quot;"),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

fn push_escaped_text(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_svg;

    #[test]
    fn round_trips_compact_markup() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg"><rect/></svg>"#;
        let doc = parse_svg(svg).unwrap();
        assert_eq!(serialize(&doc), svg);
    }

    #[test]
    fn keeps_declaration_and_comment_untouched() {
        let svg = r#"<?xml version="1.0"?><svg xmlns="http://www.w3.org/2000/svg"><!--k--></svg>"#;
        let doc = parse_svg(svg).unwrap();
        assert_eq!(serialize(&doc), svg);
    }

    #[test]
    fn escapes_attr_and_text() {
        let svg = "<svg><text a=\"&quot;x&quot;\">a &amp; b</text></svg>";
        let doc = parse_svg(svg).unwrap();
        assert_eq!(serialize(&doc), svg);
    }
}
