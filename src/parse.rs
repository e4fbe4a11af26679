//! Markup to document tree, via quick-xml.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::SvoptError;
use crate::tree::*;

/// Parse SVG markup into a [`Document`].
pub fn parse_svg(svg: &str) -> Result<Document, SvoptError> {
    let mut reader = Reader::from_str(svg);

    let mut xml_declaration = None;
    let mut doctype = None;
    let mut root = None;

    loop {
        match reader.read_event()? {
            Event::Decl(decl) => {
                xml_declaration = Some(XmlDeclaration {
                    version: String::from_utf8_lossy(decl.version()?.as_ref()).into_owned(),
                    encoding: decl
                        .encoding()
                        .transpose()
                        .ok()
                        .flatten()
                        .map(|e| String::from_utf8_lossy(e.as_ref()).into_owned()),
                    standalone: decl.standalone().transpose().ok().flatten().map(|s| {
                        String::from_utf8_lossy(s.as_ref()) == "yes"
                    }),
                });
            }
            Event::DocType(dt) => {
                doctype = Some(String::from_utf8_lossy(&dt).into_owned());
            }
            Event::Start(start) => {
                root = Some(parse_children(&mut reader, &start)?);
                finish_document(&mut reader)?;
                break;
            }
            Event::Empty(start) => {
                root = Some(element_from_start(&start)?);
                finish_document(&mut reader)?;
                break;
            }
            // Prolog comments, whitespace and PIs carry nothing we keep.
            Event::Comment(_) | Event::Text(_) | Event::PI(_) => {}
            Event::Eof => break,
            _ => {}
        }
    }

    let root = root.ok_or_else(|| SvoptError::InvalidSvg("no root element found".into()))?;

    if !root.is("svg") {
        return Err(SvoptError::InvalidSvg(format!(
            "root element is <{}>, expected <svg>",
            root.name.full()
        )));
    }

    Ok(Document {
        xml_declaration,
        doctype,
        root,
    })
}

/// Drain events after the root element's close tag. Comments, processing
/// instructions and whitespace may trail the document; anything else is a
/// second root or stray markup.
fn finish_document(reader: &mut Reader<&[u8]>) -> Result<(), SvoptError> {
    loop {
        match reader.read_event()? {
            Event::Eof => return Ok(()),
            Event::Comment(_) | Event::PI(_) => {}
            Event::Text(text) if text.unescape()?.trim().is_empty() => {}
            _ => {
                return Err(SvoptError::InvalidSvg(
                    "content after the root element".into(),
                ));
            }
        }
    }
}

fn parse_children(reader: &mut Reader<&[u8]>, start: &BytesStart) -> Result<Element, SvoptError> {
    let mut element = element_from_start(start)?;

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                element
                    .children
                    .push(Node::Element(parse_children(reader, &start)?));
            }
            Event::Empty(start) => {
                element
                    .children
                    .push(Node::Element(element_from_start(&start)?));
            }
            Event::End(_) => break,
            Event::Text(text) => {
                // Whitespace-only runs are kept; dropping them is the job of
                // the removeEmptyText plugin, not the parser.
                element.children.push(Node::Text(text.unescape()?.into_owned()));
            }
            Event::Comment(comment) => {
                element
                    .children
                    .push(Node::Comment(String::from_utf8_lossy(&comment).into_owned()));
            }
            Event::CData(cdata) => {
                element
                    .children
                    .push(Node::CData(String::from_utf8_lossy(&cdata).into_owned()));
            }
            Event::PI(pi) => {
                let content = String::from_utf8_lossy(&pi).into_owned();
                let (target, rest) = content
                    .split_once(char::is_whitespace)
                    .map(|(t, r)| (t.to_string(), Some(r.to_string())))
                    .unwrap_or((content, None));
                element.children.push(Node::ProcessingInstruction {
                    target,
                    content: rest,
                });
            }
            Event::Eof => {
                return Err(SvoptError::InvalidSvg("unexpected end of file".into()));
            }
            _ => {}
        }
    }

    Ok(element)
}

fn element_from_start(start: &BytesStart) -> Result<Element, SvoptError> {
    let name_bytes = start.name();
    let name = std::str::from_utf8(name_bytes.as_ref())?;

    let mut element = Element {
        name: QName::parse(name),
        attributes: Vec::new(),
        children: Vec::new(),
    };

    for attr in start.attributes() {
        let attr = attr.map_err(|e| SvoptError::InvalidSvg(format!("invalid attribute: {}", e)))?;
        let key = std::str::from_utf8(attr.key.as_ref())?;
        let value = attr.unescape_value()?;
        element.attributes.push(Attribute {
            name: QName::parse(key),
            value: value.into_owned(),
        });
    }

    Ok(element)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_declaration_and_root() {
        let svg = r#"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="100" height="100">
    <rect x="10" y="10" width="80" height="80" fill="red"/>
</svg>"#;

        let doc = parse_svg(svg).unwrap();
        assert!(doc.xml_declaration.is_some());
        assert!(doc.root.is("svg"));
        assert_eq!(doc.root.attr("width"), Some("100"));
    }

    #[test]
    fn keeps_comments_and_text() {
        let svg = "<svg xmlns=\"http://www.w3.org/2000/svg\"><!--hi--><text> x </text></svg>";
        let doc = parse_svg(svg).unwrap();
        assert!(matches!(doc.root.children[0], Node::Comment(_)));
        let text = doc.root.child_elements().next().unwrap();
        assert!(matches!(&text.children[0], Node::Text(t) if t == " x "));
    }

    #[test]
    fn rejects_truncated_markup() {
        assert!(parse_svg("<svg><rect></svg").is_err());
        assert!(parse_svg("").is_err());
    }

    #[test]
    fn rejects_non_svg_root() {
        assert!(parse_svg("<html><body/></html>").is_err());
    }

    #[test]
    fn rejects_content_after_root_element() {
        assert!(parse_svg("<svg/>junk").is_err());
        assert!(parse_svg("<svg/><svg/>").is_err());
        assert!(parse_svg("<svg/><junk").is_err());
        // Trailing misc is legal XML.
        assert!(parse_svg("<svg/>\n").is_ok());
        assert!(parse_svg("<svg/><!-- done -->").is_ok());
    }

    #[test]
    fn keeps_doctype_body() {
        let svg = r#"<!DOCTYPE svg PUBLIC "-//W3C//DTD SVG 1.1//EN" "x.dtd"><svg/>"#;
        let doc = parse_svg(svg).unwrap();
        assert!(doc.doctype.as_deref().unwrap().starts_with("svg PUBLIC"));
    }
}
