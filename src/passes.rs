//! Structural cleanup passes: element, node and attribute removal.
//!
//! Each function implements one catalog plugin and mutates the document in
//! place. None of them can fail; anything they cannot prove removable is
//! left alone.

use crate::tree::{Document, Element, Node, retain_nodes};

/// Elements whose text content is significant and must not be whitespace-trimmed.
const TEXT_CONTENT_ELEMENTS: &[&str] = &["text", "tspan", "textPath", "title", "desc", "style", "script"];

const CONTAINER_ELEMENTS: &[&str] = &[
    "a", "clipPath", "defs", "g", "marker", "mask", "pattern", "switch", "symbol",
];

const EDITOR_PREFIXES: &[&str] = &["sodipodi", "inkscape"];

pub fn remove_comments(doc: &mut Document) {
    retain_nodes(&mut doc.root, &|n| !matches!(n, Node::Comment(_)));
}

pub fn remove_doctype(doc: &mut Document) {
    doc.doctype = None;
}

pub fn remove_xml_proc_inst(doc: &mut Document) {
    doc.xml_declaration = None;
    retain_nodes(&mut doc.root, &|n| {
        !matches!(n, Node::ProcessingInstruction { .. })
    });
}

pub fn remove_metadata(doc: &mut Document) {
    retain_nodes(&mut doc.root, &|n| match n {
        Node::Element(e) => !e.is("metadata"),
        _ => true,
    });
}

pub fn remove_title(doc: &mut Document) {
    retain_nodes(&mut doc.root, &|n| match n {
        Node::Element(e) => !e.is("title"),
        _ => true,
    });
}

pub fn remove_desc(doc: &mut Document) {
    retain_nodes(&mut doc.root, &|n| match n {
        Node::Element(e) => !e.is("desc"),
        _ => true,
    });
}

/// Drop editor-specific namespaced elements, attributes and the matching
/// xmlns declarations (Inkscape, Sodipodi).
pub fn remove_editors_ns_data(doc: &mut Document) {
    retain_nodes(&mut doc.root, &|n| match n {
        Node::Element(e) => !e
            .name
            .prefix
            .as_deref()
            .is_some_and(|p| EDITOR_PREFIXES.contains(&p)),
        _ => true,
    });

    doc.visit_elements_mut(|elem| {
        elem.attributes.retain(|a| {
            let editor_attr = a
                .name
                .prefix
                .as_deref()
                .is_some_and(|p| EDITOR_PREFIXES.contains(&p));
            let editor_xmlns =
                a.name.is_xmlns() && EDITOR_PREFIXES.contains(&a.name.local.as_str());
            !editor_attr && !editor_xmlns
        });
    });
}

pub fn remove_empty_attrs(doc: &mut Document) {
    doc.visit_elements_mut(|elem| {
        elem.attributes.retain(|a| !a.value.is_empty());
    });
}

/// Remove elements that can never render: display:none, visibility:hidden,
/// zero opacity.
pub fn remove_hidden_elems(doc: &mut Document) {
    retain_nodes(&mut doc.root, &|n| match n {
        Node::Element(e) => !is_hidden(e),
        _ => true,
    });
}

fn is_hidden(elem: &Element) -> bool {
    if elem.attr("display") == Some("none") {
        return true;
    }
    if elem.attr("visibility") == Some("hidden") {
        return true;
    }
    if let Some(opacity) = elem.attr("opacity")
        && opacity.trim().parse::<f64>().ok() == Some(0.0)
    {
        return true;
    }
    if let Some(style) = elem.attr("style")
        && style
            .split(';')
            .filter_map(|d| d.split_once(':'))
            .any(|(p, v)| p.trim() == "display" && v.trim() == "none")
    {
        return true;
    }
    false
}

/// Drop empty and whitespace-only text nodes, except inside elements whose
/// character data is significant.
pub fn remove_empty_text(doc: &mut Document) {
    fn walk(elem: &mut Element) {
        if !TEXT_CONTENT_ELEMENTS.contains(&elem.name.local.as_str()) {
            elem.children.retain(|n| match n {
                Node::Text(t) => !t.trim().is_empty(),
                _ => true,
            });
        }
        for child in elem.child_elements_mut() {
            walk(child);
        }
    }
    walk(&mut doc.root);
}

/// Remove childless container elements. Containers with an id survive: they
/// may be referenced even when empty.
pub fn remove_empty_containers(doc: &mut Document) {
    retain_nodes(&mut doc.root, &|n| match n {
        Node::Element(e) => {
            !(CONTAINER_ELEMENTS.contains(&e.name.local.as_str())
                && e.children.is_empty()
                && e.attr("id").is_none())
        }
        _ => true,
    });
}

pub fn remove_unknowns_and_defaults(doc: &mut Document) {
    doc.visit_elements_mut(|elem| {
        let element = elem.name.local.clone();
        let known_element = elem.name.prefix.is_none() && KNOWN_ELEMENTS.contains(&element.as_str());
        elem.attributes.retain(|a| {
            if is_default_value(&element, &a.name.local, &a.value) && a.name.prefix.is_none() {
                return false;
            }
            if !known_element || a.name.prefix.is_some() || a.name.is_xmlns() {
                return true;
            }
            let name = a.name.local.as_str();
            name.starts_with("data-") || name.starts_with("aria-") || KNOWN_ATTRS.contains(&name)
        });
    });
}

/// Presentation attributes that neither inherit nor apply to a `<g>` do
/// nothing there: drop them.
pub fn remove_non_inheritable_group_attrs(doc: &mut Document) {
    const USELESS_ON_GROUPS: &[&str] = &[
        "alignment-baseline",
        "baseline-shift",
        "dominant-baseline",
        "flood-color",
        "flood-opacity",
        "lighting-color",
        "stop-color",
        "stop-opacity",
        "vector-effect",
        "unicode-bidi",
    ];

    doc.visit_elements_mut(|elem| {
        if elem.is("g") {
            elem.attributes.retain(|a| {
                a.name.prefix.is_some() || !USELESS_ON_GROUPS.contains(&a.name.local.as_str())
            });
        }
    });
}

/// On shapes painted with `stroke="none"` the stroke-* attributes do
/// nothing; same for fill-* when `fill="none"`. Elements with an id or a
/// style attribute are skipped: their effective paint may come from
/// elsewhere.
pub fn remove_useless_stroke_and_fill(doc: &mut Document) {
    const SHAPES: &[&str] = &["circle", "ellipse", "line", "path", "polygon", "polyline", "rect"];
    const STROKE_PROPS: &[&str] = &[
        "stroke-dasharray",
        "stroke-dashoffset",
        "stroke-linecap",
        "stroke-linejoin",
        "stroke-miterlimit",
        "stroke-opacity",
        "stroke-width",
    ];
    const FILL_PROPS: &[&str] = &["fill-opacity", "fill-rule"];

    doc.visit_elements_mut(|elem| {
        if !SHAPES.contains(&elem.name.local.as_str())
            || elem.has_attr("id")
            || elem.has_attr("style")
        {
            return;
        }
        if elem.attr("stroke") == Some("none") {
            elem.attributes
                .retain(|a| !STROKE_PROPS.contains(&a.name.local.as_str()));
        }
        if elem.attr("fill") == Some("none") {
            elem.attributes
                .retain(|a| !FILL_PROPS.contains(&a.name.local.as_str()));
        }
    });
}

/// Merge adjacent `<path>` siblings whose attributes (other than `d`) are
/// identical. Only absolute follow-up movetos are merged; a relative `m`
/// would resolve against a different current point after concatenation.
pub fn merge_paths(doc: &mut Document) {
    doc.visit_elements_mut(|elem| {
        let mut merged: Vec<Node> = Vec::with_capacity(elem.children.len());

        for node in std::mem::take(&mut elem.children) {
            if let Node::Element(curr) = &node
                && let Some(Node::Element(prev)) = merged.last_mut()
                && can_merge_paths(prev, curr)
            {
                let d = format!("{} {}", prev.attr("d").unwrap_or(""), curr.attr("d").unwrap_or(""));
                prev.set_attr("d", d);
                continue;
            }
            merged.push(node);
        }

        elem.children = merged;
    });
}

fn can_merge_paths(a: &Element, b: &Element) -> bool {
    if !a.is("path") || !b.is("path") || !a.children.is_empty() || !b.children.is_empty() {
        return false;
    }
    if a.attr("d").is_none() || !b.attr("d").is_some_and(|d| d.trim_start().starts_with('M')) {
        return false;
    }
    if a.has_attr("id") || b.has_attr("id") {
        return false;
    }
    // Reference-carrying paint (markers, patterns, clips) renders per path.
    let referencing = |e: &Element| {
        e.attributes
            .iter()
            .any(|at| at.name.local.starts_with("marker-") || at.value.contains("url("))
    };
    if referencing(a) || referencing(b) {
        return false;
    }

    let mut attrs_a: Vec<(String, &str)> = a
        .attributes
        .iter()
        .filter(|at| at.name.local != "d")
        .map(|at| (at.name.full(), at.value.as_str()))
        .collect();
    let mut attrs_b: Vec<(String, &str)> = b
        .attributes
        .iter()
        .filter(|at| at.name.local != "d")
        .map(|at| (at.name.full(), at.value.as_str()))
        .collect();
    attrs_a.sort();
    attrs_b.sort();
    attrs_a == attrs_b
}

/// Drop fixed pixel dimensions from the root element. Without a viewBox the
/// dimensions are first folded into one so scaling behavior is preserved.
pub fn remove_dimensions(doc: &mut Document) {
    let root = &mut doc.root;
    if root.has_attr("viewBox") {
        root.remove_attr("width");
        root.remove_attr("height");
        return;
    }
    if let (Some(w), Some(h)) = (
        root.attr("width").and_then(parse_length),
        root.attr("height").and_then(parse_length),
    ) {
        use crate::pathdata::format_number;
        let view_box = format!("0 0 {} {}", format_number(w, 2), format_number(h, 2));
        root.set_attr("viewBox", view_box);
        root.remove_attr("width");
        root.remove_attr("height");
    }
}

/// Drop a root viewBox that restates the width/height attributes. Inactive
/// in every default composition; run only when explicitly re-enabled.
pub fn remove_view_box(doc: &mut Document) {
    let root = &mut doc.root;
    let Some(vb) = root.attr("viewBox") else { return };
    let parts: Vec<f64> = vb
        .split([' ', ','])
        .filter(|p| !p.is_empty())
        .filter_map(|p| p.parse().ok())
        .collect();
    if parts.len() != 4 || parts[0] != 0.0 || parts[1] != 0.0 {
        return;
    }
    let (Some(w), Some(h)) = (
        root.attr("width").and_then(parse_length),
        root.attr("height").and_then(parse_length),
    ) else {
        return;
    };
    if parts[2] == w && parts[3] == h {
        root.remove_attr("viewBox");
    }
}

fn parse_length(v: &str) -> Option<f64> {
    v.trim().trim_end_matches("px").trim().parse().ok()
}

fn is_default_value(element: &str, attr: &str, value: &str) -> bool {
    match (element, attr, value) {
        ("svg", "version", _) => true,
        (_, "baseProfile", "full") => true,
        (_, "preserveAspectRatio", "xMidYMid meet") => true,

        (_, "fill-opacity", "1") => true,
        (_, "stroke-opacity", "1") => true,
        (_, "opacity", "1") => true,
        (_, "stroke-width", "1") => true,
        (_, "stroke-linecap", "butt") => true,
        (_, "stroke-linejoin", "miter") => true,
        (_, "stroke-miterlimit", "4") => true,
        (_, "stroke-dashoffset", "0") => true,
        (_, "fill-rule", "nonzero") => true,
        (_, "clip-rule", "nonzero") => true,
        (_, "font-style", "normal") => true,
        (_, "font-weight", "normal") | (_, "font-weight", "400") => true,
        (_, "text-anchor", "start") => true,
        (_, "dominant-baseline", "auto") => true,
        (_, "visibility", "visible") => true,
        (_, "display", "inline") => true,

        ("rect", "x", "0") | ("rect", "y", "0") | ("rect", "rx", "0") | ("rect", "ry", "0") => true,
        ("circle", "cx", "0") | ("circle", "cy", "0") => true,
        ("ellipse", "cx", "0") | ("ellipse", "cy", "0") => true,
        ("line", "x1", "0") | ("line", "y1", "0") | ("line", "x2", "0") | ("line", "y2", "0") => {
            true
        }

        _ => false,
    }
}

const KNOWN_ELEMENTS: &[&str] = &[
    "a", "circle", "clipPath", "defs", "desc", "ellipse", "g", "image", "line",
    "linearGradient", "marker", "mask", "metadata", "path", "pattern", "polygon", "polyline",
    "radialGradient", "rect", "stop", "svg", "switch", "symbol", "text", "textPath", "title",
    "tspan", "use", "view",
];

const KNOWN_ATTRS: &[&str] = &[
    "alignment-baseline", "baseProfile", "baseline-shift", "class", "clip-path", "clip-rule",
    "clipPathUnits", "color", "color-interpolation", "cursor", "cx", "cy", "d", "direction",
    "display", "dominant-baseline", "dx", "dy", "fill", "fill-opacity", "fill-rule", "filter",
    "font-family", "font-size", "font-stretch", "font-style", "font-variant", "font-weight",
    "fx", "fy", "gradientTransform", "gradientUnits", "height", "href", "id", "image-rendering",
    "lang", "lengthAdjust", "letter-spacing", "marker-end", "marker-mid", "marker-start",
    "markerHeight", "markerUnits", "markerWidth", "mask", "maskContentUnits", "maskUnits",
    "media", "method", "offset", "opacity", "orient", "overflow", "paint-order", "pathLength",
    "patternContentUnits", "patternTransform", "patternUnits", "pointer-events", "points",
    "preserveAspectRatio", "r", "refX", "refY", "rotate", "rx", "ry", "shape-rendering",
    "spacing", "spreadMethod", "startOffset", "stop-color", "stop-opacity", "stroke",
    "stroke-dasharray", "stroke-dashoffset", "stroke-linecap", "stroke-linejoin",
    "stroke-miterlimit", "stroke-opacity", "stroke-width", "style", "systemLanguage", "tabindex",
    "text-anchor", "text-decoration", "text-rendering", "textLength", "transform", "type",
    "unicode-bidi", "vector-effect", "version", "viewBox", "visibility", "width", "word-spacing",
    "writing-mode", "x", "x1", "x2", "y", "y1", "y2",
];
