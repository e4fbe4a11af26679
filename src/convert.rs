//! Rewriting passes: colors, style attributes, transform lists, attribute
//! order and pattern-based attribute removal.

use crate::pathdata::format_number;
use crate::tree::Document;

const COLOR_ATTRS: &[&str] = &[
    "color",
    "fill",
    "flood-color",
    "lighting-color",
    "stop-color",
    "stroke",
];

/// Style properties that map 1:1 onto presentation attributes. CSS
/// `transform` is excluded: its syntax differs from the attribute's.
const PRESENTATION_PROPS: &[&str] = &[
    "clip-path",
    "clip-rule",
    "color",
    "display",
    "fill",
    "fill-opacity",
    "fill-rule",
    "filter",
    "font-family",
    "font-size",
    "font-style",
    "font-weight",
    "mask",
    "opacity",
    "stop-color",
    "stop-opacity",
    "stroke",
    "stroke-dasharray",
    "stroke-dashoffset",
    "stroke-linecap",
    "stroke-linejoin",
    "stroke-miterlimit",
    "stroke-opacity",
    "stroke-width",
    "text-anchor",
    "visibility",
];

const TRANSFORM_ATTRS: &[&str] = &["transform", "gradientTransform", "patternTransform"];

/// Move style declarations onto the matching presentation attributes.
/// Declarations with no attribute twin, `!important` markers, or a name
/// already present as an attribute stay in the style string.
pub fn convert_style_to_attrs(doc: &mut Document) {
    doc.visit_elements_mut(|elem| {
        let Some(style) = elem.attr("style").map(|s| s.to_string()) else {
            return;
        };

        let mut kept = Vec::new();
        let mut promoted = Vec::new();

        for decl in style.split(';') {
            let decl = decl.trim();
            if decl.is_empty() {
                continue;
            }
            match decl.split_once(':') {
                Some((prop, value)) => {
                    let prop = prop.trim();
                    let value = value.trim();
                    if PRESENTATION_PROPS.contains(&prop)
                        && !value.contains("!important")
                        && !elem.has_attr(prop)
                    {
                        promoted.push((prop.to_string(), value.to_string()));
                    } else {
                        kept.push(format!("{}:{}", prop, value));
                    }
                }
                None => kept.push(decl.to_string()),
            }
        }

        for (prop, value) in promoted {
            elem.set_attr(prop, value);
        }
        if kept.is_empty() {
            elem.remove_attr("style");
        } else {
            elem.set_attr("style", kept.join(";"));
        }
    });
}

/// Normalize color values to their shortest spelling.
pub fn convert_colors(doc: &mut Document) {
    doc.visit_elements_mut(|elem| {
        for attr in &mut elem.attributes {
            if attr.name.prefix.is_none() && COLOR_ATTRS.contains(&attr.name.local.as_str()) {
                attr.value = minify_color(&attr.value);
            }
        }
        if let Some(style) = elem.attr("style").map(|s| s.to_string()) {
            elem.set_attr("style", minify_style_colors(&style));
        }
    });
}

fn minify_color(color: &str) -> String {
    let color = color.trim();
    let lower = color.to_ascii_lowercase();

    match lower.as_str() {
        "white" | "#ffffff" => return "#fff".into(),
        "black" | "#000000" => return "#000".into(),
        "#ff0000" | "#f00" => return "red".into(),
        "#0000ff" | "#00f" => return "blue".into(),
        _ => {}
    }

    if let Some(hex) = parse_rgb_functional(&lower) {
        return minify_color(&hex);
    }

    // #rrggbb -> #rgb when each channel repeats its nibble
    if lower.len() == 7 && lower.starts_with('#') {
        let hex = &lower[1..];
        let channels: Vec<u8> = (0..6)
            .step_by(2)
            .filter_map(|i| u8::from_str_radix(&hex[i..i + 2], 16).ok())
            .collect();
        if let [r, g, b] = channels[..]
            && r >> 4 == r & 0xf
            && g >> 4 == g & 0xf
            && b >> 4 == b & 0xf
        {
            return format!("#{:x}{:x}{:x}", r & 0xf, g & 0xf, b & 0xf);
        }
        return lower;
    }

    color.to_string()
}

/// `rgb(255, 0, 0)` and `rgb(100%, 0%, 0%)` to `#rrggbb`.
fn parse_rgb_functional(color: &str) -> Option<String> {
    let inner = color.strip_prefix("rgb(")?.strip_suffix(')')?;
    let mut channels = [0u8; 3];
    let mut count = 0;
    for part in inner.split([',', ' ']).filter(|p| !p.is_empty()) {
        if count == 3 {
            return None;
        }
        channels[count] = if let Some(pct) = part.strip_suffix('%') {
            let v: f64 = pct.trim().parse().ok()?;
            (v.clamp(0.0, 100.0) * 255.0 / 100.0).round() as u8
        } else {
            part.trim().parse::<u16>().ok().filter(|v| *v <= 255)? as u8
        };
        count += 1;
    }
    (count == 3).then(|| format!("#{:02x}{:02x}{:02x}", channels[0], channels[1], channels[2]))
}

fn minify_style_colors(style: &str) -> String {
    let mut parts = Vec::new();
    for decl in style.split(';') {
        let decl = decl.trim();
        if decl.is_empty() {
            continue;
        }
        match decl.split_once(':') {
            Some((prop, value)) => {
                let prop = prop.trim();
                let value = value.trim();
                if COLOR_ATTRS.contains(&prop) {
                    parts.push(format!("{}:{}", prop, minify_color(value)));
                } else {
                    parts.push(format!("{}:{}", prop, value));
                }
            }
            None => parts.push(decl.to_string()),
        }
    }
    parts.join(";")
}

/// Normalize transform lists: drop identity functions, collapse redundant
/// arguments, compact the number syntax. Unparseable lists are left alone.
pub fn convert_transform(doc: &mut Document) {
    doc.visit_elements_mut(|elem| {
        for attr in &mut elem.attributes {
            if attr.name.prefix.is_none() && TRANSFORM_ATTRS.contains(&attr.name.local.as_str())
                && let Some(funcs) = parse_transform_list(&attr.value)
            {
                attr.value = serialize_transform_list(&funcs);
            }
        }
        for &name in TRANSFORM_ATTRS {
            if elem.attr(name) == Some("") {
                elem.remove_attr(name);
            }
        }
    });
}

fn parse_transform_list(value: &str) -> Option<Vec<(String, Vec<f64>)>> {
    let mut funcs = Vec::new();
    let mut rest = value.trim();

    while !rest.is_empty() {
        let open = rest.find('(')?;
        let close = rest.find(')')?;
        if close < open {
            return None;
        }
        let name = rest[..open].trim();
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphabetic()) {
            return None;
        }
        let args: Result<Vec<f64>, _> = rest[open + 1..close]
            .split([',', ' ', '\n', '\t'])
            .filter(|p| !p.is_empty())
            .map(|p| p.parse::<f64>())
            .collect();
        funcs.push((name.to_string(), args.ok()?));
        rest = rest[close + 1..].trim_start_matches([',', ' ', '\n', '\t']);
    }

    Some(funcs)
}

fn is_identity(name: &str, args: &[f64]) -> bool {
    match (name, args.len()) {
        ("translate", 1 | 2) => args.iter().all(|a| *a == 0.0),
        ("scale", 1 | 2) => args.iter().all(|a| *a == 1.0),
        ("rotate", 1 | 3) => args[0] == 0.0,
        ("skewX" | "skewY", 1) => args[0] == 0.0,
        ("matrix", 6) => args == [1.0, 0.0, 0.0, 1.0, 0.0, 0.0],
        _ => false,
    }
}

fn serialize_transform_list(funcs: &[(String, Vec<f64>)]) -> String {
    let mut out = String::new();
    for (name, args) in funcs {
        if is_identity(name, args) {
            continue;
        }
        let mut args = args.clone();
        match (name.as_str(), args.len()) {
            ("translate", 2) if args[1] == 0.0 => args.truncate(1),
            ("scale", 2) if args[0] == args[1] => args.truncate(1),
            _ => {}
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(name);
        out.push('(');
        for (i, a) in args.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            out.push_str(&format_number(*a, 3));
        }
        out.push(')');
    }
    out
}

/// Stable attribute reorder for better downstream compression: namespace
/// declarations first, then alphabetical. Aggressive tier: reordering is
/// visible to attribute-order-sensitive tooling even though rendering is
/// unchanged.
pub fn sort_attrs(doc: &mut Document) {
    doc.visit_elements_mut(|elem| {
        elem.attributes.sort_by(|a, b| {
            match (a.name.is_xmlns(), b.name.is_xmlns()) {
                (true, false) => std::cmp::Ordering::Less,
                (false, true) => std::cmp::Ordering::Greater,
                _ => a.name.full().cmp(&b.name.full()),
            }
        });
    });
}

/// Remove attributes matching the configured name patterns. A trailing `*`
/// is a prefix wildcard. Fill-, stroke- and namespace-declaration attributes
/// are always kept.
pub fn remove_attrs(doc: &mut Document, patterns: &[String]) {
    doc.visit_elements_mut(|elem| {
        elem.attributes.retain(|a| {
            if a.name.is_xmlns() {
                return true;
            }
            let local = a.name.local.as_str();
            if local == "fill" || local == "stroke" || local.starts_with("fill-") || local.starts_with("stroke-") {
                return true;
            }
            !patterns.iter().any(|p| pattern_matches(p, local))
        });
    });
}

fn pattern_matches(pattern: &str, name: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => name.starts_with(prefix),
        None => pattern == name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_svg;
    use crate::serialize::serialize;

    fn pass(svg: &str, f: impl Fn(&mut Document)) -> String {
        let mut doc = parse_svg(svg).unwrap();
        f(&mut doc);
        serialize(&doc)
    }

    #[test]
    fn color_minification() {
        assert_eq!(minify_color("#ffffff"), "#fff");
        assert_eq!(minify_color("#FF0000"), "red");
        assert_eq!(minify_color("#aabbcc"), "#abc");
        assert_eq!(minify_color("#abcdef"), "#abcdef");
        assert_eq!(minify_color("rgb(255, 0, 0)"), "red");
        assert_eq!(minify_color("rgb(16,32,48)"), "#102030");
        assert_eq!(minify_color("rgb(100%, 100%, 100%)"), "#fff");
        assert_eq!(minify_color("url(#grad)"), "url(#grad)");
        assert_eq!(minify_color("currentColor"), "currentColor");
    }

    #[test]
    fn style_promoted_to_attrs() {
        let svg = "<svg><rect style=\"fill:red;stroke-width:2;--x:1\"/></svg>";
        let out = pass(svg, convert_style_to_attrs);
        assert_eq!(out, "<svg><rect style=\"--x:1\" fill=\"red\" stroke-width=\"2\"/></svg>");
    }

    #[test]
    fn style_never_overrides_existing_attr() {
        let svg = "<svg><rect fill=\"blue\" style=\"fill:red\"/></svg>";
        let out = pass(svg, convert_style_to_attrs);
        // fill:red stays in style, which keeps CSS precedence intact
        assert_eq!(out, "<svg><rect fill=\"blue\" style=\"fill:red\"/></svg>");
    }

    #[test]
    fn transform_identities_dropped() {
        let svg = "<svg><g transform=\"translate(0,0) scale(1) rotate(45)\"/></svg>";
        let out = pass(svg, convert_transform);
        assert_eq!(out, "<svg><g transform=\"rotate(45)\"/></svg>");
    }

    #[test]
    fn transform_redundant_args_collapsed() {
        let svg = "<svg><g transform=\"translate(10, 0) scale(2, 2)\"/></svg>";
        let out = pass(svg, convert_transform);
        assert_eq!(out, "<svg><g transform=\"translate(10) scale(2)\"/></svg>");
    }

    #[test]
    fn all_identity_transform_removed_entirely() {
        let svg = "<svg><g transform=\"translate(0)\"><rect/></g></svg>";
        let out = pass(svg, convert_transform);
        assert_eq!(out, "<svg><g><rect/></g></svg>");
    }

    #[test]
    fn unparseable_transform_left_alone() {
        let svg = "<svg><g transform=\"translate(10px)\"/></svg>";
        let out = pass(svg, convert_transform);
        assert_eq!(out, svg);
    }

    #[test]
    fn attrs_sorted_xmlns_first() {
        let svg = "<svg width=\"1\" xmlns=\"http://www.w3.org/2000/svg\" height=\"2\"/>";
        let out = pass(svg, sort_attrs);
        assert_eq!(
            out,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" height=\"2\" width=\"1\"/>"
        );
    }

    #[test]
    fn remove_attrs_respects_paint_guard() {
        let svg = "<svg><rect class=\"a\" data-name=\"b\" data-x=\"c\" fill=\"red\" stroke-width=\"2\"/></svg>";
        let patterns = vec!["class".to_string(), "data-*".to_string(), "fill".to_string()];
        let mut doc = parse_svg(svg).unwrap();
        remove_attrs(&mut doc, &patterns);
        assert_eq!(
            serialize(&doc),
            "<svg><rect fill=\"red\" stroke-width=\"2\"/></svg>"
        );
    }
}
