//! SVG path data: parsing and compact re-serialization.
//!
//! Grammar reference: https://www.w3.org/TR/SVG/paths.html

use crate::error::SvoptError;
use crate::tree::Document;

/// A parsed `d` attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct PathData {
    pub segments: Vec<Segment>,
}

/// One path segment, normalized to an uppercase opcode plus a relative flag.
///
/// Argument counts per opcode: M/L/T 2, H/V 1, C 6, S/Q 4, A 7, Z 0. For
/// arcs, `args[3]` and `args[4]` are the large-arc and sweep flags (0 or 1).
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub op: char,
    pub rel: bool,
    pub args: Vec<f64>,
}

impl Segment {
    fn letter(&self) -> char {
        if self.rel {
            self.op.to_ascii_lowercase()
        } else {
            self.op
        }
    }
}

fn arg_count(op: char) -> Option<usize> {
    Some(match op {
        'M' | 'L' | 'T' => 2,
        'H' | 'V' => 1,
        'C' => 6,
        'S' | 'Q' => 4,
        'A' => 7,
        'Z' => 0,
        _ => return None,
    })
}

/// Parse path data into segments.
pub fn parse_path(d: &str) -> Result<PathData, SvoptError> {
    let mut p = Scanner::new(d);
    let mut segments = Vec::new();
    let mut last_letter: Option<char> = None;

    p.skip_ws();
    while !p.at_end() {
        let letter = if p.peek().is_some_and(|c| c.is_ascii_alphabetic()) {
            let c = p.advance().unwrap();
            last_letter = Some(c);
            c
        } else {
            // Implicit repetition: bare coordinates continue the previous
            // command, except after a moveto where they become linetos.
            match last_letter {
                Some('M') => 'L',
                Some('m') => 'l',
                // Closepath takes no arguments, so it cannot repeat
                // implicitly; trailing coordinates here are a grammar error.
                Some('Z' | 'z') => {
                    return Err(SvoptError::InvalidPath(
                        "coordinates after closepath".into(),
                    ));
                }
                Some(c) => c,
                None => return Err(SvoptError::InvalidPath("expected command letter".into())),
            }
        };

        let op = letter.to_ascii_uppercase();
        let count =
            arg_count(op).ok_or_else(|| SvoptError::InvalidPath(format!("unknown command: {}", letter)))?;

        let mut args = Vec::with_capacity(count);
        for i in 0..count {
            let is_flag = op == 'A' && (i == 3 || i == 4);
            args.push(if is_flag { p.flag()? } else { p.number()? });
        }

        segments.push(Segment {
            op,
            rel: letter.is_ascii_lowercase(),
            args,
        });
        p.skip_ws_comma();
    }

    Ok(PathData { segments })
}

/// Serialize segments with the shortest spelling: repeated opcodes omitted,
/// separators dropped wherever the grammar allows.
pub fn serialize_path(path: &PathData, precision: u8) -> String {
    let mut out = String::new();
    let mut prev: Option<char> = None;

    for seg in &path.segments {
        let letter = seg.letter();

        let needs_letter = match prev {
            None => true,
            Some(p) => {
                // After M, bare pairs read as L (same for m/l).
                !((p == 'M' && letter == 'L') || (p == 'm' && letter == 'l') || p == letter)
            }
        };

        if needs_letter || seg.args.is_empty() {
            out.push(letter);
        }

        for (i, arg) in seg.args.iter().enumerate() {
            let is_flag = seg.op == 'A' && (i == 3 || i == 4);
            let formatted = if is_flag {
                if *arg != 0.0 { "1".to_string() } else { "0".to_string() }
            } else {
                format_number(*arg, precision)
            };
            push_with_separator(&mut out, &formatted);
        }

        prev = Some(letter);
    }

    out
}

fn push_with_separator(out: &mut String, token: &str) {
    if let (Some(last), Some(first)) = (out.chars().last(), token.chars().next()) {
        let last_numeric = last.is_ascii_digit() || last == '.';
        let first_numeric = first.is_ascii_digit() || first == '.';
        if last_numeric && first_numeric {
            out.push(' ');
        }
    }
    out.push_str(token);
}

/// Shortest decimal spelling of `n` rounded to `precision` places.
pub fn format_number(n: f64, precision: u8) -> String {
    let factor = 10f64.powi(precision as i32);
    let rounded = (n * factor).round() / factor;

    if rounded == 0.0 {
        return "0".into();
    }
    if rounded.fract() == 0.0 && rounded.abs() < 1e15 {
        return format!("{}", rounded as i64);
    }

    let mut buf = ryu::Buffer::new();
    let mut s = buf.format(rounded).to_string();

    if let Some(stripped) = s.strip_prefix("0.") {
        s = format!(".{}", stripped);
    } else if let Some(stripped) = s.strip_prefix("-0.") {
        s = format!("-.{}", stripped);
    }

    s
}

/// The convertPathData plugin: reparse every `d` attribute and rewrite it in
/// the shortest equivalent spelling. Unparseable path data is left alone.
pub fn convert_path_data(doc: &mut Document, precision: u8) {
    doc.visit_elements_mut(|elem| {
        if !elem.is("path") {
            return;
        }
        if let Some(d) = elem.attr("d").map(|s| s.to_string())
            && let Ok(path) = parse_path(&d)
        {
            let compact = serialize_path(&path, precision);
            if compact.len() <= d.len() {
                elem.set_attr("d", compact);
            }
        }
    });
}

struct Scanner<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn number(&mut self) -> Result<f64, SvoptError> {
        self.skip_ws_comma();
        let start = self.pos;

        if matches!(self.peek(), Some('-') | Some('+')) {
            self.advance();
        }
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
        if self.peek() == Some('.') {
            self.advance();
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }
        if matches!(self.peek(), Some('e') | Some('E')) {
            self.advance();
            if matches!(self.peek(), Some('-') | Some('+')) {
                self.advance();
            }
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        let s = &self.input[start..self.pos];
        if s.is_empty() {
            return Err(SvoptError::InvalidPath("expected number".into()));
        }
        s.parse()
            .map_err(|_| SvoptError::InvalidPath(format!("invalid number: {}", s)))
    }

    fn flag(&mut self) -> Result<f64, SvoptError> {
        self.skip_ws_comma();
        match self.advance() {
            Some('0') => Ok(0.0),
            Some('1') => Ok(1.0),
            Some(c) => Err(SvoptError::InvalidPath(format!(
                "expected flag (0 or 1), got: {}",
                c
            ))),
            None => Err(SvoptError::InvalidPath("expected flag".into())),
        }
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_whitespace()) {
            self.advance();
        }
    }

    fn skip_ws_comma(&mut self) {
        self.skip_ws();
        if self.peek() == Some(',') {
            self.advance();
        }
        self.skip_ws();
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }
}
