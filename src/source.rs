//! Markup acquisition: file paths (with transparent svgz decompression),
//! byte buffers, remote URLs and arbitrary readers.

use std::fs;
use std::io::Read;
use std::path::Path;

use flate2::read::GzDecoder;

use crate::error::SvoptError;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Read markup from a file. `.svgz` files, and any file starting with the
/// gzip magic, are gunzipped first.
pub fn read_markup(path: &Path) -> Result<String, SvoptError> {
    markup_from_bytes(&fs::read(path)?)
}

/// Interpret a byte buffer as markup, gunzipping when it is gzip data.
pub fn markup_from_bytes(bytes: &[u8]) -> Result<String, SvoptError> {
    if bytes.starts_with(&GZIP_MAGIC) {
        let mut decoder = GzDecoder::new(bytes);
        let mut markup = String::new();
        decoder.read_to_string(&mut markup)?;
        Ok(markup)
    } else {
        Ok(String::from_utf8(bytes.to_vec())?)
    }
}

/// Fetch markup over HTTP. A non-2xx status is a fetch failure.
pub fn fetch_markup(url: &str) -> Result<String, SvoptError> {
    let response = reqwest::blocking::get(url)?.error_for_status()?;
    markup_from_bytes(&response.bytes()?)
}

/// Fully buffer a reader, then interpret the bytes as markup. There is no
/// incremental optimization; streams are drained before processing starts.
pub fn markup_from_reader(mut reader: impl Read) -> Result<String, SvoptError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    markup_from_bytes(&bytes)
}

/// True when the string already looks like markup rather than a path: it
/// starts with `<svg`, optionally preceded by an XML declaration or doctype.
pub fn looks_like_markup(input: &str) -> bool {
    let mut rest = input.trim_start();
    loop {
        if rest.starts_with("<svg") {
            return true;
        }
        if rest.starts_with("<?") || rest.starts_with("<!") {
            match rest.find('>') {
                Some(end) => rest = rest[end + 1..].trim_start(),
                None => return false,
            }
        } else {
            return false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(data).unwrap();
        enc.finish().unwrap()
    }

    #[test]
    fn plain_bytes_pass_through() {
        assert_eq!(markup_from_bytes(b"<svg/>").unwrap(), "<svg/>");
    }

    #[test]
    fn gzip_bytes_are_decompressed() {
        let packed = gzip(b"<svg><rect/></svg>");
        assert_eq!(markup_from_bytes(&packed).unwrap(), "<svg><rect/></svg>");
    }

    #[test]
    fn reader_is_fully_buffered() {
        let out = markup_from_reader(&b"<svg/>"[..]).unwrap();
        assert_eq!(out, "<svg/>");
    }

    #[test]
    fn invalid_utf8_is_an_error() {
        assert!(markup_from_bytes(&[0xff, 0xfe, 0x00]).is_err());
    }

    #[test]
    fn markup_detection() {
        assert!(looks_like_markup("<svg xmlns=\"x\"/>"));
        assert!(looks_like_markup("  \n<svg/>"));
        assert!(looks_like_markup("<?xml version=\"1.0\"?><svg/>"));
        assert!(looks_like_markup("<!DOCTYPE svg><svg/>"));
        assert!(!looks_like_markup("image.svg"));
        assert!(!looks_like_markup("<html/>"));
    }
}
