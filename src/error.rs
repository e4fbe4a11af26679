use thiserror::Error;

#[derive(Debug, Error)]
pub enum SvoptError {
    #[error("XML parsing error: {0}")]
    XmlParse(#[from] quick_xml::Error),

    #[error("invalid SVG: {0}")]
    InvalidSvg(String),

    #[error("invalid path data: {0}")]
    InvalidPath(String),

    #[error("unknown transformation: {0}")]
    UnknownPlugin(String),

    #[error("invalid parameters for {plugin}: {reason}")]
    InvalidParams { plugin: String, reason: String },

    #[error("invalid plugin descriptor: {0}")]
    Descriptor(#[from] serde_json::Error),

    #[error("optimization failed: {0}")]
    Optimize(#[source] Box<SvoptError>),

    #[error("fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("no SVG files matched {0}")]
    NoInput(String),

    #[error("thumbnail export failed: {0}")]
    Thumbnail(String),

    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("UTF-8 error: {0}")]
    FromUtf8(#[from] std::string::FromUtf8Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SvoptError {
    /// Wrap any underlying failure as an engine-level "optimization failed".
    pub(crate) fn into_engine_failure(self) -> SvoptError {
        match self {
            SvoptError::Optimize(_) => self,
            other => SvoptError::Optimize(Box::new(other)),
        }
    }
}
