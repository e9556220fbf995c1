//! Error types.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure to turn the text of a map or tileset document into the document model.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The bytes are not valid UTF-8.
    #[error("document is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    /// XML syntax error.
    #[error("XML error: {0}")]
    Xml(#[from] roxmltree::Error),
    /// The root element is not the one expected for this kind of document.
    #[error("expected <{expected}> root element, found <{found}>")]
    UnexpectedRoot {
        /// Tag that was expected.
        expected: &'static str,
        /// Tag that was found.
        found: String,
    },
    /// A required attribute is absent.
    #[error("<{tag}> is missing required attribute '{attribute}'")]
    MissingAttribute {
        /// Element carrying the attribute.
        tag: String,
        /// Attribute name.
        attribute: &'static str,
    },
    /// An attribute value could not be parsed into its type.
    #[error("<{tag}> has invalid value '{value}' for attribute '{attribute}'")]
    InvalidAttribute {
        /// Element carrying the attribute.
        tag: String,
        /// Attribute name.
        attribute: &'static str,
        /// Raw value.
        value: String,
    },
    /// A required child element is absent.
    #[error("<{tag}> is missing required <{child}> element")]
    MissingElement {
        /// Parent element.
        tag: String,
        /// Missing child.
        child: &'static str,
    },
    /// A grid token is not a non-negative integer.
    #[error("invalid tile id '{token}' in row {row}")]
    InvalidGridToken {
        /// Zero-based row (after blank lines are skipped).
        row: usize,
        /// Offending token.
        token: String,
    },
    /// A polygon token is not an `x,y` pair of numbers.
    #[error("invalid polygon point '{0}'")]
    InvalidPoint(String),
    /// Layer data uses an encoding or compression other than plain CSV.
    #[error("unsupported layer data encoding '{0}'")]
    UnsupportedEncoding(String),
    /// More than one of `<point>`, `<ellipse>` and `<polygon>` is present on one object.
    #[error("object {object} declares more than one shape")]
    AmbiguousShape {
        /// Id of the offending object.
        object: u32,
    },
}

/// Errors surfaced while loading or using a map.
#[derive(Debug, Error)]
pub enum MapError {
    /// The root map document could not be fetched.
    #[error("I/O error reading {path}: {source}")]
    Io {
        /// Path handed to the byte source.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },
    /// A map or tileset document could not be decoded.
    #[error("malformed document {path}: {source}")]
    MalformedDocument {
        /// Document path.
        path: PathBuf,
        /// What went wrong.
        source: DecodeError,
    },
    /// A referenced tileset could not be fetched.
    #[error("tileset {path} unavailable: {source}")]
    TileSetUnavailable {
        /// Resolved tileset path.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },
    /// A layer's grid does not match its declared width and height.
    #[error("invalid layer size for layer '{layer}': expected {expected:?}, found {found:?}")]
    InvalidLayerSize {
        /// Layer name.
        layer: String,
        /// Declared `(width, height)`.
        expected: (usize, usize),
        /// Decoded `(columns, rows)`; columns is the first mismatching row length.
        found: (usize, usize),
    },
    /// The texture collaborator failed to produce a texture.
    #[error("failed to load texture {path}: {reason}")]
    Texture {
        /// Resolved image path.
        path: PathBuf,
        /// Loader-provided message.
        reason: String,
    },
    /// Loader configuration is unusable.
    #[error("invalid configuration: {0}")]
    Config(String),
    /// Loader configuration text is not valid JSON for [`crate::LoaderConfig`].
    #[error("failed to parse configuration: {0}")]
    ConfigJson(#[from] serde_json::Error),
}
