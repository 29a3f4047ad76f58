use crate::binary::BinaryDecodeError;

/// Errors that can occur during mzXML parsing
#[derive(Debug, thiserror::Error)]
pub enum MzXMLError {
    /// Error parsing XML
    #[error("XML parsing error: {0}")]
    XmlError(#[from] quick_xml::Error),

    /// I/O error during file operations
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error decoding the peaks element
    #[error("Binary decode error: {0}")]
    BinaryError(#[from] BinaryDecodeError),

    /// Invalid mzXML document structure
    #[error("Invalid mzXML structure: {0}")]
    InvalidStructure(String),

    /// Required XML attribute is missing
    #[error("Missing required attribute: {0}")]
    MissingAttribute(String),

    /// Invalid value for an XML attribute
    #[error("Invalid value {value:?} for attribute {attribute}")]
    InvalidAttributeValue {
        /// Attribute name
        attribute: String,
        /// Offending value
        value: String,
    },

    /// UTF-8 encoding error in text content
    #[error("UTF-8 encoding error: {0}")]
    Utf8Error(#[from] std::str::Utf8Error),
}

impl MzXMLError {
    pub(super) fn invalid(attribute: &str, value: &str) -> Self {
        MzXMLError::InvalidAttributeValue {
            attribute: attribute.to_string(),
            value: value.to_string(),
        }
    }
}
