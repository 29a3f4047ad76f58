//! Binary peak-array decoding shared by the mzML and mzXML readers
//!
//! Both formats store numerical arrays as Base64 text, optionally zlib-compressed.
//! The decoding pipeline is:
//!
//! 1. Base64 decode the text
//! 2. Decompress if needed (zlib)
//! 3. Interpret bytes as float32 or float64 in the declared byte order
//!
//! mzML is always little-endian; mzXML declares `byteOrder="network"` (big-endian).

use std::io::{Cursor, Read};

use base64::prelude::*;
use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use flate2::read::ZlibDecoder;

/// Compression applied to a binary array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionType {
    /// No compression (raw binary)
    #[default]
    None,
    /// zlib compression
    Zlib,
}

/// Numerical precision of a binary array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BinaryEncoding {
    /// 32-bit floating point
    Float32,
    /// 64-bit floating point
    #[default]
    Float64,
}

impl BinaryEncoding {
    /// Get the byte size per value
    pub fn byte_size(&self) -> usize {
        match self {
            BinaryEncoding::Float32 => 4,
            BinaryEncoding::Float64 => 8,
        }
    }
}

/// Byte order of the encoded floats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ByteOrder {
    /// Little-endian (mzML)
    #[default]
    LittleEndian,
    /// Big-endian, called "network" order in mzXML
    BigEndian,
}

/// Errors that can occur during binary decoding
#[derive(Debug, thiserror::Error)]
pub enum BinaryDecodeError {
    /// Text is not valid Base64
    #[error("Base64 decode error: {0}")]
    Base64Error(#[from] base64::DecodeError),

    /// zlib stream is corrupt or truncated
    #[error("Decompression error: {0}")]
    DecompressionError(#[from] std::io::Error),

    /// Decoded value count does not match the declared count
    #[error("Invalid data length: expected {expected}, got {actual}")]
    InvalidLength {
        /// Declared or implied length
        expected: usize,
        /// Actual length
        actual: usize,
    },
}

/// Decoder for Base64 binary arrays
pub struct BinaryDecoder;

impl BinaryDecoder {
    /// Decode a Base64-encoded binary array
    ///
    /// # Arguments
    /// * `base64_data` - The Base64 text content of the array element
    /// * `encoding` - The numerical precision (32 or 64 bit)
    /// * `compression` - The compression type
    /// * `byte_order` - Byte order of the encoded floats
    /// * `expected_length` - Expected number of values, if declared
    pub fn decode(
        base64_data: &str,
        encoding: BinaryEncoding,
        compression: CompressionType,
        byte_order: ByteOrder,
        expected_length: Option<usize>,
    ) -> Result<Vec<f64>, BinaryDecodeError> {
        let trimmed = base64_data.trim();
        let values = if trimmed.is_empty() {
            Vec::new()
        } else {
            let decoded_bytes = BASE64_STANDARD.decode(trimmed)?;

            let uncompressed = match compression {
                CompressionType::None => decoded_bytes,
                CompressionType::Zlib => {
                    let mut decoder = ZlibDecoder::new(&decoded_bytes[..]);
                    let mut uncompressed = Vec::new();
                    decoder.read_to_end(&mut uncompressed)?;
                    uncompressed
                }
            };

            match byte_order {
                ByteOrder::LittleEndian => {
                    Self::bytes_to_floats::<LittleEndian>(&uncompressed, encoding)?
                }
                ByteOrder::BigEndian => Self::bytes_to_floats::<BigEndian>(&uncompressed, encoding)?,
            }
        };

        if let Some(expected) = expected_length {
            if values.len() != expected {
                return Err(BinaryDecodeError::InvalidLength {
                    expected,
                    actual: values.len(),
                });
            }
        }

        Ok(values)
    }

    /// Convert raw bytes to f64 values
    fn bytes_to_floats<B: byteorder::ByteOrder>(
        bytes: &[u8],
        encoding: BinaryEncoding,
    ) -> Result<Vec<f64>, BinaryDecodeError> {
        let byte_size = encoding.byte_size();

        if bytes.len() % byte_size != 0 {
            return Err(BinaryDecodeError::InvalidLength {
                expected: bytes.len() / byte_size * byte_size,
                actual: bytes.len(),
            });
        }

        let count = bytes.len() / byte_size;
        let mut values = Vec::with_capacity(count);
        let mut cursor = Cursor::new(bytes);

        match encoding {
            BinaryEncoding::Float32 => {
                for _ in 0..count {
                    values.push(f64::from(cursor.read_f32::<B>()?));
                }
            }
            BinaryEncoding::Float64 => {
                for _ in 0..count {
                    values.push(cursor.read_f64::<B>()?);
                }
            }
        }

        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_float64_little_endian() {
        // 100.0 = 0x4059000000000000, 200.0 = 0x4069000000000000
        let bytes: [u8; 16] = [
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x59, 0x40, // 100.0
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x69, 0x40, // 200.0
        ];
        let base64_data = BASE64_STANDARD.encode(bytes);

        let result = BinaryDecoder::decode(
            &base64_data,
            BinaryEncoding::Float64,
            CompressionType::None,
            ByteOrder::LittleEndian,
            Some(2),
        )
        .unwrap();

        assert_eq!(result, vec![100.0, 200.0]);
    }

    #[test]
    fn test_decode_float32_network_order() {
        let bytes: [u8; 8] = [
            0x42, 0xc8, 0x00, 0x00, // 100.0
            0x43, 0x48, 0x00, 0x00, // 200.0
        ];
        let base64_data = BASE64_STANDARD.encode(bytes);

        let result = BinaryDecoder::decode(
            &base64_data,
            BinaryEncoding::Float32,
            CompressionType::None,
            ByteOrder::BigEndian,
            None,
        )
        .unwrap();

        assert_eq!(result, vec![100.0, 200.0]);
    }

    #[test]
    fn test_decode_empty() {
        let result = BinaryDecoder::decode(
            "",
            BinaryEncoding::Float64,
            CompressionType::None,
            ByteOrder::LittleEndian,
            Some(0),
        )
        .unwrap();

        assert!(result.is_empty());
    }

    #[test]
    fn test_decode_zlib_compressed_big_endian() {
        use flate2::write::ZlibEncoder;
        use flate2::Compression;
        use std::io::Write;

        let values: Vec<f64> = vec![100.0, 200.0, 300.0, 400.0];
        let mut bytes = Vec::new();
        for v in &values {
            bytes.extend_from_slice(&v.to_be_bytes());
        }

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&bytes).unwrap();
        let compressed = encoder.finish().unwrap();
        let base64_data = BASE64_STANDARD.encode(&compressed);

        let result = BinaryDecoder::decode(
            &base64_data,
            BinaryEncoding::Float64,
            CompressionType::Zlib,
            ByteOrder::BigEndian,
            Some(4),
        )
        .unwrap();

        assert_eq!(result, values);
    }

    #[test]
    fn test_decode_length_errors() {
        let base64_data = BASE64_STANDARD.encode([0u8; 6]);
        assert!(matches!(
            BinaryDecoder::decode(
                &base64_data,
                BinaryEncoding::Float32,
                CompressionType::None,
                ByteOrder::LittleEndian,
                None,
            ),
            Err(BinaryDecodeError::InvalidLength { .. })
        ));

        let base64_data = BASE64_STANDARD.encode(1.0f64.to_le_bytes());
        assert!(matches!(
            BinaryDecoder::decode(
                &base64_data,
                BinaryEncoding::Float64,
                CompressionType::None,
                ByteOrder::LittleEndian,
                Some(3),
            ),
            Err(BinaryDecodeError::InvalidLength {
                expected: 3,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_decode_invalid_base64() {
        assert!(matches!(
            BinaryDecoder::decode(
                "not base64!!",
                BinaryEncoding::Float64,
                CompressionType::None,
                ByteOrder::LittleEndian,
                None,
            ),
            Err(BinaryDecodeError::Base64Error(_))
        ));
    }
}
