//! Streaming mzML parser using quick-xml
//!
//! Pull-based parser over the `spectrumList` of an mzML file. Everything before the
//! spectrum list (file description, software, instrument configuration) is skipped.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::cv_params::{normalize_retention_time, CvParam, MS_CV_ACCESSIONS};
use super::models::{MzMLSpectrum, Precursor};
use crate::binary::{BinaryDecodeError, BinaryDecoder, BinaryEncoding, ByteOrder, CompressionType};
use crate::input::DEFAULT_INPUT_BUFFER_SIZE;
use crate::scan::RawScan;

/// Errors that can occur during mzML parsing
#[derive(Debug, thiserror::Error)]
pub enum MzMLError {
    /// Error parsing XML
    #[error("XML parsing error: {0}")]
    XmlError(#[from] quick_xml::Error),

    /// I/O error during file operations
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error decoding binary data arrays
    #[error("Binary decode error: {0}")]
    BinaryError(#[from] BinaryDecodeError),

    /// Invalid mzML document structure
    #[error("Invalid mzML structure: {0}")]
    InvalidStructure(String),

    /// UTF-8 encoding error in text content
    #[error("UTF-8 encoding error: {0}")]
    Utf8Error(#[from] std::str::Utf8Error),
}

/// Streaming parser for mzML files
pub struct MzMLStreamer<R: BufRead> {
    reader: Reader<R>,
    in_spectrum_list: bool,
    finished: bool,
    spectrum_count: Option<usize>,
    current_spectrum_index: i64,
}

impl MzMLStreamer<BufReader<File>> {
    /// Open an mzML file for streaming
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, MzMLError> {
        let file = File::open(path.as_ref())?;
        let reader = BufReader::with_capacity(DEFAULT_INPUT_BUFFER_SIZE, file);
        Self::new(reader)
    }
}

impl<R: BufRead> MzMLStreamer<R> {
    /// Create a new streamer from a BufRead source
    pub fn new(reader: R) -> Result<Self, MzMLError> {
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.config_mut().trim_text(true);

        Ok(Self {
            reader: xml_reader,
            in_spectrum_list: false,
            finished: false,
            spectrum_count: None,
            current_spectrum_index: 0,
        })
    }

    /// Spectrum count declared on `spectrumList`, once it has been reached
    pub fn spectrum_count(&self) -> Option<usize> {
        self.spectrum_count
    }

    /// Advance to the start of `spectrumList`
    fn seek_spectrum_list(&mut self) -> Result<(), MzMLError> {
        let mut buf = Vec::new();
        loop {
            match self.reader.read_event_into(&mut buf)? {
                Event::Start(ref e) if e.name().as_ref() == b"spectrumList" => {
                    self.in_spectrum_list = true;
                    self.spectrum_count =
                        get_attribute(e, "count")?.and_then(|s| s.parse().ok());
                    return Ok(());
                }
                Event::Eof => {
                    self.finished = true;
                    return Ok(());
                }
                _ => {}
            }
            buf.clear();
        }
    }

    /// Read the next spectrum from the stream
    pub fn next_spectrum(&mut self) -> Result<Option<MzMLSpectrum>, MzMLError> {
        if self.finished {
            return Ok(None);
        }
        if !self.in_spectrum_list {
            self.seek_spectrum_list()?;
            if !self.in_spectrum_list {
                return Ok(None);
            }
        }

        let mut buf = Vec::new();
        loop {
            match self.reader.read_event_into(&mut buf)? {
                Event::Start(ref e) if e.name().as_ref() == b"spectrum" => {
                    let spectrum = self.parse_spectrum(e)?;
                    self.current_spectrum_index += 1;
                    return Ok(Some(spectrum));
                }
                Event::End(ref e) if e.name().as_ref() == b"spectrumList" => {
                    self.in_spectrum_list = false;
                    self.finished = true;
                    return Ok(None);
                }
                Event::Eof => {
                    self.finished = true;
                    return Ok(None);
                }
                _ => {}
            }
            buf.clear();
        }
    }

    /// Iterate over all spectra
    pub fn spectra(self) -> SpectrumIterator<R> {
        SpectrumIterator { streamer: self }
    }

    /// Iterate over all spectra converted to [`RawScan`] records
    pub fn scans(self) -> impl Iterator<Item = Result<RawScan, MzMLError>> {
        self.spectra().map(|spectrum| spectrum.map(RawScan::from))
    }

    /// Parse a single spectrum element
    fn parse_spectrum(&mut self, start_event: &BytesStart) -> Result<MzMLSpectrum, MzMLError> {
        let mut spectrum = MzMLSpectrum {
            index: get_attribute(start_event, "index")?
                .and_then(|s| s.parse().ok())
                .unwrap_or(self.current_spectrum_index),
            id: get_attribute(start_event, "id")?.unwrap_or_default(),
            default_array_length: get_attribute(start_event, "defaultArrayLength")?
                .and_then(|s| s.parse().ok())
                .unwrap_or(0),
            ..Default::default()
        };

        let mut depth = 1;
        let mut in_scan_list = false;
        let mut in_precursor_list = false;
        let mut current_precursor: Option<Precursor> = None;
        let mut current_binary_array: Option<BinaryArrayContext> = None;
        let mut buf = Vec::new();

        loop {
            match self.reader.read_event_into(&mut buf)? {
                Event::Start(ref e) => {
                    depth += 1;
                    match e.name().as_ref() {
                        b"scanList" => in_scan_list = true,
                        b"precursorList" => in_precursor_list = true,
                        b"precursor" => {
                            current_precursor = Some(Precursor::default());
                        }
                        b"binaryDataArray" => {
                            current_binary_array = Some(BinaryArrayContext::default());
                        }
                        _ => {}
                    }
                }
                Event::Empty(ref e) => {
                    if e.name().as_ref() == b"cvParam" {
                        let cv_param = parse_cv_param(e)?;

                        if let Some(ref mut ctx) = current_binary_array {
                            ctx.cv_params.push(cv_param);
                        } else if in_precursor_list {
                            if let Some(ref mut prec) = current_precursor {
                                Self::apply_precursor_cv_param(prec, &cv_param);
                            }
                        } else if in_scan_list {
                            Self::apply_scan_cv_param(&mut spectrum, &cv_param);
                        } else {
                            Self::apply_spectrum_cv_param(&mut spectrum, &cv_param);
                        }
                    }
                }
                Event::Text(ref t) => {
                    if let Some(ref mut ctx) = current_binary_array {
                        ctx.base64_data = t.unescape()?.into_owned();
                    }
                }
                Event::End(ref e) => {
                    depth -= 1;
                    match e.name().as_ref() {
                        b"spectrum" if depth == 0 => break,
                        b"scanList" => in_scan_list = false,
                        b"precursorList" => in_precursor_list = false,
                        b"precursor" => {
                            if let Some(prec) = current_precursor.take() {
                                spectrum.precursors.push(prec);
                            }
                        }
                        b"binaryDataArray" => {
                            if let Some(ctx) = current_binary_array.take() {
                                Self::decode_binary_array(&mut spectrum, ctx)?;
                            }
                        }
                        _ => {}
                    }
                }
                Event::Eof => {
                    return Err(MzMLError::InvalidStructure(
                        "Unexpected EOF in spectrum".to_string(),
                    ));
                }
                _ => {}
            }
            buf.clear();
        }

        Ok(spectrum)
    }

    /// Apply CV param to spectrum properties
    fn apply_spectrum_cv_param(spectrum: &mut MzMLSpectrum, cv: &CvParam) {
        if cv.accession == MS_CV_ACCESSIONS::MS_LEVEL {
            spectrum.ms_level = cv.value_as_i64().and_then(|v| u8::try_from(v).ok());
        }
    }

    /// Apply CV param to scan properties
    fn apply_scan_cv_param(spectrum: &mut MzMLSpectrum, cv: &CvParam) {
        match cv.accession.as_str() {
            MS_CV_ACCESSIONS::SCAN_START_TIME => {
                if let Some(val) = cv.value_as_f64() {
                    spectrum.retention_time =
                        Some(normalize_retention_time(val, cv.unit_accession.as_deref()));
                }
            }
            _ => Self::apply_spectrum_cv_param(spectrum, cv),
        }
    }

    /// Apply CV param to precursor properties
    fn apply_precursor_cv_param(precursor: &mut Precursor, cv: &CvParam) {
        match cv.accession.as_str() {
            MS_CV_ACCESSIONS::ISOLATION_WINDOW_TARGET_MZ => {
                precursor.isolation_window_target = cv.value_as_f64();
            }
            MS_CV_ACCESSIONS::SELECTED_ION_MZ => {
                precursor.selected_ion_mz = cv.value_as_f64();
            }
            MS_CV_ACCESSIONS::PEAK_INTENSITY => {
                precursor.selected_ion_intensity = cv.value_as_f64();
            }
            MS_CV_ACCESSIONS::CHARGE_STATE => {
                precursor.selected_ion_charge =
                    cv.value_as_i64().and_then(|v| i16::try_from(v).ok());
            }
            _ => {}
        }
    }

    /// Decode binary array and add to spectrum
    fn decode_binary_array(
        spectrum: &mut MzMLSpectrum,
        ctx: BinaryArrayContext,
    ) -> Result<(), MzMLError> {
        let mut encoding = BinaryEncoding::Float64;
        let mut compression = CompressionType::None;
        let mut is_mz = false;
        let mut is_intensity = false;

        for cv in &ctx.cv_params {
            match cv.accession.as_str() {
                MS_CV_ACCESSIONS::FLOAT_32_BIT => encoding = BinaryEncoding::Float32,
                MS_CV_ACCESSIONS::FLOAT_64_BIT => encoding = BinaryEncoding::Float64,
                MS_CV_ACCESSIONS::ZLIB_COMPRESSION => compression = CompressionType::Zlib,
                MS_CV_ACCESSIONS::NO_COMPRESSION => compression = CompressionType::None,
                MS_CV_ACCESSIONS::MZ_ARRAY => is_mz = true,
                MS_CV_ACCESSIONS::INTENSITY_ARRAY => is_intensity = true,
                _ => {}
            }
        }

        if !is_mz && !is_intensity {
            return Ok(());
        }

        let values = BinaryDecoder::decode(
            &ctx.base64_data,
            encoding,
            compression,
            ByteOrder::LittleEndian,
            Some(spectrum.default_array_length),
        )?;

        if is_mz {
            spectrum.mz_array = Some(values);
        } else {
            spectrum.intensity_array = Some(values);
        }

        Ok(())
    }
}

/// Context for parsing a binary data array
#[derive(Default)]
struct BinaryArrayContext {
    cv_params: Vec<CvParam>,
    base64_data: String,
}

/// Iterator over spectra in an mzML file
pub struct SpectrumIterator<R: BufRead> {
    streamer: MzMLStreamer<R>,
}

impl<R: BufRead> Iterator for SpectrumIterator<R> {
    type Item = Result<MzMLSpectrum, MzMLError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.streamer.next_spectrum() {
            Ok(Some(spectrum)) => Some(Ok(spectrum)),
            Ok(None) => None,
            Err(e) => {
                self.streamer.finished = true;
                Some(Err(e))
            }
        }
    }
}

/// Helper function to get an attribute value from a BytesStart
fn get_attribute(e: &BytesStart, name: &str) -> Result<Option<String>, MzMLError> {
    for attr in e.attributes() {
        let attr = attr.map_err(|e| MzMLError::XmlError(quick_xml::Error::from(e)))?;
        if attr.key.as_ref() == name.as_bytes() {
            let value = std::str::from_utf8(&attr.value)?.to_string();
            return Ok(Some(value));
        }
    }
    Ok(None)
}

/// Parse a cvParam element
fn parse_cv_param(e: &BytesStart) -> Result<CvParam, MzMLError> {
    Ok(CvParam {
        accession: get_attribute(e, "accession")?.unwrap_or_default(),
        name: get_attribute(e, "name")?.unwrap_or_default(),
        value: get_attribute(e, "value")?,
        unit_accession: get_attribute(e, "unitAccession")?,
    })
}
