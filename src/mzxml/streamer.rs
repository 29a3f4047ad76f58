//! Streaming mzXML parser using quick-xml

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::debug;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::duration::parse_duration;
use super::MzXMLError;
use crate::binary::{BinaryDecoder, BinaryEncoding, ByteOrder, CompressionType};
use crate::input::DEFAULT_INPUT_BUFFER_SIZE;
use crate::scan::{PrecursorEntry, RawScan};

/// Encoding attributes of a `<peaks>` element
#[derive(Debug, Clone, Copy, PartialEq)]
struct PeaksEncoding {
    encoding: BinaryEncoding,
    byte_order: ByteOrder,
    compression: CompressionType,
}

/// Element whose text content is being collected
#[derive(Debug)]
enum TextTarget {
    PrecursorMz {
        charge: Option<i16>,
        intensity: Option<f64>,
    },
    Peaks(PeaksEncoding),
}

/// A `<scan>` element that has been opened but not yet emitted
#[derive(Debug)]
struct OpenScan {
    scan: RawScan,
    peaks_count: Option<usize>,
}

/// Streaming parser for mzXML files.
///
/// Scans are produced in document order. A scan nested inside another (the usual
/// layout for MS2 scans under their MS1 survey scan) is emitted after its parent.
pub struct MzXMLStreamer<R: BufRead> {
    reader: Reader<R>,
    /// One slot per open `<scan>`; `None` once that scan has been emitted
    open: Vec<Option<OpenScan>>,
    /// Completed scans waiting to be returned
    ready: VecDeque<RawScan>,
    text: Option<(TextTarget, String)>,
    scan_count: Option<usize>,
    scans_read: usize,
    finished: bool,
}

impl MzXMLStreamer<BufReader<File>> {
    /// Open an mzXML file for streaming
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, MzXMLError> {
        let file = File::open(path.as_ref())?;
        let reader = BufReader::with_capacity(DEFAULT_INPUT_BUFFER_SIZE, file);
        Self::new(reader)
    }
}

impl<R: BufRead> MzXMLStreamer<R> {
    /// Create a new streamer from a BufRead source
    pub fn new(reader: R) -> Result<Self, MzXMLError> {
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.config_mut().trim_text(true);

        Ok(Self {
            reader: xml_reader,
            open: Vec::new(),
            ready: VecDeque::new(),
            text: None,
            scan_count: None,
            scans_read: 0,
            finished: false,
        })
    }

    /// Scan count declared on `msRun`, once it has been read
    pub fn scan_count(&self) -> Option<usize> {
        self.scan_count
    }

    /// Number of scans emitted so far
    pub fn scans_read(&self) -> usize {
        self.scans_read
    }

    /// Read the next scan from the stream
    pub fn next_scan(&mut self) -> Result<Option<RawScan>, MzXMLError> {
        loop {
            if let Some(scan) = self.ready.pop_front() {
                self.scans_read += 1;
                return Ok(Some(scan));
            }
            if self.finished {
                return Ok(None);
            }
            self.advance()?;
        }
    }

    /// Consume events until at least one scan is complete or the run ends
    fn advance(&mut self) -> Result<(), MzXMLError> {
        let mut buf = Vec::new();
        while self.ready.is_empty() {
            match self.reader.read_event_into(&mut buf)? {
                Event::Start(ref e) => self.handle_start(e)?,
                Event::Empty(ref e) => self.handle_empty(e)?,
                Event::Text(ref t) => {
                    if let Some((_, ref mut content)) = self.text {
                        content.push_str(&t.unescape()?);
                    }
                }
                Event::End(ref e) => self.handle_end(e.name().as_ref())?,
                Event::Eof => {
                    self.finished = true;
                    if !self.open.is_empty() {
                        return Err(MzXMLError::InvalidStructure(
                            "Unexpected EOF inside scan".to_string(),
                        ));
                    }
                    return Ok(());
                }
                _ => {}
            }
            buf.clear();

            if self.finished {
                break;
            }
        }
        Ok(())
    }

    /// Iterate over all scans
    pub fn scans(self) -> ScanIterator<R> {
        ScanIterator { streamer: self }
    }

    fn handle_start(&mut self, e: &BytesStart) -> Result<(), MzXMLError> {
        match e.name().as_ref() {
            b"msRun" => {
                self.scan_count = get_attribute(e, "scanCount")?.and_then(|s| s.parse().ok());
            }
            b"scan" => {
                // The parent is complete once a child scan starts
                self.emit_parent();
                let scan = parse_scan_attributes(e)?;
                self.open.push(Some(scan));
            }
            b"precursorMz" => {
                let charge = parse_optional(e, "precursorCharge")?;
                let intensity = parse_optional(e, "precursorIntensity")?;
                self.text = Some((TextTarget::PrecursorMz { charge, intensity }, String::new()));
            }
            b"peaks" => {
                let encoding = parse_peaks_encoding(e)?;
                self.text = Some((TextTarget::Peaks(encoding), String::new()));
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_empty(&mut self, e: &BytesStart) -> Result<(), MzXMLError> {
        match e.name().as_ref() {
            b"scan" => {
                self.emit_parent();
                let scan = parse_scan_attributes(e)?;
                self.ready.push_back(scan.scan);
            }
            b"peaks" => {
                let encoding = parse_peaks_encoding(e)?;
                self.finish_peaks(encoding, "")?;
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_end(&mut self, name: &[u8]) -> Result<(), MzXMLError> {
        match name {
            b"scan" => {
                let slot = self.open.pop().ok_or_else(|| {
                    MzXMLError::InvalidStructure("unbalanced </scan>".to_string())
                })?;
                if let Some(open) = slot {
                    self.ready.push_back(open.scan);
                }
            }
            b"precursorMz" => {
                if let Some((TextTarget::PrecursorMz { charge, intensity }, text)) =
                    self.text.take()
                {
                    let mz = text
                        .trim()
                        .parse()
                        .map_err(|_| MzXMLError::invalid("precursorMz", &text))?;
                    let scan = self.top_mut("precursorMz")?;
                    scan.scan.precursors.push(PrecursorEntry {
                        mz,
                        charge,
                        intensity,
                    });
                }
            }
            b"peaks" => {
                if let Some((TextTarget::Peaks(encoding), text)) = self.text.take() {
                    self.finish_peaks(encoding, &text)?;
                }
            }
            b"msRun" => self.finished = true,
            _ => {}
        }
        Ok(())
    }

    /// Queue the innermost open scan, leaving an emitted marker in its slot
    fn emit_parent(&mut self) {
        if let Some(parent) = self.open.last_mut().and_then(Option::take) {
            self.ready.push_back(parent.scan);
        }
    }

    fn top_mut(&mut self, element: &str) -> Result<&mut OpenScan, MzXMLError> {
        match self.open.last_mut() {
            Some(Some(scan)) => Ok(scan),
            _ => Err(MzXMLError::InvalidStructure(format!(
                "<{element}> outside of an open scan"
            ))),
        }
    }

    fn finish_peaks(&mut self, encoding: PeaksEncoding, text: &str) -> Result<(), MzXMLError> {
        let scan = self.top_mut("peaks")?;
        let expected = scan.peaks_count.map(|n| n * 2);
        let values = BinaryDecoder::decode(
            text,
            encoding.encoding,
            encoding.compression,
            encoding.byte_order,
            expected,
        )?;

        if values.len() % 2 != 0 {
            return Err(MzXMLError::InvalidStructure(format!(
                "odd number of values ({}) in m/z-int pairs",
                values.len()
            )));
        }
        let (mz, intensity): (Vec<f64>, Vec<f64>) =
            values.chunks_exact(2).map(|pair| (pair[0], pair[1])).unzip();
        scan.scan.mz_array = Some(mz);
        scan.scan.intensity_array = Some(intensity);
        Ok(())
    }
}

/// Iterator over scans in an mzXML file
pub struct ScanIterator<R: BufRead> {
    streamer: MzXMLStreamer<R>,
}

impl<R: BufRead> Iterator for ScanIterator<R> {
    type Item = Result<RawScan, MzXMLError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.streamer.next_scan() {
            Ok(Some(scan)) => Some(Ok(scan)),
            Ok(None) => None,
            Err(e) => {
                self.streamer.finished = true;
                Some(Err(e))
            }
        }
    }
}

fn parse_scan_attributes(e: &BytesStart) -> Result<OpenScan, MzXMLError> {
    let ms_level = get_attribute(e, "msLevel")?
        .ok_or_else(|| MzXMLError::MissingAttribute("msLevel".to_string()))?;
    let ms_level = ms_level
        .trim()
        .parse()
        .map_err(|_| MzXMLError::invalid("msLevel", &ms_level))?;

    let retention_time = match get_attribute(e, "retentionTime")? {
        Some(text) => Some(
            parse_duration(&text).ok_or_else(|| MzXMLError::invalid("retentionTime", &text))?,
        ),
        None => None,
    };

    let scan = RawScan {
        scan_number: parse_optional(e, "num")?,
        ms_level,
        retention_time,
        ..Default::default()
    };
    debug!(
        "scan {:?}: msLevel {ms_level}, retentionTime {retention_time:?}",
        scan.scan_number
    );

    Ok(OpenScan {
        scan,
        peaks_count: parse_optional(e, "peaksCount")?,
    })
}

fn parse_peaks_encoding(e: &BytesStart) -> Result<PeaksEncoding, MzXMLError> {
    let encoding = match get_attribute(e, "precision")?.as_deref().map(str::trim) {
        None | Some("32") => BinaryEncoding::Float32,
        Some("64") => BinaryEncoding::Float64,
        Some(other) => return Err(MzXMLError::invalid("precision", other)),
    };
    let byte_order = match get_attribute(e, "byteOrder")?.as_deref().map(str::trim) {
        None | Some("network") | Some("big") => ByteOrder::BigEndian,
        Some("little") => ByteOrder::LittleEndian,
        Some(other) => return Err(MzXMLError::invalid("byteOrder", other)),
    };
    let compression = match get_attribute(e, "compressionType")?.as_deref().map(str::trim) {
        None | Some("none") => CompressionType::None,
        Some("zlib") => CompressionType::Zlib,
        Some(other) => return Err(MzXMLError::invalid("compressionType", other)),
    };

    // mzXML 2.x uses pairOrder, 3.x uses contentType
    let pair_order = match get_attribute(e, "pairOrder")? {
        Some(order) => Some(order),
        None => get_attribute(e, "contentType")?,
    };
    if let Some(order) = pair_order {
        if order.trim() != "m/z-int" {
            return Err(MzXMLError::invalid("pairOrder", &order));
        }
    }

    Ok(PeaksEncoding {
        encoding,
        byte_order,
        compression,
    })
}

/// Parse an optional attribute, failing on values that do not parse
fn parse_optional<T: std::str::FromStr>(
    e: &BytesStart,
    name: &str,
) -> Result<Option<T>, MzXMLError> {
    match get_attribute(e, name)? {
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| MzXMLError::invalid(name, &value)),
        None => Ok(None),
    }
}

/// Helper function to get an attribute value from a BytesStart
fn get_attribute(e: &BytesStart, name: &str) -> Result<Option<String>, MzXMLError> {
    for attr in e.attributes() {
        let attr = attr.map_err(|e| MzXMLError::XmlError(quick_xml::Error::from(e)))?;
        if attr.key.as_ref() == name.as_bytes() {
            let value = std::str::from_utf8(&attr.value)?.to_string();
            return Ok(Some(value));
        }
    }
    Ok(None)
}
