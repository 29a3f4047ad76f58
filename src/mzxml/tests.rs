use std::io::{BufReader, Cursor};

use super::*;
use crate::scan::RawScan;

const NESTED_MZXML: &str = r#"<?xml version="1.0" encoding="ISO-8859-1"?>
<mzXML xmlns="http://sashimi.sourceforge.net/schema_revision/mzXML_3.2">
  <msRun scanCount="3" startTime="PT60S" endTime="PT90S">
    <parentFile fileName="run.raw" fileType="RAWData" fileSha1="0"/>
    <scan num="1" msLevel="1" peaksCount="2" polarity="+" retentionTime="PT60S">
      <peaks precision="32" byteOrder="network" pairOrder="m/z-int">QsgAAER6AABDSAAARPoAAA==</peaks>
      <scan num="2" msLevel="2" peaksCount="2" retentionTime="PT1M1S">
        <precursorMz precursorIntensity="12000.5" precursorCharge="2" activationMethod="CID">445.25</precursorMz>
        <peaks precision="64" byteOrder="network" contentType="m/z-int">QHvUAAAAAABASQAAAAAAAEB/SAAAAAAAQFLAAAAAAAA=</peaks>
      </scan>
    </scan>
    <scan num="3" msLevel="1" peaksCount="2" retentionTime="PT1M30S">
      <peaks precision="32" byteOrder="network" compressionType="zlib" compressedLen="23" pairOrder="m/z-int">eJxzOsHA4FLFwODsAaR/MTAAACBkA5I=</peaks>
    </scan>
  </msRun>
  <index name="scan"><offset id="1">0</offset></index>
</mzXML>"#;

fn streamer(xml: &str) -> MzXMLStreamer<BufReader<Cursor<&str>>> {
    MzXMLStreamer::new(BufReader::new(Cursor::new(xml))).unwrap()
}

fn read_all(xml: &str) -> Vec<RawScan> {
    streamer(xml).scans().collect::<Result<_, _>>().unwrap()
}

fn wrap(scans: &str) -> String {
    format!(r#"<mzXML><msRun scanCount="1">{scans}</msRun></mzXML>"#)
}

#[test]
fn test_nested_scans_in_document_order() {
    let scans = read_all(NESTED_MZXML);

    let numbers: Vec<_> = scans.iter().map(|s| s.scan_number).collect();
    assert_eq!(numbers, vec![Some(1), Some(2), Some(3)]);
    let levels: Vec<_> = scans.iter().map(|s| s.ms_level).collect();
    assert_eq!(levels, vec![1, 2, 1]);
}

#[test]
fn test_retention_time_durations() {
    let scans = read_all(NESTED_MZXML);
    assert_eq!(scans[0].retention_time, Some(60.0));
    assert_eq!(scans[1].retention_time, Some(61.0));
    assert_eq!(scans[2].retention_time, Some(90.0));
}

#[test]
fn test_network_order_peaks() {
    let scans = read_all(NESTED_MZXML);

    assert_eq!(scans[0].mz_array, Some(vec![100.0, 200.0]));
    assert_eq!(scans[0].intensity_array, Some(vec![1000.0, 2000.0]));

    assert_eq!(scans[1].mz_array, Some(vec![445.25, 500.5]));
    assert_eq!(scans[1].intensity_array, Some(vec![50.0, 75.0]));
}

#[test]
fn test_zlib_peaks() {
    let scans = read_all(NESTED_MZXML);
    assert_eq!(scans[2].mz_array, Some(vec![100.0, 200.0]));
    assert_eq!(scans[2].intensity_array, Some(vec![1000.0, 2000.0]));
}

#[test]
fn test_precursor_attributes() {
    let scans = read_all(NESTED_MZXML);

    assert!(scans[0].precursors.is_empty());
    assert_eq!(scans[1].precursors.len(), 1);
    let precursor = scans[1].precursors[0];
    assert_eq!(precursor.mz, 445.25);
    assert_eq!(precursor.charge, Some(2));
    assert_eq!(precursor.intensity, Some(12000.5));
}

#[test]
fn test_scan_count_and_progress() {
    let mut streamer = streamer(NESTED_MZXML);
    assert_eq!(streamer.scan_count(), None);

    streamer.next_scan().unwrap();
    assert_eq!(streamer.scan_count(), Some(3));
    assert_eq!(streamer.scans_read(), 1);

    while streamer.next_scan().unwrap().is_some() {}
    assert_eq!(streamer.scans_read(), 3);
    assert!(streamer.next_scan().unwrap().is_none());
}

#[test]
fn test_little_endian_peaks() {
    let xml = wrap(
        r#"<scan num="1" msLevel="1" peaksCount="1" retentionTime="PT1S">
          <peaks precision="32" byteOrder="little">AAAWQwAAlkM=</peaks>
        </scan>"#,
    );
    let scans = read_all(&xml);
    assert_eq!(scans[0].mz_array, Some(vec![150.0]));
    assert_eq!(scans[0].intensity_array, Some(vec![300.0]));
}

#[test]
fn test_empty_peaks_and_missing_peaks() {
    let xml = wrap(
        r#"<scan num="1" msLevel="1" peaksCount="0" retentionTime="PT1S">
          <peaks precision="32" byteOrder="network" pairOrder="m/z-int"/>
        </scan>
        <scan num="2" msLevel="1" retentionTime="PT2S"></scan>"#,
    );
    let scans = read_all(&xml);
    assert_eq!(scans.len(), 2);
    assert_eq!(scans[0].mz_array, Some(Vec::new()));
    assert_eq!(scans[0].intensity_array, Some(Vec::new()));
    assert_eq!(scans[1].mz_array, None);
    assert_eq!(scans[1].peak_count(), 0);
}

#[test]
fn test_self_closing_nested_scan() {
    let xml = wrap(
        r#"<scan num="1" msLevel="1" retentionTime="PT1S">
          <scan num="2" msLevel="2" retentionTime="PT2S"/>
          <scan num="3" msLevel="2" retentionTime="PT3S"/>
        </scan>"#,
    );
    let numbers: Vec<_> = read_all(&xml).iter().map(|s| s.scan_number).collect();
    assert_eq!(numbers, vec![Some(1), Some(2), Some(3)]);
}

#[test]
fn test_missing_retention_time() {
    let xml = wrap(r#"<scan num="1" msLevel="1"></scan>"#);
    assert_eq!(read_all(&xml)[0].retention_time, None);
}

#[test]
fn test_missing_ms_level() {
    let xml = wrap(r#"<scan num="1" retentionTime="PT1S"></scan>"#);
    let err = streamer(&xml).next_scan().unwrap_err();
    assert!(matches!(err, MzXMLError::MissingAttribute(ref name) if name == "msLevel"));
}

#[test]
fn test_invalid_retention_time() {
    let xml = wrap(r#"<scan num="1" msLevel="1" retentionTime="soon"></scan>"#);
    let err = streamer(&xml).next_scan().unwrap_err();
    assert!(matches!(
        err,
        MzXMLError::InvalidAttributeValue { ref attribute, .. } if attribute == "retentionTime"
    ));
}

#[test]
fn test_peaks_count_mismatch() {
    let xml = wrap(
        r#"<scan num="1" msLevel="1" peaksCount="3" retentionTime="PT1S">
          <peaks precision="32">AAAWQwAAlkM=</peaks>
        </scan>"#,
    );
    let err = streamer(&xml).next_scan().unwrap_err();
    assert!(matches!(err, MzXMLError::BinaryError(_)));
}

#[test]
fn test_odd_value_count() {
    let xml = wrap(
        r#"<scan num="1" msLevel="1" retentionTime="PT1S">
          <peaks precision="32">P4AAAEAAAABAQAAA</peaks>
        </scan>"#,
    );
    let err = streamer(&xml).next_scan().unwrap_err();
    assert!(matches!(err, MzXMLError::InvalidStructure(_)));
}

#[test]
fn test_unsupported_pair_order() {
    let xml = wrap(
        r#"<scan num="1" msLevel="1" retentionTime="PT1S">
          <peaks precision="32" contentType="int-m/z">AAAWQwAAlkM=</peaks>
        </scan>"#,
    );
    assert!(streamer(&xml).next_scan().is_err());
}

#[test]
fn test_truncated_scan_is_an_error() {
    let xml = r#"<mzXML><msRun><scan num="1" msLevel="1" retentionTime="PT1S">"#;
    let mut iter = streamer(xml).scans();
    assert!(matches!(iter.next(), Some(Err(_))));
    assert!(iter.next().is_none());
}

#[test]
fn test_document_without_scans() {
    let xml = r#"<mzXML><msRun scanCount="0"></msRun></mzXML>"#;
    assert!(streamer(xml).next_scan().unwrap().is_none());
}
