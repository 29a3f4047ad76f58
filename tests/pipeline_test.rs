//! Integration tests for mzxtract
//!
//! These tests write small mzXML / mzML files, load them through the public API and
//! check the traces, precursor lists and exports derived from them.

use std::fs;
use std::io::Write;
use std::path::Path;

use base64::Engine;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use tempfile::tempdir;

use mzxtract::export::{write_prm_traces, write_traces};
use mzxtract::input::{load_store, InputError};
use mzxtract::precursors::{precursors_by_intensity, unique_precursors};
use mzxtract::store::StoreError;
use mzxtract::trace::{extract_fragment, extract_prm, extract_single, SpectrumMode};

/// m/z-int pairs as base64, big-endian, 32-bit zlib-compressed or 64-bit plain
fn encode_peaks(peaks: &[(f64, f64)], precision: u8) -> String {
    let bytes: Vec<u8> = if precision == 32 {
        let raw: Vec<u8> = peaks
            .iter()
            .flat_map(|&(mz, i)| [mz as f32, i as f32])
            .flat_map(f32::to_be_bytes)
            .collect();
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&raw).unwrap();
        encoder.finish().unwrap()
    } else {
        peaks
            .iter()
            .flat_map(|&(mz, i)| [mz, i])
            .flat_map(f64::to_be_bytes)
            .collect()
    };
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

fn ms1_scan(num: u32, time: f64, peaks: &[(f64, f64)], nested: &str) -> String {
    format!(
        r#"<scan num="{num}" msLevel="1" peaksCount="{count}" retentionTime="PT{time}S">
  <peaks precision="32" byteOrder="network" compressionType="zlib" pairOrder="m/z-int">{data}</peaks>
  {nested}
</scan>"#,
        count = peaks.len(),
        data = encode_peaks(peaks, 32),
    )
}

fn ms2_scan(num: u32, time: f64, precursor: (f64, f64), peaks: &[(f64, f64)]) -> String {
    format!(
        r#"<scan num="{num}" msLevel="2" peaksCount="{count}" retentionTime="PT{time}S">
  <precursorMz precursorIntensity="{intensity}" precursorCharge="2">{mz}</precursorMz>
  <peaks precision="64" byteOrder="network" pairOrder="m/z-int">{data}</peaks>
</scan>"#,
        mz = precursor.0,
        intensity = precursor.1,
        count = peaks.len(),
        data = encode_peaks(peaks, 64),
    )
}

/// Three MS1 survey scans, the first two with one nested MS2 scan each
fn synthetic_run() -> String {
    let scans = [
        ms1_scan(
            1,
            60.0,
            &[(300.0, 10.0), (445.12, 1000.0), (600.0, 20.0)],
            &ms2_scan(
                2,
                61.0,
                (445.12, 5000.0),
                &[(204.0867, 50.0), (520.3, 300.0), (633.4, 150.0)],
            ),
        ),
        ms1_scan(
            3,
            62.0,
            &[(300.0, 10.0), (445.12, 3000.0)],
            &ms2_scan(4, 63.0, (445.12, 8000.0), &[(520.3, 900.0), (633.4, 100.0)]),
        ),
        ms1_scan(5, 64.0, &[(445.12, 500.0), (600.0, 20.0)], ""),
    ];
    format!(
        r#"<?xml version="1.0" encoding="ISO-8859-1"?>
<mzXML xmlns="http://sashimi.sourceforge.net/schema_revision/mzXML_3.2">
<msRun scanCount="5">
{}
</msRun>
</mzXML>"#,
        scans.join("\n")
    )
}

fn write_file(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_mzxml_store_layout() {
    let dir = tempdir().unwrap();
    let path = write_file(dir.path(), "run.mzXML", &synthetic_run());

    let store = load_store(&path).unwrap();
    assert_eq!(store.len(), 5);
    assert_eq!(store.ms1().len(), 3);
    assert_eq!(store.ms2().len(), 2);
    assert_eq!(store.scan_times(), vec![60.0, 61.0, 62.0, 63.0, 64.0]);

    let ms2_indices: Vec<_> = store.ms2().iter().map(|row| row.scan_index).collect();
    assert_eq!(ms2_indices, vec![1, 3]);
    assert_eq!(store.ms2()[0].precursor_charge, Some(2));

    let (mz, intensity) = store.scan_by_number(4).unwrap();
    assert_eq!(mz, &[520.3, 633.4]);
    assert_eq!(intensity, &[900.0, 100.0]);
}

#[test]
fn test_xic_from_mzxml() {
    let dir = tempdir().unwrap();
    let path = write_file(dir.path(), "run.mzXML", &synthetic_run());
    let store = load_store(&path).unwrap();

    let xic = extract_single(store.ms1(), 445.12, 10.0).unwrap();
    assert_eq!(xic.times, vec![60.0, 62.0, 64.0]);
    assert_eq!(xic.intensities, vec![1000.0, 3000.0, 500.0]);
    assert_eq!(xic.apex(), Some((62.0, 3000.0)));
}

#[test]
fn test_prm_from_mzxml() {
    let dir = tempdir().unwrap();
    let path = write_file(dir.path(), "run.mzXML", &synthetic_run());
    let store = load_store(&path).unwrap();

    let traces = extract_prm(store.ms2(), 445.12, &[520.3, 633.4], 20.0, 25.0).unwrap();
    assert_eq!(traces.len(), 2);
    assert_eq!(traces[0].transition_mz, 520.3);
    assert_eq!(traces[0].trace.times, vec![61.0, 63.0]);
    assert_eq!(traces[0].trace.intensities, vec![300.0, 900.0]);
    assert_eq!(traces[1].trace.intensities, vec![150.0, 100.0]);
}

#[test]
fn test_fragment_trace_spans_all_scans() {
    let dir = tempdir().unwrap();
    let path = write_file(dir.path(), "run.mzXML", &synthetic_run());
    let store = load_store(&path).unwrap();

    let result = extract_fragment(&store, 204.0867, 2, SpectrumMode::Profile);
    assert_eq!(result.ms2_scan_count, 2);
    assert_eq!(result.trace.times, vec![60.0, 61.0, 62.0, 63.0, 64.0]);
    assert_eq!(result.trace.intensities, vec![0.0, 50.0, 0.0, 0.0, 0.0]);
}

#[test]
fn test_precursor_lists() {
    let dir = tempdir().unwrap();
    let path = write_file(dir.path(), "run.mzXML", &synthetic_run());
    let store = load_store(&path).unwrap();

    assert_eq!(unique_precursors(&store, 2), vec![445.12]);

    let by_intensity = precursors_by_intensity(&store, 2);
    assert_eq!(by_intensity.len(), 1);
    assert_eq!(by_intensity[0].mz, 445.12);
    assert_eq!(by_intensity[0].intensity, 8000.0);
}

#[test]
fn test_export_to_files() {
    let dir = tempdir().unwrap();
    let path = write_file(dir.path(), "run.mzXML", &synthetic_run());
    let store = load_store(&path).unwrap();

    let xic = extract_single(store.ms1(), 445.12, 10.0).unwrap();
    let xic_path = dir.path().join("xic.csv");
    write_traces(
        fs::File::create(&xic_path).unwrap(),
        &["445.12".to_string()],
        &[xic],
    )
    .unwrap();
    assert_eq!(
        fs::read_to_string(&xic_path).unwrap(),
        "time,445.12\n60,1000\n62,3000\n64,500\n"
    );

    let prm = extract_prm(store.ms2(), 445.12, &[520.3], 20.0, 25.0).unwrap();
    let prm_path = dir.path().join("prm.csv");
    write_prm_traces(fs::File::create(&prm_path).unwrap(), &prm).unwrap();
    let content = fs::read_to_string(&prm_path).unwrap();
    let mut lines = content.lines();
    assert_eq!(
        lines.next(),
        Some("precursor,time,transition_mz,transition_intensity")
    );
    assert_eq!(lines.count(), 2);
}

#[test]
fn test_mzml_store() {
    let mzml = r#"<?xml version="1.0" encoding="UTF-8"?>
<mzML xmlns="http://psi.hupo.org/ms/mzml" version="1.1.0">
  <run id="test_run">
    <spectrumList count="2">
      <spectrum index="0" id="scan=1" defaultArrayLength="2">
        <cvParam cvRef="MS" accession="MS:1000511" name="ms level" value="1"/>
        <scanList count="1">
          <scan>
            <cvParam cvRef="MS" accession="MS:1000016" name="scan start time" value="1.0" unitCvRef="UO" unitAccession="UO:0000031" unitName="minute"/>
          </scan>
        </scanList>
        <binaryDataArrayList count="2">
          <binaryDataArray>
            <cvParam cvRef="MS" accession="MS:1000523" name="64-bit float"/>
            <cvParam cvRef="MS" accession="MS:1000514" name="m/z array"/>
            <binary>AAAAAAAAWUAAAAAAAABpQA==</binary>
          </binaryDataArray>
          <binaryDataArray>
            <cvParam cvRef="MS" accession="MS:1000521" name="32-bit float"/>
            <cvParam cvRef="MS" accession="MS:1000515" name="intensity array"/>
            <binary>AADIQgAASEM=</binary>
          </binaryDataArray>
        </binaryDataArrayList>
      </spectrum>
      <spectrum index="1" id="scan=2" defaultArrayLength="2">
        <cvParam cvRef="MS" accession="MS:1000511" name="ms level" value="2"/>
        <scanList count="1">
          <scan>
            <cvParam cvRef="MS" accession="MS:1000016" name="scan start time" value="1.5" unitCvRef="UO" unitAccession="UO:0000031" unitName="minute"/>
          </scan>
        </scanList>
        <precursorList count="1">
          <precursor>
            <selectedIonList count="1">
              <selectedIon>
                <cvParam cvRef="MS" accession="MS:1000744" name="selected ion m/z" value="150.0"/>
              </selectedIon>
            </selectedIonList>
          </precursor>
        </precursorList>
        <binaryDataArrayList count="2">
          <binaryDataArray>
            <cvParam cvRef="MS" accession="MS:1000523" name="64-bit float"/>
            <cvParam cvRef="MS" accession="MS:1000514" name="m/z array"/>
            <binary>AAAAAAAAWUAAAAAAAABpQA==</binary>
          </binaryDataArray>
          <binaryDataArray>
            <cvParam cvRef="MS" accession="MS:1000521" name="32-bit float"/>
            <cvParam cvRef="MS" accession="MS:1000515" name="intensity array"/>
            <binary>AADIQgAASEM=</binary>
          </binaryDataArray>
        </binaryDataArrayList>
      </spectrum>
    </spectrumList>
  </run>
</mzML>"#;

    let dir = tempdir().unwrap();
    let path = write_file(dir.path(), "run.mzML", mzml);
    let store = load_store(&path).unwrap();

    assert_eq!(store.scan_times(), vec![60.0, 90.0]);
    assert_eq!(store.ms1().len(), 1);
    assert_eq!(store.ms2().len(), 1);
    assert_eq!(store.ms2()[0].precursor_mz, 150.0);

    let xic = extract_single(store.ms1(), 200.0, 5.0).unwrap();
    assert_eq!(xic.intensities, vec![200.0]);
}

#[test]
fn test_scan_without_retention_time_is_malformed() {
    let xml = format!(
        r#"<mzXML><msRun><scan num="1" msLevel="1" peaksCount="1">
  <peaks precision="64">{}</peaks>
</scan></msRun></mzXML>"#,
        encode_peaks(&[(100.0, 1.0)], 64)
    );
    let dir = tempdir().unwrap();
    let path = write_file(dir.path(), "bad.mzXML", &xml);

    let err = load_store(&path).unwrap_err();
    assert!(matches!(
        err,
        InputError::Store(StoreError::MalformedScan { index: 0, .. })
    ));
}

#[test]
fn test_reader_error_aborts_ingest() {
    let xml = r#"<mzXML><msRun><scan num="1" msLevel="1" retentionTime="PT1S">
  <peaks precision="32">not base64!</peaks>
</scan></msRun></mzXML>"#;
    let dir = tempdir().unwrap();
    let path = write_file(dir.path(), "broken.mzXML", xml);

    let err = load_store(&path).unwrap_err();
    assert!(matches!(err, InputError::Store(StoreError::Source(_))));
}

#[test]
fn test_unknown_extension() {
    let dir = tempdir().unwrap();
    let path = write_file(dir.path(), "run.txt", "");
    assert!(matches!(
        load_store(&path).unwrap_err(),
        InputError::UnknownFormat(_)
    ));
}
