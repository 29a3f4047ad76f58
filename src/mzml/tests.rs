use std::io::{BufReader, Cursor};

use super::*;
use crate::scan::RawScan;

const MINIMAL_MZML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<mzML xmlns="http://psi.hupo.org/ms/mzml" version="1.1.0">
  <fileDescription>
    <fileContent>
      <cvParam cvRef="MS" accession="MS:1000579" name="MS1 spectrum"/>
    </fileContent>
  </fileDescription>
  <run id="test_run">
    <spectrumList count="2">
      <spectrum index="0" id="controllerType=0 controllerNumber=1 scan=1" defaultArrayLength="2">
        <cvParam cvRef="MS" accession="MS:1000511" name="ms level" value="1"/>
        <cvParam cvRef="MS" accession="MS:1000128" name="profile spectrum"/>
        <scanList count="1">
          <scan>
            <cvParam cvRef="MS" accession="MS:1000016" name="scan start time" value="60.0" unitCvRef="UO" unitAccession="UO:0000010" unitName="second"/>
          </scan>
        </scanList>
        <binaryDataArrayList count="2">
          <binaryDataArray>
            <cvParam cvRef="MS" accession="MS:1000523" name="64-bit float"/>
            <cvParam cvRef="MS" accession="MS:1000576" name="no compression"/>
            <cvParam cvRef="MS" accession="MS:1000514" name="m/z array"/>
            <binary>AAAAAAAAWUAAAAAAAABpQA==</binary>
          </binaryDataArray>
          <binaryDataArray>
            <cvParam cvRef="MS" accession="MS:1000521" name="32-bit float"/>
            <cvParam cvRef="MS" accession="MS:1000576" name="no compression"/>
            <cvParam cvRef="MS" accession="MS:1000515" name="intensity array"/>
            <binary>AADIQgAASEM=</binary>
          </binaryDataArray>
        </binaryDataArrayList>
      </spectrum>
      <spectrum index="1" id="controllerType=0 controllerNumber=1 scan=2" defaultArrayLength="2">
        <cvParam cvRef="MS" accession="MS:1000511" name="ms level" value="2"/>
        <cvParam cvRef="MS" accession="MS:1000127" name="centroid spectrum"/>
        <scanList count="1">
          <scan>
            <cvParam cvRef="MS" accession="MS:1000016" name="scan start time" value="1.5" unitCvRef="UO" unitAccession="UO:0000031" unitName="minute"/>
          </scan>
        </scanList>
        <precursorList count="1">
          <precursor spectrumRef="controllerType=0 controllerNumber=1 scan=1">
            <isolationWindow>
              <cvParam cvRef="MS" accession="MS:1000827" name="isolation window target m/z" value="445.3"/>
            </isolationWindow>
            <selectedIonList count="1">
              <selectedIon>
                <cvParam cvRef="MS" accession="MS:1000744" name="selected ion m/z" value="445.34"/>
                <cvParam cvRef="MS" accession="MS:1000041" name="charge state" value="2"/>
                <cvParam cvRef="MS" accession="MS:1000042" name="peak intensity" value="12000.5"/>
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

fn streamer(xml: &str) -> MzMLStreamer<BufReader<Cursor<&str>>> {
    MzMLStreamer::new(BufReader::new(Cursor::new(xml))).unwrap()
}

#[test]
fn test_parse_minimal_mzml() {
    let mut streamer = streamer(MINIMAL_MZML);

    let spectrum = streamer.next_spectrum().unwrap().unwrap();
    assert_eq!(streamer.spectrum_count(), Some(2));

    assert_eq!(spectrum.index, 0);
    assert_eq!(spectrum.scan_number(), Some(1));
    assert_eq!(spectrum.ms_level, Some(1));
    assert!((spectrum.retention_time.unwrap() - 60.0).abs() < 0.001);
    assert_eq!(spectrum.mz_array, Some(vec![100.0, 200.0]));
    assert_eq!(spectrum.intensity_array, Some(vec![100.0, 200.0]));
    assert!(spectrum.precursors.is_empty());
}

#[test]
fn test_ms2_precursor_and_minute_unit() {
    let mut streamer = streamer(MINIMAL_MZML);
    streamer.next_spectrum().unwrap();

    let spectrum = streamer.next_spectrum().unwrap().unwrap();
    assert_eq!(spectrum.ms_level, Some(2));
    assert!((spectrum.retention_time.unwrap() - 90.0).abs() < 1e-9);

    assert_eq!(spectrum.precursors.len(), 1);
    let precursor = &spectrum.precursors[0];
    assert_eq!(precursor.selected_ion_mz, Some(445.34));
    assert_eq!(precursor.isolation_window_target, Some(445.3));
    assert_eq!(precursor.selected_ion_charge, Some(2));
    assert_eq!(precursor.selected_ion_intensity, Some(12000.5));

    assert!(streamer.next_spectrum().unwrap().is_none());
    assert!(streamer.next_spectrum().unwrap().is_none());
}

#[test]
fn test_spectrum_converts_to_raw_scan() {
    let scans: Vec<RawScan> = streamer(MINIMAL_MZML)
        .scans()
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(scans.len(), 2);
    assert_eq!(scans[0].ms_level, 1);
    assert_eq!(scans[0].scan_number, Some(1));
    assert_eq!(scans[1].retention_time, Some(90.0));
    assert_eq!(scans[1].precursors.len(), 1);
    assert_eq!(scans[1].precursors[0].mz, 445.34);
    assert_eq!(scans[1].precursors[0].charge, Some(2));
}

#[test]
fn test_precursor_falls_back_to_isolation_target() {
    let precursor = Precursor {
        isolation_window_target: Some(500.5),
        ..Default::default()
    };
    assert_eq!(precursor.mz(), Some(500.5));
    assert_eq!(Precursor::default().mz(), None);
}

#[test]
fn test_undeclared_ms_level_is_skipped_at_ingest() {
    let spectrum = MzMLSpectrum {
        id: "scan=3".to_string(),
        retention_time: Some(12.0),
        mz_array: Some(vec![500.0]),
        intensity_array: Some(vec![10.0]),
        ..Default::default()
    };
    let scan = RawScan::from(spectrum);
    assert_eq!(scan.ms_level, 0);

    let store = crate::store::ScanStore::ingest(vec![scan]).unwrap();
    assert!(store.ms1().is_empty());
    assert_eq!(store.stats().skipped_unsupported_level, 1);
    assert_eq!(store.len(), 1);
}

#[test]
fn test_missing_arrays_stay_missing() {
    let xml = r#"<mzML><run><spectrumList count="1">
      <spectrum index="0" id="scan=7" defaultArrayLength="0">
        <cvParam cvRef="MS" accession="MS:1000511" name="ms level" value="1"/>
      </spectrum>
    </spectrumList></run></mzML>"#;

    let spectrum = streamer(xml).next_spectrum().unwrap().unwrap();
    assert_eq!(spectrum.scan_number(), Some(7));
    assert_eq!(spectrum.retention_time, None);
    assert_eq!(spectrum.mz_array, None);
    assert_eq!(spectrum.intensity_array, None);
}

#[test]
fn test_truncated_spectrum_is_an_error() {
    let xml = r#"<mzML><run><spectrumList count="1">
      <spectrum index="0" id="scan=1" defaultArrayLength="0">
        <cvParam cvRef="MS" accession="MS:1000511" name="ms level" value="1"/>"#;

    let mut iter = streamer(xml).spectra();
    assert!(matches!(iter.next(), Some(Err(_))));
    assert!(iter.next().is_none());
}

#[test]
fn test_document_without_spectra() {
    let xml = r#"<mzML><run id="empty"></run></mzML>"#;
    assert!(streamer(xml).next_spectrum().unwrap().is_none());
}

#[test]
fn test_scan_number_extraction() {
    let spectrum = MzMLSpectrum {
        id: "controllerType=0 controllerNumber=1 scan=12345".to_string(),
        ..Default::default()
    };
    assert_eq!(spectrum.scan_number(), Some(12345));

    let spectrum = MzMLSpectrum {
        id: "S999".to_string(),
        ..Default::default()
    };
    assert_eq!(spectrum.scan_number(), Some(999));

    let spectrum = MzMLSpectrum {
        index: 4,
        id: "index=4".to_string(),
        ..Default::default()
    };
    assert_eq!(spectrum.scan_number(), Some(5));
}
