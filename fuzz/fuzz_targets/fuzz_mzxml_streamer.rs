#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    // Malformed input must produce errors, never panics
    if let Ok(streamer) = mzxtract::mzxml::MzXMLStreamer::new(Cursor::new(data)) {
        let scans = streamer.scans().take(100);
        let _ = mzxtract::store::ScanStore::try_ingest(scans);
    }
});
