//! Opening mzXML / mzML files and loading them into a [`ScanStore`].

use std::path::{Path, PathBuf};

use log::info;

use crate::mzml::{MzMLError, MzMLStreamer};
use crate::mzxml::{MzXMLError, MzXMLStreamer};
use crate::store::{ScanStore, StoreError};

/// Read buffer size for input files
pub const DEFAULT_INPUT_BUFFER_SIZE: usize = 64 * 1024;

/// Errors that can occur while loading an input file
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    /// The file extension is not one of the supported formats
    #[error("unrecognised input format for {0} (expected .mzXML or .mzML)")]
    UnknownFormat(PathBuf),

    /// The mzML reader failed to open the file
    #[error("mzML error: {0}")]
    MzML(#[from] MzMLError),

    /// The mzXML reader failed to open the file
    #[error("mzXML error: {0}")]
    MzXML(#[from] MzXMLError),

    /// Ingestion failed, either on a malformed scan or a reader error mid-stream
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Supported input formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// mzML (HUPO-PSI)
    MzML,
    /// mzXML (ISB)
    MzXML,
}

impl InputFormat {
    /// Detect the format from the file extension, ignoring case
    pub fn detect(path: &Path) -> Option<Self> {
        let ext = path.extension().and_then(|ext| ext.to_str())?;
        if ext.eq_ignore_ascii_case("mzxml") {
            Some(Self::MzXML)
        } else if ext.eq_ignore_ascii_case("mzml") {
            Some(Self::MzML)
        } else {
            None
        }
    }
}

/// Stream an mzXML or mzML file into a new [`ScanStore`]
pub fn load_store<P: AsRef<Path>>(path: P) -> Result<ScanStore, InputError> {
    let path = path.as_ref();
    let format =
        InputFormat::detect(path).ok_or_else(|| InputError::UnknownFormat(path.to_path_buf()))?;

    info!("Loading {:?} as {:?}", path, format);
    let store = match format {
        InputFormat::MzXML => ScanStore::try_ingest(MzXMLStreamer::open(path)?.scans())?,
        InputFormat::MzML => ScanStore::try_ingest(MzMLStreamer::open(path)?.scans())?,
    };

    let stats = store.stats();
    info!(
        "Loaded {} MS1 scans, {} MS2 scans ({} rows)",
        stats.ms1_scans, stats.ms2_scans, stats.ms2_rows
    );
    Ok(store)
}
