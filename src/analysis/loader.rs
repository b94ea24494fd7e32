//! Reading the catalog CSV from disk or over HTTP.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;
use std::time::Instant;

use csv::StringRecord;
use serde::Serialize;
use thiserror::Error;
use tokio::task::spawn_blocking;
use tracing::{debug, info, warn};

use crate::types::Row;

const TYPE_COLUMN: &str = "type";
const DATE_ADDED_COLUMN: &str = "date_added";
const LISTED_IN_COLUMN: &str = "listed_in";

/// Why a catalog could not be loaded.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("malformed CSV header: {0}")]
    Csv(#[from] csv::Error),
    #[error("load task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Where the catalog comes from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataSource {
    Path(PathBuf),
    Url(String),
}

impl DataSource {
    /// `http://` and `https://` prefixes select a URL, anything else is a path.
    pub fn parse(s: &str) -> Self {
        let trimmed = s.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            DataSource::Url(trimmed.to_string())
        } else {
            DataSource::Path(PathBuf::from(trimmed))
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Path(path) => write!(f, "{}", path.display()),
            DataSource::Url(url) => f.write_str(url),
        }
    }
}

/// Bookkeeping about one load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// Records returned by the CSV reader, good or bad
    pub records_read: usize,
    /// Records the CSV reader could not decode
    pub skipped_records: usize,
    /// Expected columns absent from the header
    pub missing_columns: Vec<String>,
}

/// Rows plus the report of how they were read.
#[derive(Debug, Clone, Default)]
pub struct ParsedRows {
    pub rows: Vec<Row>,
    pub report: LoadReport,
}

struct ColumnMap {
    content_type: Option<usize>,
    date_added: Option<usize>,
    listed_in: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &StringRecord) -> Self {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        Self {
            content_type: find(TYPE_COLUMN),
            date_added: find(DATE_ADDED_COLUMN),
            listed_in: find(LISTED_IN_COLUMN),
        }
    }

    fn missing(&self) -> Vec<String> {
        [
            (TYPE_COLUMN, self.content_type),
            (DATE_ADDED_COLUMN, self.date_added),
            (LISTED_IN_COLUMN, self.listed_in),
        ]
        .into_iter()
        .filter(|(_, idx)| idx.is_none())
        .map(|(name, _)| name.to_string())
        .collect()
    }

    fn row(&self, record: &StringRecord) -> Row {
        let field = |idx: Option<usize>| {
            idx.and_then(|i| record.get(i))
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };
        Row {
            content_type: field(self.content_type),
            date_added: field(self.date_added),
            listed_in: field(self.listed_in),
        }
    }
}

/// Parse CSV text with a header row into catalog rows.
///
/// Blank lines are skipped and ragged records are accepted: a short record
/// simply has no value for the trailing columns. Only an unreadable header is
/// an error; undecodable records are skipped and counted.
pub fn parse_rows<R: Read>(reader: R) -> Result<ParsedRows, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let columns = ColumnMap::from_headers(reader.headers()?);
    let mut parsed = ParsedRows {
        rows: Vec::new(),
        report: LoadReport {
            missing_columns: columns.missing(),
            ..Default::default()
        },
    };

    for result in reader.records() {
        parsed.report.records_read += 1;
        match result {
            Ok(record) => parsed.rows.push(columns.row(&record)),
            Err(e) => {
                debug!("Skipping CSV record: {}", e);
                parsed.report.skipped_records += 1;
            }
        }
    }

    Ok(parsed)
}

/// Load and parse the catalog from `source`.
pub async fn load_rows_async(source: DataSource) -> Result<ParsedRows, LoadError> {
    let start_time = Instant::now();

    let parsed = match &source {
        DataSource::Path(path) => {
            let path = path.clone();
            // CSV parsing and file IO are blocking
            spawn_blocking(move || {
                let file = File::open(&path).map_err(|source| LoadError::Io {
                    path: path.clone(),
                    source,
                })?;
                parse_rows(file)
            })
            .await??
        }
        DataSource::Url(url) => {
            let body = fetch(url).await?;
            spawn_blocking(move || parse_rows(body.as_slice())).await??
        }
    };

    if !parsed.report.missing_columns.is_empty() {
        warn!(
            "{} is missing columns: {}",
            source,
            parsed.report.missing_columns.join(", ")
        );
    }
    if parsed.report.skipped_records > 0 {
        warn!(
            "Skipped {} malformed records in {}",
            parsed.report.skipped_records, source
        );
    }
    info!(
        "Loaded {} rows from {} in {:.2}s",
        parsed.rows.len(),
        source,
        start_time.elapsed().as_secs_f64()
    );

    Ok(parsed)
}

async fn fetch(url: &str) -> Result<Vec<u8>, LoadError> {
    let http_err = |source| LoadError::Http {
        url: url.to_string(),
        source,
    };
    let response = reqwest::get(url).await.map_err(http_err)?;
    let status = response.status();
    if !status.is_success() {
        return Err(LoadError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    let bytes = response.bytes().await.map_err(http_err)?;
    Ok(bytes.to_vec())
}
