use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("duplicate scan id: {0}")]
    DuplicateScanId(String),

    #[error("scan at position {0} has an empty id")]
    EmptyScanId(usize),
}
