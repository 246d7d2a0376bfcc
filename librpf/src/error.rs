use crate::frame::header::SectionTag;
use thiserror::Error;

#[derive(Error, Debug)]
#[non_exhaustive]
/// Possible `librpf` errors
pub enum Error {
    /// Error returned when the underlying reader or filesystem fails
    #[error("i/o error")]
    Io(#[from] std::io::Error),
    /// Error returned for files that carry neither a NITF `RPFHDR` tag nor a bare
    /// RPF header
    #[error("no RPF header found")]
    NotRpf,
    /// Error returned for structurally broken frame files (truncated sections,
    /// impossible lengths, unexpected geometry)
    #[error("malformed structure: {0}")]
    Format(String),
    /// Error returned when a component required for decoding is absent from the
    /// component location table
    #[error("required component missing: {0}")]
    MissingSection(SectionTag),
    /// Error returned when a catalog declares a band count that maps to no known
    /// product family
    #[error("unknown product type: {0}")]
    UnknownProduct(String),
    /// Error returned if a frame manifest line cannot be parsed
    #[error("manifest line {line}: {reason}")]
    Manifest {
        /// 1-based line number within the manifest
        line: usize,
        /// what went wrong on that line
        reason: String,
    },
}
