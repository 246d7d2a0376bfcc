//! The subframe mask table, component 138.
//!
//! Incompletely covered frames list a table of offsets, one per
//! `(spectral group, subframe row, subframe column)`, pointing into the spatial
//! data subsection. The on-disk sentinel `0xFFFF_FFFF` marks an absent
//! subframe; it is translated to `None` here and never escapes this module.

use crate::{frame::reader::SectionReader, Error, ABSENT_OFFSET};
use std::io::{Read, Seek};

// 16 groups is already far past anything either product family defines.
const MAX_GROUPS: usize = 16;

/// Presence table for the subframes of one frame file
#[derive(Debug, Clone)]
pub struct SubframeMask {
    rows: usize,
    cols: usize,
    offsets: Vec<Option<u32>>,
}

impl SubframeMask {
    pub(crate) fn parse<R>(
        reader: &mut SectionReader<R>,
        table_base: u64,
        groups: usize,
        rows: usize,
        cols: usize,
    ) -> Result<Self, Error>
    where
        R: Read + Seek,
    {
        if groups == 0 || groups > MAX_GROUPS {
            return Err(Error::Format(format!(
                "subframe mask for {groups} spectral groups"
            )));
        }
        reader.seek_to(table_base)?;
        let mut offsets = Vec::with_capacity(groups * rows * cols);
        for _ in 0..groups * rows * cols {
            let raw = reader.read_u32()?;
            offsets.push(if raw == ABSENT_OFFSET { None } else { Some(raw) });
        }
        Ok(Self { rows, cols, offsets })
    }

    /// Offset of a subframe's payload within the spatial data subsection, or
    /// `None` when the subframe is absent or the index is out of range.
    #[must_use]
    pub fn offset(&self, group: usize, row: usize, col: usize) -> Option<u32> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        let at = (group * self.rows + row) * self.cols + col;
        self.offsets.get(at).copied().flatten()
    }

    /// Number of present subframes across all groups
    #[must_use]
    pub fn present(&self) -> usize {
        self.offsets.iter().filter(|o| o.is_some()).count()
    }
}
