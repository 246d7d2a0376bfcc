//! Color and grayscale lookup tables, components 134 and 135.
//!
//! A frame carries one table per display density (a full table plus reduced
//! variants for dimmed displays). Decoding uses the first table; the rest are
//! kept so callers can pick a different rendition.

use crate::{frame::reader::SectionReader, Error};
use std::io::{Read, Seek};
use tracing::warn;

// Offset records grew fields over revisions; this is the MIL-STD-2411 width.
const OFFSET_RECORD_LENGTH: u16 = 17;
// Tables index by an 8-bit raw value, anything past that is unreachable.
const MAX_ENTRIES: u32 = 65536;

/// One color or grayscale lookup table
#[derive(Debug, Clone)]
pub struct ColorTable {
    id: u16,
    element_length: u8,
    entries: Vec<u8>,
}

impl ColorTable {
    /// Builds a lookup table from packed entry data.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Format`] unless `element_length` is 1 (grayscale) or 3
    /// (RGB), or if `entries` is not a whole number of elements.
    pub fn new(id: u16, element_length: u8, entries: Vec<u8>) -> Result<Self, Error> {
        if !matches!(element_length, 1 | 3) {
            return Err(Error::Format(format!(
                "color table {id}: unsupported element length {element_length}"
            )));
        }
        if entries.len() % usize::from(element_length) != 0 {
            return Err(Error::Format(format!(
                "color table {id}: {} bytes is not a whole number of {element_length}-byte elements",
                entries.len()
            )));
        }
        Ok(Self {
            id,
            element_length,
            entries,
        })
    }

    /// Table identifier from the offset record
    #[must_use]
    pub const fn id(&self) -> u16 {
        self.id
    }

    /// Output bands this table produces: 1 for grayscale, 3 for RGB
    #[must_use]
    pub const fn bands(&self) -> usize {
        self.element_length as usize
    }

    /// Number of elements in the table
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len() / usize::from(self.element_length)
    }

    /// Returns `true` if the table holds no elements
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Grayscale value for `raw`; out-of-table indices map to black
    #[inline]
    #[must_use]
    pub fn gray(&self, raw: u8) -> u8 {
        let at = usize::from(raw) * usize::from(self.element_length);
        self.entries.get(at).copied().unwrap_or(0)
    }

    /// RGB triple for `raw`; out-of-table indices map to black
    #[inline]
    #[must_use]
    pub fn rgb(&self, raw: u8) -> [u8; 3] {
        let at = usize::from(raw) * usize::from(self.element_length);
        match self.entries.get(at..at + 3) {
            Some(e) => [e[0], e[1], e[2]],
            None => [0; 3],
        }
    }
}

/// Parses every usable lookup table out of the colormap subsection.
pub(crate) fn parse_colormap<R>(
    reader: &mut SectionReader<R>,
    subheader_base: u64,
    colormap_base: u64,
) -> Result<Vec<ColorTable>, Error>
where
    R: Read + Seek,
{
    reader.seek_to(subheader_base)?;
    let offset_records = reader.read_u8()?;
    let _converter_records = reader.read_u8()?;
    let _external_name = reader.read_fixed_string(12)?;

    reader.seek_to(colormap_base)?;
    let table_offset = reader.read_u32()?;
    let record_length = reader.read_u16()?;
    if record_length < OFFSET_RECORD_LENGTH {
        return Err(Error::Format(format!(
            "colormap offset record length {record_length} is shorter than the fixed fields"
        )));
    }

    let records_base = colormap_base + u64::from(table_offset);
    let mut tables = Vec::with_capacity(usize::from(offset_records));
    for i in 0..u64::from(offset_records) {
        reader.seek_to(records_base + i * u64::from(record_length))?;
        let id = reader.read_u16()?;
        let entry_count = reader.read_u32()?;
        let element_length = reader.read_u8()?;
        let _histogram_record_length = reader.read_u16()?;
        let data_offset = reader.read_u32()?;
        let _histogram_offset = reader.read_u32()?;

        if entry_count > MAX_ENTRIES {
            return Err(Error::Format(format!(
                "color table {id} declares {entry_count} entries"
            )));
        }
        if !matches!(element_length, 1 | 3) {
            warn!("skipping color table {id} with element length {element_length}");
            continue;
        }

        let mut entries = vec![0u8; entry_count as usize * usize::from(element_length)];
        reader.seek_to(colormap_base + u64::from(data_offset))?;
        reader.read_exact(&mut entries)?;
        tables.push(ColorTable {
            id,
            element_length,
            entries,
        });
    }

    if tables.is_empty() {
        return Err(Error::Format(
            "no usable color/grayscale table in colormap subsection".to_owned(),
        ));
    }
    Ok(tables)
}
