//! The vector-quantization codebook, components 131 and 132.
//!
//! Compression algorithm 1 replaces each 4x8 pixel patch with two 12-bit
//! codewords. Reconstruction needs four lookup sub-tables, one per kernel row;
//! sub-table `t` maps a codeword to the 4 raw color indices that land on pixel
//! row `t` of the patch.

use crate::{frame::reader::SectionReader, Error};
use std::io::{Read, Seek};

/// Codewords are 12 bits wide, so each sub-table holds 4096 records.
pub const CODEBOOK_ENTRIES: usize = 4096;
/// Raw color indices per codebook record.
pub const VALUES_PER_ENTRY: usize = 4;

const SUB_TABLES: usize = 4;
const VQ_ALGORITHM_ID: u16 = 1;

/// The four expanded VQ lookup sub-tables of one frame file
#[derive(Debug, Clone)]
pub struct Codebook {
    tables: [Box<[u8]>; SUB_TABLES],
}

impl Codebook {
    /// Builds a codebook from four already-expanded sub-tables.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Format`] unless every sub-table holds exactly
    /// [`CODEBOOK_ENTRIES`] records of [`VALUES_PER_ENTRY`] bytes.
    pub fn new(tables: [Box<[u8]>; SUB_TABLES]) -> Result<Self, Error> {
        for (table_id, table) in tables.iter().enumerate() {
            if table.len() != CODEBOOK_ENTRIES * VALUES_PER_ENTRY {
                return Err(Error::Format(format!(
                    "lookup table {table_id} holds {} bytes",
                    table.len()
                )));
            }
        }
        Ok(Self { tables })
    }

    pub(crate) fn parse<R>(
        reader: &mut SectionReader<R>,
        subheader_base: u64,
        lookup_base: u64,
    ) -> Result<Self, Error>
    where
        R: Read + Seek,
    {
        reader.seek_to(subheader_base)?;
        let algorithm = reader.read_u16()?;
        if algorithm != VQ_ALGORITHM_ID {
            return Err(Error::Format(format!(
                "unsupported compression algorithm {algorithm}"
            )));
        }
        let lookup_records = reader.read_u16()?;
        let _parameter_records = reader.read_u16()?;
        if usize::from(lookup_records) != SUB_TABLES {
            return Err(Error::Format(format!(
                "expected {SUB_TABLES} compression lookup records, found {lookup_records}"
            )));
        }

        let mut tables: [Option<Box<[u8]>>; SUB_TABLES] = [None, None, None, None];
        // Offset records first, then the table data they point at.
        let mut records = [(0u16, 0u32); SUB_TABLES];
        reader.seek_to(lookup_base)?;
        for record in &mut records {
            let table_id = reader.read_u16()?;
            let entries = reader.read_u32()?;
            let values_per_entry = reader.read_u16()?;
            let value_bit_length = reader.read_u16()?;
            let table_offset = reader.read_u32()?;
            if entries as usize != CODEBOOK_ENTRIES
                || usize::from(values_per_entry) != VALUES_PER_ENTRY
                || value_bit_length != 8
            {
                return Err(Error::Format(format!(
                    "lookup table {table_id}: {entries} entries of {values_per_entry}x{value_bit_length} bits"
                )));
            }
            *record = (table_id, table_offset);
        }
        for (table_id, table_offset) in records {
            let Some(slot) = tables.get_mut(usize::from(table_id)) else {
                return Err(Error::Format(format!("lookup table id {table_id} out of range")));
            };
            let mut data = vec![0u8; CODEBOOK_ENTRIES * VALUES_PER_ENTRY];
            reader.seek_to(lookup_base + u64::from(table_offset))?;
            reader.read_exact(&mut data)?;
            *slot = Some(data.into_boxed_slice());
        }

        let [Some(t0), Some(t1), Some(t2), Some(t3)] = tables else {
            return Err(Error::Format("duplicate compression lookup table id".to_owned()));
        };
        Ok(Self {
            tables: [t0, t1, t2, t3],
        })
    }

    /// Returns the 4 raw color indices sub-table `table` holds for `codeword`.
    ///
    /// # Panics
    ///
    /// Panics if `table >= 4` or `codeword >= 4096`.
    #[inline]
    #[must_use]
    pub fn row(&self, table: usize, codeword: u16) -> &[u8] {
        let at = usize::from(codeword) * VALUES_PER_ENTRY;
        &self.tables[table][at..at + VALUES_PER_ENTRY]
    }
}
