//! RPF header, component location table, and the fixed-layout subheaders.
//!
//! Field widths and ordering follow MIL-STD-2411; every multi-byte value is read
//! in the byte order declared by the header's indicator octet.

use crate::{frame::reader::SectionReader, Error, ABSENT_OFFSET};
use chrono::NaiveDate;
use num_enum::TryFromPrimitive;
use std::fmt;
use std::io::{Read, Seek};
use strum::IntoStaticStr;
use tracing::trace;

const STANDARD_DATE_FORMAT: &str = "%Y%m%d";

/// Component identifiers used by the location table, MIL-STD-2411 table II.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoStaticStr)]
#[repr(u16)]
#[allow(missing_docs)]
pub enum SectionTag {
    Header = 128,
    Location = 129,
    CoverageSectionSubheader = 130,
    CompressionSectionSubheader = 131,
    CompressionLookupSubsection = 132,
    CompressionParameterSubsection = 133,
    ColorGrayscaleSectionSubheader = 134,
    ColormapSubsection = 135,
    ImageDescriptionSubheader = 136,
    ImageDisplayParametersSubheader = 137,
    MaskSubsection = 138,
    ColorConverterSubsection = 139,
    SpatialDataSubsection = 140,
    AttributeSectionSubheader = 141,
    AttributeSubsection = 142,
    ExplicitArealCoverageTable = 143,
    RelatedImagesSectionSubheader = 144,
    RelatedImagesSubsection = 145,
    ReplaceUpdateSectionSubheader = 146,
    ReplaceUpdateTable = 147,
    BoundaryRectSectionSubheader = 148,
    BoundaryRectTable = 149,
    FrameFileIndexSectionSubheader = 150,
    FrameFileIndexSubsection = 151,
    ColorTableIndexSectionSubheader = 152,
}

impl SectionTag {
    /// Returns the component name as written in the standard's component list
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

impl fmt::Display for SectionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the component location table
#[derive(Debug, Clone, Copy)]
pub struct ComponentLocation {
    /// Which component this row describes
    pub tag: SectionTag,
    /// Component length in bytes
    pub length: u32,
    /// Absolute file offset of the component
    pub offset: u32,
}

/// The parsed component location table.
///
/// Unknown component identifiers are skipped rather than rejected, so frames
/// produced against later revisions of the standard still parse.
#[derive(Debug, Default)]
pub struct LocationTable {
    records: Vec<ComponentLocation>,
}

impl LocationTable {
    const RECORD_LENGTH: u16 = 10;

    pub(crate) fn parse<R>(reader: &mut SectionReader<R>, base: u64) -> Result<Self, Error>
    where
        R: Read + Seek,
    {
        reader.seek_to(base)?;
        let _section_length = reader.read_u16()?;
        let table_offset = reader.read_u32()?;
        let record_count = reader.read_u16()?;
        let record_length = reader.read_u16()?;
        let _aggregate_length = reader.read_u32()?;

        if record_length < Self::RECORD_LENGTH {
            return Err(Error::Format(format!(
                "location record length {record_length} is shorter than the fixed fields"
            )));
        }

        let records_base = base + u64::from(table_offset);
        let mut records = Vec::with_capacity(usize::from(record_count));
        for i in 0..u64::from(record_count) {
            reader.seek_to(records_base + i * u64::from(record_length))?;
            let raw_tag = reader.read_u16()?;
            let length = reader.read_u32()?;
            let offset = reader.read_u32()?;
            match SectionTag::try_from(raw_tag) {
                Ok(tag) => records.push(ComponentLocation { tag, length, offset }),
                Err(_) => trace!("skipping unknown component id {raw_tag}"),
            }
        }
        Ok(Self { records })
    }

    /// Returns the full record for `tag`, if the table lists it
    #[must_use]
    pub fn get(&self, tag: SectionTag) -> Option<&ComponentLocation> {
        self.records.iter().find(|r| r.tag == tag)
    }

    /// Returns the absolute file offset of `tag`, if the table lists it
    #[must_use]
    pub fn offset(&self, tag: SectionTag) -> Option<u64> {
        self.get(tag).map(|r| u64::from(r.offset))
    }

    /// Number of recognized components
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if no recognized component was listed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// The 48-byte RPF header that opens every frame file
#[derive(Debug, Clone)]
pub struct RpfHeader {
    /// Byte order declared by the indicator octet
    pub endian: crate::Endian,
    /// Header section length
    pub header_length: u16,
    /// Frame file name, 12 characters on disk
    pub file_name: String,
    /// New/replacement/update indicator
    pub replacement_indicator: u8,
    /// Governing specification number
    pub standard_number: String,
    /// Governing specification date, when it parses as `YYYYMMDD`
    pub standard_date: Option<NaiveDate>,
    /// Security classification code
    pub classification: char,
    /// Security country code
    pub country_code: String,
    /// Security release marking
    pub release_marking: String,
    /// Offset of the location section, relative to the start of this header
    pub location_offset: u32,
}

impl RpfHeader {
    pub(crate) fn parse<R>(reader: &mut R, base: u64) -> Result<Self, Error>
    where
        R: Read + Seek,
    {
        reader.seek(std::io::SeekFrom::Start(base))?;
        let mut indicator = [0u8; 1];
        reader.read_exact(&mut indicator)?;
        let Some(endian) = crate::Endian::from_indicator(indicator[0]) else {
            return Err(Error::Format(format!(
                "invalid endian indicator {:#04x}",
                indicator[0]
            )));
        };

        let mut reader = SectionReader::new(reader, endian);
        let header_length = reader.read_u16()?;
        let file_name = reader.read_fixed_string(12)?;
        let replacement_indicator = reader.read_u8()?;
        let standard_number = reader.read_fixed_string(15)?;
        let date_text = reader.read_fixed_string(8)?;
        let standard_date = NaiveDate::parse_from_str(&date_text, STANDARD_DATE_FORMAT).ok();
        let classification = char::from(reader.read_u8()?);
        let country_code = reader.read_fixed_string(2)?;
        let release_marking = reader.read_fixed_string(2)?;
        let location_offset = reader.read_u32()?;

        Ok(Self {
            endian,
            header_length,
            file_name,
            replacement_indicator,
            standard_number,
            standard_date,
            classification,
            country_code,
            release_marking,
            location_offset,
        })
    }
}

/// Geographic corner coordinates and sampling intervals, component 130.
///
/// All values are decimal degrees; resolutions and intervals describe one pixel
/// step. Polar products store transformed coordinates here, which this crate
/// passes through untouched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverageSection {
    /// Northwest (upper-left) corner latitude
    pub nw_lat: f64,
    /// Northwest (upper-left) corner longitude
    pub nw_lon: f64,
    /// Southwest (lower-left) corner latitude
    pub sw_lat: f64,
    /// Southwest (lower-left) corner longitude
    pub sw_lon: f64,
    /// Northeast (upper-right) corner latitude
    pub ne_lat: f64,
    /// Northeast (upper-right) corner longitude
    pub ne_lon: f64,
    /// Southeast (lower-right) corner latitude
    pub se_lat: f64,
    /// Southeast (lower-right) corner longitude
    pub se_lon: f64,
    /// North-south pixel resolution
    pub vertical_resolution: f64,
    /// East-west pixel resolution
    pub horizontal_resolution: f64,
    /// Latitude interval covered by one pixel
    pub vertical_interval: f64,
    /// Longitude interval covered by one pixel
    pub horizontal_interval: f64,
}

impl CoverageSection {
    pub(crate) fn parse<R>(reader: &mut SectionReader<R>, base: u64) -> Result<Self, Error>
    where
        R: Read + Seek,
    {
        reader.seek_to(base)?;
        Ok(Self {
            nw_lat: reader.read_f64()?,
            nw_lon: reader.read_f64()?,
            sw_lat: reader.read_f64()?,
            sw_lon: reader.read_f64()?,
            ne_lat: reader.read_f64()?,
            ne_lon: reader.read_f64()?,
            se_lat: reader.read_f64()?,
            se_lon: reader.read_f64()?,
            vertical_resolution: reader.read_f64()?,
            horizontal_resolution: reader.read_f64()?,
            vertical_interval: reader.read_f64()?,
            horizontal_interval: reader.read_f64()?,
        })
    }
}

/// Image description subheader, component 136
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDescription {
    /// Number of spectral groups in the frame
    pub spectral_groups: u16,
    /// Number of subframe tables
    pub subframe_tables: u16,
    /// Number of spectral band tables
    pub spectral_band_tables: u16,
    /// Number of spectral band lines per image row
    pub spectral_band_lines: u16,
    /// Subframes across the frame, east-west
    pub subframes_horizontal: u16,
    /// Subframes down the frame, north-south
    pub subframes_vertical: u16,
    /// Output pixel columns per subframe
    pub subframe_width: u32,
    /// Output pixel rows per subframe
    pub subframe_height: u32,
    /// Offset of the subframe mask table within the mask subsection, absent when
    /// every subframe is present
    pub subframe_mask_offset: Option<u32>,
    /// Offset of the transparency mask table within the mask subsection
    pub transparency_mask_offset: Option<u32>,
}

impl ImageDescription {
    pub(crate) fn parse<R>(reader: &mut SectionReader<R>, base: u64) -> Result<Self, Error>
    where
        R: Read + Seek,
    {
        reader.seek_to(base)?;
        Ok(Self {
            spectral_groups: reader.read_u16()?,
            subframe_tables: reader.read_u16()?,
            spectral_band_tables: reader.read_u16()?,
            spectral_band_lines: reader.read_u16()?,
            subframes_horizontal: reader.read_u16()?,
            subframes_vertical: reader.read_u16()?,
            subframe_width: reader.read_u32()?,
            subframe_height: reader.read_u32()?,
            subframe_mask_offset: nullable(reader.read_u32()?),
            transparency_mask_offset: nullable(reader.read_u32()?),
        })
    }
}

/// Image display parameters subheader, component 137
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayParameters {
    /// Compressed image rows per subframe
    pub image_rows: u32,
    /// Image codes per compressed row
    pub codes_per_row: u32,
    /// Bit length of one image code
    pub code_bit_length: u8,
}

impl DisplayParameters {
    pub(crate) fn parse<R>(reader: &mut SectionReader<R>, base: u64) -> Result<Self, Error>
    where
        R: Read + Seek,
    {
        reader.seek_to(base)?;
        Ok(Self {
            image_rows: reader.read_u32()?,
            codes_per_row: reader.read_u32()?,
            code_bit_length: reader.read_u8()?,
        })
    }

    /// Bytes one compressed subframe occupies in the spatial data subsection
    #[must_use]
    pub const fn compressed_subframe_bytes(&self) -> u64 {
        self.image_rows as u64 * self.codes_per_row as u64 * self.code_bit_length as u64 / 8
    }
}

/// Attribute section subheader, component 141.
///
/// Attributes themselves (datums, projection parameters, currency dates) are
/// not decoded; the subheader is retained so callers can reach the records.
#[derive(Debug, Clone, Copy)]
pub struct AttributeSection {
    /// Number of attribute offset records
    pub attribute_records: u16,
    /// Number of explicit areal coverage records
    pub areal_records: u16,
    /// Offset of the attribute offset table within the attribute subsection
    pub offset_table_offset: u32,
    /// Length of one attribute offset record
    pub offset_record_length: u16,
}

impl AttributeSection {
    pub(crate) fn parse<R>(reader: &mut SectionReader<R>, base: u64) -> Result<Self, Error>
    where
        R: Read + Seek,
    {
        reader.seek_to(base)?;
        Ok(Self {
            attribute_records: reader.read_u16()?,
            areal_records: reader.read_u16()?,
            offset_table_offset: reader.read_u32()?,
            offset_record_length: reader.read_u16()?,
        })
    }
}

const fn nullable(offset: u32) -> Option<u32> {
    if offset == ABSENT_OFFSET {
        None
    } else {
        Some(offset)
    }
}
