//! Types for RPF frame files: the NITF-wrapped container, its sections, and
//! per-subframe decoding.

use crate::{
    catalog::ProductType,
    tile::{
        compositor::{blit_subframes, DecodeWorkspace},
        PixelRect, TileBuffer,
    },
    Endian, Error, COMPRESSED_SUBFRAME_BYTES, FRAME_PIXEL_SPAN, SUBFRAMES_PER_FRAME_SPAN,
    SUBFRAME_PIXEL_SPAN,
};
use std::{
    fs::File,
    io::{BufReader, Read, Seek, SeekFrom},
    path::Path,
};
use tracing::{debug, warn};

pub mod codebook;
pub mod colormap;
/// Subframe expansion
pub mod decompress;
pub mod header;
pub mod mask;
mod nitf;
pub(crate) mod reader;

use codebook::Codebook;
use colormap::ColorTable;
use header::{
    AttributeSection, CoverageSection, DisplayParameters, ImageDescription, LocationTable,
    RpfHeader, SectionTag,
};
use mask::SubframeMask;
use reader::SectionReader;

/// A parsed frame file: every section needed for decoding, resolved and
/// validated, with subframe payloads left on disk until asked for.
#[derive(Debug)]
pub struct RpfFrameFile {
    header: RpfHeader,
    coverage: Option<CoverageSection>,
    description: ImageDescription,
    display: DisplayParameters,
    codebook: Codebook,
    color_tables: Vec<ColorTable>,
    mask: Option<SubframeMask>,
    spatial_data_offset: Option<u64>,
    attributes: Option<AttributeSection>,
}

impl RpfFrameFile {
    /// Opens and parses a frame file.
    ///
    /// # Errors
    ///
    /// See [`RpfFrameFile::parse`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let mut reader = BufReader::new(File::open(path)?);
        Self::parse(&mut reader)
    }

    /// Parses the container structure out of `reader`.
    ///
    /// Sections the decoder cannot work without (image description, display
    /// parameters, compression, color tables) are demanded; coverage, masks and
    /// attributes degrade to `None` with a logged warning when broken.
    ///
    /// # Errors
    ///
    /// [`Error::NotRpf`] when no RPF header can be located, [`Error::MissingSection`]
    /// when a required component is absent from the location table, and
    /// [`Error::Format`] for declared geometry no product uses.
    pub fn parse<R>(reader: &mut R) -> Result<Self, Error>
    where
        R: Read + Seek,
    {
        let base = nitf::locate_rpf_header(reader)?;
        let header = RpfHeader::parse(reader, base)?;
        let mut reader = SectionReader::new(reader, header.endian);

        let locations = LocationTable::parse(&mut reader, base + u64::from(header.location_offset))?;
        debug!(
            "frame {}: {} components, {:?} byte order",
            header.file_name,
            locations.len(),
            reader.endian()
        );

        let coverage = match locations.offset(SectionTag::CoverageSectionSubheader) {
            Some(at) => match CoverageSection::parse(&mut reader, at) {
                Ok(coverage) => Some(coverage),
                Err(e) => {
                    warn!("unreadable coverage section: {e}");
                    None
                }
            },
            None => None,
        };

        let at = require(&locations, SectionTag::ImageDescriptionSubheader)?;
        let description = ImageDescription::parse(&mut reader, at)?;
        let at = require(&locations, SectionTag::ImageDisplayParametersSubheader)?;
        let display = DisplayParameters::parse(&mut reader, at)?;
        validate_geometry(&description, &display)?;

        let subheader = require(&locations, SectionTag::CompressionSectionSubheader)?;
        let lookup = require(&locations, SectionTag::CompressionLookupSubsection)?;
        let codebook = Codebook::parse(&mut reader, subheader, lookup)?;

        let subheader = require(&locations, SectionTag::ColorGrayscaleSectionSubheader)?;
        let subsection = require(&locations, SectionTag::ColormapSubsection)?;
        let color_tables = colormap::parse_colormap(&mut reader, subheader, subsection)?;

        let mask = match (
            description.subframe_mask_offset,
            locations.offset(SectionTag::MaskSubsection),
        ) {
            (Some(table_offset), Some(mask_base)) => {
                match SubframeMask::parse(
                    &mut reader,
                    mask_base + u64::from(table_offset),
                    usize::from(description.spectral_groups),
                    usize::from(description.subframes_vertical),
                    usize::from(description.subframes_horizontal),
                ) {
                    Ok(mask) => Some(mask),
                    Err(e) => {
                        warn!("unreadable subframe mask, treating frame as fully covered: {e}");
                        None
                    }
                }
            }
            (Some(_), None) => {
                warn!("subframe mask offset is set but the mask subsection is missing");
                None
            }
            (None, _) => None,
        };

        // A frame with no spatial data is legal; every subframe reads as absent.
        let spatial_data_offset = locations.offset(SectionTag::SpatialDataSubsection);

        let attributes = match locations.offset(SectionTag::AttributeSectionSubheader) {
            Some(at) => match AttributeSection::parse(&mut reader, at) {
                Ok(attributes) => Some(attributes),
                Err(e) => {
                    warn!("unreadable attribute section: {e}");
                    None
                }
            },
            None => None,
        };

        Ok(Self {
            header,
            coverage,
            description,
            display,
            codebook,
            color_tables,
            mask,
            spatial_data_offset,
            attributes,
        })
    }

    /// The 48-byte header that opened the file
    #[must_use]
    pub const fn header(&self) -> &RpfHeader {
        &self.header
    }

    /// Byte order the file declared
    #[must_use]
    pub const fn byte_order(&self) -> Endian {
        self.header.endian
    }

    /// Geographic coverage, when the frame carries a readable coverage section
    #[must_use]
    pub const fn coverage(&self) -> Option<&CoverageSection> {
        self.coverage.as_ref()
    }

    /// Image description subheader
    #[must_use]
    pub const fn description(&self) -> &ImageDescription {
        &self.description
    }

    /// Image display parameters subheader
    #[must_use]
    pub const fn display_parameters(&self) -> &DisplayParameters {
        &self.display
    }

    /// The frame's VQ codebook
    #[must_use]
    pub const fn codebook(&self) -> &Codebook {
        &self.codebook
    }

    /// Every color/grayscale table the frame carries, in subsection order
    #[must_use]
    pub fn color_tables(&self) -> &[ColorTable] {
        &self.color_tables
    }

    /// The table used for decoding: the first one in the subsection
    #[must_use]
    pub fn decode_table(&self) -> &ColorTable {
        // parse refuses frames with an empty colormap subsection
        &self.color_tables[0]
    }

    /// Subframe presence mask; `None` means every subframe is present
    #[must_use]
    pub const fn mask(&self) -> Option<&SubframeMask> {
        self.mask.as_ref()
    }

    /// Attribute section subheader, if the frame carries one
    #[must_use]
    pub const fn attributes(&self) -> Option<&AttributeSection> {
        self.attributes.as_ref()
    }

    /// Output bands of the decoded imagery: 1 for CIB, 3 for CADRG
    #[must_use]
    pub fn bands(&self) -> usize {
        self.decode_table().bands()
    }

    /// Product family implied by the decode table
    #[must_use]
    pub fn product(&self) -> ProductType {
        match self.bands() {
            1 => ProductType::Cib,
            _ => ProductType::Cadrg,
        }
    }

    /// Resolves a subframe to its absolute payload offset in the file.
    ///
    /// `None` means the subframe is absent: masked out, outside the grid, or in
    /// a frame with no spatial data at all. Without a mask the layout is dense,
    /// subframes packed row-major right after the spatial data subsection
    /// start; dense addressing only ever serves spectral group 0.
    #[must_use]
    pub fn subframe_offset(&self, group: u32, row: u32, col: u32) -> Option<u64> {
        let base = self.spatial_data_offset?;
        let rows = u32::from(self.description.subframes_vertical);
        let cols = u32::from(self.description.subframes_horizontal);
        if row >= rows || col >= cols || u32::from(self.description.spectral_groups) <= group {
            return None;
        }
        match &self.mask {
            Some(mask) => mask
                .offset(group as usize, row as usize, col as usize)
                .map(|offset| base + u64::from(offset)),
            None if group == 0 => {
                let ordinal = u64::from(row) * u64::from(cols) + u64::from(col);
                Some(base + COMPRESSED_SUBFRAME_BYTES as u64 * ordinal)
            }
            None => None,
        }
    }

    /// Reads one compressed subframe payload into `buf`.
    ///
    /// Returns `Ok(false)` without touching `buf` when the subframe is absent.
    ///
    /// # Errors
    ///
    /// Propagates reader failures.
    ///
    /// # Panics
    ///
    /// Panics if `buf` is not exactly [`COMPRESSED_SUBFRAME_BYTES`] long.
    pub fn read_subframe<R>(
        &self,
        reader: &mut R,
        group: u32,
        row: u32,
        col: u32,
        buf: &mut [u8],
    ) -> Result<bool, Error>
    where
        R: Read + Seek,
    {
        assert_eq!(buf.len(), COMPRESSED_SUBFRAME_BYTES);
        let Some(at) = self.subframe_offset(group, row, col) else {
            return Ok(false);
        };
        reader.seek(SeekFrom::Start(at))?;
        reader.read_exact(buf)?;
        Ok(true)
    }
}

/// Decodes every subframe of one frame file into a fresh 1536x1536 tile.
///
/// Absent subframes come out black; the container structure itself must parse.
///
/// # Errors
///
/// Fails when the file cannot be opened or [`RpfFrameFile::parse`] rejects it.
pub fn decode_frame_image(path: impl AsRef<Path>) -> Result<TileBuffer, Error> {
    let mut reader = BufReader::new(File::open(path)?);
    let frame = RpfFrameFile::parse(&mut reader)?;
    let bands = frame.bands();
    let mut tile = TileBuffer::new(
        PixelRect::new(0, 0, FRAME_PIXEL_SPAN - 1, FRAME_PIXEL_SPAN - 1),
        bands,
    );
    let mut workspace = DecodeWorkspace::new(bands);
    let last = SUBFRAMES_PER_FRAME_SPAN - 1;
    blit_subframes(
        &frame,
        &mut reader,
        (0, last),
        (0, last),
        (0, 0),
        &mut workspace,
        &mut tile,
    )?;
    Ok(tile)
}

fn require(locations: &LocationTable, tag: SectionTag) -> Result<u64, Error> {
    locations.offset(tag).ok_or(Error::MissingSection(tag))
}

fn validate_geometry(
    description: &ImageDescription,
    display: &DisplayParameters,
) -> Result<(), Error> {
    if u32::from(description.subframes_horizontal) != SUBFRAMES_PER_FRAME_SPAN
        || u32::from(description.subframes_vertical) != SUBFRAMES_PER_FRAME_SPAN
    {
        return Err(Error::Format(format!(
            "frame declares {}x{} subframes, products define 6x6",
            description.subframes_horizontal, description.subframes_vertical
        )));
    }
    if i64::from(description.subframe_width) != SUBFRAME_PIXEL_SPAN
        || i64::from(description.subframe_height) != SUBFRAME_PIXEL_SPAN
    {
        return Err(Error::Format(format!(
            "frame declares {}x{} pixel subframes, products define 256x256",
            description.subframe_width, description.subframe_height
        )));
    }
    if description.spectral_groups == 0 {
        return Err(Error::Format("frame declares zero spectral groups".to_owned()));
    }
    if display.compressed_subframe_bytes() != COMPRESSED_SUBFRAME_BYTES as u64 {
        return Err(Error::Format(format!(
            "compressed subframes of {} bytes, expected {COMPRESSED_SUBFRAME_BYTES}",
            display.compressed_subframe_bytes()
        )));
    }
    Ok(())
}
