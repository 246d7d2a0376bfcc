//! # librpf
//!
//!
//! This library provides datatypes and i/o functionality for the Raster Product Format
//! (RPF), the MIL-STD-2411 frame-file container used for CADRG raster charts and CIB
//! grayscale imagery, together with a small tile engine that mosaics frame files into
//! arbitrary pixel windows.
//!
//! It aims to provide a minimal, low-level API to build upon: frame files are parsed
//! into plain structs, vector-quantization decoding is exposed per subframe, and the
//! mosaic layer never allocates per call beyond what the caller hands it.
//!
//! ### History
//!
//! RPF was published in 1994 as MIL-STD-2411 and is the distribution format of two
//! large NGA product families: CADRG (MIL-PRF-89038), scanned paper charts compressed
//! roughly 55:1, and CIB (MIL-PRF-89041), orthorectified panchromatic imagery. Each
//! frame file is a small NITF 2.0 container whose user-defined header region carries an
//! `RPFHDR` tag, followed by the RPF sections proper. Long-lived readers exist in
//! [GDAL](https://gdal.org/drivers/raster/rpftoc.html) (the `RPFTOC` driver) and in
//! [OSSIM](https://github.com/ossimlabs/ossim), and both were used to cross-check the
//! section layouts implemented here.
//!
//! ### Limitations
//!
//! This library reads frame files; it does not write them. A few further corners of the
//! standard are intentionally left out:
//! - only spectral group 0 is decoded (CADRG and CIB define a single group),
//! - color converter subsections are parsed past, not applied,
//! - reduced-resolution data sets are not synthesized; the mosaic layer instead
//!   delegates such requests to an optional external [`OverviewSource`].
//!
//! ### Usage
//!
//! The primary use case is windowed, on-demand reads out of a frame library: hand the
//! source a manifest (or an externally parsed table of contents), then ask for pixel
//! rectangles.
//!
//! #### Reading a window out of a frame library
//!
//! ```no_run
//! use librpf::{PixelRect, RpfTileSource, TileBuffer};
//!
//! fn main() -> anyhow::Result<()> {
//!     let source = RpfTileSource::open("frames/cib01/manifest.txt")?;
//!
//!     // A 512x512 window anchored at the top-left of the mosaic.
//!     let rect = PixelRect::new(0, 0, 511, 511);
//!     let mut tile = TileBuffer::new(rect, source.bands() as usize);
//!     source.get_tile(&rect, 0, &mut tile)?;
//!
//!     Ok(())
//! }
//! ```
//!
//! #### Converting a single frame file to an image
//!
//! ```no_run
//! use image::{codecs::png::PngEncoder, ImageEncoder};
//! use librpf::frame;
//!
//! fn main() -> anyhow::Result<()> {
//!     let tile = frame::decode_frame_image("frames/cib01/00N01E01.i41")?;
//!
//!     let output = std::fs::File::options()
//!         .create(true)
//!         .write(true)
//!         .truncate(true)
//!         .open("frame.png")?;
//!
//!     let encoder = PngEncoder::new(output);
//!     encoder.write_image(
//!         tile.data(),
//!         tile.rect().width() as u32,
//!         tile.rect().height() as u32,
//!         image::ExtendedColorType::L8,
//!     )?;
//!     Ok(())
//! }
//! ```
//!

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    missing_docs
)]

/// Catalog strategies that discover frame files and their grid placement
pub mod catalog;
mod error;
/// Frame-file parsing and subframe decoding
pub mod frame;
/// Mosaic entry point
pub mod source;
/// Pixel-space geometry and tile buffers
pub mod tile;

pub use catalog::{ProductType, TocIndex};
pub use error::Error;
pub use frame::reader::Endian;
pub use frame::RpfFrameFile;
pub use source::{OverviewSource, RpfTileSource, TileStatus};
pub use tile::{PixelRect, TileBuffer};

/// Pixel edge length of one frame; frames are square in every RPF product.
pub const FRAME_PIXEL_SPAN: i64 = 1536;
/// Pixel edge length of one subframe.
pub const SUBFRAME_PIXEL_SPAN: i64 = 256;
/// Subframes along one frame edge.
pub const SUBFRAMES_PER_FRAME_SPAN: u32 = 6;
/// Compressed payload size of one subframe, in bytes.
pub const COMPRESSED_SUBFRAME_BYTES: usize = 6144;

// On-disk sentinel for "no offset here" in mask tables and header offset fields.
pub(crate) const ABSENT_OFFSET: u32 = 0xFFFF_FFFF;
