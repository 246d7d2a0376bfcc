//! The mosaic facade: open a catalog once, then read pixel windows out of it.

use crate::{
    catalog::{manifest, FrameIndex, ProductType, TocIndex},
    tile::{
        compositor::{composite, DecodeWorkspace},
        locator::locate,
        PixelRect, TileBuffer,
    },
    Error, FRAME_PIXEL_SPAN,
};
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

/// What a [`RpfTileSource::get_tile`] call did to the output buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileStatus {
    /// No catalogued imagery intersected the request; the buffer is untouched
    Empty,
    /// At least one frame composited into the buffer
    Filled,
}

/// Supplier of reduced-resolution tiles.
///
/// Overview pyramids live outside the frame files and outside this crate; a
/// source with one attached forwards every `res_level > 0` request to it
/// wholesale. Full-resolution and overview pixels are never blended within one
/// call.
pub trait OverviewSource {
    /// Fills `out` for a reduced-resolution request.
    ///
    /// # Errors
    ///
    /// Implementation-defined.
    fn get_tile(
        &self,
        rect: &PixelRect,
        res_level: u32,
        out: &mut TileBuffer,
    ) -> Result<TileStatus, Error>;
}

/// A windowed reader over one catalogued frame library.
///
/// Opening resolves the catalog, pins the product family, and computes the
/// mosaic extent; after that the source is immutable and every
/// [`get_tile`](RpfTileSource::get_tile) call is independent. Scratch space is
/// created per call, so sharing one source across threads is safe as far as
/// this crate is concerned.
pub struct RpfTileSource {
    index: FrameIndex,
    image_rect: PixelRect,
    overview: Option<Box<dyn OverviewSource>>,
}

impl RpfTileSource {
    /// Opens a source from a flat manifest file.
    ///
    /// # Errors
    ///
    /// [`Error::Manifest`] for unusable manifest text, [`Error::UnknownProduct`]
    /// when the declared band count maps to no product family, and
    /// [`Error::Io`] when the manifest cannot be read.
    pub fn open(manifest_path: impl AsRef<Path>) -> Result<Self, Error> {
        Self::from_index(manifest::load(manifest_path.as_ref())?)
    }

    /// Opens a source from an externally parsed table of contents.
    ///
    /// # Errors
    ///
    /// [`Error::Format`] when the entry declares an empty frame grid.
    pub fn from_toc(toc: TocIndex) -> Result<Self, Error> {
        Self::from_index(toc.into_index())
    }

    fn from_index(index: FrameIndex) -> Result<Self, Error> {
        if index.frames_horizontal() == 0 || index.frames_vertical() == 0 {
            return Err(Error::Format("catalog declares an empty frame grid".to_owned()));
        }
        let image_rect = PixelRect::from_size(
            0,
            0,
            i64::from(index.frames_horizontal()) * FRAME_PIXEL_SPAN,
            i64::from(index.frames_vertical()) * FRAME_PIXEL_SPAN,
        );
        info!(
            "opened {} source: {}x{} frame grid, {} populated, {}x{} px",
            index.product(),
            index.frames_horizontal(),
            index.frames_vertical(),
            index.len(),
            image_rect.width(),
            image_rect.height()
        );
        Ok(Self {
            index,
            image_rect,
            overview: None,
        })
    }

    /// Attaches a reduced-resolution delegate
    pub fn set_overview(&mut self, overview: Box<dyn OverviewSource>) {
        self.overview = Some(overview);
    }

    /// Full extent of the mosaic in pixels, anchored at the origin
    #[must_use]
    pub const fn image_rect(&self) -> PixelRect {
        self.image_rect
    }

    /// Product family of the catalog
    #[must_use]
    pub const fn product(&self) -> ProductType {
        self.index.product()
    }

    /// Bands per decoded pixel
    #[must_use]
    pub fn bands(&self) -> u32 {
        self.index.product().bands() as u32
    }

    /// Returns `true` for grayscale imagery sources
    #[must_use]
    pub fn is_cib(&self) -> bool {
        self.product() == ProductType::Cib
    }

    /// Returns `true` for color chart sources
    #[must_use]
    pub fn is_cadrg(&self) -> bool {
        self.product() == ProductType::Cadrg
    }

    /// The resolved catalog behind this source
    #[must_use]
    pub const fn index(&self) -> &FrameIndex {
        &self.index
    }

    /// Composites the frames under `rect` into `out`.
    ///
    /// `out` may cover any rectangle, same or larger or offset; only the
    /// overlap with catalogued imagery is written, and the caller decides what
    /// the blank remainder looks like by pre-filling the buffer. `res_level`
    /// greater than zero goes to the attached [`OverviewSource`], or reports
    /// [`TileStatus::Empty`] when none is attached.
    ///
    /// # Errors
    ///
    /// [`Error::Format`] when `out` has the wrong band count, and whatever
    /// [`composite`] surfaces when every candidate frame fails to decode.
    pub fn get_tile(
        &self,
        rect: &PixelRect,
        res_level: u32,
        out: &mut TileBuffer,
    ) -> Result<TileStatus, Error> {
        if res_level > 0 {
            return match &self.overview {
                Some(overview) => overview.get_tile(rect, res_level, out),
                None => {
                    debug!("no overview attached, reduced resolution level {res_level} is empty");
                    Ok(TileStatus::Empty)
                }
            };
        }
        if out.bands() != self.index.product().bands() {
            return Err(Error::Format(format!(
                "{}-band output buffer for a {}-band source",
                out.bands(),
                self.index.product().bands()
            )));
        }
        if self.image_rect.intersect(rect).is_none() {
            return Ok(TileStatus::Empty);
        }
        let tasks = locate(rect, &self.image_rect, &self.index);
        if tasks.is_empty() {
            return Ok(TileStatus::Empty);
        }
        let mut workspace = DecodeWorkspace::new(self.index.product().bands());
        let composited = composite(&tasks, &mut workspace, out)?;
        debug!(
            "composited {composited}/{} frames into {:?}",
            tasks.len(),
            rect
        );
        Ok(TileStatus::Filled)
    }
}

impl fmt::Debug for RpfTileSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RpfTileSource")
            .field("index", &self.index)
            .field("image_rect", &self.image_rect)
            .finish_non_exhaustive()
    }
}
