//! Catalog strategies: how a mosaic finds out which frame file sits at which
//! grid cell.
//!
//! Two strategies exist and they disagree about vertical numbering on purpose.
//! Tables of contents number frame rows from the bottom of the coverage up, as
//! the product standards do, so a [`TocIndex`] is stored bottom-up and logical
//! lookups invert the row. Flat manifests are written in screen order and are
//! looked up as-is. [`FrameIndex`] pins the convention per instance instead of
//! leaving it implicit in the loader.

pub(crate) mod manifest;
mod toc;

pub use toc::TocIndex;

use crate::Error;
use std::{
    collections::HashMap,
    fmt,
    path::{Path, PathBuf},
};
use strum::{EnumString, IntoStaticStr};

/// The two product families this crate decodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, IntoStaticStr)]
#[strum(ascii_case_insensitive)]
pub enum ProductType {
    /// Controlled Image Base: single-band grayscale imagery
    #[strum(serialize = "CIB")]
    Cib,
    /// Compressed ARC Digitized Raster Graphics: three-band color charts
    #[strum(serialize = "CADRG")]
    Cadrg,
}

impl ProductType {
    /// Bands the product decodes to: 1 for CIB, 3 for CADRG
    #[must_use]
    pub const fn bands(self) -> usize {
        match self {
            Self::Cib => 1,
            Self::Cadrg => 3,
        }
    }

    /// The product's conventional abbreviation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    pub(crate) fn from_band_count(bands: u32) -> Result<Self, Error> {
        match bands {
            1 => Ok(Self::Cib),
            3 => Ok(Self::Cadrg),
            other => Err(Error::UnknownProduct(format!("{other} bands"))),
        }
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Vertical numbering convention the catalog's entries were stored in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOrder {
    /// Row 0 is the top of the coverage; lookups pass through unchanged
    TopDown,
    /// Row 0 is the bottom of the coverage; lookups invert against the grid
    /// height
    BottomUp,
}

/// Geographic bounding box in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoRect {
    /// Western edge longitude
    pub west: f64,
    /// Southern edge latitude
    pub south: f64,
    /// Eastern edge longitude
    pub east: f64,
    /// Northern edge latitude
    pub north: f64,
}

impl GeoRect {
    /// Longitude span in degrees
    #[must_use]
    pub fn lon_span(&self) -> f64 {
        self.east - self.west
    }

    /// Latitude span in degrees
    #[must_use]
    pub fn lat_span(&self) -> f64 {
        self.north - self.south
    }
}

/// A resolved catalog: one product, one frame grid, one path per populated
/// cell.
///
/// Rows handed to [`FrameIndex::frame_path`] are always logical, top-down
/// mosaic rows; the stored convention is translated away here and nowhere
/// else.
#[derive(Debug)]
pub struct FrameIndex {
    product: ProductType,
    frames_horizontal: u32,
    frames_vertical: u32,
    row_order: RowOrder,
    bounds: Option<GeoRect>,
    entries: HashMap<(u32, u32), PathBuf>,
}

impl FrameIndex {
    pub(crate) fn new(
        product: ProductType,
        frames_horizontal: u32,
        frames_vertical: u32,
        row_order: RowOrder,
        bounds: Option<GeoRect>,
        entries: HashMap<(u32, u32), PathBuf>,
    ) -> Self {
        Self {
            product,
            frames_horizontal,
            frames_vertical,
            row_order,
            bounds,
            entries,
        }
    }

    /// Product family of every frame in the catalog
    #[must_use]
    pub const fn product(&self) -> ProductType {
        self.product
    }

    /// Frame columns in the grid
    #[must_use]
    pub const fn frames_horizontal(&self) -> u32 {
        self.frames_horizontal
    }

    /// Frame rows in the grid
    #[must_use]
    pub const fn frames_vertical(&self) -> u32 {
        self.frames_vertical
    }

    /// Convention the entries were stored in
    #[must_use]
    pub const fn row_order(&self) -> RowOrder {
        self.row_order
    }

    /// Geographic extent, when the catalog declared one
    #[must_use]
    pub const fn bounds(&self) -> Option<GeoRect> {
        self.bounds
    }

    /// Number of populated grid cells
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no cell is populated
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Path of the frame at logical (top-down) grid position, if populated.
    ///
    /// Out-of-grid positions are `None`, same as in-grid holes; the caller
    /// cannot tell them apart and does not need to.
    #[must_use]
    pub fn frame_path(&self, row: u32, col: u32) -> Option<&Path> {
        if row >= self.frames_vertical || col >= self.frames_horizontal {
            return None;
        }
        let stored_row = match self.row_order {
            RowOrder::TopDown => row,
            RowOrder::BottomUp => self.frames_vertical - 1 - row,
        };
        self.entries.get(&(stored_row, col)).map(PathBuf::as_path)
    }
}
