use crate::catalog::{FrameIndex, GeoRect, ProductType, RowOrder};
use bon::Builder;
use std::path::PathBuf;

/// One catalog entry of an externally parsed table of contents.
///
/// RPF tables of contents (the `A.TOC` file of a distribution) group frames
/// into boundary rectangles; this type is the digest of one such rectangle.
/// Parsing `A.TOC` itself is out of scope here, readers for it already exist
/// and hand over exactly these values.
///
/// ## Note
///
/// Entry positions use the table of contents' own convention: `frame_row` 0 is
/// the *southernmost* row of the coverage. The mosaic layer inverts rows on
/// lookup; hand the values over as the table lists them.
#[derive(Debug, Builder)]
#[non_exhaustive]
pub struct TocIndex {
    /// Product family of every frame under this boundary rectangle
    pub product: ProductType,

    /// Frame columns spanned by the boundary rectangle
    pub frames_horizontal: u32,

    /// Frame rows spanned by the boundary rectangle
    pub frames_vertical: u32,

    /// Geographic extent of the boundary rectangle
    pub bounds: Option<GeoRect>,

    /// Populated cells as `((frame_row, frame_col), path)`, frame rows counted
    /// bottom-up
    pub entries: Vec<((u32, u32), PathBuf)>,
}

impl TocIndex {
    pub(crate) fn into_index(self) -> FrameIndex {
        FrameIndex::new(
            self.product,
            self.frames_horizontal,
            self.frames_vertical,
            RowOrder::BottomUp,
            self.bounds,
            self.entries.into_iter().collect(),
        )
    }
}
