//! Maps a requested pixel window to the frames and subframes that cover it.
//!
//! Everything here is integer geometry over the frame grid; no file is opened
//! and nothing is decoded. Grid cells the catalog has no frame for simply
//! produce no task, which is what lets sparsely-populated libraries mosaic
//! cleanly.

use crate::{catalog::FrameIndex, tile::PixelRect, FRAME_PIXEL_SPAN, SUBFRAME_PIXEL_SPAN};
use itertools::iproduct;
use std::path::PathBuf;
use tracing::trace;

/// One frame's worth of work for the compositor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameTask {
    /// Logical (top-down) grid row of the frame
    pub grid_row: u32,
    /// Grid column of the frame
    pub grid_col: u32,
    /// Frame file to decode
    pub path: PathBuf,
    /// The frame's full extent in mosaic space
    pub frame_rect: PixelRect,
    /// Inclusive range of subframe rows touched by the request
    pub subframe_rows: (u32, u32),
    /// Inclusive range of subframe columns touched by the request
    pub subframe_cols: (u32, u32),
}

/// Plans the frame reads needed to fill `request`.
///
/// The request is clipped to `bounds` first; a request entirely outside the
/// mosaic yields no tasks. Each task carries only the subframe ranges that
/// intersect the clipped request, so a small window inside a frame touches a
/// single subframe, not 36.
#[must_use]
pub fn locate(request: &PixelRect, bounds: &PixelRect, index: &FrameIndex) -> Vec<FrameTask> {
    let Some(clipped) = request.intersect(bounds) else {
        return Vec::new();
    };

    let first_row = clipped.min_y().div_euclid(FRAME_PIXEL_SPAN);
    let last_row = clipped.max_y().div_euclid(FRAME_PIXEL_SPAN);
    let first_col = clipped.min_x().div_euclid(FRAME_PIXEL_SPAN);
    let last_col = clipped.max_x().div_euclid(FRAME_PIXEL_SPAN);

    let mut tasks = Vec::new();
    for (row, col) in iproduct!(first_row..=last_row, first_col..=last_col) {
        let Some(path) = index.frame_path(row as u32, col as u32) else {
            trace!("no frame catalogued at grid ({row}, {col})");
            continue;
        };
        let frame_rect = PixelRect::from_size(
            col * FRAME_PIXEL_SPAN,
            row * FRAME_PIXEL_SPAN,
            FRAME_PIXEL_SPAN,
            FRAME_PIXEL_SPAN,
        );
        let Some(overlap) = clipped.intersect(&frame_rect) else {
            continue;
        };
        // Subframe ranges are relative to the frame's own origin.
        let local = overlap.translated(-frame_rect.min_x(), -frame_rect.min_y());
        tasks.push(FrameTask {
            grid_row: row as u32,
            grid_col: col as u32,
            path: path.to_path_buf(),
            frame_rect,
            subframe_rows: (
                (local.min_y() / SUBFRAME_PIXEL_SPAN) as u32,
                (local.max_y() / SUBFRAME_PIXEL_SPAN) as u32,
            ),
            subframe_cols: (
                (local.min_x() / SUBFRAME_PIXEL_SPAN) as u32,
                (local.max_x() / SUBFRAME_PIXEL_SPAN) as u32,
            ),
        });
    }
    tasks
}
