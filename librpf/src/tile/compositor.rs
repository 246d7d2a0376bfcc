//! Executes frame tasks: parse, decode the touched subframes, blit into the
//! output tile.
//!
//! Real frame libraries are routinely incomplete or partially corrupt, so a
//! frame that fails to parse is logged and skipped, leaving its region of the
//! tile blank; a subframe that fails to read decodes as black. Only the output
//! buffer ever accumulates state, scratch space lives in a caller-owned
//! [`DecodeWorkspace`].

use crate::{
    frame::{decompress::decode_subframe, RpfFrameFile},
    tile::{locator::FrameTask, PixelRect, TileBuffer},
    Error, COMPRESSED_SUBFRAME_BYTES, SUBFRAME_PIXEL_SPAN,
};
use std::{
    fs::File,
    io::{BufReader, Read, Seek},
};
use tracing::{debug, warn};

/// Reusable scratch buffers for subframe decoding.
///
/// One compressed payload and one decoded block; sized once per band count and
/// reused across every subframe of a request.
#[derive(Debug)]
pub struct DecodeWorkspace {
    compressed: Vec<u8>,
    decoded: Vec<u8>,
    bands: usize,
}

impl DecodeWorkspace {
    /// Allocates scratch space for `bands`-band decoding
    #[must_use]
    pub fn new(bands: usize) -> Self {
        let plane = (SUBFRAME_PIXEL_SPAN * SUBFRAME_PIXEL_SPAN) as usize;
        Self {
            compressed: vec![0; COMPRESSED_SUBFRAME_BYTES],
            decoded: vec![0; plane * bands],
            bands,
        }
    }

    /// Band count this workspace was sized for
    #[must_use]
    pub const fn bands(&self) -> usize {
        self.bands
    }
}

/// Runs every task against the output tile, returning how many frames made it
/// in.
///
/// Failures are per-frame: a broken frame file leaves its region of `out`
/// untouched and the mosaic carries on. The exception is every task failing at
/// once, which means the source as a whole is unusable for this request; that
/// surfaces the last frame's error instead of quietly handing back a blank
/// tile.
///
/// # Errors
///
/// Fails only when `tasks` is non-empty and not a single frame decoded.
pub fn composite(
    tasks: &[FrameTask],
    workspace: &mut DecodeWorkspace,
    out: &mut TileBuffer,
) -> Result<usize, Error> {
    let mut composited = 0;
    let mut last_error = None;
    for task in tasks {
        match composite_frame(task, workspace, out) {
            Ok(()) => composited += 1,
            Err(e) => {
                warn!(
                    "skipping frame {} at grid ({}, {}): {e}",
                    task.path.display(),
                    task.grid_row,
                    task.grid_col
                );
                last_error = Some(e);
            }
        }
    }
    match (composited, last_error) {
        (0, Some(e)) => Err(e),
        _ => Ok(composited),
    }
}

fn composite_frame(
    task: &FrameTask,
    workspace: &mut DecodeWorkspace,
    out: &mut TileBuffer,
) -> Result<(), Error> {
    let mut reader = BufReader::new(File::open(&task.path)?);
    let frame = RpfFrameFile::parse(&mut reader)?;
    debug!(
        "compositing {}: subframe rows {:?}, cols {:?}",
        task.path.display(),
        task.subframe_rows,
        task.subframe_cols
    );
    blit_subframes(
        &frame,
        &mut reader,
        task.subframe_rows,
        task.subframe_cols,
        (task.frame_rect.min_x(), task.frame_rect.min_y()),
        workspace,
        out,
    )
}

/// Decodes a rectangular run of subframes and blits them at `frame_origin`.
///
/// Subframes that are absent, or whose payload fails to read, blit as black;
/// the per-subframe boundary is the unit of degradation.
pub(crate) fn blit_subframes<R>(
    frame: &RpfFrameFile,
    reader: &mut R,
    rows: (u32, u32),
    cols: (u32, u32),
    frame_origin: (i64, i64),
    workspace: &mut DecodeWorkspace,
    out: &mut TileBuffer,
) -> Result<(), Error>
where
    R: Read + Seek,
{
    if frame.bands() != workspace.bands {
        return Err(Error::Format(format!(
            "{}-band frame in a {}-band mosaic",
            frame.bands(),
            workspace.bands
        )));
    }
    let table = frame.decode_table();
    for row in rows.0..=rows.1 {
        for col in cols.0..=cols.1 {
            let present = match frame.read_subframe(reader, 0, row, col, &mut workspace.compressed)
            {
                Ok(present) => present,
                Err(e) => {
                    warn!("unreadable subframe ({row}, {col}): {e}");
                    false
                }
            };
            if present {
                decode_subframe(
                    &workspace.compressed,
                    frame.codebook(),
                    table,
                    &mut workspace.decoded,
                );
            } else {
                workspace.decoded.fill(0);
            }
            let subframe_rect = PixelRect::from_size(
                frame_origin.0 + i64::from(col) * SUBFRAME_PIXEL_SPAN,
                frame_origin.1 + i64::from(row) * SUBFRAME_PIXEL_SPAN,
                SUBFRAME_PIXEL_SPAN,
                SUBFRAME_PIXEL_SPAN,
            );
            out.load_clipped(&workspace.decoded, subframe_rect);
        }
    }
    Ok(())
}
