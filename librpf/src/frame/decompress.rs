//! Vector-quantization expansion of compressed subframes.
//!
//! A compressed subframe is exactly [`COMPRESSED_SUBFRAME_BYTES`] long: 4096
//! twelve-bit codewords packed two per three bytes. Each codeword pair expands
//! to a 4x8 pixel patch through the frame's [`Codebook`], and the raw color
//! indices it yields pass through a [`ColorTable`] on their way into the
//! output. Output is band-planar: all of band 0, then band 1, then band 2.

use crate::{
    frame::{codebook::Codebook, colormap::ColorTable},
    COMPRESSED_SUBFRAME_BYTES, SUBFRAME_PIXEL_SPAN,
};

const EDGE: usize = SUBFRAME_PIXEL_SPAN as usize;
const PLANE: usize = EDGE * EDGE;
// Each codeword reconstructs a 4x4 patch quarter; a pair covers 4 rows x 8 columns.
const KERNEL_ROWS: usize = 4;
const KERNEL_COLS: usize = 4;

trait VqExpander<const BANDS: usize> {
    fn write_pixel(out: &mut [u8], at: usize, table: &ColorTable, raw: u8);

    fn expand_subframe(compressed: &[u8], codebook: &Codebook, table: &ColorTable, out: &mut [u8]) {
        let mut input = 0;
        for i in (0..EDGE).step_by(KERNEL_ROWS) {
            for j in (0..EDGE).step_by(2 * KERNEL_COLS) {
                let (first, second) = unpack_codeword_pair([
                    compressed[input],
                    compressed[input + 1],
                    compressed[input + 2],
                ]);
                input += 3;
                for t in 0..KERNEL_ROWS {
                    let left = codebook.row(t, first);
                    let right = codebook.row(t, second);
                    let row_at = (i + t) * EDGE + j;
                    for e in 0..KERNEL_COLS {
                        Self::write_pixel(out, row_at + e, table, left[e]);
                        Self::write_pixel(out, row_at + e + KERNEL_COLS, table, right[e]);
                    }
                }
            }
        }
    }
}

struct Expander<const BANDS: usize>;

impl VqExpander<1> for Expander<1> {
    #[inline]
    fn write_pixel(out: &mut [u8], at: usize, table: &ColorTable, raw: u8) {
        out[at] = table.gray(raw);
    }
}

impl VqExpander<3> for Expander<3> {
    #[inline]
    fn write_pixel(out: &mut [u8], at: usize, table: &ColorTable, raw: u8) {
        let [r, g, b] = table.rgb(raw);
        out[at] = r;
        out[PLANE + at] = g;
        out[2 * PLANE + at] = b;
    }
}

/// Expands one compressed subframe into band-planar pixels.
///
/// The band count comes from `table`: grayscale tables produce one 256x256
/// plane, RGB tables three. Absent subframes never reach this function; the
/// callers zero-fill those instead.
///
/// # Panics
///
/// Panics if `compressed` is not exactly [`COMPRESSED_SUBFRAME_BYTES`] long or
/// `out` is not `256 * 256 * bands` long.
pub fn decode_subframe(compressed: &[u8], codebook: &Codebook, table: &ColorTable, out: &mut [u8]) {
    assert_eq!(compressed.len(), COMPRESSED_SUBFRAME_BYTES);
    match table.bands() {
        1 => {
            assert_eq!(out.len(), PLANE);
            Expander::<1>::expand_subframe(compressed, codebook, table, out);
        }
        3 => {
            assert_eq!(out.len(), 3 * PLANE);
            Expander::<3>::expand_subframe(compressed, codebook, table, out);
        }
        _ => unreachable!("ColorTable bands are validated on construction"),
    }
}

/// Splits three packed bytes into two 12-bit codewords.
///
/// ```
/// use librpf::frame::decompress::unpack_codeword_pair;
///
/// assert_eq!(unpack_codeword_pair([0xAB, 0xCD, 0xEF]), (0xABC, 0xDEF));
/// ```
#[inline]
#[must_use]
pub const fn unpack_codeword_pair(packed: [u8; 3]) -> (u16, u16) {
    let first = ((packed[0] as u16) << 4) | ((packed[1] as u16) >> 4);
    let second = (((packed[1] & 0x0F) as u16) << 8) | packed[2] as u16;
    (first, second)
}
