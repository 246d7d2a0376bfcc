//! Shared fixtures: a synthetic frame-file writer plus the in-memory codebook
//! and color tables it is built from, so tests can predict every output pixel.
#![allow(dead_code)]

use librpf::{
    frame::{codebook::Codebook, colormap::ColorTable},
    Endian,
};
use std::path::Path;

/// Geographic span of one synthetic frame in degrees, used by manifests
pub const FRAME_GEO_SPAN: f64 = 1.5;

const NITF_PREFIX_LEN: usize = 43;
const CODEBOOK_TABLE_BYTES: usize = 4096 * 4;
const SUBFRAME_BYTES: usize = 6144;
const SPATIAL_BYTES: usize = 36 * SUBFRAME_BYTES;

/// Knobs for the synthetic frame writer
pub struct FrameSpec {
    pub endian: Endian,
    pub bands: usize,
    pub nitf_wrapped: bool,
    pub with_mask: bool,
    /// Subframes whose mask entry is the absence sentinel; only meaningful
    /// with `with_mask`
    pub masked_out: Vec<(u32, u32)>,
}

impl Default for FrameSpec {
    fn default() -> Self {
        Self {
            endian: Endian::Little,
            bands: 1,
            nitf_wrapped: true,
            with_mask: false,
            masked_out: Vec::new(),
        }
    }
}

/// Absolute byte positions of every section the writer lays down
pub struct FrameLayout {
    pub rpf_base: usize,
    pub location: usize,
    pub records: usize,
    pub record_count: usize,
    pub coverage: usize,
    pub compression_subheader: usize,
    pub compression_lookup: usize,
    pub color_subheader: usize,
    pub colormap: usize,
    pub image_description: usize,
    pub display: usize,
    pub mask: usize,
    pub spatial: usize,
}

pub fn layout(spec: &FrameSpec) -> FrameLayout {
    let rpf_base = if spec.nitf_wrapped { NITF_PREFIX_LEN } else { 0 };
    let location = rpf_base + 48;
    let records = location + 14;
    let record_count = if spec.with_mask { 9 } else { 8 };
    let coverage = records + 10 * record_count;
    let compression_subheader = coverage + 96;
    let compression_lookup = compression_subheader + 6;
    let color_subheader = compression_lookup + 4 * 14 + 4 * CODEBOOK_TABLE_BYTES;
    let colormap = color_subheader + 14;
    let image_description = colormap + 23 + 256 * spec.bands;
    let display = image_description + 28;
    let mask = display + 9;
    let spatial = if spec.with_mask { mask + 36 * 4 } else { mask };
    FrameLayout {
        rpf_base,
        location,
        records,
        record_count,
        coverage,
        compression_subheader,
        compression_lookup,
        color_subheader,
        colormap,
        image_description,
        display,
        mask,
        spatial,
    }
}

/// The codeword every pixel of subframe `(row, col)` encodes
pub fn subframe_codeword(row: u32, col: u32) -> u16 {
    ((row * 6 + col) * 113) as u16
}

/// The decoded sample the test codebook and color tables produce at subframe
/// position `(y, x)` for a constant-`codeword` payload
pub fn expected_sample(codeword: u16, y: usize, x: usize, band: usize) -> u8 {
    raw_value(usize::from(codeword), y % 4, x % 4).wrapping_add(85 * band as u8)
}

fn raw_value(codeword: usize, t: usize, e: usize) -> u8 {
    ((codeword + 16 * t + e) & 0xFF) as u8
}

/// In-memory twin of the codebook the writer embeds in every frame
pub fn test_codebook() -> Codebook {
    let tables: Vec<Box<[u8]>> = (0..4)
        .map(|t| {
            let mut table = Vec::with_capacity(CODEBOOK_TABLE_BYTES);
            for codeword in 0..4096 {
                for e in 0..4 {
                    table.push(raw_value(codeword, t, e));
                }
            }
            table.into_boxed_slice()
        })
        .collect();
    let tables: [Box<[u8]>; 4] = tables.try_into().unwrap();
    Codebook::new(tables).unwrap()
}

/// In-memory twin of the color table the writer embeds
pub fn test_color_table(bands: usize) -> ColorTable {
    ColorTable::new(1, bands as u8, color_entries(bands)).unwrap()
}

fn color_entries(bands: usize) -> Vec<u8> {
    let mut entries = Vec::with_capacity(256 * bands);
    for v in 0..=255u8 {
        entries.push(v);
        if bands == 3 {
            entries.push(v.wrapping_add(85));
            entries.push(v.wrapping_add(170));
        }
    }
    entries
}

/// One compressed subframe whose 4096 codewords are all `codeword`
pub fn packed_subframe(codeword: u16) -> Vec<u8> {
    let b0 = (codeword >> 4) as u8;
    let b1 = (((codeword & 0xF) << 4) | (codeword >> 8)) as u8;
    let b2 = (codeword & 0xFF) as u8;
    let mut payload = Vec::with_capacity(SUBFRAME_BYTES);
    for _ in 0..SUBFRAME_BYTES / 3 {
        payload.extend_from_slice(&[b0, b1, b2]);
    }
    payload
}

pub fn write_frame(path: impl AsRef<Path>, spec: &FrameSpec) -> std::io::Result<()> {
    std::fs::write(path, frame_bytes(spec))
}

/// Serializes a complete synthetic frame file
pub fn frame_bytes(spec: &FrameSpec) -> Vec<u8> {
    let lay = layout(spec);
    let mut out = Out {
        buf: Vec::new(),
        endian: spec.endian,
    };

    if spec.nitf_wrapped {
        out.bytes(b"NITF02.10");
        out.bytes(&[b'0'; 23]);
        out.bytes(b"RPFHDR");
        out.bytes(b"00048");
    }
    assert_eq!(out.buf.len(), lay.rpf_base);

    // 48-byte RPF header
    out.u8(match spec.endian {
        Endian::Little => 0xFF,
        Endian::Big => 0x00,
    });
    out.u16(48);
    out.bytes(b"0000001.I41 ");
    out.u8(0);
    out.bytes(b"MIL-STD-2411   ");
    out.bytes(b"20240115");
    out.u8(b'U');
    out.bytes(b"US");
    out.bytes(b"  ");
    out.u32(48);
    assert_eq!(out.buf.len(), lay.location);

    // location section and component records
    out.u16((14 + 10 * lay.record_count) as u16);
    out.u32(14);
    out.u16(lay.record_count as u16);
    out.u16(10);
    out.u32((lay.spatial + SPATIAL_BYTES - lay.coverage) as u32);
    let colormap_len = (23 + 256 * spec.bands) as u32;
    out.record(130, 96, lay.coverage);
    out.record(131, 6, lay.compression_subheader);
    out.record(
        132,
        (4 * 14 + 4 * CODEBOOK_TABLE_BYTES) as u32,
        lay.compression_lookup,
    );
    out.record(134, 14, lay.color_subheader);
    out.record(135, colormap_len, lay.colormap);
    out.record(136, 28, lay.image_description);
    out.record(137, 9, lay.display);
    if spec.with_mask {
        out.record(138, 36 * 4, lay.mask);
    }
    out.record(140, SPATIAL_BYTES as u32, lay.spatial);
    assert_eq!(out.buf.len(), lay.coverage);

    // coverage: one frame anchored at (0 E, 0 N)
    let span = FRAME_GEO_SPAN;
    for value in [
        span, 0.0, 0.0, 0.0, span, span, 0.0, span,
        span / 1536.0, span / 1536.0, span / 1536.0, span / 1536.0,
    ] {
        out.f64(value);
    }
    assert_eq!(out.buf.len(), lay.compression_subheader);

    // compression subheader: algorithm 1, four lookup tables
    out.u16(1);
    out.u16(4);
    out.u16(0);
    for t in 0..4u32 {
        out.u16(t as u16);
        out.u32(4096);
        out.u16(4);
        out.u16(8);
        out.u32((4 * 14 + t as usize * CODEBOOK_TABLE_BYTES) as u32);
    }
    for t in 0..4usize {
        for codeword in 0..4096 {
            for e in 0..4 {
                out.u8(raw_value(codeword, t, e));
            }
        }
    }
    assert_eq!(out.buf.len(), lay.color_subheader);

    // color/grayscale subheader and colormap subsection with one table
    out.u8(1);
    out.u8(0);
    out.bytes(b"            ");
    out.u32(6);
    out.u16(17);
    out.u16(1);
    out.u32(256);
    out.u8(spec.bands as u8);
    out.u16(0);
    out.u32(23);
    out.u32(0);
    out.bytes(&color_entries(spec.bands));
    assert_eq!(out.buf.len(), lay.image_description);

    // image description: one spectral group, 6x6 subframes of 256x256
    for half in [1u16, 1, 1, 1, 6, 6] {
        out.u16(half);
    }
    out.u32(256);
    out.u32(256);
    out.u32(if spec.with_mask { 0 } else { 0xFFFF_FFFF });
    out.u32(0xFFFF_FFFF);
    assert_eq!(out.buf.len(), lay.display);

    // display parameters: 64 rows of 64 twelve-bit codes
    out.u32(64);
    out.u32(64);
    out.u8(12);
    assert_eq!(out.buf.len(), lay.mask);

    if spec.with_mask {
        for row in 0..6u32 {
            for col in 0..6u32 {
                if spec.masked_out.contains(&(row, col)) {
                    out.u32(0xFFFF_FFFF);
                } else {
                    out.u32((SUBFRAME_BYTES as u32) * (row * 6 + col));
                }
            }
        }
    }
    assert_eq!(out.buf.len(), lay.spatial);

    for row in 0..6 {
        for col in 0..6 {
            out.bytes(&packed_subframe(subframe_codeword(row, col)));
        }
    }
    out.buf
}

/// Rewrites the first location record carrying `from` to carry `to`, returning
/// whether one was found
pub fn retag_component(bytes: &mut [u8], spec: &FrameSpec, from: u16, to: u16) -> bool {
    let lay = layout(spec);
    for i in 0..lay.record_count {
        let at = lay.records + i * 10;
        if read_u16(bytes, at, spec.endian) == from {
            write_u16(bytes, at, to, spec.endian);
            return true;
        }
    }
    false
}

/// Overwrites a `u16` field in serialized frame bytes
pub fn write_u16(bytes: &mut [u8], at: usize, value: u16, endian: Endian) {
    let encoded = match endian {
        Endian::Little => value.to_le_bytes(),
        Endian::Big => value.to_be_bytes(),
    };
    bytes[at..at + 2].copy_from_slice(&encoded);
}

fn read_u16(bytes: &[u8], at: usize, endian: Endian) -> u16 {
    let pair = [bytes[at], bytes[at + 1]];
    match endian {
        Endian::Little => u16::from_le_bytes(pair),
        Endian::Big => u16::from_be_bytes(pair),
    }
}

struct Out {
    buf: Vec<u8>,
    endian: Endian,
}

impl Out {
    fn u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    fn u16(&mut self, value: u16) {
        match self.endian {
            Endian::Little => self.buf.extend_from_slice(&value.to_le_bytes()),
            Endian::Big => self.buf.extend_from_slice(&value.to_be_bytes()),
        }
    }

    fn u32(&mut self, value: u32) {
        match self.endian {
            Endian::Little => self.buf.extend_from_slice(&value.to_le_bytes()),
            Endian::Big => self.buf.extend_from_slice(&value.to_be_bytes()),
        }
    }

    fn f64(&mut self, value: f64) {
        match self.endian {
            Endian::Little => self.buf.extend_from_slice(&value.to_le_bytes()),
            Endian::Big => self.buf.extend_from_slice(&value.to_be_bytes()),
        }
    }

    fn bytes(&mut self, value: &[u8]) {
        self.buf.extend_from_slice(value);
    }

    fn record(&mut self, tag: u16, length: u32, offset: usize) {
        self.u16(tag);
        self.u32(length);
        self.u32(offset as u32);
    }
}
