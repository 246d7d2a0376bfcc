//! Pixel-space building blocks of the mosaic layer: rectangles, band-planar
//! tile buffers, and the locate/composite pipeline over them.

pub mod compositor;
pub mod locator;
mod rect;

pub use rect::PixelRect;

/// Band-planar pixel buffer covering one rectangle of mosaic space.
///
/// Planes are stored back to back: all of band 0 row-major, then band 1, then
/// band 2. CIB tiles hold one plane, CADRG tiles three.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileBuffer {
    rect: PixelRect,
    bands: usize,
    pixels: Vec<u8>,
}

impl TileBuffer {
    /// Creates a zero-filled (black) buffer over `rect`
    #[must_use]
    pub fn new(rect: PixelRect, bands: usize) -> Self {
        Self {
            rect,
            bands,
            pixels: vec![0; rect.area() as usize * bands],
        }
    }

    /// Creates a buffer over `rect` with every sample set to `value`
    #[must_use]
    pub fn filled(rect: PixelRect, bands: usize, value: u8) -> Self {
        Self {
            rect,
            bands,
            pixels: vec![value; rect.area() as usize * bands],
        }
    }

    /// The rectangle this buffer covers
    #[must_use]
    pub const fn rect(&self) -> PixelRect {
        self.rect
    }

    /// Number of band planes
    #[must_use]
    pub const fn bands(&self) -> usize {
        self.bands
    }

    /// Sets every sample in every band to `value`
    pub fn fill(&mut self, value: u8) {
        self.pixels.fill(value);
    }

    /// The full band-planar sample data
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.pixels
    }

    /// One band plane, row-major
    ///
    /// # Panics
    ///
    /// Panics if `band >= self.bands()`.
    #[must_use]
    pub fn band(&self, band: usize) -> &[u8] {
        assert!(band < self.bands);
        let plane = self.rect.area() as usize;
        &self.pixels[band * plane..(band + 1) * plane]
    }

    /// Sample at absolute mosaic coordinates, or `None` outside the buffer
    #[must_use]
    pub fn sample(&self, x: i64, y: i64, band: usize) -> Option<u8> {
        if !self.rect.contains(x, y) || band >= self.bands {
            return None;
        }
        let row = (y - self.rect.min_y()) as usize;
        let col = (x - self.rect.min_x()) as usize;
        let plane = self.rect.area() as usize;
        self.pixels
            .get(band * plane + row * self.rect.width() as usize + col)
            .copied()
    }

    /// Copies the overlapping part of a band-planar block into this buffer.
    ///
    /// `src` covers `src_rect` in the same absolute coordinate space and must
    /// carry the same band count; pixels falling outside `self` are dropped.
    pub fn load_clipped(&mut self, src: &[u8], src_rect: PixelRect) {
        debug_assert_eq!(src.len(), src_rect.area() as usize * self.bands);
        let Some(clip) = self.rect.intersect(&src_rect) else {
            return;
        };
        let src_width = src_rect.width() as usize;
        let dst_width = self.rect.width() as usize;
        let src_plane = src_rect.area() as usize;
        let dst_plane = self.rect.area() as usize;
        let copy_width = clip.width() as usize;
        let src_x0 = (clip.min_x() - src_rect.min_x()) as usize;
        let dst_x0 = (clip.min_x() - self.rect.min_x()) as usize;
        for band in 0..self.bands {
            for y in clip.min_y()..=clip.max_y() {
                let src_row = (y - src_rect.min_y()) as usize;
                let dst_row = (y - self.rect.min_y()) as usize;
                let from = band * src_plane + src_row * src_width + src_x0;
                let to = band * dst_plane + dst_row * dst_width + dst_x0;
                self.pixels[to..to + copy_width].copy_from_slice(&src[from..from + copy_width]);
            }
        }
    }

    /// Repacks the buffer pixel-interleaved (RGBRGB...), the layout image
    /// encoders want
    #[must_use]
    pub fn interleaved(&self) -> Vec<u8> {
        let plane = self.rect.area() as usize;
        let mut out = Vec::with_capacity(plane * self.bands);
        for at in 0..plane {
            for band in 0..self.bands {
                out.push(self.pixels[band * plane + at]);
            }
        }
        out
    }
}
