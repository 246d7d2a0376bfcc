/// Demonstrates how to decode a single RPF frame file to a png
/// using the [`image`] crate
///
use anyhow::Context;
use image::{codecs::png::PngEncoder, ImageEncoder};
use librpf::frame;
use std::fs::File;

fn main() -> anyhow::Result<()> {
    let path = std::env::args()
        .nth(1)
        .context("usage: frame_to_png <frame file>")?;
    let tile = frame::decode_frame_image(&path)?;

    let output = File::options()
        .create(true)
        .write(true)
        .truncate(true)
        .open("frame_to_png_example.png")?;

    let encoder = PngEncoder::new(output);
    let (width, height) = (tile.rect().width() as u32, tile.rect().height() as u32);
    match tile.bands() {
        1 => encoder.write_image(tile.data(), width, height, image::ExtendedColorType::L8)?,
        _ => encoder.write_image(
            &tile.interleaved(),
            width,
            height,
            image::ExtendedColorType::Rgb8,
        )?,
    }
    Ok(())
}
