use std::{fs::File, path::Path};

use anyhow::Result;
use image::{codecs::png::PngEncoder, ImageEncoder};
use librpf::{
    frame::decode_frame_image, Error, PixelRect, RpfFrameFile, RpfTileSource, TileBuffer,
    TileStatus,
};
use tracing::{debug, info, instrument};

#[instrument]
pub fn window_to_image(
    manifest_file: &Path,
    window: Option<PixelRect>,
    output_name: &Path,
) -> Result<()> {
    let source = RpfTileSource::open(manifest_file)?;
    let rect = window.unwrap_or_else(|| source.image_rect());
    debug!("rendering {rect:?} of a {} source", source.product());

    let mut tile = TileBuffer::new(rect, source.bands() as usize);
    if source.get_tile(&rect, 0, &mut tile)? == TileStatus::Empty {
        info!("no catalogued imagery under {rect:?}, the image will be blank");
    }
    write_png(output_name, &tile)
}

#[instrument]
pub fn frame_to_image(frame_file: &Path, output_name: &Path) -> Result<()> {
    let tile = decode_frame_image(frame_file)?;
    debug!(
        "decoded {}x{} px, {} band(s)",
        tile.rect().width(),
        tile.rect().height(),
        tile.bands()
    );
    write_png(output_name, &tile)
}

#[instrument]
pub fn print_info(file: &Path) -> Result<()> {
    match RpfFrameFile::from_file(file) {
        Ok(frame) => print_frame_info(&frame),
        Err(Error::NotRpf) => {
            debug!("no RPF header, trying the file as a catalog manifest");
            print_catalog_info(file)
        }
        Err(e) => Err(e.into()),
    }
}

fn print_frame_info(frame: &RpfFrameFile) -> Result<()> {
    let header = frame.header();
    let dated = header
        .standard_date
        .map_or_else(|| "undated".to_owned(), |d| d.to_string());
    println!("frame file      {}", header.file_name);
    println!("standard        {} ({dated})", header.standard_number);
    println!("byte order      {:?}", frame.byte_order());
    println!("classification  {}", header.classification);
    println!(
        "product         {} ({} band(s))",
        frame.product(),
        frame.bands()
    );

    let d = frame.description();
    println!(
        "subframes       {}x{} of {}x{} px, {} spectral group(s)",
        d.subframes_horizontal,
        d.subframes_vertical,
        d.subframe_width,
        d.subframe_height,
        d.spectral_groups
    );
    let total = usize::from(d.spectral_groups)
        * usize::from(d.subframes_horizontal)
        * usize::from(d.subframes_vertical);
    match frame.mask() {
        Some(mask) => println!("coverage        {}/{total} subframes present", mask.present()),
        None => println!("coverage        full, no subframe mask"),
    }
    if let Some(c) = frame.coverage() {
        println!("nw corner       {} N {} E", c.nw_lat, c.nw_lon);
        println!("se corner       {} N {} E", c.se_lat, c.se_lon);
    }
    for table in frame.color_tables() {
        println!(
            "color table     id {}, {} entries x {} band(s)",
            table.id(),
            table.len(),
            table.bands()
        );
    }
    Ok(())
}

fn print_catalog_info(file: &Path) -> Result<()> {
    let source = RpfTileSource::open(file)?;
    let index = source.index();
    println!("catalog         {}", file.display());
    println!(
        "product         {} ({} band(s))",
        source.product(),
        source.bands()
    );
    println!(
        "frame grid      {}x{}, {} populated",
        index.frames_horizontal(),
        index.frames_vertical(),
        index.len()
    );
    println!(
        "mosaic extent   {}x{} px",
        source.image_rect().width(),
        source.image_rect().height()
    );
    if let Some(b) = index.bounds() {
        println!(
            "geo bounds      {} W {} S to {} E {} N",
            b.west, b.south, b.east, b.north
        );
    }
    Ok(())
}

fn write_png(output_name: &Path, tile: &TileBuffer) -> Result<()> {
    let width = u32::try_from(tile.rect().width())?;
    let height = u32::try_from(tile.rect().height())?;

    let output = File::options()
        .create(true)
        .write(true)
        .truncate(true)
        .open(output_name)?;

    info!("Writing decoded imagery to {}", output_name.display());
    let encoder = PngEncoder::new(output);
    match tile.bands() {
        1 => encoder.write_image(tile.data(), width, height, image::ExtendedColorType::L8)?,
        _ => encoder.write_image(
            &tile.interleaved(),
            width,
            height,
            image::ExtendedColorType::Rgb8,
        )?,
    }
    info!(
        "Successfully wrote decoded imagery to {}",
        output_name.display()
    );
    Ok(())
}
