//! The flat-manifest catalog strategy.
//!
//! A manifest is UTF-8 text, one record per line, `|` between fields and `,`
//! inside coordinate pairs. The first line declares the global bounding box
//! and band count:
//!
//! ```text
//! llLon,llLat|urLon,urLat|bandCount
//! ```
//!
//! Every following line is one frame entry, `filename|llLon,llLat|urLon,urLat`.
//! The first entry's extent doubles as the angular size of a frame: grid
//! dimensions fall out as `round(totalSpan / frameSpan)`, and each entry lands
//! on the cell proportionally closest to its corner, clamped to the grid edge.
//! Manifests are written in screen order, so the resulting index is
//! [`RowOrder::TopDown`].

use crate::{
    catalog::{FrameIndex, GeoRect, ProductType, RowOrder},
    Error,
};
use nom::{
    bytes::complete::{tag, take_till},
    character::complete::digit1,
    combinator::map_res,
    number::complete::double,
    IResult,
};
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

pub(crate) fn load(path: &Path) -> Result<FrameIndex, Error> {
    let text = std::fs::read_to_string(path)?;
    let base_dir = path.parent().map_or_else(PathBuf::new, Path::to_path_buf);
    parse_manifest(&text, &base_dir)
}

/// Builds the index out of manifest text; entry file names resolve relative to
/// `base_dir`.
pub(crate) fn parse_manifest(text: &str, base_dir: &Path) -> Result<FrameIndex, Error> {
    let mut lines = text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());

    let Some((header_at, header)) = lines.next() else {
        return Err(manifest_error(0, "empty manifest"));
    };
    let (bounds, bands) = match parse_header_line(header.trim()) {
        Ok((_, parsed)) => parsed,
        Err(e) => {
            return Err(manifest_error(
                header_at,
                format!("bad global bounds: {e:?}"),
            ))
        }
    };
    let product = ProductType::from_band_count(bands)?;

    // Unparseable entries are warned away rather than fatal; manifests are
    // hand-maintained often enough that one stray line should not take the
    // whole library down.
    let mut parsed = Vec::new();
    for (at, line) in lines {
        match parse_entry_line(line.trim()) {
            Ok((_, (name, _))) if name.is_empty() => {
                warn!("manifest line {}: entry with empty file name", at + 1);
            }
            Ok((_, entry)) => parsed.push((at, entry)),
            Err(e) => warn!("manifest line {}: unparseable entry: {e:?}", at + 1),
        }
    }
    let Some((first_at, (_, first_extent))) = parsed.first() else {
        return Err(manifest_error(header_at, "no frame entries"));
    };

    let frame_lon = first_extent.lon_span();
    let frame_lat = first_extent.lat_span();
    if !frame_lon.is_finite() || !frame_lat.is_finite() || frame_lon <= 0.0 || frame_lat <= 0.0 {
        return Err(manifest_error(
            *first_at,
            "first entry must span a positive frame extent",
        ));
    }
    let frames_horizontal = span_count(bounds.lon_span(), frame_lon);
    let frames_vertical = span_count(bounds.lat_span(), frame_lat);
    debug!(
        "manifest grid {frames_horizontal}x{frames_vertical}, frame span {frame_lon}x{frame_lat} degrees"
    );

    let mut entries = HashMap::new();
    for (at, (name, extent)) in &parsed {
        let col = position(extent.west - bounds.west, frame_lon, frames_horizontal);
        let row = position(bounds.north - extent.north, frame_lat, frames_vertical);
        if let Some(previous) = entries.insert((row, col), base_dir.join(name)) {
            debug!(
                "manifest line {}: cell ({row}, {col}) re-assigned over {}",
                at + 1,
                previous.display()
            );
        }
    }

    Ok(FrameIndex::new(
        product,
        frames_horizontal,
        frames_vertical,
        RowOrder::TopDown,
        Some(bounds),
        entries,
    ))
}

fn parse_lon_lat(input: &str) -> IResult<&str, (f64, f64)> {
    let (input, lon) = double(input)?;
    let (input, _) = tag(",")(input)?;
    let (input, lat) = double(input)?;
    Ok((input, (lon, lat)))
}

fn parse_header_line(input: &str) -> IResult<&str, (GeoRect, u32)> {
    let (input, (west, south)) = parse_lon_lat(input)?;
    let (input, _) = tag("|")(input)?;
    let (input, (east, north)) = parse_lon_lat(input)?;
    let (input, _) = tag("|")(input)?;
    let (input, bands) = map_res(digit1, |d: &str| d.parse::<u32>())(input)?;
    Ok((
        input,
        (
            GeoRect {
                west,
                south,
                east,
                north,
            },
            bands,
        ),
    ))
}

fn parse_entry_line(input: &str) -> IResult<&str, (&str, GeoRect)> {
    let (input, name) = take_till(|c| c == '|')(input)?;
    let (input, _) = tag("|")(input)?;
    let (input, (west, south)) = parse_lon_lat(input)?;
    let (input, _) = tag("|")(input)?;
    let (input, (east, north)) = parse_lon_lat(input)?;
    Ok((
        input,
        (
            name.trim(),
            GeoRect {
                west,
                south,
                east,
                north,
            },
        ),
    ))
}

fn span_count(total: f64, frame: f64) -> u32 {
    let count = (total / frame).round();
    if count >= 1.0 {
        count as u32
    } else {
        1
    }
}

/// Nearest grid ordinal for a proportional distance, clamped into the grid.
fn position(distance: f64, frame_span: f64, count: u32) -> u32 {
    let at = (distance / frame_span).round();
    at.clamp(0.0, f64::from(count - 1)) as u32
}

fn manifest_error(at: usize, reason: impl Into<String>) -> Error {
    Error::Manifest {
        line: at + 1,
        reason: reason.into(),
    }
}
