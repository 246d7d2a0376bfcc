use librpf::{
    catalog::{ProductType, RowOrder},
    tile::{locator::locate, PixelRect},
    Error, RpfTileSource, TocIndex,
};
use mktemp::Temp;
use std::path::{Path, PathBuf};

fn write_manifest(dir: &Path, text: &str) -> anyhow::Result<PathBuf> {
    let path = dir.join("cat.idx");
    std::fs::write(&path, text)?;
    Ok(path)
}

#[test]
fn manifest_grid_dimensions_follow_the_first_entry() -> anyhow::Result<()> {
    let tmp = Temp::new_dir()?;
    let manifest = write_manifest(
        tmp.as_ref(),
        "0,0|3,4.5|1\n\
         a.i41|0,3|1.5,4.5\n\
         b.i41|1.5,0|3,1.5\n",
    )?;

    let source = RpfTileSource::open(manifest)?;
    assert_eq!(source.product(), ProductType::Cib);
    assert_eq!(source.bands(), 1);

    let index = source.index();
    assert_eq!(index.frames_horizontal(), 2);
    assert_eq!(index.frames_vertical(), 3);
    assert_eq!(index.row_order(), RowOrder::TopDown);
    assert_eq!(index.len(), 2);

    assert_eq!(source.image_rect(), PixelRect::new(0, 0, 2 * 1536 - 1, 3 * 1536 - 1));

    assert!(index.frame_path(0, 0).unwrap().ends_with("a.i41"));
    assert!(index.frame_path(2, 1).unwrap().ends_with("b.i41"));
    assert!(index.frame_path(1, 0).is_none(), "catalog hole");
    assert!(index.frame_path(3, 0).is_none(), "row out of grid");
    assert!(index.frame_path(0, 2).is_none(), "column out of grid");
    Ok(())
}

#[test]
fn manifest_rows_count_from_the_top() -> anyhow::Result<()> {
    let tmp = Temp::new_dir()?;
    let manifest = write_manifest(
        tmp.as_ref(),
        "0,0|1.5,15|1\n\
         top.i41|0,13.5|1.5,15\n\
         fourth.i41|0,9|1.5,10.5\n",
    )?;

    let source = RpfTileSource::open(manifest)?;
    let index = source.index();
    assert_eq!(index.frames_vertical(), 10);
    assert!(index.frame_path(0, 0).unwrap().ends_with("top.i41"));
    assert!(index.frame_path(3, 0).unwrap().ends_with("fourth.i41"));
    Ok(())
}

#[test]
fn toc_rows_count_from_the_bottom() -> anyhow::Result<()> {
    let toc = TocIndex::builder()
        .product(ProductType::Cib)
        .frames_horizontal(1)
        .frames_vertical(10)
        .entries(vec![
            ((6, 0), PathBuf::from("stored-six.i41")),
            ((0, 0), PathBuf::from("bottom.i41")),
        ])
        .build();

    let source = RpfTileSource::from_toc(toc)?;
    let index = source.index();
    assert_eq!(index.row_order(), RowOrder::BottomUp);

    // Logical row 3 of a 10-row grid is stored row 6; the bottom row is last.
    assert!(index.frame_path(3, 0).unwrap().ends_with("stored-six.i41"));
    assert!(index.frame_path(9, 0).unwrap().ends_with("bottom.i41"));
    assert!(index.frame_path(0, 0).is_none());
    Ok(())
}

#[test]
fn overflowing_entries_clamp_to_the_grid_edge() -> anyhow::Result<()> {
    let tmp = Temp::new_dir()?;
    let manifest = write_manifest(
        tmp.as_ref(),
        "0,0|3,1.5|1\n\
         a.i41|0,0|1.5,1.5\n\
         far.i41|7.5,0|9,1.5\n",
    )?;

    let source = RpfTileSource::open(manifest)?;
    let index = source.index();
    assert_eq!(index.frames_horizontal(), 2);
    assert!(index.frame_path(0, 1).unwrap().ends_with("far.i41"));
    Ok(())
}

#[test]
fn two_band_manifest_is_an_unknown_product() -> anyhow::Result<()> {
    let tmp = Temp::new_dir()?;
    let manifest = write_manifest(
        tmp.as_ref(),
        "0,0|1.5,1.5|2\n\
         a.i41|0,0|1.5,1.5\n",
    )?;

    let err = RpfTileSource::open(manifest).unwrap_err();
    assert!(matches!(err, Error::UnknownProduct(_)), "{err:?}");
    Ok(())
}

#[test]
fn stray_manifest_lines_are_skipped() -> anyhow::Result<()> {
    let tmp = Temp::new_dir()?;
    let manifest = write_manifest(
        tmp.as_ref(),
        "0,0|1.5,1.5|1\n\
         this line is not an entry\n\
         |0,0|1.5,1.5\n\
         a.i41|0,0|1.5,1.5\n",
    )?;

    let source = RpfTileSource::open(manifest)?;
    assert_eq!(source.index().len(), 1);
    assert!(source.index().frame_path(0, 0).unwrap().ends_with("a.i41"));
    Ok(())
}

#[test]
fn manifest_without_entries_is_rejected() -> anyhow::Result<()> {
    let tmp = Temp::new_dir()?;

    let empty = write_manifest(tmp.as_ref(), "")?;
    let err = RpfTileSource::open(empty).unwrap_err();
    assert!(matches!(err, Error::Manifest { line: 1, .. }), "{err:?}");

    let header_only = write_manifest(tmp.as_ref(), "0,0|1.5,1.5|1\n")?;
    let err = RpfTileSource::open(header_only).unwrap_err();
    assert!(matches!(err, Error::Manifest { line: 1, .. }), "{err:?}");
    Ok(())
}

#[test]
fn locate_plans_only_the_touched_subframes() -> anyhow::Result<()> {
    let toc = TocIndex::builder()
        .product(ProductType::Cib)
        .frames_horizontal(1)
        .frames_vertical(1)
        .entries(vec![((0, 0), PathBuf::from("f.i41"))])
        .build();
    let source = RpfTileSource::from_toc(toc)?;

    let tasks = locate(
        &PixelRect::new(0, 0, 255, 255),
        &source.image_rect(),
        source.index(),
    );
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].grid_row, 0);
    assert_eq!(tasks[0].grid_col, 0);
    assert_eq!(tasks[0].frame_rect, PixelRect::new(0, 0, 1535, 1535));
    assert_eq!(tasks[0].subframe_rows, (0, 0));
    assert_eq!(tasks[0].subframe_cols, (0, 0));

    let tasks = locate(
        &PixelRect::new(200, 300, 900, 800),
        &source.image_rect(),
        source.index(),
    );
    assert_eq!(tasks[0].subframe_rows, (1, 3));
    assert_eq!(tasks[0].subframe_cols, (0, 3));
    Ok(())
}

#[test]
fn locate_outside_the_mosaic_is_empty() -> anyhow::Result<()> {
    let toc = TocIndex::builder()
        .product(ProductType::Cib)
        .frames_horizontal(1)
        .frames_vertical(1)
        .entries(vec![((0, 0), PathBuf::from("f.i41"))])
        .build();
    let source = RpfTileSource::from_toc(toc)?;

    let tasks = locate(
        &PixelRect::new(2000, 0, 3000, 100),
        &source.image_rect(),
        source.index(),
    );
    assert!(tasks.is_empty());
    Ok(())
}

#[test]
fn locate_skips_catalog_holes() -> anyhow::Result<()> {
    let toc = TocIndex::builder()
        .product(ProductType::Cib)
        .frames_horizontal(2)
        .frames_vertical(1)
        .entries(vec![((0, 0), PathBuf::from("left.i41"))])
        .build();
    let source = RpfTileSource::from_toc(toc)?;

    // The request spans both grid cells but only one is populated.
    let tasks = locate(
        &PixelRect::new(0, 0, 3071, 1535),
        &source.image_rect(),
        source.index(),
    );
    assert_eq!(tasks.len(), 1);
    assert!(tasks[0].path.ends_with("left.i41"));
    Ok(())
}
