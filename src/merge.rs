//! The merge stage: read every captured frame, lay thumbnails out on a
//! grid, drop the logo in the bottom-right corner, write one PNG.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use image::{Rgba, RgbaImage, imageops};

use crate::{
    config::BoothConfig,
    error::{BoothError, BoothResult},
    layout::{self, GridLayout, Margins},
    session,
    thumbs::{self, OrientationFix},
};

#[derive(Clone, Debug)]
pub struct MergeOptions {
    pub basewidth: u32,
    pub margins: Margins,
    pub background: Rgba<u8>,
    pub logo: PathBuf,
    pub orientation: OrientationFix,
}

impl MergeOptions {
    pub fn from_config(cfg: &BoothConfig) -> Self {
        Self {
            basewidth: cfg.basewidth,
            margins: cfg.margins,
            background: Rgba(cfg.background),
            logo: cfg.logo.clone(),
            orientation: OrientationFix::for_top_mount(cfg.top_mount),
        }
    }
}

/// Merge every file in `img_dir` into a composite at `out_path`, returning
/// the canvas dimensions. Fails with `EmptyInput` before any size math or
/// file write when the directory holds no files.
///
/// Cell size is taken from the first thumbnail; see
/// [`thumbs::load_thumbnail_set`] for the uniform-size assumption.
pub fn merge_directory(
    img_dir: &Path,
    out_path: &Path,
    opts: &MergeOptions,
) -> BoothResult<(u32, u32)> {
    let files = session::list_files(img_dir)?;
    if files.is_empty() {
        return Err(BoothError::empty_input(format!(
            "working directory '{}' holds no files",
            img_dir.display()
        )));
    }

    let thumbs = thumbs::load_thumbnail_set(&files, opts.basewidth, opts.orientation)?;
    let grid = GridLayout::for_count(thumbs.len() as u32)?;
    let cell = thumbs[0].dimensions();
    let (width, height) = grid.canvas_size(cell, opts.margins);
    tracing::debug!(
        count = thumbs.len(),
        cols = grid.cols,
        rows = grid.rows,
        width,
        height,
        "layout resolved"
    );

    let mut canvas = RgbaImage::from_pixel(width, height, opts.background);
    let mut overlay = RgbaImage::new(width, height);

    for ((col, row), thumb) in grid.slots().zip(&thumbs) {
        let (x, y) = grid.cell_origin(col, row, cell, opts.margins);
        tracing::debug!(col, row, x, y, "pasting thumbnail");
        imageops::replace(&mut canvas, thumb, x, y);
    }

    let logo = image::open(&opts.logo)
        .with_context(|| format!("open logo '{}'", opts.logo.display()))?
        .to_rgba8();
    let (lx, ly) = layout::logo_origin((width, height), logo.dimensions(), opts.margins);
    imageops::replace(&mut overlay, &logo, lx, ly);

    imageops::overlay(&mut canvas, &overlay, 0, 0);

    session::ensure_parent_dir(out_path)?;
    canvas
        .save(out_path)
        .with_context(|| format!("write composite '{}'", out_path.display()))?;

    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use std::{fs, path::PathBuf};

    use super::*;

    fn scratch(name: &str) -> PathBuf {
        let dir = PathBuf::from("target").join("merge_tests").join(name);
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn opts_with_logo(dir: &Path, margins: Margins) -> MergeOptions {
        let logo = dir.join("logo.png");
        RgbaImage::from_pixel(40, 20, Rgba([0, 0, 255, 255]))
            .save(&logo)
            .unwrap();
        MergeOptions {
            basewidth: 500,
            margins,
            background: Rgba([255, 255, 255, 255]),
            logo,
            orientation: OrientationFix::Exif,
        }
    }

    #[test]
    fn empty_directory_fails_without_writing() {
        let dir = scratch("empty");
        let img_dir = dir.join("img");
        fs::create_dir(&img_dir).unwrap();
        let out = dir.join("out.png");
        let opts = opts_with_logo(&dir, Margins::default());

        let err = merge_directory(&img_dir, &out, &opts).unwrap_err();
        assert!(matches!(err, BoothError::EmptyInput(_)));
        assert!(!out.exists());
    }

    #[test]
    fn single_thumbnail_zero_margins_is_cell_plus_bottom() {
        let dir = scratch("single");
        let img_dir = dir.join("img");
        fs::create_dir(&img_dir).unwrap();
        RgbaImage::from_pixel(500, 500, Rgba([9, 9, 9, 255]))
            .save(img_dir.join("only.png"))
            .unwrap();
        let out = dir.join("out.png");
        let opts = opts_with_logo(
            &dir,
            Margins {
                outer: 0,
                inner: 0,
                bottom: 80,
            },
        );

        let size = merge_directory(&img_dir, &out, &opts).unwrap();
        assert_eq!(size, (500, 580));
        assert_eq!(image::image_dimensions(&out).unwrap(), (500, 580));
    }

    #[test]
    fn nine_uniform_frames_make_a_three_by_three_grid() {
        let dir = scratch("nine");
        let img_dir = dir.join("img");
        fs::create_dir(&img_dir).unwrap();
        for i in 0..9u8 {
            RgbaImage::from_pixel(2000, 1500, Rgba([20 * i, 10, 10, 255]))
                .save(img_dir.join(format!("frame_{i}.png")))
                .unwrap();
        }
        let out = dir.join("out.png");
        let opts = opts_with_logo(&dir, Margins::default());

        // 2000x1500 shrinks to 500x375; 3 cols, 3 rows.
        let size = merge_directory(&img_dir, &out, &opts).unwrap();
        assert_eq!(size, (3 * 500 + 40 + 20, 3 * 375 + 20 + 20 + 80));
        assert!(out.exists());
    }

    #[test]
    fn logo_lands_bottom_right_inside_the_margins() {
        let dir = scratch("logo");
        let img_dir = dir.join("img");
        fs::create_dir(&img_dir).unwrap();
        RgbaImage::from_pixel(500, 500, Rgba([0, 0, 0, 255]))
            .save(img_dir.join("only.png"))
            .unwrap();
        let out = dir.join("out.png");
        let margins = Margins {
            outer: 20,
            inner: 10,
            bottom: 80,
        };
        let opts = opts_with_logo(&dir, margins);

        let (width, height) = merge_directory(&img_dir, &out, &opts).unwrap();
        let composite = image::open(&out).unwrap().to_rgba8();

        // Logo is 40x20 solid blue, anchored at (width-20-40, height-20-10).
        let (lx, ly) = (width - 20 - 40, height - 20 - 10);
        assert_eq!(composite.get_pixel(lx, ly), &Rgba([0, 0, 255, 255]));
        assert_eq!(composite.get_pixel(lx + 39, ly + 19), &Rgba([0, 0, 255, 255]));
        // Just outside the logo the background is still white.
        assert_eq!(composite.get_pixel(lx - 1, ly), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn placement_is_column_major() {
        let dir = scratch("order");
        let img_dir = dir.join("img");
        fs::create_dir(&img_dir).unwrap();
        // Four 10x10 frames with distinct colours; alphabetical names so the
        // directory order is stable across filesystems.
        let colours = [
            Rgba([255, 0, 0, 255]),
            Rgba([0, 255, 0, 255]),
            Rgba([0, 0, 255, 255]),
            Rgba([255, 255, 0, 255]),
        ];
        for (i, colour) in colours.iter().enumerate() {
            RgbaImage::from_pixel(10, 10, *colour)
                .save(img_dir.join(format!("{}.png", char::from(b'a' + i as u8))))
                .unwrap();
        }
        let out = dir.join("out.png");
        // A 2x2 logo so it cannot cover the sampled cell centres.
        let logo = dir.join("logo.png");
        RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255]))
            .save(&logo)
            .unwrap();
        let opts = MergeOptions {
            basewidth: 500,
            margins: Margins::zero(),
            background: Rgba([255, 255, 255, 255]),
            logo,
            orientation: OrientationFix::Exif,
        };

        merge_directory(&img_dir, &out, &opts).unwrap();
        let composite = image::open(&out).unwrap().to_rgba8();

        // Thumbnails fill in directory-listing order; map each listed file
        // back to its colour, then check the column-major cells: index 1
        // goes below index 0, index 2 to the right of it.
        let files = session::list_files(&img_dir).unwrap();
        let colour_of = |name: &str| colours[(name.as_bytes()[0] - b'a') as usize];
        let ordered: Vec<_> = files
            .iter()
            .map(|p| colour_of(&p.file_name().unwrap().to_string_lossy()))
            .collect();

        assert_eq!(composite.get_pixel(5, 5), &ordered[0]); // col 0, row 0
        assert_eq!(composite.get_pixel(5, 15), &ordered[1]); // col 0, row 1
        assert_eq!(composite.get_pixel(15, 5), &ordered[2]); // col 1, row 0
        assert_eq!(composite.get_pixel(15, 15), &ordered[3]); // col 1, row 1
    }
}
