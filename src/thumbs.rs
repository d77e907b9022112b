//! Thumbnail normalization: decode a captured frame, shrink it into the
//! `basewidth` bounding box, and apply exactly one orientation correction.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use image::{
    DynamicImage, ImageDecoder as _, ImageReader, RgbaImage, imageops::FilterType,
    metadata::Orientation,
};

use crate::error::BoothResult;

/// Which orientation correction a deployment applies. The two are mutually
/// exclusive: a top-mounted camera gets a fixed 180-degree rotation and its
/// EXIF tag is ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrientationFix {
    /// Honour the embedded EXIF orientation tag (no-op when absent).
    Exif,
    /// Fixed 180-degree rotation for a top-mounted camera.
    Rotate180,
}

impl OrientationFix {
    pub fn for_top_mount(top_mount: bool) -> Self {
        if top_mount {
            Self::Rotate180
        } else {
            Self::Exif
        }
    }
}

/// Decode one source file into a thumbnail no larger than
/// `basewidth x basewidth`, aspect ratio preserved, Lanczos3 downsampling.
/// Images already inside the box are not upscaled.
pub fn load_thumbnail(path: &Path, basewidth: u32, fix: OrientationFix) -> BoothResult<RgbaImage> {
    let mut decoder = ImageReader::open(path)
        .with_context(|| format!("open image '{}'", path.display()))?
        .with_guessed_format()
        .with_context(|| format!("probe image format of '{}'", path.display()))?
        .into_decoder()
        .with_context(|| format!("decode image '{}'", path.display()))?;

    // Read the tag before the pixels are consumed; a missing or unreadable
    // tag counts as "no transform".
    let exif = decoder.orientation().unwrap_or(Orientation::NoTransforms);

    let mut img = DynamicImage::from_decoder(decoder)
        .with_context(|| format!("decode image '{}'", path.display()))?;

    if img.width() > basewidth || img.height() > basewidth {
        img = img.resize(basewidth, basewidth, FilterType::Lanczos3);
    }

    match fix {
        OrientationFix::Exif => img.apply_orientation(exif),
        OrientationFix::Rotate180 => img.apply_orientation(Orientation::Rotate180),
    }

    Ok(img.to_rgba8())
}

/// Decode every source file into a thumbnail, keeping input order.
///
/// Known limitation: the canvas math downstream uses the first thumbnail's
/// size for every cell, so sources of mixed aspect ratio or resolution
/// produce a skewed (but non-crashing) layout.
pub fn load_thumbnail_set(
    paths: &[PathBuf],
    basewidth: u32,
    fix: OrientationFix,
) -> BoothResult<Vec<RgbaImage>> {
    let mut thumbs = Vec::with_capacity(paths.len());
    for path in paths {
        thumbs.push(load_thumbnail(path, basewidth, fix)?);
    }
    Ok(thumbs)
}
