// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Writing finished rasters to disk.  The pipeline never calls these;
//! they exist for front ends such as the `weave` binary.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::codecs::gif::{GifEncoder, Repeat};
use image::{DynamicImage, Delay, Frame, ImageFormat, RgbaImage};

use crate::animate::AnimationFrameSequence;
use crate::error::{RenderError, Result};

/// Saves one image, picking the format from the file extension.  Paths
/// with no known extension are written as PNG; JPEG output drops alpha.
pub fn save_image<P: AsRef<Path>>(path: P, image: &RgbaImage) -> Result<()> {
    let path = path.as_ref();
    let format = ImageFormat::from_path(path).unwrap_or(ImageFormat::Png);
    debug!("saving {}x{} {:?} to {}", image.width(), image.height(), format, path.display());
    match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgba8(image.clone())
            .to_rgb8()
            .save_with_format(path, format)?,
        _ => image.save_with_format(path, format)?,
    }
    Ok(())
}

/// Saves an animation as an endlessly looping GIF, every frame shown for
/// the sequence's frame delay.
pub fn save_animation<P: AsRef<Path>>(path: P, sequence: &AnimationFrameSequence) -> Result<()> {
    if sequence.is_empty() {
        return Err(RenderError::EmptyAnimation);
    }
    let path = path.as_ref();
    let delay = Delay::from_saturating_duration(sequence.frame_delay);
    let mut encoder = GifEncoder::new(BufWriter::new(File::create(path)?));
    encoder.set_repeat(Repeat::Infinite)?;
    encoder.encode_frames(
        sequence
            .frames
            .iter()
            .map(|frame| Frame::from_parts(frame.clone(), 0, 0, delay)),
    )?;
    info!("wrote {} frames to {}", sequence.len(), path.display());
    Ok(())
}
