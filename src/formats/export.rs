use std::fs::File;
use std::path::Path;

use image::{ImageBuffer, Luma};
use ndarray::Array2;
use tiff::encoder::{TiffEncoder, colortype};

use super::util::{extension, scale_to_u8};
use super::{IoError, Result};

/// Saves a `(width, height)` preview map as an 8-bit PNG (rescaled to its finite range)
/// or a 32-bit float TIFF (values as they are).
pub fn write_map(path: impl AsRef<Path>, map: &Array2<f32>) -> Result<()> {
    let path = path.as_ref();
    let (width, height) = map.dim();
    // image rows run along y
    let row_major = map.t().iter().copied().collect::<Vec<_>>();
    match extension(path)?.as_str() {
        "png" => {
            let image = ImageBuffer::<Luma<u8>, _>::from_vec(
                width as u32,
                height as u32,
                scale_to_u8(&row_major),
            )
            .ok_or_else(|| IoError::UnsupportedLayout("invalid PNG buffer".into()))?;
            image.save(path)?;
        }
        "tif" | "tiff" => {
            let mut encoder = TiffEncoder::new(File::create(path)?)?;
            encoder.write_image::<colortype::Gray32Float>(
                width as u32,
                height as u32,
                &row_major,
            )?;
        }
        other => return Err(IoError::UnsupportedFormat(other.to_string())),
    }
    Ok(())
}
