use std::fs::File;
use std::path::Path;

use crate::model::{AxisKind, Dataset, DatasetF32, Dim, PixelType};
use ndarray::{Array, Axis, Ix2, Ix3};
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::{TiffEncoder, colortype};

use super::util::{clamp_count, metadata_for_dims};
use super::{IoError, Result};

/// Reads every page as raw counts. Several pages stack along a trailing lifetime axis.
pub(crate) fn read_tiff(path: &Path) -> Result<DatasetF32> {
    let file = File::open(path)?;
    let mut decoder = Decoder::new(file)?;
    let (width, height) = decoder.dimensions()?;
    let (width, height) = (width as usize, height as usize);
    let mut pages = Vec::new();
    let mut pixel_type = PixelType::F32;

    loop {
        pages.push(decode_tiff_page(&mut decoder, &mut pixel_type, width * height)?);
        if !decoder.more_images() {
            break;
        }
        decoder.next_image()?;
        if decoder.dimensions()? != (width as u32, height as u32) {
            return Err(IoError::UnsupportedLayout(
                "TIFF pages must have identical dimensions".into(),
            ));
        }
    }

    let (data, dims) = if pages.len() == 1 {
        let data = Array::from_shape_vec((height, width), pages.remove(0))
            .map_err(crate::model::CoreError::from)?;
        let dims = vec![Dim::new(AxisKind::Y, height), Dim::new(AxisKind::X, width)];
        (data.into_dyn(), dims)
    } else {
        let bins = pages.len();
        let data = Array::from_shape_fn((height, width, bins), |(y, x, t)| pages[t][x + width * y]);
        let dims = vec![
            Dim::new(AxisKind::Y, height),
            Dim::new(AxisKind::X, width),
            Dim::new(AxisKind::Lifetime, bins),
        ];
        (data.into_dyn(), dims)
    };

    let metadata = metadata_for_dims(path, dims, pixel_type);
    Ok(Dataset::new(data, metadata)?)
}

fn decode_tiff_page(
    decoder: &mut Decoder<File>,
    pixel_type: &mut PixelType,
    expected: usize,
) -> Result<Vec<f32>> {
    let values = match decoder.read_image()? {
        DecodingResult::U8(buffer) => {
            *pixel_type = PixelType::U8;
            buffer.into_iter().map(f32::from).collect::<Vec<_>>()
        }
        DecodingResult::U16(buffer) => {
            *pixel_type = PixelType::U16;
            buffer.into_iter().map(f32::from).collect::<Vec<_>>()
        }
        DecodingResult::F32(buffer) => {
            *pixel_type = PixelType::F32;
            buffer
        }
        other => {
            return Err(IoError::UnsupportedLayout(format!(
                "unsupported TIFF sample type: {other:?}"
            )));
        }
    };
    if values.len() != expected {
        return Err(IoError::UnsupportedLayout(
            "TIFF RGB/alpha pages are not supported".into(),
        ));
    }
    Ok(values)
}

/// Writes `[Y, X]` as one page or `[Y, X, T]` as one page per bin, in the dataset's
/// pixel type without rescaling.
pub(crate) fn write_tiff(path: &Path, dataset: &DatasetF32) -> Result<()> {
    let pages = match dataset.ndim() {
        2 => {
            let page = dataset
                .data
                .view()
                .into_dimensionality::<Ix2>()
                .map_err(crate::model::CoreError::from)?;
            vec![page.to_owned()]
        }
        3 => {
            let stack = dataset
                .data
                .view()
                .into_dimensionality::<Ix3>()
                .map_err(crate::model::CoreError::from)?;
            stack
                .axis_iter(Axis(2))
                .map(|page| page.to_owned())
                .collect::<Vec<_>>()
        }
        _ => {
            return Err(IoError::UnsupportedLayout(format!(
                "TIFF supports [Y, X] or [Y, X, T], found shape {:?}",
                dataset.shape()
            )));
        }
    };

    let shape = dataset.shape();
    let (height, width) = (shape[0] as u32, shape[1] as u32);
    let file = File::create(path)?;
    let mut encoder = TiffEncoder::new(file)?;
    for page in pages {
        let samples = page.iter().copied();
        match dataset.metadata.pixel_type {
            PixelType::U8 => {
                let data = samples
                    .map(|value| clamp_count(value, f32::from(u8::MAX)) as u8)
                    .collect::<Vec<_>>();
                encoder.write_image::<colortype::Gray8>(width, height, &data)?;
            }
            PixelType::U16 => {
                let data = samples
                    .map(|value| clamp_count(value, f32::from(u16::MAX)) as u16)
                    .collect::<Vec<_>>();
                encoder.write_image::<colortype::Gray16>(width, height, &data)?;
            }
            PixelType::F32 => {
                let data = samples.collect::<Vec<_>>();
                encoder.write_image::<colortype::Gray32Float>(width, height, &data)?;
            }
        }
    }
    Ok(())
}
