use image::GenericImageView;
use ndarray::{Array, Array2, IxDyn};
use tempfile::tempdir;

use super::{
    DatasetDirectory, FolderDirectory, MemoryDirectory, read_dataset, sidecar_path,
    write_dataset, write_map, write_sidecar,
};
use crate::model::{AxisKind, Dataset, DatasetF32, Dim, Metadata, PixelType};

fn decay_stack(pixel_type: PixelType) -> DatasetF32 {
    let data = Array::from_shape_fn((2, 3, 5), |(y, x, t)| {
        ((100 * (x + 1) + 10 * y) as f32 / (t + 1) as f32).round()
    })
    .into_dyn();
    let metadata = Metadata {
        dims: vec![
            Dim::new(AxisKind::Y, 2),
            Dim::new(AxisKind::X, 3),
            Dim::new(AxisKind::Lifetime, 5),
        ],
        pixel_type,
        ..Metadata::default()
    };
    Dataset::new(data, metadata).expect("dataset")
}

#[test]
fn stack_pages_become_lifetime_axis_with_raw_counts() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("decay.tif");
    let stack = decay_stack(PixelType::U16);
    write_dataset(&path, &stack).expect("write stack");

    let restored = read_dataset(&path).expect("read stack");
    assert_eq!(restored.shape(), &[2, 3, 5]);
    assert_eq!(restored.metadata.pixel_type, PixelType::U16);
    assert_eq!(restored.axis_index(AxisKind::Lifetime), Some(2));
    assert_eq!(restored.data, stack.data);
    assert_eq!(restored.name().as_deref(), Some("decay"));
}

#[test]
fn single_page_reads_as_plane() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("plane.tiff");
    let data = Array::from_shape_vec((2, 2), vec![0.0_f32, 0.25, 0.5, 1.0])
        .expect("shape")
        .into_dyn();
    let metadata = Metadata {
        dims: vec![Dim::new(AxisKind::Y, 2), Dim::new(AxisKind::X, 2)],
        ..Metadata::default()
    };
    let plane = Dataset::new(data, metadata).expect("dataset");
    write_dataset(&path, &plane).expect("write");
    let restored = read_dataset(&path).expect("read");
    assert_eq!(restored.shape(), &[2, 2]);
    assert_eq!(restored.metadata.pixel_type, PixelType::F32);
    assert_eq!(restored.data, plane.data);
}

#[test]
fn sidecar_overrides_inferred_layout() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("calibrated.tif");
    write_dataset(&path, &decay_stack(PixelType::F32)).expect("write stack");
    let metadata = Metadata {
        dims: vec![
            Dim::new(AxisKind::Y, 2),
            Dim::new(AxisKind::X, 3),
            Dim::calibrated(AxisKind::Time, 5, 0.2, "ns"),
        ],
        ..Metadata::default()
    };
    write_sidecar(&path, &metadata).expect("sidecar");
    assert_eq!(sidecar_path(&path), dir.path().join("calibrated.json"));

    let restored = read_dataset(&path).expect("read");
    assert_eq!(restored.axis_index(AxisKind::Time), Some(2));
    assert_eq!(restored.metadata.spacing(2), Some(0.2));
    assert_eq!(restored.metadata.source.as_deref(), Some(path.as_path()));
}

#[test]
fn mismatched_sidecar_is_rejected() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("broken.tif");
    write_dataset(&path, &decay_stack(PixelType::F32)).expect("write stack");
    write_sidecar(&path, &Metadata::from_shape(&[4, 4], PixelType::F32)).expect("sidecar");
    assert!(read_dataset(&path).is_err());
}

#[test]
fn unsupported_extensions_error() {
    let dir = tempdir().expect("tempdir");
    let error = read_dataset(dir.path().join("decay.sdt")).expect_err("sdt");
    assert!(error.to_string().contains("sdt"));
}

#[test]
fn maps_export_as_png_and_tiff() {
    let dir = tempdir().expect("tempdir");
    let map = Array2::from_shape_fn((3, 2), |(x, y)| (x + 3 * y) as f32);

    let png = dir.path().join("tau.png");
    write_map(&png, &map).expect("png");
    let image = image::open(&png).expect("open png");
    assert_eq!(image.dimensions(), (3, 2));
    assert_eq!(image.to_luma8().get_pixel(2, 1).0, [255]);
    assert_eq!(image.to_luma8().get_pixel(0, 0).0, [0]);

    let tif = dir.path().join("tau.tif");
    write_map(&tif, &map).expect("tiff");
    let restored = read_dataset(&tif).expect("read map");
    assert_eq!(restored.shape(), &[2, 3]);
    assert_eq!(restored.data[IxDyn(&[1, 2])], 5.0);
}

#[test]
fn folder_directory_lists_stacks_by_stem() {
    let dir = tempdir().expect("tempdir");
    write_dataset(dir.path().join("irf.tif"), &decay_stack(PixelType::U16)).expect("irf");
    write_dataset(dir.path().join("sample.tif"), &decay_stack(PixelType::U16)).expect("sample");
    std::fs::write(dir.path().join("notes.txt"), "not an image").expect("notes");

    let directory = FolderDirectory::new(dir.path());
    let names = directory
        .list()
        .expect("list")
        .into_iter()
        .map(|(name, _)| name)
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["irf", "sample"]);
    assert!(directory.find("irf").expect("find").is_some());
    assert!(directory.find("missing").expect("find").is_none());
}

#[test]
fn folder_find_reads_only_the_named_stack() {
    let dir = tempdir().expect("tempdir");
    write_dataset(dir.path().join("good.tif"), &decay_stack(PixelType::U16)).expect("good");
    std::fs::write(dir.path().join("broken.tif"), b"II*\0garbage").expect("broken");

    let directory = FolderDirectory::new(dir.path());
    let found = directory
        .find("good")
        .expect("find ignores other stacks")
        .expect("good stack");
    assert_eq!(found.shape(), &[2, 3, 5]);
    assert!(directory.find("broken").expect("unreadable").is_none());
    assert!(directory.find("missing").expect("find").is_none());
}

#[test]
fn memory_directory_replaces_by_name() {
    let directory = MemoryDirectory::new()
        .with("irf", decay_stack(PixelType::F32))
        .with("irf", decay_stack(PixelType::U8));
    let entries = directory.list().expect("list");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].1.metadata.pixel_type, PixelType::U8);
}
