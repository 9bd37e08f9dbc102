extern crate approx;
extern crate citrix;
extern crate ndarray;
#[macro_use]
extern crate pretty_assertions;
extern crate tempfile;

use approx::assert_abs_diff_eq;
use citrix::affine::from_rows;
use citrix::{save, NiftiHeader, NiftiType, NiftiVersion, NiftiVolume, ReaderOptions};
use ndarray::{Array, Array3, Array4, Ix3, Ix4, ShapeBuilder};
use std::path::Path;
use tempfile::tempdir;

fn read_back<P: AsRef<Path>>(path: P) -> (NiftiHeader, ndarray::ArrayD<f32>) {
    let (header, _, volume) = ReaderOptions::new().read_file(path).unwrap().into_parts();
    (header, volume.into_ndarray::<f32>().unwrap())
}

#[test]
fn memory_order_does_not_matter() {
    let dir = tempdir().unwrap();
    let c_path = dir.path().join("c.nii");
    let f_path = dir.path().join("f.nii");
    let c_order = Array3::from_shape_fn((3, 4, 2), |(i, j, k)| (i * 100 + j * 10 + k) as f32);
    let mut f_order = Array3::zeros((3, 4, 2).f());
    f_order.assign(&c_order);

    save(&c_path, &c_order, None, None, NiftiVersion::Nifti2).unwrap();
    save(&f_path, &f_order, None, None, NiftiVersion::Nifti2).unwrap();

    assert_eq!(std::fs::read(&c_path).unwrap(), std::fs::read(&f_path).unwrap());
    let (_, read) = read_back(&f_path);
    assert_eq!(read.into_dimensionality::<Ix3>().unwrap(), c_order);
}

#[test]
fn reference_header_and_affine() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("labels.nii.gz");
    let mut reference = NiftiHeader {
        xyzt_units: 10,
        scl_slope: 4.,
        ..NiftiHeader::default()
    };
    reference.set_description_str("parcellation").unwrap();
    let affine = from_rows(&[
        [-1.5, 0., 0., 90.],
        [0., 1.5, 0., -126.],
        [0., 0., 1.5, -72.],
        [0., 0., 0., 1.],
    ]);
    let data = Array::from_shape_fn((5, 5, 5), |(i, j, k)| ((i + j + k) % 3) as u16);

    save(&path, &data, Some(&reference), Some(&affine), NiftiVersion::Nifti1).unwrap();

    let (header, read) = read_back(&path);
    assert_eq!(header.version, NiftiVersion::Nifti1);
    assert_eq!(header.data_type().unwrap(), NiftiType::Uint16);
    assert_eq!(header.bitpix, 16);
    assert_eq!(header.xyzt_units, 10);
    // scaling always reflects the written data
    assert_eq!(header.scl_slope, 1.);
    assert_eq!(&header.descrip[..12], b"parcellation");
    assert_eq!(header.dim().unwrap(), &[5, 5, 5]);
    assert_abs_diff_eq!(header.affine(), affine);
    assert_abs_diff_eq!(header.pixdim[1], 1.5);
    let read = read.into_dimensionality::<Ix3>().unwrap();
    assert_eq!(read[[4, 1, 2]], 1.);
}

#[test]
fn four_dimensional_volume() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("series.nii");
    let data = Array4::from_shape_fn((2, 3, 4, 5), |(i, j, k, t)| {
        (i as f64) - (j as f64) * 0.5 + (k * t) as f64
    });

    save(&path, &data, None, None, NiftiVersion::Nifti2).unwrap();

    let obj = ReaderOptions::new().read_file(&path).unwrap();
    assert_eq!(obj.header().vox_offset, 544);
    assert_eq!(obj.volume().dimensionality(), 4);
    assert_eq!(obj.volume().get_f64(&[1, 2, 3, 4]).unwrap(), 12.);
    let read = obj
        .into_volume()
        .into_ndarray::<f64>()
        .unwrap()
        .into_dimensionality::<Ix4>()
        .unwrap();
    assert_eq!(read, data);
}

#[test]
fn out_of_range_voxel() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("small.nii");
    save(&path, &Array3::<i8>::zeros((2, 2, 2)), None, None, NiftiVersion::Nifti1).unwrap();
    let obj = ReaderOptions::new().read_file(&path).unwrap();
    assert!(obj.volume().get_f64(&[2, 0, 0]).is_err());
    assert!(obj.volume().get_f64(&[0, 0]).is_err());
}
