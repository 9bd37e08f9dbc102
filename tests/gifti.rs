extern crate citrix;
extern crate ndarray;
#[macro_use]
extern crate pretty_assertions;
extern crate tempfile;

mod util;

use citrix::cifti::BrainStructure;
use citrix::gifti::build::function;
use citrix::gifti::{Encoding, GiftiFunction, GiftiImage};
use citrix::surface::constraint_from_surface;
use citrix::{load, CiftiMesh, Image, Intent};
use ndarray::array;
use std::fs;
use tempfile::tempdir;

#[test]
fn function_file_roundtrip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("thickness.func.gii");
    let data = array![1.5f32, 2.5, 0., -3.];

    function(data.view(), &BrainStructure::CortexRight)
        .unwrap()
        .save(&path)
        .unwrap();

    let func = GiftiFunction::from_file(&path).unwrap();
    assert_eq!(func.function_data(), data);
    assert_eq!(
        func.image().principal_structure().unwrap(),
        BrainStructure::CortexRight
    );

    match load(&path).unwrap() {
        Image::GiftiFunction(loaded) => assert_eq!(loaded, func),
        other => panic!("expected a function file, got {:?}", other),
    }
}

#[test]
fn surface_file_loads_as_mesh() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("lh.white.surf.gii");
    util::square_surface("CortexLeft").save(&path).unwrap();

    let mesh = CiftiMesh::load(&path).unwrap();
    assert_eq!(mesh.structure(), &BrainStructure::CortexLeft);
    assert_eq!(mesh.vertices().dim(), (4, 3));
    assert_eq!(mesh.vertices()[[2, 1]], 2.);
    assert_eq!(mesh.triangles().row(1).to_vec(), vec![0, 2, 3]);
    assert_eq!(
        constraint_from_surface(&mesh, None).unwrap(),
        vec![1, 1, 1, 1, 0, 1]
    );

    match load(&path).unwrap() {
        Image::Surface(loaded) => assert_eq!(loaded, mesh),
        other => panic!("expected a surface, got {:?}", other),
    }
}

#[test]
fn surface_of_other_structure_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cerebellum.surf.gii");
    util::square_surface("Cerebellum").save(&path).unwrap();
    assert!(CiftiMesh::load(&path).is_err());
}

#[test]
fn other_gifti_files_load_as_documents() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("atlas.label.gii");
    let mut image = util::square_surface("CortexLeft");
    for array in &mut image.data_arrays {
        array.encoding = Encoding::GZipBase64Binary;
    }
    image.save(&path).unwrap();

    match load(&path).unwrap() {
        Image::Gifti(loaded) => {
            assert_eq!(loaded, image);
            assert!(loaded.data_array(Intent::Triangle).is_some());
        }
        other => panic!("expected a GIFTI document, got {:?}", other),
    }
}

#[test]
fn unsupported_suffix() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("brain.mgz");
    fs::write(&path, b"not an image").unwrap();
    let err = load(&path).unwrap_err();
    assert_eq!(
        err.to_string(),
        "We can only load NIFTI (nii) or GIFTI (gii) files"
    );
}

#[test]
fn gifti_written_as_base64() {
    let xml = util::square_surface("CortexLeft").to_xml().unwrap();
    assert!(xml.contains("Encoding=\"Base64Binary\""));
    assert!(xml.contains("Endian=\"LittleEndian\""));
    let back = GiftiImage::from_xml(&xml).unwrap();
    assert_eq!(back.data_arrays.len(), 2);
}
