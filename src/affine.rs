//! Voxel-to-world affine helpers, used to move between surface vertex
//! coordinates and voxel indices.
use crate::error::{CitrixError, Result};
use nalgebra::{Matrix3, Matrix4, Quaternion, Scalar, Vector3};
use ndarray::{Array2, ArrayView2};

/// 3x3 linear part of an affine.
pub type Affine3 = Matrix3<f64>;
/// Full homogeneous 4x4 affine.
pub type Affine4 = Matrix4<f64>;

/// Separate a 4x4 affine into its 3x3 affine and translation components.
pub fn get_affine_and_translation<T: Scalar>(affine: &Matrix4<T>) -> (Matrix3<T>, Vector3<T>) {
    let translation = Vector3::<T>::new(
        affine[(0, 3)].clone(),
        affine[(1, 3)].clone(),
        affine[(2, 3)].clone(),
    );
    let affine = affine.fixed_view::<3, 3>(0, 0).into_owned();
    (affine, translation)
}

/// Build an affine from the row-major 4x4 array found in CIFTI
/// `TransformationMatrixVoxelIndicesIJKtoXYZ` elements.
pub fn from_rows(rows: &[[f64; 4]; 4]) -> Affine4 {
    Affine4::from_fn(|r, c| rows[r][c])
}

/// The row-major 4x4 array form of an affine.
pub fn to_rows(affine: &Affine4) -> [[f64; 4]; 4] {
    let mut rows = [[0.; 4]; 4];
    for (r, row) in rows.iter_mut().enumerate() {
        for (c, v) in row.iter_mut().enumerate() {
            *v = affine[(r, c)];
        }
    }
    rows
}

/// Get affine implied by given shape and zooms.
///
/// We get the translations from the center of the image (implied by `shape`).
pub(crate) fn shape_zoom_affine(shape: &[u64], spacing: &[f64]) -> Affine4 {
    // Get translations from center of image
    let origin = Vector3::new(
        (shape[0] as f64 - 1.0) / 2.0,
        (shape[1] as f64 - 1.0) / 2.0,
        (shape[2] as f64 - 1.0) / 2.0,
    );
    let spacing = [-spacing[0], spacing[1], spacing[2]];
    Affine4::new(
        spacing[0], 0.0, 0.0, -origin[0] * spacing[0],
        0.0, spacing[1], 0.0, -origin[1] * spacing[1],
        0.0, 0.0, spacing[2], -origin[2] * spacing[2],
        0.0, 0.0, 0.0, 1.0,
    )
}

/// Calculate rotation matrix corresponding to quaternion.
///
/// Rotation matrix applies to column vectors, and is applied to the left of coordinate vectors.
/// The algorithm here allows non-unit quaternions.
///
/// Algorithm from https://en.wikipedia.org/wiki/Rotation_matrix#Quaternion
pub(crate) fn quaternion_to_affine(q: Quaternion<f64>) -> Affine3 {
    let nq = q.w * q.w + q.i * q.i + q.j * q.j + q.k * q.k;
    if nq < ::std::f64::EPSILON {
        return Affine3::identity();
    }
    let s = 2.0 / nq;
    let x = q.i * s;
    let y = q.j * s;
    let z = q.k * s;
    let wx = q.w * x;
    let wy = q.w * y;
    let wz = q.w * z;
    let xx = q.i * x;
    let xy = q.i * y;
    let xz = q.i * z;
    let yy = q.j * y;
    let yz = q.j * z;
    let zz = q.k * z;
    Affine3::new(
        1.0 - (yy + zz), xy - wz, xz + wy,
        xy + wz, 1.0 - (xx + zz), yz - wx,
        xz - wy, yz + wx, 1.0 - (xx + yy),
    )
}

/// Invert an affine, failing on singular matrices.
pub fn inverse(affine: &Affine4) -> Result<Affine4> {
    affine
        .try_inverse()
        .ok_or_else(|| CitrixError::InvalidArgument("affine matrix is singular".to_string()))
}

/// Apply an affine to a set of 3D points, one per row.
pub fn apply_affine(affine: &Affine4, points: ArrayView2<f32>) -> Result<Array2<f64>> {
    if points.ncols() != 3 {
        return Err(CitrixError::InvalidArgument(format!(
            "expected points with 3 coordinates, got {}",
            points.ncols()
        )));
    }
    let (linear, translation) = get_affine_and_translation(affine);
    let mut out = Array2::zeros((points.nrows(), 3));
    for (point, mut target) in points.outer_iter().zip(out.outer_iter_mut()) {
        let p = Vector3::new(point[0] as f64, point[1] as f64, point[2] as f64);
        let t = linear * p + translation;
        target[0] = t[0];
        target[1] = t[1];
        target[2] = t[2];
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn affine_roundtrip_through_inverse() {
        let affine = from_rows(&[
            [-2., 0., 0., 90.],
            [0., 2., 0., -126.],
            [0., 0., 2., -72.],
            [0., 0., 0., 1.],
        ]);
        let voxels = array![[10.0f32, 20., 30.], [0., 0., 0.]];
        let world = apply_affine(&affine, voxels.view()).unwrap();
        assert_abs_diff_eq!(world, array![[70., -86., -12.], [90., -126., -72.]]);

        let inv = inverse(&affine).unwrap();
        let world = world.mapv(|v| v as f32);
        let back = apply_affine(&inv, world.view()).unwrap();
        assert_abs_diff_eq!(back, array![[10., 20., 30.], [0., 0., 0.]], epsilon = 1e-9);
        assert_eq!(to_rows(&affine)[0], [-2., 0., 0., 90.]);
    }

    #[test]
    fn singular_affine() {
        assert!(inverse(&Affine4::zeros()).is_err());
    }

    #[test]
    fn identity_quaternion() {
        let rotation = quaternion_to_affine(Quaternion::new(1., 0., 0., 0.));
        assert_eq!(rotation, Affine3::identity());
        let (linear, translation) = get_affine_and_translation(&Affine4::identity());
        assert_eq!(linear, Affine3::identity());
        assert_eq!(translation, Vector3::zeros());
    }
}
