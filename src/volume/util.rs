//! Miscellaneous volume-related functions
use crate::error::{CitrixError, Result};

/// Linear index of the given coordinates in a column-major volume.
pub fn coords_to_index(coords: &[u64], dim: &[u64]) -> Result<usize> {
    if coords.len() != dim.len() || coords.is_empty() {
        return Err(CitrixError::InvalidArgument(format!(
            "expected {} coordinates, got {}",
            dim.len(),
            coords.len()
        )));
    }

    if !coords.iter().zip(dim).all(|(i, d)| *i < *d) {
        return Err(CitrixError::InvalidArgument(format!(
            "coordinates {:?} out of bounds for volume {:?}",
            coords, dim
        )));
    }

    let index = coords
        .iter()
        .zip(dim)
        .rev()
        .fold(0usize, |acc, (c, d)| acc * *d as usize + *c as usize);

    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::coords_to_index;

    #[test]
    fn test_coords_to_index() {
        assert!(coords_to_index(&[0, 0], &[10, 10, 5]).is_err());
        assert!(coords_to_index(&[0, 0, 0, 0], &[10, 10, 5]).is_err());
        assert_eq!(coords_to_index(&[0, 0, 0], &[10, 10, 5]).unwrap(), 0);

        assert_eq!(coords_to_index(&[1, 0, 0], &[16, 16, 3]).unwrap(), 1);
        assert_eq!(coords_to_index(&[0, 1, 0], &[16, 16, 3]).unwrap(), 16);
        assert_eq!(coords_to_index(&[0, 0, 1], &[16, 16, 3]).unwrap(), 256);
        assert_eq!(coords_to_index(&[1, 1, 1], &[16, 16, 3]).unwrap(), 273);

        assert_eq!(
            coords_to_index(&[15, 15, 2], &[16, 16, 3]).unwrap(),
            16 * 16 * 3 - 1
        );

        assert!(coords_to_index(&[16, 15, 2], &[16, 16, 3]).is_err());
    }
}
