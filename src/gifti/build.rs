//! Builders for new GIFTI documents.
use super::array::{ArrayData, DataArray};
use super::image::{GiftiFunction, GiftiImage, ANATOMICAL_STRUCTURE_PRIMARY};
use crate::cifti::structure::BrainStructure;
use crate::error::{CitrixError, Result};
use crate::typedef::Intent;
use ndarray::ArrayView1;

/// A function file holding one value per vertex of a cortical surface.
pub fn function(data: ArrayView1<f32>, structure: &BrainStructure) -> Result<GiftiFunction> {
    let name = match structure {
        BrainStructure::CortexLeft => "CortexLeft",
        BrainStructure::CortexRight => "CortexRight",
        _ => {
            return Err(CitrixError::InvalidArgument(
                "structure should be CortexLeft or CortexRight".to_string(),
            ))
        }
    };

    let values = ArrayData::F32(data.iter().copied().collect());
    let array = DataArray::new(Intent::Normal, vec![data.len()], values)?;

    let mut image = GiftiImage::default();
    image.meta.set(ANATOMICAL_STRUCTURE_PRIMARY, name);
    image.data_arrays.push(array);
    GiftiFunction::from_image(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typedef::NiftiType;
    use ndarray::array;

    #[test]
    fn cortex_function() {
        let data = array![0.5f32, 1., 2.];
        let func = function(data.view(), &BrainStructure::CortexLeft).unwrap();
        assert_eq!(func.function_data(), data);
        let array = &func.image().data_arrays[0];
        assert_eq!(array.intent as i32, 11);
        assert_eq!(array.datatype, NiftiType::Float32);
        assert_eq!(
            func.image().principal_structure().unwrap(),
            BrainStructure::CortexLeft
        );
    }

    #[test]
    fn only_cortices() {
        let data = array![1f32];
        assert!(function(data.view(), &BrainStructure::ThalamusLeft).is_err());
    }
}
