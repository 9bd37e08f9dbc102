//! Builders for new CIFTI images.
use super::image::{CiftiImage, CiftiKind};
use super::model::{BrainModel, CiftiHeader, Label, MatrixIndicesMap, NamedMap, Volume};
use super::structure::{IndexType, ModelType};
use crate::affine::{to_rows, Affine4};
use crate::error::{CitrixError, Result};
use ndarray::{Array2, ArrayView1, Axis};

/// A label table assigning a name and an `(R, G, B, A)` colour to each
/// key.
pub fn label_table<S, C>(keys: &[i32], labels: &[S], colors: &[C]) -> Result<Vec<Label>>
where
    S: AsRef<str>,
    C: AsRef<[f32]>,
{
    if labels.len() != colors.len() || colors.len() != keys.len() {
        return Err(CitrixError::InvalidArgument(
            "different number of keys, labels and colors".to_string(),
        ));
    }
    if colors.iter().any(|c| c.as_ref().len() != 4) {
        return Err(CitrixError::InvalidArgument(
            "Colors have to be in the (R, G, B, A) format".to_string(),
        ));
    }

    Ok(keys
        .iter()
        .zip(labels)
        .zip(colors)
        .map(|((key, name), color)| {
            let c = color.as_ref();
            Label {
                key: *key,
                name: name.as_ref().to_string(),
                red: c[0],
                green: c[1],
                blue: c[2],
                alpha: c[3],
            }
        })
        .collect())
}

/// A dense label image with a single label map called `"labels"` over
/// the given brain models. `volume` holds the grid dimensions and the
/// voxel-to-world transform, and is required when any model is made of
/// voxels.
pub fn dlabel(
    data: ArrayView1<f32>,
    models: &[BrainModel],
    label_table: Vec<Label>,
    volume: Option<([u64; 3], Affine4)>,
) -> Result<CiftiImage> {
    let mut labels = MatrixIndicesMap::new(vec![0], IndexType::Labels);
    labels.named_maps.push(NamedMap {
        map_name: "labels".to_string(),
        metadata: Default::default(),
        label_table: Some(label_table),
    });

    let mut brain_models = MatrixIndicesMap::new(vec![1], IndexType::BrainModels);
    brain_models.brain_models = models.to_vec();
    for model in &mut brain_models.brain_models {
        model.index_count = model.indices_len() as u64;
    }
    brain_models.recompute_offsets();

    let has_voxels = models.iter().any(|m| m.model_type == ModelType::Voxels);
    match volume {
        Some((dimensions, affine)) => {
            brain_models.volume = Some(Volume {
                dimensions,
                transform: to_rows(&affine),
                meters_to_unit_exponent: -3,
            })
        }
        None if has_voxels => {
            return Err(CitrixError::InvalidArgument(
                "A structure is of type voxel, but no volume dimension was given".to_string(),
            ))
        }
        None => {}
    }

    let count: u64 = brain_models.brain_models.iter().map(|m| m.index_count).sum();
    if count as usize != data.len() {
        return Err(CitrixError::IncompatibleLength(data.len(), count as usize));
    }

    let mut header = CiftiHeader::default();
    header.matrix.maps = vec![labels, brain_models];
    let data: Array2<f32> = data.to_owned().insert_axis(Axis(0));
    Ok(CiftiImage::new(CiftiKind::DenseLabels, header, data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cifti::structure::{BrainStructure, Direction};
    use ndarray::array;

    #[test]
    fn label_tables() {
        let table = label_table(
            &[0, 1],
            &["background", "V1"],
            &[[0f32, 0., 0., 0.], [1., 0., 0., 1.]],
        )
        .unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table[1].name, "V1");
        assert_eq!(table[1].red, 1.);

        assert!(label_table(&[0], &["a", "b"], &[[0f32; 4], [0f32; 4]]).is_err());
        assert!(label_table(&[0], &["a"], &[vec![0f32, 0., 0.]]).is_err());
    }

    #[test]
    fn dense_labels() {
        let models = vec![
            BrainModel::surface(BrainStructure::CortexLeft, 10, vec![1, 2]),
            BrainModel::voxels(BrainStructure::ThalamusLeft, vec![[1, 1, 1]]),
        ];
        let table = label_table(&[1], &["one"], &[[1f32, 1., 1., 1.]]).unwrap();
        let data = array![1f32, 1., 0.];

        assert!(dlabel(data.view(), &models, table.clone(), None).is_err());

        let image = dlabel(
            data.view(),
            &models,
            table,
            Some(([4, 4, 4], Affine4::identity())),
        )
        .unwrap();
        assert_eq!(image.kind(), CiftiKind::DenseLabels);
        assert_eq!(image.data().shape(), &[1, 3]);
        let header = image.cifti_header();
        assert_eq!(header.matrix_size().unwrap(), [1, 3]);
        let written = header.brain_models(Direction::Column, None, None).unwrap();
        assert_eq!(written[1].index_offset, 2);
        assert_eq!(header.labels(Direction::Row, Some(1)).unwrap()[0].name, "one");
        assert_eq!(header.volume(Direction::Column).unwrap().unwrap().dimensions, [4, 4, 4]);

        let short = array![1f32];
        assert!(dlabel(
            short.view(),
            &models,
            vec![],
            Some(([4, 4, 4], Affine4::identity()))
        )
        .is_err());
    }
}
