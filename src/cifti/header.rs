//! Queries over a CIFTI-2 header, and the operations used to bring
//! several CIFTI matrices to a common set of brain structures.
use super::model::{BrainModel, CiftiHeader, Label, MatrixIndicesMap, ModelIndices, NamedMap, Parcel, Volume};
use super::structure::{BrainStructure, Direction, FeatureType, IndexType, ModelType};
use crate::affine::Affine4;
use crate::error::{CitrixError, Result};
use crate::extension::{ExtensionSequence, NIFTI_ECODE_CIFTI};
use ndarray::{Array2, ArrayView2};
use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use tracing::debug;

/// RGB triples cycled through by `soft_colors_label_map`.
const SOFT_COLORS: [[f32; 3]; 24] = [
    [0.651, 0.808, 0.890],
    [0.122, 0.471, 0.706],
    [0.698, 0.875, 0.541],
    [0.200, 0.627, 0.173],
    [0.984, 0.604, 0.600],
    [0.890, 0.102, 0.110],
    [0.992, 0.749, 0.435],
    [1.000, 0.498, 0.000],
    [0.792, 0.698, 0.839],
    [0.416, 0.239, 0.604],
    [1.000, 1.000, 0.600],
    [0.694, 0.349, 0.157],
    [0.553, 0.827, 0.780],
    [1.000, 1.000, 0.702],
    [0.745, 0.729, 0.855],
    [0.984, 0.502, 0.447],
    [0.502, 0.694, 0.827],
    [0.992, 0.706, 0.384],
    [0.702, 0.871, 0.412],
    [0.988, 0.804, 0.898],
    [0.851, 0.851, 0.851],
    [0.737, 0.502, 0.741],
    [0.800, 0.922, 0.773],
    [0.600, 0.600, 0.600],
];

impl CiftiHeader {
    /// The map describing `direction`. A map applying to several
    /// dimensions (`"0,1"`) describes all of them.
    pub fn matrix_indices_map(&self, direction: Direction) -> Result<&MatrixIndicesMap> {
        self.matrix
            .maps
            .iter()
            .find(|m| m.applies_to(direction))
            .ok_or_else(|| CitrixError::NotFound(format!("MatrixIndicesMap for {}", direction)))
    }

    fn matrix_indices_map_mut(&mut self, direction: Direction) -> Option<&mut MatrixIndicesMap> {
        self.matrix.maps.iter_mut().find(|m| m.applies_to(direction))
    }

    /// Brain models along `direction`, optionally restricted to a model
    /// type and a structure, in document order.
    pub fn brain_models(
        &self,
        direction: Direction,
        model_type: Option<ModelType>,
        structure: Option<&BrainStructure>,
    ) -> Result<Vec<&BrainModel>> {
        let map = self.matrix_indices_map(direction)?;
        Ok(map
            .brain_models
            .iter()
            .filter(|b| model_type.map_or(true, |t| b.model_type == t))
            .filter(|b| structure.map_or(true, |s| b.structure == *s))
            .collect())
    }

    /// Parcels along `direction`, optionally only the one called `name`.
    pub fn parcels(&self, direction: Direction, name: Option<&str>) -> Result<Vec<&Parcel>> {
        let map = self.matrix_indices_map(direction)?;
        Ok(map
            .parcels
            .iter()
            .filter(|p| name.map_or(true, |n| p.name == n))
            .collect())
    }

    /// Labels of every label table along `direction`, optionally only
    /// those with the given key.
    pub fn labels(&self, direction: Direction, key: Option<i32>) -> Result<Vec<&Label>> {
        let map = self.matrix_indices_map(direction)?;
        Ok(map
            .named_maps
            .iter()
            .filter_map(|m| m.label_table.as_ref())
            .flat_map(|t| t.iter())
            .filter(|l| key.map_or(true, |k| l.key == k))
            .collect())
    }

    /// The volume along `direction`, if any.
    pub fn volume(&self, direction: Direction) -> Result<Option<&Volume>> {
        Ok(self.matrix_indices_map(direction)?.volume.as_ref())
    }

    /// Offset and index list of the first brain model with the given type
    /// and structure.
    pub fn offset_and_indices(
        &self,
        direction: Direction,
        model_type: ModelType,
        structure: &BrainStructure,
    ) -> Result<(usize, ModelIndices)> {
        let models = self.brain_models(direction, Some(model_type), Some(structure))?;
        let model = models
            .first()
            .ok_or_else(|| CitrixError::NotFound("BrainModel".to_string()))?;
        Ok((model.index_offset as usize, model.indices()))
    }

    /// Dimensions and voxel-to-world transform of the volume along
    /// `direction`, if any.
    pub fn volume_attributes(&self, direction: Direction) -> Result<Option<([u64; 3], Affine4)>> {
        Ok(self
            .volume(direction)?
            .map(|v| (v.dimensions, v.affine())))
    }

    /// Whether `direction` holds surface models, voxel models or both.
    pub fn feature_type(&self, direction: Direction) -> Result<FeatureType> {
        let models = self.brain_models(direction, None, None)?;
        let types: HashSet<ModelType> = models.iter().map(|b| b.model_type).collect();
        match (types.len(), models.first()) {
            (1, Some(model)) => Ok(model.model_type.into()),
            (0, _) => Err(CitrixError::NotFound(format!("brain models along {}", direction))),
            _ => Ok(FeatureType::Mixed),
        }
    }

    /// Number of matrix indices along each direction, as described by
    /// the header.
    pub fn matrix_size(&self) -> Result<[usize; 2]> {
        Ok([
            dimension_size(self.matrix_indices_map(Direction::Row)?),
            dimension_size(self.matrix_indices_map(Direction::Column)?),
        ])
    }

    /// A new header holding only the structures present in both `self`
    /// and `other`.
    ///
    /// Along each direction, parcels whose name is not in `other` are
    /// dropped. Brain models are kept when `other` has a model with the
    /// same structure and model type, and keep only the indices both
    /// share: vertices sorted ascending, voxels in this header's order.
    /// Models left without indices are dropped. `IndexCount` and
    /// `IndexOffset` are recomputed.
    pub fn intersection(&self, other: &CiftiHeader) -> CiftiHeader {
        let mut common = self.clone();
        for direction in Direction::ALL.iter().copied() {
            let theirs = other.matrix_indices_map(direction).ok();
            let map = match common.matrix_indices_map_mut(direction) {
                Some(map) => map,
                None => continue,
            };

            let names: HashSet<&str> = theirs
                .map(|m| m.parcels.iter().map(|p| p.name.as_str()).collect())
                .unwrap_or_default();
            map.parcels.retain(|p| names.contains(p.name.as_str()));

            let their_models = theirs.map(|m| m.brain_models.as_slice()).unwrap_or(&[]);
            map.brain_models = map
                .brain_models
                .iter()
                .filter_map(|model| intersect_model(model, their_models))
                .collect();
            map.recompute_offsets();

            debug!(
                "{}: {} parcels and {} brain models in common",
                direction,
                map.parcels.len(),
                map.brain_models.len()
            );
        }
        common
    }

    /// Matrix positions, along `direction`, of the given indices of one
    /// brain model. `None` where an index is not part of the model.
    pub fn filter_indices(
        &self,
        direction: Direction,
        model_type: ModelType,
        structure: &BrainStructure,
        search: &ModelIndices,
    ) -> Result<Vec<Option<usize>>> {
        let (offset, indices) = self.offset_and_indices(direction, model_type, structure)?;
        match (&indices, search) {
            (ModelIndices::Vertices(haystack), ModelIndices::Vertices(needles)) => {
                Ok(pos_in_array(needles, haystack, offset))
            }
            (ModelIndices::Voxels(haystack), ModelIndices::Voxels(needles)) => {
                Ok(pos_in_array(needles, haystack, offset))
            }
            _ => Err(CitrixError::InvalidArgument(format!(
                "searched indices do not match model type {}",
                model_type
            ))),
        }
    }

    /// Matrix positions, along `direction`, of the parcels with the
    /// given names. `None` where no parcel has that name.
    pub fn filter_parcels<S: AsRef<str>>(
        &self,
        direction: Direction,
        names: &[S],
    ) -> Result<Vec<Option<usize>>> {
        let haystack: Vec<&str> = self
            .parcels(direction, None)?
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        let needles: Vec<&str> = names.iter().map(|n| n.as_ref()).collect();
        Ok(pos_in_array(&needles, &haystack, 0))
    }
}

fn dimension_size(map: &MatrixIndicesMap) -> usize {
    match map.indices_type {
        IndexType::BrainModels | IndexType::Parcels => {
            map.parcels.len()
                + map
                    .brain_models
                    .iter()
                    .map(|b| b.index_count as usize)
                    .sum::<usize>()
        }
        IndexType::Series => map.number_of_series_points.unwrap_or(0) as usize,
        IndexType::Scalars | IndexType::Labels => map.named_maps.len(),
    }
}

fn intersect_model(model: &BrainModel, others: &[BrainModel]) -> Option<BrainModel> {
    let other = others
        .iter()
        .find(|o| o.structure == model.structure && o.model_type == model.model_type)?;

    let mut kept = model.clone();
    match model.model_type {
        ModelType::Surface => {
            let theirs: HashSet<u64> = other.vertex_indices.iter().copied().collect();
            let mut common: Vec<u64> = model
                .vertex_indices
                .iter()
                .copied()
                .filter(|v| theirs.contains(v))
                .collect();
            common.sort_unstable();
            common.dedup();
            kept.vertex_indices = common;
        }
        ModelType::Voxels => {
            let theirs: HashSet<[u64; 3]> = other.voxel_indices_ijk.iter().copied().collect();
            kept.voxel_indices_ijk = model
                .voxel_indices_ijk
                .iter()
                .copied()
                .filter(|v| theirs.contains(v))
                .collect();
        }
    }
    kept.index_count = kept.indices_len() as u64;
    if kept.index_count == 0 {
        None
    } else {
        Some(kept)
    }
}

/// Position of each element of `needles` within `haystack`, shifted by
/// `offset`. `None` for elements not found.
pub fn pos_in_array<T>(needles: &[T], haystack: &[T], offset: usize) -> Vec<Option<usize>>
where
    T: Eq + Hash,
{
    let mut positions: HashMap<&T, usize> = HashMap::with_capacity(haystack.len());
    for (i, e) in haystack.iter().enumerate() {
        let _ = positions.entry(e).or_insert(i + offset);
    }
    needles.iter().map(|e| positions.get(e).copied()).collect()
}

/// Reproject `data`, laid out as described by `source`, onto the rows
/// and columns of `common`. Entries of `common` missing from `source`
/// are zero.
pub fn retrieve_common_data(
    common: &CiftiHeader,
    source: &CiftiHeader,
    data: ArrayView2<f32>,
) -> Result<Array2<f32>> {
    let size = common.matrix_size()?;
    let rows = positions(common, source, Direction::Row, data.nrows())?;
    let cols = positions(common, source, Direction::Column, data.ncols())?;

    let mut out = Array2::zeros((size[0], size[1]));
    for (i, r) in rows.iter().enumerate() {
        let r = match r {
            Some(r) => *r,
            None => continue,
        };
        for (j, c) in cols.iter().enumerate() {
            if let Some(c) = c {
                let value = data.get((r, *c)).ok_or_else(|| {
                    CitrixError::InvalidArgument(format!(
                        "position ({}, {}) is outside of a {:?} matrix",
                        r,
                        c,
                        data.shape()
                    ))
                })?;
                out[(i, j)] = *value;
            }
        }
    }
    Ok(out)
}

fn positions(
    common: &CiftiHeader,
    source: &CiftiHeader,
    direction: Direction,
    extent: usize,
) -> Result<Vec<Option<usize>>> {
    let map = common.matrix_indices_map(direction)?;
    match map.indices_type {
        IndexType::Parcels => {
            let names: Vec<&str> = map.parcels.iter().map(|p| p.name.as_str()).collect();
            source.filter_parcels(direction, &names)
        }
        IndexType::BrainModels => {
            let mut positions = Vec::with_capacity(dimension_size(map));
            for model in &map.brain_models {
                positions.extend(source.filter_indices(
                    direction,
                    model.model_type,
                    &model.structure,
                    &model.indices(),
                )?);
            }
            Ok(positions)
        }
        _ => Ok((0..dimension_size(map))
            .map(|i| if i < extent { Some(i) } else { None })
            .collect()),
    }
}

/// A label map called `"Parcel"` for `nlabels` parcels. Key 0 is the
/// transparent `???` background, keys `1..=nlabels` cycle through a
/// palette of soft colours.
pub fn soft_colors_label_map(nlabels: usize) -> NamedMap {
    let mut labels = Vec::with_capacity(nlabels + 1);
    labels.push(Label {
        key: 0,
        name: "???".to_string(),
        red: 0.,
        green: 0.,
        blue: 0.,
        alpha: 0.,
    });
    for key in 1..=nlabels {
        let [mut red, green, mut blue] = SOFT_COLORS[(key - 1) % SOFT_COLORS.len()];
        if red == green && green == blue {
            // tint greys
            red *= 0.7;
            blue *= 0.95;
        }
        labels.push(Label {
            key: key as i32,
            name: key.to_string(),
            red,
            green,
            blue,
            alpha: 1.,
        });
    }
    NamedMap {
        map_name: "Parcel".to_string(),
        metadata: Default::default(),
        label_table: Some(labels),
    }
}

/// A label header: dimension 0 holds a soft colour label map with
/// `nparcels` labels, dimension 1 the given brain models.
pub fn create_label_header(models: &[BrainModel], nparcels: usize) -> CiftiHeader {
    let mut labels = MatrixIndicesMap::new(vec![0], IndexType::Labels);
    labels.named_maps.push(soft_colors_label_map(nparcels));

    let mut brain_models = MatrixIndicesMap::new(vec![1], IndexType::BrainModels);
    brain_models.brain_models = models.to_vec();
    brain_models.recompute_offsets();

    let mut header = CiftiHeader::default();
    header.matrix.maps = vec![labels, brain_models];
    header
}

/// Parse the CIFTI-2 document held in extension 32.
pub fn extract_cifti_header(extensions: &ExtensionSequence) -> Result<CiftiHeader> {
    let extension = extensions
        .find(NIFTI_ECODE_CIFTI)
        .ok_or(CitrixError::MissingCiftiExtension)?;
    CiftiHeader::from_bytes(extension.data())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extension::Extension;
    use ndarray::array;
    use pretty_assertions::assert_eq;

    fn header(row: Vec<BrainModel>, column: Vec<BrainModel>) -> CiftiHeader {
        let mut r = MatrixIndicesMap::new(vec![0], IndexType::BrainModels);
        r.brain_models = row;
        r.recompute_offsets();
        let mut c = MatrixIndicesMap::new(vec![1], IndexType::BrainModels);
        c.brain_models = column;
        c.recompute_offsets();
        let mut h = CiftiHeader::default();
        h.matrix.maps = vec![r, c];
        h
    }

    fn left(vertices: Vec<u64>) -> BrainModel {
        BrainModel::surface(BrainStructure::CortexLeft, 100, vertices)
    }

    fn right(vertices: Vec<u64>) -> BrainModel {
        BrainModel::surface(BrainStructure::CortexRight, 100, vertices)
    }

    fn stem(voxels: Vec<[u64; 3]>) -> BrainModel {
        BrainModel::voxels(BrainStructure::BrainStem, voxels)
    }

    #[test]
    fn queries() {
        let h = header(
            vec![left(vec![1, 2, 3]), stem(vec![[0, 0, 0], [1, 0, 0]])],
            vec![right(vec![5, 6])],
        );
        assert_eq!(h.brain_models(Direction::Row, None, None).unwrap().len(), 2);
        assert_eq!(
            h.brain_models(Direction::Row, Some(ModelType::Voxels), None)
                .unwrap()
                .len(),
            1
        );
        let (offset, indices) = h
            .offset_and_indices(Direction::Row, ModelType::Voxels, &BrainStructure::BrainStem)
            .unwrap();
        assert_eq!(offset, 3);
        assert_eq!(indices, ModelIndices::Voxels(vec![[0, 0, 0], [1, 0, 0]]));
        assert!(h
            .offset_and_indices(Direction::Column, ModelType::Surface, &BrainStructure::CortexLeft)
            .is_err());

        assert_eq!(h.feature_type(Direction::Row).unwrap(), FeatureType::Mixed);
        assert_eq!(h.feature_type(Direction::Column).unwrap(), FeatureType::Surface);
        assert_eq!(h.matrix_size().unwrap(), [5, 2]);
        assert_eq!(h.volume_attributes(Direction::Row).unwrap(), None);
    }

    #[test]
    fn feature_type_without_models() {
        let mut h = header(vec![], vec![]);
        h.matrix.maps[0].indices_type = IndexType::Series;
        assert!(h.feature_type(Direction::Row).is_err());
    }

    #[test]
    fn intersection_keeps_common_structures() {
        let a = header(
            vec![left(vec![9, 1, 3, 5]), right(vec![1, 2])],
            vec![stem(vec![[2, 2, 2], [0, 0, 0], [1, 1, 1]])],
        );
        let b = header(
            vec![left(vec![1, 5, 7, 9]), stem(vec![[0, 0, 0]])],
            vec![stem(vec![[1, 1, 1], [2, 2, 2]])],
        );

        let common = a.intersection(&b);
        let rows = common.brain_models(Direction::Row, None, None).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].structure, BrainStructure::CortexLeft);
        assert_eq!(rows[0].vertex_indices, vec![1, 5, 9]);
        assert_eq!(rows[0].index_count, 3);
        assert_eq!(rows[0].index_offset, 0);

        let cols = common.brain_models(Direction::Column, None, None).unwrap();
        assert_eq!(cols[0].voxel_indices_ijk, vec![[2, 2, 2], [1, 1, 1]]);
        assert_eq!(cols[0].index_count, 2);
        assert_eq!(common.matrix_size().unwrap(), [3, 2]);

        // the inputs are untouched
        assert_eq!(a.brain_models(Direction::Row, None, None).unwrap().len(), 2);
    }

    #[test]
    fn intersection_offsets_are_running_sums() {
        let a = header(
            vec![left(vec![0, 1, 2, 3]), stem(vec![[0, 0, 0], [0, 0, 1]]), right(vec![4, 5])],
            vec![],
        );
        let b = header(
            vec![left(vec![1, 3]), stem(vec![[0, 0, 1]]), right(vec![5, 4, 8])],
            vec![],
        );
        let common = a.intersection(&b);
        let models = common.brain_models(Direction::Row, None, None).unwrap();
        let offsets: Vec<u64> = models.iter().map(|m| m.index_offset).collect();
        let counts: Vec<u64> = models.iter().map(|m| m.index_count).collect();
        assert_eq!(offsets, vec![0, 2, 3]);
        assert_eq!(counts, vec![2, 1, 2]);
        for m in models {
            assert_eq!(m.index_count as usize, m.indices_len());
        }
        assert_eq!(common.intersection(&common), common);
    }

    #[test]
    fn intersection_of_parcels() {
        let parcel = |name: &str| Parcel {
            name: name.to_string(),
            vertices: vec![],
            voxel_indices_ijk: vec![],
        };
        let mut a = header(vec![], vec![]);
        a.matrix.maps[0].indices_type = IndexType::Parcels;
        a.matrix.maps[0].parcels = vec![parcel("V1"), parcel("V2"), parcel("MT")];
        let mut b = a.clone();
        b.matrix.maps[0].parcels = vec![parcel("MT"), parcel("V1")];

        let common = a.intersection(&b);
        let names: Vec<&str> = common
            .parcels(Direction::Row, None)
            .unwrap()
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["V1", "MT"]);
        assert_eq!(
            b.filter_parcels(Direction::Row, &names).unwrap(),
            vec![Some(1), Some(0)]
        );
        assert_eq!(
            b.filter_parcels(Direction::Row, &["V2"]).unwrap(),
            vec![None]
        );
    }

    #[test]
    fn matrix_positions() {
        assert_eq!(
            pos_in_array(&[3, 7, 1], &[1, 2, 3], 10),
            vec![Some(12), None, Some(10)]
        );
        let h = header(vec![left(vec![4, 8, 15]), right(vec![16, 23])], vec![]);
        let found = h
            .filter_indices(
                Direction::Row,
                ModelType::Surface,
                &BrainStructure::CortexRight,
                &ModelIndices::Vertices(vec![23, 42]),
            )
            .unwrap();
        assert_eq!(found, vec![Some(4), None]);
        assert!(h
            .filter_indices(
                Direction::Row,
                ModelType::Surface,
                &BrainStructure::CortexRight,
                &ModelIndices::Voxels(vec![[0, 0, 0]]),
            )
            .is_err());
    }

    #[test]
    fn common_data_is_reprojected() {
        let source = header(vec![left(vec![1, 2, 3])], vec![right(vec![7, 8])]);
        let data = array![[1., 2.], [3., 4.], [5., 6.]];
        let common = header(vec![left(vec![3, 1, 9])], vec![right(vec![8])]);

        let out = retrieve_common_data(&common, &source, data.view()).unwrap();
        assert_eq!(out, array![[6.], [2.], [0.]]);
        assert_eq!(out.shape(), &common.matrix_size().unwrap()[..]);
    }

    #[test]
    fn label_maps() {
        let map = soft_colors_label_map(30);
        assert_eq!(map.map_name, "Parcel");
        let labels = map.label_table.unwrap();
        assert_eq!(labels.len(), 31);
        assert_eq!(labels[0].name, "???");
        assert_eq!(labels[0].alpha, 0.);
        assert_eq!(labels[25].key, 25);
        assert_eq!(labels[25].red, labels[1].red);
        // grey entries are tinted
        let grey = &labels[24];
        assert!(grey.red < grey.green && grey.blue < grey.green);

        let models = vec![right(vec![1, 2]), left(vec![3])];
        let h = create_label_header(&models, 10);
        assert_eq!(h.labels(Direction::Row, None).unwrap().len(), 11);
        assert_eq!(h.labels(Direction::Row, Some(3)).unwrap()[0].name, "3");
        let structures: Vec<&BrainStructure> = h
            .brain_models(Direction::Column, None, None)
            .unwrap()
            .iter()
            .map(|b| &b.structure)
            .collect();
        assert_eq!(
            structures,
            vec![&BrainStructure::CortexRight, &BrainStructure::CortexLeft]
        );
        assert_eq!(h.matrix_size().unwrap(), [1, 3]);
    }

    #[test]
    fn header_from_extensions() {
        let h = create_label_header(&[left(vec![0])], 2);
        let mut extensions = ExtensionSequence::default();
        assert!(extract_cifti_header(&extensions).is_err());
        extensions.set(Extension::from_content(
            NIFTI_ECODE_CIFTI,
            h.to_xml().unwrap().into_bytes(),
        ));
        assert_eq!(extract_cifti_header(&extensions).unwrap(), h);
    }
}
