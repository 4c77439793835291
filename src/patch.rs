use rayon::prelude::*;
use crate::index_space::IndexSpace;




/**
 * A patch is a mapping from a rectangular subset of an index space to
 * associated field values. The mapping is backed by a row-major array of
 * data, where each element of the index space holds `num_fields` contiguous
 * values (the field index increases fastest).
 *
 * Patches are the currency of the radiation kernels: the conserved state
 * registers owned by the driver, and the scratch arrays (primitive
 * variables, interface states, flux buffers) allocated per kernel call, are
 * all patches. A patch covering a face index space stores the value at the
 * left edge of each zone along the relevant axis.
 */
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Patch {
    space: (core::ops::Range<i64>, core::ops::Range<i64>),
    num_fields: usize,
    data: Vec<f64>,
}




// ============================================================================
impl Patch {


    /**
     * Generate a patch of zeros over the given index space.
     */
    pub fn zeros(num_fields: usize, space: IndexSpace) -> Self {
        Self {
            data: vec![0.0; space.len() * num_fields],
            space: space.into(),
            num_fields,
        }
    }


    /**
     * Generate a patch covering the given space, with values defined from a
     * closure which writes the field values at a given index.
     */
    pub fn from_slice_function<F>(space: IndexSpace, num_fields: usize, f: F) -> Self
    where
        F: Fn((i64, i64), &mut [f64])
    {
        let mut data = vec![0.0; space.len() * num_fields];

        for (index, slice) in space.iter().zip(data.chunks_exact_mut(num_fields)) {
            f(index, slice)
        }
        Self {
            space: space.into(),
            num_fields,
            data,
        }
    }


    /**
     * Same as `from_slice_function`, except the closure is evaluated in
     * parallel over the elements of the index space.
     */
    pub fn from_slice_function_par<F>(space: IndexSpace, num_fields: usize, f: F) -> Self
    where
        F: Fn((i64, i64), &mut [f64]) + Sync
    {
        let mut patch = Self::zeros(num_fields, space);
        patch.par_for_each_mut(f);
        patch
    }


    /**
     * Return the index space covered by this patch.
     */
    pub fn index_space(&self) -> IndexSpace {
        IndexSpace::from(self.space.clone())
    }


    /**
     * Return the number of fields stored at each index.
     */
    pub fn num_fields(&self) -> usize {
        self.num_fields
    }


    /**
     * Return the field values at the given index.
     */
    pub fn get_slice(&self, index: (i64, i64)) -> &[f64] {
        let n = self.offset(index);
        &self.data[n * self.num_fields .. (n + 1) * self.num_fields]
    }


    /**
     * Return a mutable reference to the field values at the given index.
     */
    pub fn get_slice_mut(&mut self, index: (i64, i64)) -> &mut [f64] {
        let n = self.offset(index);
        let r = self.num_fields;
        &mut self.data[n * r .. (n + 1) * r]
    }


    /**
     * Return a single field value at the given index.
     */
    pub fn get(&self, index: (i64, i64), field: usize) -> f64 {
        self.get_slice(index)[field]
    }


    /**
     * Return an iterator over the field slices in a subset of this patch,
     * in row-major order.
     */
    pub fn select(&self, subset: IndexSpace) -> impl Iterator<Item = &[f64]> {
        let region = subset.memory_region_in(&self.index_space());
        let r = self.num_fields;
        let data = &self.data;
        region.into_iter_slice(data, r)
    }


    /**
     * Return an iterator over the field slices at every index.
     */
    pub fn iter_data(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks_exact(self.num_fields)
    }


    /**
     * Evaluate a closure over every index of this patch, in parallel on the
     * Rayon global thread pool.
     */
    pub fn par_for_each_mut<F>(&mut self, f: F)
    where
        F: Fn((i64, i64), &mut [f64]) + Sync
    {
        let space = self.index_space();
        self.data
            .par_chunks_exact_mut(self.num_fields)
            .enumerate()
            .for_each(|(n, slice)| f(space.index_at_offset(n), slice))
    }


    /**
     * Evaluate a fallible closure over every index in a subset of this
     * patch, in parallel, collecting the returned values in row-major order.
     * One of the errors is returned if any evaluation fails; the remaining
     * elements may or may not have been visited.
     */
    pub fn par_try_map_in<F, T, E>(&mut self, subset: &IndexSpace, f: F) -> Result<Vec<T>, E>
    where
        F: Fn((i64, i64), &mut [f64]) -> Result<T, E> + Sync,
        T: Send,
        E: Send,
    {
        let space = self.index_space();
        self.data
            .par_chunks_exact_mut(self.num_fields)
            .enumerate()
            .map(|(n, slice)| (space.index_at_offset(n), slice))
            .filter(|(index, _)| subset.contains(*index))
            .map(|(index, slice)| f(index, slice))
            .collect()
    }


    /**
     * Map the field values at each index through a function, yielding a
     * new patch with `num_fields` fields per index.
     */
    pub fn map<F>(&self, num_fields: usize, f: F) -> Self
    where
        F: Fn(&[f64], &mut [f64]) + Sync
    {
        let mut result = Self::zeros(num_fields, self.index_space());
        result.data
            .par_chunks_exact_mut(num_fields)
            .zip(self.data.par_chunks_exact(self.num_fields))
            .for_each(|(b, a)| f(a, b));
        result
    }


    /**
     * Sum a single field over a subset of this patch.
     */
    pub fn sum_field(&self, subset: IndexSpace, field: usize) -> f64 {
        self.select(subset).map(|s| s[field]).sum()
    }


    fn offset(&self, index: (i64, i64)) -> usize {
        self.validate_index(index);
        self.index_space().row_major_offset(index)
    }

    fn validate_index(&self, index: (i64, i64)) {
        if !self.index_space().contains(index) {
            panic!("index ({} {}) out of range on patch ({}..{} {}..{})",
                index.0,
                index.1,
                self.space.0.start,
                self.space.0.end,
                self.space.1.start,
                self.space.1.end);
        }
    }
}
