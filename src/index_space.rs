use core::ops::Range;




/**
 * Identifier for a Cartesian axis
 */
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    I,
    J,
}




// ============================================================================
impl Axis {

    /**
     * Return the unit offset along this axis, as an index delta.
     */
    pub fn unit(self) -> (i64, i64) {
        match self {
            Axis::I => (1, 0),
            Axis::J => (0, 1),
        }
    }

    /**
     * Return the index shifted by `delta` elements along this axis.
     */
    pub fn shift(self, index: (i64, i64), delta: i64) -> (i64, i64) {
        let (di, dj) = self.unit();
        (index.0 + di * delta, index.1 + dj * delta)
    }
}




#[derive(Clone, Debug, PartialEq, Eq)]


/**
 * Represents a rectangular region in a discrete index space
 */
pub struct IndexSpace {
    di: Range<i64>,
    dj: Range<i64>,
}




/**
 * Describes a rectangular index space. The index type is signed 64-bit integer.
 */
impl IndexSpace {


    pub fn new(di: Range<i64>, dj: Range<i64>) -> Self {

        assert!(
            di.start <= di.end && dj.start <= dj.end,
            "index space has negative volume");

        Self { di, dj }
    }


    /**
     * Return the number of indexes on each axis.
     */
    pub fn dim(&self) -> (usize, usize) {
        ((self.di.end - self.di.start) as usize,
         (self.dj.end - self.dj.start) as usize)
    }


    /**
     * Return the number of elements in this index space.
     */
    pub fn len(&self) -> usize {
        let (l, m) = self.dim();
        l * m
    }


    /**
     * Return the minimum index (inclusive).
     */
    pub fn start(&self) -> (i64, i64) {
        (self.di.start, self.dj.start)
    }


    /**
     * Return the maximum index (exclusive).
     */
    pub fn end(&self) -> (i64, i64) {
        (self.di.end, self.dj.end)
    }


    /**
     * Determine whether this index space contains the given index.
     */
    pub fn contains(&self, index: (i64, i64)) -> bool {
        self.di.contains(&index.0) && self.dj.contains(&index.1)
    }


    /**
     * Determine whether another index space is a subset of this one.
     */
    pub fn contains_space(&self, other: &Self) -> bool {
        other.di.start >= self.di.start && other.di.end <= self.di.end &&
        other.dj.start >= self.dj.start && other.dj.end <= self.dj.end
    }


    /**
     * Expand this index space by the given number of elements on each axis.
     */
    pub fn extend_all(&self, delta: i64) -> Self {
        Self::new(
            self.di.start - delta .. self.di.end + delta,
            self.dj.start - delta .. self.dj.end + delta)
    }


    /**
     * Expand this index space by the given number of elements on both ends of
     * a single axis.
     */
    pub fn extend(&self, delta: i64, axis: Axis) -> Self {
        match axis {
            Axis::I => Self::new(self.di.start - delta .. self.di.end + delta, self.dj.clone()),
            Axis::J => Self::new(self.di.clone(), self.dj.start - delta .. self.dj.end + delta),
        }
    }


    /**
     * Expand just the upper end of this index space on the given axis. A
     * space of cells extended by one on the upper end is the space of the
     * faces bounding those cells along that axis.
     */
    pub fn extend_upper(&self, delta: i64, axis: Axis) -> Self {
        match axis {
            Axis::I => Self::new(self.di.start .. self.di.end + delta, self.dj.clone()),
            Axis::J => Self::new(self.di.clone(), self.dj.start .. self.dj.end + delta),
        }
    }


    /**
     * Return the linear offset for the given index, in a row-major memory
     * buffer aligned with the start of this index space.
     */
    pub fn row_major_offset(&self, index: (i64, i64)) -> usize {
        let i = (index.0 - self.di.start) as usize;
        let j = (index.1 - self.dj.start) as usize;
        let m = (self.dj.end - self.dj.start) as usize;
        i * m + j
    }


    /**
     * Return the index at the given linear offset of a row-major buffer
     * aligned with the start of this index space. Inverse of
     * `row_major_offset`.
     */
    pub fn index_at_offset(&self, offset: usize) -> (i64, i64) {
        let m = (self.dj.end - self.dj.start) as usize;
        let i = (offset / m) as i64;
        let j = (offset % m) as i64;
        (self.di.start + i, self.dj.start + j)
    }


    /**
     * Return a memory region object corresponding to the selection of this
     * index space in the buffer allocated for another one.
     */
    pub fn memory_region_in(&self, parent: &Self) -> MemoryRegion {
        assert!(
            parent.contains_space(self),
            "selection {:?} is not contained in {:?}", self, parent);

        let start = (
            (self.di.start - parent.di.start) as usize,
            (self.dj.start - parent.dj.start) as usize);
        let count = self.dim();
        let shape = parent.dim();
        MemoryRegion { start, count, shape }
    }


    /**
     * Return an iterator which traverses the index space in row-major order
     * (C-like; the final index increases fastest).
     */
    pub fn iter(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        self.di.clone().flat_map(move |i| self.dj.clone().map(move |j| (i, j)))
    }
}




// ============================================================================
impl From<(Range<i64>, Range<i64>)> for IndexSpace {
    fn from(range: (Range<i64>, Range<i64>)) -> Self {
        Self::new(range.0, range.1)
    }
}

impl From<IndexSpace> for (Range<i64>, Range<i64>) {
    fn from(space: IndexSpace) -> Self {
        (space.di, space.dj)
    }
}




/**
 * Less imposing factory function to construct an IndexSpace object.
 */
pub fn range2d(di: Range<i64>, dj: Range<i64>) -> IndexSpace {
    IndexSpace::new(di, dj)
}




/**
 * A 2D memory region within a contiguous buffer.
 */
pub struct MemoryRegion {
    start: (usize, usize),
    count: (usize, usize),
    shape: (usize, usize),
}




// ============================================================================
impl MemoryRegion {

    /**
     * Consume this region, returning an iterator over the `chunk`-sized
     * slices it selects from the given buffer.
     */
    pub fn into_iter_slice(self, slice: &[f64], chunk: usize) -> impl Iterator<Item = &[f64]> {
        let MemoryRegion { start, count, shape } = self;
        let r = chunk;
        let q = shape.1 * r;

        assert!(slice.len() == shape.0 * shape.1 * chunk);

        slice[start.0 * q .. (start.0 + count.0) * q]
        .chunks_exact(q).flat_map(move |j| j[start.1 * r .. (start.1 + count.1) * r]
        .chunks_exact(r))
    }
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::{range2d, Axis};

    #[test]
    fn faces_of_a_cell_range_extend_the_upper_end() {
        let cells = range2d(4..14, 0..1);
        let faces = cells.extend_upper(1, Axis::I);
        assert_eq!(faces.dim(), (11, 1));
        assert_eq!(faces.end(), (15, 1));
    }

    #[test]
    fn extending_one_axis_leaves_the_other_alone() {
        let space = range2d(0..10, 0..1).extend(4, Axis::I);
        assert_eq!(space.start(), (-4, 0));
        assert_eq!(space.end(), (14, 1));
    }

    #[test]
    fn row_major_offset_round_trips_through_index_at_offset() {
        let space = range2d(-2..5, 3..9);
        for (n, index) in space.iter().enumerate() {
            assert_eq!(space.row_major_offset(index), n);
            assert_eq!(space.index_at_offset(n), index);
        }
    }

    #[test]
    fn memory_region_selects_the_right_number_of_chunks() {
        let parent = range2d(0..10, 0..8);
        let child = range2d(2..5, 1..4);
        let data = vec![1.0; parent.len() * 3];
        assert_eq!(child.memory_region_in(&parent).into_iter_slice(&data, 3).count(), 9);
    }
}
