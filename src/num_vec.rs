use core::ops::{Add, Sub, Mul, Div, Neg, Index, IndexMut};




/**
 * A statically-sized numeric vector over a generic scalar data type T, which
 * supports arithmetic operations also supported by T. The radiation Riemann
 * solver works on `Vector<f64, 4>` values holding `[E, Fx, Fy, Fz]`.
 */
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vector<T, const DIM: usize> {
    data: [T; DIM]
}




// ============================================================================
impl<T: Copy, const DIM: usize> Vector<T, DIM> {

    pub fn new(data: [T; DIM]) -> Self {
        Self { data }
    }

    /**
     * Build a vector by copying the first `DIM` elements of a slice. Panics
     * if the slice is too short.
     */
    pub fn from_slice(slice: &[T]) -> Self {
        let mut data = [slice[0]; DIM];
        data.copy_from_slice(&slice[..DIM]);
        Self { data }
    }

    pub fn as_array(&self) -> &[T; DIM] {
        &self.data
    }

    pub fn to_array(self) -> [T; DIM] {
        self.data
    }
}




// ============================================================================
impl<const DIM: usize> Vector<f64, DIM> {

    /**
     * Return the element-wise (Hadamard) product of two vectors.
     */
    pub fn component_mul(self, other: Self) -> Self {
        let mut data = self.data;

        for (x, y) in data.iter_mut().zip(other.data.iter()) {
            *x *= y
        }
        Self { data }
    }

    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|x| x.is_finite())
    }
}




// ============================================================================
impl<T, const DIM: usize> From<[T; DIM]> for Vector<T, DIM> {
    fn from(data: [T; DIM]) -> Self {
        Self { data }
    }
}




// ============================================================================
impl<T, U, V, const DIM: usize> Add<Vector<U, DIM>> for Vector<T, DIM>
where
    T: Copy + Add<U, Output = V>,
    U: Copy,
    V: Copy + Default
{
    type Output = Vector<V, DIM>;

    fn add(self, other: Vector<U, DIM>) -> Self::Output {
        let mut data = [V::default(); DIM];

        for (i, x) in data.iter_mut().enumerate() {
            *x = self[i].add(other[i])
        }
        Self::Output { data }
    }
}

impl<T, U, V, const DIM: usize> Sub<Vector<U, DIM>> for Vector<T, DIM>
where
    T: Copy + Sub<U, Output = V>,
    U: Copy,
    V: Copy + Default
{
    type Output = Vector<V, DIM>;

    fn sub(self, other: Vector<U, DIM>) -> Self::Output {
        let mut data = [V::default(); DIM];

        for (i, x) in data.iter_mut().enumerate() {
            *x = self[i].sub(other[i])
        }
        Self::Output { data }
    }
}

impl<T, U, V, const DIM: usize> Mul<U> for Vector<T, DIM>
where
    T: Copy + Mul<U, Output = V>,
    U: Copy,
    V: Copy + Default
{
    type Output = Vector<V, DIM>;

    fn mul(self, other: U) -> Self::Output {
        let mut data = [V::default(); DIM];

        for (i, x) in data.iter_mut().enumerate() {
            *x = self[i].mul(other)
        }
        Self::Output { data }
    }
}

impl<T, U, V, const DIM: usize> Div<U> for Vector<T, DIM>
where
    T: Copy + Div<U, Output = V>,
    U: Copy,
    V: Copy + Default
{
    type Output = Vector<V, DIM>;

    fn div(self, other: U) -> Self::Output {
        let mut data = [V::default(); DIM];

        for (i, x) in data.iter_mut().enumerate() {
            *x = self[i].div(other)
        }
        Self::Output { data }
    }
}

impl<T, V, const DIM: usize> Neg for Vector<T, DIM>
where
    T: Copy + Neg<Output = V>,
    V: Copy + Default
{
    type Output = Vector<V, DIM>;

    fn neg(self) -> Self::Output {
        let mut data = [V::default(); DIM];

        for (i, x) in data.iter_mut().enumerate() {
            *x = self[i].neg()
        }
        Self::Output { data }
    }
}




// ============================================================================
impl<T, const DIM: usize> Index<usize> for Vector<T, DIM> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        &self.data[index]
    }
}

impl<T, const DIM: usize> IndexMut<usize> for Vector<T, DIM> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.data[index]
    }
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::Vector;

    #[test]
    fn arithmetic_is_element_wise() {
        let x = Vector::new([1.0, 2.0, 3.0, 4.0]);
        let y = Vector::new([4.0, 3.0, 2.0, 1.0]);
        assert_eq!((x + y).to_array(), [5.0; 4]);
        assert_eq!((x - y).to_array(), [-3.0, -1.0, 1.0, 3.0]);
        assert_eq!((x * 2.0).to_array(), [2.0, 4.0, 6.0, 8.0]);
        assert_eq!((x / 2.0).to_array(), [0.5, 1.0, 1.5, 2.0]);
        assert_eq!((-x)[3], -4.0);
    }

    #[test]
    fn component_mul_scales_each_entry() {
        let u = Vector::new([2.0, 1.0, 1.0, 1.0]);
        let eps = Vector::new([0.25, 0.5, 0.5, 0.5]);
        assert_eq!(u.component_mul(eps).to_array(), [0.5, 0.5, 0.5, 0.5]);
    }

    #[test]
    fn from_slice_takes_the_leading_entries() {
        let data = [9.0, 8.0, 7.0, 6.0, 5.0];
        let v: Vector<f64, 4> = Vector::from_slice(&data[1..]);
        assert_eq!(v.to_array(), [8.0, 7.0, 6.0, 5.0]);
    }
}
