/**
 * Enum to hold a unit vector in 3D space
 */
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    I,
    J,
    K,
}




// ============================================================================
impl Direction {

    /**
     * Return the position (0, 1, or 2) of this direction among the three
     * vector components of the state.
     */
    pub fn component(&self) -> usize {
        match self {
            Direction::I => 0,
            Direction::J => 1,
            Direction::K => 2,
        }
    }
}

impl From<crate::index_space::Axis> for Direction {
    fn from(axis: crate::index_space::Axis) -> Self {
        match axis {
            crate::index_space::Axis::I => Direction::I,
            crate::index_space::Axis::J => Direction::J,
        }
    }
}
