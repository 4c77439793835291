use serde::{Deserialize, Serialize};
use crate::index_space::{Axis, IndexSpace};
use crate::patch::Patch;




/**
 * Number of guard zones a primitive array must carry on each side of the
 * cells being updated, along every swept axis.
 */
pub const NUM_GUARD: i64 = 4;




/**
 * Method used to reconstruct interface states from cell averages
 */
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reconstruction {
    /// Piecewise-constant (first order)
    Constant,
    /// Piecewise-linear with the monotonized-central limiter
    Plm,
    /// Piecewise-parabolic (Colella and Woodward 1984)
    Ppm,
}

impl Default for Reconstruction {
    fn default() -> Self {
        Reconstruction::Ppm
    }
}

impl std::str::FromStr for Reconstruction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "constant" | "pcm" => Ok(Reconstruction::Constant),
            "plm" => Ok(Reconstruction::Plm),
            "ppm" => Ok(Reconstruction::Ppm),
            _ => Err(format!("unknown reconstruction '{}' (expected constant, plm, or ppm)", s)),
        }
    }
}




/**
 * Left and right states at each face of a range of cells. Both patches cover
 * the face space `cells.extend_upper(1, axis)`; face `i` is the lower edge of
 * cell `i`, so its left state comes from cell `i - 1` and its right state
 * from cell `i`.
 */
pub struct InterfaceStates {
    pub left: Patch,
    pub right: Patch,
}




/**
 * The monotonized-central slope limiter. Returns zero when the two
 * differences disagree in sign.
 */
pub fn mc(a: f64, b: f64) -> f64 {
    0.5 * (sgn(a) + sgn(b)) * f64::min(0.5 * (a + b).abs(), f64::min(2.0 * a.abs(), 2.0 * b.abs()))
}

fn sgn(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}




// ============================================================================
fn stencil(q: &Patch, index: (i64, i64), axis: Axis, n: usize, delta: i64) -> f64 {
    q.get_slice(axis.shift(index, delta))[n]
}

fn ppm_face_value(q: &Patch, face: (i64, i64), axis: Axis, n: usize) -> f64 {
    let qm2 = stencil(q, face, axis, n, -2);
    let qm1 = stencil(q, face, axis, n, -1);
    let q00 = stencil(q, face, axis, n, 0);
    let qp1 = stencil(q, face, axis, n, 1);
    (7.0 / 12.0) * (qm1 + q00) - (1.0 / 12.0) * (qm2 + qp1)
}

/**
 * Return the parabola edge values (a_minus, a_plus) of component `n` in the
 * given cell.
 */
fn ppm_edges(q: &Patch, cell: (i64, i64), axis: Axis, n: usize) -> (f64, f64) {
    let qm = stencil(q, cell, axis, n, -1);
    let a  = stencil(q, cell, axis, n, 0);
    let qp = stencil(q, cell, axis, n, 1);

    let lo = qm.min(a).min(qp);
    let hi = qm.max(a).max(qp);

    let mut a_minus = ppm_face_value(q, cell, axis, n).max(lo).min(hi);
    let mut a_plus = ppm_face_value(q, axis.shift(cell, 1), axis, n).max(lo).min(hi);

    let dq_minus = a - a_minus;
    let dq_plus = a_plus - a;

    if dq_plus * dq_minus <= 0.0 {
        // local extremum: drop to a limited linear profile in this cell
        let dq0 = mc(qp - a, a - qm);
        a_minus = a - 0.5 * dq0;
        a_plus = a + 0.5 * dq0;
    } else {
        if dq_minus.abs() >= 2.0 * dq_plus.abs() {
            a_minus = a - 2.0 * dq_plus;
        }
        if dq_plus.abs() >= 2.0 * dq_minus.abs() {
            a_plus = a + 2.0 * dq_minus;
        }
    }
    (a_minus, a_plus)
}

fn plm_edges(q: &Patch, cell: (i64, i64), axis: Axis, n: usize) -> (f64, f64) {
    let qm = stencil(q, cell, axis, n, -1);
    let a  = stencil(q, cell, axis, n, 0);
    let qp = stencil(q, cell, axis, n, 1);
    let slope = mc(qp - a, a - qm);
    (a - 0.5 * slope, a + 0.5 * slope)
}




/**
 * Reconstruct left and right interface states at the faces of `cells` along
 * the given axis, from the cell-centered array `q`.
 *
 * The edge values are computed for every cell adjacent to one of the faces
 * (`cells.extend(1, axis)`), which in turn reads up to three cells past
 * either end of `cells`. Panics if `q` does not cover `cells.extend(3,
 * axis)`.
 */
pub fn reconstruct(method: Reconstruction, q: &Patch, cells: &IndexSpace, axis: Axis) -> InterfaceStates {
    assert!(
        q.index_space().contains_space(&cells.extend(3, axis)),
        "reconstruction needs at least three guard zones along {:?}", axis);

    let num_fields = q.num_fields();
    let edge_cells = cells.extend(1, axis);
    let faces = cells.extend_upper(1, axis);

    let edges = Patch::from_slice_function_par(edge_cells, 2 * num_fields, |cell, e| {
        let (minus, plus) = e.split_at_mut(num_fields);

        for n in 0..num_fields {
            let (am, ap) = match method {
                Reconstruction::Constant => {
                    let a = q.get_slice(cell)[n];
                    (a, a)
                }
                Reconstruction::Plm => plm_edges(q, cell, axis, n),
                Reconstruction::Ppm => ppm_edges(q, cell, axis, n),
            };
            minus[n] = am;
            plus[n] = ap;
        }
    });

    let left = Patch::from_slice_function_par(faces.clone(), num_fields, |face, s| {
        s.copy_from_slice(&edges.get_slice(axis.shift(face, -1))[num_fields..])
    });
    let right = Patch::from_slice_function_par(faces, num_fields, |face, s| {
        s.copy_from_slice(&edges.get_slice(face)[..num_fields])
    });
    InterfaceStates { left, right }
}
