use super::state::magnitude;




/**
 * The Levermore (1984) M1 Eddington factor for a reduced flux `f`, which is
 * clamped to [0, 1]. The result lies in [1/3, 1] and increases with `f`.
 */
pub fn eddington_factor(f: f64) -> f64 {
    let f = f.max(0.0).min(1.0);
    let f2 = f * f;
    let chi = (3.0 + 4.0 * f2) / (5.0 + 2.0 * (4.0 - 3.0 * f2).sqrt());
    debug_assert!(chi >= 1.0 / 3.0 - 1e-14 && chi <= 1.0 + 1e-14, "Eddington factor {} out of range", chi);
    chi
}




/**
 * The Eddington tensor `T_ij = (1 - chi)/2 δ_ij + (3 chi - 1)/2 n_i n_j`
 * for a reduced-flux 3-vector, where `n` is the unit flux direction. The
 * radiation pressure tensor is this tensor times the energy density. A zero
 * flux yields the isotropic tensor δ_ij / 3.
 */
pub fn eddington_tensor(reduced_flux: [f64; 3]) -> [[f64; 3]; 3] {
    let [fx, fy, fz] = reduced_flux;
    let f = magnitude(fx, fy, fz);
    let chi = eddington_factor(f);

    let n = if f > 0.0 {
        [fx / f, fy / f, fz / f]
    } else {
        [0.0; 3]
    };
    let isotropic = 0.5 * (1.0 - chi);
    let anisotropic = 0.5 * (3.0 * chi - 1.0);
    let mut t = [[0.0; 3]; 3];

    for i in 0..3 {
        for j in 0..3 {
            let delta = if i == j { 1.0 } else { 0.0 };
            t[i][j] = isotropic * delta + anisotropic * n[i] * n[j];
        }
    }
    t
}
