// Three-body muon decay, mu -> e + nu_e + nu_mu, sampled in the muon
// rest frame with an importance weight.
//
// The scaled daughter energies (units m_mu / 2) are drawn from the
// Michel spectra by inverting their CDFs; the inter-daughter angles then
// follow from momentum conservation, and the configuration is given a
// random orientation. With no forward bias the sampling is exact and
// every event carries weight 1; a forward bias tilts the orientation
// density toward +z and the weight becomes the true-to-sampled density
// ratio.

use crate::constants::{MUON_LIFETIME, MUON_MASS_MEV};
use crate::kinematics::{euler_rotation, FourMomentum};
use crate::pion_decay::sample_decay_time;
use nalgebra::Vector3;
use rand::Rng;

/// One sampled muon decay in the rest frame. Momenta in MeV.
#[derive(Debug, Clone)]
pub struct MuonDecay {
    /// Proper time to decay (s).
    pub lifetime: f64,
    /// Electron 4-momentum (MeV); the electron is treated as massless.
    pub v_e: FourMomentum,
    /// Electron-neutrino 4-momentum (MeV).
    pub v_nue: FourMomentum,
    /// Muon-neutrino 4-momentum (MeV).
    pub v_numu: FourMomentum,
    /// Cosine of the angle between electron and nu_e.
    pub cos_theta: f64,
    /// Cosine of the angle between electron and nu_mu.
    pub cos_phi: f64,
    /// Importance weight; >= 0 always, 0 marks a kinematically forbidden
    /// sampled point (discard or re-sample, never an error).
    pub weight: f64,
}

impl MuonDecay {
    /// Sample a decay. `t_max` truncates the proper decay time;
    /// `forward_bias` in [0, 1) tilts the orientation density toward +z
    /// (0 disables biasing and yields unit weights).
    pub fn generate<R: Rng + ?Sized>(t_max: f64, forward_bias: f64, rng: &mut R) -> Self {
        let lifetime = sample_decay_time(MUON_LIFETIME, t_max, rng);

        let (f_e, f_nue, f_numu) = sample_scaled_energies(rng);

        // Opening angles fixed by momentum conservation among the three
        // scaled momenta (electron along +z before orientation).
        let cos_theta = 1.0 - 2.0 * (1.0 / f_e + 1.0 / f_nue - 1.0 / (f_e * f_nue));
        if !(-1.0..=1.0).contains(&cos_theta) {
            // Forbidden by roundoff at the phase-space edge: weight 0.
            return Self::zero_weight(lifetime, cos_theta);
        }
        let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();

        let cos_phi = -(f_e + f_nue * cos_theta) / f_numu;
        let sin_phi = -f_nue * sin_theta / f_numu;
        if cos_phi.abs() > 1.0 + 1e-12 {
            return Self::zero_weight(lifetime, cos_theta);
        }

        let p_e = Vector3::new(0.0, 0.0, f_e);
        let p_nue = Vector3::new(f_nue * sin_theta, 0.0, f_nue * cos_theta);
        let p_numu = Vector3::new(f_numu * sin_phi, 0.0, f_numu * cos_phi);

        // Random orientation, optionally biased toward the +z lab axis.
        let alpha = 2.0 * std::f64::consts::PI * rng.gen::<f64>();
        let gamma = 2.0 * std::f64::consts::PI * rng.gen::<f64>();
        let (cos_beta, weight) = sample_orientation_cosine(forward_bias, rng);
        let rot = euler_rotation(alpha, cos_beta, gamma);

        let scale = MUON_MASS_MEV / 2.0;
        let v_e = FourMomentum {
            e: f_e * scale,
            p: rot * p_e * scale,
        };
        let v_nue = FourMomentum {
            e: f_nue * scale,
            p: rot * p_nue * scale,
        };
        let v_numu = FourMomentum {
            e: f_numu * scale,
            p: rot * p_numu * scale,
        };

        Self {
            lifetime,
            v_e,
            v_nue,
            v_numu,
            cos_theta,
            cos_phi,
            weight,
        }
    }

    fn zero_weight(lifetime: f64, cos_theta: f64) -> Self {
        let zero = FourMomentum::new(0.0, 0.0, 0.0, 0.0);
        Self {
            lifetime,
            v_e: zero,
            v_nue: zero,
            v_numu: zero,
            cos_theta,
            cos_phi: 0.0,
            weight: 0.0,
        }
    }
}

/// Scaled energies (f_e, f_nue, f_numu) in units of m_mu / 2, with
/// f_e + f_nue + f_numu = 2 and the pairwise phase-space constraint
/// f_nue >= 1 - f_e enforced by rejection.
pub fn sample_scaled_energies<R: Rng + ?Sized>(rng: &mut R) -> (f64, f64, f64) {
    loop {
        // Electron energy from the Michel spectrum 2 x^2 (3 - 2 x),
        // CDF 2 x^3 - x^4.
        let g_e: f64 = rng.gen();
        let f_e = invert_monotone_cdf(|x| 2.0 * x.powi(3) - x.powi(4), g_e);

        // nu_e energy from CDF 3 x^2 - 2 x^3, pushed above the
        // kinematic floor through alpha = (1 - f_e)^2 (1 + 2 f_e).
        let alpha = (1.0 - f_e).powi(2) * (1.0 + 2.0 * f_e);
        let g_nue = rng.gen::<f64>() * (1.0 - alpha) + alpha;
        let f_nue = invert_monotone_cdf(|x| 3.0 * x.powi(2) - 2.0 * x.powi(3), g_nue);

        if f_nue >= 1.0 - f_e && f_e > 0.0 && f_nue > 0.0 {
            let f_numu = 2.0 - f_e - f_nue;
            return (f_e, f_nue, f_numu);
        }
    }
}

/// Invert a monotone-increasing CDF on [0, 1] by bisection.
fn invert_monotone_cdf<F: Fn(f64) -> f64>(cdf: F, target: f64) -> f64 {
    let mut lo = 0.0_f64;
    let mut hi = 1.0_f64;
    for _ in 0..64 {
        let mid = 0.5 * (lo + hi);
        if cdf(mid) < target {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    0.5 * (lo + hi)
}

/// Orientation cosine and its importance weight. The sampling density is
/// q(c) = (1 + b c) / 2 on [-1, 1]; the physical density is uniform, so
/// the weight is 1 / (1 + b c). b = 0 gives uniform sampling and unit
/// weight.
pub fn sample_orientation_cosine<R: Rng + ?Sized>(bias: f64, rng: &mut R) -> (f64, f64) {
    let u: f64 = rng.gen();
    if bias == 0.0 {
        return (-1.0 + 2.0 * u, 1.0);
    }
    // Invert F(c) = (c + 1)/2 + b (c^2 - 1)/4.
    let disc = 0.25 - bias * (0.5 - bias / 4.0 - u);
    let c = ((disc.max(0.0).sqrt() - 0.5) / (bias / 2.0)).clamp(-1.0, 1.0);
    (c, 1.0 / (1.0 + bias * c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_scaled_energies_sum_to_two() {
        let mut rng = StdRng::seed_from_u64(31);
        for _ in 0..1000 {
            let (f_e, f_nue, f_numu) = sample_scaled_energies(&mut rng);
            assert!((f_e + f_nue + f_numu - 2.0).abs() < 1e-9);
            assert!(f_e > 0.0 && f_e <= 1.0);
            assert!(f_nue > 0.0 && f_nue <= 1.0);
            assert!(f_numu >= 0.0 && f_numu <= 1.0 + 1e-12);
        }
    }

    #[test]
    fn test_energy_and_momentum_conservation() {
        let mut rng = StdRng::seed_from_u64(32);
        for _ in 0..1000 {
            let dcy = MuonDecay::generate(f64::INFINITY, 0.0, &mut rng);
            if dcy.weight == 0.0 {
                continue;
            }
            let total = dcy.v_e + dcy.v_nue + dcy.v_numu;
            assert!((total.e - MUON_MASS_MEV).abs() < 1e-6, "E = {}", total.e);
            assert!(total.p.norm() < 1e-6, "|p| = {}", total.p.norm());
        }
    }

    #[test]
    fn test_weight_is_unit_without_bias() {
        let mut rng = StdRng::seed_from_u64(33);
        for _ in 0..200 {
            let dcy = MuonDecay::generate(f64::INFINITY, 0.0, &mut rng);
            assert!(dcy.weight == 1.0 || dcy.weight == 0.0);
        }
    }

    #[test]
    fn test_weight_never_negative_with_bias() {
        let mut rng = StdRng::seed_from_u64(34);
        for _ in 0..5000 {
            let dcy = MuonDecay::generate(f64::INFINITY, 0.9, &mut rng);
            assert!(dcy.weight >= 0.0, "weight = {}", dcy.weight);
        }
    }

    #[test]
    fn test_biased_orientation_weight_recovers_uniform_mean() {
        // E_q[c w(c)] must equal E_uniform[c] = 0.
        let mut rng = StdRng::seed_from_u64(35);
        let n = 200_000;
        let mut acc = 0.0;
        let mut wsum = 0.0;
        for _ in 0..n {
            let (c, w) = sample_orientation_cosine(0.8, &mut rng);
            acc += c * w;
            wsum += w;
        }
        assert!((acc / wsum).abs() < 0.01, "weighted mean = {}", acc / wsum);
    }

    #[test]
    fn test_electron_spectrum_cdf_inversion() {
        // CDF(0.5) = 2/8 - 1/16 = 0.1875; invert and compare.
        let x = invert_monotone_cdf(|x| 2.0 * x.powi(3) - x.powi(4), 0.1875);
        assert!((x - 0.5).abs() < 1e-9, "x = {}", x);
    }

    #[test]
    fn test_electron_spectrum_mean() {
        // <x> for 2 x^2 (3 - 2 x) on [0, 1] is 7/10.
        let mut rng = StdRng::seed_from_u64(36);
        let n = 100_000;
        let mean: f64 = (0..n)
            .map(|_| {
                let g: f64 = rng.gen();
                invert_monotone_cdf(|x| 2.0 * x.powi(3) - x.powi(4), g)
            })
            .sum::<f64>()
            / n as f64;
        assert!((mean - 0.7).abs() < 0.005, "mean = {}", mean);
    }

    #[test]
    fn test_daughters_on_mass_shell() {
        let mut rng = StdRng::seed_from_u64(37);
        let dcy = MuonDecay::generate(f64::INFINITY, 0.0, &mut rng);
        // All three daughters treated as massless in the rest frame.
        assert!(dcy.v_e.mass_squared().abs() < 1e-6);
        assert!(dcy.v_nue.mass_squared().abs() < 1e-6);
        assert!(dcy.v_numu.mass_squared().abs() < 1e-6);
    }
}
