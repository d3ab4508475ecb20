//! Recovery of known lines from noisy synthetic data.

use ef_stats::{Sigma, fit_indexed, weighted_fit};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::Normal;

fn noisy_line(a: f64, b: f64, sigma: f64, n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let noise = Normal::new(0.0, sigma).unwrap();
    (0..n).map(|i| a + b * i as f64 + rng.sample(noise)).collect()
}

#[test]
fn recovers_parameters_within_a_few_sigma() {
    let (a, b, sigma) = (0.1, -1e-7, 1e-7);
    for seed in [1_u64, 7, 42] {
        let y = noisy_line(a, b, sigma, 201, seed);
        let fit = fit_indexed(&y, Sigma::Constant(sigma)).unwrap();

        assert!((fit.a - a).abs() < 5.0 * fit.sig_a, "seed {seed}: a = {}", fit.a);
        assert!((fit.b - b).abs() < 5.0 * fit.sig_b, "seed {seed}: b = {}", fit.b);
        assert!((0.0..=1.0).contains(&fit.q));
    }
}

#[test]
fn chi_square_tracks_degrees_of_freedom() {
    // E[χ²] = ν; with ν = 998 the spread is ~√(2ν) ≈ 45.
    let sigma = 0.25;
    let y = noisy_line(3.0, 0.5, sigma, 1000, 2024);
    let fit = fit_indexed(&y, Sigma::Constant(sigma)).unwrap();

    assert_eq!(fit.nu, 998);
    assert!((fit.chi2 - 998.0).abs() < 300.0, "chi2 = {}", fit.chi2);
    assert!(fit.q > 1e-6 && fit.q < 1.0 - 1e-6);
    assert!(fit.r2 > 0.99);
}

#[test]
fn arbitrary_abscissa_matches_indexed_fit() {
    let y = noisy_line(1.0, 2.0, 0.1, 25, 9);
    let x: Vec<f64> = (0..25).map(|i| i as f64).collect();
    let indexed = fit_indexed(&y, Sigma::Constant(0.1)).unwrap();
    let explicit = weighted_fit(&x, &y, Sigma::Constant(0.1)).unwrap();
    assert_eq!(indexed, explicit);
}
