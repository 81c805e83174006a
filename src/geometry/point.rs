use nalgebra::{Point2, Vector2};
use rand::distributions::Distribution;

pub fn random_vector<R: rand::Rng, T: Distribution<f64>>(rng: &mut R, distr: T) -> Vector2<f64> {
    Vector2::new(distr.sample(rng), distr.sample(rng))
}

pub fn distances_to(positions: &[Point2<f64>], centre: Point2<f64>) -> Vec<f64> {
    positions.iter().map(|r| (r - centre).magnitude()).collect()
}

pub fn mean_pairwise_nearest(positions: &[Point2<f64>]) -> Option<f64> {
    if positions.len() < 2 {
        return None;
    }
    let total: f64 = positions
        .iter()
        .enumerate()
        .map(|(i, ri)| {
            positions
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, rj)| (ri - rj).magnitude())
                .fold(f64::INFINITY, f64::min)
        })
        .sum();
    Some(total / positions.len() as f64)
}
