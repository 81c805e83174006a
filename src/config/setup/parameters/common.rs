use nalgebra::Point2;

// Square domain [0, l]^2.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct BoundaryConfig {
    pub l: f64,
}

impl BoundaryConfig {
    pub fn l_half(&self) -> f64 {
        self.l * 0.5
    }

    pub fn centre(&self) -> Point2<f64> {
        Point2::new(self.l_half(), self.l_half())
    }

    pub fn area(&self) -> f64 {
        self.l * self.l
    }

    pub fn contains(&self, r: &Point2<f64>) -> bool {
        (0.0..=self.l).contains(&r.x) && (0.0..=self.l).contains(&r.y)
    }
}
