use serde::{Deserialize, Serialize};

/// Trace-space coordinate along the beamline: path length `s` along the
/// nominal axis, lab-frame position (x, y, z) and divergences
/// x' = px/pz, y' = py/pz.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraceSpace {
    pub s: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub xp: f64,
    pub yp: f64,
}

impl TraceSpace {
    pub fn new(s: f64, x: f64, y: f64, z: f64, xp: f64, yp: f64) -> Self {
        Self { s, x, y, z, xp, yp }
    }

    /// Coordinate at the lab origin with zero divergence.
    pub fn origin() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.0)
    }

    /// Position part as an array [x, y, z].
    pub fn position(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction() {
        let tsc = TraceSpace::new(1.0, 0.1, -0.2, 0.9, 0.01, -0.02);
        assert_eq!(tsc.s, 1.0);
        assert_eq!(tsc.position(), [0.1, -0.2, 0.9]);
        assert_eq!(tsc.xp, 0.01);
        assert_eq!(tsc.yp, -0.02);
    }

    #[test]
    fn test_origin() {
        assert_eq!(TraceSpace::origin(), TraceSpace::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.0));
    }
}
