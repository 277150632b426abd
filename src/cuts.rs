use rkyv::{Archive, Deserialize, Serialize};

/// Kinematic and geometric thresholds applied when connecting doublets.
///
/// These are the six scalars at the head of every input file.
#[derive(Debug, Clone, Copy, PartialEq, Archive, Serialize, Deserialize)]
pub struct Cuts {
    /// Minimum transverse momentum (GeV) a track must be compatible with.
    pub pt_min: f32,
    /// Transverse position of the luminous region centre (cm).
    pub region_origin_x: f32,
    pub region_origin_y: f32,
    /// Radius of the luminous region (cm). Tracks must pass within this distance
    /// of the region centre in the transverse plane.
    pub region_origin_radius: f32,
    /// Maximum r-z misalignment, scaled by `pt_min`.
    pub theta_cut: f32,
    /// Maximum turning angle (radians) between consecutive transverse segments.
    pub phi_cut: f32,
}

impl Cuts {
    /// Permissive cuts that accept anything roughly pointing back at the beam line.
    pub fn wide() -> Self {
        Self {
            pt_min: 0.0,
            region_origin_x: 0.0,
            region_origin_y: 0.0,
            region_origin_radius: 1.0e4,
            theta_cut: f32::MAX,
            phi_cut: std::f32::consts::PI,
        }
    }
}

impl Default for Cuts {
    fn default() -> Self {
        Self {
            pt_min: 0.8,
            region_origin_x: 0.0,
            region_origin_y: 0.0,
            region_origin_radius: 0.1,
            theta_cut: 0.002,
            phi_cut: 0.2,
        }
    }
}
