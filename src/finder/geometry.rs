//! Three-point trajectory plausibility tests.
//!
//! A doublet pair is compatible when its three hits (inner point of the
//! predecessor, then inner and outer point of the doublet) could lie on one
//! helix coming from the luminous region. In the transverse plane a helix is a
//! circle whose radius grows with transverse momentum; in the r-z plane it is
//! close to a straight line. Each test is monotone in its cut: a tighter cut
//! never accepts more triplets.

use nalgebra::Vector2;

use crate::{Cuts, Point};

/// Transverse radius (cm) of a track with pt = 1 GeV in a 3.8 T field.
pub const PT_TO_RADIUS_CM: f32 = 87.78;

/// r-z alignment test.
///
/// The half-tangent of the angle the three points make in the r-z plane,
/// scaled by `pt_min`, must not exceed `theta_cut`. Triplets whose first and
/// last points coincide in r-z are rejected.
pub fn are_aligned_rz(p1: &Point, p2: &Point, p3: &Point, pt_min: f32, theta_cut: f32) -> bool {
    let (r1, r2, r3) = (p1.r(), p2.r(), p3.r());
    let (z1, z2, z3) = (p1.z, p2.z, p3.z);

    let distance_13_squared = (r1 - r3) * (r1 - r3) + (z1 - z3) * (z1 - z3);
    if distance_13_squared <= 0.0 {
        return false;
    }
    let tan_12_13_half = (z1 * (r2 - r3) + z2 * (r3 - r1) + z3 * (r1 - r2)).abs() / distance_13_squared;
    tan_12_13_half * pt_min <= theta_cut
}

/// Signed turning angle (radians) between the transverse chords p1→p2 and p2→p3.
pub fn turning_angle(p1: &Point, p2: &Point, p3: &Point) -> f32 {
    let a = p2.xy() - p1.xy();
    let b = p3.xy() - p2.xy();
    a.perp(&b).atan2(a.dot(&b))
}

/// Transverse-plane test: bounded turning angle, enough curvature radius for
/// `pt_min`, and a trajectory passing within the region radius of its origin.
pub fn have_similar_curvature(p1: &Point, p2: &Point, p3: &Point, cuts: &Cuts) -> bool {
    if turning_angle(p1, p2, p3).abs() > cuts.phi_cut {
        return false;
    }

    let a = p1.xy();
    let ab = p2.xy() - a;
    let ac = p3.xy() - a;
    let bc = p3.xy() - p2.xy();
    let cross = ab.perp(&ac);

    // R = |ab| |bc| |ac| / (2 |cross|) >= pt_min * PT_TO_RADIUS_CM, without dividing.
    let chord_product = ab.norm() * bc.norm() * ac.norm();
    if 2.0 * cross.abs() * cuts.pt_min * PT_TO_RADIUS_CM > chord_product {
        return false;
    }

    distance_to_circle(a, ab, ac, cross, Vector2::new(cuts.region_origin_x, cuts.region_origin_y))
        .is_some_and(|distance| distance <= cuts.region_origin_radius)
}

/// Distance from `origin` to the circle through `a`, `a + ab` and `a + ac`
/// (the line, when the three points are collinear).
///
/// The circle centre is `a + w / d` with `d = 2 cross`. Writing the distance
/// with `d` in the numerator keeps nearly straight tracks, whose centres are
/// far away, free of cancellation. `None` for coincident points.
fn distance_to_circle(
    a: Vector2<f32>,
    ab: Vector2<f32>,
    ac: Vector2<f32>,
    cross: f32,
    origin: Vector2<f32>,
) -> Option<f32> {
    let d = 2.0 * cross;
    let ab2 = ab.norm_squared();
    let ac2 = ac.norm_squared();
    let w = Vector2::new(ac.y * ab2 - ab.y * ac2, ab.x * ac2 - ac.x * ab2);
    let u = origin - a;
    let denominator = (u * d - w).norm() + w.norm();
    if denominator == 0.0 {
        return None;
    }
    Some((d * u.norm_squared() - 2.0 * u.dot(&w)).abs() / denominator)
}

/// Full plausibility test for a doublet pair: r-z alignment and transverse curvature.
pub fn is_compatible_triplet(p1: &Point, p2: &Point, p3: &Point, cuts: &Cuts) -> bool {
    are_aligned_rz(p1, p2, p3, cuts.pt_min, cuts.theta_cut) && have_similar_curvature(p1, p2, p3, cuts)
}

/// Transverse momentum (GeV) of the circle through three points, `f32::INFINITY`
/// for collinear points. Useful for diagnostics and tests.
pub fn triplet_pt(p1: &Point, p2: &Point, p3: &Point) -> f32 {
    let ab = p2.xy() - p1.xy();
    let ac = p3.xy() - p1.xy();
    let bc = p3.xy() - p2.xy();
    let cross = ab.perp(&ac).abs();
    if cross == 0.0 {
        return f32::INFINITY;
    }
    let radius = ab.norm() * bc.norm() * ac.norm() / (2.0 * cross);
    radius / PT_TO_RADIUS_CM
}
