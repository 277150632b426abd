//! Synthetic event generation shared by the integration tests.
//!
//! Tracks are helices from the beam line: in the transverse plane a circle of
//! radius `pt * 87.78 cm` through the origin, in r-z a straight line.

#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use rand_distr::{Distribution, Normal};
use tuplets::finder::geometry::PT_TO_RADIUS_CM;
use tuplets::{Cuts, DoubletLevel, Event, Layer, Point};

/// Transverse radii (cm) of the detector layers, innermost first.
pub const LAYER_RADII: [f32; 6] = [4.0, 7.0, 11.0, 16.0, 22.0, 29.0];

#[derive(Debug, Clone, Copy)]
pub struct Track {
    /// Transverse momentum in GeV; `f32::INFINITY` for a straight track.
    pub pt: f32,
    /// Charge sign, +1 or -1.
    pub charge: f32,
    /// Azimuth of the track direction at the origin.
    pub phi0: f32,
    /// dz/dr.
    pub cot_theta: f32,
}

impl Track {
    pub fn straight(phi0: f32, cot_theta: f32) -> Self {
        Self {
            pt: f32::INFINITY,
            charge: 1.0,
            phi0,
            cot_theta,
        }
    }

    /// Hit of this track on a layer of transverse radius `r`.
    pub fn hit(&self, r: f32) -> Point {
        let radius = self.pt * PT_TO_RADIUS_CM;
        let alpha = if radius.is_finite() {
            self.charge * (r / (2.0 * radius)).asin()
        } else {
            0.0
        };
        let phi = self.phi0 + alpha;
        Point::new(r * phi.cos(), r * phi.sin(), self.cot_theta * r)
    }
}

/// Cuts that accept any track above `pt_min` coming from within 0.5 cm of the origin.
pub fn standard_cuts(pt_min: f32) -> Cuts {
    Cuts {
        pt_min,
        region_origin_x: 0.0,
        region_origin_y: 0.0,
        region_origin_radius: 0.5,
        theta_cut: 0.002,
        phi_cut: 0.3,
    }
}

/// Event where layer `L` holds exactly the hits of `tracks` (hit `i` belongs to
/// track `i`) and the only doublets are the true track segments.
pub fn clean_event(tracks: &[Track], num_layers: usize, cuts: Cuts) -> Event {
    let layers: Vec<Layer> = LAYER_RADII[..num_layers]
        .iter()
        .map(|&r| Layer::from_points(&tracks.iter().map(|t| t.hit(r)).collect::<Vec<_>>()))
        .collect();
    let pairs: Vec<(u32, u32)> = (0..tracks.len() as u32).map(|i| (i, i)).collect();
    let levels = vec![DoubletLevel::from_pairs(&pairs); num_layers - 1];
    Event::new(cuts, layers, levels).expect("synthetic event is valid")
}

/// A noisy event: `num_tracks` random tracks with pt in `[1, 10]` GeV, smeared
/// by 10 µm, plus `noise_per_layer` random hits per layer. Doublets join every
/// pair of hits on adjacent layers within 0.15 rad in azimuth.
///
/// Returns the event and the true tuplet of each track.
pub fn random_event(
    seed: u64,
    num_tracks: usize,
    noise_per_layer: usize,
    num_layers: usize,
    cuts: Cuts,
) -> (Event, Vec<Vec<u32>>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let smear = Normal::new(0.0f32, 1.0e-3).unwrap();

    let tracks: Vec<Track> = (0..num_tracks)
        .map(|_| Track {
            pt: rng.random_range(1.0..10.0),
            charge: if rng.random_bool(0.5) { 1.0 } else { -1.0 },
            phi0: rng.random_range(-std::f32::consts::PI..std::f32::consts::PI),
            cot_theta: rng.random_range(-2.0..2.0),
        })
        .collect();

    let mut layers = Vec::with_capacity(num_layers);
    for &r in &LAYER_RADII[..num_layers] {
        let mut points: Vec<Point> = tracks
            .iter()
            .map(|t| {
                let p = t.hit(r);
                Point::new(p.x + smear.sample(&mut rng), p.y + smear.sample(&mut rng), p.z)
            })
            .collect();
        for _ in 0..noise_per_layer {
            let phi: f32 = rng.random_range(-std::f32::consts::PI..std::f32::consts::PI);
            let z: f32 = rng.random_range(-2.0 * r..2.0 * r);
            points.push(Point::new(r * phi.cos(), r * phi.sin(), z));
        }
        layers.push(Layer::from_points(&points));
    }

    let levels: Vec<DoubletLevel> = (0..num_layers - 1)
        .map(|level| {
            let mut doublets = DoubletLevel::default();
            for (i, inner) in layers[level].iter().enumerate() {
                for (j, outer) in layers[level + 1].iter().enumerate() {
                    if azimuth_gap(&inner, &outer) < 0.15 {
                        doublets.push(i as u32, j as u32);
                    }
                }
            }
            doublets
        })
        .collect();

    // Track hits come first on every layer, so track `i` is hit `i` everywhere.
    let truth = (0..num_tracks as u32).map(|i| vec![i; num_layers]).collect();
    let event = Event::new(cuts, layers, levels).expect("synthetic event is valid");
    (event, truth)
}

fn azimuth_gap(a: &Point, b: &Point) -> f32 {
    let d = (b.y.atan2(b.x) - a.y.atan2(a.x)).abs();
    d.min(std::f32::consts::TAU - d)
}

/// Check that a tuplet has one valid point id per layer.
pub fn assert_valid_tuplet(event: &Event, tuplet: &[u32]) {
    assert_eq!(tuplet.len(), event.num_layers());
    for (layer, &id) in tuplet.iter().enumerate() {
        assert!(
            event.layers[layer].contains(id),
            "point {id} not on layer {layer}"
        );
    }
    // Consecutive hits must be joined by a doublet of the matching level.
    for (level, pair) in tuplet.windows(2).enumerate() {
        assert!(
            event.levels[level].iter().any(|d| d.inner == pair[0] && d.outer == pair[1]),
            "no doublet ({}, {}) on level {level}",
            pair[0],
            pair[1]
        );
    }
}

/// Render an event in the text input format.
pub fn format_event(event: &Event) -> String {
    use std::fmt::Write;

    fn write_points(out: &mut String, layer: &Layer) {
        let _ = writeln!(out, "{}", layer.len());
        for p in layer.iter() {
            let _ = writeln!(out, "{} {} {}", p.x, p.y, p.z);
        }
    }

    let c = &event.cuts;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {} {} {} {} {}",
        c.pt_min, c.region_origin_x, c.region_origin_y, c.region_origin_radius, c.theta_cut, c.phi_cut
    );
    for (level, doublets) in event.levels.iter().enumerate() {
        let _ = writeln!(out, "{}", doublets.len());
        for d in doublets.iter() {
            let _ = writeln!(out, "{} {}", d.inner, d.outer);
        }
        write_points(&mut out, &event.layers[level]);
        write_points(&mut out, &event.layers[level + 1]);
    }
    out
}
