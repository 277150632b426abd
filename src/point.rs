use rkyv::{Archive, Deserialize, Serialize};

use crate::Vector3;

/// A single detector hit. Coordinates are in centimetres, with the beam
/// line along +Z. A point is identified by its index within its layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Transverse distance from the beam line.
    #[inline]
    pub fn r(&self) -> f32 {
        self.x.hypot(self.y)
    }

    /// Position as a 3-vector.
    pub fn position(&self) -> Vector3 {
        Vector3::new(self.x, self.y, self.z)
    }

    /// Transverse (x, y) projection.
    #[inline]
    pub fn xy(&self) -> nalgebra::Vector2<f32> {
        nalgebra::Vector2::new(self.x, self.y)
    }
}

/// All hits of one detector layer, stored as three parallel coordinate arrays.
///
/// Layers are populated once while loading an event and are read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Archive, Serialize, Deserialize)]
pub struct Layer {
    pub x: Vec<f32>,
    pub y: Vec<f32>,
    pub z: Vec<f32>,
}

impl Layer {
    /// Empty layer with room for `n` points.
    pub fn with_capacity(n: usize) -> Self {
        Self {
            x: Vec::with_capacity(n),
            y: Vec::with_capacity(n),
            z: Vec::with_capacity(n),
        }
    }

    /// Build a layer from a slice of points.
    pub fn from_points(points: &[Point]) -> Self {
        let mut layer = Self::with_capacity(points.len());
        for p in points {
            layer.push(*p);
        }
        layer
    }

    pub fn push(&mut self, p: Point) {
        self.x.push(p.x);
        self.y.push(p.y);
        self.z.push(p.z);
    }

    /// Number of points in the layer.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Point `id` of this layer. Panics if `id` is out of range.
    #[inline]
    pub fn point(&self, id: u32) -> Point {
        let i = id as usize;
        Point {
            x: self.x[i],
            y: self.y[i],
            z: self.z[i],
        }
    }

    /// Whether `id` refers to a point of this layer.
    #[inline]
    pub fn contains(&self, id: u32) -> bool {
        (id as usize) < self.len()
    }

    /// Iterate over all points in index order.
    pub fn iter(&self) -> impl Iterator<Item = Point> + '_ {
        (0..self.len()).map(move |i| self.point(i as u32))
    }
}
