//! Doublets: candidate track segments linking a hit on layer L to a hit on layer L+1.
//!
//! Each inter-layer gap ("level") stores its doublets as two parallel id arrays.
//! The arrays are only ever extended together, so they always have equal length.

use rkyv::{Archive, Deserialize, Serialize};

/// A directed segment from point `inner` on layer L to point `outer` on layer L+1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Doublet {
    pub inner: u32,
    pub outer: u32,
}

/// All doublets of one level, as parallel `(inner, outer)` point-id arrays.
#[derive(Debug, Clone, Default, PartialEq, Archive, Serialize, Deserialize)]
pub struct DoubletLevel {
    inner: Vec<u32>,
    outer: Vec<u32>,
}

impl DoubletLevel {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            inner: Vec::with_capacity(n),
            outer: Vec::with_capacity(n),
        }
    }

    /// Build a level from `(inner, outer)` pairs.
    pub fn from_pairs(pairs: &[(u32, u32)]) -> Self {
        let mut level = Self::with_capacity(pairs.len());
        for &(inner, outer) in pairs {
            level.push(inner, outer);
        }
        level
    }

    pub fn push(&mut self, inner: u32, outer: u32) {
        self.inner.push(inner);
        self.outer.push(outer);
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Inner point id of doublet `i`.
    #[inline]
    pub fn inner(&self, i: usize) -> u32 {
        self.inner[i]
    }

    /// Outer point id of doublet `i`.
    #[inline]
    pub fn outer(&self, i: usize) -> u32 {
        self.outer[i]
    }

    #[inline]
    pub fn get(&self, i: usize) -> Doublet {
        Doublet {
            inner: self.inner[i],
            outer: self.outer[i],
        }
    }

    pub fn inner_ids(&self) -> &[u32] {
        &self.inner
    }

    pub fn outer_ids(&self) -> &[u32] {
        &self.outer
    }

    pub fn iter(&self) -> impl Iterator<Item = Doublet> + '_ {
        (0..self.len()).map(move |i| self.get(i))
    }
}
