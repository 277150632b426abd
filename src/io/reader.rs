//! Text input reader.
//!
//! An input batch is a single stream of whitespace-separated tokens:
//!
//! ```text
//! ptMin regionOriginX regionOriginY regionOriginRadius thetaCut phiCut
//! for each of (numLayers - 1) levels:
//!   doubletCount
//!   doubletCount × (innerPointId outerPointId)
//!   twice: pointCount ; pointCount × (x y z)
//! ```
//!
//! The first point block of level L holds the points of layer L. The second
//! block of the last level holds the points of the last layer; on every other
//! level the second block repeats the next level's first block and is skipped.

use std::path::Path;

use tracing::{info, warn};

use crate::error::InputError;
use crate::{Cuts, DoubletLevel, Event, Layer, Point};

/// Counts come from the file, so never reserve more than this up front.
const MAX_PREALLOCATED: usize = 4096;

/// Cursor over the whitespace-separated tokens of an input batch.
struct Tokens<'a> {
    iter: std::str::SplitWhitespace<'a>,
    position: usize,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            iter: text.split_whitespace(),
            position: 0,
        }
    }

    fn next_token(&mut self, expected: &str) -> Result<&'a str, InputError> {
        let token = self.iter.next().ok_or_else(|| InputError::UnexpectedEnd {
            expected: expected.to_string(),
            position: self.position,
        })?;
        self.position += 1;
        Ok(token)
    }

    fn parse<T: std::str::FromStr>(&mut self, expected: &str) -> Result<T, InputError> {
        let position = self.position;
        let token = self.next_token(expected)?;
        token.parse().map_err(|_| InputError::InvalidToken {
            token: token.to_string(),
            expected: expected.to_string(),
            position,
        })
    }

    fn remaining(&mut self) -> usize {
        self.iter.by_ref().count()
    }
}

fn read_cuts(tokens: &mut Tokens<'_>) -> Result<Cuts, InputError> {
    Ok(Cuts {
        pt_min: tokens.parse("ptMin")?,
        region_origin_x: tokens.parse("regionOriginX")?,
        region_origin_y: tokens.parse("regionOriginY")?,
        region_origin_radius: tokens.parse("regionOriginRadius")?,
        theta_cut: tokens.parse("thetaCut")?,
        phi_cut: tokens.parse("phiCut")?,
    })
}

fn read_doublets(tokens: &mut Tokens<'_>, level: usize) -> Result<DoubletLevel, InputError> {
    let count: usize = tokens.parse(&format!("doublet count of level {level}"))?;
    let mut doublets = DoubletLevel::with_capacity(count.min(MAX_PREALLOCATED));
    for _ in 0..count {
        let inner = tokens.parse("inner point id")?;
        let outer = tokens.parse("outer point id")?;
        doublets.push(inner, outer);
    }
    Ok(doublets)
}

fn read_points(tokens: &mut Tokens<'_>, level: usize) -> Result<Layer, InputError> {
    let count: usize = tokens.parse(&format!("point count of level {level}"))?;
    let mut layer = Layer::with_capacity(count.min(MAX_PREALLOCATED));
    for _ in 0..count {
        let x = tokens.parse("point x")?;
        let y = tokens.parse("point y")?;
        let z = tokens.parse("point z")?;
        layer.push(Point::new(x, y, z));
    }
    Ok(layer)
}

/// Parse one input batch for a detector with `num_layers` layers.
///
/// Fails on the first missing or unparsable token, and on doublets that
/// reference points outside their layers.
pub fn parse_event(text: &str, num_layers: usize) -> Result<Event, InputError> {
    let num_levels = num_layers.saturating_sub(1);
    let mut tokens = Tokens::new(text);
    let cuts = read_cuts(&mut tokens)?;

    let mut levels = Vec::with_capacity(num_levels);
    let mut layers = Vec::with_capacity(num_layers);
    let mut repeated_count = None;
    for level in 0..num_levels {
        levels.push(read_doublets(&mut tokens, level)?);

        let inner = read_points(&mut tokens, level)?;
        if let Some(expected) = repeated_count {
            if expected != inner.len() {
                warn!(
                    "Layer {} has {} points but the previous level listed {}",
                    level,
                    inner.len(),
                    expected
                );
            }
        }
        layers.push(inner);

        let outer = read_points(&mut tokens, level)?;
        if level + 1 == num_levels {
            layers.push(outer);
        } else {
            repeated_count = Some(outer.len());
        }
    }

    let trailing = tokens.remaining();
    if trailing > 0 {
        warn!("Ignoring {} trailing tokens after the last level", trailing);
    }

    Event::new(cuts, layers, levels)
}

/// Read and parse an input batch from a text file.
pub fn load_event_from_file<P: AsRef<Path>>(path: P, num_layers: usize) -> anyhow::Result<Event> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let event = parse_event(&text, num_layers)?;
    info!(
        "Loaded {}: {} layers, {} points, {} doublets",
        path.display(),
        event.num_layers(),
        event.num_points(),
        event.num_doublets()
    );
    Ok(event)
}
