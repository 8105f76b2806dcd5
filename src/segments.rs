//! Splitting a tracklog into its climb and its descent.
//!
//! The climb runs from the last start-cylinder fix before the first
//! turnpoint fix up to that first turnpoint fix. The descent runs from the
//! last turnpoint fix to the first start-cylinder fix after it. The fixes
//! that touch the cylinders mark the boundaries and are not part of either
//! leg.

use std::ops::Range;

use serde::Serialize;
use tracing::debug;

use crate::error::{HafError, Result};
use crate::geofence::GeoFence;
use crate::track::Track;

/// Open index interval `(lower, upper)` over a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub lower: usize,
    pub upper: usize,
}

impl Segment {
    pub fn new(lower: usize, upper: usize) -> Segment {
        Segment { lower, upper }
    }

    pub fn contains(&self, index: usize) -> bool {
        index > self.lower && index < self.upper
    }

    pub fn indices(&self) -> Range<usize> {
        (self.lower + 1)..self.upper.max(self.lower + 1)
    }

    pub fn len(&self) -> usize {
        self.indices().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn first(&self) -> Option<usize> {
        self.indices().next()
    }

    pub fn last(&self) -> Option<usize> {
        self.indices().next_back()
    }
}

/// Why one of the two legs could not be bounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unbounded {
    NoTurnpointContact,
    NoStartContactBeforeTurnpoint,
    NoReturnToStart,
}

/// Per-point containment flags and the four resolved extremes.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub inside_start: Vec<bool>,
    pub inside_turnpoint: Vec<bool>,
    pub up_start: Option<usize>,
    pub up_end: Option<usize>,
    pub down_start: Option<usize>,
    pub down_end: Option<usize>,
}

impl Classification {
    /// Derives the bounds from precomputed flags, one per track point.
    pub fn from_flags(
        inside_start: Vec<bool>,
        inside_turnpoint: Vec<bool>,
    ) -> Result<Classification> {
        if inside_start.len() != inside_turnpoint.len() {
            return Err(HafError::InvalidInput(format!(
                "{} start flags against {} turnpoint flags",
                inside_start.len(),
                inside_turnpoint.len()
            )));
        }
        Ok(Classification::resolve(inside_start, inside_turnpoint))
    }

    fn resolve(inside_start: Vec<bool>, inside_turnpoint: Vec<bool>) -> Classification {
        let up_end = inside_turnpoint.iter().position(|&inside| inside);
        let up_start =
            up_end.and_then(|end| inside_start.iter().take(end).rposition(|&inside| inside));

        let down_start = inside_turnpoint.iter().rposition(|&inside| inside);
        let down_end = down_start.and_then(|start| {
            inside_start
                .iter()
                .enumerate()
                .skip(start + 1)
                .find(|&(_, &inside)| inside)
                .map(|(i, _)| i)
        });

        debug!(?up_start, ?up_end, ?down_start, ?down_end, "resolved segment bounds");

        Classification {
            inside_start,
            inside_turnpoint,
            up_start,
            up_end,
            down_start,
            down_end,
        }
    }

    pub fn start_contacts(&self) -> usize {
        self.inside_start.iter().filter(|&&inside| inside).count()
    }

    pub fn turnpoint_contacts(&self) -> usize {
        self.inside_turnpoint.iter().filter(|&&inside| inside).count()
    }

    pub fn segment_up(&self) -> std::result::Result<Segment, Unbounded> {
        let end = self.up_end.ok_or(Unbounded::NoTurnpointContact)?;
        let start = self.up_start.ok_or(Unbounded::NoStartContactBeforeTurnpoint)?;
        Ok(Segment::new(start, end))
    }

    pub fn segment_down(&self) -> std::result::Result<Segment, Unbounded> {
        let start = self.down_start.ok_or(Unbounded::NoTurnpointContact)?;
        let end = self.down_end.ok_or(Unbounded::NoReturnToStart)?;
        Ok(Segment::new(start, end))
    }
}

/// Tags every point against both fences and resolves the leg bounds.
pub fn classify(track: &Track, start: &GeoFence, turnpoint: &GeoFence) -> Classification {
    let inside_start = start.containment(track.points());
    let inside_turnpoint = turnpoint.containment(track.points());
    Classification::resolve(inside_start, inside_turnpoint)
}
