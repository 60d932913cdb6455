use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};

use crate::spec::{Segment, Step, WidthSpec};
use crate::symmetry::{CanonicalKey, Orbit};

/// Errors in enumeration bounds
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RangeError {
    /// A lower bound is zero
    #[error("Bound {bound} must be at least one")]
    ZeroBound { bound: &'static str },
    /// Minimum length exceeds maximum length
    #[error("Minimum length {min} exceeds maximum length {max}")]
    InvertedLength { min: usize, max: usize },
    /// Minimum width exceeds maximum width
    #[error("Minimum width {min} exceeds maximum width {max}")]
    InvertedWidth { min: usize, max: usize },
    /// Bound too large to address rows
    #[error("Bound {bound} of {value} is too large")]
    Overflow { bound: &'static str, value: usize },
}

/// Length and width bounds for ribbon enumeration
///
/// Lengths count hexagonal unit cells along the periodic axis, each made of
/// two segments. Widths count carbon dimer lines across the ribbon, each
/// taking up two rows.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bounds {
    pub min_len: usize,
    pub max_len: usize,
    pub min_width: usize,
    pub max_width: usize,
    /// Only keep profiles with a non-trivial symmetry
    pub symmetric_only: bool,
}

impl Bounds {
    pub fn new(min_len: usize, max_len: usize, min_width: usize, max_width: usize) -> Bounds {
        Bounds {min_len, max_len, min_width, max_width, symmetric_only: false}
    }

    pub fn symmetric_only(mut self, symmetric_only: bool) -> Bounds {
        self.symmetric_only = symmetric_only;
        self
    }

    /// Check bounds for consistency
    pub fn check(&self) -> Result<(), RangeError> {
        for (bound, value) in [("min_len", self.min_len), ("min_width", self.min_width)] {
            if value == 0 {
                return Err(RangeError::ZeroBound {bound});
            }
        }

        if self.min_len > self.max_len {
            return Err(RangeError::InvertedLength {min: self.min_len, max: self.max_len});
        }

        if self.min_width > self.max_width {
            return Err(RangeError::InvertedWidth {min: self.min_width, max: self.max_width});
        }

        rows("max_width", self.max_width)?;
        rows("max_len", self.max_len)?;

        Ok(())
    }

    /// Lazily enumerate all distinct profiles within these bounds
    pub fn enumerate(self) -> Result<Enumeration, RangeError> {
        Enumeration::new(self)
    }
}

/// Twice a bound, as a row count
fn rows(bound: &'static str, value: usize) -> Result<i32, RangeError> {
    value.checked_mul(2)
        .and_then(|v| i32::try_from(v).ok())
        .ok_or(RangeError::Overflow {bound, value})
}

/// Enumerate all structurally distinct ribbon profiles within bounds
///
/// Profiles are produced lazily, ordered by length, then by the width of
/// their first segment, then by walk order. Of each symmetry class only the
/// first profile reached is produced. Calling again restarts the enumeration.
///
/// ```
/// # use agnr::enumerate::all_possible_agnrs;
/// let specs: Vec<_> = all_possible_agnrs(2, 2, 2, 2, true).unwrap().collect();
/// assert_eq!(specs.len(), 2);
/// ```
pub fn all_possible_agnrs(
    min_len: usize,
    max_len: usize,
    min_width: usize,
    max_width: usize,
    symmetric_only: bool,
) -> Result<Enumeration, RangeError> {
    Bounds::new(min_len, max_len, min_width, max_width)
        .symmetric_only(symmetric_only)
        .enumerate()
}

struct Frame {
    next_step: usize
}

/// Lazy depth-first walk over ribbon profiles
///
/// Each walk starts from a segment of the current width with its bottom at row
/// zero and appends steps until the target number of segments is reached.
/// Closed walks are deduplicated on their canonical form.
pub struct Enumeration {
    bounds: Bounds,
    min_rows: i32,
    max_rows: i32,
    length: usize,
    width: usize,
    path: Vec<Segment>,
    stack: Vec<Frame>,
    seen: HashSet<CanonicalKey>,
    produced: usize,
}

impl Enumeration {
    fn new(bounds: Bounds) -> Result<Enumeration, RangeError> {
        bounds.check()?;
        let min_rows = rows("min_width", bounds.min_width)?;
        let max_rows = rows("max_width", bounds.max_width)?;

        Ok(Enumeration {
            bounds,
            min_rows,
            max_rows,
            length: bounds.min_len,
            width: bounds.min_width,
            path: Vec::new(),
            stack: Vec::new(),
            seen: HashSet::new(),
            produced: 0,
        })
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    fn target_len(&self) -> usize {
        2 * self.length
    }

    fn admissible(&self, segment: &Segment) -> bool {
        segment.bottom >= 0 && (self.min_rows..=self.max_rows).contains(&segment.width())
    }

    /// Whether the walk repeats a shorter profile that is itself within bounds
    fn repeats_shorter(&self) -> bool {
        (self.bounds.min_len..self.length)
            .filter(|section| self.length % section == 0)
            .any(|section| {
                let period = 2 * section;
                self.path.chunks(period).all(|chunk| chunk == &self.path[..period])
            })
    }

    /// Check a walk of the target length, registering its symmetry class
    fn accept(&mut self) -> bool {
        let (first, last) = match (self.path.first(), self.path.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return false,
        };

        if last.step_to(first).is_none() || self.repeats_shorter() {
            return false;
        }

        let orbit = Orbit::of_normalized(&self.path);
        if self.bounds.symmetric_only && !orbit.is_symmetric() {
            return false;
        }

        self.seen.insert(orbit.into_canonical())
    }

    /// Move on to the next starting width, or the next length
    fn finish_walk(&mut self) {
        debug!(
            length = self.length,
            width = self.width,
            classes = self.seen.len(),
            "finished ribbon walk"
        );

        self.width += 1;
        if self.width > self.bounds.max_width {
            self.width = self.bounds.min_width;
            self.length += 1;
            self.seen.clear();
        }
    }
}

impl Iterator for Enumeration {
    type Item = WidthSpec;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.path.is_empty() {
                if self.length > self.bounds.max_len {
                    return None;
                }

                let rows = 2 * self.width as i32;
                self.path.push(Segment::new(0, rows));
                self.stack.push(Frame {next_step: 0});
            }

            if self.path.len() == self.target_len() {
                let accepted = self.accept();
                let spec = accepted.then(|| WidthSpec::from_segments_unchecked(self.path.clone()));

                self.path.pop();
                self.stack.pop();
                if self.path.is_empty() {
                    self.finish_walk();
                }

                if let Some(spec) = spec {
                    self.produced += 1;
                    trace!(%spec, produced = self.produced, "found ribbon");
                    return Some(spec);
                }
                continue;
            }

            let last = *self.path.last().expect("Walk is not empty");
            let frame = self.stack.last_mut().expect("Frames match walk");
            match Step::ALL.get(frame.next_step) {
                Some(&step) => {
                    frame.next_step += 1;
                    let next = last.step(step);
                    if self.admissible(&next) {
                        self.path.push(next);
                        self.stack.push(Frame {next_step: 0});
                    }
                }
                None => {
                    self.path.pop();
                    self.stack.pop();
                    if self.path.is_empty() {
                        self.finish_walk();
                    }
                }
            }
        }
    }
}

/// Draw a random profile of constant width
///
/// `length` counts unit cells and `width` dimer lines, as in [`Bounds`]. The
/// profile shifts up and down equally often, in random order.
pub fn random_uniform_spec<R: Rng + ?Sized>(length: usize, width: usize, rng: &mut R) -> Result<WidthSpec, RangeError> {
    Bounds::new(length, length, width, width).check()?;
    let rows = rows("width", width)?;

    let mut steps: Vec<Step> = std::iter::repeat(Step::Up).take(length)
        .chain(std::iter::repeat(Step::Down).take(length))
        .collect();
    steps.shuffle(rng);

    let mut segments = Vec::with_capacity(2 * length);
    segments.push(Segment::new(0, rows));
    for &step in &steps[..steps.len() - 1] {
        let last = segments[segments.len() - 1];
        segments.push(last.step(step));
    }

    Ok(WidthSpec::from_segments_unchecked(segments).normalized())
}
