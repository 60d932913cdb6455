use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors constructing a width profile
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// No segments were passed
    #[error("Width profile has no segments")]
    Empty,
    /// A segment's top row is not above its bottom row
    #[error("Segment {index} has top row {top} not above bottom row {bottom}")]
    InvertedSegment { index: usize, bottom: i32, top: i32 },
    /// A segment's width differs from the first segment's in a uniform profile
    #[error("Segment {index} has width {found}, but the profile width is {expected}")]
    NonUniformWidth { index: usize, expected: i32, found: i32 },
    /// Consecutive segments (cyclically) are not joined by a single-row step
    #[error("Segments {from} and {to} are not joined by a single-row step")]
    InvalidStep { from: usize, to: usize },
}

/// Transition between two consecutive segments
///
/// Both boundaries of a segment move by exactly one row between neighboring
/// columns of the honeycomb lattice, so there are four possible transitions.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Step {
    /// Bottom moves down, top moves up
    Widen,
    /// Bottom moves up, top moves down
    Narrow,
    /// Both boundaries move up
    Up,
    /// Both boundaries move down
    Down,
}

impl Step {
    /// All steps in the order they are tried during enumeration
    pub const ALL: [Step; 4] = [Step::Widen, Step::Narrow, Step::Up, Step::Down];

    /// Row offsets of the bottom and top boundaries
    pub fn offsets(self) -> (i32, i32) {
        match self {
            Step::Widen => (-1, 1),
            Step::Narrow => (1, -1),
            Step::Up => (1, 1),
            Step::Down => (-1, -1),
        }
    }

    /// Classify a pair of boundary offsets
    pub fn from_offsets(bottom: i32, top: i32) -> Option<Step> {
        Step::ALL.into_iter().find(|step| step.offsets() == (bottom, top))
    }

    /// Whether the step changes the segment width
    pub fn changes_width(self) -> bool {
        matches!(self, Step::Widen | Step::Narrow)
    }

    /// Step seen from across the ribbon's width axis
    pub fn complement(self) -> Step {
        match self {
            Step::Up => Step::Down,
            Step::Down => Step::Up,
            other => other,
        }
    }
}

/// Bottom and top row boundaries of the ribbon at one column
///
/// Ordering compares the bottom row first, then the top row.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "(i32, i32)", into = "(i32, i32)")]
pub struct Segment {
    pub bottom: i32,
    pub top: i32,
}

impl Segment {
    pub fn new(bottom: i32, top: i32) -> Segment {
        Segment {bottom, top}
    }

    /// Number of rows spanned
    pub fn width(&self) -> i32 {
        self.top - self.bottom
    }

    /// Segment reached from this one by a step
    pub fn step(&self, step: Step) -> Segment {
        let (bottom, top) = step.offsets();
        Segment::new(self.bottom + bottom, self.top + top)
    }

    /// Step leading from this segment to another, if any
    pub fn step_to(&self, next: &Segment) -> Option<Step> {
        Step::from_offsets(next.bottom - self.bottom, next.top - self.top)
    }

    /// Segment moved by a number of rows
    pub fn translated(&self, rows: i32) -> Segment {
        Segment::new(self.bottom + rows, self.top + rows)
    }

    /// Segment mirrored across the width axis of a profile of total height `height`
    pub fn complement(&self, height: i32) -> Segment {
        Segment::new(height - self.top, height - self.bottom)
    }

    /// Rows on which carbon dimers sit
    pub fn dimer_rows(&self) -> impl Iterator<Item = i32> {
        (self.bottom..self.top).step_by(2)
    }
}

impl From<(i32, i32)> for Segment {
    fn from((bottom, top): (i32, i32)) -> Segment {
        Segment::new(bottom, top)
    }
}

impl From<Segment> for (i32, i32) {
    fn from(segment: Segment) -> (i32, i32) {
        (segment.bottom, segment.top)
    }
}

/// Width profile of an armchair graphene nanoribbon
///
/// One segment per column along the periodic axis. Every boundary moves by
/// exactly one row between consecutive segments, including from the last
/// segment back to the first.
///
/// ```
/// # use agnr::spec::WidthSpec;
/// let spec = WidthSpec::validate([(0, 4), (1, 5)]).unwrap();
/// assert_eq!(spec.len(), 2);
/// assert_eq!(spec.width(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Vec<Segment>", into = "Vec<Segment>")]
pub struct WidthSpec {
    segments: Vec<Segment>,
}

impl WidthSpec {
    /// Validate a profile of constant width
    ///
    /// Pairs are `(bottom, top)` row indices. Consecutive segments must be
    /// shifted up or down by exactly one row.
    pub fn validate<P, I>(pairs: I) -> Result<WidthSpec, ValidationError>
    where P: Into<Segment>, I: IntoIterator<Item = P>
    {
        Self::check(pairs.into_iter().map_into().collect(), true)
    }

    /// Validate a profile whose width may change by two rows between columns
    pub fn validate_varying<P, I>(pairs: I) -> Result<WidthSpec, ValidationError>
    where P: Into<Segment>, I: IntoIterator<Item = P>
    {
        Self::check(pairs.into_iter().map_into().collect(), false)
    }

    fn check(segments: Vec<Segment>, uniform: bool) -> Result<WidthSpec, ValidationError> {
        let first = *segments.first().ok_or(ValidationError::Empty)?;

        for (index, segment) in segments.iter().enumerate() {
            if segment.top <= segment.bottom {
                return Err(ValidationError::InvertedSegment {
                    index,
                    bottom: segment.bottom,
                    top: segment.top
                });
            }

            if uniform && segment.width() != first.width() {
                return Err(ValidationError::NonUniformWidth {
                    index,
                    expected: first.width(),
                    found: segment.width()
                });
            }
        }

        let n = segments.len();
        for from in 0..n {
            let to = (from + 1) % n;
            if segments[from].step_to(&segments[to]).is_none() {
                return Err(ValidationError::InvalidStep {from, to});
            }
        }

        Ok(WidthSpec {segments})
    }

    /// Wrap segments known to form a closed profile
    pub(crate) fn from_segments_unchecked(segments: Vec<Segment>) -> WidthSpec {
        debug_assert!(Self::check(segments.clone(), false).is_ok());
        WidthSpec {segments}
    }

    /// Number of segments along the periodic axis
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Profile as `(bottom, top)` pairs
    pub fn pairs(&self) -> Vec<(i32, i32)> {
        self.segments.iter().copied().map_into().collect()
    }

    /// Largest segment width
    pub fn width(&self) -> i32 {
        self.segments.iter().map(Segment::width).max().unwrap_or(0)
    }

    /// Whether all segments have the same width
    pub fn is_uniform(&self) -> bool {
        self.segments.iter().map(Segment::width).all_equal()
    }

    /// Lowest bottom row
    pub fn floor(&self) -> i32 {
        self.segments.iter().map(|s| s.bottom).min().unwrap_or(0)
    }

    /// Number of rows between the lowest bottom and the highest top
    pub fn height(&self) -> i32 {
        let ceiling = self.segments.iter().map(|s| s.top).max().unwrap_or(0);
        ceiling - self.floor()
    }

    /// Cyclic step sequence, the last entry leading back to the first segment
    pub fn steps(&self) -> Vec<Step> {
        self.segments.iter()
            .circular_tuple_windows()
            .map(|(a, b)| a.step_to(b).expect("Validated profiles are closed"))
            .collect()
    }

    /// Profile moved so that its lowest bottom row is zero
    pub fn normalized(&self) -> WidthSpec {
        let floor = self.floor();
        WidthSpec {
            segments: self.segments.iter().map(|s| s.translated(-floor)).collect()
        }
    }

    /// Number of carbon dimers across all segments
    pub fn dimer_count(&self) -> usize {
        self.segments.iter().map(|s| s.dimer_rows().count()).sum()
    }
}

impl TryFrom<Vec<Segment>> for WidthSpec {
    type Error = ValidationError;

    fn try_from(segments: Vec<Segment>) -> Result<WidthSpec, ValidationError> {
        Self::check(segments, false)
    }
}

impl From<WidthSpec> for Vec<Segment> {
    fn from(spec: WidthSpec) -> Vec<Segment> {
        spec.segments
    }
}

impl std::fmt::Display for WidthSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let pairs = self.segments.iter().map(|s| format!("({}, {})", s.bottom, s.top));
        write!(f, "[{}]", pairs.format(", "))
    }
}

#[cfg(test)]
mod tests {
    use crate::spec::*;

    #[test]
    fn minimal_ribbon() {
        let spec = WidthSpec::validate([(0, 4), (1, 5)]).unwrap();
        assert_eq!(spec.len(), 2);
        assert_eq!(spec.width(), 4);
        assert_eq!(spec.height(), 5);
        assert_eq!(spec.steps(), vec![Step::Up, Step::Down]);
        assert_eq!(spec.dimer_count(), 4);
        assert_eq!(spec.to_string(), "[(0, 4), (1, 5)]");
    }

    #[test]
    fn rejects_malformed_profiles() {
        let empty: [(i32, i32); 0] = [];
        assert_eq!(WidthSpec::validate(empty), Err(ValidationError::Empty));
        assert_eq!(
            WidthSpec::validate([(0, 4), (5, 5)]),
            Err(ValidationError::InvertedSegment {index: 1, bottom: 5, top: 5})
        );
        assert_eq!(
            WidthSpec::validate([(0, 4), (1, 3)]),
            Err(ValidationError::NonUniformWidth {index: 1, expected: 4, found: 2})
        );
        assert_eq!(
            WidthSpec::validate([(0, 4), (2, 6)]),
            Err(ValidationError::InvalidStep {from: 0, to: 1})
        );
        // Single column cannot close onto itself
        assert_eq!(
            WidthSpec::validate([(0, 4)]),
            Err(ValidationError::InvalidStep {from: 0, to: 0})
        );
        // Odd number of uniform steps cannot sum to zero
        assert_eq!(
            WidthSpec::validate([(0, 4), (1, 5), (2, 6)]),
            Err(ValidationError::InvalidStep {from: 2, to: 0})
        );
    }

    #[test]
    fn varying_widths() {
        let pairs = [(1, 5), (0, 6), (1, 5), (2, 6)];
        assert!(matches!(
            WidthSpec::validate(pairs),
            Err(ValidationError::NonUniformWidth {index: 1, ..})
        ));

        let spec = WidthSpec::validate_varying(pairs).unwrap();
        assert!(!spec.is_uniform());
        assert_eq!(spec.width(), 6);
        assert_eq!(spec.steps(), vec![Step::Widen, Step::Narrow, Step::Up, Step::Down]);
        assert_eq!(spec.normalized().pairs(), vec![(1, 5), (0, 6), (1, 5), (2, 6)]);
    }

    #[test]
    fn uniform_profiles_close() {
        let spec = WidthSpec::validate([(3, 7), (4, 8), (5, 9), (4, 8), (3, 7), (2, 6)]).unwrap();
        assert!(spec.is_uniform());
        assert!(spec.segments().iter().all(|s| s.width() == 4));

        let (bottom, top) = spec.steps().iter()
            .map(|s| s.offsets())
            .fold((0, 0), |(b, t), (db, dt)| (b + db, t + dt));
        assert_eq!((bottom, top), (0, 0));

        let normalized = spec.normalized();
        assert_eq!(normalized.floor(), 0);
        assert_eq!(normalized.steps(), spec.steps());
    }

    #[test]
    fn step_classification() {
        for step in Step::ALL {
            let segment = Segment::new(2, 6);
            assert_eq!(segment.step_to(&segment.step(step)), Some(step));
            assert_eq!(step.changes_width(), segment.step(step).width() != 4);
        }
        assert_eq!(Segment::new(0, 4).step_to(&Segment::new(0, 4)), None);
        assert_eq!(Step::Up.complement(), Step::Down);
        assert_eq!(Step::Widen.complement(), Step::Widen);
    }

    #[test]
    fn serde_pairs() {
        let spec = WidthSpec::validate([(0, 4), (1, 5)]).unwrap();
        let json = serde_json::to_string(&spec).unwrap();
        assert_eq!(json, "[[0,4],[1,5]]");
        assert_eq!(serde_json::from_str::<WidthSpec>(&json).unwrap(), spec);
        assert!(serde_json::from_str::<WidthSpec>("[[0,4],[3,7]]").is_err());
    }
}
