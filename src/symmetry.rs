use itertools::iproduct;
use serde::{Deserialize, Serialize};

use crate::spec::{Segment, WidthSpec};

/// Element of the symmetry group of a periodic width profile
///
/// Applied to a normalized profile in the order complement, reversal,
/// rotation. Complement mirrors the profile across the ribbon's width axis,
/// reversal mirrors it through a plane perpendicular to the periodic axis and
/// rotation picks a different column as the origin of the unit cell.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Transform {
    pub complement: bool,
    pub reverse: bool,
    /// Number of columns the profile is rotated right by
    pub shift: usize,
}

impl Transform {
    pub fn identity() -> Transform {
        Transform {complement: false, reverse: false, shift: 0}
    }

    pub fn is_identity(&self) -> bool {
        !self.complement && !self.reverse && self.shift == 0
    }

    /// All group elements for a profile of `n` segments
    ///
    /// ```
    /// # use agnr::symmetry::Transform;
    /// assert_eq!(Transform::all(6).count(), 24);
    /// assert_eq!(Transform::all(6).next(), Some(Transform::identity()));
    /// ```
    pub fn all(n: usize) -> impl Iterator<Item = Transform> {
        iproduct!([false, true], [false, true], 0..n)
            .map(|(complement, reverse, shift)| Transform {complement, reverse, shift})
    }

    /// Apply the transform to a profile
    ///
    /// The result is normalized, since complement is taken with respect to the
    /// normalized height.
    pub fn apply(&self, spec: &WidthSpec) -> WidthSpec {
        let normalized = spec.normalized();
        let segments = self.apply_segments(normalized.segments(), normalized.height());
        WidthSpec::from_segments_unchecked(segments)
    }

    fn apply_segments(&self, segments: &[Segment], height: i32) -> Vec<Segment> {
        let mut image: Vec<Segment> = if self.complement {
            segments.iter().map(|s| s.complement(height)).collect()
        } else {
            segments.to_vec()
        };

        if self.reverse {
            image.reverse();
        }

        if !image.is_empty() {
            let shift = self.shift % image.len();
            image.rotate_right(shift);
        }

        image
    }
}

/// Canonical representative of a profile's symmetry class
///
/// The lexicographically smallest image of the normalized profile under all
/// group elements. Totally ordered and hashable, so it serves directly as a
/// deduplication key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CanonicalKey(Vec<Segment>);

impl CanonicalKey {
    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    /// Profile of the representative
    pub fn to_spec(&self) -> WidthSpec {
        WidthSpec::from_segments_unchecked(self.0.clone())
    }

    /// Compact base-36 name of the representative
    ///
    /// The first segment's bottom row is always zero and is omitted. Returns
    /// `None` if a row index does not fit into a single character.
    ///
    /// ```
    /// # use agnr::spec::WidthSpec;
    /// let spec = WidthSpec::validate([(1, 5), (0, 4)]).unwrap();
    /// assert_eq!(spec.canonical_form().name().as_deref(), Some("415"));
    /// ```
    pub fn name(&self) -> Option<String> {
        const CHAR_MAP: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
        let encode = |row: i32| -> Option<char> {
            let row = usize::try_from(row).ok()?;
            CHAR_MAP.get(row).map(|&c| c as char)
        };

        let (first, rest) = self.0.split_first()?;
        debug_assert_eq!(first.bottom, 0);

        let mut name = String::with_capacity(2 * self.0.len());
        name.push(encode(first.top)?);
        for segment in rest {
            name.push(encode(segment.bottom)?);
            name.push(encode(segment.top)?);
        }

        Some(name)
    }
}

/// Images of a profile under its symmetry group
pub struct Orbit {
    canonical: CanonicalKey,
    stabilizer: Vec<Transform>,
}

impl Orbit {
    /// Walk all images of a profile
    pub fn of(spec: &WidthSpec) -> Orbit {
        Self::of_normalized(spec.normalized().segments())
    }

    /// Walk all images of segments whose lowest bottom row is zero
    pub(crate) fn of_normalized(segments: &[Segment]) -> Orbit {
        let n = segments.len();
        let height = segments.iter().map(|s| s.top).max().unwrap_or(0);

        let mut image = segments.to_vec();
        let mut minimum = segments.to_vec();
        let mut stabilizer = Vec::new();

        // Images are produced in place in the order of Transform::all
        for complement in [false, true] {
            for reverse in [false, true] {
                for shift in 0..n {
                    let transform = Transform {complement, reverse, shift};
                    if !transform.is_identity() && image == segments {
                        stabilizer.push(transform);
                    }

                    if image < minimum {
                        minimum.copy_from_slice(&image);
                    }

                    image.rotate_right(1);
                }
                image.reverse();
            }
            for segment in image.iter_mut() {
                *segment = segment.complement(height);
            }
        }

        Orbit {canonical: CanonicalKey(minimum), stabilizer}
    }

    pub fn canonical(&self) -> &CanonicalKey {
        &self.canonical
    }

    pub fn into_canonical(self) -> CanonicalKey {
        self.canonical
    }

    /// Non-identity transforms mapping the profile onto itself
    pub fn stabilizer(&self) -> &[Transform] {
        &self.stabilizer
    }

    pub fn is_symmetric(&self) -> bool {
        !self.stabilizer.is_empty()
    }
}

/// Canonical representative of a profile's symmetry class
pub fn canonical_form(spec: &WidthSpec) -> CanonicalKey {
    Orbit::of(spec).into_canonical()
}

/// Whether any non-identity group element maps the profile onto itself
pub fn is_symmetric(spec: &WidthSpec) -> bool {
    Orbit::of(spec).is_symmetric()
}

impl WidthSpec {
    /// Canonical representative of this profile's symmetry class
    pub fn canonical_form(&self) -> CanonicalKey {
        canonical_form(self)
    }

    /// Whether any non-identity group element maps this profile onto itself
    pub fn is_symmetric(&self) -> bool {
        is_symmetric(self)
    }

    /// Non-identity group elements mapping this profile onto itself
    pub fn symmetries(&self) -> Vec<Transform> {
        Orbit::of(self).stabilizer
    }
}

#[cfg(test)]
mod tests {
    use rand::Rng;
    use crate::enumerate::random_uniform_spec;
    use crate::spec::WidthSpec;
    use crate::symmetry::*;

    fn asymmetric() -> WidthSpec {
        // Smallest uniform profile without any symmetry
        WidthSpec::validate([(0, 4), (1, 5), (2, 6), (3, 7), (4, 8), (3, 7), (2, 6), (3, 7), (2, 6), (1, 5)]).unwrap()
    }

    #[test]
    fn transform_basics() {
        let spec = WidthSpec::validate([(0, 4), (1, 5), (2, 6), (1, 5)]).unwrap();
        assert_eq!(Transform::identity().apply(&spec), spec);

        let rotated = Transform {complement: false, reverse: false, shift: 1}.apply(&spec);
        assert_eq!(rotated.pairs(), vec![(1, 5), (0, 4), (1, 5), (2, 6)]);

        let complemented = Transform {complement: true, reverse: false, shift: 0}.apply(&spec);
        assert_eq!(complemented.pairs(), vec![(2, 6), (1, 5), (0, 4), (1, 5)]);

        let reversed = Transform {complement: false, reverse: true, shift: 0}.apply(&spec);
        assert_eq!(reversed.pairs(), vec![(1, 5), (2, 6), (1, 5), (0, 4)]);
    }

    #[test]
    fn canonical_form_is_invariant() {
        let spec = asymmetric();
        let key = spec.canonical_form();

        for transform in Transform::all(spec.len()) {
            assert_eq!(transform.apply(&spec).canonical_form(), key);
        }

        // Idempotent
        assert_eq!(key.to_spec().canonical_form(), key);

        // Vertical position is irrelevant
        let lifted = WidthSpec::validate(spec.segments().iter().map(|s| s.translated(7))).unwrap();
        assert_eq!(lifted.canonical_form(), key);

        // Smallest of the orbit
        assert!(Transform::all(spec.len()).all(|t| key.segments() <= t.apply(&spec).segments()));
    }

    #[test]
    fn canonical_form_on_random_profiles() {
        let mut rng = rand::thread_rng();
        for _ in 0..50 {
            let length = rng.gen_range(1..=6);
            let width = rng.gen_range(1..=4);
            let spec = random_uniform_spec(length, width, &mut rng).unwrap();
            let key = spec.canonical_form();
            assert_eq!(key.to_spec().canonical_form(), key);

            let transforms: Vec<Transform> = Transform::all(spec.len()).collect();
            let transform = transforms[rng.gen_range(0..transforms.len())];
            assert_eq!(transform.apply(&spec).canonical_form(), key);
            assert_eq!(transform.apply(&spec).is_symmetric(), spec.is_symmetric());
        }
    }

    #[test]
    fn symmetric_profiles() {
        // Zigzag edge has translation, mirror and complement symmetries
        let zigzag = WidthSpec::validate([(0, 4), (1, 5)]).unwrap();
        assert!(zigzag.is_symmetric());
        let symmetries = zigzag.symmetries();
        assert_eq!(symmetries.len(), 3);
        assert!(symmetries.contains(&Transform {complement: true, reverse: false, shift: 1}));
        assert!(symmetries.iter().all(|t| !t.is_identity()));

        assert!(!asymmetric().is_symmetric());
        assert!(asymmetric().symmetries().is_empty());

        // Mirror plus complement with a rotation
        let spec = WidthSpec::validate([(0, 4), (1, 5), (2, 6), (3, 7), (2, 6), (1, 5)]).unwrap();
        assert!(spec.is_symmetric());
    }

    #[test]
    fn names() {
        let spec = WidthSpec::validate([(0, 4), (1, 5)]).unwrap();
        assert_eq!(spec.canonical_form().name().as_deref(), Some("415"));

        let wide = WidthSpec::validate([(0, 40), (1, 41)]).unwrap();
        assert_eq!(wide.canonical_form().name(), None);
    }
}
