pub mod strong;
pub mod spec;
pub mod symmetry;
pub mod enumerate;
pub mod geometry;
pub mod structure;

pub use spec::{Segment, Step, ValidationError, WidthSpec};
pub use symmetry::{canonical_form, is_symmetric, CanonicalKey, Transform};
pub use enumerate::{all_possible_agnrs, Bounds, Enumeration, RangeError};
pub use structure::{to_structure, AtomicStructure, BondParameters, Element, GeometryError};
