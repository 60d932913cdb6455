extern crate nalgebra as na;
type Matrix3 = na::Matrix3<f64>;
type Matrix3N = na::Matrix3xX<f64>;

use derive_more::{From, Into};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::strong::{Index, IndexBase};

/// Errors building or querying a periodic structure
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// A physical parameter is zero, negative or not finite
    #[error("Parameter {parameter} must be positive, got {value}")]
    NonPositive { parameter: &'static str, value: f64 },
    /// The lattice vectors do not span space
    #[error("Lattice vectors are linearly dependent")]
    SingularLattice,
}

/// Chemical elements occurring in passivated ribbons
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Element {
    C,
    H,
}

impl Element {
    pub fn symbol(&self) -> &'static str {
        match self {
            Element::C => "C",
            Element::H => "H",
        }
    }
}

impl std::fmt::Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Index of an atom within a structure
#[derive(IndexBase, From, Into, Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Site(usize);

/// Periodic atomic structure in cartesian coordinates
///
/// Rows of the lattice matrix are the lattice vectors. Species and coordinate
/// columns are indexed by [`Site`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtomicStructure {
    lattice: Matrix3,
    species: Vec<Element>,
    coordinates: Matrix3N,
}

impl AtomicStructure {
    pub(crate) fn new(lattice: Matrix3, species: Vec<Element>, coordinates: Matrix3N) -> AtomicStructure {
        debug_assert_eq!(species.len(), coordinates.ncols());
        AtomicStructure {lattice, species, coordinates}
    }

    /// Lattice vectors as matrix rows
    pub fn lattice(&self) -> &Matrix3 {
        &self.lattice
    }

    pub fn species(&self) -> &[Element] {
        &self.species
    }

    /// Element symbols parallel to the coordinates
    pub fn symbols(&self) -> Vec<&'static str> {
        self.species.iter().map(Element::symbol).collect()
    }

    /// Cartesian coordinates, one column per site
    pub fn coordinates(&self) -> &Matrix3N {
        &self.coordinates
    }

    /// Element at a site, `None` if out of range
    pub fn element(&self, site: Site) -> Option<Element> {
        site.of(&self.species).copied()
    }

    /// Number of sites
    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    /// Number of sites of an element
    pub fn count(&self, element: Element) -> usize {
        self.species.iter().filter(|&&e| e == element).count()
    }

    /// Lengths of the three lattice vectors
    pub fn lattice_lengths(&self) -> [f64; 3] {
        [0, 1, 2].map(|i| self.lattice.row(i).norm())
    }

    /// Position of a site
    pub fn position(&self, site: Site) -> na::VectorView3<f64> {
        self.coordinates.column(site.as_usize())
    }

    /// Iterate over sites with their elements and positions
    pub fn sites(&self) -> impl Iterator<Item = (Site, Element, na::VectorView3<f64>)> + '_ {
        Site::range(self.len()).map(move |site| (site, self.species[site.get()], self.position(site)))
    }

    /// Coordinates in units of the lattice vectors
    pub fn fractional_coordinates(&self) -> Result<Matrix3N, GeometryError> {
        let inverse = self.lattice.transpose()
            .try_inverse()
            .ok_or(GeometryError::SingularLattice)?;
        Ok(inverse * &self.coordinates)
    }

    /// Carbon and hydrogen bond network within a distance cutoff
    pub fn bond_graph(&self, cutoff: f64) -> Result<BondGraph, GeometryError> {
        BondGraph::new(&self.lattice, &self.coordinates, cutoff)
    }
}

pub mod bonds;
pub mod builder;

pub use bonds::{BondGraph, Image};
pub use builder::{BondParameters, to_structure};
