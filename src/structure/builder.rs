extern crate nalgebra as na;
type Matrix3 = na::Matrix3<f64>;
type Matrix3N = na::Matrix3xX<f64>;
type Vector3 = na::Vector3<f64>;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::geometry::outward_bisector;
use crate::spec::WidthSpec;
use crate::strong::Index;
use crate::structure::{AtomicStructure, BondGraph, Element, GeometryError, Site};

/// Bond lengths and vacuum padding for structure generation, in angstroms
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct BondParameters {
    /// Carbon-carbon bond length
    pub cc_bond: f64,
    /// Carbon-hydrogen bond length
    pub ch_bond: f64,
    /// Vacuum between periodic images of the ribbon
    pub vacuum_sep: f64,
}

impl Default for BondParameters {
    fn default() -> Self {
        BondParameters {
            cc_bond: Self::GRAPHITIC_CC_BOND,
            ch_bond: Self::CH_BOND,
            vacuum_sep: Self::VACUUM_SEP,
        }
    }
}

impl BondParameters {
    pub const GRAPHITIC_CC_BOND: f64 = 1.42045;
    pub const CH_BOND: f64 = 1.09047;
    pub const VACUUM_SEP: f64 = 15.0;

    /// Carbons closer than this multiple of the bond length are bonded
    const CUTOFF_FACTOR: f64 = 1.1;

    pub fn with_cc_bond(mut self, cc_bond: f64) -> Self {
        self.cc_bond = cc_bond;
        self
    }

    pub fn with_ch_bond(mut self, ch_bond: f64) -> Self {
        self.ch_bond = ch_bond;
        self
    }

    pub fn with_vacuum_sep(mut self, vacuum_sep: f64) -> Self {
        self.vacuum_sep = vacuum_sep;
        self
    }

    /// Check that all parameters are positive and finite
    pub fn check(&self) -> Result<(), GeometryError> {
        let parameters = [
            ("cc_bond", self.cc_bond),
            ("ch_bond", self.ch_bond),
            ("vacuum_sep", self.vacuum_sep),
        ];
        for (parameter, value) in parameters {
            if !(value.is_finite() && value > 0.0) {
                return Err(GeometryError::NonPositive {parameter, value});
            }
        }
        Ok(())
    }

    /// Column spacing along the periodic axis
    pub fn dx(&self) -> f64 {
        1.5 * self.cc_bond
    }

    /// Row spacing across the ribbon
    pub fn dy(&self) -> f64 {
        0.5 * f64::sqrt(3.0) * self.cc_bond
    }

    pub fn cc_cutoff(&self) -> f64 {
        Self::CUTOFF_FACTOR * self.cc_bond
    }
}

/// Carbon positions of a normalized profile
///
/// Each dimer row of a segment holds two carbons one bond length apart. The
/// constant offsets place the ribbon inside the vacuum padding.
fn carbon_positions(spec: &WidthSpec, parameters: &BondParameters) -> Matrix3N {
    let (dx, dy) = (parameters.dx(), parameters.dy());
    let cc = parameters.cc_bond;
    let (y0, z) = (parameters.vacuum_sep / 2.0, parameters.vacuum_sep / 2.0);

    let columns: Vec<Vector3> = spec.segments().iter()
        .enumerate()
        .flat_map(|(i, segment)| {
            let x = dx * i as f64 - cc / 2.0;
            segment.dimer_rows().flat_map(move |row| {
                let y = row as f64 * dy + y0;
                [Vector3::new(x, y, z), Vector3::new(x + cc, y, z)]
            })
        })
        .collect();

    Matrix3N::from_columns(&columns)
}

/// Orthogonal cell: periodic axis, ribbon span plus vacuum, vacuum
fn cell(spec: &WidthSpec, parameters: &BondParameters) -> Matrix3 {
    Matrix3::from_diagonal(&Vector3::new(
        parameters.dx() * spec.len() as f64,
        parameters.dy() * spec.height() as f64 + parameters.vacuum_sep,
        parameters.vacuum_sep,
    ))
}

/// Hydrogen positions saturating every carbon with two carbon neighbors
fn passivation(lattice: &Matrix3, carbons: &Matrix3N, parameters: &BondParameters) -> Result<Matrix3N, GeometryError> {
    let bonds = BondGraph::new(lattice, carbons, parameters.cc_cutoff())?;

    let mut hydrogens = Vec::new();
    for site in Site::range(carbons.ncols()) {
        if bonds.degree(site) != 2 {
            continue;
        }

        let vectors = bonds.bond_vectors(site, lattice, carbons);
        match outward_bisector(&vectors[0], &vectors[1]) {
            Some(direction) => {
                let carbon = carbons.column(site.as_usize()).clone_owned();
                hydrogens.push(carbon + parameters.ch_bond * direction);
            },
            None => warn!(site = site.as_usize(), "carbon with antiparallel bonds left unpassivated"),
        }
    }

    Ok(Matrix3N::from_columns(&hydrogens))
}

/// Build the hydrogen-passivated periodic structure of a ribbon profile
///
/// Carbons are listed column by column and bottom to top within a column,
/// followed by one hydrogen per two-coordinated carbon in carbon order.
///
/// ```
/// # use agnr::spec::WidthSpec;
/// # use agnr::structure::{to_structure, BondParameters, Element};
/// let spec = WidthSpec::validate([(0, 4), (1, 5)]).unwrap();
/// let structure = to_structure(&spec, &BondParameters::default()).unwrap();
/// assert_eq!(structure.count(Element::C), 8);
/// assert_eq!(structure.count(Element::H), 4);
/// ```
pub fn to_structure(spec: &WidthSpec, parameters: &BondParameters) -> Result<AtomicStructure, GeometryError> {
    parameters.check()?;

    let spec = spec.normalized();
    let lattice = cell(&spec, parameters);
    let carbons = carbon_positions(&spec, parameters);
    let hydrogens = passivation(&lattice, &carbons, parameters)?;

    let species: Vec<Element> = std::iter::repeat(Element::C).take(carbons.ncols())
        .chain(std::iter::repeat(Element::H).take(hydrogens.ncols()))
        .collect();
    let coordinates = Matrix3N::from_columns(
        &carbons.column_iter().chain(hydrogens.column_iter()).map(|c| c.clone_owned()).collect::<Vec<_>>()
    );

    debug!(
        %spec,
        carbons = carbons.ncols(),
        hydrogens = hydrogens.ncols(),
        "built ribbon structure"
    );

    Ok(AtomicStructure::new(lattice, species, coordinates))
}

impl WidthSpec {
    /// Build the hydrogen-passivated periodic structure of this profile
    pub fn to_structure(&self, parameters: &BondParameters) -> Result<AtomicStructure, GeometryError> {
        to_structure(self, parameters)
    }
}
