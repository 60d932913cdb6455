extern crate nalgebra as na;
type Matrix3 = na::Matrix3<f64>;
type Matrix3N = na::Matrix3xX<f64>;
type Vector3 = na::Vector3<f64>;

use itertools::{iproduct, Itertools};
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};

use crate::geometry::{lattice_vector, plane_spacing};
use crate::strong::Index;
use crate::structure::{GeometryError, Site};

/// Periodic image offset in units of the lattice vectors
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Image(pub [i32; 3]);

impl Image {
    pub fn negated(&self) -> Image {
        Image(self.0.map(|v| -v))
    }

    pub fn is_origin(&self) -> bool {
        self.0 == [0, 0, 0]
    }

    /// Whether the first nonzero component is positive
    pub fn is_positive(&self) -> bool {
        self.0.iter().find(|&&v| v != 0).map_or(false, |&v| v > 0)
    }

    /// Cartesian translation of the image
    pub fn translation(&self, lattice: &Matrix3) -> Vector3 {
        (0..3).map(|axis| self.0[axis] as f64 * lattice_vector(lattice, axis)).sum()
    }
}

/// Bond network of a periodic structure
///
/// Nodes are sites, edges carry the image of the edge target relative to the
/// edge source. Bonds across the periodic boundary connect sites of the unit
/// cell with a nonzero image.
pub struct BondGraph {
    graph: UnGraph<Site, Image>,
}

impl BondGraph {
    /// Find all pairs of sites closer than a cutoff, including across periodic boundaries
    ///
    /// Each bond is stored once: within the unit cell for `i < j`, otherwise
    /// towards the lexicographically positive one of the two mirror images.
    pub fn new(lattice: &Matrix3, coordinates: &Matrix3N, cutoff: f64) -> Result<BondGraph, GeometryError> {
        if !(cutoff.is_finite() && cutoff > 0.0) {
            return Err(GeometryError::NonPositive {parameter: "cutoff", value: cutoff});
        }

        let n = coordinates.ncols();
        let mut graph = UnGraph::with_capacity(n, 3 * n / 2);
        for site in Site::range(n) {
            graph.add_node(site);
        }
        if n == 0 {
            return Ok(BondGraph {graph});
        }

        // Sites may lie outside the cell, so the image range grows with their
        // fractional extent along each axis
        let fractional = lattice.transpose()
            .try_inverse()
            .ok_or(GeometryError::SingularLattice)?
            * coordinates;
        let mut counts = [0; 3];
        for (axis, count) in counts.iter_mut().enumerate() {
            let spacing = plane_spacing(lattice, axis).ok_or(GeometryError::SingularLattice)?;
            let extent = fractional.row(axis).max() - fractional.row(axis).min();
            *count = f64::ceil(cutoff / spacing + extent) as i32;
        }

        let cutoff_squared = cutoff * cutoff;
        let images = iproduct!(-counts[0]..=counts[0], -counts[1]..=counts[1], -counts[2]..=counts[2])
            .map(|(a, b, c)| Image([a, b, c]))
            .filter(|image| image.is_origin() || image.is_positive());
        for image in images {
            let offset = image.translation(lattice);

            for (i, from) in coordinates.column_iter().enumerate() {
                for (j, to) in coordinates.column_iter().enumerate() {
                    if image.is_origin() && i >= j {
                        continue;
                    }

                    if (to + offset - from).norm_squared() <= cutoff_squared {
                        graph.add_edge(NodeIndex::new(i), NodeIndex::new(j), image);
                    }
                }
            }
        }

        Ok(BondGraph {graph})
    }

    /// Number of sites
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Number of bonds
    pub fn bond_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Number of bonds of a site
    pub fn degree(&self, site: Site) -> usize {
        self.graph.edges(NodeIndex::new(site.as_usize())).count()
    }

    /// Bonded sites with their image relative to `site`
    pub fn neighbors(&self, site: Site) -> impl Iterator<Item = (Site, Image)> + '_ {
        let node = NodeIndex::new(site.as_usize());
        self.graph.edges(node).filter_map(move |edge| {
            // Stored endpoint order, which fixes the direction of the image
            let (source, target) = self.graph.edge_endpoints(edge.id())?;
            if source == node {
                Some((self.graph[target], *edge.weight()))
            } else {
                Some((self.graph[source], edge.weight().negated()))
            }
        })
    }

    /// Cartesian vectors from a site to each of its bonded neighbors
    pub fn bond_vectors(&self, site: Site, lattice: &Matrix3, coordinates: &Matrix3N) -> Vec<Vector3> {
        let origin = coordinates.column(site.as_usize());
        self.neighbors(site)
            .map(|(neighbor, image)| coordinates.column(neighbor.as_usize()) + image.translation(lattice) - origin)
            .collect_vec()
    }
}

#[cfg(test)]
mod tests {
    use crate::structure::bonds::*;

    #[test]
    fn periodic_chain() {
        // Two atoms per cell in a chain along x, spaced evenly
        let lattice = Matrix3::from_diagonal(&Vector3::new(2.0, 10.0, 10.0));
        let coordinates = Matrix3N::from_columns(&[
            Vector3::new(0.5, 5.0, 5.0),
            Vector3::new(1.5, 5.0, 5.0),
        ]);
        let graph = BondGraph::new(&lattice, &coordinates, 1.1).unwrap();

        assert_eq!(graph.len(), 2);
        assert_eq!(graph.bond_count(), 2);
        for site in Site::range(2) {
            assert_eq!(graph.degree(site), 2);
            let mut vectors: Vec<f64> = graph.bond_vectors(site, &lattice, &coordinates)
                .iter()
                .map(|v| v.x)
                .collect();
            vectors.sort_by(|a, b| a.partial_cmp(b).unwrap());
            approx::assert_relative_eq!(vectors[0], -1.0, epsilon = 1e-12);
            approx::assert_relative_eq!(vectors[1], 1.0, epsilon = 1e-12);
        }

        let crossing: Vec<(Site, Image)> = graph.neighbors(Site::from(1))
            .filter(|(_, image)| !image.is_origin())
            .collect();
        assert_eq!(crossing, vec![(Site::from(0), Image([1, 0, 0]))]);
    }

    #[test]
    fn corner_crossing_bond() {
        // The sites are close only through the image one cell left and one cell up
        let lattice = Matrix3::from_diagonal(&Vector3::new(2.0, 2.0, 10.0));
        let coordinates = Matrix3N::from_columns(&[
            Vector3::new(0.1, 1.9, 5.0),
            Vector3::new(1.9, 0.1, 5.0),
        ]);
        let graph = BondGraph::new(&lattice, &coordinates, 0.5).unwrap();

        assert_eq!(graph.bond_count(), 1);
        assert_eq!(graph.degree(Site::from(0)), 1);
        assert_eq!(graph.degree(Site::from(1)), 1);

        let neighbors: Vec<(Site, Image)> = graph.neighbors(Site::from(0)).collect();
        assert_eq!(neighbors, vec![(Site::from(1), Image([-1, 1, 0]))]);
        let reverse: Vec<(Site, Image)> = graph.neighbors(Site::from(1)).collect();
        assert_eq!(reverse, vec![(Site::from(0), Image([1, -1, 0]))]);

        let vectors = graph.bond_vectors(Site::from(0), &lattice, &coordinates);
        approx::assert_relative_eq!(vectors[0], Vector3::new(-0.2, 0.2, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn cutoff_beyond_cell() {
        // Bonds reach two cells away along a short axis
        let lattice = Matrix3::from_diagonal(&Vector3::new(1.0, 10.0, 10.0));
        let coordinates = Matrix3N::from_columns(&[
            Vector3::new(0.25, 5.0, 5.0),
            Vector3::new(0.75, 5.0, 5.0),
        ]);
        let graph = BondGraph::new(&lattice, &coordinates, 2.1).unwrap();

        // Each site with its own images at 1 and 2, plus the pair at 0.5 and 1.5
        // on either side
        assert_eq!(graph.bond_count(), 8);
        let crossing: Vec<Image> = graph.neighbors(Site::from(0))
            .filter(|(neighbor, _)| *neighbor == Site::from(1))
            .map(|(_, image)| image)
            .sorted_by_key(|image| image.0)
            .collect();
        assert_eq!(crossing, vec![Image([-2, 0, 0]), Image([-1, 0, 0]), Image([0, 0, 0]), Image([1, 0, 0])]);
    }

    #[test]
    fn image_orientation() {
        assert!(Image([0, 1, -3]).is_positive());
        assert!(!Image([0, -1, 3]).is_positive());
        assert!(!Image::default().is_positive());
        assert_eq!(Image([1, -2, 0]).negated(), Image([-1, 2, 0]));
    }

    #[test]
    fn bad_cutoff() {
        let lattice = Matrix3::identity();
        let coordinates = Matrix3N::zeros(1);
        assert!(matches!(
            BondGraph::new(&lattice, &coordinates, 0.0),
            Err(GeometryError::NonPositive {parameter: "cutoff", ..})
        ));
        assert!(matches!(
            BondGraph::new(&Matrix3::zeros(), &coordinates, 1.0),
            Err(GeometryError::SingularLattice)
        ));
    }
}
