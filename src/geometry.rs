extern crate nalgebra as na;
type Matrix3 = na::Matrix3<f64>;
type Vector3 = na::Vector3<f64>;

/// Three-dimensional plane through the origin
pub struct Plane {
    /// Unit normal vector
    pub normal: Vector3,
}

impl Plane {
    /// Plane through the origin spanned by two vectors
    ///
    /// Returns `None` if the vectors are parallel.
    pub fn spanned_by(a: &Vector3, b: &Vector3) -> Option<Plane> {
        let normal = a.cross(b).try_normalize(1e-12)?;
        Some(Plane {normal})
    }

    /// Signed distance of a point to the plane
    ///
    /// Points in the halfspace indicated by the plane normal have positive distance.
    pub fn signed_distance<S>(&self, point: &na::Matrix<f64, na::Const<3>, na::Const<1>, S>) -> f64 where S: na::Storage<f64, na::Const<3>, na::Const<1>> {
        self.normal.dot(point)
    }
}

/// Lattice vector `axis`, lattice vectors being the rows of the matrix
pub fn lattice_vector(lattice: &Matrix3, axis: usize) -> Vector3 {
    lattice.row(axis).transpose()
}

/// Distance between neighboring lattice planes crossed by lattice vector `axis`
///
/// The planes are spanned by the other two lattice vectors. Returns `None` for
/// a degenerate lattice.
pub fn plane_spacing(lattice: &Matrix3, axis: usize) -> Option<f64> {
    let plane = Plane::spanned_by(
        &lattice_vector(lattice, (axis + 1) % 3),
        &lattice_vector(lattice, (axis + 2) % 3)
    )?;
    let spacing = plane.signed_distance(&lattice_vector(lattice, axis)).abs();
    (spacing > 0.0).then_some(spacing)
}

/// Direction opposite to the mean of two bond directions
///
/// For an atom with two bonds this points along the missing third bond.
/// Returns `None` if the bonds are antiparallel.
pub fn outward_bisector(a: &Vector3, b: &Vector3) -> Option<Vector3> {
    let a = a.try_normalize(1e-12)?;
    let b = b.try_normalize(1e-12)?;
    (-(a + b)).try_normalize(1e-12)
}
