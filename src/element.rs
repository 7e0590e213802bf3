use crate::{error::Result, iterator, topol::Topology};
use std::fmt::{Debug, Display};

/**
 * All elements of the mesh and the skeleton implement this trait. They are
 * identified by their index into the owning arena.
 */
pub trait Handle {
    /**
     * The index of the element.
     */
    fn index(&self) -> u32;
}

/**
 * Vertex handle.
 */
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VH {
    idx: u32,
}

/**
 * Halfedge handle.
 */
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HH {
    idx: u32,
}

/**
 * Face handle.
 */
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FH {
    idx: u32,
}

/**
 * Joint handle.
 */
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JH {
    idx: u32,
}

impl Handle for VH {
    fn index(&self) -> u32 {
        self.idx
    }
}

impl From<u32> for VH {
    fn from(idx: u32) -> Self {
        VH { idx }
    }
}

impl From<&u32> for VH {
    fn from(idx: &u32) -> Self {
        VH { idx: *idx }
    }
}

impl Handle for HH {
    fn index(&self) -> u32 {
        self.idx
    }
}

impl From<u32> for HH {
    fn from(idx: u32) -> Self {
        HH { idx }
    }
}

impl From<&u32> for HH {
    fn from(idx: &u32) -> Self {
        HH { idx: *idx }
    }
}

impl Handle for FH {
    fn index(&self) -> u32 {
        self.idx
    }
}

impl From<u32> for FH {
    fn from(idx: u32) -> Self {
        FH { idx }
    }
}

impl From<&u32> for FH {
    fn from(idx: &u32) -> Self {
        FH { idx: *idx }
    }
}

impl Handle for JH {
    fn index(&self) -> u32 {
        self.idx
    }
}

impl From<u32> for JH {
    fn from(idx: u32) -> Self {
        JH { idx }
    }
}

impl Display for VH {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "VH({})", self.index())
    }
}

impl Display for HH {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HH({})", self.index())
    }
}

impl Display for FH {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FH({})", self.index())
    }
}

impl Display for JH {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "JH({})", self.index())
    }
}

impl Debug for VH {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "VH({})", self.index())
    }
}

impl Debug for HH {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HH({})", self.index())
    }
}

impl Debug for FH {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FH({})", self.index())
    }
}

impl Debug for JH {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "JH({})", self.index())
    }
}

pub trait HasTopology {
    fn topology(&self) -> &Topology;
}

impl VH {
    /// The halfedge stored on this vertex. Its head is this vertex.
    pub fn halfedge(self, mesh: &impl HasTopology) -> Option<HH> {
        mesh.topology().vertex_halfedge(self)
    }

    /// Check if this vertex is valid for the `mesh`.
    ///
    /// The index has to be less than the number of vertices in the mesh.
    pub fn is_valid(self, mesh: &impl HasTopology) -> bool {
        mesh.topology().is_valid_vertex(self)
    }

    pub fn pos(self, mesh: &impl HasTopology) -> glam::Vec3 {
        mesh.topology().point(self)
    }

    /// The number of edges incident on this vertex.
    pub fn valence(self, mesh: &impl HasTopology) -> usize {
        iterator::vv_neighbors(mesh.topology(), self).len()
    }
}

impl HH {
    pub fn head(self, mesh: &impl HasTopology) -> Result<VH> {
        mesh.topology().head_vertex(self)
    }

    pub fn tail(self, mesh: &impl HasTopology) -> Result<VH> {
        mesh.topology().tail_vertex(self)
    }

    pub fn next(self, mesh: &impl HasTopology) -> Result<HH> {
        mesh.topology().next_halfedge(self)
    }

    pub fn prev(self, mesh: &impl HasTopology) -> Result<HH> {
        mesh.topology().prev_halfedge(self)
    }

    pub fn sym(self, mesh: &impl HasTopology) -> Option<HH> {
        mesh.topology().sym_halfedge(self)
    }

    pub fn face(self, mesh: &impl HasTopology) -> Result<FH> {
        mesh.topology().halfedge_face(self)
    }

    /// Check if this halfedge is valid for the `mesh`.
    ///
    /// The index has to be less than the number of halfedges in the mesh.
    pub fn is_valid(self, mesh: &impl HasTopology) -> bool {
        mesh.topology().is_valid_halfedge(self)
    }

    /// A halfedge is on the boundary when no face lies on the other side of
    /// its edge, i.e. it has no sym.
    pub fn is_boundary(self, mesh: &impl HasTopology) -> bool {
        mesh.topology().sym_halfedge(self).is_none()
    }
}

impl FH {
    pub fn halfedge(self, mesh: &impl HasTopology) -> Result<HH> {
        mesh.topology().face_halfedge(self)
    }

    /// Check if this face is valid for the `mesh`.
    ///
    /// The index has to be less than the number of faces in the mesh.
    pub fn is_valid(self, mesh: &impl HasTopology) -> bool {
        mesh.topology().is_valid_face(self)
    }

    /// Number of sides of this face.
    pub fn valence(self, mesh: &impl HasTopology) -> Result<usize> {
        mesh.topology().face_valence(self)
    }
}

impl HasTopology for Topology {
    fn topology(&self) -> &Topology {
        self
    }
}

/// One joint influencing a skinned vertex.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Influence {
    pub joint: JH,
    pub weight: f32,
}

#[derive(Debug, Clone)]
pub(crate) struct Vertex {
    pub(crate) id: u32,
    pub(crate) pos: glam::Vec3,
    pub(crate) halfedge: Option<HH>,
    pub(crate) influences: [Option<Influence>; 2],
}

#[derive(Debug, Copy, Clone)]
pub(crate) struct Halfedge {
    pub(crate) id: u32,
    pub(crate) next: Option<HH>,
    pub(crate) sym: Option<HH>,
    pub(crate) vertex: Option<VH>,
    pub(crate) face: Option<FH>,
}

#[derive(Debug, Copy, Clone)]
pub(crate) struct Face {
    pub(crate) id: u32,
    pub(crate) color: glam::Vec3,
    pub(crate) halfedge: Option<HH>,
}
