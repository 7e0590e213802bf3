use crate::{
    element::{HasTopology, Influence, FH, HH, VH},
    error::Result,
    iterator,
    topol::Topology,
};
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Seed of the face color generator. Reset on every (re)load so that loading
/// the same file twice produces the same colors.
const FACE_COLOR_SEED: u64 = 0x5eed_f00d;

/// A polygon mesh being edited.
///
/// Owns the halfedge [`Topology`], the flag telling whether the vertices
/// currently carry valid skin influences, and the generator that gives each
/// new face its color.
#[derive(Clone)]
pub struct Mesh {
    pub(crate) topol: Topology,
    pub(crate) skinned: bool,
    colors: StdRng,
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

impl HasTopology for Mesh {
    fn topology(&self) -> &Topology {
        &self.topol
    }
}

impl Mesh {
    pub fn new() -> Self {
        Self::with_capacity(0, 0, 0)
    }

    pub fn with_capacity(nverts: usize, nhalfedges: usize, nfaces: usize) -> Self {
        Mesh {
            topol: Topology::with_capacity(nverts, nhalfedges, nfaces),
            skinned: false,
            colors: StdRng::seed_from_u64(FACE_COLOR_SEED),
        }
    }

    /// Drop all the geometry, and start the ids and the face colors over.
    pub fn clear(&mut self) {
        self.topol.clear();
        self.skinned = false;
        self.colors = StdRng::seed_from_u64(FACE_COLOR_SEED);
    }

    pub fn num_vertices(&self) -> usize {
        self.topol.num_vertices()
    }

    pub fn num_halfedges(&self) -> usize {
        self.topol.num_halfedges()
    }

    pub fn num_faces(&self) -> usize {
        self.topol.num_faces()
    }

    pub fn vertices(&self) -> impl Iterator<Item = VH> + use<> {
        self.topol.vertices()
    }

    pub fn halfedges(&self) -> impl Iterator<Item = HH> + use<> {
        self.topol.halfedges()
    }

    pub fn faces(&self) -> impl Iterator<Item = FH> + use<> {
        self.topol.faces()
    }

    pub fn vertex_id(&self, v: VH) -> u32 {
        self.topol.vertex_id(v)
    }

    pub fn halfedge_id(&self, h: HH) -> u32 {
        self.topol.halfedge_id(h)
    }

    pub fn face_id(&self, f: FH) -> u32 {
        self.topol.face_id(f)
    }

    pub fn point(&self, v: VH) -> glam::Vec3 {
        self.topol.point(v)
    }

    /// Move a vertex. This does not change the topology, so existing skin
    /// influences stay valid.
    pub fn set_point(&mut self, v: VH, pos: glam::Vec3) -> Result<()> {
        self.topol.check_vertex(v)?;
        self.topol.set_point(v, pos);
        Ok(())
    }

    pub fn face_color(&self, f: FH) -> glam::Vec3 {
        self.topol.face_color(f)
    }

    pub fn set_face_color(&mut self, f: FH, color: glam::Vec3) -> Result<()> {
        self.topol.check_face(f)?;
        self.topol.set_face_color(f, color);
        Ok(())
    }

    pub fn vertex_halfedge(&self, v: VH) -> Option<HH> {
        self.topol.vertex_halfedge(v)
    }

    pub fn next_halfedge(&self, h: HH) -> Result<HH> {
        self.topol.next_halfedge(h)
    }

    pub fn prev_halfedge(&self, h: HH) -> Result<HH> {
        self.topol.prev_halfedge(h)
    }

    pub fn sym_halfedge(&self, h: HH) -> Option<HH> {
        self.topol.sym_halfedge(h)
    }

    pub fn head_vertex(&self, h: HH) -> Result<VH> {
        self.topol.head_vertex(h)
    }

    pub fn tail_vertex(&self, h: HH) -> Result<VH> {
        self.topol.tail_vertex(h)
    }

    pub fn halfedge_face(&self, h: HH) -> Result<FH> {
        self.topol.halfedge_face(h)
    }

    pub fn face_halfedge(&self, f: FH) -> Result<HH> {
        self.topol.face_halfedge(f)
    }

    pub fn face_valence(&self, f: FH) -> Result<usize> {
        self.topol.face_valence(f)
    }

    pub fn vertex_valence(&self, v: VH) -> usize {
        self.topol.vertex_valence(v)
    }

    pub fn fh_iter(&self, f: FH) -> impl Iterator<Item = HH> + use<'_> {
        iterator::fh_iter(&self.topol, f)
    }

    pub fn fv_iter(&self, f: FH) -> impl Iterator<Item = VH> + use<'_> {
        iterator::fv_iter(&self.topol, f)
    }

    pub fn vf_iter(&self, v: VH) -> impl Iterator<Item = FH> + use<'_> {
        iterator::vf_iter(&self.topol, v)
    }

    pub fn vih_iter(&self, v: VH) -> impl Iterator<Item = HH> + use<'_> {
        iterator::vih_iter(&self.topol, v)
    }

    pub fn add_vertex(&mut self, pos: glam::Vec3) -> VH {
        self.topol.add_vertex(pos)
    }

    pub fn add_halfedge(&mut self) -> HH {
        self.topol.add_halfedge()
    }

    /// Append a face with a pseudo-random color.
    pub fn add_face(&mut self) -> FH {
        let color = self.next_face_color();
        self.topol.add_face(color)
    }

    fn next_face_color(&mut self) -> glam::Vec3 {
        glam::vec3(
            self.colors.random::<f32>(),
            self.colors.random::<f32>(),
            self.colors.random::<f32>(),
        )
    }

    /// Point `h` at `v` and make `v` refer back to `h`.
    pub fn set_vertex(&mut self, h: HH, v: VH) -> Result<()> {
        self.topol.set_vertex(h, v)
    }

    /// Put `h` on the boundary of `f` and make `f` refer back to `h`.
    pub fn set_face(&mut self, h: HH, f: FH) -> Result<()> {
        self.topol.set_face(h, f)
    }

    pub fn set_next(&mut self, h: HH, next: HH) -> Result<()> {
        self.topol.set_next(h, next)
    }

    /// Make `a` and `b` each other's sym.
    pub fn set_sym(&mut self, a: HH, b: HH) -> Result<()> {
        self.topol.set_sym(a, b)
    }

    /// Whether every vertex carries influences computed against the current
    /// topology.
    pub fn is_skinned(&self) -> bool {
        self.skinned
    }

    /// Forget the skin binding, e.g. because a different skeleton was loaded.
    pub fn clear_skin(&mut self) {
        self.skinned = false;
    }

    pub fn vertex_influences(&self, v: VH) -> [Option<Influence>; 2] {
        self.topol.vertex_influences(v)
    }

    /// Called by every edit that creates vertices, since those have no
    /// influences.
    pub(crate) fn topology_changed(&mut self) {
        self.skinned = false;
    }
}
