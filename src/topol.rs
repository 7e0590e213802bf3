use crate::{
    element::{Face, Halfedge, Handle, Influence, Vertex, FH, HH, VH},
    error::{Result, TopologyError},
    ids::IdGen,
    iterator,
};

/// Ids of vertices, halfedges and faces start here after every (re)load.
pub const TOPOLOGY_ID_BASE: u32 = 1;

/// Append-only arena of vertex, halfedge and face records.
///
/// Records are never destroyed individually; the whole arena is cleared when
/// a new mesh is loaded. All links between records go through the four
/// linking mutators, which keep the back references of vertices and faces in
/// sync with the halfedges that point at them.
#[derive(Clone)]
pub struct Topology {
    vertices: Vec<Vertex>,
    halfedges: Vec<Halfedge>,
    faces: Vec<Face>,
    vertex_ids: IdGen,
    halfedge_ids: IdGen,
    face_ids: IdGen,
}

impl Topology {
    pub fn new() -> Self {
        Self::with_capacity(0, 0, 0)
    }

    pub fn with_capacity(nverts: usize, nhalfedges: usize, nfaces: usize) -> Self {
        Topology {
            vertices: Vec::with_capacity(nverts),
            halfedges: Vec::with_capacity(nhalfedges),
            faces: Vec::with_capacity(nfaces),
            vertex_ids: IdGen::new(TOPOLOGY_ID_BASE),
            halfedge_ids: IdGen::new(TOPOLOGY_ID_BASE),
            face_ids: IdGen::new(TOPOLOGY_ID_BASE),
        }
    }

    pub fn reserve(&mut self, nverts: usize, nhalfedges: usize, nfaces: usize) {
        self.vertices.reserve(nverts);
        self.halfedges.reserve(nhalfedges);
        self.faces.reserve(nfaces);
    }

    /// Drop every record and restart the ids at their base.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.halfedges.clear();
        self.faces.clear();
        self.vertex_ids.reset();
        self.halfedge_ids.reset();
        self.face_ids.reset();
    }

    pub(crate) fn vertex(&self, v: VH) -> &Vertex {
        &self.vertices[v.index() as usize]
    }

    pub(crate) fn vertex_mut(&mut self, v: VH) -> &mut Vertex {
        &mut self.vertices[v.index() as usize]
    }

    pub(crate) fn halfedge(&self, h: HH) -> &Halfedge {
        &self.halfedges[h.index() as usize]
    }

    fn halfedge_mut(&mut self, h: HH) -> &mut Halfedge {
        &mut self.halfedges[h.index() as usize]
    }

    pub(crate) fn face(&self, f: FH) -> &Face {
        &self.faces[f.index() as usize]
    }

    fn face_mut(&mut self, f: FH) -> &mut Face {
        &mut self.faces[f.index() as usize]
    }

    fn try_halfedge(&self, h: HH) -> Result<&Halfedge> {
        self.halfedges
            .get(h.index() as usize)
            .ok_or(TopologyError::InvalidHalfedge(h).into())
    }

    fn try_face(&self, f: FH) -> Result<&Face> {
        self.faces
            .get(f.index() as usize)
            .ok_or(TopologyError::InvalidFace(f).into())
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_halfedges(&self) -> usize {
        self.halfedges.len()
    }

    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    pub fn vertices(&self) -> impl Iterator<Item = VH> + use<> {
        (0..(self.num_vertices() as u32)).map(|i| i.into())
    }

    pub fn halfedges(&self) -> impl Iterator<Item = HH> + use<> {
        (0..(self.num_halfedges() as u32)).map(|i| i.into())
    }

    pub fn faces(&self) -> impl Iterator<Item = FH> + use<> {
        (0..(self.num_faces() as u32)).map(|i| i.into())
    }

    pub fn is_valid_vertex(&self, v: VH) -> bool {
        (v.index() as usize) < self.num_vertices()
    }

    pub fn is_valid_halfedge(&self, h: HH) -> bool {
        (h.index() as usize) < self.num_halfedges()
    }

    pub fn is_valid_face(&self, f: FH) -> bool {
        (f.index() as usize) < self.num_faces()
    }

    pub(crate) fn check_vertex(&self, v: VH) -> Result<()> {
        if self.is_valid_vertex(v) {
            Ok(())
        } else {
            Err(TopologyError::InvalidVertex(v).into())
        }
    }

    pub(crate) fn check_halfedge(&self, h: HH) -> Result<()> {
        if self.is_valid_halfedge(h) {
            Ok(())
        } else {
            Err(TopologyError::InvalidHalfedge(h).into())
        }
    }

    pub(crate) fn check_face(&self, f: FH) -> Result<()> {
        if self.is_valid_face(f) {
            Ok(())
        } else {
            Err(TopologyError::InvalidFace(f).into())
        }
    }

    pub fn vertex_id(&self, v: VH) -> u32 {
        self.vertex(v).id
    }

    pub fn halfedge_id(&self, h: HH) -> u32 {
        self.halfedge(h).id
    }

    pub fn face_id(&self, f: FH) -> u32 {
        self.face(f).id
    }

    pub fn point(&self, v: VH) -> glam::Vec3 {
        self.vertex(v).pos
    }

    pub(crate) fn set_point(&mut self, v: VH, pos: glam::Vec3) {
        self.vertex_mut(v).pos = pos;
    }

    pub fn vertex_halfedge(&self, v: VH) -> Option<HH> {
        self.vertex(v).halfedge
    }

    pub fn vertex_influences(&self, v: VH) -> [Option<Influence>; 2] {
        self.vertex(v).influences
    }

    #[cfg(feature = "skin")]
    pub(crate) fn set_vertex_influences(&mut self, v: VH, influences: [Option<Influence>; 2]) {
        self.vertex_mut(v).influences = influences;
    }

    pub fn next_halfedge(&self, h: HH) -> Result<HH> {
        self.try_halfedge(h)?
            .next
            .ok_or(TopologyError::UnlinkedHalfedge(h).into())
    }

    pub fn sym_halfedge(&self, h: HH) -> Option<HH> {
        self.halfedge(h).sym
    }

    /// The vertex this halfedge points to.
    pub fn head_vertex(&self, h: HH) -> Result<VH> {
        self.try_halfedge(h)?
            .vertex
            .ok_or(TopologyError::UnlinkedHalfedge(h).into())
    }

    pub fn halfedge_face(&self, h: HH) -> Result<FH> {
        self.try_halfedge(h)?
            .face
            .ok_or(TopologyError::UnlinkedHalfedge(h).into())
    }

    pub fn face_halfedge(&self, f: FH) -> Result<HH> {
        self.try_face(f)?
            .halfedge
            .ok_or(TopologyError::EmptyFace(f).into())
    }

    pub fn face_color(&self, f: FH) -> glam::Vec3 {
        self.face(f).color
    }

    pub(crate) fn set_face_color(&mut self, f: FH, color: glam::Vec3) {
        self.face_mut(f).color = color;
    }

    /// The halfedge whose next is `h`, found by walking the loop of `h`.
    pub fn prev_halfedge(&self, h: HH) -> Result<HH> {
        let mut current = h;
        for _ in 0..self.num_halfedges() {
            let next = self.next_halfedge(current)?;
            if next == h {
                return Ok(current);
            }
            current = next;
        }
        Err(TopologyError::OpenLoop(h).into())
    }

    /// The vertex this halfedge starts from.
    ///
    /// This is the head of the sym when there is one, otherwise the head of
    /// the previous halfedge in the loop.
    pub fn tail_vertex(&self, h: HH) -> Result<VH> {
        match self.try_halfedge(h)?.sym {
            Some(s) => self.head_vertex(s),
            None => self.head_vertex(self.prev_halfedge(h)?),
        }
    }

    /// Collect the loop starting at `h` into `out`, failing if it does not
    /// close or has a missing link.
    pub fn collect_loop(&self, h: HH, out: &mut Vec<HH>) -> Result<()> {
        out.clear();
        let mut current = h;
        for _ in 0..self.num_halfedges() {
            out.push(current);
            current = self.next_halfedge(current)?;
            if current == h {
                return Ok(());
            }
        }
        Err(TopologyError::OpenLoop(h).into())
    }

    pub fn face_valence(&self, f: FH) -> Result<usize> {
        let mut hloop = Vec::new();
        self.collect_loop(self.face_halfedge(f)?, &mut hloop)?;
        Ok(hloop.len())
    }

    /// Number of distinct vertices sharing an edge with `v`.
    pub fn vertex_valence(&self, v: VH) -> usize {
        iterator::vv_neighbors(self, v).len()
    }

    pub fn add_vertex(&mut self, pos: glam::Vec3) -> VH {
        let vi = self.vertices.len() as u32;
        self.vertices.push(Vertex {
            id: self.vertex_ids.next_id(),
            pos,
            halfedge: None,
            influences: [None; 2],
        });
        vi.into()
    }

    /// Append a halfedge with no links. It must be linked with the mutators
    /// before the mesh is valid again.
    pub fn add_halfedge(&mut self) -> HH {
        let hi = self.halfedges.len() as u32;
        self.halfedges.push(Halfedge {
            id: self.halfedge_ids.next_id(),
            next: None,
            sym: None,
            vertex: None,
            face: None,
        });
        hi.into()
    }

    pub fn add_face(&mut self, color: glam::Vec3) -> FH {
        let fi = self.faces.len() as u32;
        self.faces.push(Face {
            id: self.face_ids.next_id(),
            color,
            halfedge: None,
        });
        fi.into()
    }

    /// Point `h` at `v`, and make `v` refer back to `h`.
    pub(crate) fn link_vertex(&mut self, h: HH, v: VH) {
        self.halfedge_mut(h).vertex = Some(v);
        self.vertex_mut(v).halfedge = Some(h);
    }

    /// Put `h` on the boundary of `f`, and make `f` refer back to `h`.
    pub(crate) fn link_face(&mut self, h: HH, f: FH) {
        self.halfedge_mut(h).face = Some(f);
        self.face_mut(f).halfedge = Some(h);
    }

    pub(crate) fn link_next(&mut self, h: HH, next: HH) {
        self.halfedge_mut(h).next = Some(next);
    }

    pub(crate) fn link_sym(&mut self, a: HH, b: HH) {
        self.halfedge_mut(a).sym = Some(b);
        self.halfedge_mut(b).sym = Some(a);
    }

    pub fn set_vertex(&mut self, h: HH, v: VH) -> Result<()> {
        self.check_halfedge(h)?;
        self.check_vertex(v)?;
        self.link_vertex(h, v);
        Ok(())
    }

    pub fn set_face(&mut self, h: HH, f: FH) -> Result<()> {
        self.check_halfedge(h)?;
        self.check_face(f)?;
        self.link_face(h, f);
        Ok(())
    }

    pub fn set_next(&mut self, h: HH, next: HH) -> Result<()> {
        self.check_halfedge(h)?;
        self.check_halfedge(next)?;
        self.link_next(h, next);
        Ok(())
    }

    /// Make `a` and `b` each other's sym.
    pub fn set_sym(&mut self, a: HH, b: HH) -> Result<()> {
        self.check_halfedge(a)?;
        self.check_halfedge(b)?;
        if a == b {
            return Err(TopologyError::AsymmetricSym(a).into());
        }
        self.link_sym(a, b);
        Ok(())
    }
}

impl Default for Topology {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::{Topology, TOPOLOGY_ID_BASE};
    use crate::{
        element::{Handle, HH},
        error::{Error, TopologyError},
    };
    use glam::vec3;

    /// A single triangle built by hand through the linking mutators.
    fn triangle() -> Topology {
        let mut topol = Topology::default();
        let verts = [
            topol.add_vertex(vec3(0.0, 0.0, 0.0)),
            topol.add_vertex(vec3(1.0, 0.0, 0.0)),
            topol.add_vertex(vec3(0.0, 1.0, 0.0)),
        ];
        let f = topol.add_face(vec3(1.0, 1.0, 1.0));
        let hs: Vec<HH> = (0..3).map(|_| topol.add_halfedge()).collect();
        for i in 0..3 {
            topol.set_vertex(hs[i], verts[(i + 1) % 3]).unwrap();
            topol.set_face(hs[i], f).unwrap();
            topol.set_next(hs[i], hs[(i + 1) % 3]).unwrap();
        }
        topol
    }

    #[test]
    fn t_triangle_links() {
        let topol = triangle();
        assert_eq!(topol.num_vertices(), 3);
        assert_eq!(topol.num_halfedges(), 3);
        assert_eq!(topol.num_faces(), 1);
        for h in topol.halfedges() {
            let n = topol.next_halfedge(h).unwrap();
            assert_eq!(topol.prev_halfedge(n).unwrap(), h);
            assert_eq!(topol.tail_vertex(n).unwrap(), topol.head_vertex(h).unwrap());
            assert!(topol.sym_halfedge(h).is_none());
        }
        assert_eq!(topol.face_valence(0.into()).unwrap(), 3);
        // The face refers to the last halfedge bound to it.
        assert_eq!(topol.face_halfedge(0.into()).unwrap(), 2.into());
        // Each vertex refers to the halfedge pointing at it.
        for v in topol.vertices() {
            let h = topol.vertex_halfedge(v).unwrap();
            assert_eq!(topol.head_vertex(h).unwrap(), v);
        }
    }

    #[test]
    fn t_sym_is_mutual() {
        let mut topol = Topology::default();
        let a = topol.add_halfedge();
        let b = topol.add_halfedge();
        topol.set_sym(a, b).unwrap();
        assert_eq!(topol.sym_halfedge(a), Some(b));
        assert_eq!(topol.sym_halfedge(b), Some(a));
        assert!(matches!(
            topol.set_sym(a, a),
            Err(Error::Topology(TopologyError::AsymmetricSym(_)))
        ));
    }

    #[test]
    fn t_unlinked_halfedge() {
        let mut topol = Topology::default();
        let h = topol.add_halfedge();
        assert!(matches!(
            topol.next_halfedge(h),
            Err(Error::Topology(TopologyError::UnlinkedHalfedge(x))) if x == h
        ));
        assert!(topol.head_vertex(h).is_err());
        assert!(topol.halfedge_face(h).is_err());
        assert!(matches!(
            topol.set_next(h, 5.into()),
            Err(Error::Topology(TopologyError::InvalidHalfedge(_)))
        ));
    }

    #[test]
    fn t_out_of_range_handles() {
        let topol = triangle();
        let h = HH::from(999);
        for res in [
            topol.next_halfedge(h),
            topol.prev_halfedge(h),
            topol.next_halfedge(3.into()),
        ] {
            assert!(matches!(
                res,
                Err(Error::Topology(TopologyError::InvalidHalfedge(_)))
            ));
        }
        assert!(matches!(
            topol.head_vertex(h),
            Err(Error::Topology(TopologyError::InvalidHalfedge(x))) if x == h
        ));
        assert!(topol.halfedge_face(h).is_err());
        assert!(topol.tail_vertex(h).is_err());
        assert!(matches!(
            topol.face_halfedge(1.into()),
            Err(Error::Topology(TopologyError::InvalidFace(_)))
        ));
        assert!(matches!(
            topol.face_valence(7.into()),
            Err(Error::Topology(TopologyError::InvalidFace(_)))
        ));
    }

    #[test]
    fn t_open_loop() {
        let mut topol = Topology::default();
        let a = topol.add_halfedge();
        let b = topol.add_halfedge();
        let c = topol.add_halfedge();
        topol.set_next(a, b).unwrap();
        topol.set_next(b, c).unwrap();
        topol.set_next(c, b).unwrap();
        let mut hloop = Vec::new();
        assert!(matches!(
            topol.collect_loop(a, &mut hloop),
            Err(Error::Topology(TopologyError::OpenLoop(_)))
        ));
    }

    #[test]
    fn t_clear_resets_ids() {
        let mut topol = triangle();
        assert_eq!(topol.vertex_id(2.into()), TOPOLOGY_ID_BASE + 2);
        topol.clear();
        assert_eq!(topol.num_vertices(), 0);
        let v = topol.add_vertex(vec3(1.0, 2.0, 3.0));
        let h = topol.add_halfedge();
        let f = topol.add_face(vec3(0.0, 0.0, 0.0));
        assert_eq!(v.index(), 0);
        assert_eq!(topol.vertex_id(v), TOPOLOGY_ID_BASE);
        assert_eq!(topol.halfedge_id(h), TOPOLOGY_ID_BASE);
        assert_eq!(topol.face_id(f), TOPOLOGY_ID_BASE);
    }
}
