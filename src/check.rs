use crate::{
    element::{Handle, HasTopology},
    error::{Result, TopologyError},
    mesh::Mesh,
    topol::Topology,
};

fn check_halfedges(topol: &Topology) -> Result<()> {
    for h in topol.halfedges() {
        let hedge = topol.halfedge(h);
        let (Some(next), Some(_), Some(_)) = (hedge.next, hedge.vertex, hedge.face) else {
            return Err(TopologyError::UnlinkedHalfedge(h).into());
        };
        topol.check_halfedge(next)?;
        if let Some(s) = hedge.sym {
            topol.check_halfedge(s)?;
            if topol.sym_halfedge(s) != Some(h) {
                return Err(TopologyError::AsymmetricSym(h).into());
            }
            // Same two vertices, opposite roles.
            let head = topol.head_vertex(h)?;
            let tail = topol.head_vertex(topol.prev_halfedge(h)?)?;
            let shead = topol.head_vertex(s)?;
            let stail = topol.head_vertex(topol.prev_halfedge(s)?)?;
            if head != stail || tail != shead {
                return Err(TopologyError::MismatchedSym(h).into());
            }
        }
    }
    Ok(())
}

fn check_loops(topol: &Topology, hvisited: &mut [bool]) -> Result<()> {
    hvisited.fill(false);
    let mut hloop = Vec::new();
    for h in topol.halfedges() {
        if hvisited[h.index() as usize] {
            continue;
        }
        topol.collect_loop(h, &mut hloop)?;
        let f = topol.halfedge_face(h)?;
        for &lh in &hloop {
            // A halfedge reached from two different starts means the loops merge.
            if std::mem::replace(&mut hvisited[lh.index() as usize], true) {
                return Err(TopologyError::OpenLoop(lh).into());
            }
            if topol.halfedge_face(lh)? != f {
                return Err(TopologyError::InconsistentFaceInLoop(lh).into());
            }
        }
        if hloop.len() < 3 {
            return Err(TopologyError::DegenerateFace(f).into());
        }
    }
    Ok(())
}

fn check_faces(topol: &Topology) -> Result<()> {
    for f in topol.faces() {
        let h = topol.face_halfedge(f)?;
        topol.check_halfedge(h)?;
        if topol.halfedge_face(h)? != f {
            return Err(TopologyError::InvalidFaceHalfedgeLink(f, h).into());
        }
    }
    Ok(())
}

fn check_vertices(topol: &Topology) -> Result<()> {
    for v in topol.vertices() {
        if let Some(h) = topol.vertex_halfedge(v) {
            topol.check_halfedge(h)?;
            if topol.head_vertex(h)? != v {
                return Err(TopologyError::InvalidVertexHalfedgeLink(v, h).into());
            }
        }
    }
    Ok(())
}

impl Topology {
    pub fn check(&self) -> Result<()> {
        let mut hvisited = vec![false; self.num_halfedges()].into_boxed_slice();
        check_halfedges(self)?;
        check_loops(self, &mut hvisited)?;
        check_faces(self)?;
        check_vertices(self)?;
        Ok(())
    }
}

impl Mesh {
    /// Check the topology of the mesh.
    ///
    /// Returns the first violation found: a halfedge with a missing link, a
    /// sym that is not an involution or does not share the edge's vertices, a
    /// loop that does not close or crosses faces, a face with fewer than 3
    /// sides, or a face/vertex whose stored halfedge does not point back.
    pub fn check_topology(&self) -> Result<()> {
        self.topology().check()
    }
}
