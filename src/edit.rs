use crate::{
    element::{FH, HH, VH},
    error::{Result, TopologyError},
    mesh::Mesh,
};
use tracing::trace;

impl Mesh {
    /// Collect the loop of `f`, making sure every halfedge in it is fully
    /// linked and belongs to `f`.
    pub(crate) fn checked_face_loop(&self, f: FH, hloop: &mut Vec<HH>) -> Result<()> {
        self.topol.check_face(f)?;
        let hstart = self.topol.face_halfedge(f)?;
        self.topol.check_halfedge(hstart)?;
        self.topol.collect_loop(hstart, hloop)?;
        for &h in hloop.iter() {
            self.topol.head_vertex(h)?;
            if self.topol.halfedge_face(h)? != f {
                return Err(TopologyError::InconsistentFaceInLoop(h).into());
            }
        }
        if hloop.len() < 3 {
            return Err(TopologyError::DegenerateFace(f).into());
        }
        Ok(())
    }

    /// Insert a new vertex at the midpoint of the edge of `h`.
    ///
    /// `h` and its sym keep their tails and now point at the new vertex. Each
    /// gets a new continuation that points where it used to point, so both
    /// faces of the edge gain one side. A boundary halfedge (no sym) gets only
    /// one new halfedge. Returns the new vertex.
    pub fn split_edge(&mut self, h: HH) -> Result<VH> {
        self.topol.check_halfedge(h)?;
        let b = self.topol.head_vertex(h)?;
        let f = self.topol.halfedge_face(h)?;
        let hnext = self.topol.next_halfedge(h)?;
        let other = match self.topol.sym_halfedge(h) {
            Some(s) => {
                self.topol.check_halfedge(s)?;
                Some((
                    s,
                    self.topol.head_vertex(s)?,
                    self.topol.halfedge_face(s)?,
                    self.topol.next_halfedge(s)?,
                ))
            }
            None => None,
        };
        let a = match other {
            Some((_, a, _, _)) => a,
            None => self.topol.tail_vertex(h)?,
        };
        // Everything is validated, start editing.
        let mid = self.add_vertex((self.point(a) + self.point(b)) * 0.5);
        let hc = self.add_halfedge();
        self.topol.link_vertex(hc, b);
        self.topol.link_face(hc, f);
        self.topol.link_next(hc, hnext);
        self.topol.link_next(h, hc);
        self.topol.link_vertex(h, mid);
        if let Some((s, _, sf, snext)) = other {
            let sc = self.add_halfedge();
            self.topol.link_vertex(sc, a);
            self.topol.link_face(sc, sf);
            self.topol.link_next(sc, snext);
            self.topol.link_next(s, sc);
            self.topol.link_vertex(s, mid);
            self.topol.link_sym(h, sc);
            self.topol.link_sym(s, hc);
        }
        self.topology_changed();
        trace!("Split {h} at new vertex {mid}");
        Ok(mid)
    }

    /// Fan the face `f` into triangles.
    ///
    /// Each step cuts a triangle off the two halfedges after the face's
    /// representative halfedge, as a new face, and keeps the rest of the
    /// polygon in `f`. The last remaining triangle keeps `f`. An N-sided face
    /// becomes N - 2 triangles with 2 (N - 3) new halfedges. Triangles are left
    /// as they are.
    pub fn triangulate_face(&mut self, f: FH) -> Result<()> {
        let mut hloop = Vec::new();
        self.checked_face_loop(f, &mut hloop)?;
        self.triangulate_checked_face(f, hloop.len())
    }

    fn triangulate_checked_face(&mut self, f: FH, nsides: usize) -> Result<()> {
        if nsides == 3 {
            return Ok(());
        }
        for _ in 3..nsides {
            let he = self.topol.face_halfedge(f)?;
            let h1 = self.topol.next_halfedge(he)?;
            let h2 = self.topol.next_halfedge(h1)?;
            let h3 = self.topol.next_halfedge(h2)?;
            let v0 = self.topol.head_vertex(he)?;
            let v2 = self.topol.head_vertex(h2)?;
            let hn = self.add_halfedge();
            let ho = self.add_halfedge();
            self.topol.link_vertex(hn, v0);
            self.topol.link_vertex(ho, v2);
            self.topol.link_sym(hn, ho);
            // Triangle h1 -> h2 -> hn.
            let fnew = self.add_face();
            self.topol.link_face(h1, fnew);
            self.topol.link_face(h2, fnew);
            self.topol.link_face(hn, fnew);
            self.topol.link_next(h2, hn);
            self.topol.link_next(hn, h1);
            // Remainder he -> ho -> h3 -> ... -> he.
            self.topol.link_face(ho, f);
            self.topol.link_next(ho, h3);
            self.topol.link_next(he, ho);
            self.topol.link_face(he, f);
        }
        self.topology_changed();
        trace!("Triangulated {f} with {nsides} sides");
        Ok(())
    }

    /// Fan every face of the mesh into triangles. All faces are validated
    /// before any of them is changed.
    pub fn triangulate(&mut self) -> Result<()> {
        let mut hloop = Vec::new();
        let mut sides = Vec::with_capacity(self.num_faces());
        for f in self.faces() {
            self.checked_face_loop(f, &mut hloop)?;
            sides.push(hloop.len());
        }
        for (f, nsides) in self.faces().zip(sides) {
            self.triangulate_checked_face(f, nsides)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::{
        element::{Handle, HH, VH},
        error::{Error, TopologyError},
        macros::{assert_f32_eq, assert_vec3_eq},
        mesh::Mesh,
    };
    use glam::{Vec3, vec3};

    /// Area of a planar polygon.
    fn face_area(mesh: &Mesh, f: crate::element::FH) -> f32 {
        let pts: Vec<Vec3> = mesh.fv_iter(f).map(|v| mesh.point(v)).collect();
        let n = pts.len();
        (0..n)
            .map(|i| pts[i].cross(pts[(i + 1) % n]))
            .sum::<Vec3>()
            .length()
            * 0.5
    }

    fn hexagon() -> Mesh {
        let pos: Vec<Vec3> = (0..6)
            .map(|i| {
                let a = i as f32 * std::f32::consts::FRAC_PI_3;
                vec3(a.cos(), a.sin(), 0.0)
            })
            .collect();
        Mesh::from_polygons(&pos, &[[0u32, 1, 2, 3, 4, 5]]).expect("Cannot create hexagon")
    }

    #[test]
    fn t_box_split_edge() {
        let mut mesh = Mesh::unit_box().expect("Cannot create box");
        let h: HH = 0.into();
        let s = mesh.sym_halfedge(h).unwrap();
        let (a, b) = (mesh.tail_vertex(h).unwrap(), mesh.head_vertex(h).unwrap());
        let (fa, fb) = (mesh.halfedge_face(h).unwrap(), mesh.halfedge_face(s).unwrap());
        let mid = mesh.split_edge(h).expect("Cannot split edge");
        assert_eq!(mesh.num_vertices(), 9);
        assert_eq!(mesh.num_halfedges(), 26);
        assert_eq!(mesh.num_faces(), 6);
        mesh.check_topology().expect("Topological errors found");
        assert_vec3_eq!(mesh.point(mid), (mesh.point(a) + mesh.point(b)) * 0.5);
        assert_eq!(mesh.face_valence(fa).unwrap(), 5);
        assert_eq!(mesh.face_valence(fb).unwrap(), 5);
        assert_eq!(mesh.head_vertex(h).unwrap(), mid);
        assert_eq!(mesh.head_vertex(s).unwrap(), mid);
        assert_eq!(mesh.tail_vertex(h).unwrap(), a);
        let hc = mesh.next_halfedge(h).unwrap();
        assert_eq!(mesh.head_vertex(hc).unwrap(), b);
        assert_eq!(mesh.sym_halfedge(hc), Some(s));
        assert_eq!(mesh.vertex_valence(mid), 2);
    }

    #[test]
    fn t_split_boundary_edge() {
        let mut mesh = Mesh::from_obj_str("v 0 0 0\nv 2 0 0\nv 0 2 0\nf 1 2 3\n").unwrap();
        let mid = mesh.split_edge(0.into()).expect("Cannot split boundary edge");
        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_halfedges(), 4);
        assert_eq!(mesh.face_valence(0.into()).unwrap(), 4);
        assert_eq!(mesh.point(mid), vec3(1.0, 0.0, 0.0));
        mesh.check_topology().expect("Topological errors found");
    }

    #[test]
    fn t_split_invalid_halfedge() {
        let mut mesh = Mesh::unit_box().unwrap();
        assert!(matches!(
            mesh.split_edge(24.into()),
            Err(Error::Topology(TopologyError::InvalidHalfedge(_)))
        ));
        let h = mesh.add_halfedge();
        assert!(matches!(
            mesh.split_edge(h),
            Err(Error::Topology(TopologyError::UnlinkedHalfedge(_)))
        ));
        assert_eq!(mesh.num_vertices(), 8);
        assert_eq!(mesh.num_halfedges(), 25);
    }

    #[test]
    fn t_box_triangulate_face() {
        let mut mesh = Mesh::unit_box().unwrap();
        let area = face_area(&mesh, 3.into());
        mesh.triangulate_face(3.into()).expect("Cannot triangulate face");
        assert_eq!(mesh.num_faces(), 7);
        assert_eq!(mesh.num_halfedges(), 26);
        assert_eq!(mesh.face_valence(3.into()).unwrap(), 3);
        assert_eq!(mesh.face_valence(6.into()).unwrap(), 3);
        assert_f32_eq!(face_area(&mesh, 3.into()) + face_area(&mesh, 6.into()), area, 1e-6);
        mesh.check_topology().expect("Topological errors found");
    }

    #[test]
    fn t_hexagon_triangulate_face() {
        let mut mesh = hexagon();
        let area = face_area(&mesh, 0.into());
        assert_f32_eq!(area, 1.5 * 3f32.sqrt(), 1e-5);
        mesh.triangulate_face(0.into()).unwrap();
        assert_eq!(mesh.num_faces(), 4);
        assert_eq!(mesh.num_halfedges(), 6 + 2 * 3);
        assert_eq!(mesh.num_vertices(), 6);
        mesh.check_topology().expect("Topological errors found");
        for f in mesh.faces() {
            assert_eq!(mesh.face_valence(f).unwrap(), 3);
        }
        assert_f32_eq!(mesh.faces().map(|f| face_area(&mesh, f)).sum::<f32>(), area, 1e-5);
        // Every triangle shares the hub vertex, the head of the representative
        // halfedge of the original face.
        let hub: VH = mesh.head_vertex(mesh.face_halfedge(0.into()).unwrap()).unwrap();
        assert!(mesh.faces().all(|f| mesh.fv_iter(f).any(|v| v == hub)));
    }

    #[test]
    fn t_triangle_unchanged() {
        let mut mesh = Mesh::from_obj_str("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        mesh.triangulate_face(0.into()).unwrap();
        assert_eq!((3, 1), (mesh.num_halfedges(), mesh.num_faces()));
    }

    #[test]
    fn t_box_triangulate() {
        let mut mesh = Mesh::unit_box().unwrap();
        mesh.triangulate().expect("Cannot triangulate mesh");
        assert_eq!(mesh.num_vertices(), 8);
        assert_eq!(mesh.num_halfedges(), 36);
        assert_eq!(mesh.num_faces(), 12);
        mesh.check_topology().expect("Topological errors found");
        let total: f32 = mesh.faces().map(|f| face_area(&mesh, f)).sum();
        assert_f32_eq!(total, 6.0, 1e-5);
        for f in mesh.faces() {
            assert_eq!(f.valence(&mesh).unwrap(), 3);
        }
    }

    #[test]
    fn t_triangulate_degenerate_face() {
        let mut mesh = Mesh::new();
        let v0 = mesh.add_vertex(vec3(0.0, 0.0, 0.0));
        let v1 = mesh.add_vertex(vec3(1.0, 0.0, 0.0));
        let f = mesh.add_face();
        let h0 = mesh.add_halfedge();
        let h1 = mesh.add_halfedge();
        mesh.set_vertex(h0, v1).unwrap();
        mesh.set_vertex(h1, v0).unwrap();
        mesh.set_face(h0, f).unwrap();
        mesh.set_face(h1, f).unwrap();
        mesh.set_next(h0, h1).unwrap();
        mesh.set_next(h1, h0).unwrap();
        assert!(matches!(
            mesh.triangulate_face(f),
            Err(Error::Topology(TopologyError::DegenerateFace(x))) if x == f
        ));
        assert!(mesh.triangulate().is_err());
        assert_eq!(mesh.num_halfedges(), 2);
        assert_eq!(mesh.num_faces(), 1);
        assert_eq!(f.index(), 0);
    }
}
