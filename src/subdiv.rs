use crate::{
    element::{FH, HH, Handle, VH},
    error::{Result, TopologyError},
    iterator,
    mesh::Mesh,
};
use glam::Vec3;
use tracing::debug;

/// Halfedges of an original face after its edges were split, starting with
/// one that points at an original vertex, so that they alternate between
/// pointing at original vertices and at edge points.
struct FaceRing {
    face: FH,
    centroid: VH,
    hloop: Vec<HH>,
}

impl Mesh {
    /// Add a vertex at the centroid of every face. The returned vector is
    /// indexed by face.
    fn add_face_centroids(&mut self) -> Vec<VH> {
        let nfaces = self.num_faces();
        let mut centroids = Vec::with_capacity(nfaces);
        for f in self.faces() {
            let (sum, count) = self
                .fv_iter(f)
                .fold((Vec3::ZERO, 0usize), |(sum, count), v| {
                    (sum + self.point(v), count + 1)
                });
            centroids.push(self.add_vertex(sum / count as f32));
        }
        centroids
    }

    /// Split every edge that existed before subdivision once, and move the new
    /// vertex to the average of the edge's end points and the centroids of
    /// the faces on either side.
    fn split_edges_smoothed(&mut self, nhalfedges: usize, centroids: &[VH]) -> Result<()> {
        let mut visited = vec![false; nhalfedges].into_boxed_slice();
        for h in (0..nhalfedges as u32).map(HH::from) {
            if std::mem::replace(&mut visited[h.index() as usize], true) {
                continue;
            }
            let a = self.point(self.tail_vertex(h)?);
            let b = self.point(self.head_vertex(h)?);
            let c = self.point(centroids[self.halfedge_face(h)?.index() as usize]);
            let pos = match self.sym_halfedge(h) {
                Some(s) => {
                    visited[s.index() as usize] = true;
                    let sc = self.point(centroids[self.halfedge_face(s)?.index() as usize]);
                    (a + b + c + sc) / 4.0
                }
                None => (a + b + c) / 3.0,
            };
            let mid = self.split_edge(h)?;
            self.topol.set_point(mid, pos);
        }
        Ok(())
    }

    /// Move every original vertex to
    /// `(n - 2) / n * P + sum(edge points) / n^2 + sum(centroids) / n^2`.
    /// All new positions are computed before any of them is written.
    fn reposition_original_vertices(&mut self, nverts: usize, centroids: &[VH]) -> Result<()> {
        let mut updates: Vec<(VH, Vec3)> = Vec::with_capacity(nverts);
        for v in (0..nverts as u32).map(VH::from) {
            if self.vertex_halfedge(v).is_none() {
                continue;
            }
            // Every neighbor is an edge point now.
            let neighbors = iterator::vv_neighbors(&self.topol, v);
            if neighbors.is_empty() {
                continue;
            }
            let n = neighbors.len() as f32;
            let esum: Vec3 = neighbors.iter().map(|&nv| self.point(nv)).sum();
            let mut fsum = Vec3::ZERO;
            for f in self.vf_iter(v) {
                fsum += self.point(centroids[f.index() as usize]);
            }
            let pos = self.point(v) * ((n - 2.0) / n) + esum / (n * n) + fsum / (n * n);
            updates.push((v, pos));
        }
        for (v, pos) in updates {
            self.topol.set_point(v, pos);
        }
        Ok(())
    }

    fn face_ring(&self, f: FH, nverts: usize, centroids: &[VH]) -> Result<FaceRing> {
        let is_original = |h: HH| -> Result<bool> {
            Ok((self.head_vertex(h)?.index() as usize) < nverts)
        };
        let mut hloop = Vec::new();
        self.checked_face_loop(f, &mut hloop)?;
        let offset = match hloop.iter().position(|&h| is_original(h).unwrap_or(false)) {
            Some(i) => i,
            None => return Err(TopologyError::CannotQuadrangulate(f).into()),
        };
        hloop.rotate_left(offset);
        if hloop.len() % 2 != 0 {
            return Err(TopologyError::CannotQuadrangulate(f).into());
        }
        for (i, &h) in hloop.iter().enumerate() {
            if is_original(h)? != (i % 2 == 0) {
                return Err(TopologyError::CannotQuadrangulate(f).into());
            }
        }
        Ok(FaceRing {
            face: f,
            centroid: centroids[f.index() as usize],
            hloop,
        })
    }

    /// Replace a ring of 2k halfedges with k quads around the centroid. Quad
    /// `i` is made of the two halfedges around the i-th original vertex and
    /// two new halfedges to the centroid. The last quad keeps the original
    /// face.
    fn quadrangulate(&mut self, ring: &FaceRing) -> Result<()> {
        let FaceRing {
            face,
            centroid,
            hloop,
        } = ring;
        let len = hloop.len();
        let k = len / 2;
        let mut spokes_in: Vec<HH> = Vec::with_capacity(k);
        let mut spokes_out: Vec<HH> = Vec::with_capacity(k);
        for i in 0..k {
            let mid = self.head_vertex(hloop[(2 * i + len - 1) % len])?;
            let hin = self.add_halfedge();
            let hout = self.add_halfedge();
            self.topol.link_vertex(hin, *centroid);
            self.topol.link_vertex(hout, mid);
            self.topol.link_sym(hin, hout);
            spokes_in.push(hin);
            spokes_out.push(hout);
        }
        for i in 0..k {
            let f = if i + 1 < k { self.add_face() } else { *face };
            let quad = [
                hloop[2 * i],
                hloop[2 * i + 1],
                spokes_in[(i + 1) % k],
                spokes_out[i],
            ];
            for j in 0..4 {
                self.topol.link_next(quad[j], quad[(j + 1) % 4]);
                self.topol.link_face(quad[j], f);
            }
        }
        Ok(())
    }

    fn quadrangulate_faces(&mut self, nverts: usize, nfaces: usize, centroids: &[VH]) -> Result<()> {
        let rings = (0..nfaces as u32)
            .map(|fi| self.face_ring(fi.into(), nverts, centroids))
            .collect::<Result<Vec<_>>>()?;
        for ring in &rings {
            self.quadrangulate(ring)?;
        }
        Ok(())
    }

    fn subdivide_once(&mut self) -> Result<()> {
        // Everything below assumes a valid mesh, so check before changing it.
        self.check_topology()?;
        let nverts = self.num_vertices();
        let nhalfedges = self.num_halfedges();
        let nfaces = self.num_faces();
        self.topol.reserve(nfaces + nhalfedges / 2, nhalfedges * 3, nhalfedges - nfaces);
        let centroids = self.add_face_centroids();
        debug!("Added {} face points", centroids.len());
        self.split_edges_smoothed(nhalfedges, &centroids)?;
        debug!(
            "Added {} edge points",
            self.num_vertices() - nverts - centroids.len()
        );
        self.reposition_original_vertices(nverts, &centroids)?;
        self.quadrangulate_faces(nverts, nfaces, &centroids)?;
        debug!(
            "Subdivided into {} vertices, {} halfedges, {} faces",
            self.num_vertices(),
            self.num_halfedges(),
            self.num_faces()
        );
        self.topology_changed();
        Ok(())
    }

    /// Apply the given number of Catmull-Clark subdivision steps.
    ///
    /// Each step adds a vertex at the centroid of every face, splits every edge
    /// at a point smoothed with the adjacent centroids, moves the original
    /// vertices and replaces every face with one quad per side. Boundary edges
    /// are smoothed with their one adjacent centroid.
    ///
    /// ```
    /// use halfmesh::Mesh;
    ///
    /// let mut mesh = Mesh::unit_box()?;
    /// mesh.subdivide_catmull_clark(1)?;
    /// assert_eq!(mesh.num_vertices(), 26);
    /// assert_eq!(mesh.num_halfedges(), 96);
    /// assert_eq!(mesh.num_faces(), 24);
    /// mesh.check_topology()?;
    /// # Ok::<(), halfmesh::Error>(())
    /// ```
    pub fn subdivide_catmull_clark(&mut self, iterations: usize) -> Result<()> {
        for _ in 0..iterations {
            self.subdivide_once()?;
        }
        Ok(())
    }
}
