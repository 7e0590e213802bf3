use crate::{
    element::{FH, HH, VH},
    topol::Topology,
};

/// Follows `next` links around a loop. Stops when it gets back to the start,
/// when a link is missing, or after visiting every halfedge once, whichever
/// comes first. Use [`Topology::collect_loop`] when a broken loop must be
/// reported instead.
struct LoopIter<'a> {
    topol: &'a Topology,
    hstart: HH,
    hcurrent: Option<HH>,
    remaining: usize,
}

impl Iterator for LoopIter<'_> {
    type Item = HH;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.hcurrent?;
        if self.remaining == 0 {
            self.hcurrent = None;
            return None;
        }
        self.remaining -= 1;
        self.hcurrent = match self.topol.next_halfedge(current) {
            Ok(next) if next != self.hstart => Some(next),
            _ => None,
        };
        Some(current)
    }
}

/// Walks the halfedges pointing at a vertex. Around an interior vertex this
/// goes `h -> next(h) -> sym`. When a missing sym reveals a boundary, the walk
/// restarts from the first halfedge and goes the other way,
/// `h -> sym(h) -> prev`.
struct IncomingHalfedgeIter<'a> {
    topol: &'a Topology,
    hstart: Option<HH>,
    hcurrent: Option<HH>,
    forward: bool,
    remaining: usize,
}

impl IncomingHalfedgeIter<'_> {
    fn step_forward(&self, h: HH) -> Option<HH> {
        self.topol
            .next_halfedge(h)
            .ok()
            .and_then(|n| self.topol.sym_halfedge(n))
    }

    fn step_backward(&self, h: HH) -> Option<HH> {
        self.topol
            .sym_halfedge(h)
            .and_then(|s| self.topol.prev_halfedge(s).ok())
    }
}

impl Iterator for IncomingHalfedgeIter<'_> {
    type Item = HH;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.hcurrent?;
        let start = self.hstart?;
        if self.remaining == 0 {
            self.hcurrent = None;
            return None;
        }
        self.remaining -= 1;
        self.hcurrent = if self.forward {
            match self.step_forward(current) {
                Some(next) if next == start => None,
                Some(next) => Some(next),
                None => {
                    self.forward = false;
                    self.step_backward(start)
                }
            }
        } else {
            self.step_backward(current)
        };
        Some(current)
    }
}

pub(crate) fn loop_iter(topol: &Topology, h: HH) -> impl Iterator<Item = HH> + use<'_> {
    LoopIter {
        topol,
        hstart: h,
        hcurrent: Some(h),
        remaining: topol.num_halfedges(),
    }
}

/// Halfedges around `f`. Empty if the face has no halfedge.
pub(crate) fn fh_iter(topol: &Topology, f: FH) -> impl Iterator<Item = HH> + use<'_> {
    topol
        .face_halfedge(f)
        .ok()
        .into_iter()
        .flat_map(move |h| loop_iter(topol, h))
}

pub(crate) fn fv_iter(topol: &Topology, f: FH) -> impl Iterator<Item = VH> + use<'_> {
    fh_iter(topol, f).filter_map(|h| topol.head_vertex(h).ok())
}

pub(crate) fn vih_iter(topol: &Topology, v: VH) -> impl Iterator<Item = HH> + use<'_> {
    let h = topol.vertex_halfedge(v);
    IncomingHalfedgeIter {
        topol,
        hstart: h,
        hcurrent: h,
        forward: true,
        remaining: topol.num_halfedges(),
    }
}

pub(crate) fn vf_iter(topol: &Topology, v: VH) -> impl Iterator<Item = FH> + use<'_> {
    vih_iter(topol, v).filter_map(|h| topol.halfedge_face(h).ok())
}

/// Distinct vertices that share an edge with `v`, in circulation order.
///
/// Each incoming halfedge contributes its tail, and the halfedge after it
/// contributes its head. On the boundary this also picks up the far end of
/// the dangling outgoing edge.
pub(crate) fn vv_neighbors(topol: &Topology, v: VH) -> Vec<VH> {
    let mut out: Vec<VH> = Vec::new();
    for h in vih_iter(topol, v) {
        let tail = topol.tail_vertex(h).ok();
        let ahead = topol
            .next_halfedge(h)
            .and_then(|n| topol.head_vertex(n))
            .ok();
        for nv in [tail, ahead].into_iter().flatten() {
            if nv != v && !out.contains(&nv) {
                out.push(nv);
            }
        }
    }
    out
}
