/// Hands out the identities of the records of one mesh or skeleton.
///
/// Every store owns its own generators, so independent meshes never share
/// counters. Clearing the store resets the generator to its base.
#[derive(Debug, Clone)]
pub struct IdGen {
    base: u32,
    next: u32,
}

impl IdGen {
    pub const fn new(base: u32) -> Self {
        IdGen { base, next: base }
    }

    pub fn next_id(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// The id the next record will receive.
    pub fn peek(&self) -> u32 {
        self.next
    }

    pub fn reset(&mut self) {
        self.next = self.base;
    }
}

#[cfg(test)]
mod test {
    use super::IdGen;

    #[test]
    fn t_ids_restart_at_base() {
        let mut ids = IdGen::new(1);
        assert_eq!((1..4).collect::<Vec<_>>(), [ids.next_id(), ids.next_id(), ids.next_id()]);
        assert_eq!(ids.peek(), 4);
        ids.reset();
        assert_eq!(ids.next_id(), 1);
        let mut other = IdGen::new(0);
        assert_eq!(other.next_id(), 0);
        assert_eq!(ids.next_id(), 2);
    }
}
