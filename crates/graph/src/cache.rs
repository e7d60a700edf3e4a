use std::collections::HashMap;

/// Memoized shortest paths keyed by (origin, destination) local indices.
///
/// No wall-clock expiry: entries stay valid until an external condition
/// (panel visibility, search text, origin, path budget) shifts, at which
/// point the owning frame loop calls [`PathCache::invalidate_all`]. The
/// generation counter exists so owners can observe that a wipe happened
/// and so stale-index bugs surface in diagnostics instead of silently
/// resurrecting a previous frame's indexing.
#[derive(Debug, Default)]
pub struct PathCache {
    entries: HashMap<(u32, u32), Vec<u32>>,
    generation: u64,
}

impl PathCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, origin: u32, dest: u32) -> Option<&[u32]> {
        self.entries.get(&(origin, dest)).map(Vec::as_slice)
    }

    pub fn put(&mut self, origin: u32, dest: u32, path: Vec<u32>) {
        self.entries.insert((origin, dest), path);
    }

    /// Wipe every entry and advance the generation.
    pub fn invalidate_all(&mut self) {
        self.entries.clear();
        self.generation += 1;
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
