use super::aabb::Aabb;
use crate::config::BroadPhaseType;
use crate::utils::allocator::{Arena, ProxyHandle, ShapeHandle};

/// Broad-phase entry owned by exactly one shape.
#[derive(Debug, Clone, Copy)]
pub struct Proxy {
    pub shape: ShapeHandle,
    pub aabb: Aabb,
}

/// Broad phase driver returning overlapping shape pairs.
pub struct BroadPhase {
    kind: BroadPhaseType,
    proxies: Arena<Proxy, ProxyHandle>,
    /// Proxies ordered by `aabb.min.x`, kept nearly sorted between steps.
    sorted: Vec<ProxyHandle>,
    test_count: usize,
}

impl BroadPhase {
    pub fn new(kind: BroadPhaseType) -> Self {
        Self {
            kind,
            proxies: Arena::new(),
            sorted: Vec::new(),
            test_count: 0,
        }
    }

    pub fn kind(&self) -> BroadPhaseType {
        self.kind
    }

    pub fn create_proxy(&mut self, shape: ShapeHandle, aabb: Aabb) -> ProxyHandle {
        let handle = self.proxies.insert(Proxy { shape, aabb });
        self.sorted.push(handle);
        handle
    }

    /// Returns `false` when the proxy is unknown.
    pub fn update_proxy(&mut self, handle: ProxyHandle, aabb: Aabb) -> bool {
        match self.proxies.get_mut(handle) {
            Some(proxy) => {
                proxy.aabb = aabb;
                true
            }
            None => false,
        }
    }

    pub fn remove_proxy(&mut self, handle: ProxyHandle) -> Option<Proxy> {
        let proxy = self.proxies.remove(handle)?;
        self.sorted.retain(|&h| h != handle);
        Some(proxy)
    }

    pub fn proxy(&self, handle: ProxyHandle) -> Option<&Proxy> {
        self.proxies.get(handle)
    }

    pub fn proxy_count(&self) -> usize {
        self.proxies.len()
    }

    /// AABB tests performed by the last `collect_pairs`.
    pub fn test_count(&self) -> usize {
        self.test_count
    }

    /// Fills `out` with every overlapping shape pair, lower handle first, sorted.
    pub fn collect_pairs(&mut self, out: &mut Vec<(ShapeHandle, ShapeHandle)>) {
        out.clear();
        self.test_count = 0;
        match self.kind {
            BroadPhaseType::BruteForce => self.brute_force(out),
            BroadPhaseType::SweepAndPrune => self.sweep_and_prune(out),
        }
        out.sort_unstable();
        out.dedup();
    }

    fn brute_force(&mut self, out: &mut Vec<(ShapeHandle, ShapeHandle)>) {
        let proxies: Vec<Proxy> = self.proxies.values().copied().collect();
        for (i, a) in proxies.iter().enumerate() {
            for b in &proxies[i + 1..] {
                self.test_count += 1;
                if a.aabb.overlaps(&b.aabb) {
                    out.push(canonical(a.shape, b.shape));
                }
            }
        }
    }

    fn sweep_and_prune(&mut self, out: &mut Vec<(ShapeHandle, ShapeHandle)>) {
        let proxies = &self.proxies;
        let min_x = |h: ProxyHandle| proxies.get(h).map_or(f32::MAX, |p| p.aabb.min.x);

        // Insertion sort: cheap because order barely changes between steps.
        for i in 1..self.sorted.len() {
            let mut j = i;
            while j > 0 && min_x(self.sorted[j - 1]) > min_x(self.sorted[j]) {
                self.sorted.swap(j - 1, j);
                j -= 1;
            }
        }

        let ordered: Vec<Proxy> = self
            .sorted
            .iter()
            .filter_map(|&h| proxies.get(h).copied())
            .collect();
        for (i, a) in ordered.iter().enumerate() {
            for b in &ordered[i + 1..] {
                if b.aabb.min.x > a.aabb.max.x {
                    break;
                }
                self.test_count += 1;
                if a.aabb.overlaps(&b.aabb) {
                    out.push(canonical(a.shape, b.shape));
                }
            }
        }
    }
}

fn canonical(a: ShapeHandle, b: ShapeHandle) -> (ShapeHandle, ShapeHandle) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}
