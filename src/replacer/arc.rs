//! Adaptive Replacement Cache (ARC) frame replacer.
//!
//! The algorithm implemented here is based on the
//! [ARC paper](https://www.usenix.org/conference/fast-03/arc-self-tuning-low-overhead-replacement-cache),
//! reworked around the pinning protocol of a database buffer pool. Two
//! deviations from the paper:
//!
//! 1. When the recency tier is exactly at its target size, the victim is
//!    always taken from the recency tier. The paper breaks the tie on the
//!    most recent access, but states the choice is arbitrary.
//! 2. Pinned frames are skipped during victim search. If every frame on the
//!    preferred side is pinned, the other side is searched instead, and the
//!    victim's page is remembered by the ghost list of the side it was
//!    actually taken from, so the feedback stays accurate.

use {
    crate::{AccessType, EvictError, EvictResult, EvictionPolicy, FrameId, PageId},
    parking_lot::RwLock,
    std::{
        collections::{HashMap, VecDeque},
        sync::Arc,
    },
};

/// Resident tier of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tier {
    /// Seen exactly once recently.
    Mru,
    /// Seen at least twice recently.
    Mfu,
}

/// Ghost tier remembering the identity of an evicted page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GhostTier {
    MruGhost,
    MfuGhost,
}

/// A frame that currently holds a page.
#[derive(Debug)]
struct Resident<P> {
    page_id: P,
    evictable: bool,
    tier: Tier,
}

/// Implements the ARC page replacement algorithm.
pub struct ArcReplacer<F: FrameId, P: PageId> {
    inner: Arc<RwLock<Inner<F, P>>>,
}

struct Inner<F: FrameId, P: PageId> {
    /// Maximum number of resident frames.
    capacity: usize,

    /// Number of resident frames that are currently evictable.
    curr_size: usize,

    /// Target size of the recency tier. Grows on recency-ghost hits and
    /// shrinks on frequency-ghost hits; always within `[0, capacity]`.
    mru_target: usize,

    /// Resident frames seen once recently. Front is most recent, eviction
    /// scans from the back.
    mru: VecDeque<F>,

    /// Resident frames seen at least twice recently.
    mfu: VecDeque<F>,

    /// Pages recently evicted from `mru`.
    mru_ghost: VecDeque<P>,

    /// Pages recently evicted from `mfu`.
    mfu_ghost: VecDeque<P>,

    /// Authoritative index of resident frames. The deques above carry
    /// navigational order only.
    alive: HashMap<F, Resident<P>>,

    /// Authoritative index of remembered (ghost) pages.
    ghost: HashMap<P, GhostTier>,
}

impl<F: FrameId, P: PageId> ArcReplacer<F, P> {
    /// Creates a new ARC replacer for a pool of `capacity` frames, with all
    /// catalogs empty and the recency target at zero.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner {
                capacity,
                curr_size: 0,
                mru_target: 0,
                mru: VecDeque::new(),
                mfu: VecDeque::new(),
                mru_ghost: VecDeque::new(),
                mfu_ghost: VecDeque::new(),
                alive: HashMap::with_capacity(capacity),
                ghost: HashMap::with_capacity(capacity),
            })),
        }
    }

    /// Current target size of the recency tier -- the `p` parameter of the
    /// ARC paper. Exposed for observability; the value moves only on ghost
    /// hits.
    pub fn mru_target_size(&self) -> usize {
        self.inner.read().mru_target
    }
}

impl<F: FrameId, P: PageId> Inner<F, P> {
    fn record_access(&mut self, frame_id: F, page_id: P) {
        // Case 1: the frame is resident. A once-seen entry is promoted to
        // the frequency tier, a frequent entry is refreshed; either way the
        // entry ends up at the front of `mfu`.
        if let Some(entry) = self.alive.get_mut(&frame_id) {
            debug_assert_eq!(
                entry.page_id, page_id,
                "frame {frame_id} re-accessed with a different page"
            );
            let from = entry.tier;
            entry.tier = Tier::Mfu;
            self.detach(from, frame_id);
            self.mfu.push_front(frame_id);
            return;
        }

        match self.ghost.get(&page_id).copied() {
            // Case 2: the page was recently evicted from the recency tier,
            // so the recency tier is too small for this workload. Grow the
            // target, weighted by how lopsided the ghost lists are.
            Some(GhostTier::MruGhost) => {
                let delta = if self.mru_ghost.len() >= self.mfu_ghost.len() {
                    1
                } else {
                    self.mfu_ghost.len() / self.mru_ghost.len()
                };
                self.mru_target = usize::min(self.capacity, self.mru_target + delta);
                self.forget_ghost(page_id);
                self.resurrect(frame_id, page_id);
            }
            // Case 3: recently evicted from the frequency tier. Shrink the
            // recency target symmetrically.
            Some(GhostTier::MfuGhost) => {
                let delta = if self.mfu_ghost.len() >= self.mru_ghost.len() {
                    1
                } else {
                    self.mru_ghost.len() / self.mfu_ghost.len()
                };
                self.mru_target = self.mru_target.saturating_sub(delta);
                self.forget_ghost(page_id);
                self.resurrect(frame_id, page_id);
            }
            // Case 4: a true miss.
            None => self.admit(frame_id, page_id),
        }
    }

    /// Admits a never-seen page into the recency tier, trimming the ghost
    /// lists first so the four catalogs stay within twice the capacity.
    fn admit(&mut self, frame_id: F, page_id: P) {
        if self.mru.len() + self.mru_ghost.len() == self.capacity {
            if let Some(page) = self.mru_ghost.pop_back() {
                self.ghost.remove(&page);
            } else if let Some(stale) = self.mru.pop_back() {
                // The recency tier alone is at capacity: the pool is forcing
                // an insert without having evicted first. Give up the coldest
                // recency slot, without leaving a ghost behind.
                if let Some(entry) = self.alive.remove(&stale) {
                    if entry.evictable {
                        self.curr_size -= 1;
                    }
                }
            }
        } else if self.total_len() == 2 * self.capacity {
            if let Some(page) = self.mfu_ghost.pop_back() {
                self.ghost.remove(&page);
            }
        }

        // Born pinned: the pool flips the flag once the page is coherent.
        self.mru.push_front(frame_id);
        self.alive.insert(
            frame_id,
            Resident {
                page_id,
                evictable: false,
                tier: Tier::Mru,
            },
        );
    }

    /// Re-admits a page that was remembered as a ghost. Proven reuse goes
    /// straight into the frequency tier, born evictable.
    fn resurrect(&mut self, frame_id: F, page_id: P) {
        self.mfu.push_front(frame_id);
        self.alive.insert(
            frame_id,
            Resident {
                page_id,
                evictable: true,
                tier: Tier::Mfu,
            },
        );
        self.curr_size += 1;
    }

    fn evict(&mut self) -> Option<F> {
        let (frame_id, tier) = self.find_victim()?;
        self.detach(tier, frame_id);
        let Some(entry) = self.alive.remove(&frame_id) else {
            debug_assert!(false, "victim {frame_id} missing from the alive index");
            return None;
        };
        // The ghost records which side the frame actually came from, not
        // which side was preferred.
        match tier {
            Tier::Mru => {
                self.mru_ghost.push_front(entry.page_id);
                self.ghost.insert(entry.page_id, GhostTier::MruGhost);
            }
            Tier::Mfu => {
                self.mfu_ghost.push_front(entry.page_id);
                self.ghost.insert(entry.page_id, GhostTier::MfuGhost);
            }
        }
        self.curr_size -= 1;
        Some(frame_id)
    }

    /// Two-phase victim search. The recency tier is preferred while it sits
    /// at or above its target size; within a tier, the oldest evictable
    /// frame wins. A side whose frames are all pinned never blocks progress:
    /// the search falls through to the other side.
    fn find_victim(&self) -> Option<(F, Tier)> {
        if self.curr_size == 0 {
            return None;
        }
        let order = if self.mru.len() >= self.mru_target {
            [Tier::Mru, Tier::Mfu]
        } else {
            [Tier::Mfu, Tier::Mru]
        };
        for tier in order {
            let list = match tier {
                Tier::Mru => &self.mru,
                Tier::Mfu => &self.mfu,
            };
            let victim = list
                .iter()
                .rev()
                .find(|&&id| self.alive.get(&id).is_some_and(|entry| entry.evictable));
            if let Some(&frame_id) = victim {
                return Some((frame_id, tier));
            }
        }
        None
    }

    fn set_evictable(&mut self, frame_id: F, evictable: bool) -> EvictResult<(), F> {
        let entry = self
            .alive
            .get_mut(&frame_id)
            .ok_or(EvictError::UnknownFrame(frame_id))?;

        // No-op if the frame is already in the desired state.
        if entry.evictable == evictable {
            return Ok(());
        }

        entry.evictable = evictable;
        if evictable {
            self.curr_size += 1;
        } else {
            self.curr_size -= 1;
        }
        Ok(())
    }

    fn remove(&mut self, frame_id: F) -> EvictResult<(), F> {
        let Some(entry) = self.alive.get(&frame_id) else {
            return Ok(());
        };
        if !entry.evictable {
            return Err(EvictError::PinnedFrameRemoval(frame_id));
        }

        // The page is being forgotten intentionally, not evicted for
        // replacement, so no ghost entry is left behind.
        let tier = entry.tier;
        self.detach(tier, frame_id);
        self.alive.remove(&frame_id);
        self.curr_size -= 1;
        Ok(())
    }

    /// Unlinks a resident frame from its tier's order.
    fn detach(&mut self, tier: Tier, frame_id: F) {
        let list = match tier {
            Tier::Mru => &mut self.mru,
            Tier::Mfu => &mut self.mfu,
        };
        let pos = list.iter().position(|&id| id == frame_id);
        debug_assert!(pos.is_some(), "resident frame {frame_id} missing from its catalog");
        if let Some(pos) = pos {
            list.remove(pos);
        }
    }

    /// Drops a page from its ghost list and the ghost index.
    fn forget_ghost(&mut self, page_id: P) {
        let Some(tier) = self.ghost.remove(&page_id) else {
            debug_assert!(false, "page {page_id} missing from the ghost index");
            return;
        };
        let list = match tier {
            GhostTier::MruGhost => &mut self.mru_ghost,
            GhostTier::MfuGhost => &mut self.mfu_ghost,
        };
        let pos = list.iter().position(|&id| id == page_id);
        debug_assert!(pos.is_some(), "ghost page {page_id} missing from its catalog");
        if let Some(pos) = pos {
            list.remove(pos);
        }
    }

    fn total_len(&self) -> usize {
        self.mru.len() + self.mfu.len() + self.mru_ghost.len() + self.mfu_ghost.len()
    }

    /// Sanity check of the index bookkeeping, run after every mutation.
    /// Compiles to nothing in release builds.
    fn check_consistency(&self) {
        debug_assert!(self.mru_target <= self.capacity);
        debug_assert_eq!(self.alive.len(), self.mru.len() + self.mfu.len());
        debug_assert_eq!(self.ghost.len(), self.mru_ghost.len() + self.mfu_ghost.len());
        debug_assert_eq!(
            self.curr_size,
            self.alive.values().filter(|entry| entry.evictable).count()
        );
        debug_assert!(
            self.alive
                .values()
                .all(|entry| !self.ghost.contains_key(&entry.page_id))
        );
    }
}

impl<F: FrameId, P: PageId> EvictionPolicy<F, P> for ArcReplacer<F, P> {
    type Error = EvictError<F>;

    fn record_access(&self, frame_id: F, page_id: P) -> EvictResult<(), F> {
        let mut inner = self.inner.write();
        inner.record_access(frame_id, page_id);
        inner.check_consistency();
        Ok(())
    }

    fn record_access_with<T: AccessType>(
        &self,
        frame_id: F,
        page_id: P,
        _access_type: T,
    ) -> EvictResult<(), F> {
        // The core algorithm does not differentiate access types.
        self.record_access(frame_id, page_id)
    }

    fn set_evictable(&self, frame_id: F, evictable: bool) -> EvictResult<(), F> {
        let mut inner = self.inner.write();
        let res = inner.set_evictable(frame_id, evictable);
        inner.check_consistency();
        res
    }

    fn evict(&self) -> Option<F> {
        let mut inner = self.inner.write();
        let victim = inner.evict();
        inner.check_consistency();
        victim
    }

    fn peek(&self) -> Option<F> {
        self.inner.read().find_victim().map(|(frame_id, _)| frame_id)
    }

    fn remove(&self, frame_id: F) -> EvictResult<(), F> {
        let mut inner = self.inner.write();
        let res = inner.remove(frame_id);
        inner.check_consistency();
        res
    }

    fn capacity(&self) -> usize {
        self.inner.read().capacity
    }

    fn size(&self) -> usize {
        self.inner.read().curr_size
    }
}
