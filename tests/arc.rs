use {
    reclaim::{ArcReplacer, EvictError, EvictionPolicy, PageAccess},
    std::{sync::Arc, thread},
};

#[test]
fn basic_ops() {
    let replacer: ArcReplacer<u32, u64> = ArcReplacer::new(3);

    // Scenario: three cold misses fill the recency tier. Nothing is
    // evictable until the pool says so.
    replacer.record_access(0, 100).unwrap();
    replacer.record_access(1, 101).unwrap();
    replacer.record_access_with(2, 102, PageAccess::Scan).unwrap();
    assert_eq!(0, replacer.size());
    for frame in 0..3 {
        replacer.unpin(frame).unwrap();
    }
    assert_eq!(3, replacer.size());

    // Scenario: the oldest once-seen frame goes first.
    assert_eq!(Some(0), replacer.evict());
    assert_eq!(Some(1), replacer.evict());
    assert_eq!(1, replacer.size());

    // Scenario: re-hitting frame 2 promotes it to the frequency tier, so
    // it survives a new page streaming through the recency tier.
    replacer.record_access(2, 102).unwrap();
    replacer.record_access(0, 103).unwrap();
    replacer.unpin(0).unwrap();
    assert_eq!(2, replacer.size());
    assert_eq!(Some(0), replacer.evict());

    // Scenario: the frequency tier drains last.
    assert_eq!(1, replacer.size());
    assert_eq!(Some(2), replacer.evict());
    assert_eq!(0, replacer.size());
    assert_eq!(None, replacer.evict());
}

#[test]
fn miss_is_born_pinned() {
    let replacer: ArcReplacer<u32, u64> = ArcReplacer::new(3);

    replacer.record_access(0, 100).unwrap();
    assert_eq!(0, replacer.size());

    // Eviction finds nothing while the only frame is still loading.
    assert_eq!(None, replacer.evict());

    replacer.set_evictable(0, true).unwrap();
    assert_eq!(1, replacer.size());
    assert_eq!(Some(0), replacer.evict());
    assert_eq!(0, replacer.size());
}

#[test]
fn rehit_promotes_to_frequency_tier() {
    let replacer: ArcReplacer<u32, u64> = ArcReplacer::new(3);

    replacer.record_access(0, 100).unwrap();
    replacer.unpin(0).unwrap();
    replacer.record_access(0, 100).unwrap();
    assert_eq!(1, replacer.size());
    assert_eq!(Some(0), replacer.evict());

    // The page was evicted out of the frequency tier, so touching it again
    // must read as frequency-ghost feedback: the recency target stays at
    // zero, and the resurrected entry is born evictable.
    replacer.record_access(1, 100).unwrap();
    assert_eq!(0, replacer.mru_target_size());
    assert_eq!(1, replacer.size());
}

#[test]
fn recency_ghost_hit_grows_target() {
    let replacer: ArcReplacer<u32, u64> = ArcReplacer::new(3);

    replacer.record_access(0, 100).unwrap();
    replacer.unpin(0).unwrap();
    assert_eq!(Some(0), replacer.evict());
    assert_eq!(0, replacer.mru_target_size());

    // The same page comes back in a different frame: the recency tier was
    // too small, so the target grows by one, and the entry lands in the
    // frequency tier already evictable.
    replacer.record_access(1, 100).unwrap();
    assert_eq!(1, replacer.mru_target_size());
    assert_eq!(1, replacer.size());
}

#[test]
fn eviction_falls_back_when_preferred_side_is_pinned() {
    let replacer: ArcReplacer<u32, u64> = ArcReplacer::new(3);

    // Page 100 cycles through eviction and comes back, growing the recency
    // target to one and leaving frame 0 in the frequency tier.
    replacer.record_access(0, 100).unwrap();
    replacer.unpin(0).unwrap();
    assert_eq!(Some(0), replacer.evict());
    replacer.record_access(0, 100).unwrap();
    assert_eq!(1, replacer.mru_target_size());

    // Frame 1 sits alone in the recency tier, pinned.
    replacer.record_access(1, 101).unwrap();

    // The recency tier is the preferred side but its only frame is pinned:
    // eviction must fall back to the frequency tier instead of stalling.
    assert_eq!(Some(0), replacer.evict());

    // The page went to the frequency ghost, the side it actually came
    // from: touching it again shrinks the target back to zero.
    replacer.record_access(2, 100).unwrap();
    assert_eq!(0, replacer.mru_target_size());
    assert_eq!(1, replacer.size());
}

#[test]
fn remove_forgets_without_ghost() {
    let replacer: ArcReplacer<u32, u64> = ArcReplacer::new(3);

    replacer.record_access(0, 100).unwrap();
    replacer.unpin(0).unwrap();
    replacer.remove(0).unwrap();
    assert_eq!(0, replacer.size());

    // No ghost was left behind: the page coming back is a plain miss, so
    // the frame is born pinned and the target is untouched.
    replacer.record_access(1, 100).unwrap();
    assert_eq!(0, replacer.size());
    assert_eq!(0, replacer.mru_target_size());
}

#[test]
fn recency_ghost_tail_is_trimmed_at_capacity() {
    let replacer: ArcReplacer<u32, u64> = ArcReplacer::new(3);

    // Cycle three pages through frame 0 so the recency ghost list fills to
    // capacity.
    for page in [100, 101, 102] {
        replacer.record_access(0, page).unwrap();
        replacer.unpin(0).unwrap();
        assert_eq!(Some(0), replacer.evict());
    }

    // The next miss expires the oldest ghost, page 100.
    replacer.record_access(0, 103).unwrap();

    // Touching page 100 again is a plain miss: the target does not move.
    replacer.record_access(1, 100).unwrap();
    assert_eq!(0, replacer.mru_target_size());

    // Page 102 is still remembered, and hitting its ghost does move it.
    replacer.record_access(2, 102).unwrap();
    assert_eq!(1, replacer.mru_target_size());
}

#[test]
fn set_evictable_is_idempotent() {
    let replacer: ArcReplacer<u32, u64> = ArcReplacer::new(3);

    replacer.record_access(0, 100).unwrap();
    replacer.unpin(0).unwrap();
    replacer.unpin(0).unwrap();
    assert_eq!(1, replacer.size());

    replacer.pin(0).unwrap();
    replacer.pin(0).unwrap();
    assert_eq!(0, replacer.size());
}

#[test]
fn peek_does_not_commit() {
    let replacer: ArcReplacer<u32, u64> = ArcReplacer::new(3);

    replacer.record_access(0, 100).unwrap();
    replacer.unpin(0).unwrap();

    // Peeking names the victim without removing it.
    assert_eq!(Some(0), replacer.peek());
    assert_eq!(Some(0), replacer.peek());
    assert_eq!(1, replacer.size());

    assert_eq!(Some(0), replacer.evict());
    assert_eq!(None, replacer.peek());
}

#[test]
fn caller_contract_violations_are_reported() {
    let replacer: ArcReplacer<u32, u64> = ArcReplacer::new(3);

    assert_eq!(
        Err(EvictError::UnknownFrame(7)),
        replacer.set_evictable(7, true)
    );

    replacer.record_access(0, 100).unwrap();
    assert_eq!(Err(EvictError::PinnedFrameRemoval(0)), replacer.remove(0));

    // Removing a frame the replacer has never seen is a silent no-op.
    replacer.remove(9).unwrap();
    assert_eq!(3, replacer.capacity());
}

#[test]
fn parallel_callers() {
    let replacer: Arc<ArcReplacer<u32, u64>> = Arc::new(ArcReplacer::new(64));

    // Four workers each fetch and release sixteen distinct pages.
    let mut handles = vec![];
    for worker in 0..4u32 {
        let replacer = Arc::clone(&replacer);
        handles.push(thread::spawn(move || {
            for i in 0..16 {
                let frame = worker * 16 + i;
                let page = u64::from(frame) + 1_000;
                replacer.record_access(frame, page).unwrap();
                replacer.unpin(frame).unwrap();
            }
        }));
    }
    for handle in handles {
        handle.join().expect("thread panicked");
    }
    assert_eq!(64, replacer.size());

    // Four workers drain the pool in parallel: every frame is reclaimed
    // exactly once.
    let mut handles = vec![];
    for _ in 0..4 {
        let replacer = Arc::clone(&replacer);
        handles.push(thread::spawn(move || {
            let mut victims = vec![];
            for _ in 0..16 {
                victims.extend(replacer.evict());
            }
            victims
        }));
    }
    let mut victims: Vec<u32> = handles
        .into_iter()
        .flat_map(|handle| handle.join().expect("thread panicked"))
        .collect();
    victims.sort_unstable();
    assert_eq!((0..64).collect::<Vec<_>>(), victims);
    assert_eq!(0, replacer.size());
}
