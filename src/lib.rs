#![doc = include_str!("../README.md")]
#![deny(missing_docs)]
#![deny(elided_lifetimes_in_paths)]

mod error;
pub mod replacer;

use std::{error::Error, fmt, hash::Hash};

pub use {
    error::{EvictError, EvictResult},
    replacer::ArcReplacer,
};

/// Frame identifier type.
///
/// Conceptually, the replacement policy implementation is assumed to be a
/// fixed-size array of frames, where each frame represents a container that
/// holds some page of data. The frame identifier is an index into this array.
pub trait FrameId: Copy + Hash + Eq + fmt::Display + fmt::Debug {}

impl<T> FrameId for T where T: Copy + Hash + Eq + fmt::Display + fmt::Debug {}

/// Page identifier type.
///
/// Frames are recycled: the same frame holds different pages over time, so a
/// frame identifier stops meaning anything once the page is evicted. Policies
/// that remember evicted pages (such as ARC's ghost lists) key that memory on
/// the page identifier instead.
pub trait PageId: Copy + Hash + Eq + fmt::Display + fmt::Debug {}

impl<T> PageId for T where T: Copy + Hash + Eq + fmt::Display + fmt::Debug {}

/// Page access type.
///
/// When pages are accessed, some policies might log it differently based on
/// nature of the access. For example, a page might be accessed for reading a
/// single data point in it or for scanning of the whole page -- policies might
/// want to distinguish between these access patterns.
pub trait AccessType {}

/// Ready-made access taxonomy for callers without their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageAccess {
    /// Access of unspecified nature.
    Unknown,
    /// Point lookup of a single record.
    Lookup,
    /// Sequential scan over the whole page.
    Scan,
    /// Access on behalf of an index structure.
    Index,
}

impl AccessType for PageAccess {}

/// Page eviction policy.
///
/// Defines an interface for interacting with different page replacement
/// strategies. At its core, it provides methods for logging data access,
/// managing eviction eligibility, and eventually locating the next frame to
/// evict.
pub trait EvictionPolicy<F: FrameId, P: PageId> {
    /// Error type for the eviction policy.
    type Error: Error;

    /// Notifies the policy that the page held by `frame_id` has been
    /// referenced/accessed.
    ///
    /// The page identifier accompanies every access because the policy may
    /// remember pages past their eviction; an access to such a remembered
    /// page is feedback about the quality of that eviction.
    ///
    /// A page the policy has no memory of enters *not* evictable: the caller
    /// announces readiness separately via
    /// [`unpin`](EvictionPolicy::unpin)/[`set_evictable`](EvictionPolicy::set_evictable),
    /// typically once the page contents are fully loaded.
    fn record_access(&self, frame_id: F, page_id: P) -> Result<(), Self::Error>;

    /// Notifies the policy that the page held by `frame_id` has been
    /// referenced/accessed. In addition to mere occurrence of access, this
    /// method also logs the type of the access.
    fn record_access_with<T: AccessType>(
        &self,
        frame_id: F,
        page_id: P,
        access_type: T,
    ) -> Result<(), Self::Error>;

    /// Toggle whether `frame_id` may be selected as an eviction victim.
    ///
    /// Setting the current state again is a no-op. Fails with
    /// [`EvictError::UnknownFrame`] if the frame is not resident.
    fn set_evictable(&self, frame_id: F, evictable: bool) -> Result<(), Self::Error>;

    /// Pin a frame, marking it as non-evictable.
    ///
    /// If the frame is already pinned, nothing happens.
    fn pin(&self, frame_id: F) -> Result<(), Self::Error> {
        self.set_evictable(frame_id, false)
    }

    /// Unpin a frame, marking it as evictable.
    ///
    /// If the frame is already unpinned, nothing happens.
    fn unpin(&self, frame_id: F) -> Result<(), Self::Error> {
        self.set_evictable(frame_id, true)
    }

    /// Find the next frame to be evicted and evict it.
    ///
    /// Only non-pinned frames are candidates for eviction. `None` means no
    /// frame is currently eligible -- that is an ordinary answer, not an
    /// error.
    fn evict(&self) -> Option<F>;

    /// Peek into the next frame to be evicted.
    ///
    /// This function does not remove the frame from the policy's state.
    fn peek(&self) -> Option<F>;

    /// Removes an evictable frame.
    ///
    /// In contrast to [`evict`](EvictionPolicy::evict), this function removes
    /// a caller-chosen frame, not the one the policy would pick, and the
    /// policy forgets the page entirely instead of remembering it as recently
    /// evicted.
    ///
    /// Removing a pinned frame fails with [`EvictError::PinnedFrameRemoval`];
    /// removing a frame the policy does not know is a silent no-op.
    fn remove(&self, frame_id: F) -> Result<(), Self::Error>;

    /// Returns the maximum number of frames that can be resident.
    fn capacity(&self) -> usize;

    /// The number of frames that can be evicted right now.
    /// Essentially, this is the number of non-pinned resident frames.
    fn size(&self) -> usize;
}
