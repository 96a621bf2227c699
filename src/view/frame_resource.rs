use super::command::{CommandAllocator, CommandList};
use super::constants::{ObjectConstants, PassConstants, UiConstant};
use super::timeline::{GpuTimeline, SyncError};
use super::upload_buffer::UploadBuffer;
use crate::terrain::{GRID_VERTEX_COUNT, VertexForMap};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameResourceDesc {
    pub pass_count: usize,
    pub object_capacity: usize,
    pub ui_capacity: usize,
}

/// Everything one in-flight frame writes: command memory plus its own copy
/// of every CPU-written GPU buffer.
pub struct FrameResourceSet<A = CommandList> {
    pub allocator: A,
    pub pass_cb: UploadBuffer<PassConstants>,
    pub object_cb: UploadBuffer<ObjectConstants>,
    pub ui_cb: UploadBuffer<UiConstant>,
    pub terrain_vb: UploadBuffer<VertexForMap>,
    fence: u64,
}

impl<A> FrameResourceSet<A> {
    fn new(allocator: A, desc: &FrameResourceDesc) -> Self {
        Self {
            allocator,
            pass_cb: UploadBuffer::new(desc.pass_count, true),
            object_cb: UploadBuffer::new(desc.object_capacity, true),
            ui_cb: UploadBuffer::new(desc.ui_capacity, true),
            terrain_vb: UploadBuffer::new(GRID_VERTEX_COUNT, false),
            fence: 0,
        }
    }

    /// 0 until the set is first submitted.
    pub fn fence(&self) -> u64 {
        self.fence
    }
}

/// Round-robin owner of the frame resource sets.
///
/// `advance` moves to the next set and blocks until the GPU has retired the
/// work last submitted from it; `submit` stamps the current set with a new
/// fence value and signals it on the timeline.
pub struct FrameResources<A: CommandAllocator = CommandList> {
    sets: Vec<FrameResourceSet<A>>,
    current: usize,
    current_fence: u64,
    waits: u64,
    timeline: Box<dyn GpuTimeline>,
}

impl FrameResources<CommandList> {
    pub fn new(count: usize, desc: FrameResourceDesc, timeline: Box<dyn GpuTimeline>) -> Self {
        Self::with_allocators(count, desc, timeline, CommandList::new)
    }
}

impl<A: CommandAllocator> FrameResources<A> {
    pub fn with_allocators(
        count: usize,
        desc: FrameResourceDesc,
        timeline: Box<dyn GpuTimeline>,
        mut make_allocator: impl FnMut() -> A,
    ) -> Self {
        let count = count.max(1);
        let sets = (0..count)
            .map(|_| FrameResourceSet::new(make_allocator(), &desc))
            .collect();
        Self {
            sets,
            // First `advance` lands on set 0.
            current: count - 1,
            current_fence: 0,
            waits: 0,
            timeline,
        }
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> &FrameResourceSet<A> {
        &self.sets[self.current]
    }

    pub fn current_mut(&mut self) -> &mut FrameResourceSet<A> {
        &mut self.sets[self.current]
    }

    pub fn sets(&self) -> &[FrameResourceSet<A>] {
        &self.sets
    }

    /// Last fence value handed out by `submit`.
    pub fn current_fence(&self) -> u64 {
        self.current_fence
    }

    /// Number of `advance` calls that had to block.
    pub fn wait_count(&self) -> u64 {
        self.waits
    }

    pub fn timeline(&self) -> &dyn GpuTimeline {
        self.timeline.as_ref()
    }

    pub fn advance(&mut self) -> Result<&mut FrameResourceSet<A>, SyncError> {
        let next = (self.current + 1) % self.sets.len();
        let fence = self.sets[next].fence;
        if !self.wait_until_retired(fence, None)? {
            return Err(SyncError::WaitAbandoned(fence));
        }
        self.current = next;
        Ok(&mut self.sets[next])
    }

    /// Like [`advance`](Self::advance) but gives up after `timeout`. On
    /// timeout the current set is unchanged and `Ok(None)` is returned.
    pub fn advance_timeout(
        &mut self,
        timeout: Duration,
    ) -> Result<Option<&mut FrameResourceSet<A>>, SyncError> {
        let next = (self.current + 1) % self.sets.len();
        let fence = self.sets[next].fence;
        if !self.wait_until_retired(fence, Some(timeout))? {
            log::debug!("frame resource {next} still busy (fence {fence})");
            return Ok(None);
        }
        self.current = next;
        Ok(Some(&mut self.sets[next]))
    }

    fn wait_until_retired(&mut self, fence: u64, timeout: Option<Duration>) -> Result<bool, SyncError> {
        if fence == 0 || self.timeline.completed_value() >= fence {
            return Ok(true);
        }
        self.waits += 1;
        log::trace!("waiting for gpu fence {fence}");
        self.timeline.wait_for(fence, timeout)
    }

    /// Marks commands recorded into the current set with the next fence
    /// value and enqueues the matching signal.
    pub fn submit(&mut self) -> Result<u64, SyncError> {
        let fence = self.current_fence + 1;
        self.timeline.signal(fence)?;
        self.current_fence = fence;
        self.sets[self.current].fence = fence;
        Ok(fence)
    }

    /// Waits for every submitted frame to finish.
    pub fn flush(&mut self) -> Result<(), SyncError> {
        if self.current_fence == 0 {
            return Ok(());
        }
        if self.timeline.wait_for(self.current_fence, None)? {
            Ok(())
        } else {
            Err(SyncError::WaitAbandoned(self.current_fence))
        }
    }
}
