use super::constants::UiConstant;
use super::upload_buffer::{BufferOverflow, UploadBuffer};
use crate::ui::{Element, Muid};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectError {
    /// The first `emitted` records were written before the sink filled up.
    #[error("ui sink overflowed after {emitted} records")]
    Overflow {
        emitted: usize,
        #[source]
        overflow: BufferOverflow,
    },
    #[error("element {muid} has not been laid out")]
    NotLaidOut { muid: Muid },
}

/// Destination for UI constant records, in draw order.
pub trait UiSink {
    fn push(&mut self, record: UiConstant) -> Result<(), BufferOverflow>;
}

/// Fills an upload buffer from slot 0.
pub struct UiBufferWriter<'a> {
    buffer: &'a mut UploadBuffer<UiConstant>,
    written: usize,
}

impl<'a> UiBufferWriter<'a> {
    pub fn new(buffer: &'a mut UploadBuffer<UiConstant>) -> Self {
        Self { buffer, written: 0 }
    }

    pub fn written(&self) -> usize {
        self.written
    }
}

impl UiSink for UiBufferWriter<'_> {
    fn push(&mut self, record: UiConstant) -> Result<(), BufferOverflow> {
        self.buffer.copy_data(self.written, &record)?;
        self.written += 1;
        Ok(())
    }
}

/// Growable record list with a hard capacity.
#[derive(Debug, Clone, Default)]
pub struct UiRecords {
    records: Vec<UiConstant>,
    capacity: usize,
}

impl UiRecords {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::new(),
            capacity,
        }
    }

    pub fn as_slice(&self) -> &[UiConstant] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

impl UiSink for UiRecords {
    fn push(&mut self, record: UiConstant) -> Result<(), BufferOverflow> {
        if self.records.len() >= self.capacity {
            return Err(BufferOverflow {
                index: self.records.len(),
                len: 1,
                capacity: self.capacity,
            });
        }
        self.records.push(record);
        Ok(())
    }
}

/// Emits the laid-out tree as UI records in pre-order.
///
/// An element with any border emits its full rectangle in `border_color`
/// followed by the border-inset rectangle in `background_color`; otherwise a
/// single full rectangle in `background_color`. A disabled element is skipped
/// together with all of its descendants.
pub fn project(root: &Element, sink: &mut dyn UiSink) -> Result<usize, ProjectError> {
    let viewport = root
        .size_in_display()
        .ok_or(ProjectError::NotLaidOut { muid: root.muid })?;
    let mut emitted = 0usize;
    let mut emit = |record: UiConstant, emitted: &mut usize| {
        sink.push(record).map_err(|overflow| ProjectError::Overflow {
            emitted: *emitted,
            overflow,
        })?;
        *emitted += 1;
        Ok::<(), ProjectError>(())
    };

    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if !node.is_enabled() {
            continue;
        }
        let rect = node
            .size_in_display()
            .ok_or(ProjectError::NotLaidOut { muid: node.muid })?;
        if node.has_border() {
            emit(UiConstant::from_rect(&rect, &viewport, node.border_color), &mut emitted)?;
            let inner = rect.inset(&node.border);
            emit(UiConstant::from_rect(&inner, &viewport, node.background_color), &mut emitted)?;
        } else {
            emit(UiConstant::from_rect(&rect, &viewport, node.background_color), &mut emitted)?;
        }
        stack.extend(node.children.iter().rev());
    }
    Ok(emitted)
}
