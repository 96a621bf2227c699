use bytemuck::Pod;
use std::marker::PhantomData;
use thiserror::Error;

/// Hardware constant-buffer views must start on 256-byte boundaries.
pub const CONSTANT_BUFFER_ALIGNMENT: usize = 256;

pub const fn constant_buffer_byte_size(size: usize) -> usize {
    (size + CONSTANT_BUFFER_ALIGNMENT - 1) & !(CONSTANT_BUFFER_ALIGNMENT - 1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("upload buffer overflow: slot {index} (+{len}) exceeds capacity {capacity}")]
pub struct BufferOverflow {
    pub index: usize,
    pub len: usize,
    pub capacity: usize,
}

/// CPU-visible staging memory holding `capacity` elements of `T`.
///
/// Constant buffers pad every element to a 256-byte stride; vertex buffers
/// are tightly packed. Writes past the end fail with [`BufferOverflow`].
pub struct UploadBuffer<T: Pod> {
    bytes: Vec<u8>,
    capacity: usize,
    stride: usize,
    _marker: PhantomData<T>,
}

impl<T: Pod> UploadBuffer<T> {
    pub fn new(capacity: usize, is_constant_buffer: bool) -> Self {
        let stride = if is_constant_buffer {
            constant_buffer_byte_size(size_of::<T>())
        } else {
            size_of::<T>()
        };
        Self {
            bytes: vec![0; capacity * stride],
            capacity,
            stride,
            _marker: PhantomData,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Byte offset of slot `index`, as bound by the renderer.
    pub fn offset_of(&self, index: usize) -> usize {
        index * self.stride
    }

    pub fn copy_data(&mut self, index: usize, value: &T) -> Result<(), BufferOverflow> {
        if index >= self.capacity {
            return Err(BufferOverflow {
                index,
                len: 1,
                capacity: self.capacity,
            });
        }
        let start = index * self.stride;
        self.bytes[start..start + size_of::<T>()].copy_from_slice(bytemuck::bytes_of(value));
        Ok(())
    }

    /// Writes `values` into consecutive slots starting at `first`. Nothing is
    /// written when the range does not fit.
    pub fn copy_slice(&mut self, first: usize, values: &[T]) -> Result<(), BufferOverflow> {
        if first + values.len() > self.capacity {
            return Err(BufferOverflow {
                index: first,
                len: values.len(),
                capacity: self.capacity,
            });
        }
        if self.stride == size_of::<T>() {
            let start = first * self.stride;
            let src: &[u8] = bytemuck::cast_slice(values);
            self.bytes[start..start + src.len()].copy_from_slice(src);
            return Ok(());
        }
        for (i, value) in values.iter().enumerate() {
            self.copy_data(first + i, value)?;
        }
        Ok(())
    }

    pub fn read(&self, index: usize) -> Option<T> {
        if index >= self.capacity {
            return None;
        }
        let start = index * self.stride;
        Some(bytemuck::pod_read_unaligned(
            &self.bytes[start..start + size_of::<T>()],
        ))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl<T: Pod> std::fmt::Debug for UploadBuffer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadBuffer")
            .field("element", &std::any::type_name::<T>())
            .field("capacity", &self.capacity)
            .field("stride", &self.stride)
            .finish()
    }
}
