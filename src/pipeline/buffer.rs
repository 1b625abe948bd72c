//! Pipeline-owned intermediate buffers.
//!
//! Buffers are named slots sized to the current render resolution. They are
//! allocated lazily the first time a graph declares them, reused on every
//! following frame, and dropped only when the pipeline is resized.
//! Effects may share a slot by using the same name, provided they agree on
//! its pixel format.

use std::collections::HashMap;

use ndarray::Array3;

use crate::error::{PostFxError, PostFxResult};

/// Pixel layout of a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    R32F,
    Rg32F,
    Rgb32F,
    Rgba32F,
}

impl PixelFormat {
    pub fn channels(self) -> usize {
        match self {
            PixelFormat::R32F => 1,
            PixelFormat::Rg32F => 2,
            PixelFormat::Rgb32F => 3,
            PixelFormat::Rgba32F => 4,
        }
    }
}

/// A frame-shaped storage slot.
#[derive(Debug, Clone)]
pub struct Buffer {
    format: PixelFormat,
    data: Array3<f32>,
}

impl Buffer {
    pub fn new(width: usize, height: usize, format: PixelFormat) -> Self {
        Self {
            format,
            data: Array3::<f32>::zeros((height, width, format.channels())),
        }
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn data(&self) -> &Array3<f32> {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut Array3<f32> {
        &mut self.data
    }
}

/// Named buffers at one fixed resolution.
#[derive(Debug, Default)]
pub struct BufferPool {
    width: usize,
    height: usize,
    slots: HashMap<String, Buffer>,
}

impl BufferPool {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            slots: HashMap::new(),
        }
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Drop every slot and adopt a new resolution.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.slots.clear();
        self.width = width;
        self.height = height;
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.slots.contains_key(id)
    }

    /// Make sure slot `id` exists with `format`, allocating it if needed.
    pub fn ensure(&mut self, id: &str, format: PixelFormat) -> PostFxResult<()> {
        match self.slots.get(id) {
            Some(existing) if existing.format != format => Err(PostFxError::resource(format!(
                "buffer '{}' is {:?}, requested as {:?}",
                id, existing.format, format
            ))),
            Some(_) => Ok(()),
            None => {
                log::debug!(
                    "allocating buffer '{}' ({}x{}, {:?})",
                    id,
                    self.width,
                    self.height,
                    format
                );
                self.slots
                    .insert(id.to_string(), Buffer::new(self.width, self.height, format));
                Ok(())
            }
        }
    }

    pub fn get(&self, id: &str) -> PostFxResult<&Buffer> {
        self.slots
            .get(id)
            .ok_or_else(|| PostFxError::resource(format!("buffer '{}' is not allocated", id)))
    }

    /// Remove a slot for exclusive writing. Pair with [`BufferPool::restore`].
    pub fn take(&mut self, id: &str) -> PostFxResult<Buffer> {
        self.slots
            .remove(id)
            .ok_or_else(|| PostFxError::resource(format!("buffer '{}' is not allocated", id)))
    }

    pub fn restore(&mut self, id: &str, buffer: Buffer) {
        self.slots.insert(id.to_string(), buffer);
    }
}
