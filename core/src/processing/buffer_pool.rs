/// Simple scoped buffer pool so repeated captures reuse their spectra.
pub struct BufferPool<T> {
    buffers: Vec<Vec<T>>,
    max_capacity: usize,
}

impl<T: Clone + Default> BufferPool<T> {
    pub fn with_capacity(max_capacity: usize) -> Self {
        Self {
            buffers: Vec::with_capacity(max_capacity),
            max_capacity,
        }
    }

    /// Hands out a zeroed buffer of `length`, reusing a released one if possible.
    pub fn checkout(&mut self, length: usize) -> Vec<T> {
        match self.buffers.pop() {
            Some(mut buffer) => {
                buffer.clear();
                buffer.resize(length, T::default());
                buffer
            }
            None => vec![T::default(); length],
        }
    }

    /// Returns a buffer back to the pool for reuse.
    pub fn release(&mut self, mut buffer: Vec<T>) {
        buffer.clear();
        if self.buffers.len() < self.max_capacity {
            self.buffers.push(buffer);
        }
    }
}
