//! Fixed-capacity chunk buffer
//!
//! Accumulates caller-supplied bytes until a full protocol chunk is ready to
//! flush. The buffer never touches the network; it only owns bytes.

/// Smallest chunk size the upload protocol accepts. All chunk sizes must be
/// whole multiples of this granularity.
pub const MIN_CHUNK_SIZE: usize = 256 * 1024;

/// Default chunk size used by newly opened channels: eight granules.
pub const DEFAULT_CHUNK_SIZE: usize = 8 * MIN_CHUNK_SIZE;

/// Fixed-capacity byte accumulator
///
/// Invariant: `len() <= capacity()`. A full buffer accepts no further bytes
/// until it is drained.
#[derive(Debug)]
pub struct ChunkBuffer {
    buf: Vec<u8>,
    capacity: usize,
}

impl ChunkBuffer {
    /// Create an empty buffer with the given capacity
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Copy bytes from `src` up to the remaining capacity
    ///
    /// Returns the number of bytes accepted, which may be less than
    /// `src.len()`. The caller retries the remainder once the buffer has been
    /// drained. Bytes are always copied, never aliased.
    pub fn append(&mut self, src: &[u8]) -> usize {
        let accepted = src.len().min(self.remaining());
        self.buf.extend_from_slice(&src[..accepted]);
        accepted
    }

    /// Number of valid bytes currently buffered
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether no bytes are buffered
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Whether the buffer has reached capacity
    pub fn is_full(&self) -> bool {
        self.buf.len() == self.capacity
    }

    /// Capacity still available for appends
    pub fn remaining(&self) -> usize {
        self.capacity - self.buf.len()
    }

    /// Total capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// View of the valid bytes buffered so far
    pub fn bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Return an independent copy of the buffered bytes and reset the buffer
    pub fn drain(&mut self) -> Vec<u8> {
        let drained = self.buf.clone();
        self.buf.clear();
        drained
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_within_capacity() {
        let mut buffer = ChunkBuffer::new(8);
        assert_eq!(buffer.append(b"abc"), 3);
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.remaining(), 5);
        assert!(!buffer.is_full());
        assert_eq!(buffer.bytes(), b"abc");
    }

    #[test]
    fn test_append_truncates_at_capacity() {
        let mut buffer = ChunkBuffer::new(4);
        assert_eq!(buffer.append(b"abcdef"), 4);
        assert!(buffer.is_full());
        assert_eq!(buffer.bytes(), b"abcd");

        // A full buffer accepts nothing further
        assert_eq!(buffer.append(b"xyz"), 0);
        assert_eq!(buffer.bytes(), b"abcd");
    }

    #[test]
    fn test_append_exact_fill() {
        let mut buffer = ChunkBuffer::new(4);
        assert_eq!(buffer.append(b"abcd"), 4);
        assert!(buffer.is_full());
        assert_eq!(buffer.remaining(), 0);
    }

    #[test]
    fn test_drain_resets() {
        let mut buffer = ChunkBuffer::new(8);
        buffer.append(b"abc");

        let drained = buffer.drain();
        assert_eq!(drained, b"abc");
        assert!(buffer.is_empty());
        assert_eq!(buffer.remaining(), 8);

        // The drained copy is independent of the buffer
        buffer.append(b"xyz");
        assert_eq!(drained, b"abc");
    }

    #[test]
    fn test_drain_empty() {
        let mut buffer = ChunkBuffer::new(8);
        assert_eq!(buffer.drain(), Vec::<u8>::new());
    }

    #[test]
    fn test_append_after_drain() {
        let mut buffer = ChunkBuffer::new(4);
        buffer.append(b"abcd");
        buffer.drain();
        assert_eq!(buffer.append(b"efgh"), 4);
        assert_eq!(buffer.bytes(), b"efgh");
    }

    #[test]
    fn test_zero_length_append() {
        let mut buffer = ChunkBuffer::new(4);
        assert_eq!(buffer.append(b""), 0);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_chunk_size_constants() {
        assert_eq!(MIN_CHUNK_SIZE, 256 * 1024);
        assert_eq!(DEFAULT_CHUNK_SIZE, 8 * MIN_CHUNK_SIZE);
        assert_eq!(DEFAULT_CHUNK_SIZE % MIN_CHUNK_SIZE, 0);
    }
}
