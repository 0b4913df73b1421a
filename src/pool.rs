//! A tiny reusable byte-buffer pool.
//!
//! Chunk payloads (ancillary chunks we read in full) are rented from
//! here instead of allocated fresh per image.

/// Caps how many buffers we'll hold onto between rentals; beyond this
/// we just drop the buffer instead of growing the pool forever.
const MAX_POOLED_BUFFERS: usize = 8;

#[derive(Default)]
pub(crate) struct BufferPool
{
    free: Vec<Vec<u8>>
}

impl BufferPool
{
    pub(crate) fn new() -> BufferPool
    {
        BufferPool { free: Vec::new() }
    }

    /// Rents a buffer of exactly `len` bytes, zero-filled. Prefers
    /// reusing a previously returned allocation over making a new one.
    pub(crate) fn rent(&mut self, len: usize) -> Vec<u8>
    {
        if let Some(mut buf) = self.free.pop()
        {
            buf.clear();
            buf.resize(len, 0);
            buf
        }
        else
        {
            vec![0_u8; len]
        }
    }

    /// Returns a buffer rented with [`BufferPool::rent`] for reuse by a
    /// later chunk. Ownership of `buf` moves into the pool; callers
    /// must not keep using it afterwards.
    pub(crate) fn give_back(&mut self, buf: Vec<u8>)
    {
        if self.free.len() < MAX_POOLED_BUFFERS
        {
            self.free.push(buf);
        }
    }
}
