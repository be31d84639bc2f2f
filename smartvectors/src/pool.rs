//! Reusable buffers for the combination and transform engines
//!
//! The dense passes of [`crate::process_operator`] and the transforms in
//! [`crate::fft`] each need one full-length scratch buffer. Callers running
//! many operations over same-length columns can share a [`BufferPool`] to
//! avoid reallocating that buffer every time.
//!
//! The discipline is strictly call-scoped: a buffer is checked out at the
//! start of an operation and either returns to the pool when its
//! [`PooledBuffer`] guard drops, or is detached with
//! [`PooledBuffer::into_vec`] to become the owned backing store of the
//! result. A caller done with such a result hands the storage back through
//! [`BufferPool::recycle`], closing the loop. Pools are not meant to be
//! shared between concurrently executing operations.

use alloc::vec;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::ops::{Deref, DerefMut};

use p3_field::Field;

/// A pool of dense buffers, all of the same fixed length.
#[derive(Debug)]
pub struct BufferPool<F> {
    buf_len: usize,
    free: RefCell<Vec<Vec<F>>>,
}

impl<F: Field> BufferPool<F> {
    /// A pool handing out buffers of exactly `buf_len` elements.
    pub fn new(buf_len: usize) -> Self {
        assert!(buf_len > 0, "pool buffer length must be positive");
        Self {
            buf_len,
            free: RefCell::new(Vec::new()),
        }
    }

    /// The length of every buffer in this pool.
    pub fn buf_len(&self) -> usize {
        self.buf_len
    }

    /// The number of buffers currently parked in the pool.
    pub fn num_free(&self) -> usize {
        self.free.borrow().len()
    }

    /// Checks a buffer out of the pool, allocating a fresh one if the pool
    /// is empty. The contents are unspecified; callers overwrite them.
    pub fn checkout(&self) -> PooledBuffer<'_, F> {
        let buf = self
            .free
            .borrow_mut()
            .pop()
            .unwrap_or_else(|| vec![F::ZERO; self.buf_len]);
        PooledBuffer {
            pool: self,
            buf: Some(buf),
        }
    }

    /// Returns a detached buffer to the pool, typically the backing store of
    /// a result the caller is done with.
    pub fn recycle(&self, buf: Vec<F>) {
        assert_eq!(
            buf.len(),
            self.buf_len,
            "recycled buffer length does not match the pool"
        );
        self.free.borrow_mut().push(buf);
    }

    fn put_back(&self, buf: Vec<F>) {
        debug_assert_eq!(buf.len(), self.buf_len);
        self.free.borrow_mut().push(buf);
    }
}

/// A checked-out pool buffer. Returns to the pool on drop unless detached
/// with [`PooledBuffer::into_vec`].
pub struct PooledBuffer<'a, F: Field> {
    pool: &'a BufferPool<F>,
    buf: Option<Vec<F>>,
}

impl<F: Field> PooledBuffer<'_, F> {
    /// Detaches the buffer from the pool, handing ownership to the caller.
    pub fn into_vec(mut self) -> Vec<F> {
        self.buf.take().expect("buffer already detached")
    }
}

impl<F: Field> Deref for PooledBuffer<'_, F> {
    type Target = [F];

    fn deref(&self) -> &[F] {
        self.buf.as_ref().expect("buffer already detached")
    }
}

impl<F: Field> DerefMut for PooledBuffer<'_, F> {
    fn deref_mut(&mut self) -> &mut [F] {
        self.buf.as_mut().expect("buffer already detached")
    }
}

impl<F: Field> Drop for PooledBuffer<'_, F> {
    fn drop(&mut self) {
        if let Some(buf) = self.buf.take() {
            self.pool.put_back(buf);
        }
    }
}
