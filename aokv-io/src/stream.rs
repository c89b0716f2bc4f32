//! Pull-based single-consumer chunk stream
//!
//! The writer's output is consumed through a single pull operation under
//! single-threaded cooperative scheduling, not through `async`/`tokio` task
//! spawning or a `rayon` pool — there is never more than one outstanding
//! pull, so a single optional waker slot is sufficient. This is a queue a
//! consumer drains at its own pace instead of a writer that blocks on
//! `write_all`.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Outcome of a single `pull`.
#[derive(Debug)]
pub enum Pull {
    /// A chunk was available and has been dequeued.
    Chunk(Vec<u8>),
    /// The queue is empty but the stream has not ended; the caller should
    /// install a waker (via [`ChunkStream::set_waker`]) and try again once
    /// woken.
    Pending,
    /// The stream has ended and the queue is drained; no more chunks will
    /// ever arrive.
    Closed,
}

struct Inner {
    queue: VecDeque<Vec<u8>>,
    ended: bool,
    waker: Option<Box<dyn FnMut()>>,
}

/// Shared chunk queue between a writer (producer) and a single consumer.
#[derive(Clone)]
pub struct ChunkStream {
    inner: Rc<RefCell<Inner>>,
}

impl ChunkStream {
    /// Construct a fresh, open stream.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                queue: VecDeque::new(),
                ended: false,
                waker: None,
            })),
        }
    }

    /// Producer side: enqueue a chunk and wake a suspended consumer, if any.
    pub(crate) fn push(&self, chunk: Vec<u8>) {
        let mut inner = self.inner.borrow_mut();
        inner.queue.push_back(chunk);
        if let Some(mut waker) = inner.waker.take() {
            drop(inner);
            waker();
        }
    }

    /// Producer side: mark the stream ended; no more chunks will be pushed.
    pub(crate) fn close(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.ended = true;
        if let Some(mut waker) = inner.waker.take() {
            drop(inner);
            waker();
        }
    }

    /// Consumer side: attempt to dequeue the next chunk.
    pub fn pull(&self) -> Pull {
        let mut inner = self.inner.borrow_mut();
        if let Some(chunk) = inner.queue.pop_front() {
            return Pull::Chunk(chunk);
        }
        if inner.ended {
            return Pull::Closed;
        }
        Pull::Pending
    }

    /// Consumer side: install the single waker slot, replacing any prior one.
    ///
    /// Only one consumer is supported; installing a waker while another pull
    /// is outstanding overwrites the previous waker.
    pub fn set_waker<F: FnMut() + 'static>(&self, waker: F) {
        self.inner.borrow_mut().waker = Some(Box::new(waker));
    }

    /// Drain all currently queued chunks into a single buffer, blocking (by
    /// spinning on `pull`) until the stream closes. Intended for tests and
    /// simple synchronous consumers such as the CLI, where there is no
    /// actual asynchronous suspension to wait on.
    pub fn drain_to_vec(&self) -> Vec<u8> {
        let mut out = Vec::new();
        loop {
            match self.pull() {
                Pull::Chunk(chunk) => out.extend_from_slice(&chunk),
                Pull::Pending => continue,
                Pull::Closed => break,
            }
        }
        out
    }
}

impl Default for ChunkStream {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pull_returns_pending_then_chunk() {
        let stream = ChunkStream::new();
        assert!(matches!(stream.pull(), Pull::Pending));
        stream.push(vec![1, 2, 3]);
        match stream.pull() {
            Pull::Chunk(chunk) => assert_eq!(chunk, vec![1, 2, 3]),
            other => panic!("expected chunk, got {other:?}"),
        }
    }

    #[test]
    fn close_after_drain_yields_closed() {
        let stream = ChunkStream::new();
        stream.push(vec![9]);
        stream.close();
        assert!(matches!(stream.pull(), Pull::Chunk(_)));
        assert!(matches!(stream.pull(), Pull::Closed));
    }

    #[test]
    fn waker_fires_on_push() {
        let stream = ChunkStream::new();
        let woken = Rc::new(RefCell::new(false));
        let woken_clone = woken.clone();
        stream.set_waker(move || *woken_clone.borrow_mut() = true);
        stream.push(vec![1]);
        assert!(*woken.borrow());
    }

    #[test]
    fn drain_to_vec_concatenates_chunks() {
        let stream = ChunkStream::new();
        stream.push(vec![1, 2]);
        stream.push(vec![3, 4]);
        stream.close();
        assert_eq!(stream.drain_to_vec(), vec![1, 2, 3, 4]);
    }
}
