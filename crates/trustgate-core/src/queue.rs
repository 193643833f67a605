//! Fixed-capacity single-producer/single-consumer ring buffer carrying raw
//! 64-byte frames from the ingress domain to the real-time domain.
//!
//! Head and tail are independent atomics: the producer only ever writes
//! `tail`, the consumer only ever writes `head`. A full queue silently
//! drops the incoming frame — there is no backpressure to the SPI link
//! (spec §4.1). `Release`/`Acquire` ordering on the index stores/loads
//! stands in for the explicit memory barrier the bare-metal source needs
//! between the payload write and the index publish.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::config::QUEUE_CAPACITY;
use crate::wire::PACKET_LEN;

/// A raw, not-yet-authenticated 64-byte frame.
pub type Frame = [u8; PACKET_LEN];

/// SPSC ring of [`QUEUE_CAPACITY`] frame-sized slots.
pub struct FrameQueue {
    slots: Box<[std::cell::UnsafeCell<Frame>]>,
    head: AtomicUsize,
    tail: AtomicUsize,
}

// Safety: `slots` is only written by the single producer at index `tail`
// (before publishing it) and only read by the single consumer at index
// `head` (after observing the producer's publish) — see `push`/`pop`.
unsafe impl Sync for FrameQueue {}

impl FrameQueue {
    /// Build an empty queue. `QUEUE_CAPACITY` must be a power of two.
    pub fn new() -> Self {
        assert!(
            QUEUE_CAPACITY.is_power_of_two(),
            "queue capacity must be a power of two"
        );
        let slots = (0..QUEUE_CAPACITY)
            .map(|_| std::cell::UnsafeCell::new([0u8; PACKET_LEN]))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        FrameQueue {
            slots,
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
        }
    }

    fn mask(&self, idx: usize) -> usize {
        idx & (QUEUE_CAPACITY - 1)
    }

    /// Producer side: enqueue a frame. Returns `false` (frame dropped) if
    /// the queue is full.
    pub fn push(&self, frame: Frame) -> bool {
        let tail = self.tail.load(Ordering::Relaxed);
        let head = self.head.load(Ordering::Acquire);
        if tail.wrapping_sub(head) >= QUEUE_CAPACITY {
            return false;
        }
        let slot = self.mask(tail);
        // Safety: this slot is not owned by the consumer (we just checked
        // the queue isn't full), and we're the only producer.
        unsafe {
            *self.slots[slot].get() = frame;
        }
        self.tail.store(tail.wrapping_add(1), Ordering::Release);
        true
    }

    /// Consumer side: dequeue the oldest frame, if any.
    pub fn pop(&self) -> Option<Frame> {
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Acquire);
        if head == tail {
            return None;
        }
        let slot = self.mask(head);
        // Safety: the producer has published up through `tail` (Acquire
        // above synchronizes with its Release store), and we're the only
        // consumer.
        let frame = unsafe { *self.slots[slot].get() };
        self.head.store(head.wrapping_add(1), Ordering::Release);
        Some(frame)
    }

    /// Number of frames currently queued.
    pub fn len(&self) -> usize {
        let tail = self.tail.load(Ordering::Acquire);
        let head = self.head.load(Ordering::Acquire);
        tail.wrapping_sub(head)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() >= QUEUE_CAPACITY
    }
}

impl Default for FrameQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(tag: u8) -> Frame {
        let mut f = [0u8; PACKET_LEN];
        f[0] = tag;
        f
    }

    #[test]
    fn push_then_pop_preserves_order() {
        let q = FrameQueue::new();
        assert!(q.push(frame(1)));
        assert!(q.push(frame(2)));
        assert_eq!(q.pop().unwrap()[0], 1);
        assert_eq!(q.pop().unwrap()[0], 2);
        assert!(q.pop().is_none());
    }

    #[test]
    fn pop_on_empty_queue_returns_none() {
        let q = FrameQueue::new();
        assert!(q.pop().is_none());
    }

    #[test]
    fn push_beyond_capacity_drops_silently() {
        let q = FrameQueue::new();
        for i in 0..QUEUE_CAPACITY as u8 {
            assert!(q.push(frame(i)));
        }
        assert!(q.is_full());
        assert!(!q.push(frame(99)), "overrun must be dropped, not block");
        assert_eq!(q.pop().unwrap()[0], 0);
    }

    #[test]
    fn wraps_around_correctly_after_many_cycles() {
        let q = FrameQueue::new();
        for round in 0..(QUEUE_CAPACITY as u8) * 4 {
            assert!(q.push(frame(round)));
            assert_eq!(q.pop().unwrap()[0], round);
        }
    }

    #[test]
    fn concurrent_single_producer_single_consumer_preserves_all_frames() {
        use std::sync::Arc;
        let q = Arc::new(FrameQueue::new());
        let total = 5000u32;

        let producer_q = Arc::clone(&q);
        let producer = std::thread::spawn(move || {
            let mut sent = 0u32;
            while sent < total {
                let mut f = [0u8; PACKET_LEN];
                f[0..4].copy_from_slice(&sent.to_le_bytes());
                if producer_q.push(f) {
                    sent += 1;
                }
            }
        });

        let consumer_q = Arc::clone(&q);
        let consumer = std::thread::spawn(move || {
            let mut received = Vec::new();
            while received.len() < total as usize {
                if let Some(f) = consumer_q.pop() {
                    received.push(u32::from_le_bytes(f[0..4].try_into().unwrap()));
                }
            }
            received
        });

        producer.join().unwrap();
        let received = consumer.join().unwrap();
        // Delivered frames preserve producer order (drops are not possible
        // here since the producer retries until accepted).
        let expected: Vec<u32> = (0..total).collect();
        assert_eq!(received, expected);
    }
}
