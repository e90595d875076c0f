//! Priority ordering over pending demand requests.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::request::DemandRequest;

/// Heap entry: the request plus its intake sequence number.
#[derive(Debug, Clone)]
struct Pending {
    seq: u64,
    request: DemandRequest,
}

impl Pending {
    /// "Greater" means "dequeued earlier": higher class, then older
    /// creation time, then earlier intake.
    fn dequeue_order(&self, other: &Self) -> Ordering {
        self.request
            .class()
            .cmp(&other.request.class())
            .then_with(|| other.request.created_at().cmp(&self.request.created_at()))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.dequeue_order(other) == Ordering::Equal
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        self.dequeue_order(other)
    }
}

/// Pending requests, owned by value, dequeued highest priority first.
///
/// Within a class, older requests come first; requests with identical class
/// and timestamp come out in the order they were pushed.
#[derive(Debug, Clone, Default)]
pub struct DemandQueue {
    heap: BinaryHeap<Pending>,
    next_seq: u64,
}

impl DemandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes ownership of `request` and inserts it.
    pub fn push(&mut self, request: DemandRequest) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Pending { seq, request });
    }

    /// Removes and returns the next request to serve.
    pub fn pop(&mut self) -> Option<DemandRequest> {
        self.heap.pop().map(|p| p.request)
    }

    /// Removes every request, returning them in dequeue order.
    pub fn drain_ordered(&mut self) -> Vec<DemandRequest> {
        let mut out = Vec::with_capacity(self.heap.len());
        while let Some(request) = self.pop() {
            out.push(request);
        }
        out
    }

    /// Lists pending requests in dequeue order without removing them.
    pub fn ordered(&self) -> Vec<&DemandRequest> {
        let mut entries: Vec<&Pending> = self.heap.iter().collect();
        entries.sort_by(|a, b| b.cmp(a));
        entries.into_iter().map(|p| &p.request).collect()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
