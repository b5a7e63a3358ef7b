use std::collections::VecDeque;

/// Fixed-capacity FIFO. Pushing onto a full buffer evicts the oldest entry.
///
/// Iteration is always oldest-first, which the weight adapter relies on when
/// it compares the two most recent metrics samples.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundedBuffer<T> {
    data: VecDeque<T>,
    capacity: usize,
}

impl<T> BoundedBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            data: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Build from existing items, keeping only the newest `capacity` of them.
    pub fn from_vec(items: Vec<T>, capacity: usize) -> Self {
        let mut buffer = Self::new(capacity);
        for item in items {
            buffer.push(item);
        }
        buffer
    }

    /// Append an item, returning the evicted oldest item if the buffer was full.
    pub fn push(&mut self, item: T) -> Option<T> {
        let evicted = if self.data.len() == self.capacity {
            self.data.pop_front()
        } else {
            None
        };
        self.data.push_back(item);
        evicted
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.data.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.data.iter()
    }

    pub fn latest(&self) -> Option<&T> {
        self.data.back()
    }

    /// The last `n` items, oldest-first.
    pub fn last_n(&self, n: usize) -> impl Iterator<Item = &T> {
        let skip = self.data.len().saturating_sub(n);
        self.data.iter().skip(skip)
    }

    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.data.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounded_buffer_evicts_oldest() {
        let mut buffer = BoundedBuffer::new(4);
        buffer.push(1);
        buffer.push(2);
        buffer.push(3);
        buffer.push(4);

        assert_eq!(buffer.len(), 4);
        assert!(buffer.is_full());

        let evicted = buffer.push(5);
        assert_eq!(evicted, Some(1));
        assert_eq!(buffer.len(), 4);

        let values: Vec<_> = buffer.iter().copied().collect();
        assert_eq!(values, vec![2, 3, 4, 5]);
    }

    #[test]
    fn test_from_vec_keeps_newest() {
        let buffer = BoundedBuffer::from_vec((0..10).collect(), 3);
        assert_eq!(buffer.to_vec(), vec![7, 8, 9]);
        assert_eq!(buffer.latest(), Some(&9));
    }

    #[test]
    fn test_last_n_is_oldest_first() {
        let buffer = BoundedBuffer::from_vec(vec![1, 2, 3, 4], 10);
        let tail: Vec<_> = buffer.last_n(2).copied().collect();
        assert_eq!(tail, vec![3, 4]);

        let all: Vec<_> = buffer.last_n(20).copied().collect();
        assert_eq!(all, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_zero_capacity_is_promoted() {
        let mut buffer = BoundedBuffer::new(0);
        buffer.push("a");
        buffer.push("b");
        assert_eq!(buffer.capacity(), 1);
        assert_eq!(buffer.to_vec(), vec!["b"]);
    }
}
