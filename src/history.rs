//! Fixed-Size Lookup History for the Tweak Cycle
//!
//! ## Overview
//!
//! The control loop queries the calibration map at a much higher rate than
//! the tweak cycle fires. Between ticks, the read path records where it
//! looked and what correction the loop observed there; the scheduler then
//! consumes that window to decide which cells to nudge. This module holds
//! that window in a fixed-size ring buffer.
//!
//! ## Design Rationale
//!
//! A ring buffer gives the sliding window the learning loop needs with
//! fixed memory and constant-time operations:
//! - O(1) insertion (overwrites oldest when full)
//! - O(1) access to the most recent sample
//! - O(n) chronological iteration
//! - Zero heap allocations
//!
//! When the buffer is full the oldest sample is discarded silently: for a
//! learning window, recent data is strictly more valuable than old data,
//! so refusing the push (as `heapless::Vec` would) is the wrong behavior.
//!
//! ## Thread Safety
//!
//! Not thread-safe. The single-writer discipline of the controller applies:
//! the control loop pushes, the scheduler reads, and the embedding code
//! serializes the two (spec of the tick cycle keeps both short and bounded).

use crate::time::Timestamp;

/// One recorded map query with the correction signal observed there
#[derive(Debug, Clone, Copy)]
pub struct LookupSample {
    /// Engine speed at the time of the lookup
    pub rpm: f32,
    /// Load (throttle) position at the time of the lookup
    pub load: f32,
    /// Correction the control loop would have wanted at this point,
    /// in calibration value units. Sign carries direction.
    pub correction: f32,
    /// When the lookup happened
    pub timestamp: Timestamp,
}

/// Fixed-size ring buffer of recent lookup samples
///
/// `N` is the window size, fixed at compile time. The scheduler drains
/// at most one window per tick, so `N` bounds the number of cell writes
/// a single tick can make.
///
/// ## Internal Invariants
///
/// - `write_pos < N`
/// - `len <= N`
/// - Iteration yields samples oldest first
#[derive(Clone)]
pub struct LookupHistory<const N: usize> {
    /// Storage array using Option for unfilled slots
    data: [Option<LookupSample>; N],
    /// Index where the next write will occur, wraps at N
    write_pos: usize,
    /// Current number of valid samples
    len: usize,
}

impl<const N: usize> LookupHistory<N> {
    /// Creates a new empty history window
    ///
    /// Const so a window can live in a static on targets without heap.
    pub const fn new() -> Self {
        Self {
            data: [None; N],
            write_pos: 0,
            len: 0,
        }
    }

    /// Record a sample, overwriting the oldest when the window is full
    pub fn push(&mut self, sample: LookupSample) {
        self.data[self.write_pos] = Some(sample);
        self.write_pos = (self.write_pos + 1) % N;

        if self.len < N {
            self.len += 1;
        }
    }

    /// Number of recorded samples
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the window is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Check if the window is full
    pub fn is_full(&self) -> bool {
        self.len == N
    }

    /// Most recent sample, if any
    pub fn last(&self) -> Option<&LookupSample> {
        if self.is_empty() {
            return None;
        }

        let idx = if self.write_pos == 0 { N - 1 } else { self.write_pos - 1 };

        self.data[idx].as_ref()
    }

    /// Iterate over samples from oldest to newest
    pub fn iter(&self) -> LookupHistoryIter<N> {
        LookupHistoryIter {
            history: self,
            index: 0,
            count: 0,
        }
    }

    /// Discard all samples
    ///
    /// The scheduler calls this after consuming a window so one burst of
    /// lookups is never applied twice.
    pub fn clear(&mut self) {
        self.write_pos = 0;
        self.len = 0;
    }

    /// Sample by logical index (0 = oldest, len-1 = newest)
    ///
    /// When the window is full the oldest sample sits at `write_pos`, so
    /// logical indices are offset from physical ones.
    fn get(&self, index: usize) -> Option<&LookupSample> {
        if index >= self.len {
            return None;
        }

        let actual_index = if self.len < N {
            index
        } else {
            (self.write_pos + index) % N
        };

        self.data[actual_index].as_ref()
    }
}

/// Iterator over history contents, oldest first
pub struct LookupHistoryIter<'a, const N: usize> {
    history: &'a LookupHistory<N>,
    index: usize,
    count: usize,
}

impl<'a, const N: usize> Iterator for LookupHistoryIter<'a, N> {
    type Item = &'a LookupSample;

    fn next(&mut self) -> Option<Self::Item> {
        if self.count >= self.history.len() {
            return None;
        }

        let item = self.history.get(self.index)?;
        self.index += 1;
        self.count += 1;
        Some(item)
    }
}

impl<const N: usize> Default for LookupHistory<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(rpm: f32, correction: f32, timestamp: u64) -> LookupSample {
        LookupSample { rpm, load: 50.0, correction, timestamp }
    }

    #[test]
    fn empty_history() {
        let history: LookupHistory<5> = LookupHistory::new();
        assert!(history.is_empty());
        assert_eq!(history.len(), 0);
        assert!(history.last().is_none());
    }

    #[test]
    fn push_and_retrieve() {
        let mut history = LookupHistory::<5>::new();

        history.push(sample(2000.0, 1.5, 1000));
        assert_eq!(history.len(), 1);

        let last = history.last().unwrap();
        assert_eq!(last.rpm, 2000.0);
        assert_eq!(last.timestamp, 1000);
    }

    #[test]
    fn overwrites_oldest_when_full() {
        let mut history = LookupHistory::<3>::new();

        for i in 0..5 {
            history.push(sample(1000.0 + i as f32, 0.0, i as u64 * 10));
        }

        assert_eq!(history.len(), 3);
        assert!(history.is_full());

        // Samples 0 and 1 were overwritten
        let rpms: heapless::Vec<f32, 3> = history.iter().map(|s| s.rpm).collect();
        assert_eq!(&rpms[..], &[1002.0, 1003.0, 1004.0]);
    }

    #[test]
    fn clear_empties_window() {
        let mut history = LookupHistory::<4>::new();
        history.push(sample(1500.0, 0.5, 100));
        history.push(sample(1600.0, 0.5, 200));

        history.clear();
        assert!(history.is_empty());
        assert!(history.iter().next().is_none());
    }

    #[test]
    fn iterator_chronological_order() {
        let mut history = LookupHistory::<4>::new();

        for i in 0..4 {
            history.push(sample(1000.0, 0.0, i as u64));
        }

        let timestamps: heapless::Vec<u64, 4> = history.iter().map(|s| s.timestamp).collect();
        assert_eq!(&timestamps[..], &[0, 1, 2, 3]);
    }
}
