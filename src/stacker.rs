//! Per-window accumulation of stem channels into fixed-shape tensors

use crate::channels::CollisionPolicy;
use ndarray::Array2;
use std::collections::BTreeMap;

/// Accumulates per-stem mono windows into `(num_channels, window_len)`
/// tensors, one per window index.
///
/// Tensors are zero-initialized and lazily created on first deposit, so
/// channels whose stems are absent from a song simply stay zero. The map is
/// owned by the per-song processing context and discarded with it.
#[derive(Debug)]
pub struct ChannelStacker {
    num_channels: usize,
    window_len: usize,
    policy: CollisionPolicy,
    tensors: BTreeMap<usize, Array2<f32>>,
    deposit_counts: BTreeMap<usize, Vec<u32>>,
}

impl ChannelStacker {
    pub fn new(num_channels: usize, window_len: usize, policy: CollisionPolicy) -> Self {
        Self {
            num_channels,
            window_len,
            policy,
            tensors: BTreeMap::new(),
            deposit_counts: BTreeMap::new(),
        }
    }

    /// Write `samples` into row `channel_index` of the window's tensor.
    pub fn deposit(&mut self, window_index: usize, channel_index: usize, samples: &[i16]) {
        assert_eq!(samples.len(), self.window_len);
        assert!(channel_index < self.num_channels);

        let (num_channels, window_len) = (self.num_channels, self.window_len);
        let tensor = self
            .tensors
            .entry(window_index)
            .or_insert_with(|| Array2::zeros((num_channels, window_len)));
        let counts = self
            .deposit_counts
            .entry(window_index)
            .or_insert_with(|| vec![0; num_channels]);

        let mut row = tensor.row_mut(channel_index);
        let prior = counts[channel_index];
        match self.policy {
            CollisionPolicy::Replace => {
                for (dst, &src) in row.iter_mut().zip(samples) {
                    *dst = src as f32;
                }
            }
            CollisionPolicy::Average => {
                // Running mean over every stem deposited on this channel
                let n = prior as f32;
                for (dst, &src) in row.iter_mut().zip(samples) {
                    *dst = (*dst * n + src as f32) / (n + 1.0);
                }
            }
        }
        counts[channel_index] = prior + 1;
    }

    /// The tensor for a window index, if any stem deposited into it.
    pub fn tensor(&self, window_index: usize) -> Option<&Array2<f32>> {
        self.tensors.get(&window_index)
    }

    /// Window indices that received at least one deposit, in order.
    pub fn window_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.tensors.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.tensors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untouched_channels_stay_zero() {
        let mut stacker = ChannelStacker::new(3, 4, CollisionPolicy::Replace);
        stacker.deposit(0, 0, &[1, 2, 3, 4]);
        stacker.deposit(0, 1, &[5, 6, 7, 8]);

        let tensor = stacker.tensor(0).unwrap();
        assert_eq!(tensor.dim(), (3, 4));
        assert_eq!(tensor.row(0).to_vec(), vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(tensor.row(1).to_vec(), vec![5.0, 6.0, 7.0, 8.0]);
        assert_eq!(tensor.row(2).to_vec(), vec![0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_windows_are_independent() {
        let mut stacker = ChannelStacker::new(2, 2, CollisionPolicy::Replace);
        stacker.deposit(3, 0, &[1, 1]);
        stacker.deposit(7, 1, &[2, 2]);

        assert_eq!(stacker.window_indices().collect::<Vec<_>>(), vec![3, 7]);
        assert!(stacker.tensor(0).is_none());
        assert_eq!(stacker.tensor(3).unwrap().row(1).to_vec(), vec![0.0, 0.0]);
    }

    #[test]
    fn test_is_empty_until_first_deposit() {
        let mut stacker = ChannelStacker::new(2, 2, CollisionPolicy::Replace);
        assert!(stacker.is_empty());
        stacker.deposit(0, 0, &[1, 1]);
        assert!(!stacker.is_empty());
    }

    #[test]
    fn test_replace_policy_last_write_wins() {
        let mut stacker = ChannelStacker::new(2, 2, CollisionPolicy::Replace);
        stacker.deposit(0, 1, &[10, 10]);
        stacker.deposit(0, 1, &[20, 20]);
        assert_eq!(stacker.tensor(0).unwrap().row(1).to_vec(), vec![20.0, 20.0]);
    }

    #[test]
    fn test_average_policy_means_collisions() {
        let mut stacker = ChannelStacker::new(2, 2, CollisionPolicy::Average);
        stacker.deposit(0, 1, &[10, 30]);
        stacker.deposit(0, 1, &[20, 10]);
        stacker.deposit(0, 1, &[30, 20]);
        assert_eq!(stacker.tensor(0).unwrap().row(1).to_vec(), vec![20.0, 20.0]);
    }
}
