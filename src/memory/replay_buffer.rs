use super::transition::{Batch, Transition};
use crate::error::{Error, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Fixed-capacity ring of transitions with uniform sampling.
///
/// Once full, each insert overwrites the oldest stored transition.
pub struct ReplayBuffer {
    memory: Vec<Transition>,
    capacity: usize,
    index: usize,
    rng: StdRng,
}

impl ReplayBuffer {
    pub fn new(capacity: usize, seed: u64) -> Self {
        assert!(capacity > 0);
        ReplayBuffer {
            memory: Vec::with_capacity(capacity),
            capacity,
            index: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Stores `transition` and returns the slot it was written to.
    pub fn insert(&mut self, transition: Transition) -> usize {
        let slot = self.index;
        if self.memory.len() < self.capacity {
            self.memory.push(transition);
        } else {
            self.memory[slot] = transition;
        }
        self.index = (self.index + 1) % self.capacity;
        slot
    }

    /// Draws `batch_size` transitions uniformly with replacement.
    pub fn sample(&mut self, batch_size: usize) -> Result<Batch> {
        if batch_size == 0 {
            return Err(Error::Argument("batch size must be positive".to_string()));
        }
        if self.memory.len() < batch_size {
            return Err(Error::InsufficientData {
                requested: batch_size,
                available: self.memory.len(),
            });
        }
        let mut batch = Batch::with_capacity(batch_size);
        for _ in 0..batch_size {
            let i = self.rng.gen_range(0..self.memory.len());
            batch.push(&self.memory[i]);
        }
        Ok(batch)
    }

    pub fn get(&self, slot: usize) -> Option<&Transition> {
        self.memory.get(slot)
    }

    /// Stored transitions from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        let (newer, older) = if self.memory.len() < self.capacity {
            self.memory.split_at(self.memory.len())
        } else {
            self.memory.split_at(self.index)
        };
        older.iter().chain(newer.iter())
    }

    pub fn len(&self) -> usize {
        self.memory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memory.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envs::Info;

    fn transition(i: usize) -> Transition {
        Transition {
            obs: vec![i as f32],
            act: vec![-(i as f32)],
            rew: i as f64,
            obs_next: vec![i as f32 + 1.0],
            done: i % 2 == 0,
            info: Info::new(),
        }
    }

    #[test]
    fn test_replay_buffer_new() {
        let buffer = ReplayBuffer::new(100, 0);
        assert_eq!(buffer.len(), 0);
        assert!(buffer.is_empty());
        assert_eq!(buffer.capacity(), 100);
    }

    #[test]
    #[should_panic]
    fn test_replay_buffer_zero_capacity() {
        ReplayBuffer::new(0, 0);
    }

    #[test]
    fn test_replay_buffer_insert_returns_slot() {
        let mut buffer = ReplayBuffer::new(3, 0);
        let slots: Vec<usize> = (0..5).map(|i| buffer.insert(transition(i))).collect();
        assert_eq!(slots, vec![0, 1, 2, 0, 1]);
    }

    #[test]
    fn test_replay_buffer_evicts_oldest() {
        let capacity = 5;
        let k = 3;
        let mut buffer = ReplayBuffer::new(capacity, 0);
        for i in 0..capacity + k {
            buffer.insert(transition(i));
        }
        assert_eq!(buffer.len(), capacity);

        let rewards: Vec<f64> = buffer.iter().map(|t| t.rew).collect();
        assert_eq!(rewards, vec![3.0, 4.0, 5.0, 6.0, 7.0]);
        for i in 0..k {
            assert!(buffer.iter().all(|t| t.rew != i as f64));
        }
    }

    #[test]
    fn test_replay_buffer_iter_before_full() {
        let mut buffer = ReplayBuffer::new(10, 0);
        for i in 0..4 {
            buffer.insert(transition(i));
        }
        let rewards: Vec<f64> = buffer.iter().map(|t| t.rew).collect();
        assert_eq!(rewards, vec![0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_replay_buffer_sample_is_aligned() {
        let mut buffer = ReplayBuffer::new(100, 0);
        for i in 0..10 {
            buffer.insert(transition(i));
        }
        let batch = buffer.sample(32).unwrap();
        assert_eq!(batch.len(), 32);
        assert_eq!(batch.act.len(), 32);
        assert_eq!(batch.rew.len(), 32);
        assert_eq!(batch.obs_next.len(), 32);
        assert_eq!(batch.done.len(), 32);
        for j in 0..batch.len() {
            let i = batch.rew[j];
            assert_eq!(batch.obs[j], vec![i as f32]);
            assert_eq!(batch.act[j], vec![-(i as f32)]);
            assert_eq!(batch.obs_next[j], vec![i as f32 + 1.0]);
            assert_eq!(batch.done[j], (i as usize) % 2 == 0);
        }
    }

    #[test]
    fn test_replay_buffer_sample_insufficient() {
        let mut buffer = ReplayBuffer::new(100, 0);
        for i in 0..5 {
            buffer.insert(transition(i));
        }
        match buffer.sample(6) {
            Err(Error::InsufficientData {
                requested,
                available,
            }) => {
                assert_eq!(requested, 6);
                assert_eq!(available, 5);
            }
            _ => panic!("expected InsufficientData"),
        }
        assert!(buffer.sample(5).is_ok());
    }

    #[test]
    fn test_replay_buffer_sample_seeded() {
        let mut a = ReplayBuffer::new(50, 42);
        let mut b = ReplayBuffer::new(50, 42);
        for i in 0..50 {
            a.insert(transition(i));
            b.insert(transition(i));
        }
        assert_eq!(a.sample(16).unwrap().rew, b.sample(16).unwrap().rew);
    }
}
