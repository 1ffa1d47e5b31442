use tch::Tensor;

/// Source of additive exploration noise for continuous actions.
///
/// One process serves the whole environment pool; its elements are not tied
/// to particular slots.
pub trait BaseExplorer {
    /// Noise tensor of the given shape, one independent draw per element.
    fn sample(&mut self, shape: &[i64]) -> Tensor;
    /// Restarts the process. Called whenever any slot of the pool ends an
    /// exploring episode, so stateful processes also restart for slots still
    /// mid-episode.
    fn reset(&mut self) {}
}

pub(crate) fn numel(shape: &[i64]) -> usize {
    shape.iter().product::<i64>().max(0) as usize
}
