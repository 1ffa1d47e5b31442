use tch::{Device, Tensor};

/// Stacks flat observations (or actions) into a `[batch, dim]` float tensor
/// on `device`.
pub(crate) fn batch_states(states: &[Vec<f32>], device: Device) -> Tensor {
    let dim = states.first().map_or(0, |s| s.len()) as i64;
    let flat: Vec<f32> = states.iter().flatten().copied().collect();
    Tensor::from_slice(&flat)
        .view([states.len() as i64, dim])
        .to_device(device)
}

/// Splits a `[batch, dim]` tensor back into per-row vectors.
pub(crate) fn unbatch(x: &Tensor) -> Result<Vec<Vec<f32>>, tch::TchError> {
    let size = x.size();
    let dim = size.last().copied().unwrap_or(1).max(1) as usize;
    let flat = x
        .to_device(Device::Cpu)
        .to_kind(tch::Kind::Float)
        .contiguous()
        .view([-1]);
    let flat = Vec::<f32>::try_from(&flat)?;
    Ok(flat.chunks(dim).map(|c| c.to_vec()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_states_cpu() {
        let states = vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]];

        let result = batch_states(&states, Device::Cpu);
        assert_eq!(result.device(), Device::Cpu);
        assert_eq!(result.size(), vec![2, 3]);

        let expected = Tensor::from_slice(&[1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0]).view([2, 3]);
        assert!(result.equal(&expected));
    }

    #[test]
    fn test_batch_states_cuda() {
        if Device::cuda_if_available().is_cuda() {
            let states = vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]];
            let result = batch_states(&states, Device::Cuda(0));
            assert_eq!(result.device(), Device::Cuda(0));
        } else {
            println!("Cuda is not available.");
        }
    }

    #[test]
    fn test_unbatch_round_rows() {
        let x = Tensor::from_slice(&[1.0f32, 2.0, 3.0, 4.0]).view([2, 2]);
        let rows = unbatch(&x).unwrap();
        assert_eq!(rows, vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
    }
}
