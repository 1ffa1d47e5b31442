use super::base_policy_network::BaseDeterministicPolicy;
use crate::misc::weight_initializer::{final_layer_init, he_init};
use tch::nn::{linear, Init, Linear, LinearConfig, Module, VarStore};
use tch::{no_grad, Device, Kind, Tensor};

/// Fully connected actor. When both bounds are given the output is squashed
/// with tanh into `[min_action, max_action]`.
pub struct FCDeterministicPolicy {
    vs: VarStore,
    layers: Vec<Linear>,
    n_input_channels: i64,
    action_size: i64,
    n_hidden_layers: usize,
    n_hidden_channels: i64,
    min_action: Option<Vec<f32>>,
    max_action: Option<Vec<f32>>,
}

impl FCDeterministicPolicy {
    pub fn new(
        vs: VarStore,
        n_input_channels: i64,
        action_size: i64,
        n_hidden_layers: usize,
        n_hidden_channels: i64,
        min_action: Option<Vec<f32>>,
        max_action: Option<Vec<f32>>,
    ) -> Self {
        if let (Some(min), Some(max)) = (&min_action, &max_action) {
            assert_eq!(min.len() as i64, action_size);
            assert_eq!(max.len() as i64, action_size);
        }
        let root = vs.root();
        let mut layers: Vec<Linear> = Vec::new();

        layers.push(linear(
            &root / "input",
            n_input_channels,
            n_hidden_channels,
            LinearConfig {
                ws_init: he_init(n_input_channels),
                bs_init: Some(Init::Const(0.0)),
                bias: true,
            },
        ));
        for i in 0..n_hidden_layers {
            layers.push(linear(
                &root / format!("hidden_{}", i),
                n_hidden_channels,
                n_hidden_channels,
                LinearConfig {
                    ws_init: he_init(n_hidden_channels),
                    bs_init: Some(Init::Const(0.0)),
                    bias: true,
                },
            ));
        }
        layers.push(linear(
            &root / "action",
            n_hidden_channels,
            action_size,
            LinearConfig {
                ws_init: final_layer_init(3e-3),
                bs_init: Some(Init::Const(0.0)),
                bias: true,
            },
        ));

        FCDeterministicPolicy {
            vs,
            layers,
            n_input_channels,
            action_size,
            n_hidden_layers,
            n_hidden_channels,
            min_action,
            max_action,
        }
    }

    fn bound_by_tanh(&self, x: Tensor) -> Tensor {
        let (min_action, max_action) = match (&self.min_action, &self.max_action) {
            (Some(min), Some(max)) => (min, max),
            _ => return x,
        };
        let device = x.device();
        let min_action = Tensor::from_slice(min_action).to_device(device);
        let max_action = Tensor::from_slice(max_action).to_device(device);
        let scale = (&max_action - &min_action) / 2.0;
        let x_mean = (&max_action + &min_action) / 2.0;
        x.tanh() * scale + x_mean
    }
}

impl BaseDeterministicPolicy for FCDeterministicPolicy {
    fn forward(&self, x: &Tensor) -> Tensor {
        let mut h = x.to_kind(Kind::Float).view([-1, self.n_input_channels]);
        for i in 0..self.layers.len() {
            h = self.layers[i].forward(&h);
            if i < self.layers.len() - 1 {
                h = h.relu();
            }
        }
        self.bound_by_tanh(h.view([-1, self.action_size]))
    }

    fn device(&self) -> Device {
        self.vs.device()
    }

    fn var_store(&self) -> &VarStore {
        &self.vs
    }

    fn var_store_mut(&mut self) -> &mut VarStore {
        &mut self.vs
    }

    fn clone(&self) -> Box<dyn BaseDeterministicPolicy> {
        let vs = VarStore::new(self.device());
        let mut cloned_network = FCDeterministicPolicy::new(
            vs,
            self.n_input_channels,
            self.action_size,
            self.n_hidden_layers,
            self.n_hidden_channels,
            self.min_action.clone(),
            self.max_action.clone(),
        );

        no_grad(|| {
            for (cloned_layer, original_layer) in cloned_network.layers.iter_mut().zip(&self.layers)
            {
                cloned_layer.ws.copy_(&original_layer.ws);
                if let Some(ref mut cloned_bs) = cloned_layer.bs {
                    if let Some(ref original_bs) = &original_layer.bs {
                        cloned_bs.copy_(original_bs);
                    }
                }
            }
        });

        Box::new(cloned_network)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(min_action: Option<Vec<f32>>, max_action: Option<Vec<f32>>) -> FCDeterministicPolicy {
        FCDeterministicPolicy::new(
            VarStore::new(Device::Cpu),
            3,
            2,
            1,
            32,
            min_action,
            max_action,
        )
    }

    #[test]
    fn test_forward_shape() {
        let network = policy(None, None);
        let input = Tensor::randn([5, 3], (Kind::Float, Device::Cpu));
        assert_eq!(network.forward(&input).size(), vec![5, 2]);
        assert_eq!(network.layers.len(), 3);
    }

    #[test]
    fn test_bound_by_tanh() {
        let network = policy(Some(vec![-1.0, 0.0]), Some(vec![1.0, 4.0]));
        let x = Tensor::from_slice(&[-100.0f32, -100.0, 0.0, 0.0, 100.0, 100.0]).view([3, 2]);
        let bounded = network.bound_by_tanh(x);
        let expected = Tensor::from_slice(&[-1.0f32, 0.0, 0.0, 2.0, 1.0, 4.0]).view([3, 2]);
        assert!(bounded.allclose(&expected, 1e-5, 1e-5, false));
    }

    #[test]
    fn test_clone() {
        let network = policy(Some(vec![-2.0; 2]), Some(vec![2.0; 2]));
        let cloned_network = network.clone();

        let input = Tensor::randn([4, 3], (Kind::Float, Device::Cpu));
        let output_original = network.forward(&input);
        let output_cloned = cloned_network.forward(&input);
        assert!(output_original.allclose(&output_cloned, 1e-6, 1e-6, false));

        // The copy owns separate parameters.
        no_grad(|| {
            for (_, mut var) in cloned_network.var_store().variables() {
                let _ = var.fill_(0.0);
            }
        });
        let output_original_after = network.forward(&input);
        assert!(output_original.allclose(&output_original_after, 1e-6, 1e-6, false));
    }
}
