use tch::nn::VarStore;
use tch::no_grad;

/// Polyak averaging of every variable of `target` toward the variable of the
/// same name in `online`: `θ′ ← τ·θ + (1 − τ)·θ′`.
///
/// Both stores must come from the same architecture.
pub(crate) fn soft_update(target: &VarStore, online: &VarStore, tau: f64) {
    let online_vars = online.variables();
    no_grad(|| {
        for (name, mut target_var) in target.variables() {
            if let Some(online_var) = online_vars.get(&name) {
                let mixed = online_var * tau + &target_var * (1.0 - tau);
                target_var.copy_(&mixed);
            }
        }
    });
}
