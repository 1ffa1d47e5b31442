use tch::nn::Init;

/// He Initialization
pub fn he_init(nin: i64) -> Init {
    let mean = 0.0;
    let stdev = (2.0 / nin as f64).sqrt();
    Init::Randn { mean, stdev }
}

/// Small uniform init for output heads, keeps initial actions and values
/// near zero.
pub fn final_layer_init(bound: f64) -> Init {
    Init::Uniform {
        lo: -bound,
        up: bound,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_he_init() {
        let nin = 4;
        match he_init(nin) {
            Init::Randn { mean, stdev } => {
                assert!((mean - 0.0).abs() < 1e-6, "Mean value mismatch");
                assert!(
                    (stdev - (2.0 / nin as f64).sqrt()).abs() < 1e-6,
                    "Standard deviation mismatch"
                );
            }
            _ => panic!("Expected Randn initialization"),
        }
    }

    #[test]
    fn test_final_layer_init() {
        match final_layer_init(3e-3) {
            Init::Uniform { lo, up } => {
                assert_eq!(lo, -3e-3);
                assert_eq!(up, 3e-3);
            }
            _ => panic!("Expected Uniform initialization"),
        }
    }
}
