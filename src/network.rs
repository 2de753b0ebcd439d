use std::iter::zip;

use itertools::izip;
use nalgebra::{DMatrix, DVector};
use rand::Rng;
use rand_distr::StandardNormal;
use rayon::prelude::*;

use crate::activation::{sigmoid, sigmoid_prime};
use crate::error::{NetworkError, Result};

/// One labeled data point: an input vector of the network's input width and
/// a target vector of its output width. Never mutated by the network.
#[derive(Debug, Clone, PartialEq)]
pub struct Example {
    pub input: DVector<f64>,
    pub target: DVector<f64>,
}

impl Example {
    pub fn new(input: DVector<f64>, target: DVector<f64>) -> Self {
        Example { input, target }
    }
}

/// Per-layer cost gradients, shaped exactly like the network's parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Gradients {
    pub nabla_b: Vec<DVector<f64>>,
    pub nabla_w: Vec<DMatrix<f64>>,
}

impl Gradients {
    /// Zero gradients matching `net`'s parameter shapes.
    pub fn zeros_like(net: &Network) -> Self {
        Gradients {
            nabla_b: net.biases.iter().map(|b| DVector::zeros(b.nrows())).collect(),
            nabla_w: net
                .weights
                .iter()
                .map(|w| {
                    let (r, c) = w.shape();

                    DMatrix::zeros(r, c)
                })
                .collect(),
        }
    }

    /// Elementwise sum of another gradient into this one.
    pub fn accumulate(&mut self, delta: Gradients) {
        for (n, dn) in zip(&mut self.nabla_b, delta.nabla_b) {
            *n += dn;
        }
        for (n, dn) in zip(&mut self.nabla_w, delta.nabla_w) {
            *n += dn;
        }
    }
}

/// Fully connected sigmoid network trained under the quadratic cost.
///
/// For layer sizes `[n0, .., nL]` it owns, per layer `l` in `1..=L`, a weight
/// matrix of shape `(n_l, n_{l-1})` and a bias vector of length `n_l`. The
/// parameters are only ever mutated through [`Network::apply_update`].
pub struct Network {
    layer_sizes: Vec<usize>,
    biases: Vec<DVector<f64>>,
    weights: Vec<DMatrix<f64>>,
}

impl Network {
    /// Builds a network with every weight and bias drawn independently from
    /// the standard normal distribution of the given generator.
    pub fn new(layer_sizes: &[usize], rng: &mut impl Rng) -> Result<Self> {
        check_sizes(layer_sizes)?;

        let biases: Vec<_> = layer_sizes
            .iter()
            .skip(1)
            .map(|&nr| DVector::from_fn(nr, |_, _| rng.sample(StandardNormal)))
            .collect();

        let weights: Vec<_> = zip(layer_sizes.iter(), layer_sizes.iter().skip(1))
            .map(|(&left_layer_len, &right_layer_len)| {
                DMatrix::from_fn(right_layer_len, left_layer_len, |_, _| {
                    rng.sample(StandardNormal)
                })
            })
            .collect();

        Ok(Network {
            layer_sizes: Vec::from(layer_sizes),
            biases,
            weights,
        })
    }

    /// Builds a network from explicit parameters, checking every shape
    /// against the adjacent layer sizes.
    pub fn from_parts(
        layer_sizes: Vec<usize>,
        weights: Vec<DMatrix<f64>>,
        biases: Vec<DVector<f64>>,
    ) -> Result<Self> {
        check_sizes(&layer_sizes)?;

        let num_layers = layer_sizes.len() - 1;

        if weights.len() != num_layers || biases.len() != num_layers {
            return Err(NetworkError::InvalidArchitecture(format!(
                "expected {} weight matrices and bias vectors, got {} and {}",
                num_layers,
                weights.len(),
                biases.len()
            )));
        }

        for (l, (w, b)) in zip(&weights, &biases).enumerate() {
            let expected = (layer_sizes[l + 1], layer_sizes[l]);

            if w.shape() != expected {
                return Err(NetworkError::InvalidArchitecture(format!(
                    "weight matrix {} has shape {:?}, expected {:?}",
                    l,
                    w.shape(),
                    expected
                )));
            }

            if b.nrows() != layer_sizes[l + 1] {
                return Err(NetworkError::InvalidArchitecture(format!(
                    "bias vector {} has length {}, expected {}",
                    l,
                    b.nrows(),
                    layer_sizes[l + 1]
                )));
            }
        }

        Ok(Network {
            layer_sizes,
            biases,
            weights,
        })
    }

    pub fn layer_sizes(&self) -> &[usize] {
        &self.layer_sizes
    }

    pub fn weights(&self) -> &[DMatrix<f64>] {
        &self.weights
    }

    pub fn biases(&self) -> &[DVector<f64>] {
        &self.biases
    }

    fn input_len(&self) -> usize {
        self.layer_sizes[0]
    }

    fn output_len(&self) -> usize {
        *self.layer_sizes.last().unwrap()
    }

    fn check_input(&self, input: &DVector<f64>) -> Result<()> {
        if input.nrows() != self.input_len() {
            return Err(NetworkError::DimensionMismatch {
                what: "input",
                expected: self.input_len(),
                found: input.nrows(),
            });
        }

        Ok(())
    }

    fn check_target(&self, target: &DVector<f64>) -> Result<()> {
        if target.nrows() != self.output_len() {
            return Err(NetworkError::DimensionMismatch {
                what: "target",
                expected: self.output_len(),
                found: target.nrows(),
            });
        }

        Ok(())
    }

    /// Output activation for `input`. Pure for fixed parameters.
    pub fn feed_forward(&self, input: &DVector<f64>) -> Result<DVector<f64>> {
        self.check_input(input)?;

        Ok(zip(&self.weights, &self.biases)
            .fold(input.clone(), |a, (w, b)| (w * a + b).map(sigmoid)))
    }

    /// Forward pass keeping every pre-activation and activation, the cached
    /// inputs backpropagation consumes. `activations` has one more entry
    /// than `zs`: it starts with the input itself.
    fn forward_trace(&self, input: &DVector<f64>) -> (Vec<DVector<f64>>, Vec<DVector<f64>>) {
        let mut zs = Vec::with_capacity(self.weights.len());
        let mut activations = Vec::with_capacity(self.weights.len() + 1);

        activations.push(input.clone());

        for (w, b) in zip(&self.weights, &self.biases) {
            let z = w * activations.last().unwrap() + b;

            activations.push(z.map(sigmoid));
            zs.push(z);
        }

        (zs, activations)
    }

    /// Gradient of the quadratic cost for one example, by reverse
    /// accumulation of the layer-local errors.
    pub fn back_prop(&self, example: &Example) -> Result<Gradients> {
        self.check_input(&example.input)?;
        self.check_target(&example.target)?;

        let (zs, activations) = self.forward_trace(&example.input);

        let mut grads = Gradients::zeros_like(self);

        // Output layer: delta = (a_L - y) .* sigmoid'(z_L)
        let mut delta = (activations.last().unwrap() - &example.target)
            .component_mul(&zs.last().unwrap().map(sigmoid_prime));

        *grads.nabla_b.last_mut().unwrap() = delta.clone();
        *grads.nabla_w.last_mut().unwrap() =
            &delta * &activations[activations.len() - 2].transpose();

        // Hidden layers, walking backwards:
        // delta_l = (W_{l+1}^T delta_{l+1}) .* sigmoid'(z_l)
        for (z, w, nb, nw, a) in izip!(
            zs.iter().rev().skip(1),
            self.weights.iter().rev(),
            grads.nabla_b.iter_mut().rev().skip(1),
            grads.nabla_w.iter_mut().rev().skip(1),
            activations.iter().rev().skip(2)
        ) {
            let sp = z.map(sigmoid_prime);
            delta = (w.transpose() * delta).component_mul(&sp);

            *nb = delta.clone();
            *nw = &delta * &a.transpose();
        }

        Ok(grads)
    }

    /// SGD step: every parameter moves by `-(eta / batch_len)` times its
    /// accumulated gradient.
    pub fn apply_update(&mut self, grads: &Gradients, eta: f64, batch_len: usize) {
        let rate = eta / (batch_len as f64);

        for (b, nb) in zip(&mut self.biases, &grads.nabla_b) {
            *b -= nb * rate;
        }

        for (w, nw) in zip(&mut self.weights, &grads.nabla_w) {
            *w -= nw * rate;
        }
    }

    /// Number of examples whose predicted class (arg-max of the output)
    /// matches the arg-max of the target.
    pub fn evaluate(&self, test_set: &[Example]) -> Result<usize> {
        test_set
            .par_iter()
            .map(|ex| {
                self.check_target(&ex.target)?;

                let out = self.feed_forward(&ex.input)?;

                Ok(usize::from(out.argmax().0 == ex.target.argmax().0))
            })
            .try_reduce(|| 0, |a, b| Ok(a + b))
    }

    /// Mean quadratic cost `0.5 * |a_L - y|^2` over a set of examples.
    pub fn quadratic_cost(&self, examples: &[Example]) -> Result<f64> {
        if examples.is_empty() {
            return Ok(0.0);
        }

        let total = examples
            .iter()
            .map(|ex| {
                self.check_target(&ex.target)?;

                let out = self.feed_forward(&ex.input)?;

                Ok(0.5 * (out - &ex.target).norm_squared())
            })
            .sum::<Result<f64>>()?;

        Ok(total / examples.len() as f64)
    }
}

fn check_sizes(layer_sizes: &[usize]) -> Result<()> {
    if layer_sizes.len() < 2 {
        return Err(NetworkError::InvalidArchitecture(format!(
            "need at least 2 layer sizes, got {}",
            layer_sizes.len()
        )));
    }

    if let Some(l) = layer_sizes.iter().position(|&n| n == 0) {
        return Err(NetworkError::InvalidArchitecture(format!(
            "layer {} has size 0",
            l
        )));
    }

    Ok(())
}
