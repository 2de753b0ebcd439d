//! A from-scratch feedforward sigmoid network with mini-batch SGD training,
//! after <http://neuralnetworksanddeeplearning.com/>.
//!
//! All randomness (parameter initialization, per-epoch shuffling) flows from
//! caller-supplied [`rand::Rng`] instances, so a fixed seed reproduces a
//! training run exactly.

pub mod activation;
pub mod error;
pub mod network;
pub mod train;

pub use error::{NetworkError, Result};
pub use network::{Example, Gradients, Network};
pub use train::{EpochReport, TrainingConfig};
