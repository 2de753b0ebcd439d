use std::time::Instant;

use itertools::Itertools;
use permutation_iterator::Permutor;
use rand::Rng;
use rayon::prelude::*;

use crate::error::{NetworkError, Result};
use crate::network::{Example, Gradients, Network};

/// Hyperparameters for one SGD run. All fields must be positive.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingConfig {
    pub epochs: u32,
    pub mini_batch_size: usize,
    pub eta: f64,
}

impl TrainingConfig {
    fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            return Err(NetworkError::InvalidConfig("epochs must be positive".into()));
        }

        if self.mini_batch_size == 0 {
            return Err(NetworkError::InvalidConfig(
                "mini-batch size must be positive".into(),
            ));
        }

        if !(self.eta > 0.0) {
            return Err(NetworkError::InvalidConfig(format!(
                "learning rate must be positive, got {}",
                self.eta
            )));
        }

        Ok(())
    }
}

/// Progress signal handed to the caller once per completed epoch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpochReport {
    /// 1-based index of the epoch that just finished.
    pub epoch: u32,
    /// Correct count on the test set, when one was supplied.
    pub score: Option<usize>,
}

impl Network {
    /// Mini-batch stochastic gradient descent.
    ///
    /// Each epoch draws a fresh permutation of the training set keyed from
    /// `rng`, walks it in mini-batches of `config.mini_batch_size` (the last
    /// batch may be smaller), and applies one parameter update per batch,
    /// dividing by the batch's actual length. After every epoch `on_epoch`
    /// receives an [`EpochReport`]; the score is filled in by evaluating
    /// `test_set` when one is given.
    ///
    /// The first two epochs time a rayon-parallel and a serial batch path,
    /// later epochs use whichever was faster. Both paths sum per-example
    /// gradients in batch order, so a fixed `rng` seed reproduces the same
    /// trajectory regardless of which path runs.
    pub fn train_sgd<R: Rng, F: FnMut(&EpochReport)>(
        &mut self,
        training_set: &[Example],
        test_set: Option<&[Example]>,
        config: &TrainingConfig,
        rng: &mut R,
        mut on_epoch: F,
    ) -> Result<()> {
        config.validate()?;

        let mut parallel_time = Option::<u128>::None;
        let mut serial_time = Option::<u128>::None;

        for epoch in 1..=config.epochs {
            let epoch_start = Instant::now();
            let parallel = match (parallel_time, serial_time) {
                (None, _) => true,
                (_, None) => false,
                (Some(p), Some(s)) => p < s,
            };

            for batch in epoch_batches(training_set.len(), config.mini_batch_size, rng.gen()) {
                if parallel {
                    self.update_batch_parallel(training_set, &batch, config.eta)?;
                } else {
                    self.update_batch(training_set, &batch, config.eta)?;
                }
            }

            let elapsed = epoch_start.elapsed().as_millis();

            if parallel {
                &mut parallel_time
            } else {
                &mut serial_time
            }
            .get_or_insert(elapsed);

            let score = match test_set {
                Some(td) => Some(self.evaluate(td)?),
                None => None,
            };

            on_epoch(&EpochReport { epoch, score });
        }

        Ok(())
    }

    fn update_batch(&mut self, training_set: &[Example], batch: &[usize], eta: f64) -> Result<()> {
        let mut grads = Gradients::zeros_like(self);

        for &idx in batch {
            grads.accumulate(self.back_prop(&training_set[idx])?);
        }

        self.apply_update(&grads, eta, batch.len());

        Ok(())
    }

    fn update_batch_parallel(
        &mut self,
        training_set: &[Example],
        batch: &[usize],
        eta: f64,
    ) -> Result<()> {
        // collect keeps batch order, so the summation below adds the same
        // gradients in the same order as the serial path
        let per_example = batch
            .par_iter()
            .map(|&idx| self.back_prop(&training_set[idx]))
            .collect::<Result<Vec<_>>>()?;

        let mut grads = Gradients::zeros_like(self);

        for delta in per_example {
            grads.accumulate(delta);
        }

        self.apply_update(&grads, eta, batch.len());

        Ok(())
    }
}

/// Pseudorandom partition of `0..len` into consecutive mini-batches. Every
/// index appears exactly once; the final batch holds the remainder when
/// `len` does not divide evenly.
fn epoch_batches(len: usize, batch_size: usize, key: u64) -> Vec<Vec<usize>> {
    if len == 0 {
        return Vec::new();
    }

    Permutor::new_with_u64_key(len as u64, key)
        .chunks(batch_size)
        .into_iter()
        .map(|chunk| chunk.map(|i| i as usize).collect())
        .collect()
}
