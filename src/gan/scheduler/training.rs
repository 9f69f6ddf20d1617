//! The phase state machine driving generator and discriminator updates.

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::{EpochReport, LossSummary, Network, TrainingCallback, TrainingPhase, UpdateEvent};
use crate::error::{Error, Result};
use crate::gan::discriminator::{FAKE_CLASS, REAL_CLASS};
use crate::gan::{
    BatchSource, Discriminator, Generator, MaliGanConfig, ModelBundle, Parametrized,
    RecurrentMemory, RewardEstimator, SequenceBatch, TrainingConfig,
};
use crate::train::{classification_loss, next_token_loss, ParameterUpdater};

/// Runs pretraining and adversarial training in strict phase order
///
/// ```text
/// PRETRAIN_GENERATOR ─► PRETRAIN_DISCRIMINATOR ─► ADVERSARIAL ─► DONE
///      g_epochs               d_epochs               epochs
/// ```
///
/// Each phase is entered exactly once. [`TrainingScheduler::pre_fit`] runs the
/// first two, [`TrainingScheduler::fit`] the third; calling them out of order,
/// twice, or after a failed step returns [`Error::InvalidTransition`].
pub struct TrainingScheduler {
    model_config: MaliGanConfig,
    config: TrainingConfig,
    generator: Generator,
    discriminator: Discriminator,
    memory: RecurrentMemory,
    g_updater: ParameterUpdater,
    d_updater: ParameterUpdater,
    phase: TrainingPhase,
    phase_started: bool,
    history: Vec<EpochReport>,
    callbacks: Vec<Box<dyn TrainingCallback>>,
    rng: StdRng,
}

impl TrainingScheduler {
    /// Validate both configurations and build fresh networks
    pub fn new(model_config: MaliGanConfig, config: TrainingConfig) -> Result<Self> {
        model_config.validate()?;
        config.validate()?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let generator = Generator::from_rng(&model_config, &mut rng)?;
        let discriminator = Discriminator::from_rng(&model_config, &mut rng)?;
        let memory = generator.memory(1);

        let g_updater = ParameterUpdater::new(
            config.optimizer.build(config.g_learning_rate),
            config.max_grad_norm,
        );
        let d_updater = ParameterUpdater::new(
            config.optimizer.build(config.d_learning_rate),
            config.max_grad_norm,
        );

        Ok(Self {
            model_config,
            config,
            generator,
            discriminator,
            memory,
            g_updater,
            d_updater,
            phase: TrainingPhase::PretrainGenerator,
            phase_started: false,
            history: Vec::new(),
            callbacks: Vec::new(),
            rng,
        })
    }

    pub fn add_callback<C: TrainingCallback + 'static>(&mut self, callback: C) {
        self.callbacks.push(Box::new(callback));
    }

    /// Current phase; after a failed step this is the phase that failed
    pub fn phase(&self) -> TrainingPhase {
        self.phase
    }

    /// Every completed epoch, in order
    pub fn history(&self) -> &[EpochReport] {
        &self.history
    }

    /// Latest epoch-mean loss of each loss stream
    pub fn last_losses(&self) -> LossSummary {
        LossSummary::from_history(&self.history)
    }

    pub fn generator(&self) -> &Generator {
        &self.generator
    }

    pub fn discriminator(&self) -> &Discriminator {
        &self.discriminator
    }

    pub fn model_config(&self) -> &MaliGanConfig {
        &self.model_config
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Generator updater, including the running loss of an unfinished epoch
    pub fn generator_updater(&self) -> &ParameterUpdater {
        &self.g_updater
    }

    /// Discriminator updater, including the running loss of an unfinished epoch
    pub fn discriminator_updater(&self) -> &ParameterUpdater {
        &self.d_updater
    }

    /// Both networks' weights
    pub fn export(&self) -> ModelBundle {
        ModelBundle {
            generator: self.generator.export(),
            discriminator: self.discriminator.export(),
        }
    }

    /// Replace both networks' weights; the phase is unchanged
    pub fn import(&mut self, bundle: &ModelBundle) -> Result<()> {
        self.generator.import(&bundle.generator)?;
        self.discriminator.import(&bundle.discriminator)
    }

    /// Sample from the current generator
    pub fn sample(
        &mut self,
        batch_size: usize,
        length: usize,
        temperature: f32,
    ) -> Result<(SequenceBatch, SequenceBatch)> {
        self.generator.generate(&mut self.memory, batch_size, length, temperature, &mut self.rng)
    }

    /// Pretrain the generator, then the discriminator
    pub fn pre_fit<S: BatchSource + ?Sized>(&mut self, source: &mut S) -> Result<()> {
        self.pretrain_generator(source)?;
        self.pretrain_discriminator(source)
    }

    /// Adversarial phase; requires [`TrainingScheduler::pre_fit`] to have completed
    pub fn fit<S: BatchSource + ?Sized>(&mut self, source: &mut S) -> Result<()> {
        let phase = TrainingPhase::Adversarial;
        self.begin_phase(phase)?;

        for epoch in 0..self.config.epochs {
            self.g_updater.reset_epoch();
            self.d_updater.reset_epoch();
            let mut batches = 0;

            for (batch, (x, _)) in source.batches().enumerate() {
                let at = |e: Error| e.at_step(phase, epoch, batch);

                let loss = self.adversarial_generator_step(&x).map_err(at)?;
                self.notify_update(phase, Network::Generator, epoch, batch, loss);

                for _ in 0..self.config.d_epochs {
                    let losses = self.discriminator_round(&x).map_err(at)?;
                    for loss in losses {
                        self.notify_update(phase, Network::Discriminator, epoch, batch, loss);
                    }
                }
                batches += 1;
            }

            self.finish_epoch(phase, epoch, batches);
        }

        self.end_phase();
        Ok(())
    }

    /// `pre_fit` followed by `fit`
    pub fn run<S: BatchSource + ?Sized>(&mut self, source: &mut S) -> Result<LossSummary> {
        self.pre_fit(source)?;
        self.fit(source)?;
        Ok(self.last_losses())
    }

    fn pretrain_generator<S: BatchSource + ?Sized>(&mut self, source: &mut S) -> Result<()> {
        let phase = TrainingPhase::PretrainGenerator;
        self.begin_phase(phase)?;

        for epoch in 0..self.config.g_epochs {
            self.g_updater.reset_epoch();
            let mut batches = 0;

            for (batch, (x, y)) in source.batches().enumerate() {
                let loss = self
                    .g_updater
                    .step(&mut self.generator, |g| next_token_loss(&g.forward(&x)?, &y, None))
                    .map_err(|e| e.at_step(phase, epoch, batch))?;
                self.notify_update(phase, Network::Generator, epoch, batch, loss);
                batches += 1;
            }

            self.finish_epoch(phase, epoch, batches);
        }

        self.end_phase();
        Ok(())
    }

    fn pretrain_discriminator<S: BatchSource + ?Sized>(&mut self, source: &mut S) -> Result<()> {
        let phase = TrainingPhase::PretrainDiscriminator;
        self.begin_phase(phase)?;

        for epoch in 0..self.config.d_epochs {
            self.d_updater.reset_epoch();
            let mut batches = 0;

            for (batch, (x, _)) in source.batches().enumerate() {
                let losses =
                    self.discriminator_round(&x).map_err(|e| e.at_step(phase, epoch, batch))?;
                for loss in losses {
                    self.notify_update(phase, Network::Discriminator, epoch, batch, loss);
                }
                batches += 1;
            }

            self.finish_epoch(phase, epoch, batches);
        }

        self.end_phase();
        Ok(())
    }

    /// Sample fakes shaped like `x_real`, reward them, and take one
    /// policy-gradient step
    fn adversarial_generator_step(&mut self, x_real: &SequenceBatch) -> Result<f32> {
        let (batch_size, length) = x_real.shape();
        let (x_fake, y_fake) = self.generator.generate(
            &mut self.memory,
            batch_size,
            length,
            self.model_config.temperature,
            &mut self.rng,
        )?;
        let reward =
            RewardEstimator::estimate(&x_fake, self.config.n_rollouts, &self.discriminator)?;

        self.g_updater.step(&mut self.generator, |g| {
            next_token_loss(&g.forward(&x_fake)?, &y_fake, Some(&reward))
        })
    }

    /// One fresh fake batch against `x_real`, then `d_steps` updates, each
    /// on a random half of the pooled real + fake rows
    fn discriminator_round(&mut self, x_real: &SequenceBatch) -> Result<Vec<f32>> {
        let (batch_size, length) = x_real.shape();
        let (x_fake, _) = self.generator.generate(
            &mut self.memory,
            batch_size,
            length,
            self.model_config.temperature,
            &mut self.rng,
        )?;
        let pool = x_real.concat(&x_fake)?;
        let mut labels = vec![REAL_CLASS as u32; batch_size];
        labels.resize(2 * batch_size, FAKE_CLASS as u32);

        let mut losses = Vec::with_capacity(self.config.d_steps);
        for _ in 0..self.config.d_steps {
            let picks = rand::seq::index::sample(&mut self.rng, 2 * batch_size, batch_size)
                .into_vec();
            let subset = pool.select_rows(&picks);
            let subset_labels: Vec<u32> = picks.iter().map(|&i| labels[i]).collect();

            let rng = &mut self.rng;
            let loss = self.d_updater.step(&mut self.discriminator, |d| {
                classification_loss(&d.forward_train(&subset, rng)?, &subset_labels)
            })?;
            tracing::debug!(loss, "discriminator step");
            losses.push(loss);
        }
        Ok(losses)
    }

    fn begin_phase(&mut self, phase: TrainingPhase) -> Result<()> {
        if self.phase != phase || self.phase_started {
            return Err(Error::InvalidTransition { from: self.phase, to: phase });
        }
        self.phase_started = true;
        tracing::info!(%phase, "entering phase");
        for callback in &mut self.callbacks {
            callback.on_phase_begin(phase);
        }
        Ok(())
    }

    fn end_phase(&mut self) {
        self.phase = self.phase.next();
        self.phase_started = false;
    }

    fn notify_update(
        &mut self,
        phase: TrainingPhase,
        network: Network,
        epoch: usize,
        batch: usize,
        loss: f32,
    ) {
        tracing::debug!(%phase, ?network, epoch, batch, loss, "update");
        let event = UpdateEvent { phase, network, epoch, batch, loss };
        for callback in &mut self.callbacks {
            callback.on_update(&event);
        }
    }

    fn finish_epoch(&mut self, phase: TrainingPhase, epoch: usize, batches: usize) {
        let mean = |updater: &ParameterUpdater| {
            (updater.loss().count() > 0).then(|| updater.epoch_loss())
        };
        let (generator_loss, discriminator_loss) = match phase {
            TrainingPhase::PretrainGenerator => (mean(&self.g_updater), None),
            TrainingPhase::PretrainDiscriminator => (None, mean(&self.d_updater)),
            _ => (mean(&self.g_updater), mean(&self.d_updater)),
        };
        let report = EpochReport { phase, epoch, generator_loss, discriminator_loss, batches };

        tracing::info!(
            %phase,
            epoch,
            batches,
            generator_loss = ?report.generator_loss,
            discriminator_loss = ?report.discriminator_loss,
            "epoch complete"
        );
        for callback in &mut self.callbacks {
            callback.on_epoch_end(&report);
        }
        self.history.push(report);
    }
}
