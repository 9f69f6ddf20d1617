//! End-to-end training scenarios through the public API

use std::cell::RefCell;
use std::rc::Rc;

use rand::SeedableRng;

use maligan::gan::{
    BatchPair, EventLog, Generator, MaliGanConfig, Network, SequenceBatch, TrainingConfig,
    TrainingPhase, TrainingScheduler,
};
use maligan::Error;

fn small_model() -> MaliGanConfig {
    MaliGanConfig {
        vocab_size: 5,
        embedding_size: 4,
        hidden_size: 8,
        max_length: 3,
        n_filters: vec![4, 4],
        filters_size: vec![1, 2],
        ..MaliGanConfig::default()
    }
}

fn minimal_schedule() -> TrainingConfig {
    TrainingConfig {
        g_epochs: 1,
        d_epochs: 1,
        d_steps: 1,
        n_rollouts: 1,
        epochs: 1,
        seed: Some(42),
        ..TrainingConfig::default()
    }
}

/// Four real sequences of length 3 and their next-token targets
fn synthetic_batches() -> Vec<BatchPair> {
    let full = [[0, 1, 2, 3], [1, 2, 3, 4], [4, 3, 2, 1], [2, 2, 0, 0]];
    let x: Vec<Vec<u32>> = full.iter().map(|r| r[..3].to_vec()).collect();
    let y: Vec<Vec<u32>> = full.iter().map(|r| r[1..].to_vec()).collect();
    vec![(
        SequenceBatch::from_rows(&x, 5).unwrap(),
        SequenceBatch::from_rows(&y, 5).unwrap(),
    )]
}

#[test]
fn generate_returns_offset_pairs() {
    let generator = Generator::with_seed(&small_model(), 7).unwrap();
    let mut memory = generator.memory(2);
    let mut rng = rand::rngs::StdRng::seed_from_u64(7);

    let (x, y) = generator.generate(&mut memory, 2, 3, 1.0, &mut rng).unwrap();

    assert_eq!(x.shape(), (2, 3));
    assert_eq!(y.shape(), (2, 3));
    assert!(x.tokens().iter().chain(y.tokens().iter()).all(|&t| t < 5));
    for i in 0..2 {
        for j in 0..2 {
            assert_eq!(y.tokens()[[i, j]], x.tokens()[[i, j + 1]]);
        }
    }
}

#[test]
fn generate_rejects_non_positive_temperature() {
    let generator = Generator::with_seed(&small_model(), 7).unwrap();
    let mut memory = generator.memory(2);
    let mut rng = rand::rngs::StdRng::seed_from_u64(7);

    for t in [0.0, -0.5] {
        let err = generator.generate(&mut memory, 2, 3, t, &mut rng).unwrap_err();
        assert!(matches!(err, Error::InvalidTemperature(_)));
    }
}

#[test]
fn full_schedule_reports_four_finite_losses() {
    let mut scheduler = TrainingScheduler::new(small_model(), minimal_schedule()).unwrap();
    let mut batches = synthetic_batches();

    let summary = scheduler.run(&mut batches).unwrap();

    assert_eq!(scheduler.phase(), TrainingPhase::Done);
    let losses = summary.as_array().map(|l| l.expect("every stream is reported"));
    // Zero-mean rewards make the adversarial generator loss signed, so it is
    // only required to be finite.
    assert!(losses.iter().all(|l| l.is_finite()));
    assert!(summary.pretrain_generator.unwrap() >= 0.0);
    assert!(summary.pretrain_discriminator.unwrap() >= 0.0);
    assert!(summary.adversarial_discriminator.unwrap() >= 0.0);
}

#[test]
fn no_update_crosses_a_phase_boundary() {
    let log = Rc::new(RefCell::new(EventLog::default()));
    let config = TrainingConfig { g_epochs: 2, d_epochs: 2, d_steps: 2, ..minimal_schedule() };
    let mut scheduler = TrainingScheduler::new(small_model(), config).unwrap();
    scheduler.add_callback(Rc::clone(&log));

    scheduler.run(&mut synthetic_batches()).unwrap();

    let log = log.borrow();
    assert_eq!(
        log.phases,
        [
            TrainingPhase::PretrainGenerator,
            TrainingPhase::PretrainDiscriminator,
            TrainingPhase::Adversarial
        ]
    );

    // Phases appear as contiguous, ordered runs
    let order = |p: TrainingPhase| log.phases.iter().position(|&q| q == p).unwrap();
    assert!(log.updates.windows(2).all(|w| order(w[0].phase) <= order(w[1].phase)));

    let first_d = log.updates.iter().position(|u| u.network == Network::Discriminator).unwrap();
    let last_pretrain_g = log
        .updates
        .iter()
        .rposition(|u| u.phase == TrainingPhase::PretrainGenerator)
        .unwrap();
    assert!(last_pretrain_g < first_d);

    // Epoch reports close each phase before the next one's updates begin
    let pretrain_d_reports =
        log.epochs.iter().filter(|r| r.phase == TrainingPhase::PretrainDiscriminator).count();
    assert_eq!(pretrain_d_reports, 2);
}

#[test]
fn phases_cannot_be_skipped_or_repeated() {
    let mut scheduler = TrainingScheduler::new(small_model(), minimal_schedule()).unwrap();
    let mut batches = synthetic_batches();

    let err = scheduler.fit(&mut batches).unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidTransition {
            from: TrainingPhase::PretrainGenerator,
            to: TrainingPhase::Adversarial
        }
    ));

    scheduler.pre_fit(&mut batches).unwrap();
    assert!(matches!(scheduler.pre_fit(&mut batches), Err(Error::InvalidTransition { .. })));

    scheduler.fit(&mut batches).unwrap();
    assert!(matches!(scheduler.fit(&mut batches), Err(Error::InvalidTransition { .. })));
}

#[test]
fn mismatched_real_batch_fails_with_position() {
    let mut scheduler = TrainingScheduler::new(small_model(), minimal_schedule()).unwrap();
    let mut good = synthetic_batches();
    scheduler.pre_fit(&mut good).unwrap();

    // Vocabulary of 6 cannot be concatenated with the generator's 5
    let rows = vec![vec![0, 1, 2]; 4];
    let wrong = SequenceBatch::from_rows(&rows, 6).unwrap();
    let mut bad = vec![good[0].clone(), (wrong.clone(), wrong)];

    match scheduler.fit(&mut bad).unwrap_err() {
        Error::Step { phase, epoch, batch, .. } => {
            assert_eq!(phase, TrainingPhase::Adversarial);
            assert_eq!((epoch, batch), (0, 1));
        }
        other => panic!("expected a positioned step error, got {other}"),
    }
    assert!(!scheduler.history().is_empty());
}
