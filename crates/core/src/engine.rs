// crates/core/src/engine.rs
//! Simulation engine contract and the phase-1 implementation.
//!
//! The engine is pure computation: it receives a [`CancelToken`] to poll and
//! a [`ProgressSink`] to report through, and produces a result or a
//! cancellation outcome. It never touches controller state directly.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Instant;

use crate::cancel::CancelToken;
use crate::error::EngineError;
use crate::payload::{SimPayload, SimResult};

/// Sink the engine pushes progress through.
///
/// Implemented on the server side by the controller's adapter; tests use an
/// in-memory recorder.
pub trait ProgressSink: Send + Sync {
    /// Report partial completion. `percent` is 0–100; the receiving side
    /// enforces monotonicity, so a well-behaved engine only needs to be
    /// roughly non-decreasing.
    fn report(&self, phase: &str, percent: u8, message: &str);
}

/// How a simulation run ended, short of an error.
#[derive(Debug, PartialEq)]
pub enum SimOutcome {
    /// The run finished and produced a result.
    Completed(SimResult),
    /// The engine observed the cancellation request, acknowledged the
    /// token, and stopped without a result.
    Cancelled,
}

/// A long-running simulation computation.
#[async_trait]
pub trait SimulationEngine: Send + Sync {
    /// Run one simulation to completion, cancellation, or failure.
    ///
    /// Implementations must poll `token` at bounded intervals and call
    /// [`CancelToken::acknowledge`] before returning [`SimOutcome::Cancelled`].
    async fn run(
        &self,
        payload: &SimPayload,
        token: &CancelToken,
        progress: &dyn ProgressSink,
    ) -> Result<SimOutcome, EngineError>;

    /// Engine name for logging/display.
    fn name(&self) -> &str;
}

/// Integration timestep for the leapfrog scheme.
const DT: f64 = 0.05;

/// Velocity damping factor applied each step so the lattice relaxes.
const DAMPING: f64 = 0.999;

/// Phase-1 engine: damped relaxation of a chain of coupled oscillators.
///
/// Deterministic for a given payload (seeded RNG), so the front-end can
/// reproduce a run. Work is chunked; the token is polled and the task
/// yields to the runtime at every chunk boundary.
pub struct PhaseOneEngine {
    chunk_size: u64,
}

impl PhaseOneEngine {
    pub fn new() -> Self {
        Self { chunk_size: 1024 }
    }

    /// Override the polling/yield cadence. Mostly useful in tests, where a
    /// small chunk makes cancellation observable quickly.
    pub fn with_chunk_size(chunk_size: u64) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }

    fn total_energy(x: &[f64], v: &[f64]) -> f64 {
        x.iter()
            .zip(v.iter())
            .map(|(xi, vi)| 0.5 * (vi * vi + xi * xi))
            .sum()
    }
}

impl Default for PhaseOneEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SimulationEngine for PhaseOneEngine {
    async fn run(
        &self,
        payload: &SimPayload,
        token: &CancelToken,
        progress: &dyn ProgressSink,
    ) -> Result<SimOutcome, EngineError> {
        let started = Instant::now();
        let n = payload.particles as usize;
        let steps = payload.steps;
        let k = payload.coupling;

        // Warmup: seed the lattice.
        progress.report("warmup", 0, &format!("seeding {} particles", n));
        let mut rng = StdRng::seed_from_u64(payload.effective_seed());
        let mut x: Vec<f64> = (0..n).map(|_| rng.gen_range(-1.0..1.0)).collect();
        let mut v: Vec<f64> = (0..n).map(|_| rng.gen_range(-0.5..0.5)).collect();
        let mut a = vec![0.0f64; n];

        // Integrate in chunks; each boundary polls the token and yields.
        let mut samples: Vec<f64> = Vec::with_capacity((steps / self.chunk_size + 1) as usize);
        let mut step = 0u64;
        while step < steps {
            if token.is_requested() {
                token.acknowledge();
                tracing::debug!(step, "simulation cancelled by token");
                return Ok(SimOutcome::Cancelled);
            }

            let chunk_end = (step + self.chunk_size).min(steps);
            while step < chunk_end {
                for i in 0..n {
                    let left = if i == 0 { x[n - 1] } else { x[i - 1] };
                    let right = if i == n - 1 { x[0] } else { x[i + 1] };
                    a[i] = -x[i] + k * (left - 2.0 * x[i] + right);
                }
                for i in 0..n {
                    v[i] = (v[i] + a[i] * DT) * DAMPING;
                    x[i] += v[i] * DT;
                }
                step += 1;
            }

            let energy = Self::total_energy(&x, &v);
            if !energy.is_finite() {
                return Err(EngineError::Diverged {
                    step,
                    message: format!("non-finite lattice energy after {} steps", step),
                });
            }
            samples.push(energy);

            let percent = ((step.saturating_mul(99)) / steps) as u8;
            progress.report(
                "integrate",
                percent,
                &format!("step {}/{}", step, steps),
            );

            tokio::task::yield_now().await;
        }

        // Reduce: fold samples into summary statistics.
        progress.report("reduce", 99, &format!("reducing {} samples", samples.len()));
        let count = samples.len().max(1) as f64;
        let mean = samples.iter().sum::<f64>() / count;
        let variance = samples.iter().map(|s| (s - mean) * (s - mean)).sum::<f64>() / count;
        let min = samples.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = samples.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

        Ok(SimOutcome::Completed(SimResult {
            mean_energy: mean,
            std_dev: variance.sqrt(),
            min_energy: min,
            max_energy: max,
            steps_run: steps,
            elapsed_ms: started.elapsed().as_millis() as u64,
        }))
    }

    fn name(&self) -> &str {
        "phase-one"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records every report for assertions.
    struct RecordingSink {
        reports: Mutex<Vec<(String, u8, String)>>,
    }

    impl RecordingSink {
        fn new() -> Self {
            Self {
                reports: Mutex::new(Vec::new()),
            }
        }

        fn percents(&self) -> Vec<u8> {
            self.reports.lock().unwrap().iter().map(|r| r.1).collect()
        }
    }

    impl ProgressSink for RecordingSink {
        fn report(&self, phase: &str, percent: u8, message: &str) {
            self.reports
                .lock()
                .unwrap()
                .push((phase.to_string(), percent, message.to_string()));
        }
    }

    fn small_payload() -> SimPayload {
        SimPayload {
            particles: 16,
            steps: 2_000,
            coupling: 0.1,
            seed: Some(1),
            preset: None,
        }
    }

    #[tokio::test]
    async fn test_run_completes_with_result() {
        let engine = PhaseOneEngine::with_chunk_size(256);
        let token = CancelToken::new();
        let sink = RecordingSink::new();

        let outcome = engine.run(&small_payload(), &token, &sink).await.unwrap();
        match outcome {
            SimOutcome::Completed(result) => {
                assert_eq!(result.steps_run, 2_000);
                assert!(result.mean_energy.is_finite());
                assert!(result.std_dev >= 0.0);
                assert!(result.min_energy <= result.max_energy);
            }
            SimOutcome::Cancelled => panic!("unexpected cancellation"),
        }
    }

    #[tokio::test]
    async fn test_run_is_deterministic_for_seed() {
        let engine = PhaseOneEngine::with_chunk_size(512);
        let payload = small_payload();

        let a = engine
            .run(&payload, &CancelToken::new(), &RecordingSink::new())
            .await
            .unwrap();
        let b = engine
            .run(&payload, &CancelToken::new(), &RecordingSink::new())
            .await
            .unwrap();

        let (SimOutcome::Completed(ra), SimOutcome::Completed(rb)) = (a, b) else {
            panic!("expected two completed runs");
        };
        assert_eq!(ra.mean_energy, rb.mean_energy);
        assert_eq!(ra.std_dev, rb.std_dev);
    }

    #[tokio::test]
    async fn test_pre_cancelled_token_stops_before_integrating() {
        let engine = PhaseOneEngine::with_chunk_size(64);
        let token = CancelToken::new();
        token.request();
        let sink = RecordingSink::new();

        let outcome = engine.run(&small_payload(), &token, &sink).await.unwrap();
        assert_eq!(outcome, SimOutcome::Cancelled);
        assert!(token.is_acknowledged());
        // Only the warmup report made it out.
        let reports = sink.reports.lock().unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].0, "warmup");
    }

    #[tokio::test]
    async fn test_progress_percent_is_non_decreasing() {
        let engine = PhaseOneEngine::with_chunk_size(100);
        let sink = RecordingSink::new();
        engine
            .run(&small_payload(), &CancelToken::new(), &sink)
            .await
            .unwrap();

        let percents = sink.percents();
        assert!(percents.len() > 2);
        assert!(percents.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*percents.last().unwrap(), 99);
    }

    #[tokio::test]
    async fn test_unstable_parameters_surface_divergence() {
        // validate() would reject this coupling; the engine itself reports
        // the blow-up as a structured failure instead of panicking.
        let engine = PhaseOneEngine::with_chunk_size(4096);
        let payload = SimPayload {
            particles: 8,
            steps: 1_000_000,
            coupling: 5.0e6,
            seed: Some(3),
            preset: None,
        };

        let err = engine
            .run(&payload, &CancelToken::new(), &RecordingSink::new())
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Diverged { .. }));
    }
}
