//! Petalfall Sim - data-parallel petal simulation
//!
//! Provides the per-frame petal pipeline:
//! - wind field with smoothed stochastic direction and force
//! - rate-limited detachment of attached petals
//! - parallel four-state update stage feeding lock-free transition queues
//! - event drain turning transitions into spatial audio cues
//! - instanced batch submission in shadow and opaque passes

pub mod batch;
pub mod config;
pub mod detach;
pub mod drain;
pub mod headless;
pub mod mesh;
pub mod petal;
pub mod simulation;
pub mod update;
pub mod wind;

use glam::Vec3;
use petalfall_audio::CueSink;
use petalfall_core::Result;
use petalfall_runtime::{Lifecycle, LifecycleEvent, RisePulse, RuntimeSystem};
use std::sync::Arc;

pub use batch::{
    batch_ranges, AttributeBlock, BatchStats, DrawCall, InstanceBatcher, InstanceRenderer, MaterialHandle,
    MeshHandle, RenderPass, ShaderGlobals, HARDWARE_BATCH_LIMIT,
};
pub use config::{LifecycleConfig, PetalConfig, RiseConfig, SimConfig, WindConfig};
pub use detach::{DetachReport, DetachScheduler};
pub use drain::{DrainReport, EventDrain};
pub use headless::{RecordedCall, RecordingRenderer};
pub use mesh::{PetalMesh, PetalVertex};
pub use petal::{FallState, PetalRecord, PetalStore};
pub use simulation::{FrameInput, PetalSimulation, PresentReport, StepReport};
pub use update::{run_stage, step_petal, StageParams, TransitionQueues};
pub use wind::{WindField, WindState};

/// The petal system: drives a [`PetalSimulation`] from the frame loop with
/// its audio and renderer collaborators, and turns the end of detachment
/// into delayed lifecycle events.
pub struct PetalSystem<A: CueSink, R: InstanceRenderer> {
    sim: PetalSimulation,
    audio: A,
    renderer: R,
    rise: Arc<RisePulse>,
    reference_point: Vec3,
    lifecycle: Lifecycle,
    last_step: Option<StepReport>,
    last_present: PresentReport,
}

impl<A: CueSink, R: InstanceRenderer> PetalSystem<A, R> {
    pub fn new(sim: PetalSimulation, audio: A, renderer: R) -> Self {
        Self {
            sim,
            audio,
            renderer,
            rise: Arc::new(RisePulse::new()),
            reference_point: Vec3::ZERO,
            lifecycle: Lifecycle::new(),
            last_step: None,
            last_present: PresentReport::default(),
        }
    }

    /// Handle for raising the rise pulse from any thread
    pub fn rise_pulse(&self) -> Arc<RisePulse> {
        Arc::clone(&self.rise)
    }

    /// Observer position, also used as the audio listener
    pub fn set_reference_point(&mut self, point: Vec3) {
        self.reference_point = point;
    }

    pub fn reference_point(&self) -> Vec3 {
        self.reference_point
    }

    /// Take the lifecycle events raised since the last call
    pub fn drain_events(&mut self) -> Vec<LifecycleEvent> {
        self.lifecycle.drain()
    }

    pub fn simulation(&self) -> &PetalSimulation {
        &self.sim
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn last_step(&self) -> Option<&StepReport> {
        self.last_step.as_ref()
    }

    pub fn last_present(&self) -> &PresentReport {
        &self.last_present
    }

    pub fn shutdown_requested(&self) -> bool {
        self.lifecycle.shutdown_requested()
    }
}

impl<A: CueSink, R: InstanceRenderer> RuntimeSystem for PetalSystem<A, R> {
    fn initialize(&mut self) -> Result<()> {
        log::info!(
            "[petals] {} petals attached, {} in the schedule",
            self.sim.store().len(),
            self.sim.remaining_attached()
        );
        Ok(())
    }

    fn update(&mut self, dt: f64) -> Result<()> {
        let dt = dt.max(0.0);
        let frame_dt = dt as f32;
        let input = FrameInput {
            reference_point: self.reference_point,
            rise: self.rise.take(),
        };

        let step = self.sim.simulate(frame_dt, input);
        let lifecycle = &self.sim.config().lifecycle;
        if step.exhausted_now {
            self.lifecycle.detachment_finished(lifecycle.close_delay as f64);
        } else {
            self.lifecycle.tick(dt, lifecycle.fade_seconds);
        }

        self.last_present = self
            .sim
            .present(frame_dt, self.reference_point, &mut self.audio, &mut self.renderer)?;
        self.audio.advance(frame_dt)?;
        self.last_step = Some(step);
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        let [_, attached, flying, grounded] = self.sim.store().census();
        log::info!(
            "[petals] shutting down after {} frames ({attached} attached, {flying} flying, {grounded} grounded)",
            self.sim.frame()
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "petals"
    }
}
