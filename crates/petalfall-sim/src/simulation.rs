//! Frame orchestration: simulate, then present

use crate::batch::{BatchStats, InstanceBatcher, InstanceRenderer, MaterialHandle, MeshHandle, ShaderGlobals};
use crate::config::SimConfig;
use crate::detach::DetachScheduler;
use crate::drain::{DrainReport, EventDrain};
use crate::petal::PetalStore;
use crate::update::{run_stage, StageParams, TransitionQueues};
use crate::wind::{WindField, WindState};
use glam::Vec3;
use petalfall_audio::CueSink;
use petalfall_core::{PetalError, Result, SimRng};
use petalfall_tree::GeometryProvider;

/// Per-frame external input
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameInput {
    /// Observer position; grounded petals near it can rise
    pub reference_point: Vec3,
    /// Rise pulse consumed for this frame
    pub rise: bool,
}

/// Outcome of one simulation step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepReport {
    pub detached: usize,
    /// Matrices rewritten by the update stage
    pub dirty: usize,
    /// The last attached petal was released this step
    pub exhausted_now: bool,
    pub wind: WindState,
}

/// Outcome of one presentation step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PresentReport {
    pub drain: DrainReport,
    pub batches: BatchStats,
}

/// The petal simulation. Each frame runs [`simulate`](Self::simulate) then
/// [`present`](Self::present); transition events never outlive the frame.
pub struct PetalSimulation {
    config: SimConfig,
    store: PetalStore,
    wind: WindField,
    scheduler: DetachScheduler,
    queues: TransitionQueues,
    drain: EventDrain,
    batcher: InstanceBatcher,
    frame: u32,
}

impl PetalSimulation {
    /// Seed the petal store from `geometry` in a shuffled order and bake the
    /// initial matrices. Fails if `config` does not validate.
    pub fn new(config: SimConfig, geometry: &dyn GeometryProvider, seed: u32) -> Result<Self> {
        config.validate()?;

        let mut rng = SimRng::new(seed);
        let mut leaves = geometry.leaf_transforms();
        let bad_leaf = leaves
            .iter()
            .position(|leaf| !(leaf.position.is_finite() && leaf.rotation.is_finite() && leaf.scale.is_finite()));
        if let Some(index) = bad_leaf {
            return Err(PetalError::GeometryError(format!(
                "leaf {index} has a non-finite transform"
            )));
        }
        rng.shuffle(&mut leaves);

        let store = PetalStore::from_leaves(&leaves);
        let scheduler = DetachScheduler::new(0..store.len(), config.petals.fall_rate);
        let wind = WindField::new(&config.wind, rng.next_u32());
        let drain = EventDrain::new(config.rise.cue_interval, rng.next_u32());
        let mut batcher = InstanceBatcher::new(MeshHandle(0), MaterialHandle(0));
        batcher.reserve(store.len());

        let mut sim = Self {
            config,
            store,
            wind,
            scheduler,
            queues: TransitionQueues::new(),
            drain,
            batcher,
            frame: 0,
        };
        sim.bake();

        log::info!(
            "Petal simulation ready: {} petals, releasing {}/s",
            sim.store.len(),
            sim.config.petals.fall_rate
        );
        Ok(sim)
    }

    /// Use a specific mesh and material for the instanced draws
    pub fn with_render_handles(mut self, mesh: MeshHandle, material: MaterialHandle) -> Self {
        let limit = self.batcher.limit();
        self.batcher = InstanceBatcher::new(mesh, material).with_limit(limit);
        self.batcher.reserve(self.store.len());
        self
    }

    /// Override the per-draw instance limit
    pub fn with_batch_limit(mut self, limit: usize) -> Self {
        self.batcher.set_limit(limit);
        self.batcher.reserve(self.store.len());
        self
    }

    /// Zero-time stage pass: every petal leaves Initial with its matrix written
    fn bake(&mut self) {
        let params = StageParams::new(&self.config, 0.0, &self.wind.state());
        let store = &mut self.store;
        run_stage(&mut store.records, &mut store.matrices, &params, &self.queues);
        self.queues.clear();
    }

    /// Advance the simulation by `dt` seconds
    pub fn simulate(&mut self, dt: f32, input: FrameInput) -> StepReport {
        self.simulate_with(dt, input, || ()).0
    }

    /// Like [`simulate`](Self::simulate), running `work` concurrently with
    /// the parallel update stage. Returns once both have finished.
    pub fn simulate_with<T, F>(&mut self, dt: f32, input: FrameInput, work: F) -> (StepReport, T)
    where
        F: FnOnce() -> T + Send,
        T: Send,
    {
        let dt = dt.max(0.0);
        self.queues.clear();

        let wind = self.wind.update(dt);
        let detach = self.scheduler.update(dt, &mut self.store);

        let params = StageParams::new(&self.config, dt, &wind).with_rise(input.reference_point, input.rise, self.frame);
        self.frame = self.frame.wrapping_add(1);

        let store = &mut self.store;
        let queues = &self.queues;
        let (dirty, output) = rayon::join(
            || run_stage(&mut store.records, &mut store.matrices, &params, queues),
            work,
        );

        log::trace!(
            "frame {}: {} detached, {} dirty",
            self.frame,
            detach.detached,
            dirty
        );

        (
            StepReport {
                detached: detach.detached,
                dirty,
                exhausted_now: detach.exhausted_now,
                wind,
            },
            output,
        )
    }

    /// Drain transition events into `audio` and submit the instanced draws
    pub fn present(
        &mut self,
        dt: f32,
        listener: Vec3,
        audio: &mut dyn CueSink,
        renderer: &mut dyn InstanceRenderer,
    ) -> Result<PresentReport> {
        let drain = self
            .drain
            .drain(dt.max(0.0), &mut self.queues, &self.store, listener, audio);

        let wind = self.wind.state();
        audio.set_ambient_level(wind.normalized_force);

        let batches = self.batcher.submit(
            &self.store.matrices,
            &self.store.attach_state,
            &ShaderGlobals::from_wind(&wind),
            renderer,
        )?;
        Ok(PresentReport { drain, batches })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn store(&self) -> &PetalStore {
        &self.store
    }

    pub fn wind(&self) -> WindState {
        self.wind.state()
    }

    /// Number of frames simulated
    pub fn frame(&self) -> u32 {
        self.frame
    }

    /// Petals still waiting to be released
    pub fn remaining_attached(&self) -> usize {
        self.scheduler.remaining()
    }

    pub fn all_detached(&self) -> bool {
        self.scheduler.is_exhausted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::RecordingRenderer;
    use crate::petal::FallState;
    use glam::Quat;
    use petalfall_audio::{CueOutcome, PoolKey};
    use petalfall_core::OneShotGroup;
    use petalfall_tree::{FractalTree, LeafTransform, TreeConfig};

    #[derive(Default)]
    struct CueLog {
        cues: Vec<OneShotGroup>,
        ambient: Vec<f32>,
    }

    impl CueSink for CueLog {
        fn play_cue(&mut self, group: OneShotGroup, _position: Vec3, _listener: Vec3) -> Result<CueOutcome> {
            self.cues.push(group);
            Ok(CueOutcome::Played {
                voice: PoolKey(0),
                priority: 2,
            })
        }

        fn set_ambient_level(&mut self, level: f32) {
            self.ambient.push(level);
        }
    }

    fn leaves(count: usize, height: f32) -> Vec<LeafTransform> {
        (0..count)
            .map(|i| LeafTransform {
                position: Vec3::new((i % 10) as f32 * 0.3, height, (i / 10) as f32 * 0.3),
                rotation: Quat::IDENTITY,
                scale: Vec3::splat(0.2),
            })
            .collect()
    }

    fn fast_config() -> SimConfig {
        let mut config = SimConfig::default();
        config.petals.fall_rate = 1000.0;
        config.petals.gravity = 0.5;
        config
    }

    #[test]
    fn construction_bakes_attached_petals() {
        let tree = FractalTree::generate(
            &TreeConfig {
                total_depth: 5,
                ..Default::default()
            },
            43,
        )
        .unwrap();
        let sim = PetalSimulation::new(SimConfig::default(), &tree, 1).unwrap();

        let store = sim.store();
        assert_eq!(store.len(), tree.leaves.len());
        assert_eq!(store.census(), [0, store.len(), 0, 0]);
        for record in store.records() {
            assert!(tree.leaves.iter().any(|leaf| leaf.position == record.position));
        }
        for (record, matrix) in store.records().iter().zip(store.matrices()) {
            assert_eq!(*matrix, record.matrix());
        }
        assert_eq!(sim.remaining_attached(), store.len());
    }

    #[test]
    fn invalid_config_fails_construction() {
        let mut config = SimConfig::default();
        config.petals.fall_rate = 0.0;
        let result = PetalSimulation::new(config, &leaves(4, 1.0), 1);
        assert!(matches!(result, Err(PetalError::InvalidConfig { .. })));
    }

    #[test]
    fn non_finite_leaf_is_rejected() {
        let mut bad = leaves(3, 1.0);
        bad[1].position.y = f32::NAN;
        let result = PetalSimulation::new(SimConfig::default(), &bad, 1);
        assert!(matches!(result, Err(PetalError::GeometryError(_))));
    }

    #[test]
    fn petals_fall_land_and_make_noise() {
        let mut sim = PetalSimulation::new(fast_config(), &leaves(40, 0.5), 3).unwrap();
        let mut audio = CueLog::default();
        let mut renderer = RecordingRenderer::new();
        let mut exhausted = 0;

        for _ in 0..600 {
            let step = sim.simulate(1.0 / 60.0, FrameInput::default());
            if step.exhausted_now {
                exhausted += 1;
            }
            sim.present(1.0 / 60.0, Vec3::ZERO, &mut audio, &mut renderer).unwrap();
        }

        assert_eq!(exhausted, 1);
        assert!(sim.all_detached());
        assert_eq!(sim.store().census(), [0, 0, 0, 40]);
        assert_eq!(audio.cues.len(), 40);
        assert!(audio.cues.iter().all(|g| OneShotGroup::GROUNDED.contains(g)));
        assert!(sim.store().attach_state().iter().all(|&f| f == 0.0));
        assert_eq!(audio.ambient.len(), 600);
        assert_eq!(renderer.frames(), 600);
        assert_eq!(renderer.calls().len(), 2);
    }

    #[test]
    fn rise_pulse_lifts_grounded_petals() {
        let mut sim = PetalSimulation::new(fast_config(), &leaves(30, 0.2), 5).unwrap();
        let mut audio = CueLog::default();
        let mut renderer = RecordingRenderer::new();
        for _ in 0..300 {
            sim.simulate(1.0 / 60.0, FrameInput::default());
            sim.present(1.0 / 60.0, Vec3::ZERO, &mut audio, &mut renderer).unwrap();
        }
        assert_eq!(sim.store().census()[FallState::Grounded as usize], 30);
        audio.cues.clear();

        let step = sim.simulate(
            0.2,
            FrameInput {
                reference_point: Vec3::new(1.0, 0.0, 0.5),
                rise: true,
            },
        );
        assert_eq!(step.dirty, 30);
        assert_eq!(sim.store().census()[FallState::Flying as usize], 30);
        assert!(sim.store().records().iter().all(|r| r.position.y > 0.0));

        let report = sim.present(0.2, Vec3::ZERO, &mut audio, &mut renderer).unwrap();
        assert_eq!(report.drain.rising_cues, 1);
        assert_eq!(report.drain.rising_discarded, 29);
        assert_eq!(audio.cues, vec![OneShotGroup::B]);
    }

    #[test]
    fn same_seed_same_outcome() {
        let run = || {
            let mut sim = PetalSimulation::new(fast_config(), &leaves(500, 2.0), 11).unwrap();
            for _ in 0..120 {
                sim.simulate(1.0 / 30.0, FrameInput::default());
            }
            sim.store().records().to_vec()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn concurrent_work_runs_alongside_stage() {
        let mut sim = PetalSimulation::new(SimConfig::default(), &leaves(50, 1.0), 2).unwrap();
        let (report, value) = sim.simulate_with(0.1, FrameInput::default(), || (1..=10).sum::<u32>());
        assert_eq!(value, 55);
        assert_eq!(report.detached, 4);
        assert_eq!(sim.frame(), 1);
    }

    #[test]
    fn batches_respect_limit() {
        let mut sim = PetalSimulation::new(SimConfig::default(), &leaves(25, 1.0), 2)
            .unwrap()
            .with_batch_limit(10);
        let mut renderer = RecordingRenderer::new();
        let report = sim
            .present(0.0, Vec3::ZERO, &mut CueLog::default(), &mut renderer)
            .unwrap();
        assert_eq!(report.batches.batches, 3);
        assert_eq!(report.batches.draw_calls, 6);
        assert_eq!(renderer.calls()[0].attached, 10);
    }

    #[test]
    fn render_handles_keep_the_batch_limit() {
        let mut sim = PetalSimulation::new(SimConfig::default(), &leaves(25, 1.0), 2)
            .unwrap()
            .with_batch_limit(10)
            .with_render_handles(MeshHandle(7), MaterialHandle(3));
        let mut renderer = RecordingRenderer::new();
        let report = sim
            .present(0.0, Vec3::ZERO, &mut CueLog::default(), &mut renderer)
            .unwrap();
        assert_eq!(report.batches.batches, 3);
        assert!(renderer
            .calls()
            .iter()
            .all(|call| call.mesh == MeshHandle(7) && call.material == MaterialHandle(3)));
        assert_eq!(renderer.total_draw_calls(), 6);
    }
}
