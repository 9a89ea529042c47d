//! Headless simulation command

use super::{clock_entropy, load_sim_config, load_tree_config};
use anyhow::{Context, Result};
use glam::Vec3;
use petalfall_audio::{CueSink, SilentBackend, SpatialAudio};
use petalfall_runtime::{FrameClock, LifecycleEvent, RuntimeSystem};
use petalfall_sim::{PetalSimulation, PetalSystem, RecordingRenderer};
use petalfall_tree::FractalTree;
use std::time::{Duration, Instant};

pub struct SimulateArgs {
    pub config: Option<String>,
    pub tree: Option<String>,
    pub seed: Option<u32>,
    pub seconds: f32,
    pub fps: u32,
    pub until_shutdown: bool,
    pub realtime: bool,
    pub rise_every: Option<f32>,
    pub observer: [f32; 3],
    pub audio: Option<String>,
}

/// Hard stop for `--until-shutdown` runs
const MAX_SECONDS: f64 = 3600.0;

pub fn run(args: SimulateArgs) -> Result<()> {
    if args.fps == 0 {
        anyhow::bail!("--fps must be at least 1");
    }
    if args.rise_every.is_some_and(|s| s <= 0.0) {
        anyhow::bail!("--rise-every must be positive");
    }

    let config = load_sim_config(args.config.as_deref())?;
    let tree_config = load_tree_config(args.tree.as_deref())?;
    let seed = args.seed.unwrap_or_else(|| tree_config.resolve_seed(clock_entropy()));

    let tree = FractalTree::generate(&tree_config, seed).context("Failed to generate tree")?;
    let sim = PetalSimulation::new(config.clone(), &tree, seed).context("Failed to build simulation")?;

    match args.audio.as_deref() {
        #[cfg(feature = "kira")]
        Some(dir) => {
            let backend = kira_audio::load(std::path::Path::new(dir), seed)?;
            let audio = SpatialAudio::new(backend, &config.audio, seed)?;
            drive(PetalSystem::new(sim, audio, RecordingRenderer::new()), &args, |a| {
                a.voices_in_use()
            })
        }
        #[cfg(not(feature = "kira"))]
        Some(_) => anyhow::bail!("--audio needs a build with the `kira` feature"),
        None => {
            let audio = SpatialAudio::new(SilentBackend::default(), &config.audio, seed)?;
            drive(PetalSystem::new(sim, audio, RecordingRenderer::new()), &args, |a| {
                a.backend().played()
            })
        }
    }
}

fn drive<A: CueSink>(
    mut system: PetalSystem<A, RecordingRenderer>,
    args: &SimulateArgs,
    audio_stat: impl Fn(&A) -> usize,
) -> Result<()> {
    let dt = 1.0 / args.fps as f64;
    let mut clock = FrameClock::with_max_delta(dt.max(0.25));
    let pulse = system.rise_pulse();
    system.set_reference_point(Vec3::from_array(args.observer));
    system.initialize()?;

    let started = Instant::now();
    let mut next_rise = args.rise_every.map(f64::from);
    let mut cues = 0usize;
    let mut rising = 0usize;
    let mut fade = None;

    loop {
        let past_duration = clock.total_time >= args.seconds as f64;
        if fade.is_some() || clock.total_time >= MAX_SECONDS || (past_duration && !args.until_shutdown) {
            break;
        }

        if let (Some(at), Some(every)) = (next_rise, args.rise_every) {
            if clock.total_time >= at {
                pulse.request();
                next_rise = Some(at + every as f64);
            }
        }

        if args.realtime {
            let target = started + Duration::from_secs_f64(clock.frame() as f64 * dt);
            if let Some(wait) = target.checked_duration_since(Instant::now()) {
                std::thread::sleep(wait);
            }
            clock.tick();
        } else {
            clock.advance(dt);
        }
        system.update(clock.delta_time)?;

        let present = system.last_present();
        cues += present.drain.played;
        rising += present.drain.rising_cues;

        for event in system.drain_events() {
            match event {
                LifecycleEvent::AllPetalsDetached => {
                    println!("[{:>8.2}s] all petals detached", clock.total_time);
                }
                LifecycleEvent::ShutdownRequested { fade_seconds } => {
                    println!("[{:>8.2}s] shutdown requested ({fade_seconds:.1}s fade)", clock.total_time);
                    fade = Some(fade_seconds);
                }
            }
        }

        if clock.frame() % (args.fps as u64 * 10) == 0 {
            let [_, attached, flying, grounded] = system.simulation().store().census();
            log::info!(
                "t={:.1}s attached={attached} flying={flying} grounded={grounded}",
                clock.total_time
            );
        }
    }

    system.shutdown()?;

    let sim = system.simulation();
    let [_, attached, flying, grounded] = sim.store().census();
    let wall = started.elapsed().as_secs_f64();
    println!();
    println!("Simulated {:.2}s in {} frames ({:.2}s wall)", clock.total_time, clock.frame(), wall);
    println!("  Petals:     {}", sim.store().len());
    println!("  Attached:   {}", attached);
    println!("  Flying:     {}", flying);
    println!("  Grounded:   {}", grounded);
    println!("  Draw calls: {}", system.renderer().total_draw_calls());
    println!("  Cues:       {} played ({} rising)", cues, rising);
    println!("  Audio:      {}", audio_stat(system.audio()));
    if wall > 0.0 {
        println!("  Speed:      {:.1} frames/s", clock.frame() as f64 / wall);
    }
    Ok(())
}

#[cfg(feature = "kira")]
mod kira_audio {
    use anyhow::{Context, Result};
    use petalfall_audio::KiraBackend;
    use petalfall_core::OneShotGroup;
    use std::path::{Path, PathBuf};

    /// Load one-shot groups from `<dir>/a` .. `<dir>/d`, the wind bed from
    /// `<dir>/noise.ogg` and ambient pads from `<dir>/pads`
    pub fn load(dir: &Path, seed: u32) -> Result<KiraBackend> {
        let mut backend = KiraBackend::new(seed);
        if !backend.is_available() {
            log::warn!("No audio device; cues will be counted but not heard");
        }

        for group in OneShotGroup::ALL {
            let group_dir = dir.join(group.name());
            if group_dir.is_dir() {
                backend
                    .load_group_dir(group, &group_dir)
                    .with_context(|| format!("Failed to load '{}'", group_dir.display()))?;
            }
        }

        let noise = dir.join("noise.ogg");
        if noise.is_file() {
            backend.load_noise(&noise)?;
        }

        let pads_dir = dir.join("pads");
        if pads_dir.is_dir() {
            let mut pads: Vec<PathBuf> = std::fs::read_dir(&pads_dir)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|path| path.is_file())
                .collect();
            pads.sort();
            let refs: Vec<&Path> = pads.iter().map(PathBuf::as_path).collect();
            backend.load_pads(&refs)?;
        }
        Ok(backend)
    }
}
