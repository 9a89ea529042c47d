//! Renderer that records draw calls instead of issuing them

use crate::batch::{DrawCall, InstanceRenderer, MaterialHandle, MeshHandle, RenderPass, ShaderGlobals};
use glam::Vec3;
use petalfall_core::Result;

/// Summary of one recorded draw call
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub mesh: MeshHandle,
    pub material: MaterialHandle,
    pub pass: RenderPass,
    pub batch: usize,
    pub instances: usize,
    /// Instances whose attachment flag is set
    pub attached: usize,
    /// Translation of the first instance, or zero for an empty call
    pub first_translation: Vec3,
}

/// Headless [`InstanceRenderer`]: keeps the current frame's calls and the
/// last globals, plus running totals.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    calls: Vec<RecordedCall>,
    globals: ShaderGlobals,
    frames: usize,
    total_draw_calls: usize,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls recorded since the last `begin_frame`
    pub fn calls(&self) -> &[RecordedCall] {
        &self.calls
    }

    pub fn globals(&self) -> &ShaderGlobals {
        &self.globals
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn total_draw_calls(&self) -> usize {
        self.total_draw_calls
    }
}

impl InstanceRenderer for RecordingRenderer {
    fn begin_frame(&mut self, globals: &ShaderGlobals) {
        self.calls.clear();
        self.globals = *globals;
        self.frames += 1;
    }

    fn draw_instanced(&mut self, call: &DrawCall<'_>) -> Result<()> {
        self.calls.push(RecordedCall {
            mesh: call.mesh,
            material: call.material,
            pass: call.pass,
            batch: call.batch,
            instances: call.instance_count(),
            attached: call.attributes.attach_state.iter().filter(|&&f| f > 0.5).count(),
            first_translation: call
                .matrices
                .first()
                .map(|m| m.w_axis.truncate())
                .unwrap_or(Vec3::ZERO),
        });
        self.total_draw_calls += 1;
        Ok(())
    }
}
