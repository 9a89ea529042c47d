//! Instanced draw submission in hardware-sized batches
//!
//! Matrices and attachment flags are split into batches of at most
//! `HARDWARE_BATCH_LIMIT` instances. Each batch is copied into a buffer that
//! is reused across frames, then drawn twice: once into the shadow pass and
//! once into the opaque pass.

use crate::wind::WindState;
use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use petalfall_core::Result;
use std::ops::Range;

/// Maximum instances per instanced draw call
pub const HARDWARE_BATCH_LIMIT: usize = 1022;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderPass {
    /// Depth / shadow-map pass
    Shadow,
    Opaque,
}

impl RenderPass {
    pub const ALL: [RenderPass; 2] = [RenderPass::Shadow, RenderPass::Opaque];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialHandle(pub u32);

/// Per-instance attributes bound alongside the matrices
#[derive(Debug, Clone, Copy)]
pub struct AttributeBlock<'a> {
    /// 1.0 while attached to the tree, 0.0 once released
    pub attach_state: &'a [f32],
}

/// One instanced draw
#[derive(Debug, Clone, Copy)]
pub struct DrawCall<'a> {
    pub mesh: MeshHandle,
    pub material: MaterialHandle,
    pub pass: RenderPass,
    /// Batch number within the frame
    pub batch: usize,
    pub matrices: &'a [Mat4],
    pub attributes: AttributeBlock<'a>,
}

impl DrawCall<'_> {
    pub fn instance_count(&self) -> usize {
        self.matrices.len()
    }
}

/// Wind-driven shader globals, 32 bytes (2 x vec4)
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct ShaderGlobals {
    pub bend_axis: [f32; 3],
    pub bend_angle: f32,
    pub shake: f32,
    pub _pad: [f32; 3],
}

impl ShaderGlobals {
    pub fn from_wind(wind: &WindState) -> Self {
        Self {
            bend_axis: wind.bend_axis.to_array(),
            bend_angle: wind.bend_angle,
            shake: wind.shake,
            _pad: [0.0; 3],
        }
    }
}

/// Receiver of instanced draw calls
pub trait InstanceRenderer {
    /// Called once per frame before any draw; resets per-frame command lists
    fn begin_frame(&mut self, _globals: &ShaderGlobals) {}

    fn draw_instanced(&mut self, call: &DrawCall<'_>) -> Result<()>;
}

/// Totals for one submission
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub instances: usize,
    pub batches: usize,
    pub draw_calls: usize,
}

#[derive(Default)]
struct BatchBuffer {
    matrices: Vec<Mat4>,
    attach_state: Vec<f32>,
}

impl BatchBuffer {
    fn with_capacity(limit: usize) -> Self {
        Self {
            matrices: Vec::with_capacity(limit),
            attach_state: Vec::with_capacity(limit),
        }
    }
}

/// Splits instances into batches and submits them to an [`InstanceRenderer`]
pub struct InstanceBatcher {
    mesh: MeshHandle,
    material: MaterialHandle,
    limit: usize,
    buffers: Vec<BatchBuffer>,
}

impl InstanceBatcher {
    pub fn new(mesh: MeshHandle, material: MaterialHandle) -> Self {
        Self {
            mesh,
            material,
            limit: HARDWARE_BATCH_LIMIT,
            buffers: Vec::new(),
        }
    }

    /// Override the per-batch instance limit (at least 1)
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.set_limit(limit);
        self
    }

    /// Change the per-batch limit, dropping buffers sized for the old one
    pub fn set_limit(&mut self, limit: usize) {
        let limit = limit.max(1);
        if limit != self.limit {
            self.limit = limit;
            self.buffers.clear();
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Pre-allocate buffers for `instances` instances
    pub fn reserve(&mut self, instances: usize) {
        let batches = instances.div_ceil(self.limit);
        while self.buffers.len() < batches {
            self.buffers.push(BatchBuffer::with_capacity(self.limit));
        }
    }

    /// Number of batch buffers allocated so far
    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Submit one frame: globals first, then every batch into both passes
    pub fn submit(
        &mut self,
        matrices: &[Mat4],
        attach_state: &[f32],
        globals: &ShaderGlobals,
        renderer: &mut dyn InstanceRenderer,
    ) -> Result<BatchStats> {
        debug_assert_eq!(matrices.len(), attach_state.len());
        self.reserve(matrices.len());
        renderer.begin_frame(globals);

        let mut stats = BatchStats {
            instances: matrices.len(),
            ..Default::default()
        };
        for (batch, range) in batch_ranges(matrices.len(), self.limit).enumerate() {
            let buffer = &mut self.buffers[batch];
            buffer.matrices.clear();
            buffer.matrices.extend_from_slice(&matrices[range.clone()]);
            buffer.attach_state.clear();
            buffer.attach_state.extend_from_slice(&attach_state[range]);

            for pass in RenderPass::ALL {
                renderer.draw_instanced(&DrawCall {
                    mesh: self.mesh,
                    material: self.material,
                    pass,
                    batch,
                    matrices: &buffer.matrices,
                    attributes: AttributeBlock {
                        attach_state: &buffer.attach_state,
                    },
                })?;
                stats.draw_calls += 1;
            }
            stats.batches += 1;
        }
        Ok(stats)
    }
}

/// Contiguous index ranges of at most `limit` covering `0..count`
pub fn batch_ranges(count: usize, limit: usize) -> impl Iterator<Item = Range<usize>> {
    let limit = limit.max(1);
    (0..count.div_ceil(limit)).map(move |batch| {
        let start = batch * limit;
        start..(start + limit).min(count)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::RecordingRenderer;
    use glam::Vec3;
    use petalfall_core::PetalError;

    fn instances(count: usize) -> (Vec<Mat4>, Vec<f32>) {
        let matrices = (0..count)
            .map(|i| Mat4::from_translation(Vec3::new(i as f32, 0.0, 0.0)))
            .collect();
        let flags = (0..count).map(|i| (i % 2) as f32).collect();
        (matrices, flags)
    }

    #[test]
    fn splits_at_hardware_limit() {
        let sizes: Vec<usize> = batch_ranges(2500, HARDWARE_BATCH_LIMIT).map(|r| r.len()).collect();
        assert_eq!(sizes, vec![1022, 1022, 456]);
        assert_eq!(batch_ranges(0, HARDWARE_BATCH_LIMIT).count(), 0);
        assert_eq!(batch_ranges(1022, HARDWARE_BATCH_LIMIT).count(), 1);
    }

    #[test]
    fn submits_two_passes_per_batch() {
        let (matrices, flags) = instances(2500);
        let mut batcher = InstanceBatcher::new(MeshHandle(1), MaterialHandle(2));
        let mut renderer = RecordingRenderer::default();

        let stats = batcher
            .submit(&matrices, &flags, &ShaderGlobals::default(), &mut renderer)
            .unwrap();
        assert_eq!(
            stats,
            BatchStats {
                instances: 2500,
                batches: 3,
                draw_calls: 6
            }
        );

        let calls = renderer.calls();
        assert_eq!(calls.len(), 6);
        assert_eq!(calls[0].pass, RenderPass::Shadow);
        assert_eq!(calls[1].pass, RenderPass::Opaque);
        assert_eq!(calls[4].batch, 2);
        assert_eq!(calls[4].instances, 456);
        // Second batch starts at instance 1022
        assert_eq!(calls[2].first_translation, Vec3::new(1022.0, 0.0, 0.0));
        assert_eq!(calls[2].attached, 511);
    }

    #[test]
    fn buffers_are_reused_across_frames() {
        let (matrices, flags) = instances(3000);
        let mut batcher = InstanceBatcher::new(MeshHandle(0), MaterialHandle(0));
        let mut renderer = RecordingRenderer::default();

        batcher.submit(&matrices, &flags, &ShaderGlobals::default(), &mut renderer).unwrap();
        let first = batcher.buffers[0].matrices.as_ptr();
        batcher.submit(&matrices, &flags, &ShaderGlobals::default(), &mut renderer).unwrap();

        assert_eq!(batcher.buffer_count(), 3);
        assert_eq!(batcher.buffers[0].matrices.as_ptr(), first);
        assert_eq!(batcher.buffers[0].matrices.len(), 1022);
        assert_eq!(renderer.total_draw_calls(), 12);
        assert_eq!(renderer.frames(), 2);
        assert_eq!(renderer.calls().len(), 6);
    }

    #[test]
    fn custom_limit() {
        let (matrices, flags) = instances(10);
        let mut batcher = InstanceBatcher::new(MeshHandle(0), MaterialHandle(0)).with_limit(4);
        let stats = batcher
            .submit(&matrices, &flags, &ShaderGlobals::default(), &mut RecordingRenderer::default())
            .unwrap();
        assert_eq!(stats.batches, 3);
        assert_eq!(stats.draw_calls, 6);
    }

    struct FailingRenderer;

    impl InstanceRenderer for FailingRenderer {
        fn draw_instanced(&mut self, _call: &DrawCall<'_>) -> Result<()> {
            Err(PetalError::RenderError("lost device".into()))
        }
    }

    #[test]
    fn renderer_errors_propagate() {
        let (matrices, flags) = instances(5);
        let mut batcher = InstanceBatcher::new(MeshHandle(0), MaterialHandle(0));
        let result = batcher.submit(&matrices, &flags, &ShaderGlobals::default(), &mut FailingRenderer);
        assert!(matches!(result, Err(PetalError::RenderError(_))));
    }

    #[test]
    fn globals_follow_wind() {
        let wind = WindState {
            direction: Vec3::Z,
            force: 0.02,
            bend_angle: -0.1,
            bend_axis: Vec3::X,
            shake: 0.3,
            normalized_force: 0.5,
        };
        let globals = ShaderGlobals::from_wind(&wind);
        assert_eq!(globals.bend_axis, [1.0, 0.0, 0.0]);
        assert_eq!(globals.bend_angle, -0.1);
        assert_eq!(bytemuck::bytes_of(&globals).len(), 32);
    }
}
