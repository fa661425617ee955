//! A [`Renderer`] that records calls instead of drawing.

use std::any::Any;
use std::collections::HashMap;

use super::Renderer;
use crate::asset::{
    Mesh, MeshHandle, Shader, ShaderHandle, Submesh, Texture, TextureHandle, UniformSink,
    UniformValue,
};

/// One call made on a [`RecordingRenderer`]. Uniform writes are not listed
/// here; read them back with [`RecordingRenderer::uniform`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    BeginFrame,
    EndFrame,
    BeginShadowPass,
    EndShadowPass,
    SetViewport { width: u32, height: u32 },
    SetShadowMapSize(u32),
    UseShader(ShaderHandle),
    BindTexture { unit: u32, texture: TextureHandle },
    DrawMesh(MeshHandle),
    DrawSubmesh {
        mesh: MeshHandle,
        index_start: u32,
        index_count: u32,
    },
}

/// Headless backend. Keeps the call log and the last value of every uniform.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    calls: Vec<RecordedCall>,
    uniforms: HashMap<String, UniformValue>,
    viewport: (u32, u32),
    shadow_map_size: u32,
    frames: u64,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[RecordedCall] {
        &self.calls
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }

    pub fn uniform(&self, name: &str) -> Option<UniformValue> {
        self.uniforms.get(name).copied()
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    pub fn shadow_map_size(&self) -> u32 {
        self.shadow_map_size
    }

    /// Number of completed frames.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// How many calls match `predicate`.
    pub fn count(&self, predicate: impl Fn(&RecordedCall) -> bool) -> usize {
        self.calls.iter().filter(|c| predicate(c)).count()
    }
}

impl UniformSink for RecordingRenderer {
    fn set_uniform(&mut self, name: &str, value: UniformValue) {
        self.uniforms.insert(name.to_string(), value);
    }
}

impl Renderer for RecordingRenderer {
    fn begin_frame(&mut self) {
        self.calls.push(RecordedCall::BeginFrame);
    }

    fn end_frame(&mut self) {
        self.calls.push(RecordedCall::EndFrame);
        self.frames += 1;
    }

    fn begin_shadow_pass(&mut self) {
        self.calls.push(RecordedCall::BeginShadowPass);
    }

    fn end_shadow_pass(&mut self) {
        self.calls.push(RecordedCall::EndShadowPass);
    }

    fn set_viewport_size(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
        self.calls.push(RecordedCall::SetViewport { width, height });
    }

    fn set_shadow_map_size(&mut self, size: u32) {
        self.shadow_map_size = size;
        self.calls.push(RecordedCall::SetShadowMapSize(size));
    }

    fn use_shader(&mut self, handle: ShaderHandle, shader: &Shader) {
        self.calls.push(RecordedCall::UseShader(handle));
        for (name, value) in shader.uniforms() {
            self.uniforms.insert(name.to_string(), *value);
        }
    }

    fn bind_texture(&mut self, unit: u32, handle: TextureHandle, _texture: &Texture) {
        self.calls.push(RecordedCall::BindTexture {
            unit,
            texture: handle,
        });
    }

    fn draw_mesh(&mut self, handle: MeshHandle, _mesh: &Mesh) {
        self.calls.push(RecordedCall::DrawMesh(handle));
    }

    fn draw_submesh(&mut self, handle: MeshHandle, _mesh: &Mesh, submesh: &Submesh) {
        self.calls.push(RecordedCall::DrawSubmesh {
            mesh: handle,
            index_start: submesh.index_start,
            index_count: submesh.index_count,
        });
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_frame_calls_in_order() {
        let mut r = RecordingRenderer::new();
        r.begin_frame();
        r.begin_shadow_pass();
        r.end_shadow_pass();
        r.end_frame();
        assert_eq!(
            r.calls(),
            &[
                RecordedCall::BeginFrame,
                RecordedCall::BeginShadowPass,
                RecordedCall::EndShadowPass,
                RecordedCall::EndFrame,
            ]
        );
        assert_eq!(r.frames(), 1);
    }

    #[test]
    fn use_shader_applies_stored_uniforms() {
        let mut shader = Shader::from_sources("v", "f");
        shader.set_float("gamma", 2.2);
        let mut r = RecordingRenderer::new();
        r.use_shader(ShaderHandle(1), &shader);
        assert_eq!(r.uniform("gamma"), Some(UniformValue::Float(2.2)));
        assert_eq!(r.count(|c| matches!(c, RecordedCall::UseShader(_))), 1);
    }
}
