use crate::canvas::TextureId;

use super::uniforms::BlendMode;

/// Last pipeline and texture bound in the current render pass.
///
/// wgpu keeps bindings for the lifetime of a pass, so consecutive draws that
/// share a texture or blend mode skip the redundant `set_*` call. Reset at the
/// start of every pass.
#[derive(Debug, Default)]
pub struct BindCache {
    blend: Option<BlendMode>,
    texture: Option<TextureId>,
}

impl BindCache {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Records `blend` as bound; returns `true` if the pipeline must be set.
    pub fn bind_pipeline(&mut self, blend: BlendMode) -> bool {
        replace_if_changed(&mut self.blend, blend)
    }

    /// Records `texture` as bound; returns `true` if its bind group must be set.
    pub fn bind_texture(&mut self, texture: TextureId) -> bool {
        replace_if_changed(&mut self.texture, texture)
    }

    #[cfg(test)]
    fn bound_texture(&self) -> Option<TextureId> {
        self.texture
    }
}

fn replace_if_changed<T: PartialEq>(slot: &mut Option<T>, value: T) -> bool {
    if slot.as_ref() == Some(&value) {
        return false;
    }
    *slot = Some(value);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consecutive_same_texture_binds_once() {
        let mut cache = BindCache::default();
        let ids = [1, 1, 1, 2, 2, 1].map(TextureId);

        let binds = ids.iter().filter(|&&id| cache.bind_texture(id)).count();

        assert_eq!(binds, 3);
    }

    #[test]
    fn bound_texture_tracks_every_draw() {
        let mut cache = BindCache::default();
        for id in [3, 3, 7, 3].map(TextureId) {
            cache.bind_texture(id);
            assert_eq!(cache.bound_texture(), Some(id));
        }
    }

    #[test]
    fn reset_forces_rebind() {
        let mut cache = BindCache::default();
        assert!(cache.bind_texture(TextureId(1)));
        assert!(cache.bind_pipeline(BlendMode::Alpha));

        cache.reset();

        assert!(cache.bind_texture(TextureId(1)));
        assert!(cache.bind_pipeline(BlendMode::Alpha));
    }

    #[test]
    fn pipeline_switches_only_on_blend_change() {
        let mut cache = BindCache::default();
        assert!(cache.bind_pipeline(BlendMode::Replace));
        assert!(!cache.bind_pipeline(BlendMode::Replace));
        assert!(cache.bind_pipeline(BlendMode::Alpha));
    }
}
