use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::Sender;

/// Opaque identifier of a GPU texture owned by a [`TextureBackend`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u64);

static NEXT_TEXTURE_ID: AtomicU64 = AtomicU64::new(1);

impl TextureId {
    /// Allocates an id unique within the process, so textures of different
    /// backends never alias.
    pub fn next() -> Self {
        TextureId(NEXT_TEXTURE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// GPU-side operations a canvas needs to keep its texture current.
///
/// The renderer implements this against wgpu. Anything else implementing it
/// (e.g. an upload counter) sees exactly the create/upload traffic a canvas
/// generates.
pub trait TextureBackend {
    /// Allocates a BGRA8 texture of `width` × `height` texels.
    fn create_texture(&mut self, width: u32, height: u32) -> TextureSlot;

    /// Replaces the full contents of `texture` with `pixels`
    /// (BGRA8, row-major, `width * height * 4` bytes).
    fn upload_texture(&mut self, texture: TextureId, width: u32, height: u32, pixels: &[u8]);
}

/// Ownership token for a backend texture.
///
/// Dropping the slot notifies the backend that the texture can be released.
/// Release is deferred to the backend's next frame boundary.
#[derive(Debug)]
pub struct TextureSlot {
    id: TextureId,
    release: Option<Sender<TextureId>>,
}

impl TextureSlot {
    pub fn new(id: TextureId, release: Sender<TextureId>) -> Self {
        Self {
            id,
            release: Some(release),
        }
    }

    /// A slot whose drop is not reported anywhere.
    pub fn untracked(id: TextureId) -> Self {
        Self { id, release: None }
    }

    #[inline]
    pub fn id(&self) -> TextureId {
        self.id
    }
}

impl Drop for TextureSlot {
    fn drop(&mut self) {
        if let Some(tx) = self.release.take() {
            // The backend may already be gone; nothing left to release then.
            let _ = tx.send(self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;

    #[test]
    fn allocated_ids_are_distinct() {
        let a = TextureId::next();
        let b = TextureId::next();
        assert_ne!(a, b);
    }

    #[test]
    fn tracked_slot_reports_id_on_drop() {
        let (tx, rx) = mpsc::channel();
        let id = TextureId::next();

        drop(TextureSlot::new(id, tx));

        assert_eq!(rx.try_recv(), Ok(id));
    }
}
