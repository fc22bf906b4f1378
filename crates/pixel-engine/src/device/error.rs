/// Errors raised while bringing up or reading back from the GPU pipeline.
///
/// Every variant carries the diagnostic text reported by the windowing layer
/// or wgpu.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// Event loop, window, surface, adapter or device creation failed.
    #[error("context initialization failed: {0}")]
    ContextInit(String),

    /// The embedded shader failed validation.
    #[error("shader compilation failed: {0}")]
    ShaderCompile(String),

    /// A render pipeline could not be built from the compiled shader.
    #[error("shader program link failed: {0}")]
    Link(String),

    /// Copying the back buffer to the CPU failed.
    #[error("readback failed: {0}")]
    Readback(String),
}

impl Error {
    pub(crate) fn context(what: &str, err: impl std::fmt::Display) -> Self {
        Error::ContextInit(format!("{what}: {err}"))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// High-level response after a surface error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; rendering may resume next frame.
    Reconfigured,
    /// Transient error; skip the current frame.
    SkipFrame,
    /// Fatal error (commonly OOM); terminate gracefully.
    Fatal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_error_keeps_diagnostic_text() {
        let err = Error::context("failed to create window", "no display");
        assert_eq!(
            err.to_string(),
            "context initialization failed: failed to create window: no display"
        );
    }
}
