//! GPU device + surface management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue
//! - creating & configuring the window Surface (swapchain)
//! - the crate error type

mod error;
mod gpu;
mod init;
mod surface;

pub use error::{Error, Result, SurfaceErrorAction};
pub use gpu::Gpu;
pub use init::GpuInit;
pub use surface::SurfaceTarget;
