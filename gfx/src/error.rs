//! Frame buffer errors

/// Errors from frame buffer management
///
/// Drawing itself never fails; only acquiring or attaching the shadow
/// buffer can.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameBufferError {
    /// The canvas was built without frame buffer support
    NotConfigured,
    /// The allocator could not provide the buffer
    AllocationFailed,
    /// A caller-supplied buffer holds fewer pixels than the panel
    BufferTooSmall,
    /// A caller-supplied buffer has a different pixel depth than configured
    DepthMismatch,
}

impl core::fmt::Display for FrameBufferError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FrameBufferError::NotConfigured => write!(f, "Frame buffer not configured"),
            FrameBufferError::AllocationFailed => write!(f, "Frame buffer allocation failed"),
            FrameBufferError::BufferTooSmall => write!(f, "Frame buffer too small"),
            FrameBufferError::DepthMismatch => write!(f, "Frame buffer depth mismatch"),
        }
    }
}
