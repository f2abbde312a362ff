use std::fmt;

/// Errors raised while setting up or driving the GPU renderer
#[derive(Debug)]
pub enum RenderError {
    NoAdapter,
    CreateSurface(wgpu::CreateSurfaceError),
    RequestDevice(wgpu::RequestDeviceError),
    /// A WGSL module failed to compile
    ShaderCompile { stage: &'static str, log: String },
    /// Pipeline creation rejected the compiled modules
    ProgramLink { log: String },
    TooManySpheres { count: usize, max: usize },
    /// Zero-sized or larger than the device's 2D texture limit
    InvalidSize { width: u32, height: u32, max: u32 },
    ReadBack(wgpu::BufferAsyncError),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::NoAdapter => write!(f, "no suitable GPU adapter found"),
            RenderError::CreateSurface(err) => write!(f, "failed to create surface: {}", err),
            RenderError::RequestDevice(err) => write!(f, "failed to request device: {}", err),
            RenderError::ShaderCompile { stage, log } => {
                write!(f, "{} shader failed to compile:\n{}", stage, log)
            }
            RenderError::ProgramLink { log } => write!(f, "pipeline creation failed:\n{}", log),
            RenderError::TooManySpheres { count, max } => {
                write!(f, "scene has {} spheres but the GPU path supports at most {}", count, max)
            }
            RenderError::InvalidSize { width, height, max } => write!(
                f,
                "invalid image size {}x{}: each side must be between 1 and {}",
                width, height, max
            ),
            RenderError::ReadBack(err) => write!(f, "failed to read back render target: {}", err),
        }
    }
}

impl std::error::Error for RenderError {}

impl From<wgpu::CreateSurfaceError> for RenderError {
    fn from(err: wgpu::CreateSurfaceError) -> Self {
        RenderError::CreateSurface(err)
    }
}

impl From<wgpu::RequestDeviceError> for RenderError {
    fn from(err: wgpu::RequestDeviceError) -> Self {
        RenderError::RequestDevice(err)
    }
}

impl From<wgpu::BufferAsyncError> for RenderError {
    fn from(err: wgpu::BufferAsyncError) -> Self {
        RenderError::ReadBack(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_shader_compile_message_contains_stage_and_log() {
        let err = RenderError::ShaderCompile {
            stage: "compute",
            log: "expected `;`".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("compute"));
        assert!(message.contains("expected `;`"));
    }

    #[test]
    fn test_too_many_spheres_message() {
        let err = RenderError::TooManySpheres { count: 20, max: 16 };
        assert_eq!(
            err.to_string(),
            "scene has 20 spheres but the GPU path supports at most 16"
        );
    }

    #[test]
    fn test_invalid_size_message() {
        let err = RenderError::InvalidSize {
            width: 0,
            height: 4,
            max: 8192,
        };
        assert_eq!(
            err.to_string(),
            "invalid image size 0x4: each side must be between 1 and 8192"
        );
    }
}
