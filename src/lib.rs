mod misc;

pub mod agents;
pub mod collector;
pub mod config;
pub mod envs;
pub mod error;
pub mod explorers;
pub mod memory;
pub mod metrics;
pub mod models;
pub mod trainer;

pub use error::{Error, Result};

/// Loads the CUDA torch library named by `TORCH_CUDA_DLL` so that tch can
/// see the GPU on Windows. A no-op elsewhere.
pub fn load_cuda_dlls() -> Result<()> {
    #[cfg(all(feature = "cuda", target_os = "windows"))]
    {
        use std::ffi::CString;
        use winapi::um::libloaderapi::LoadLibraryA;

        let path_str = std::env::var("TORCH_CUDA_DLL")
            .map_err(|_| Error::Config("TORCH_CUDA_DLL not set".to_string()))?;
        tracing::info!(path = %path_str, "loading TORCH_CUDA_DLL");
        let c_path = CString::new(path_str)
            .map_err(|_| Error::Config("TORCH_CUDA_DLL contains a null byte".to_string()))?;
        let handle = unsafe { LoadLibraryA(c_path.as_ptr()) };
        if handle.is_null() {
            return Err(Error::Config("failed to load TORCH_CUDA_DLL".to_string()));
        }
    }
    Ok(())
}
