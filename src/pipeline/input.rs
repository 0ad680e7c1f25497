//! Input resolution: validate the document path and derive the bundle name.
//!
//! Checks happen before anything is uploaded so a typo in the path fails
//! fast and never costs an API call.

use crate::error::Ocr2MdError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Prefix of the default bundle directory name.
pub const OUTPUT_DIR_PREFIX: &str = "ocr_results_";

/// A validated local document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedInput {
    pub path: PathBuf,
    /// File name sent to the service, e.g. `report.pdf`.
    pub file_name: String,
}

/// Validate that `path` names a readable regular file.
pub fn resolve_input(path: &Path) -> Result<ResolvedInput, Ocr2MdError> {
    let metadata = match std::fs::metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(Ocr2MdError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        Err(_) => {
            return Err(Ocr2MdError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
    };

    if !metadata.is_file() {
        return Err(Ocr2MdError::NotAFile {
            path: path.to_path_buf(),
        });
    }

    match std::fs::File::open(path) {
        Ok(mut f) => {
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                warn!(
                    "{} does not start with %PDF (got {:?}); sending it anyway",
                    path.display(),
                    magic
                );
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(Ocr2MdError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        Err(_) => {
            return Err(Ocr2MdError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document.pdf".to_string());

    debug!("Resolved local document: {}", path.display());
    Ok(ResolvedInput {
        path: path.to_path_buf(),
        file_name,
    })
}

/// `ocr_results_<stem>` for the given input path.
pub fn output_dir_name(path: &Path) -> String {
    format!("{OUTPUT_DIR_PREFIX}{}", file_stem(path))
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string())
}
