/*
 * Error type shared by the portable factory logic and the Win32 backend.
 * Every fallible operation in the crate returns `Result<T>`; the subclass
 * callback itself never fails and therefore never produces one.
 */

use std::fmt;

#[derive(Debug, Clone)]
pub enum PlatformError {
    /// A window handle passed in (usually the parent) does not identify a live window.
    InvalidHandle(String),
    /// The requested control rectangle has a non-positive width or height.
    InvalidGeometry(String),
    /// The windowing system refused to create the control.
    CreationFailed(String),
    /// The control was created but the subclass callback could not be attached.
    SubclassFailed(String),
    OperationFailed(String),
    #[cfg(target_os = "windows")]
    Win32(windows::core::Error),
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformError::InvalidHandle(msg) => write!(f, "invalid handle: {msg}"),
            PlatformError::InvalidGeometry(msg) => write!(f, "invalid geometry: {msg}"),
            PlatformError::CreationFailed(msg) => write!(f, "control creation failed: {msg}"),
            PlatformError::SubclassFailed(msg) => write!(f, "subclassing failed: {msg}"),
            PlatformError::OperationFailed(msg) => write!(f, "operation failed: {msg}"),
            #[cfg(target_os = "windows")]
            PlatformError::Win32(err) => write!(f, "win32 error: {err}"),
        }
    }
}

impl std::error::Error for PlatformError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            #[cfg(target_os = "windows")]
            PlatformError::Win32(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(target_os = "windows")]
impl From<windows::core::Error> for PlatformError {
    fn from(err: windows::core::Error) -> Self {
        PlatformError::Win32(err)
    }
}

pub type Result<T> = std::result::Result<T, PlatformError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_kind_and_detail() {
        let err = PlatformError::InvalidHandle("parent 0x0".to_string());
        assert_eq!(err.to_string(), "invalid handle: parent 0x0");

        let err = PlatformError::SubclassFailed("id 0".to_string());
        assert_eq!(err.to_string(), "subclassing failed: id 0");
    }

    #[test]
    fn portable_variants_have_no_source() {
        use std::error::Error;
        let err = PlatformError::CreationFailed("BUTTON".to_string());
        assert!(err.source().is_none());
    }

    #[cfg(target_os = "windows")]
    #[test]
    fn win32_errors_convert_and_keep_their_source() {
        use std::error::Error;
        use windows::Win32::Foundation::E_FAIL;

        let err: PlatformError = windows::core::Error::from_hresult(E_FAIL).into();

        assert!(matches!(err, PlatformError::Win32(_)));
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("win32 error: "));
    }
}
