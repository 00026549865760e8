/*
 * Entry point for the menuctl crate: an owner-drawn Win32 BUTTON, subclassed
 * so that it can serve as a custom-drawn menu item.
 *
 * The factory and the subclass message router are written against the
 * `SubclassBackend` trait and compile on every platform, so their behaviour is
 * unit-tested without a desktop session. The Win32 backend, the
 * `extern "system"` subclass procedure and the HWND-typed API in `win32` are
 * only built on Windows.
 */
pub mod backend;
pub(crate) mod controls;
pub mod error;
#[cfg(test)]
pub(crate) mod fake_backend;
pub mod menu_control;
pub mod types;
#[cfg(target_os = "windows")]
pub(crate) mod window_common;

pub use backend::SubclassBackend;
pub use error::{PlatformError, Result as PlatformResult};
pub use menu_control::{
    DeferToDefault, PaintStrategy, create_custom_menu, detach_custom_menu, is_custom_menu,
    route_subclass_message, with_ref_data_pinned,
};
pub use types::{ControlRect, ControlRef, MenuControlConfig, PaintOutcome, RefData, SubclassId};

/// HWND-typed API for creating and tearing down custom menu controls on Windows.
#[cfg(target_os = "windows")]
pub mod win32 {
    pub use crate::controls::menu_handler::{
        MenuControl, ScopedPainter, create_custom_menu, create_custom_menu_with,
        detach_custom_menu, is_custom_menu,
    };
    pub use crate::window_common::PaintScope;
}
