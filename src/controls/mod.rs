#[cfg(target_os = "windows")]
pub(crate) mod menu_handler;
pub(crate) mod paint_router;
