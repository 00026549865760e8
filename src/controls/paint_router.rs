use crate::types::{WM_NCDESTROY, WM_PAINT};
use log::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MessageRoute {
    Paint,
    NcDestroy,
    Default,
}

pub(crate) fn resolve_message_route(msg: u32) -> MessageRoute {
    match msg {
        WM_PAINT => {
            trace!("[Paint] WM_PAINT routed to paint strategy");
            MessageRoute::Paint
        }
        WM_NCDESTROY => MessageRoute::NcDestroy,
        _ => MessageRoute::Default,
    }
}
