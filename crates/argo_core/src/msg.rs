use crate::{BoundField, Category, EditOrigin, ParamField, Rect, SessionId};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User edited one of the numeric bound fields.
    BoundFieldEdited { field: BoundField, raw: String },
    /// The overlay rectangle changed, either by the user or by a redraw.
    OverlayChanged { rect: Rect, origin: EditOrigin },
    /// User deleted the drawn rectangle.
    OverlayCleared,
    /// User edited a date or depth field.
    ParamEdited { field: ParamField, raw: String },
    /// User picked a dataset category.
    CategorySelected(Category),
    /// User clicked Search.
    SubmitClicked,
    /// User aborted the running search.
    CancelClicked,
    /// User closed the result or error.
    DismissClicked,
    /// Transport: the session channel is open.
    ChannelOpened { session: SessionId },
    /// Transport: one inbound text frame.
    ChannelMessage { session: SessionId, text: String },
    /// Transport: the channel could not be opened or broke.
    ChannelFailed { session: SessionId, reason: String },
    /// Transport: the peer closed the channel.
    ChannelClosed { session: SessionId },
}
