//! Argo core: pure state machine and view-model helpers.
mod bounds;
mod effect;
mod geometry;
mod msg;
mod params;
mod preview;
mod protocol;
mod search;
mod state;
mod update;
mod view_model;

pub use bounds::{BoundsSynchronizer, EditOrigin};
pub use effect::Effect;
pub use geometry::{parse_coordinate, Bound, BoundField, Rect};
pub use msg::Msg;
pub use params::{Category, ParamField, ParameterSelector, QueryParameters, ALL_PARAMETERS};
pub use preview::{build_preview, PreviewTable, PREVIEW_ROWS};
pub use protocol::{decode_event, ProtocolError, SearchRequest, ServiceEvent, ValidationError};
pub use search::{
    step, Artifact, JobState, SearchOrchestrator, SessionEffect, SessionEvent, SessionId,
    CONNECTION_LOST_MESSAGE, PROTOCOL_FAILURE_MESSAGE, TRANSPORT_FAILURE_MESSAGE,
};
pub use state::AppState;
pub use update::update;
pub use view_model::{AppViewModel, SearchStatus};
