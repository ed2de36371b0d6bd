use crate::{Bound, PreviewTable, QueryParameters, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchStatus {
    #[default]
    Idle,
    Connecting,
    Running,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub bound: Bound,
    pub overlay: Option<Rect>,
    pub params: QueryParameters,
    pub variables: Vec<&'static str>,
    pub status: SearchStatus,
    /// True while a session is connecting or running.
    pub loading: bool,
    pub logs: Vec<String>,
    /// Validation notice or the failure message of the last session.
    pub error: Option<String>,
    pub artifact_filename: Option<String>,
    pub preview: Option<PreviewTable>,
    pub dirty: bool,
}
