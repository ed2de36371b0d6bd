use crate::preview::build_preview;
use crate::view_model::{AppViewModel, SearchStatus};
use crate::{
    BoundsSynchronizer, JobState, ParameterSelector, PreviewTable, QueryParameters,
    SearchOrchestrator,
};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    bounds: BoundsSynchronizer,
    params: ParameterSelector,
    search: SearchOrchestrator,
    preview: Option<PreviewTable>,
    notice: Option<String>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with the given form defaults instead of the built-in ones.
    pub fn with_parameters(params: QueryParameters) -> Self {
        Self {
            params: ParameterSelector::new(params),
            ..Self::default()
        }
    }

    pub fn view(&self) -> AppViewModel {
        let job = self.search.state();
        let status = match job {
            JobState::Idle => SearchStatus::Idle,
            JobState::Connecting { .. } => SearchStatus::Connecting,
            JobState::Running { .. } => SearchStatus::Running,
            JobState::Succeeded { .. } => SearchStatus::Succeeded,
            JobState::Failed { .. } => SearchStatus::Failed,
        };
        let error = match job {
            JobState::Failed { message, .. } => Some(message.clone()),
            _ => self.notice.clone(),
        };

        AppViewModel {
            bound: self.bounds.current_bound(),
            overlay: self.bounds.drawn(),
            params: self.params.params().clone(),
            variables: self.params.visible_variables().to_vec(),
            status,
            loading: job.is_busy(),
            logs: job.logs().to_vec(),
            error,
            artifact_filename: self
                .search
                .artifact()
                .and_then(|artifact| artifact.filename.clone()),
            preview: self.preview.clone(),
            dirty: self.dirty,
        }
    }

    pub fn bounds(&self) -> &BoundsSynchronizer {
        &self.bounds
    }

    pub fn parameters(&self) -> &ParameterSelector {
        &self.params
    }

    pub fn search(&self) -> &SearchOrchestrator {
        &self.search
    }

    pub fn preview(&self) -> Option<&PreviewTable> {
        self.preview.as_ref()
    }

    pub(crate) fn bounds_mut(&mut self) -> &mut BoundsSynchronizer {
        &mut self.bounds
    }

    pub(crate) fn params_mut(&mut self) -> &mut ParameterSelector {
        &mut self.params
    }

    pub(crate) fn search_mut(&mut self) -> &mut SearchOrchestrator {
        &mut self.search
    }

    pub(crate) fn set_notice(&mut self, notice: Option<String>) {
        self.notice = notice;
    }

    /// Rebuilds the preview whenever the artifact appears or goes away.
    pub(crate) fn sync_preview(&mut self) {
        match (self.search.artifact(), self.preview.is_some()) {
            (Some(artifact), false) => self.preview = Some(build_preview(&artifact.csv)),
            (None, true) => self.preview = None,
            _ => {}
        }
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Returns whether the state changed since the last call, and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}
