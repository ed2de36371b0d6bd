use argo_logging::{argo_debug, argo_info};

use crate::{AppState, EditOrigin, Effect, Msg, SessionEffect, SessionEvent};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::BoundFieldEdited { field, raw } => {
            state.mark_dirty();
            match state.bounds_mut().set_from_field(field, &raw) {
                Some(rect) => vec![Effect::RedrawOverlay(rect)],
                None => Vec::new(),
            }
        }
        Msg::OverlayChanged { rect, origin } => {
            let fields_changed = state.bounds_mut().set_from_overlay(rect, origin);
            // A redraw echo changes the drawn geometry only.
            if fields_changed || origin == EditOrigin::Programmatic {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::OverlayCleared => {
            state.bounds_mut().clear_overlay();
            state.mark_dirty();
            Vec::new()
        }
        Msg::ParamEdited { field, raw } => {
            state.params_mut().set_field(field, &raw);
            state.mark_dirty();
            Vec::new()
        }
        Msg::CategorySelected(category) => {
            state.params_mut().set_category(category);
            state.mark_dirty();
            Vec::new()
        }
        Msg::SubmitClicked => {
            let bound = state.bounds().current_bound();
            let params = state.parameters().params().clone();
            state.mark_dirty();
            match state.search_mut().submit(bound, params) {
                Ok(effects) => {
                    state.set_notice(None);
                    argo_info!("Search submitted");
                    session_effects(&mut state, effects)
                }
                Err(err) => {
                    argo_debug!("Search rejected: {}", err);
                    state.set_notice(Some(err.to_string()));
                    Vec::new()
                }
            }
        }
        Msg::CancelClicked => apply(&mut state, SessionEvent::Cancel),
        Msg::DismissClicked => {
            state.set_notice(None);
            apply(&mut state, SessionEvent::Dismiss)
        }
        Msg::ChannelOpened { session } => apply(&mut state, SessionEvent::Opened { session }),
        Msg::ChannelMessage { session, text } => {
            apply(&mut state, SessionEvent::Received { session, text })
        }
        Msg::ChannelFailed { session, reason } => {
            apply(&mut state, SessionEvent::TransportFailed { session, reason })
        }
        Msg::ChannelClosed { session } => apply(&mut state, SessionEvent::Closed { session }),
    };

    (state, effects)
}

fn apply(state: &mut AppState, event: SessionEvent) -> Vec<Effect> {
    let effects = state.search_mut().apply(event);
    state.mark_dirty();
    session_effects(state, effects)
}

fn session_effects(state: &mut AppState, effects: Vec<SessionEffect>) -> Vec<Effect> {
    state.sync_preview();
    effects.into_iter().map(Effect::from).collect()
}
