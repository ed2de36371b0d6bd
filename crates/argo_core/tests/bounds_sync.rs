use argo_core::{update, AppState, Bound, BoundField, EditOrigin, Effect, Msg, Rect};

fn init_logging() {
    argo_logging::initialize_for_tests();
}

fn edit(state: AppState, field: BoundField, raw: &str) -> (AppState, Vec<Effect>) {
    update(
        state,
        Msg::BoundFieldEdited {
            field,
            raw: raw.to_string(),
        },
    )
}

#[test]
fn overlay_edit_sets_all_four_fields() {
    init_logging();
    let rects = [
        Rect::new(10.0, -10.0, 20.0, -20.0),
        Rect::new(89.5, 89.0, 180.0, 179.25),
        Rect::new(0.001, 0.0, -60.0, -61.0),
    ];
    for rect in rects {
        let (state, effects) = update(
            AppState::new(),
            Msg::OverlayChanged {
                rect,
                origin: EditOrigin::User,
            },
        );
        assert!(effects.is_empty());
        assert_eq!(state.bounds().current_bound(), Bound::from(rect));
        assert_eq!(state.bounds().current_bound().as_rect(), Some(rect));
    }
}

#[test]
fn empty_field_input_is_unset_not_zero() {
    init_logging();
    let (state, _) = update(
        AppState::new(),
        Msg::OverlayChanged {
            rect: Rect::new(10.0, -10.0, 20.0, -20.0),
            origin: EditOrigin::User,
        },
    );
    for field in BoundField::ALL {
        for raw in ["", "   ", "abc"] {
            let (next, effects) = edit(state.clone(), field, raw);
            let bound = next.bounds().current_bound();
            assert_eq!(bound.get(field), None, "{field} with {raw:?}");
            assert!(effects.is_empty());
        }
    }
}

#[test]
fn field_edit_only_touches_its_field() {
    init_logging();
    let (state, _) = edit(AppState::new(), BoundField::North, "45.5");
    let bound = state.bounds().current_bound();
    assert_eq!(bound.north, Some(45.5));
    assert_eq!(bound.south, None);
    assert_eq!(bound.east, None);
    assert_eq!(bound.west, None);
}

#[test]
fn completing_a_valid_bound_requests_one_redraw() {
    init_logging();
    let (state, effects) = edit(AppState::new(), BoundField::North, "10");
    assert!(effects.is_empty());
    let (state, effects) = edit(state, BoundField::South, "-10");
    assert!(effects.is_empty());
    let (state, effects) = edit(state, BoundField::East, "20");
    assert!(effects.is_empty());
    let (state, effects) = edit(state, BoundField::West, "-20");

    let expected = Rect::new(10.0, -10.0, 20.0, -20.0);
    assert_eq!(effects, vec![Effect::RedrawOverlay(expected)]);
    assert_eq!(state.bounds().drawn(), None);
}

#[test]
fn invalid_bound_is_not_drawn() {
    init_logging();
    let (state, _) = edit(AppState::new(), BoundField::North, "-10");
    let (state, _) = edit(state, BoundField::South, "10");
    let (state, _) = edit(state, BoundField::East, "20");
    let (_state, effects) = edit(state, BoundField::West, "-20");
    assert!(effects.is_empty());
}

#[test]
fn programmatic_echo_does_not_mutate_fields() {
    init_logging();
    let (state, _) = edit(AppState::new(), BoundField::North, "10");
    let (state, _) = edit(state, BoundField::South, "-10");
    let (state, _) = edit(state, BoundField::East, "20");
    let (state, effects) = edit(state, BoundField::West, "-20");
    let Effect::RedrawOverlay(rect) = effects[0].clone() else {
        panic!("expected redraw, got {effects:?}");
    };

    // The overlay snaps the rectangle slightly; the echo must not feed back.
    let snapped = Rect::new(10.01, -10.0, 20.0, -20.0);
    let (state, effects) = update(
        state,
        Msg::OverlayChanged {
            rect: snapped,
            origin: EditOrigin::Programmatic,
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.bounds().current_bound().as_rect(), Some(rect));
    assert_eq!(state.bounds().drawn(), Some(snapped));
}

#[test]
fn editing_back_to_drawn_geometry_skips_redraw() {
    init_logging();
    let rect = Rect::new(10.0, -10.0, 20.0, -20.0);
    let (state, _) = update(
        AppState::new(),
        Msg::OverlayChanged {
            rect,
            origin: EditOrigin::User,
        },
    );
    let (state, effects) = edit(state, BoundField::North, "11");
    assert_eq!(
        effects,
        vec![Effect::RedrawOverlay(Rect::new(11.0, -10.0, 20.0, -20.0))]
    );
    let (state, _) = update(
        state,
        Msg::OverlayChanged {
            rect: Rect::new(11.0, -10.0, 20.0, -20.0),
            origin: EditOrigin::Programmatic,
        },
    );
    let (_state, effects) = edit(state, BoundField::North, "11");
    assert!(effects.is_empty());
}

#[test]
fn user_drag_after_field_edit_wins() {
    init_logging();
    let (state, _) = edit(AppState::new(), BoundField::North, "10");
    let dragged = Rect::new(5.0, 1.0, 3.0, 2.0);
    let (state, _) = update(
        state,
        Msg::OverlayChanged {
            rect: dragged,
            origin: EditOrigin::User,
        },
    );
    assert_eq!(state.bounds().current_bound(), Bound::from(dragged));
}

#[test]
fn clearing_overlay_unsets_everything() {
    init_logging();
    let (state, _) = update(
        AppState::new(),
        Msg::OverlayChanged {
            rect: Rect::new(10.0, -10.0, 20.0, -20.0),
            origin: EditOrigin::User,
        },
    );
    let (mut state, effects) = update(state, Msg::OverlayCleared);
    assert!(effects.is_empty());
    assert!(state.bounds().current_bound().is_empty());
    assert_eq!(state.bounds().drawn(), None);
    assert!(state.consume_dirty());
}
