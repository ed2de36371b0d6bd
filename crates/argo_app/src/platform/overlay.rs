use argo_core::{EditOrigin, Msg, Rect};

/// The rectangle shown on the map. Every change is reported back as a
/// message tagged with who made it.
#[derive(Debug, Default)]
pub struct MapOverlay {
    shape: Option<Rect>,
}

impl MapOverlay {
    /// Redraw requested by the application. Redrawing the shape already on
    /// screen reports nothing.
    pub fn redraw(&mut self, rect: Rect) -> Option<Msg> {
        if self.shape == Some(rect) {
            return None;
        }
        self.shape = Some(rect);
        Some(Msg::OverlayChanged {
            rect,
            origin: EditOrigin::Programmatic,
        })
    }

    /// Rectangle drawn or edited by the user.
    pub fn user_draw(&mut self, rect: Rect) -> Msg {
        self.shape = Some(rect);
        Msg::OverlayChanged {
            rect,
            origin: EditOrigin::User,
        }
    }

    pub fn user_clear(&mut self) -> Msg {
        self.shape = None;
        Msg::OverlayCleared
    }
}
