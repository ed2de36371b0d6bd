use crate::geometry::{parse_coordinate, Bound, BoundField, Rect};

/// Where an overlay geometry change came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOrigin {
    /// The user drew, dragged or resized the rectangle.
    User,
    /// The overlay was redrawn to mirror the numeric fields.
    Programmatic,
}

/// Keeps the numeric bound fields and the drawn overlay in agreement.
///
/// The synchronizer owns the overlay geometry. Field edits that produce a
/// valid bound request a programmatic redraw; the overlay echoes that redraw
/// back tagged [`EditOrigin::Programmatic`], which only updates the recorded
/// geometry and never touches the fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoundsSynchronizer {
    current: Bound,
    drawn: Option<Rect>,
}

impl BoundsSynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_bound(&self) -> Bound {
        self.current
    }

    /// The geometry currently drawn on the overlay, if any.
    pub fn drawn(&self) -> Option<Rect> {
        self.drawn
    }

    /// Applies a raw field edit. Returns the rectangle the overlay should be
    /// redrawn to, if the edit completed a valid bound that differs from the
    /// drawn geometry.
    pub fn set_from_field(&mut self, field: BoundField, raw: &str) -> Option<Rect> {
        let value = parse_coordinate(raw);
        self.current.set(field, value);

        let rect = self.current.valid_rect()?;
        if self.drawn == Some(rect) {
            return None;
        }
        Some(rect)
    }

    /// Applies an overlay geometry change. Returns true when the fields changed.
    pub fn set_from_overlay(&mut self, rect: Rect, origin: EditOrigin) -> bool {
        self.drawn = Some(rect);
        match origin {
            EditOrigin::Programmatic => false,
            EditOrigin::User => {
                let next = Bound::from(rect);
                let changed = next != self.current;
                self.current = next;
                changed
            }
        }
    }

    /// The user removed the drawn rectangle.
    pub fn clear_overlay(&mut self) {
        self.drawn = None;
        self.current = Bound::empty();
    }
}
