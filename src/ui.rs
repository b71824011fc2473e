//! The user interface seam.

use crate::event::Event;
use crate::state::SessionSnapshot;

/// Front end driven by the client loop.
///
/// `render` is called once per [`Event`], in order. After each batch of
/// events `present` receives a fresh snapshot for channel and member lists.
pub trait Ui {
    /// Show one event.
    fn render(&mut self, event: &Event);

    /// Refresh list views.
    fn present(&mut self, _snapshot: &SessionSnapshot) {}
}

impl<U: Ui + ?Sized> Ui for &mut U {
    fn render(&mut self, event: &Event) {
        (**self).render(event);
    }

    fn present(&mut self, snapshot: &SessionSnapshot) {
        (**self).present(snapshot);
    }
}
