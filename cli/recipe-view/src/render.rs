use crate::state::View;

/// The rendering collaborator.
///
/// Renderers only read the [View], user input flows back to the controller
/// as [crate::Action]s dispatched by whoever drives the event loop.
pub trait Render {
    type Error;

    fn render(&mut self, view: &View<'_>) -> Result<(), Self::Error>;
}
