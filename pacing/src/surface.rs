use crate::{error::DisplayError, state_id::StateId};

/// A set of mutually exclusive panels, one per [`StateId`], plus the panel
/// shown before the first state arrives.
pub trait DisplaySurface {
    fn hide_all(&mut self) -> Result<(), DisplayError>;

    /// Shows the panel registered for `id`. Every other panel is hidden.
    fn show(&mut self, id: &StateId) -> Result<(), DisplayError>;

    fn show_init(&mut self) -> Result<(), DisplayError>;
}

impl<S> DisplaySurface for Box<S>
where
    S: DisplaySurface + ?Sized,
{
    fn hide_all(&mut self) -> Result<(), DisplayError> {
        (**self).hide_all()
    }

    fn show(&mut self, id: &StateId) -> Result<(), DisplayError> {
        (**self).show(id)
    }

    fn show_init(&mut self) -> Result<(), DisplayError> {
        (**self).show_init()
    }
}
