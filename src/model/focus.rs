use crate::sys::window::WindowHandle;

/// Index of `active` among `handles`, first match wins.
pub fn reconcile<'a, I>(active: Option<WindowHandle>, handles: I) -> Option<usize>
where
    I: IntoIterator<Item = &'a WindowHandle>,
{
    let active = active?;
    handles.into_iter().position(|h| *h == active)
}
