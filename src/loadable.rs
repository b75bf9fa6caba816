use crate::error::{NavError, NavResult};

/// Load state of an asynchronously constructible unit.
///
/// Every screen starts out NotLoaded. The stack issues the load request when
/// the screen is handed to the attachment host, and the host's readiness
/// future resolving is the only thing that moves it to Ready. Both
/// transitions happen exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// No load has been requested yet (initial state)
    NotLoaded,

    /// Handed to the host, construction in progress
    Loading,

    /// Construction finished, readiness observed on the main context
    Ready,
}

impl LoadState {
    /// Begin loading. Valid exactly once, from NotLoaded.
    pub fn request_load(&mut self) -> NavResult<()> {
        match self {
            LoadState::NotLoaded => {
                *self = LoadState::Loading;
                Ok(())
            }
            _ => Err(NavError::InvalidState),
        }
    }

    /// Record readiness. Valid exactly once, from Loading.
    pub fn complete(&mut self) -> NavResult<()> {
        match self {
            LoadState::Loading => {
                *self = LoadState::Ready;
                Ok(())
            }
            _ => Err(NavError::InvalidState),
        }
    }

    /// Check if loading has finished
    pub fn is_ready(&self) -> bool {
        matches!(self, LoadState::Ready)
    }

    /// Check if no load has been requested yet
    pub fn is_not_loaded(&self) -> bool {
        matches!(self, LoadState::NotLoaded)
    }
}

impl Default for LoadState {
    fn default() -> Self {
        LoadState::NotLoaded
    }
}
