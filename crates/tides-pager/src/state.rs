//! Window lifecycle: `Empty -> Building -> Ready`.

/// Lifecycle state of the day window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowState {
    /// Nothing loaded: never built, or the last build failed.
    #[default]
    Empty,
    /// A build is populating the window. No navigation is accepted.
    Building,
    /// The window is populated and can be navigated and refreshed.
    Ready,
}

impl WindowState {
    /// True if navigation and refresh are accepted.
    pub fn is_ready(self) -> bool {
        matches!(self, WindowState::Ready)
    }

    /// State after a (re)build starts. Valid from any state.
    pub fn on_build_started(self) -> Self {
        WindowState::Building
    }

    /// State after a build completed.
    pub fn on_build_succeeded(self) -> Self {
        WindowState::Ready
    }

    /// State after a build failed or was cancelled.
    pub fn on_build_failed(self) -> Self {
        WindowState::Empty
    }
}

impl std::fmt::Display for WindowState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            WindowState::Empty => "empty",
            WindowState::Building => "building",
            WindowState::Ready => "ready",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_ready_accepts_navigation() {
        assert!(!WindowState::Empty.is_ready());
        assert!(!WindowState::Building.is_ready());
        assert!(WindowState::Ready.is_ready());
    }

    #[test]
    fn build_lifecycle() {
        let building = WindowState::Empty.on_build_started();
        assert_eq!(building, WindowState::Building);
        assert_eq!(building.on_build_succeeded(), WindowState::Ready);
        assert_eq!(building.on_build_failed(), WindowState::Empty);
        assert_eq!(WindowState::Ready.on_build_started(), WindowState::Building);
    }
}
