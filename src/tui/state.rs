use std::time::{Duration, Instant};

/// How often the follow timer re-fetches logs.
pub const FOLLOW_INTERVAL: Duration = Duration::from_secs(2);

/// Which screen the dashboard is showing. Containers is home; the others are
/// pushed on top of it and pop back.
#[derive(Clone, Debug, PartialEq)]
pub enum Screen {
    Containers,
    Services,
    Details,
    Profiles,
    Logs,
}

/// Selection and feedback state for the container table.
#[derive(Default)]
pub struct DashboardState {
    pub selected_index: usize,
    pub status_message: Option<String>,
}

impl DashboardState {
    /// Clamp the selection after the container list changed size.
    pub fn clamp_selection(&mut self, total: usize) {
        if total == 0 {
            self.selected_index = 0;
        } else if self.selected_index >= total {
            self.selected_index = total - 1;
        }
    }
}

/// State of the log viewer. Lines are replaced wholesale on every refresh;
/// the follow toggle drives a cooperative timer in the event loop, there is
/// no background thread.
pub struct LogViewState {
    pub container_id: String,
    pub container_name: String,
    pub lines: Vec<String>,
    pub scroll_offset: usize,
    pub follow: bool,
    pub last_refresh: Instant,
}

impl LogViewState {
    pub fn new(container_id: String, container_name: String) -> Self {
        Self {
            container_id,
            container_name,
            lines: Vec::new(),
            scroll_offset: 0,
            follow: false,
            last_refresh: Instant::now() - FOLLOW_INTERVAL,
        }
    }

    /// Whether the follow timer is due for another fetch.
    pub fn refresh_due(&self) -> bool {
        self.follow && self.last_refresh.elapsed() >= FOLLOW_INTERVAL
    }

    pub fn replace_lines(&mut self, lines: Vec<String>) {
        self.lines = lines;
        self.last_refresh = Instant::now();
    }

    pub fn toggle_follow(&mut self) {
        self.follow = !self.follow;
        if self.follow {
            self.scroll_offset = 0;
        }
    }
}
