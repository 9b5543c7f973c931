//! Terminal dashboard over the Docker SDK. Single-threaded, cooperative:
//! container refreshes and log follow both run on timers inside the event
//! loop, with the tokio runtime driven via `block_on`.

pub mod state;
mod view;

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};

use crate::config::{Profile, SugarConfig};
use crate::docker::{ContainerDetails, DockerClient, ServiceInfo};
use crate::errors::{Result, SugarError};
use state::{DashboardState, LogViewState, Screen};

const TICK_RATE: Duration = Duration::from_secs(3);

/// Restore the terminal to normal mode. Safe to call multiple times.
pub fn restore_terminal() {
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
    let _ = disable_raw_mode();
}

struct App {
    client: DockerClient,
    rt: tokio::runtime::Runtime,
    containers: Vec<crate::docker::ContainerInfo>,
    ui_state: DashboardState,
    services: Vec<ServiceInfo>,
    services_state: DashboardState,
    profiles: Vec<(String, Profile)>,
    profiles_state: DashboardState,
    details: Option<ContainerDetails>,
    screen: Screen,
    log_view: Option<LogViewState>,
    last_tick: Instant,
}

impl App {
    fn new(client: DockerClient, rt: tokio::runtime::Runtime, profiles: Vec<(String, Profile)>) -> Self {
        Self {
            client,
            rt,
            containers: Vec::new(),
            ui_state: DashboardState::default(),
            services: Vec::new(),
            services_state: DashboardState::default(),
            profiles,
            profiles_state: DashboardState::default(),
            details: None,
            screen: Screen::Containers,
            log_view: None,
            last_tick: Instant::now() - TICK_RATE,
        }
    }

    /// Refresh the container table on the fixed tick. Returns true if a
    /// render is needed.
    fn process_tick(&mut self) -> bool {
        if self.last_tick.elapsed() < TICK_RATE || self.screen != Screen::Containers {
            return false;
        }
        self.last_tick = Instant::now();
        match self.rt.block_on(self.client.list_containers()) {
            Ok(containers) => {
                self.containers = containers;
                self.ui_state.clamp_selection(self.containers.len());
            }
            Err(e) => {
                self.ui_state.status_message = Some(format!("Error: {}", e));
            }
        }
        true
    }

    /// Follow timer: re-issue the log fetch while follow is on.
    fn process_follow(&mut self) -> bool {
        let Some(view) = &mut self.log_view else { return false };
        if !view.refresh_due() {
            return false;
        }
        let id = view.container_id.clone();
        match self.rt.block_on(self.client.fetch_logs(&id)) {
            Ok(lines) => view.replace_lines(lines),
            Err(e) => view.replace_lines(vec![format!("Error reading logs: {}", e)]),
        }
        true
    }

    fn open_logs(&mut self) {
        let Some(c) = self.containers.get(self.ui_state.selected_index) else { return };
        let mut view = LogViewState::new(c.id.clone(), c.name.clone());
        match self.rt.block_on(self.client.fetch_logs(&c.id)) {
            Ok(lines) => view.replace_lines(lines),
            Err(e) => view.replace_lines(vec![format!("Error reading logs: {}", e)]),
        }
        self.log_view = Some(view);
        self.screen = Screen::Logs;
    }

    fn close_logs(&mut self) {
        // Dropping the view cancels the follow timer. Logs opened from the
        // details screen pop back to it.
        self.log_view = None;
        self.screen = if self.details.is_some() {
            Screen::Details
        } else {
            Screen::Containers
        };
    }

    fn refresh_services(&mut self) {
        match self.rt.block_on(self.client.list_services()) {
            Ok(services) => {
                self.services = services;
                self.services_state.status_message = None;
            }
            Err(e) => {
                self.services.clear();
                self.services_state.status_message = Some(format!("Error: {}", e));
            }
        }
        self.services_state.clamp_selection(self.services.len());
    }

    fn open_services(&mut self) {
        self.refresh_services();
        self.screen = Screen::Services;
    }

    fn refresh_details(&mut self) {
        let Some(details) = &self.details else { return };
        let id = details.id.clone();
        match self.rt.block_on(self.client.inspect_container(&id)) {
            Ok(details) => self.details = Some(details),
            Err(e) => self.ui_state.status_message = Some(format!("Error: {}", e)),
        }
    }

    fn open_details(&mut self) {
        let Some(c) = self.containers.get(self.ui_state.selected_index) else { return };
        match self.rt.block_on(self.client.inspect_container(&c.id)) {
            Ok(details) => {
                self.details = Some(details);
                self.screen = Screen::Details;
            }
            Err(e) => self.ui_state.status_message = Some(format!("Error: {}", e)),
        }
    }

    fn close_details(&mut self) {
        self.details = None;
        self.screen = Screen::Containers;
    }

    fn open_logs_from_details(&mut self) {
        let Some(details) = &self.details else { return };
        let (id, name) = (details.id.clone(), details.name.clone());
        let mut view = LogViewState::new(id.clone(), name);
        match self.rt.block_on(self.client.fetch_logs(&id)) {
            Ok(lines) => view.replace_lines(lines),
            Err(e) => view.replace_lines(vec![format!("Error reading logs: {}", e)]),
        }
        self.log_view = Some(view);
        self.screen = Screen::Logs;
    }

    fn container_action(&mut self, action: &str) {
        let Some(c) = self.containers.get(self.ui_state.selected_index) else { return };
        let id = c.id.clone();
        let result = self.rt.block_on(async {
            match action {
                "start" => self.client.start_container(&id).await.map(|_| format!("Started {}", id)),
                "stop" => self.client.stop_container(&id).await.map(|_| format!("Stopped {}", id)),
                "restart" => self.client.restart_container(&id).await.map(|_| format!("Restarted {}", id)),
                _ => Err("Unknown action".to_string()),
            }
        });
        self.ui_state.status_message = Some(match result {
            Ok(msg) => msg,
            Err(e) => format!("Error: {}", e),
        });
        // Pick up the new state on the next loop iteration.
        self.last_tick = Instant::now() - TICK_RATE;
    }

    fn render(&mut self) -> io::Result<()> {
        match self.screen {
            Screen::Containers => view::render_containers(&self.containers, &self.ui_state),
            Screen::Services => view::render_services(&self.services, &self.services_state),
            Screen::Profiles => view::render_profiles(&self.profiles, &self.profiles_state),
            Screen::Details => match &self.details {
                Some(details) => view::render_details(details),
                None => view::render_containers(&self.containers, &self.ui_state),
            },
            Screen::Logs => match &self.log_view {
                Some(view) => view::render_logs(view),
                None => view::render_containers(&self.containers, &self.ui_state),
            },
        }
    }
}

enum InputResult {
    Quit,
    Consumed,
}

fn handle_key(app: &mut App, key: KeyEvent) -> Option<InputResult> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(InputResult::Quit);
    }

    match app.screen {
        Screen::Containers => match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Some(InputResult::Quit),
            KeyCode::Up => {
                if app.ui_state.selected_index > 0 {
                    app.ui_state.selected_index -= 1;
                }
                Some(InputResult::Consumed)
            }
            KeyCode::Down => {
                if app.ui_state.selected_index + 1 < app.containers.len() {
                    app.ui_state.selected_index += 1;
                }
                Some(InputResult::Consumed)
            }
            KeyCode::Right | KeyCode::Enter => {
                app.open_logs();
                Some(InputResult::Consumed)
            }
            KeyCode::Char('d') | KeyCode::Char('D') => {
                app.open_details();
                Some(InputResult::Consumed)
            }
            KeyCode::Char('w') | KeyCode::Char('W') => {
                app.open_services();
                Some(InputResult::Consumed)
            }
            KeyCode::Char('p') | KeyCode::Char('P') => {
                app.screen = Screen::Profiles;
                Some(InputResult::Consumed)
            }
            KeyCode::Char('s') | KeyCode::Char('S') => {
                app.container_action("start");
                Some(InputResult::Consumed)
            }
            KeyCode::Char('t') | KeyCode::Char('T') => {
                app.container_action("stop");
                Some(InputResult::Consumed)
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                app.container_action("restart");
                Some(InputResult::Consumed)
            }
            _ => None,
        },
        Screen::Logs => match key.code {
            KeyCode::Char('q') | KeyCode::Esc | KeyCode::Left => {
                app.close_logs();
                Some(InputResult::Consumed)
            }
            KeyCode::Up => {
                if let Some(view) = &mut app.log_view {
                    view.scroll_offset += 1;
                    view.follow = false;
                }
                Some(InputResult::Consumed)
            }
            KeyCode::Down => {
                if let Some(view) = &mut app.log_view {
                    view.scroll_offset = view.scroll_offset.saturating_sub(1);
                }
                Some(InputResult::Consumed)
            }
            KeyCode::Char('f') => {
                if let Some(view) = &mut app.log_view {
                    view.toggle_follow();
                }
                Some(InputResult::Consumed)
            }
            KeyCode::Char('r') => {
                if let Some(view) = &mut app.log_view {
                    // Force the next follow check to fetch immediately.
                    view.last_refresh = Instant::now() - state::FOLLOW_INTERVAL;
                    view.follow = true;
                }
                Some(InputResult::Consumed)
            }
            _ => None,
        },
        Screen::Services => match key.code {
            KeyCode::Char('q') | KeyCode::Esc | KeyCode::Left => {
                app.screen = Screen::Containers;
                Some(InputResult::Consumed)
            }
            KeyCode::Up => {
                if app.services_state.selected_index > 0 {
                    app.services_state.selected_index -= 1;
                }
                Some(InputResult::Consumed)
            }
            KeyCode::Down => {
                if app.services_state.selected_index + 1 < app.services.len() {
                    app.services_state.selected_index += 1;
                }
                Some(InputResult::Consumed)
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                app.refresh_services();
                Some(InputResult::Consumed)
            }
            _ => None,
        },
        Screen::Details => match key.code {
            KeyCode::Char('q') | KeyCode::Esc | KeyCode::Left => {
                app.close_details();
                Some(InputResult::Consumed)
            }
            KeyCode::Char('l') | KeyCode::Char('L') => {
                app.open_logs_from_details();
                Some(InputResult::Consumed)
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                app.refresh_details();
                Some(InputResult::Consumed)
            }
            _ => None,
        },
        Screen::Profiles => match key.code {
            KeyCode::Char('q') | KeyCode::Esc | KeyCode::Left => {
                app.screen = Screen::Containers;
                Some(InputResult::Consumed)
            }
            KeyCode::Up => {
                if app.profiles_state.selected_index > 0 {
                    app.profiles_state.selected_index -= 1;
                }
                Some(InputResult::Consumed)
            }
            KeyCode::Down => {
                if app.profiles_state.selected_index + 1 < app.profiles.len() {
                    app.profiles_state.selected_index += 1;
                }
                Some(InputResult::Consumed)
            }
            _ => None,
        },
    }
}

/// Run the dashboard. Sets up the terminal, runs the main loop, restores the
/// terminal on exit (including SIGINT/SIGTERM).
pub fn run(config: SugarConfig) -> Result<i32> {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(2)
        .build()
        .map_err(|e| SugarError::command_error(format!("Failed to create runtime: {}", e)))?;

    let Some(client) = DockerClient::try_new() else {
        return Err(SugarError::command_error(
            "Failed to connect to the Docker daemon",
        ));
    };
    if !rt.block_on(client.is_available()) {
        return Err(SugarError::command_error(
            "Docker daemon is not reachable",
        ));
    }

    let should_quit = Arc::new(AtomicBool::new(false));
    for sig in [signal_hook::consts::SIGINT, signal_hook::consts::SIGTERM] {
        signal_hook::flag::register(sig, Arc::clone(&should_quit)).map_err(|e| {
            SugarError::command_error(format!("Failed to register signal handler: {}", e))
        })?;
    }

    enable_raw_mode().map_err(io_err)?;
    execute!(io::stdout(), EnterAlternateScreen, Clear(ClearType::All)).map_err(io_err)?;

    let mut profiles: Vec<(String, Profile)> = config.profiles.into_iter().collect();
    profiles.sort_by(|a, b| a.0.cmp(&b.0));

    let result = event_loop(App::new(client, rt, profiles), should_quit);
    restore_terminal();
    result.map_err(io_err)?;
    Ok(0)
}

fn io_err(e: io::Error) -> SugarError {
    SugarError::command_error(format!("Terminal error: {}", e))
}

fn event_loop(mut app: App, should_quit: Arc<AtomicBool>) -> io::Result<()> {
    let mut needs_render = true;

    loop {
        if should_quit.load(Ordering::Relaxed) {
            break;
        }

        if app.process_tick() {
            needs_render = true;
        }
        if app.process_follow() {
            needs_render = true;
        }

        if needs_render {
            app.render()?;
            needs_render = false;
        }

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key_event) = event::read()? {
                match handle_key(&mut app, key_event) {
                    Some(InputResult::Quit) => break,
                    Some(InputResult::Consumed) => needs_render = true,
                    None => {}
                }
            }
        }
    }

    Ok(())
}
