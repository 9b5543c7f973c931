use std::io::{self, stdout, Write};

use crossterm::{
    cursor::MoveTo,
    execute, queue,
    style::{Attribute, Color, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::config::Profile;
use crate::docker::{ContainerDetails, ContainerInfo, ServiceInfo};
use crate::tui::state::{DashboardState, LogViewState};

/// Truncate a string to at most `max_len` characters (not bytes), appending
/// "..." if truncated. Safe for multi-byte UTF-8.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_len {
        s.to_string()
    } else {
        let keep = max_len.saturating_sub(3);
        let truncated: String = s.chars().take(keep).collect();
        format!("{}...", truncated)
    }
}

/// Truncate to at most `max_len` bytes at a valid char boundary.
pub fn safe_truncate(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        return s;
    }
    let mut end = max_len;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

fn writeln(out: &mut impl Write, text: &str) -> io::Result<()> {
    write!(out, "{}\r\n", text)
}

fn write_selectable(out: &mut impl Write, text: &str, selected: bool) -> io::Result<()> {
    if selected {
        queue!(io::stdout(), SetBackgroundColor(Color::DarkGrey), SetForegroundColor(Color::White))?;
    }
    write!(out, "{}\r\n", text)?;
    if selected {
        queue!(io::stdout(), ResetColor)?;
    }
    Ok(())
}

pub fn render_containers(
    containers: &[ContainerInfo],
    ui_state: &DashboardState,
) -> io::Result<()> {
    let mut out = stdout();
    execute!(out, Clear(ClearType::All), MoveTo(0, 0))?;

    let size = terminal::size()?;

    queue!(io::stdout(), SetAttribute(Attribute::Bold))?;
    writeln(&mut out, "  Sugar Dashboard")?;
    queue!(io::stdout(), SetAttribute(Attribute::Reset))?;
    writeln(&mut out, "")?;

    if containers.is_empty() {
        writeln(&mut out, "  No containers found.")?;
        writeln(&mut out, "")?;
        writeln(&mut out, "  Make sure Docker is running.")?;
    } else {
        queue!(io::stdout(), SetAttribute(Attribute::Bold))?;
        write!(
            out,
            "  {:<14} {:<22} {:<10} {:<20} {:<10} {}",
            "CONTAINER ID", "NAME", "STATE", "STATUS", "UPTIME", "PORTS"
        )?;
        queue!(io::stdout(), SetAttribute(Attribute::Reset))?;
        write!(out, "\r\n")?;

        for (idx, c) in containers.iter().enumerate() {
            let line = format!(
                "  {:<14} {:<22} {:<10} {:<20} {:<10} {}",
                c.id,
                truncate_str(&c.name, 20),
                truncate_str(&c.state, 10),
                truncate_str(&c.status, 18),
                c.uptime,
                truncate_str(&c.ports, 30),
            );
            write_selectable(&mut out, &line, idx == ui_state.selected_index)?;
        }
    }

    if let Some(msg) = &ui_state.status_message {
        writeln(&mut out, "")?;
        queue!(io::stdout(), SetForegroundColor(Color::Yellow))?;
        writeln(&mut out, &format!("  {}", msg))?;
        queue!(io::stdout(), ResetColor)?;
    }

    let help = "q/Esc: Quit | ↑/↓ | →/Enter: Logs | D: Details | W: Services | P: Profiles | S: Start | T: Stop | R: Restart";
    let help_y = size.1.saturating_sub(1);
    queue!(
        out,
        MoveTo(1, help_y),
        SetForegroundColor(Color::DarkGrey),
        crossterm::style::Print(format!("{:<width$}", help, width = size.0 as usize)),
        ResetColor
    )?;

    out.flush()?;
    Ok(())
}

pub fn render_services(services: &[ServiceInfo], ui_state: &DashboardState) -> io::Result<()> {
    let mut out = stdout();
    execute!(out, Clear(ClearType::All), MoveTo(0, 0))?;

    let size = terminal::size()?;

    queue!(io::stdout(), SetAttribute(Attribute::Bold))?;
    writeln(&mut out, &format!("  Swarm Services ({})", services.len()))?;
    queue!(io::stdout(), SetAttribute(Attribute::Reset))?;
    writeln(&mut out, "")?;

    if services.is_empty() {
        writeln(&mut out, "  No services found.")?;
        writeln(&mut out, "")?;
        writeln(&mut out, "  Is this node part of a swarm?")?;
    } else {
        queue!(io::stdout(), SetAttribute(Attribute::Bold))?;
        write!(
            out,
            "  {:<14} {:<24} {:<12} {:<10} {}",
            "ID", "NAME", "MODE", "REPLICAS", "IMAGE"
        )?;
        queue!(io::stdout(), SetAttribute(Attribute::Reset))?;
        write!(out, "\r\n")?;

        for (idx, s) in services.iter().enumerate() {
            let line = format!(
                "  {:<14} {:<24} {:<12} {:<10} {}",
                s.id,
                truncate_str(&s.name, 22),
                s.mode,
                s.replicas,
                truncate_str(&s.image, 40),
            );
            write_selectable(&mut out, &line, idx == ui_state.selected_index)?;
        }
    }

    if let Some(msg) = &ui_state.status_message {
        writeln(&mut out, "")?;
        queue!(io::stdout(), SetForegroundColor(Color::Yellow))?;
        writeln(&mut out, &format!("  {}", msg))?;
        queue!(io::stdout(), ResetColor)?;
    }

    let help = "q/Esc/←: Back | ↑/↓: Navigate | r: Refresh";
    let help_y = size.1.saturating_sub(1);
    queue!(
        out,
        MoveTo(1, help_y),
        SetForegroundColor(Color::DarkGrey),
        crossterm::style::Print(format!("{:<width$}", help, width = size.0 as usize)),
        ResetColor
    )?;

    out.flush()?;
    Ok(())
}

pub fn render_profiles(profiles: &[(String, Profile)], ui_state: &DashboardState) -> io::Result<()> {
    let mut out = stdout();
    execute!(out, Clear(ClearType::All), MoveTo(0, 0))?;

    let size = terminal::size()?;

    queue!(io::stdout(), SetAttribute(Attribute::Bold))?;
    writeln(&mut out, &format!("  Profiles ({})", profiles.len()))?;
    queue!(io::stdout(), SetAttribute(Attribute::Reset))?;
    writeln(&mut out, "")?;

    if profiles.is_empty() {
        writeln(&mut out, "  No profiles configured.")?;
        writeln(&mut out, "")?;
        writeln(&mut out, "  Add profiles to .sugar.yaml to see them here.")?;
    } else {
        queue!(io::stdout(), SetAttribute(Attribute::Bold))?;
        write!(
            out,
            "  {:<20} {:<20} {:<14} {}",
            "PROFILE", "PROJECT", "ENV FILE", "COMPOSE FILES"
        )?;
        queue!(io::stdout(), SetAttribute(Attribute::Reset))?;
        write!(out, "\r\n")?;

        for (idx, (name, profile)) in profiles.iter().enumerate() {
            let line = format!(
                "  {:<20} {:<20} {:<14} {}",
                truncate_str(name, 18),
                truncate_str(profile.project_name.as_deref().unwrap_or("-"), 18),
                profile.env_file.as_deref().unwrap_or("-"),
                truncate_str(&profile.config_path.files().join(", "), 50),
            );
            write_selectable(&mut out, &line, idx == ui_state.selected_index)?;
        }
    }

    let help = "q/Esc/←: Back | ↑/↓: Navigate";
    let help_y = size.1.saturating_sub(1);
    queue!(
        out,
        MoveTo(1, help_y),
        SetForegroundColor(Color::DarkGrey),
        crossterm::style::Print(format!("{:<width$}", help, width = size.0 as usize)),
        ResetColor
    )?;

    out.flush()?;
    Ok(())
}

pub fn render_details(details: &ContainerDetails) -> io::Result<()> {
    let mut out = stdout();
    execute!(out, Clear(ClearType::All), MoveTo(0, 0))?;

    let size = terminal::size()?;
    let width = size.0 as usize;

    queue!(io::stdout(), SetAttribute(Attribute::Bold))?;
    writeln(
        &mut out,
        &format!("  Details: {} ({})", details.name, details.id),
    )?;
    queue!(io::stdout(), SetAttribute(Attribute::Reset))?;
    writeln(&mut out, "")?;

    let section = |out: &mut std::io::Stdout, title: &str| -> io::Result<()> {
        queue!(io::stdout(), SetAttribute(Attribute::Bold))?;
        write!(out, "  {}\r\n", title)?;
        queue!(io::stdout(), SetAttribute(Attribute::Reset))?;
        Ok(())
    };

    section(&mut out, "CONFIGURATION")?;
    for (label, value) in [
        ("Image", details.image.as_str()),
        ("Created", details.created.as_str()),
        ("Status", details.status.as_str()),
        ("Ports", if details.ports.is_empty() { "-" } else { details.ports.as_str() }),
        ("Uptime", details.uptime.as_str()),
    ] {
        writeln(&mut out, &format!("    {:<12} {}", label, value))?;
    }
    writeln(
        &mut out,
        &format!("    {:<12} {}", "Restarts", details.restart_count),
    )?;
    writeln(&mut out, "")?;

    section(&mut out, "ENVIRONMENT")?;
    if details.env.is_empty() {
        writeln(&mut out, "    -")?;
    }
    for var in &details.env {
        writeln(&mut out, &format!("    {}", safe_truncate(var, width.saturating_sub(4))))?;
    }
    writeln(&mut out, "")?;

    section(&mut out, "VOLUMES")?;
    if details.mounts.is_empty() {
        writeln(&mut out, "    -")?;
    }
    for (source, destination, mode) in &details.mounts {
        writeln(
            &mut out,
            &format!("    {} -> {} ({})", source, destination, mode),
        )?;
    }
    writeln(&mut out, "")?;

    section(&mut out, "NETWORKS")?;
    if details.networks.is_empty() {
        writeln(&mut out, "    -")?;
    }
    for (network, ip, gateway) in &details.networks {
        writeln(
            &mut out,
            &format!("    {:<20} ip {:<16} gw {}", network, ip, gateway),
        )?;
    }

    let help = "q/Esc/←: Back | l: Logs | r: Refresh";
    let help_y = size.1.saturating_sub(1);
    queue!(
        out,
        MoveTo(1, help_y),
        SetForegroundColor(Color::DarkGrey),
        crossterm::style::Print(format!("{:<width$}", help, width = width)),
        ResetColor
    )?;

    out.flush()?;
    Ok(())
}

pub fn render_logs(log_state: &LogViewState) -> io::Result<()> {
    let mut out = stdout();
    execute!(out, Clear(ClearType::All), MoveTo(0, 0))?;

    let size = terminal::size()?;
    let width = size.0 as usize;
    let height = size.1 as usize;

    let follow_indicator = if log_state.follow {
        "Auto-refresh: On"
    } else {
        "Auto-refresh: Off"
    };
    let header = format!(
        "  Logs: {} ({}) - {}",
        log_state.container_name, log_state.container_id, follow_indicator
    );
    queue!(io::stdout(), SetAttribute(Attribute::Bold))?;
    if !log_state.follow {
        queue!(io::stdout(), SetForegroundColor(Color::Yellow))?;
    }
    write!(out, "{}\r\n", header)?;
    queue!(io::stdout(), SetAttribute(Attribute::Reset), ResetColor)?;

    let sep: String = "─".repeat(width);
    queue!(io::stdout(), SetForegroundColor(Color::DarkGrey))?;
    write!(out, "{}\r\n", sep)?;
    queue!(io::stdout(), ResetColor)?;

    let log_area_height = height.saturating_sub(3);
    let total_lines = log_state.lines.len();
    let bottom_start = total_lines.saturating_sub(log_area_height);
    let start_line = bottom_start.saturating_sub(log_state.scroll_offset);
    let end_line = (start_line + log_area_height).min(total_lines);

    let mut lines_printed = 0;
    for line in &log_state.lines[start_line..end_line] {
        write!(out, "{}\r\n", safe_truncate(line, width))?;
        lines_printed += 1;
    }
    for _ in lines_printed..log_area_height {
        write!(out, "\r\n")?;
    }

    let help = "q/Esc/←: Back | ↑/↓: Scroll | f: Toggle follow | r: Refresh";
    let help_y = (height.saturating_sub(1)) as u16;
    queue!(
        out,
        MoveTo(1, help_y),
        SetForegroundColor(Color::DarkGrey),
        crossterm::style::Print(format!("{:<width$}", help, width = width)),
        ResetColor
    )?;

    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_str_short_string() {
        assert_eq!(truncate_str("hello", 10), "hello");
    }

    #[test]
    fn truncate_str_long_string() {
        assert_eq!(truncate_str("hello world", 8), "hello...");
    }

    #[test]
    fn safe_truncate_utf8_boundary() {
        let s = "café";
        assert_eq!(safe_truncate(s, 3), "caf");
        assert_eq!(safe_truncate(s, 5), "café");
    }
}
