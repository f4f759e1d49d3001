//! stratum-telemetry — TUI diagnostics tool for stratum worlds.
//!
//! Listens on UDP port 9100 for the JSON snapshots a world sends through
//! `stratum::diag::send_diagnostics` and shows them in a terminal dashboard
//! built with ratatui.
//!
//! Build the host with the `diagnostics` feature (on by default), then run
//! `cargo run -p stratum-telemetry`.

use std::collections::VecDeque;
use std::io;
use std::net::UdpSocket;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Sparkline};
use serde::Deserialize;

const LISTEN_ADDR: &str = "127.0.0.1:9100";

// ── Wire types (must match stratum's JSON format) ────────────────────────

#[derive(Deserialize, Clone, Default)]
struct DiagSnapshot {
    world: WorldInfo,
    #[serde(default)]
    fragmentation_pct: f32,
    #[serde(default)]
    logs: Vec<LogEntryInfo>,
}

#[derive(Deserialize, Clone, Default)]
struct WorldInfo {
    frame_count: u64,
    fps: f32,
    delta_ms: f32,
    elapsed_secs: f32,
    pool: PoolInfo,
    #[serde(default)]
    systems: Vec<SystemInfo>,
    layers: LayerInfo,
    #[serde(default)]
    pending_deletions: usize,
}

#[derive(Deserialize, Clone, Default)]
struct PoolInfo {
    capacity: u32,
    total_slots: u32,
    free_count: usize,
    alive_count: usize,
    created_this_frame: u32,
    destroyed_this_frame: u32,
}

#[derive(Deserialize, Clone, Default)]
struct SystemInfo {
    name: String,
    #[serde(default)]
    required: Vec<String>,
    members: usize,
    always_update: bool,
    last_duration_us: f64,
    faults_last_frame: u32,
    faults_total: u64,
}

/// Layers travel as their index.
#[derive(Deserialize, Clone, Default)]
struct LayerInfo {
    cursor: u8,
    running: u8,
    overlay: Option<u8>,
    previous: u8,
    bucket_sizes: Vec<usize>,
    drawn: usize,
    eligible: usize,
}

#[derive(Deserialize, Clone, Default)]
struct LogEntryInfo {
    level: String,
    #[serde(default)]
    target: String,
    message: String,
    timestamp_secs: f32,
}

// ── Tabs ─────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Tab {
    Overview,
    Systems,
    Logs,
}

impl Tab {
    const ALL: [Tab; 3] = [Tab::Overview, Tab::Systems, Tab::Logs];

    fn next(self) -> Self {
        match self {
            Tab::Overview => Tab::Systems,
            Tab::Systems => Tab::Logs,
            Tab::Logs => Tab::Overview,
        }
    }

    fn prev(self) -> Self {
        match self {
            Tab::Overview => Tab::Logs,
            Tab::Systems => Tab::Overview,
            Tab::Logs => Tab::Systems,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Tab::Overview => "Overview",
            Tab::Systems => "Systems",
            Tab::Logs => "Logs",
        }
    }
}

// ── Log level filter ────────────────────────────────────────────────────

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum LogFilter {
    All,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogFilter {
    fn next(self) -> Self {
        match self {
            LogFilter::All => LogFilter::Debug,
            LogFilter::Debug => LogFilter::Info,
            LogFilter::Info => LogFilter::Warn,
            LogFilter::Warn => LogFilter::Error,
            LogFilter::Error => LogFilter::All,
        }
    }

    fn label(self) -> &'static str {
        match self {
            LogFilter::All => "ALL",
            LogFilter::Debug => "DEBUG+",
            LogFilter::Info => "INFO+",
            LogFilter::Warn => "WARN+",
            LogFilter::Error => "ERROR",
        }
    }

    fn passes(self, level: &str) -> bool {
        match self {
            LogFilter::All => true,
            LogFilter::Debug => level != "TRACE",
            LogFilter::Info => matches!(level, "INFO" | "WARN" | "ERROR"),
            LogFilter::Warn => matches!(level, "WARN" | "ERROR"),
            LogFilter::Error => level == "ERROR",
        }
    }
}

// ── App state ────────────────────────────────────────────────────────────

const HISTORY_CAP: usize = 1200;
const LOG_CAP: usize = 2000;

struct App {
    latest: DiagSnapshot,
    fps_history: VecDeque<u64>,
    /// Frame deltas in microseconds, so the sparkline keeps sub-ms detail.
    delta_history: VecDeque<u64>,
    active_tab: Tab,
    paused: bool,
    connected: bool,

    log_entries: Vec<LogEntryInfo>,
    log_filter: LogFilter,
    log_auto_scroll: bool,
    log_scroll_offset: usize,
}

impl App {
    fn new() -> Self {
        Self {
            latest: DiagSnapshot::default(),
            fps_history: VecDeque::with_capacity(HISTORY_CAP),
            delta_history: VecDeque::with_capacity(HISTORY_CAP),
            active_tab: Tab::Overview,
            paused: false,
            connected: false,
            log_entries: Vec::new(),
            log_filter: LogFilter::Info,
            log_auto_scroll: true,
            log_scroll_offset: 0,
        }
    }

    fn push_snapshot(&mut self, snap: DiagSnapshot) {
        if self.paused {
            return;
        }

        push_capped(
            &mut self.fps_history,
            snap.world.fps.round().max(0.0) as u64,
        );
        push_capped(
            &mut self.delta_history,
            (snap.world.delta_ms * 1000.0).round().max(0.0) as u64,
        );

        self.log_entries.extend(snap.logs.iter().cloned());
        if self.log_entries.len() > LOG_CAP {
            let excess = self.log_entries.len() - LOG_CAP;
            self.log_entries.drain(..excess);
        }

        self.latest = snap;
        self.connected = true;
    }

    fn filtered_logs(&self) -> Vec<&LogEntryInfo> {
        self.log_entries
            .iter()
            .filter(|entry| self.log_filter.passes(&entry.level))
            .collect()
    }

    /// Counts per level: (trace, debug, info, warn, error).
    fn log_counts(&self) -> (usize, usize, usize, usize, usize) {
        let mut counts = (0, 0, 0, 0, 0);
        for entry in &self.log_entries {
            match entry.level.as_str() {
                "TRACE" => counts.0 += 1,
                "DEBUG" => counts.1 += 1,
                "INFO" => counts.2 += 1,
                "WARN" => counts.3 += 1,
                "ERROR" => counts.4 += 1,
                _ => {}
            }
        }
        counts
    }
}

fn push_capped(history: &mut VecDeque<u64>, value: u64) {
    if history.len() >= HISTORY_CAP {
        history.pop_front();
    }
    history.push_back(value);
}

// ── Main ─────────────────────────────────────────────────────────────────

fn main() -> io::Result<()> {
    let recv_socket = UdpSocket::bind(LISTEN_ADDR).map_err(|err| {
        io::Error::new(
            err.kind(),
            format!("failed to bind {LISTEN_ADDR} (is another stratum-telemetry running?): {err}"),
        )
    })?;
    recv_socket.set_nonblocking(true)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new();
    let mut buf = [0u8; 65536];

    loop {
        // Drain all pending datagrams.
        while let Ok(n) = recv_socket.recv(&mut buf) {
            if let Ok(snap) = serde_json::from_slice::<DiagSnapshot>(&buf[..n]) {
                app.push_snapshot(snap);
            }
        }

        terminal.draw(|f| ui(f, &app))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if handle_key(&mut app, key) {
                    break;
                }
            }
        }
    }

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

// ── Key handling ─────────────────────────────────────────────────────────

/// Returns `true` if the app should quit.
fn handle_key(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
        KeyCode::Char('p') => app.paused = !app.paused,

        KeyCode::Char('1') => app.active_tab = Tab::Overview,
        KeyCode::Char('2') => app.active_tab = Tab::Systems,
        KeyCode::Char('3') => app.active_tab = Tab::Logs,

        KeyCode::Tab => app.active_tab = app.active_tab.next(),
        KeyCode::BackTab => app.active_tab = app.active_tab.prev(),

        // Logs tab keys.
        KeyCode::Char('l') if app.active_tab == Tab::Logs => {
            app.log_filter = app.log_filter.next();
        }
        KeyCode::Char('g') if app.active_tab == Tab::Logs => {
            app.log_auto_scroll = !app.log_auto_scroll;
        }
        KeyCode::Up if app.active_tab == Tab::Logs => {
            app.log_auto_scroll = false;
            app.log_scroll_offset = app.log_scroll_offset.saturating_sub(1);
        }
        KeyCode::Down if app.active_tab == Tab::Logs => {
            app.log_auto_scroll = false;
            app.log_scroll_offset += 1;
        }

        _ => {}
    }
    false
}

// ── UI rendering ─────────────────────────────────────────────────────────

fn ui(f: &mut ratatui::Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // header
            Constraint::Length(1), // tab bar
            Constraint::Min(6),    // tab content
            Constraint::Length(1), // help bar
        ])
        .split(f.area());

    draw_header(f, app, chunks[0]);
    draw_tab_bar(f, app, chunks[1]);

    match app.active_tab {
        Tab::Overview => draw_overview_tab(f, app, chunks[2]),
        Tab::Systems => draw_systems_tab(f, app, chunks[2]),
        Tab::Logs => draw_logs_tab(f, app, chunks[2]),
    }

    draw_help_bar(f, app, chunks[3]);
}

fn draw_header(f: &mut ratatui::Frame, app: &App, area: Rect) {
    let w = &app.latest.world;
    let (status, status_color) = if app.paused {
        (" PAUSED ", Color::Yellow)
    } else if app.connected {
        (" LIVE ", Color::Green)
    } else {
        (" WAITING ", Color::DarkGray)
    };

    let text = Line::from(vec![
        Span::styled(
            format!(" {status} "),
            Style::default().bg(status_color).fg(Color::Black),
        ),
        Span::raw("  "),
        Span::styled("FPS: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("{:.1}", w.fps),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  |  "),
        Span::styled("Frame: ", Style::default().fg(Color::DarkGray)),
        Span::styled(format!("{}", w.frame_count), Style::default().fg(Color::White)),
        Span::raw("  |  "),
        Span::styled("\u{0394}: ", Style::default().fg(Color::DarkGray)),
        Span::styled(format!("{:.1}ms", w.delta_ms), Style::default().fg(Color::White)),
        Span::raw("  |  "),
        Span::styled("Running: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            layer_name(w.layers.running),
            Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  |  "),
        Span::styled("Up: ", Style::default().fg(Color::DarkGray)),
        Span::styled(format_uptime(w.elapsed_secs), Style::default().fg(Color::White)),
    ]);

    let block = Block::default()
        .title(" stratum-telemetry ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    f.render_widget(Paragraph::new(text).block(block), area);
}

fn draw_tab_bar(f: &mut ratatui::Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::raw(" ")];
    for (i, tab) in Tab::ALL.iter().enumerate() {
        let num = format!(" {} ", i + 1);
        let label = format!("{} ", tab.label());
        if *tab == app.active_tab {
            spans.push(Span::styled(
                num,
                Style::default()
                    .bg(Color::Cyan)
                    .fg(Color::Black)
                    .add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::styled(
                label,
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ));
        } else {
            spans.push(Span::styled(num, Style::default().fg(Color::DarkGray)));
            spans.push(Span::styled(label, Style::default().fg(Color::DarkGray)));
        }
        spans.push(Span::raw("  "));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

// ── Overview Tab ─────────────────────────────────────────────────────────

fn draw_overview_tab(f: &mut ratatui::Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(8), // sparklines
            Constraint::Length(1), // entity pool line
            Constraint::Min(4),    // layers
        ])
        .split(area);

    draw_sparklines(f, app, chunks[0]);
    draw_pool_line(f, app, chunks[1]);
    draw_layers_panel(f, app, chunks[2]);
}

fn draw_sparklines(f: &mut ratatui::Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let fps_data: Vec<u64> = app.fps_history.iter().copied().collect();
    let (fps_min, fps_avg, fps_max) = stats(&fps_data);
    draw_sparkline(
        f,
        chunks[0],
        " FPS History ",
        &fps_data,
        Color::Green,
        format!("min: {fps_min:.0}  avg: {fps_avg:.0}  max: {fps_max:.0}"),
    );

    let delta_data: Vec<u64> = app.delta_history.iter().copied().collect();
    let (d_min, d_avg, d_max) = stats(&delta_data);
    draw_sparkline(
        f,
        chunks[1],
        " Delta Time ",
        &delta_data,
        Color::Yellow,
        format!(
            "min: {:.1}ms  avg: {:.1}ms  max: {:.1}ms",
            d_min / 1000.0,
            d_avg / 1000.0,
            d_max / 1000.0
        ),
    );
}

fn draw_sparkline(
    f: &mut ratatui::Frame,
    area: Rect,
    title: &str,
    data: &[u64],
    color: Color,
    summary: String,
) {
    let block = Block::default()
        .title(title.to_string())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    f.render_widget(block, area);
    if inner.height < 2 {
        return;
    }

    let spark_area = Rect {
        height: inner.height - 1,
        ..inner
    };
    let stats_area = Rect {
        y: inner.y + inner.height - 1,
        height: 1,
        ..inner
    };
    f.render_widget(
        Sparkline::default().data(data).style(Style::default().fg(color)),
        spark_area,
    );
    f.render_widget(
        Paragraph::new(Span::styled(summary, Style::default().fg(Color::DarkGray))),
        stats_area,
    );
}

fn draw_pool_line(f: &mut ratatui::Frame, app: &App, area: Rect) {
    let pool = &app.latest.world.pool;
    let frag = app.latest.fragmentation_pct;
    let frag_color = if frag < 25.0 {
        Color::Green
    } else if frag < 50.0 {
        Color::Yellow
    } else {
        Color::Red
    };

    let bar = ratio_bar(pool.alive_count, pool.total_slots as usize, 16);

    let mut spans = vec![
        Span::styled("  Entities: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("{}/{}", pool.alive_count, pool.capacity),
            Style::default().fg(Color::White),
        ),
        Span::styled("  Slots: ", Style::default().fg(Color::DarkGray)),
        Span::styled(format!("{}", pool.total_slots), Style::default().fg(Color::White)),
        Span::styled("  Free: ", Style::default().fg(Color::DarkGray)),
        Span::styled(format!("{}", pool.free_count), Style::default().fg(Color::White)),
        Span::styled("  Frag: ", Style::default().fg(Color::DarkGray)),
        Span::styled(format!("{frag:.0}%"), Style::default().fg(frag_color)),
        Span::raw("  "),
        Span::styled(bar, Style::default().fg(frag_color)),
    ];

    if pool.created_this_frame > 0 || pool.destroyed_this_frame > 0 {
        spans.push(Span::raw("  "));
        if pool.created_this_frame > 0 {
            spans.push(Span::styled(
                format!("+{}", pool.created_this_frame),
                Style::default().fg(Color::Green),
            ));
        }
        if pool.destroyed_this_frame > 0 {
            spans.push(Span::styled(
                format!("/-{}", pool.destroyed_this_frame),
                Style::default().fg(Color::Red),
            ));
        }
        spans.push(Span::styled(" this frame", Style::default().fg(Color::DarkGray)));
    }
    if app.latest.world.pending_deletions > 0 {
        spans.push(Span::styled(
            format!("  ({} pending)", app.latest.world.pending_deletions),
            Style::default().fg(Color::Yellow),
        ));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_layers_panel(f: &mut ratatui::Frame, app: &App, area: Rect) {
    let layers = &app.latest.world.layers;
    let block = Block::default()
        .title(format!(
            " Layers  drawn: {}  eligible: {}  previous: {} ",
            layers.drawn,
            layers.eligible,
            layer_name(layers.previous)
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    f.render_widget(block, area);

    if layers.bucket_sizes.is_empty() {
        f.render_widget(
            Paragraph::new(Span::styled(
                "  Waiting for data...",
                Style::default().fg(Color::DarkGray),
            )),
            inner,
        );
        return;
    }

    let max = layers.bucket_sizes.iter().copied().max().unwrap_or(0).max(1);
    let bar_width = inner.width.saturating_sub(40) as usize;

    // Top of the stack first.
    let mut lines = Vec::with_capacity(layers.bucket_sizes.len());
    for (index, &size) in layers.bucket_sizes.iter().enumerate().rev() {
        let layer = index as u8;
        let state = layer_state(layers, layer);
        let color = match state {
            LayerState::Running => Color::Green,
            LayerState::Drawn => Color::Cyan,
            LayerState::Hidden => Color::DarkGray,
        };
        let cursor = if layers.cursor == layer { "\u{25B6}" } else { " " };

        lines.push(Line::from(vec![
            Span::styled(format!("  {cursor} "), Style::default().fg(Color::Yellow)),
            Span::styled(
                format!("{:<9}", layer_name(layer)),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("{:<8}", state.label()), Style::default().fg(color)),
            Span::styled(format!("{size:>6} "), Style::default().fg(Color::White)),
            Span::styled(
                "\u{2588}".repeat(size * bar_width / max),
                Style::default().fg(color),
            ),
        ]));
    }

    f.render_widget(Paragraph::new(lines), inner);
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum LayerState {
    Running,
    Drawn,
    Hidden,
}

impl LayerState {
    fn label(self) -> &'static str {
        match self {
            LayerState::Running => "running",
            LayerState::Drawn => "drawn",
            LayerState::Hidden => "hidden",
        }
    }
}

/// Mirrors the world's drawn-layer rule: Base, the remembered overlay, and
/// Debug while it runs.
fn layer_state(layers: &LayerInfo, layer: u8) -> LayerState {
    const DEBUG: u8 = 4;
    if layer == layers.running {
        LayerState::Running
    } else if layer == 0
        || layers.overlay == Some(layer)
        || (layer == DEBUG && layers.running == DEBUG)
    {
        LayerState::Drawn
    } else {
        LayerState::Hidden
    }
}

// ── Systems Tab ──────────────────────────────────────────────────────────

fn draw_systems_tab(f: &mut ratatui::Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Systems (update order) ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let systems = &app.latest.world.systems;
    if systems.is_empty() {
        f.render_widget(
            Paragraph::new(Span::styled(
                "  No systems registered",
                Style::default().fg(Color::DarkGray),
            )),
            inner,
        );
        return;
    }

    let name_width = systems.iter().map(|s| s.name.len()).max().unwrap_or(10).min(24);
    let max_dur = systems
        .iter()
        .map(|s| s.last_duration_us)
        .fold(1.0_f64, f64::max);
    let bar_max_width = inner.width.saturating_sub(name_width as u16 + 48) as usize;

    let mut lines = Vec::with_capacity(systems.len() + 1);
    lines.push(Line::from(Span::styled(
        format!(
            "  {:name_width$} {:>7} {:>9} {:>8}  requires",
            "name", "members", "time", "faults"
        ),
        Style::default().fg(Color::DarkGray),
    )));

    for system in systems.iter().take(inner.height.saturating_sub(1) as usize) {
        let ms = system.last_duration_us / 1000.0;
        let bar_color = if ms < 2.0 {
            Color::Green
        } else if ms < 5.0 {
            Color::Yellow
        } else {
            Color::Red
        };
        let fault_color = if system.faults_last_frame > 0 {
            Color::Red
        } else {
            Color::DarkGray
        };
        let bar_len = ((system.last_duration_us / max_dur) * bar_max_width as f64).round() as usize;
        let always = if system.always_update { "*" } else { " " };

        lines.push(Line::from(vec![
            Span::styled(
                format!("  {:name_width$}", system.name),
                Style::default().fg(Color::White),
            ),
            Span::styled(format!(" {:>7}", system.members), Style::default().fg(Color::Cyan)),
            Span::styled(format!(" {ms:>7.2}ms"), Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!(" {:>3}/{:<4}", system.faults_last_frame, system.faults_total),
                Style::default().fg(fault_color),
            ),
            Span::styled(
                format!("{always} {}  ", system.required.join(", ")),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled("\u{2588}".repeat(bar_len.max(1)), Style::default().fg(bar_color)),
        ]));
    }

    f.render_widget(Paragraph::new(lines), inner);
}

// ── Logs Tab ─────────────────────────────────────────────────────────────

fn draw_logs_tab(f: &mut ratatui::Frame, app: &App, area: Rect) {
    let (t, d, i, w, e) = app.log_counts();
    let scroll_label = if app.log_auto_scroll { "auto" } else { "manual" };

    let block = Block::default()
        .title(format!(
            " Logs [{}]  T:{t} D:{d} I:{i} W:{w} E:{e}  scroll:{scroll_label} ",
            app.log_filter.label(),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let filtered = app.filtered_logs();
    if filtered.is_empty() {
        f.render_widget(
            Paragraph::new(Span::styled(
                "  No log messages",
                Style::default().fg(Color::DarkGray),
            )),
            inner,
        );
        return;
    }

    let visible = inner.height as usize;
    let offset = scroll_offset(
        filtered.len(),
        visible,
        app.log_auto_scroll,
        app.log_scroll_offset,
    );

    let mut lines: Vec<Line> = Vec::with_capacity(visible);
    for entry in filtered.iter().skip(offset).take(visible) {
        lines.push(Line::from(vec![
            Span::styled(
                format!("  [{:>6.1}s] ", entry.timestamp_secs),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(
                format!("{:<5} ", entry.level),
                Style::default()
                    .fg(level_color(&entry.level))
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("{} ", entry.target), Style::default().fg(Color::DarkGray)),
            Span::styled(entry.message.clone(), Style::default().fg(Color::White)),
        ]));
    }

    f.render_widget(Paragraph::new(lines), inner);
}

fn level_color(level: &str) -> Color {
    match level {
        "TRACE" => Color::DarkGray,
        "DEBUG" => Color::Gray,
        "INFO" => Color::Cyan,
        "WARN" => Color::Yellow,
        "ERROR" => Color::Red,
        _ => Color::White,
    }
}

// ── Help bar ─────────────────────────────────────────────────────────────

fn draw_help_bar(f: &mut ratatui::Frame, app: &App, area: Rect) {
    let key = Style::default().fg(Color::Cyan);
    let mut spans = vec![
        Span::styled(" [1-3]", key),
        Span::raw(" tab  "),
        Span::styled("[Tab]", key),
        Span::raw(" next  "),
    ];

    if app.active_tab == Tab::Logs {
        spans.push(Span::styled("[l]", key));
        spans.push(Span::raw(" filter  "));
        spans.push(Span::styled("[g]", key));
        spans.push(Span::raw(" auto-scroll  "));
        spans.push(Span::styled("[\u{2191}\u{2193}]", key));
        spans.push(Span::raw(" scroll  "));
    }

    spans.push(Span::styled("[p]", key));
    spans.push(Span::raw(" pause  "));
    spans.push(Span::styled("[q]", key));
    spans.push(Span::raw(" quit"));

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

// ── Helpers ──────────────────────────────────────────────────────────────

fn layer_name(layer: u8) -> String {
    match layer {
        0 => "Base".to_string(),
        1..=3 => format!("Overlay{}", layer - 1),
        4 => "Debug".to_string(),
        n => format!("Layer({n})"),
    }
}

fn stats(data: &[u64]) -> (f64, f64, f64) {
    let (Some(&min), Some(&max)) = (data.iter().min(), data.iter().max()) else {
        return (0.0, 0.0, 0.0);
    };
    let avg = data.iter().sum::<u64>() as f64 / data.len() as f64;
    (min as f64, avg, max as f64)
}

/// First visible row of a list of `total` rows in a `visible`-row window.
fn scroll_offset(total: usize, visible: usize, auto: bool, manual: usize) -> usize {
    let last_page = total.saturating_sub(visible);
    if auto { last_page } else { manual.min(last_page) }
}

fn ratio_bar(filled: usize, total: usize, width: usize) -> String {
    let filled = if total > 0 {
        ((filled as f32 / total as f32) * width as f32).round() as usize
    } else {
        0
    };
    let filled = filled.min(width);
    format!(
        "{}{}",
        "\u{2588}".repeat(filled),
        "\u{2591}".repeat(width - filled)
    )
}

fn format_uptime(secs: f32) -> String {
    let total = secs as u64;
    let h = total / 3600;
    let m = (total % 3600) / 60;
    let s = total % 60;
    if h > 0 {
        format!("{h}h{m}m{s}s")
    } else if m > 0 {
        format!("{m}m{s}s")
    } else {
        format!("{secs:.1}s")
    }
}
