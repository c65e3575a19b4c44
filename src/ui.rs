use crate::app::App;
use quake_map::engine::{ControlPosition, RenderedMap};
use quake_map::scale::Rgb;
use quake_map::session::SessionState;
use quake_map::tooltip::Tooltip;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
    Frame,
};

/// Tooltip panel colors
const TOOLTIP_FG: Color = Color::Rgb(255, 255, 255);
const TOOLTIP_BG: Color = Color::Rgb(20, 20, 20);

fn color(rgb: Rgb) -> Color {
    let [r, g, b] = rgb.0;
    Color::Rgb(r, g, b)
}

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Split into map area and status bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Map
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    render_map(frame, app, chunks[0]);
    render_status_bar(frame, app, chunks[1]);
}

fn render_map(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " Earthquakes · Los Angeles ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let map_widget = MapWidget {
        map: app.render_map(),
        tooltip: app.tooltip.visible().map(|(tip, pos)| (tip.clone(), pos)),
        cursor_pos: app
            .cursor_cell()
            .filter(|&(cx, cy)| cx < inner.width && cy < inner.height),
    };
    frame.render_widget(map_widget, inner);
}

/// Braille map with controls and the hover tooltip drawn over it
struct MapWidget {
    map: Option<RenderedMap>,
    tooltip: Option<(Tooltip, (u16, u16))>,
    cursor_pos: Option<(u16, u16)>,
}

impl MapWidget {
    fn render_canvas(map: &RenderedMap, area: Rect, buf: &mut Buffer) {
        for row_idx in 0..map.canvas.height().min(area.height as usize) {
            let y = area.y + row_idx as u16;
            for (col_idx, (ch, cell)) in map.canvas.row(row_idx).enumerate() {
                if col_idx >= area.width as usize {
                    break;
                }
                let x = area.x + col_idx as u16;
                buf[(x, y)]
                    .set_char(ch)
                    .set_fg(color(cell.fg))
                    .set_bg(color(cell.bg));
            }
        }
    }

    fn render_text(text: &str, x: u16, y: u16, style: Style, area: Rect, buf: &mut Buffer) {
        if y >= area.y + area.height {
            return;
        }
        for (i, ch) in text.chars().enumerate() {
            let px = x + i as u16;
            if px >= area.x + area.width {
                break;
            }
            buf[(px, y)].set_char(ch).set_style(style);
        }
    }

    fn render_controls(map: &RenderedMap, area: Rect, buf: &mut Buffer) {
        let style = Style::default().fg(Color::White).bg(Color::Rgb(0, 0, 0));
        for (position, label) in &map.controls {
            let width = label.chars().count() as u16;
            let x = match position {
                ControlPosition::TopLeft | ControlPosition::BottomLeft => area.x,
                ControlPosition::TopRight | ControlPosition::BottomRight => {
                    (area.x + area.width).saturating_sub(width)
                }
            };
            let y = match position {
                ControlPosition::TopLeft | ControlPosition::TopRight => area.y,
                ControlPosition::BottomLeft | ControlPosition::BottomRight => {
                    (area.y + area.height).saturating_sub(1)
                }
            };
            Self::render_text(label, x, y, style, area, buf);
        }
    }

    /// Tooltip panel anchored at the pointer, flipped to stay on screen
    fn render_tooltip(tooltip: &Tooltip, (cx, cy): (u16, u16), area: Rect, buf: &mut Buffer) {
        let width = tooltip.width() as u16 + 2;
        let height = tooltip.lines.len() as u16;
        let mut x = area.x + cx + 1;
        if x + width > area.x + area.width {
            x = (area.x + cx).saturating_sub(width).max(area.x);
        }
        let mut y = area.y + cy + 1;
        if y + height > area.y + area.height {
            y = (area.y + cy).saturating_sub(height).max(area.y);
        }

        let style = Style::default().fg(TOOLTIP_FG).bg(TOOLTIP_BG);
        for (i, line) in tooltip.lines.iter().enumerate() {
            let padded = format!(" {:<w$} ", line, w = width as usize - 2);
            Self::render_text(&padded, x, y + i as u16, style, area, buf);
        }
    }
}

impl Widget for MapWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let Some(map) = &self.map else {
            return;
        };
        Self::render_canvas(map, area, buf);
        Self::render_controls(map, area, buf);

        if let Some((cx, cy)) = self.cursor_pos {
            let x = area.x + cx;
            let y = area.y + cy;
            if x < area.x + area.width && y < area.y + area.height {
                buf[(x, y)].set_char('╋').set_fg(Color::Red);
            }
        }

        if let Some((tooltip, position)) = &self.tooltip {
            Self::render_tooltip(tooltip, *position, area, buf);
        }
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let (state, state_color) = match app.state() {
        SessionState::Ready => ("ready", Color::Green),
        SessionState::Loading | SessionState::Updating => ("loading", Color::Yellow),
        SessionState::Uninitialized | SessionState::Removed => ("closed", Color::DarkGray),
    };

    let mut spans = vec![
        Span::styled(" ", Style::default()),
        Span::styled(state, Style::default().fg(state_color)),
        Span::styled(" | ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.camera_summary(), Style::default().fg(Color::Yellow)),
        Span::styled(" | ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.center_coords(), Style::default().fg(Color::Cyan)),
    ];
    if let Some(message) = &app.message {
        spans.push(Span::styled(" | ", Style::default().fg(Color::DarkGray)));
        spans.push(Span::styled(message.clone(), Style::default().fg(Color::Magenta)));
    }
    spans.push(Span::styled(
        " | hjkl:pan +/-:zoom [/]:rotate PgUp/PgDn:tilt g:locate r:reload q:quit",
        Style::default().fg(Color::DarkGray),
    ));

    let paragraph = Paragraph::new(Line::from(spans));
    frame.render_widget(paragraph, area);
}
