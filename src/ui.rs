//! Terminal UI rendering with ratatui

use crate::game::{GameState, Snapshot};
use crate::settings::Settings;
use crate::stage::{STAGE_HEIGHT, STAGE_WIDTH};
use crate::tetromino::PieceKind;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};
use std::collections::HashSet;

const EMPTY: &str = "  ";

/// Total width: hold(12) + stage(2 per cell + borders) + next/stats(16)
const GAME_WIDTH: u16 = 12 + (STAGE_WIDTH as u16 * 2 + 2) + 16;
/// Stage rows plus borders
const GAME_HEIGHT: u16 = STAGE_HEIGHT as u16 + 2;

/// Render one frame from the engine snapshot
pub fn render_game(frame: &mut Frame, snapshot: &Snapshot, settings: &Settings) {
    let area = frame.area();
    let game_area = center_rect(area, GAME_WIDTH, GAME_HEIGHT);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(12),
            Constraint::Length(STAGE_WIDTH as u16 * 2 + 2),
            Constraint::Length(16),
        ])
        .split(game_area);

    render_hold(frame, columns[0], snapshot, settings);
    render_stage(frame, columns[1], snapshot, settings);
    render_side(frame, columns[2], snapshot, settings);
    render_help(frame, area, settings);

    match snapshot.state {
        GameState::Idle => render_banner(
            frame,
            area,
            vec![
                Line::styled(
                    "B L O C K F A L L",
                    Style::default().fg(Color::Cyan).bold(),
                ),
                Line::raw(""),
                Line::raw("Press Enter to start"),
                Line::styled(
                    "Leaderboard: coming soon",
                    Style::default().fg(Color::DarkGray),
                ),
            ],
        ),
        GameState::GameOver => render_banner(
            frame,
            area,
            vec![
                Line::styled("GAME OVER", Style::default().fg(Color::Red).bold()),
                Line::raw(""),
                Line::raw(format!("Score: {}", snapshot.score)),
                Line::raw("Press Enter to restart"),
            ],
        ),
        GameState::Running => {}
    }
}

fn render_stage(frame: &mut Frame, area: Rect, snapshot: &Snapshot, settings: &Settings) {
    let (filled, ghost_chars) = settings.visual.block_chars();
    let ghost: HashSet<(i32, i32)> = if settings.visual.show_ghost {
        snapshot.ghost_cells.iter().copied().collect()
    } else {
        HashSet::new()
    };

    let mut lines = Vec::with_capacity(STAGE_HEIGHT);
    for (y, row) in snapshot.cells.iter().enumerate() {
        let mut spans = Vec::with_capacity(STAGE_WIDTH);
        for (x, cell) in row.iter().enumerate() {
            spans.push(match cell.symbol {
                Some(kind) => Span::styled(filled, Style::default().fg(kind.color())),
                None if ghost.contains(&(x as i32, y as i32)) => {
                    Span::styled(ghost_chars, Style::default().fg(Color::DarkGray))
                }
                None => Span::raw(EMPTY),
            });
        }
        lines.push(Line::from(spans));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_hold(frame: &mut Frame, area: Rect, snapshot: &Snapshot, settings: &Settings) {
    let title_style = if snapshot.can_hold {
        Style::default().fg(Color::White)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(" Hold ", title_style));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let (filled, _) = settings.visual.block_chars();
    frame.render_widget(Paragraph::new(preview_lines(snapshot.held, filled)), inner);
}

fn render_side(frame: &mut Frame, area: Rect, snapshot: &Snapshot, settings: &Settings) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(4)])
        .split(area);

    let next_block = Block::default().borders(Borders::ALL).title(" Next ");
    let next_inner = next_block.inner(rows[0]);
    frame.render_widget(next_block, rows[0]);
    let (filled, _) = settings.visual.block_chars();
    frame.render_widget(
        Paragraph::new(preview_lines(Some(snapshot.next), filled)),
        next_inner,
    );

    let stats = vec![
        Line::raw(""),
        Line::from(vec![
            Span::raw(" Score "),
            Span::styled(
                format!("{}", snapshot.score),
                Style::default().fg(Color::Yellow).bold(),
            ),
        ]),
        Line::raw(""),
        Line::from(vec![
            Span::raw(" Speed "),
            Span::raw(format!("{} ms", snapshot.drop_interval.as_millis())),
        ]),
    ];
    frame.render_widget(Paragraph::new(stats), rows[1]);
}

fn render_help(frame: &mut Frame, area: Rect, settings: &Settings) {
    if area.height < 2 {
        return;
    }
    let keys = &settings.keys;
    let help = format!(
        "{}/{} move   {} drop   {}/{} rotate   {} hold   {} start   {} quit",
        keys.move_left.join("/"),
        keys.move_right.join("/"),
        keys.soft_drop.join("/"),
        keys.rotate_cw.join("/"),
        keys.rotate_ccw.join("/"),
        keys.hold.join("/"),
        keys.start.join("/"),
        keys.quit.join("/"),
    );
    let line = Rect::new(area.x, area.y + area.height - 1, area.width, 1);
    frame.render_widget(
        Paragraph::new(Line::styled(help, Style::default().fg(Color::DarkGray)))
            .alignment(Alignment::Center),
        line,
    );
}

/// Paint a kind's catalog shape onto a 4×4 preview grid
fn preview_lines(kind: Option<PieceKind>, filled: &'static str) -> Vec<Line<'static>> {
    let mut grid = [[None::<PieceKind>; 4]; 4];
    if let Some(kind) = kind {
        for (y, row) in kind.shape().iter().enumerate() {
            for (x, cell) in row.iter().enumerate() {
                grid[y][x] = *cell;
            }
        }
    }
    grid.iter()
        .map(|row| {
            Line::from(
                row.iter()
                    .map(|cell| match cell {
                        Some(kind) => Span::styled(filled, Style::default().fg(kind.color())),
                        None => Span::raw(EMPTY),
                    })
                    .collect::<Vec<_>>(),
            )
        })
        .collect()
}

fn render_banner(frame: &mut Frame, area: Rect, lines: Vec<Line>) {
    let banner_area = center_rect(area, 32, lines.len() as u16 + 2);
    frame.render_widget(Clear, banner_area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center).block(block),
        banner_area,
    );
}

/// Center a width×height rect inside an area
fn center_rect(area: Rect, width: u16, height: u16) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}
