use crate::app::App;
use crate::theme::parse_hex;
use casefile_core::{evidence, format_time, Outcome, Phase};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};
use std::io;

/// Width of one slot cell, borders excluded
const CELL_WIDTH: u16 = 20;

pub fn render(stdout: &mut io::Stdout, app: &App) -> io::Result<()> {
    let (term_width, _term_height) = terminal::size()?;

    execute!(stdout, Hide, SetBackgroundColor(app.theme.bg), Clear(ClearType::All))?;

    let board_width = CELL_WIDTH * 3 + 4;
    let x = if term_width > board_width + 4 {
        (term_width - board_width) / 2
    } else {
        1
    };

    render_header(stdout, app, x, 1)?;
    render_board(stdout, app, x, 3)?;
    render_pieces(stdout, app, x, 12)?;
    render_controls(stdout, app, x, 17)?;

    if let Some(ref msg) = app.message {
        execute!(
            stdout,
            MoveTo(x, 20),
            SetForegroundColor(app.theme.key),
            Print(msg)
        )?;
    }

    if let Some(outcome) = app.last_outcome {
        render_result(stdout, app, outcome, x, 22)?;
    }

    execute!(stdout, ResetColor, Show)?;
    Ok(())
}

fn render_header(stdout: &mut io::Stdout, app: &App, x: u16, y: u16) -> io::Result<()> {
    let theme = &app.theme;
    let timer = app.session.timer(app.now_ms());
    let timer_color = if app.session.is_playing() && timer.remaining_ms < 10_000 {
        theme.warning
    } else {
        theme.info
    };

    execute!(
        stdout,
        MoveTo(x, y),
        SetForegroundColor(theme.fg),
        Print(format!("Stage {:<4}", app.session.stage())),
        SetForegroundColor(theme.info),
        Print(format!("Score {:<10}", app.session.score())),
        SetForegroundColor(timer_color),
        Print(format!("Time {}", app.timer_string())),
    )
}

fn render_board(stdout: &mut io::Stdout, app: &App, x: u16, y: u16) -> io::Result<()> {
    let theme = &app.theme;
    let round = app.session.round();
    let dashes = "-".repeat(CELL_WIDTH as usize);
    let border = format!("+{0}+{0}+{0}+", dashes);

    for row in 0..3u16 {
        let line_y = y + row * 3;
        execute!(
            stdout,
            MoveTo(x, line_y),
            SetForegroundColor(theme.border),
            Print(&border)
        )?;

        for line in 0..2u16 {
            execute!(stdout, MoveTo(x, line_y + 1 + line), Print("|"))?;
            for col in 0..3u16 {
                let index = (row * 3 + col) as usize;
                let slot = &round.slots()[index];
                let (text, color) = match (line, slot.occupant.and_then(|id| round.piece(id))) {
                    (0, _) => (format!("{} {}", index + 1, evidence::label(slot.required_value)), theme.hint),
                    (_, Some(piece)) => (
                        format!("[{}]", evidence::label(piece.value)),
                        parse_hex(piece.color).unwrap_or(theme.fg),
                    ),
                    (_, None) => (String::new(), theme.fg),
                };
                execute!(
                    stdout,
                    SetForegroundColor(color),
                    Print(fit(&text, CELL_WIDTH as usize)),
                    SetForegroundColor(theme.border),
                    Print("|")
                )?;
            }
        }
    }

    execute!(
        stdout,
        MoveTo(x, y + 9),
        SetForegroundColor(theme.border),
        Print(&border)
    )
}

fn render_pieces(stdout: &mut io::Stdout, app: &App, x: u16, y: u16) -> io::Result<()> {
    let theme = &app.theme;
    execute!(
        stdout,
        MoveTo(x, y),
        SetForegroundColor(theme.info),
        Print("Evidence:")
    )?;

    for (i, piece) in app.session.round().pieces().iter().enumerate() {
        let row = y + 1 + (i / 3) as u16;
        let col = x + (i % 3) as u16 * (CELL_WIDTH + 1);
        let key = (b'a' + piece.id as u8) as char;
        let fg = if piece.used {
            theme.used
        } else {
            parse_hex(piece.color).unwrap_or(theme.fg)
        };
        let bg = if app.selected == Some(piece.id) {
            theme.selected_bg
        } else {
            theme.bg
        };
        execute!(
            stdout,
            MoveTo(col, row),
            SetBackgroundColor(bg),
            SetForegroundColor(theme.key),
            Print(format!("{} ", key)),
            SetForegroundColor(fg),
            Print(fit(evidence::label(piece.value), CELL_WIDTH as usize - 2)),
            SetBackgroundColor(theme.bg),
        )?;
    }
    Ok(())
}

fn render_controls(stdout: &mut io::Stdout, app: &App, x: u16, y: u16) -> io::Result<()> {
    let text = match app.session.phase() {
        Phase::Idle => "[Enter] open the case   [q] quit",
        Phase::Playing => "[a-i] pick  [1-9] drop/return  [Enter] indict  [x] dismiss  [r] reinvestigate",
        Phase::Resolved(_) => "[Enter] next stage   [q] quit",
        Phase::GameOver(_) => "[Enter] restart   [q] quit",
    };
    execute!(
        stdout,
        MoveTo(x, y),
        SetForegroundColor(app.theme.key),
        Print(text)
    )
}

fn render_result(stdout: &mut io::Stdout, app: &App, outcome: Outcome, x: u16, y: u16) -> io::Result<()> {
    let theme = &app.theme;
    let solvable = app.session.round().solvable();
    let (title, message) = outcome.verdict_text(solvable);
    let color = result_color(app, outcome, solvable);
    let elapsed = app.session.history().last().map(|r| r.elapsed_ms).unwrap_or(0);

    execute!(
        stdout,
        MoveTo(x, y),
        SetForegroundColor(color),
        Print(title.to_uppercase()),
        SetForegroundColor(theme.fg),
        Print(format!("  {}", message)),
        MoveTo(x, y + 1),
        SetForegroundColor(theme.info),
        Print(format!("Elapsed {}", format_time(elapsed))),
    )
}

fn result_color(app: &App, outcome: Outcome, solvable: bool) -> Color {
    match outcome {
        Outcome::Indicted => app.theme.success,
        Outcome::Dismissed if solvable => app.theme.warning,
        Outcome::Dismissed => app.theme.success,
        Outcome::GameOver(_) => app.theme.error,
    }
}

/// Pad or truncate to exactly `width` columns
fn fit(text: &str, width: usize) -> String {
    let truncated: String = text.chars().take(width).collect();
    format!("{:<width$}", truncated, width = width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit() {
        assert_eq!(fit("abc", 5), "abc  ");
        assert_eq!(fit("abcdefgh", 4), "abcd");
        assert_eq!(fit("", 2), "  ");
    }
}
