use std::io;
use std::path::Path;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::crud::DB;
use crate::flower::{Field, Flower};
use crate::images::open_image;
use crate::scoring::Guesses;
use crate::session::{Attempt, Phase, Session};
use crate::stats::learned_count;
use crate::tui::{FieldSet, Theme};
use crate::utils::pluralize;

use anyhow::{Context, Result};
use crossterm::event::KeyModifiers;
use crossterm::{
    event::{
        self, Event, KeyCode, KeyEventKind, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
};

const FLASH_SECS: f64 = 2.0;
const LABEL_WIDTH: usize = 16;

pub async fn run(db: &DB, config: &Config, seed: Option<u64>) -> Result<()> {
    let deck = db.load_flowers().await?;
    if deck.is_empty() {
        println!("No flowers yet. Add some with `blumen add`.");
        return Ok(());
    }
    if learned_count(&deck) == deck.len() {
        println!("All flowers learned! Run `blumen reset` to start over.");
        return Ok(());
    }

    let rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let outcome = start_drill_session(db, config, deck, rng).await?;
    match outcome {
        SessionOutcome::AllLearned => {
            println!("All flowers learned! Run `blumen reset` to start over.");
        }
        SessionOutcome::Quit { answered, correct } => {
            if answered > 0 {
                println!(
                    "Session ended: {} answered, {} fully correct.",
                    pluralize("card", answered),
                    correct
                );
            }
        }
    }
    Ok(())
}

enum SessionOutcome {
    AllLearned,
    Quit { answered: usize, correct: usize },
}

enum Feedback {
    Correct { at: Instant },
    Incorrect { hints: Vec<(Field, String)> },
}

/// Everything one drill screen needs between key presses. The deck is
/// reloaded state owned here for the session; every mutation is written
/// straight back through the DB.
struct DrillState {
    deck: Vec<Flower>,
    session: Session,
    fields: FieldSet,
    feedback: Option<Feedback>,
    answered: usize,
    correct: usize,
}

impl DrillState {
    fn new(deck: Vec<Flower>) -> Self {
        Self {
            deck,
            session: Session::new(),
            fields: FieldSet::new(&["Common name", "Scientific name", "Family"]),
            feedback: None,
            answered: 0,
            correct: 0,
        }
    }

    fn guesses(&self) -> Guesses {
        let values = self.fields.values();
        Guesses::new(values[0].clone(), values[1].clone(), values[2].clone())
    }

    fn apply(&mut self, attempt: &Attempt) {
        self.answered += 1;
        if attempt.verdict.all_correct() {
            self.correct += 1;
            self.fields.clear();
            self.feedback = Some(Feedback::Correct { at: Instant::now() });
        } else {
            self.feedback = Some(Feedback::Incorrect {
                hints: attempt.hints.clone(),
            });
        }
    }
}

async fn start_drill_session(
    db: &DB,
    config: &Config,
    deck: Vec<Flower>,
    mut rng: StdRng,
) -> Result<SessionOutcome> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_ALL_KEYS_AS_ESCAPE_CODES
                | KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
        )
    )
    .context("failed to configure terminal")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to start terminal")?;
    terminal.show_cursor().context("failed to show cursor")?;

    let mut state = DrillState::new(deck);
    state.session.draw(&state.deck, &mut rng);

    let loop_result: Result<SessionOutcome> = async {
        loop {
            if state.session.phase(&state.deck) == Phase::AllLearned {
                break Ok(SessionOutcome::AllLearned);
            }

            terminal
                .draw(|frame| {
                    let card = state
                        .session
                        .current_card(&state.deck)
                        .expect("card should exist while session is active");
                    let area = frame.area();
                    frame.render_widget(Theme::backdrop(), area);
                    let chunks = Layout::default()
                        .direction(Direction::Vertical)
                        .constraints([
                            Constraint::Length(4),
                            Constraint::Min(5),
                            Constraint::Length(6),
                        ])
                        .split(area);

                    let header_line = Line::from(vec![
                        Theme::label_span(format!(
                            "Learned {}/{}",
                            learned_count(&state.deck),
                            state.deck.len()
                        )),
                        Theme::bullet(),
                        Theme::span(format!("{} answered this session", state.answered)),
                    ]);
                    let image_name = Path::new(&card.image_path)
                        .file_name()
                        .map(|f| f.to_string_lossy().into_owned())
                        .unwrap_or_else(|| card.image_path.clone());
                    let image_panel = Paragraph::new(vec![Line::from(vec![
                        Theme::span("Which flower is "),
                        Theme::label_span(image_name),
                        Theme::span("?"),
                    ])])
                    .block(Theme::panel_with_line(header_line))
                    .wrap(Wrap { trim: false });
                    frame.render_widget(image_panel, chunks[0]);

                    let field_lines: Vec<Line> = (0..state.fields.len())
                        .map(|idx| {
                            let label =
                                format!("{:<width$}", state.fields.label(idx), width = LABEL_WIDTH);
                            let label_span = if idx == state.fields.active() {
                                Span::styled(label, Theme::emphasis())
                            } else {
                                Theme::span(label)
                            };
                            Line::from(vec![label_span, Theme::span(state.fields.value(idx))])
                        })
                        .collect();
                    let answers = Paragraph::new(field_lines)
                        .block(Theme::panel("Your answer"));
                    frame.render_widget(answers, chunks[1]);

                    let footer = Paragraph::new(feedback_text(&state))
                        .block(Theme::panel_with_line(Theme::section_header("Controls")))
                        .wrap(Wrap { trim: true });
                    frame.render_widget(footer, chunks[2]);

                    let (row, col) = state.fields.cursor();
                    let cursor_x = chunks[1].x
                        + 1
                        + ((LABEL_WIDTH + col) as u16).min(chunks[1].width.saturating_sub(2));
                    let cursor_y = chunks[1].y + 1 + (row as u16).min(chunks[1].height.saturating_sub(2));
                    frame.set_cursor_position((cursor_x, cursor_y));
                })
                .context("failed to render frame")?;

            if event::poll(Duration::from_millis(16))?
                && let Event::Key(key) = event::read()?
            {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                if key.code == KeyCode::Esc
                    || (key.code == KeyCode::Char('c')
                        && key.modifiers.contains(KeyModifiers::CONTROL))
                {
                    break Ok(SessionOutcome::Quit {
                        answered: state.answered,
                        correct: state.correct,
                    });
                }

                if key.code == KeyCode::Char('o') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    if let Some(card) = state.session.current_card(&state.deck) {
                        // Best effort; a missing file should not end the drill.
                        let _ = open_image(&card.image_path);
                    }
                    continue;
                }

                match key.code {
                    KeyCode::Enter => {
                        submit_answer(db, config, &mut state, &mut rng).await?;
                    }
                    KeyCode::Tab | KeyCode::Down => state.fields.next_field(),
                    KeyCode::BackTab | KeyCode::Up => state.fields.prev_field(),
                    KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                        state.fields.insert_char(c);
                    }
                    KeyCode::Backspace => state.fields.backspace(),
                    KeyCode::Delete => state.fields.delete(),
                    KeyCode::Left => state.fields.move_left(),
                    KeyCode::Right => state.fields.move_right(),
                    KeyCode::Home => state.fields.move_home(),
                    KeyCode::End => state.fields.move_end(),
                    _ => {}
                }
            }
        }
    }
    .await;

    teardown_terminal(&mut terminal)?;

    loop_result
}

fn teardown_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(
        terminal.backend_mut(),
        PopKeyboardEnhancementFlags,
        LeaveAlternateScreen
    )
    .context("failed to restore terminal")?;
    terminal.show_cursor().context("failed to show cursor")?;
    Ok(())
}

/// One evaluation cycle: score, persist the updated count and log entry,
/// then either advance to a fresh card or keep this one active with hints.
async fn submit_answer<R>(
    db: &DB,
    config: &Config,
    state: &mut DrillState,
    rng: &mut R,
) -> Result<()>
where
    R: Rng + ?Sized,
{
    let guesses = state.guesses();
    let attempt = state
        .session
        .submit(&mut state.deck, &guesses, config.reveal_policy, rng)?;

    if let Some(flower) = state.session.current_card(&state.deck) {
        db.save_correct_count(flower).await?;
    }
    db.append_log(&attempt.entry, config.log_retention).await?;

    state.apply(&attempt);
    if attempt.verdict.all_correct() {
        state.session.draw(&state.deck, rng);
    }
    Ok(())
}

fn feedback_text(state: &DrillState) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(vec![
        Theme::key_chip("Enter"),
        Theme::span(" check answer"),
        Theme::bullet(),
        Theme::key_chip("Tab"),
        Theme::span(" next field"),
        Theme::bullet(),
        Theme::key_chip("Ctrl+O"),
        Theme::span(" open image"),
        Theme::bullet(),
        Theme::key_chip("Esc"),
        Theme::span(" / "),
        Theme::key_chip("Ctrl+C"),
        Theme::span(" exit"),
    ])];

    match &state.feedback {
        Some(Feedback::Correct { at }) if at.elapsed().as_secs_f64() < FLASH_SECS => {
            lines.push(Line::from(vec![Span::styled(
                "All correct! Next flower.",
                Theme::success(),
            )]));
        }
        Some(Feedback::Incorrect { hints }) => {
            lines.push(Line::from(vec![Span::styled(
                "Not quite right.",
                Theme::danger(),
            )]));
            for (field, hint) in hints {
                lines.push(Line::from(vec![
                    Theme::span(format!("{:<width$}", field.label(), width = LABEL_WIDTH)),
                    Theme::label_span(hint.clone()),
                ]));
            }
        }
        _ => {}
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deck() -> Vec<Flower> {
        vec![
            Flower::new("rose", "Rosa", "Rosaceae", "images/rose.jpg"),
            Flower::new("tulip", "Tulipa", "Liliaceae", "images/tulip.jpg"),
        ]
    }

    fn flatten_line(line: &Line<'_>) -> String {
        line.spans
            .iter()
            .map(|span| span.content.to_string())
            .collect::<String>()
    }

    #[test]
    fn field_values_become_guesses_in_order() {
        let mut state = DrillState::new(deck());
        for ch in "rose".chars() {
            state.fields.insert_char(ch);
        }
        state.fields.next_field();
        for ch in "Rosa".chars() {
            state.fields.insert_char(ch);
        }
        let guesses = state.guesses();
        assert_eq!(guesses.common_name, "rose");
        assert_eq!(guesses.scientific_name, "Rosa");
        assert_eq!(guesses.family, "");
    }

    #[test]
    fn incorrect_attempt_keeps_typed_values_and_shows_hints() {
        let mut state = DrillState::new(deck());
        let mut rng = StdRng::seed_from_u64(5);
        state.session.draw(&state.deck, &mut rng);
        state.fields.insert_char('x');

        let guesses = state.guesses();
        let attempt = state
            .session
            .submit(
                &mut state.deck,
                &guesses,
                crate::hint::RevealPolicy::Leftmost,
                &mut rng,
            )
            .unwrap();
        state.apply(&attempt);

        assert_eq!(state.answered, 1);
        assert_eq!(state.correct, 0);
        assert_eq!(state.fields.value(0), "x");

        let lines = feedback_text(&state);
        assert!(lines.len() >= 2);
        assert!(flatten_line(&lines[1]).contains("Not quite right"));
    }

    #[test]
    fn correct_attempt_clears_the_fields() {
        let mut state = DrillState::new(deck());
        let mut rng = StdRng::seed_from_u64(5);
        let drawn = state.session.draw(&state.deck, &mut rng).unwrap().clone();

        for ch in drawn.common_name.chars() {
            state.fields.insert_char(ch);
        }
        state.fields.next_field();
        for ch in drawn.scientific_name.chars() {
            state.fields.insert_char(ch);
        }
        state.fields.next_field();
        for ch in drawn.family.chars() {
            state.fields.insert_char(ch);
        }

        let guesses = state.guesses();
        let attempt = state
            .session
            .submit(
                &mut state.deck,
                &guesses,
                crate::hint::RevealPolicy::Random,
                &mut rng,
            )
            .unwrap();
        state.apply(&attempt);

        assert_eq!(state.correct, 1);
        assert_eq!(state.fields.values(), vec!["", "", ""]);
        let lines = feedback_text(&state);
        assert!(flatten_line(&lines[1]).contains("All correct"));
    }
}
