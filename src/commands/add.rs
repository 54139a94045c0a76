use std::io;
use std::path::Path;
use std::time::Duration;

use crate::crud::DB;
use crate::flower::Flower;
use crate::images::{images_dir, import_image};
use crate::tui::{FieldSet, Theme};
use crate::utils::trim_line;

use anyhow::{Result, bail};
use crossterm::{
    event::{
        self, Event, KeyCode, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
};

const FLASH_SECS: f64 = 1.5;
const LABEL_WIDTH: usize = 16;

pub async fn run(db: &DB) -> Result<()> {
    capture_flowers(db).await
}

/// Validate the form, copy the image into the asset store, and insert the
/// new card with a zeroed counter.
async fn save_flower(db: &DB, images_dir: &Path, values: &[String]) -> Result<String> {
    let Some(common_name) = trim_line(&values[0]) else {
        bail!("Common name must not be empty");
    };
    let scientific_name = values[1].trim();
    let family = values[2].trim();
    let Some(image) = trim_line(&values[3]) else {
        bail!("Image file must not be empty");
    };

    if db.flower_exists(common_name).await? {
        bail!("A flower named '{common_name}' already exists");
    }

    let image_path = import_image(images_dir, Path::new(image))?;
    let flower = Flower::new(common_name, scientific_name, family, image_path);
    db.add_flower(&flower).await?;
    Ok(common_name.to_string())
}

async fn capture_flowers(db: &DB) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_ALL_KEYS_AS_ESCAPE_CODES
                | KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
        )
    )?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.show_cursor()?;

    let editor_result: Result<()> = async {
        let images_dir = images_dir()?;
        let mut fields = FieldSet::new(&[
            "Common name",
            "Scientific name",
            "Family",
            "Image file",
        ]);
        let mut status: Option<String> = None;
        let mut flowers_in_collection = db.load_flowers().await?.len();
        let mut added_count = 0;
        let mut last_save_attempt: Option<std::time::Instant> = None;

        loop {
            terminal.draw(|frame| {
                let area = frame.area();
                frame.render_widget(Theme::backdrop(), area);
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(6), Constraint::Length(5)])
                    .split(area);

                let field_lines: Vec<Line> = (0..fields.len())
                    .map(|idx| {
                        let label =
                            format!("{:<width$}", fields.label(idx), width = LABEL_WIDTH);
                        let label_span = if idx == fields.active() {
                            Span::styled(label, Theme::emphasis())
                        } else {
                            Theme::span(label)
                        };
                        Line::from(vec![label_span, Theme::span(fields.value(idx))])
                    })
                    .collect();
                let form = Paragraph::new(field_lines)
                    .block(Theme::panel("New flower"))
                    .wrap(Wrap { trim: false });
                frame.render_widget(form, chunks[0]);

                let mut help_lines = vec![Line::from(vec![
                    Theme::key_chip("Ctrl+S"),
                    Theme::span(" save"),
                    Theme::bullet(),
                    Theme::key_chip("Tab"),
                    Theme::span(" next field"),
                    Theme::bullet(),
                    Theme::key_chip("Esc"),
                    Theme::span(" / "),
                    Theme::key_chip("Ctrl+C"),
                    Theme::span(" exit"),
                ])];
                help_lines.push(Line::from(vec![
                    Theme::span("Flowers in collection:"),
                    Theme::label_span(format!(" {}", flowers_in_collection)),
                    Theme::bullet(),
                    Theme::span("Added this session:"),
                    Theme::label_span(format!(" {}", added_count)),
                ]));
                if let Some(time) = last_save_attempt
                    && time.elapsed().as_secs_f64() < FLASH_SECS
                    && let Some(message) = status.clone()
                {
                    let style = if message.starts_with("Unable") {
                        Theme::danger()
                    } else {
                        Theme::success()
                    };
                    help_lines.push(Line::from(vec![Span::styled(message, style)]));
                }

                let instructions = Paragraph::new(help_lines)
                    .block(Theme::panel_with_line(Theme::section_header("Help")))
                    .wrap(Wrap { trim: true });
                frame.render_widget(instructions, chunks[1]);

                let (row, col) = fields.cursor();
                let cursor_x = chunks[0].x
                    + 1
                    + ((LABEL_WIDTH + col) as u16).min(chunks[0].width.saturating_sub(2));
                let cursor_y =
                    chunks[0].y + 1 + (row as u16).min(chunks[0].height.saturating_sub(2));
                frame.set_cursor_position((cursor_x, cursor_y));
            })?;

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
                    break;
                }

                if key.code == KeyCode::Char('s') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    let save_status = save_flower(db, &images_dir, &fields.values()).await;
                    match save_status {
                        Ok(name) => {
                            fields.clear();
                            added_count += 1;
                            flowers_in_collection += 1;
                            last_save_attempt = Some(std::time::Instant::now());
                            status = Some(format!("Flower '{name}' saved."));
                        }
                        Err(e) => {
                            last_save_attempt = Some(std::time::Instant::now());
                            let flat_error = e
                                .chain()
                                .map(|cause| cause.to_string().replace('\n', " "))
                                .collect::<Vec<_>>()
                                .join(": ");
                            status = Some(format!("Unable to save flower: {}", flat_error));
                        }
                    }
                    continue;
                }

                match key.code {
                    KeyCode::Tab | KeyCode::Down | KeyCode::Enter => fields.next_field(),
                    KeyCode::BackTab | KeyCode::Up => fields.prev_field(),
                    KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                        fields.insert_char(c);
                    }
                    KeyCode::Backspace => fields.backspace(),
                    KeyCode::Delete => fields.delete(),
                    KeyCode::Left => fields.move_left(),
                    KeyCode::Right => fields.move_right(),
                    KeyCode::Home => fields.move_home(),
                    KeyCode::End => fields.move_end(),
                    _ => {}
                }
            }
        }
        Ok(())
    }
    .await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        PopKeyboardEnhancementFlags,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    editor_result
}
