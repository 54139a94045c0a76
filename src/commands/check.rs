use crate::{
    crud::DB,
    flower::Flower,
    palette::{Palette, PaletteColor},
    scoring::LEARNED_THRESHOLD,
    stats::DeckStats,
    tui::Theme,
    utils::pluralize,
};

use std::{
    cmp,
    io::{self},
    time::Duration,
};

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Paragraph, Wrap},
};

pub async fn run(db: &DB, plain: bool) -> Result<usize> {
    let deck = db.load_flowers().await?;
    let log = db.load_log().await?;
    let stats = DeckStats::collect(&deck, &log);

    if plain {
        render_plain_summary(&stats, &deck);
    } else {
        render_dashboard(&stats)?;
    }
    Ok(stats.total)
}

fn render_dashboard(stats: &DeckStats) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.hide_cursor()?;

    let draw_result = dashboard_loop(&mut terminal, stats);

    terminal.show_cursor()?;
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    draw_result
}

fn render_plain_summary(stats: &DeckStats, deck: &[Flower]) {
    println!("{}", Palette::paint(Palette::BLOSSOM, "Deck Summary"));
    println!(
        "{} {}",
        Palette::dim("Flowers:"),
        Palette::paint(Palette::SKY, stats.total)
    );
    println!(
        "{} {} {} {} {} {}",
        Palette::dim("Learned:"),
        Palette::paint(Palette::LEAF, stats.learned),
        Palette::dim("In progress:"),
        Palette::paint(Palette::SKY, stats.in_progress),
        Palette::dim("Unseen:"),
        Palette::paint(Palette::SKY, stats.unseen)
    );
    println!(
        "{} {}",
        Palette::dim("Families:"),
        Palette::paint(Palette::SKY, stats.families.len())
    );

    println!("\n{}", Palette::paint(Palette::BLOSSOM, "Attempts"));
    match stats.accuracy() {
        Some(accuracy) => {
            println!(
                "{} {} {} {}",
                Palette::dim("Answers logged:"),
                Palette::paint(Palette::SKY, stats.attempts),
                Palette::dim("Fully correct:"),
                Palette::paint(Palette::SKY, format!("{:.0}%", accuracy * 100.0))
            );
        }
        None => println!("{}", Palette::dim("No answers logged yet.")),
    }

    println!("\n{}", Palette::paint(Palette::BLOSSOM, "Mastery"));
    let max_count = stats.mastery_bins.iter().copied().max().unwrap_or(0);
    for (count, cards) in stats.mastery_bins.iter().enumerate() {
        let label = mastery_label(count);
        println!(
            "{} {}",
            Palette::dim(format!("{label}:")),
            format_bar(Palette::mastery(count as u32), *cards, max_count)
        );
    }

    if !deck.is_empty() {
        println!("\n{}", Palette::paint(Palette::BLOSSOM, "Flowers"));
        for flower in deck {
            println!(
                "{} {} {} {}",
                Palette::paint(Palette::SKY, &flower.common_name),
                Palette::dim(&flower.scientific_name),
                Palette::dim(format!("({})", flower.family)),
                Palette::paint(
                    Palette::mastery(flower.correct_count),
                    format!("{}/{}", flower.correct_count.min(LEARNED_THRESHOLD), LEARNED_THRESHOLD)
                )
            );
        }
    }

    println!(
        "\n{} {}",
        Palette::dim("Snapshot covers"),
        Palette::paint(Palette::SKY, pluralize("flower", stats.total))
    );
    println!("{}", Palette::dim("Rerun command anytime to refresh data"));
}

fn mastery_label(count: usize) -> String {
    if count >= LEARNED_THRESHOLD as usize {
        format!("{count}+ correct (learned)")
    } else {
        pluralize("correct answer", count)
    }
}

fn format_bar(color: PaletteColor, count: usize, max: usize) -> String {
    let width = 20usize;
    let filled = if max == 0 {
        0
    } else {
        ((count as f64 / max as f64) * width as f64).round() as usize
    };
    let clamped = filled.min(width);
    let bar = "#".repeat(clamped);
    let remainder = "-".repeat(width - clamped);
    format!(
        "{} {}",
        Palette::paint(color, bar + &remainder),
        Palette::dim(pluralize("flower", count))
    )
}

fn dashboard_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    stats: &DeckStats,
) -> Result<()> {
    loop {
        terminal.draw(|frame| draw_dashboard(frame, stats))?;

        if event::poll(Duration::from_millis(200))?
            && let Event::Key(key) = event::read()?
        {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            let exit_ctrl_c =
                key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL);
            if key.code == KeyCode::Esc || exit_ctrl_c {
                break;
            }
        }
    }
    Ok(())
}

fn draw_dashboard(frame: &mut Frame<'_>, stats: &DeckStats) {
    let area = frame.area();
    frame.render_widget(Theme::backdrop(), area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6),
            Constraint::Min(6),
            Constraint::Length(3),
        ])
        .split(area);

    let summary = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(rows[0]);

    frame.render_widget(collection_panel(stats), summary[0]);
    frame.render_widget(attempts_panel(stats), summary[1]);

    render_mastery_histogram(frame, rows[1], stats);

    frame.render_widget(help_panel(stats), rows[2]);
}

fn collection_panel(stats: &DeckStats) -> Paragraph<'static> {
    let lines = vec![
        Line::from(vec![
            Theme::span("Flowers"),
            Theme::bullet(),
            Theme::label_span(format!("{}", stats.total)),
            Theme::bullet(),
            Theme::span("Families"),
            Theme::bullet(),
            Theme::label_span(format!("{}", stats.families.len())),
        ]),
        Line::from(vec![
            Theme::span("Learned"),
            Theme::bullet(),
            Theme::label_span(format!("{}", stats.learned)),
            Theme::bullet(),
            Theme::span("In progress"),
            Theme::bullet(),
            Theme::label_span(format!("{}", stats.in_progress)),
            Theme::bullet(),
            Theme::span("Unseen"),
            Theme::bullet(),
            Theme::label_span(format!("{}", stats.unseen)),
        ]),
    ];
    Paragraph::new(lines).block(Theme::panel("Collection"))
}

fn attempts_panel(stats: &DeckStats) -> Paragraph<'static> {
    let emphasis = if stats.all_learned() {
        Theme::success()
    } else {
        Theme::emphasis()
    };
    let focus = if stats.all_learned() {
        "All learned!"
    } else {
        "Keep drilling"
    };
    let mut lines = vec![Line::from(vec![Span::styled(focus, emphasis)])];
    match stats.accuracy() {
        Some(accuracy) => lines.push(Line::from(vec![
            Theme::span("Answers"),
            Theme::bullet(),
            Theme::label_span(format!("{}", stats.attempts)),
            Theme::bullet(),
            Theme::span("Fully correct"),
            Theme::bullet(),
            Theme::label_span(format!("{:.0}%", accuracy * 100.0)),
        ])),
        None => lines.push(Line::from(vec![Theme::span("No answers logged yet.")])),
    }
    Paragraph::new(lines).block(Theme::panel("Attempts"))
}

fn render_mastery_histogram(frame: &mut Frame<'_>, area: Rect, stats: &DeckStats) {
    let block = Theme::panel_with_line(Theme::title_line("Mastery histogram"));
    if stats.total == 0 {
        let empty = Paragraph::new(vec![Line::from(vec![Theme::span(
            "No flowers yet. Add some with `blumen add`.",
        )])])
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    frame.render_widget(block.clone(), area);
    let mut inner = block.inner(area);
    if inner.width == 0 || inner.height == 0 {
        inner = area;
    }
    let mut chart_area = inner;
    let top_pad = cmp::min(1, chart_area.height);
    chart_area.y = chart_area.y.saturating_add(top_pad);
    chart_area.height = chart_area.height.saturating_sub(top_pad);

    if chart_area.width == 0 || chart_area.height == 0 {
        chart_area = inner;
    }

    let bars: Vec<Bar<'static>> = stats
        .mastery_bins
        .iter()
        .enumerate()
        .map(|(count, cards)| {
            Bar::default()
                .value(*cards as u64)
                .text_value(cards.to_string())
                .label(Line::from(vec![Theme::span(mastery_label(count))]))
                .style(Style::default().fg(Palette::mastery(count as u32).tui()))
        })
        .collect();

    let len = bars.len() as u16;
    let denom = cmp::max(len, 1);
    let mut available = chart_area.width.saturating_sub(1).max(1);
    let mut bar_gap: u16 = if len > 1 { 1 } else { 0 };
    let required_with_gap = len.saturating_add(bar_gap.saturating_mul(len.saturating_sub(1)));
    if required_with_gap > available {
        bar_gap = 0;
    }
    let total_gap = bar_gap.saturating_mul(len.saturating_sub(1));
    available = available.saturating_sub(total_gap);
    let bar_width = cmp::max(1, cmp::min(available / denom, available));

    let chart = BarChart::default()
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width)
        .bar_style(Theme::label())
        .bar_gap(bar_gap);

    frame.render_widget(chart, chart_area);
}

fn help_panel(stats: &DeckStats) -> Paragraph<'static> {
    let lines = vec![Line::from(vec![
        Theme::key_chip("Esc"),
        Theme::span("/ "),
        Theme::key_chip("Ctrl+C"),
        Theme::span(" exit"),
        Theme::bullet(),
        Theme::span("Snapshot covers"),
        Theme::bullet(),
        Theme::label_span(pluralize("flower", stats.total)),
    ])];

    Paragraph::new(lines)
        .block(Theme::panel_with_line(Theme::section_header("Controls")))
        .wrap(Wrap { trim: true })
}
