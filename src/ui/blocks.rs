//! Latest blocks view.
//!
//! One row per display slot: block number, base fee in gwei, and total fees
//! in the selected unit. A footer shows the age of the newest block (or the
//! resyncing notice) and the upstream block lag.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::app::App;
use crate::data::format::{format_block_lag, format_block_number, format_elapsed};
use crate::data::{
    format_fee, format_gas, Clock, Denomination, DisplaySlot, FreshnessPhase, FreshnessState,
    SlotContent,
};

/// Character used to draw skeleton placeholders for absent values.
pub const PLACEHOLDER: char = '░';

/// Text shown instead of the block age once the feed is stalled.
pub const RESYNCING_TEXT: &str = "node error, busy resyncing...";

const BLOCK_WIDTH: usize = 11;
const GAS_WIDTH: usize = 4;
const FEE_WIDTH: usize = 6;
const AGE_WIDTH: usize = 2;
const LAG_WIDTH: usize = 1;

/// A fixed-width skeleton.
pub fn skeleton(width: usize) -> String {
    std::iter::repeat(PLACEHOLDER).take(width).collect()
}

/// Cell texts for one slot, `None` where the value is absent.
///
/// Unset slots have no cells at all.
pub fn slot_cells(slot: &DisplaySlot, unit: Denomination) -> Option<[Option<String>; 3]> {
    match &slot.content {
        SlotContent::Unset => None,
        SlotContent::Placeholder => Some([None, None, None]),
        SlotContent::Block(record) => Some([
            format_block_number(Some(record.number)),
            format_gas(record.base_fee_per_gas),
            format_fee(unit, record.fees, record.fees_usd),
        ]),
    }
}

/// Footer text describing the newest block's age.
///
/// `None` means the age is not known yet and a skeleton is shown.
pub fn age_text(state: FreshnessState) -> Option<String> {
    match state.phase() {
        FreshnessPhase::Uninitialized => None,
        FreshnessPhase::Stalled { .. } => Some(RESYNCING_TEXT.to_string()),
        FreshnessPhase::Tracking { .. } => format_elapsed(state.elapsed_seconds)
            .map(|secs| format!("latest block {} seconds old", secs)),
    }
}

fn value_span(value: Option<String>, width: usize, style: Style, skeleton_style: Style) -> Span<'static> {
    match value {
        Some(text) => Span::styled(text, style),
        None => Span::styled(skeleton(width), skeleton_style),
    }
}

/// Render the latest blocks table and its footer.
pub fn render<C: Clock>(frame: &mut Frame, app: &App<C>, area: Rect) {
    let block = Block::default()
        .title(" latest blocks ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::vertical([Constraint::Min(3), Constraint::Length(1)]).split(inner);

    render_table(frame, app, chunks[0]);
    render_footer(frame, app, chunks[1]);
}

fn render_table<C: Clock>(frame: &mut Frame, app: &App<C>, area: Rect) {
    let header = Row::new(vec![
        Cell::from("Block"),
        Cell::from(Line::from("Gwei").right_aligned()),
        Cell::from(Line::from(format!("Fees {}", app.unit.label())).right_aligned()),
    ])
    .height(1)
    .style(app.theme.header);

    let gas_style = app.theme.urgency_style(app.fee_urgency());
    let skeleton_style = app.theme.placeholder_style();

    let rows: Vec<Row> = app
        .slots
        .iter()
        .map(|slot| {
            let Some([number, gas, fee]) = slot_cells(slot, app.unit) else {
                return Row::new(vec![Cell::from(""), Cell::from(""), Cell::from("")]);
            };
            Row::new(vec![
                Cell::from(Line::from(value_span(
                    number,
                    BLOCK_WIDTH,
                    Style::default(),
                    skeleton_style,
                ))),
                Cell::from(
                    Line::from(value_span(gas, GAS_WIDTH, gas_style, skeleton_style))
                        .right_aligned(),
                ),
                Cell::from(
                    Line::from(value_span(fee, FEE_WIDTH, Style::default(), skeleton_style))
                        .right_aligned(),
                ),
            ])
        })
        .collect();

    let widths = [
        Constraint::Percentage(40),
        Constraint::Percentage(25),
        Constraint::Percentage(35),
    ];

    let table = Table::new(rows, widths).header(header);
    frame.render_widget(table, area);
}

fn render_footer<C: Clock>(frame: &mut Frame, app: &App<C>, area: Rect) {
    let freshness = app.freshness();
    let label = Style::default().add_modifier(Modifier::DIM);
    let skeleton_style = app.theme.placeholder_style();

    let age = match age_text(freshness) {
        Some(text) => Span::styled(text, app.theme.freshness_style(freshness.phase())),
        None => Span::styled(
            format!("latest block {} seconds old", skeleton(AGE_WIDTH)),
            skeleton_style,
        ),
    };

    let chunks =
        Layout::horizontal([Constraint::Min(10), Constraint::Length(16)]).split(area);

    frame.render_widget(Paragraph::new(Line::from(vec![Span::raw(" "), age])), chunks[0]);

    let lag = Line::from(vec![
        value_span(
            format_block_lag(app.block_lag),
            LAG_WIDTH,
            Style::default().add_modifier(Modifier::BOLD),
            skeleton_style,
        ),
        Span::styled(" block lag ", label),
    ])
    .right_aligned();
    frame.render_widget(Paragraph::new(lag), chunks[1]);
}
