use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};
use crossterm::style::Stylize;
use report_table::config::config::DisplayConfig;
use report_table::data::cell_formatter::{CellContent, Tone};
use report_table::data::column::Align;
use report_table::data::pagination::PaginationWindow;
use report_table::services::table_orchestrator::{TableRender, TableView, ViewCell, ViewHeader};
use std::collections::BTreeMap;

fn alignment(align: Align) -> CellAlignment {
    match align {
        Align::Left => CellAlignment::Left,
        Align::Center => CellAlignment::Center,
        Align::Right => CellAlignment::Right,
    }
}

/// Terminal width for a CSS-like size: `12`/`12ch` are characters,
/// `96px` is read at 8px per character, `30%` is a share of the table.
fn terminal_width(size: &str) -> Option<Width> {
    let size = size.trim();
    let digits_end = size
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(size.len());
    let amount: f64 = size[..digits_end].parse().ok()?;
    let width = match size[digits_end..].trim() {
        "" | "ch" => Width::Fixed(amount.round() as u16),
        "px" => Width::Fixed((amount / 8.0).ceil().max(1.0) as u16),
        "%" => Width::Percentage(amount.round().min(100.0) as u16),
        _ => return None,
    };
    Some(width)
}

fn css_color(value: &str) -> Option<Color> {
    let value = value.trim().to_ascii_lowercase();
    if let Some(hex) = value.strip_prefix('#') {
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        return Some(Color::Rgb {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        });
    }
    let color = match value.as_str() {
        "black" => Color::Black,
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "magenta" | "purple" => Color::Magenta,
        "cyan" => Color::Cyan,
        "white" => Color::White,
        "gray" | "grey" => Color::Grey,
        _ => return None,
    };
    Some(color)
}

/// Apply the style properties a terminal can show; others are ignored
fn styled(mut cell: Cell, style: &BTreeMap<String, String>) -> Cell {
    for (property, value) in style {
        let value = value.trim();
        cell = match property.as_str() {
            "color" => match css_color(value) {
                Some(color) => cell.fg(color),
                None => cell,
            },
            "background" | "background-color" | "backgroundColor" => match css_color(value) {
                Some(color) => cell.bg(color),
                None => cell,
            },
            "font-weight" | "fontWeight" if value == "bold" || value == "700" => {
                cell.add_attribute(Attribute::Bold)
            }
            "font-style" | "fontStyle" if value == "italic" => cell.add_attribute(Attribute::Italic),
            "text-decoration" | "textDecoration" if value == "underline" => {
                cell.add_attribute(Attribute::Underlined)
            }
            _ => cell,
        };
    }
    cell
}

fn body_cell(cell: &ViewCell) -> Cell {
    let content = match &cell.content {
        CellContent::Emphasis { text, tone } => styled(Cell::new(text), &cell.style)
            .fg(match tone {
                Tone::Positive => Color::Green,
                Tone::Negative => Color::Red,
            })
            .add_attribute(Attribute::Bold),
        CellContent::Link { route, text } => {
            styled(Cell::new(format!("{} <{}>", text, route)), &cell.style)
                .add_attribute(Attribute::Underlined)
        }
        other => styled(Cell::new(other.text()), &cell.style),
    };
    content.set_alignment(alignment(cell.align))
}

/// Min/max widths win over the percentage share
fn column_constraint(header: &ViewHeader, fit_content: bool) -> ColumnConstraint {
    let min = header.min_width.as_deref().and_then(terminal_width);
    let max = header.max_width.as_deref().and_then(terminal_width);
    match (min, max) {
        (Some(lower), Some(upper)) => ColumnConstraint::Boundaries { lower, upper },
        (Some(lower), None) => ColumnConstraint::LowerBoundary(lower),
        (None, Some(upper)) => ColumnConstraint::UpperBoundary(upper),
        // Negative shares from overcommitted widths are left unconstrained
        (None, None) if !fit_content && header.width > 0.0 => {
            ColumnConstraint::Absolute(Width::Percentage(header.width.round().min(100.0) as u16))
        }
        (None, None) => ColumnConstraint::ContentWidth,
    }
}

/// Build the comfy-table for one page of the view
pub fn build_table(view: &TableView, fit_content: bool) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(view.headers.iter().map(|h| {
        let label = match h.sorted {
            Some(true) => format!("{} ▲", h.label),
            Some(false) => format!("{} ▼", h.label),
            None => h.label.clone(),
        };
        styled(Cell::new(label), &h.style)
            .add_attribute(Attribute::Bold)
            .set_alignment(alignment(h.align))
    }));

    table.set_constraints(view.headers.iter().map(|h| column_constraint(h, fit_content)));

    for row in &view.rows {
        table.add_row(row.cells.iter().map(body_cell));
    }
    table
}

/// `Previo 1 [2] 3 Siguiente  Mostrando 25 de 60`
pub fn pagination_line(window: &PaginationWindow, labels: &DisplayConfig) -> String {
    format!(
        "{}  {}",
        window.render_compact(&labels.previous_label, &labels.next_label),
        window.item_count_label(&labels.showing_label)
    )
}

pub fn display_render(render: &TableRender, display: &DisplayConfig) {
    let view = match render {
        TableRender::Loading => {
            println!("{}", "Cargando...".yellow());
            return;
        }
        TableRender::Ready(view) => view,
    };

    if view.rows.is_empty() {
        println!("{}", "No hay registros para mostrar.".yellow());
        return;
    }

    println!("{}", build_table(view, display.fit_content));
    if let Some(window) = &view.pagination {
        println!("{}", pagination_line(window, display).cyan());
    }
    println!(
        "{}",
        format!("{} de {} registros", view.filtered_count, view.total_count).green()
    );
}
