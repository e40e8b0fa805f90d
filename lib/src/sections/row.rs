use serde_json::Value;

use crate::elementor::{Element, IdGen};
use crate::error::Result;

/// Whether `column` holds `widget_type` as a direct child.
fn is_slot(column: &Element, widget_type: &str) -> bool {
    column.is_column() && column.children().iter().any(|w| w.widget_type() == Some(widget_type))
}

fn slot_count(row: &Element, widget_type: &str) -> usize {
    row.children().iter().filter(|c| is_slot(c, widget_type)).count()
}

fn is_row(element: &Element, widget_type: &str) -> bool {
    element.is_section() && slot_count(element, widget_type) > 0
}

/// Resizes a template's repeated-card row so that it holds exactly `n`
/// columns containing `widget_type`.
///
/// The row is the first section, in document order, with a column that
/// holds the widget directly. Surplus columns are dropped from the end;
/// missing ones are copies of the last, with fresh ids. A row nested in a
/// column is repeated to keep the template's cards per row; a top level row
/// just grows. Column sizes are rebalanced afterwards.
pub fn fit_row(section: &mut Element, widget_type: &str, n: usize, ids: &mut IdGen) -> Result<()> {
    if is_row(section, widget_type) {
        resize(section, widget_type, n, ids);
        return Ok(());
    }

    if fit_nested(section, widget_type, n, ids) {
        return Ok(());
    }

    err!("template has no row of columns holding the widget", "widget" => widget_type)
}

fn fit_nested(parent: &mut Element, widget_type: &str, n: usize, ids: &mut IdGen) -> bool {
    let is_column = parent.is_column();
    let children = parent.children_mut();
    let Some(pos) = children.iter().position(|c| is_row(c, widget_type)) else {
        return children.iter_mut()
            .filter(|c| c.widget_type().is_none())
            .any(|c| fit_nested(c, widget_type, n, ids));
    };

    if !is_column {
        resize(&mut children[pos], widget_type, n, ids);
        return true;
    }

    let template = children[pos].clone();
    let per_row = slot_count(&template, widget_type);
    let mut rows = vec![];
    let mut remaining = n;
    while remaining > 0 {
        let take = remaining.min(per_row);
        let mut row = template.clone();
        if !rows.is_empty() {
            ids.refresh(&mut row);
        }

        resize(&mut row, widget_type, take, ids);
        rows.push(row);
        remaining -= take;
    }

    log::trace!("laid out {n} `{widget_type}` cards in {} rows", rows.len());
    children.splice(pos..=pos, rows);
    true
}

fn resize(row: &mut Element, widget_type: &str, n: usize, ids: &mut IdGen) {
    let columns = row.children_mut();
    let mut slots: Vec<usize> = (0..columns.len())
        .filter(|&i| is_slot(&columns[i], widget_type))
        .collect();

    while slots.len() > n {
        if let Some(i) = slots.pop() {
            columns.remove(i);
        }
    }

    while slots.len() < n {
        let Some(&last) = slots.last() else { break };
        let mut copy = columns[last].clone();
        ids.refresh(&mut copy);
        columns.insert(last + 1, copy);
        slots.push(last + 1);
    }

    rebalance(columns, widget_type);
}

/// Splits the width the other columns leave over evenly across the slots.
fn rebalance(columns: &mut [Element], widget_type: &str) {
    let slots = columns.iter().filter(|c| is_slot(c, widget_type)).count();
    if slots == 0 {
        return;
    }

    let fixed: f64 = columns.iter()
        .filter(|c| !is_slot(c, widget_type))
        .filter_map(Element::column_size)
        .sum();

    let size = ((100.0 - fixed).max(0.0) / slots as f64).floor() as u32;
    for column in columns.iter_mut().filter(|c| is_slot(c, widget_type)) {
        let settings = column.settings_mut();
        settings.insert("_column_size".into(), size.into());
        if settings.contains_key("_inline_size") {
            settings.insert("_inline_size".into(), Value::Null);
        }
    }
}
