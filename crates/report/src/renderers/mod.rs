//! Record renderers for each report type

mod family_block;
mod register;

pub use family_block::FamilyBlockRenderer;
pub use register::RegisterRenderer;

use crate::composer::{DrawContext, TextStyle};
use crate::layout::{compute_member_row_y, ColumnKey, TablePositions};
use crate::{MemberRecord, ReportError, ReportOptions, Result};
use pdf_core::{LineStyle, Point};
use tamil_text::{parse_iso_date, NaiveDate};

/// Required `fromDate`/`toDate` pair
pub(crate) fn required_date_range(options: &ReportOptions) -> Result<(NaiveDate, NaiveDate)> {
    let from = required_date(options.from_date.as_deref(), "fromDate")?;
    let to = required_date(options.to_date.as_deref(), "toDate")?;
    if to < from {
        log::warn!("report window ends before it starts: {from} to {to}");
    }
    Ok((from, to))
}

fn required_date(value: Option<&str>, field: &'static str) -> Result<NaiveDate> {
    let value = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(ReportError::MissingField(field))?;
    parse_iso_date(value).map_err(|_| ReportError::InvalidDate(value.to_string()))
}

/// Text of a member-level cell; family-level columns are left to the caller
pub(crate) fn member_cell(member: &MemberRecord, key: ColumnKey, ordinal: usize) -> String {
    match key {
        ColumnKey::Serial => member
            .serial_number
            .map(|n| n as usize)
            .unwrap_or(ordinal)
            .to_string(),
        ColumnKey::Name => member.display_name(),
        ColumnKey::Relation => member.relation.clone(),
        ColumnKey::Sex => member.sex.clone(),
        ColumnKey::Age => member.age_text(),
        ColumnKey::Occupation => member.occupation.clone(),
        ColumnKey::WorkingPlace => member.working_place.clone(),
        ColumnKey::Baptised => yes_no(member.baptised),
        ColumnKey::Confirmed => yes_no(member.confirmed),
        ColumnKey::FamilyNumber | ColumnKey::Area => String::new(),
    }
}

fn yes_no(flag: bool) -> String {
    let text = if flag { "Yes" } else { "No" };
    text.to_string()
}

fn rule() -> LineStyle {
    LineStyle::new(0.5)
}

/// Top rule, header rule, header column rules and titles
pub(crate) fn draw_table_header(
    ctx: &mut DrawContext<'_>,
    page: usize,
    table: &TablePositions,
    size: f32,
) {
    ctx.line(page, Point::new(table.left, table.top), Point::new(table.right, table.top), rule());
    draw_column_rules(ctx, page, table, table.top, table.header_bottom);

    let style = TextStyle::new(size).bold();
    for header in &table.headers {
        if header.angle == 0.0 {
            let center = header.frame.center();
            ctx.text_centered(page, &header.title, center.x, center.y - 0.35 * size as f64, &style);
        } else {
            ctx.text_rotated(page, &header.title, header.frame, header.angle, &style);
        }
    }
}

/// Column rules from `top` down to `bottom`, closed by a rule across the table
pub(crate) fn draw_column_rules(
    ctx: &mut DrawContext<'_>,
    page: usize,
    table: &TablePositions,
    top: f64,
    bottom: f64,
) {
    if top <= bottom {
        return;
    }
    for &x in &table.rule_xs {
        ctx.line(page, Point::new(x, top), Point::new(x, bottom), rule());
    }
    ctx.line(page, Point::new(table.left, bottom), Point::new(table.right, bottom), rule());
}

/// Member rows under a table header, with a rule under each row
pub(crate) fn draw_member_rows(
    ctx: &mut DrawContext<'_>,
    page: usize,
    table: &TablePositions,
    rows: impl IntoIterator<Item = Vec<(ColumnKey, String, TextStyle)>>,
) -> usize {
    let mut count = 0;
    for (index, cells) in rows.into_iter().enumerate() {
        let baseline = table.row_baseline(index);
        for (key, text, style) in cells {
            if let Some(cell) = table.cell(key) {
                ctx.text(page, &text, Point::new(cell.x, baseline), &style);
            }
        }
        count += 1;
        let bottom = compute_member_row_y(table.first_member_y, index + 1, table.row_height);
        ctx.line(page, Point::new(table.left, bottom), Point::new(table.right, bottom), rule());
    }
    count
}
