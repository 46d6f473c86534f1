//! Congregation register: every member on a row, grouped under family headings

use super::{draw_column_rules, draw_table_header, member_cell};
use crate::composer::{DrawContext, PageFlow, Placement, RecordRenderer, TextStyle};
use crate::layout::{table_positions, ColumnKey, LayoutTemplate};
use crate::output::ReportKind;
use crate::templates::register_template;
use crate::{RegisterRow, ReportError, ReportOptions, Result};
use chrono::Datelike;
use pdf_core::{LineStyle, Point};
use tamil_text::parse_iso_date;

#[derive(Debug, Clone)]
pub struct RegisterRenderer {
    template: LayoutTemplate,
}

impl Default for RegisterRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterRenderer {
    pub fn new() -> Self {
        Self {
            template: register_template(),
        }
    }

    pub fn with_template(mut self, template: LayoutTemplate) -> Self {
        self.template = template;
        self
    }

    /// Register year: `year`, else the year of `fromDate`
    fn year(&self, options: &ReportOptions) -> Option<i32> {
        options.year.map(|y| y as i32).or_else(|| {
            options
                .from_date
                .as_deref()
                .and_then(|d| parse_iso_date(d).ok())
                .map(|d| d.year())
        })
    }

    fn starts_family(row: &RegisterRow, previous: Option<&RegisterRow>) -> bool {
        previous.map_or(true, |p| p.family_id != row.family_id)
    }
}

impl RecordRenderer for RegisterRenderer {
    type Record = RegisterRow;

    fn kind(&self) -> ReportKind {
        ReportKind::CongregationRegister
    }

    fn template(&self) -> &LayoutTemplate {
        &self.template
    }

    fn validate(&self, options: &ReportOptions) -> Result<()> {
        match options.from_date.as_deref().map(str::trim) {
            Some(from) if !from.is_empty() => parse_iso_date(from)
                .map(|_| ())
                .map_err(|_| ReportError::InvalidDate(from.to_string())),
            _ => Ok(()),
        }
    }

    fn title(&self, options: &ReportOptions) -> String {
        match self.year(options) {
            Some(year) => format!("Congregation Register {year}"),
            None => "Congregation Register".to_string(),
        }
    }

    fn file_stamp(&self, options: &ReportOptions) -> String {
        self.year(options)
            .map(|y| y.to_string())
            .unwrap_or_else(|| "all".to_string())
    }

    fn flow(&self) -> PageFlow {
        PageFlow::Rows
    }

    fn accepts(&self, row: &RegisterRow) -> bool {
        if !row.member.has_name() {
            log::warn!(
                "skipping unnamed register row {:?} of family {:?}",
                row.member.member_id,
                row.family_id
            );
        }
        row.member.has_name()
    }

    fn in_area(&self, row: &RegisterRow, area: &str) -> bool {
        row.in_area(area)
    }

    fn area_name(&self, row: &RegisterRow) -> Option<String> {
        Some(row.area_name.clone())
    }

    fn record_height(
        &self,
        row: &RegisterRow,
        previous: Option<&RegisterRow>,
        page_start: bool,
    ) -> f64 {
        let rows = if page_start || Self::starts_family(row, previous) {
            2.0
        } else {
            1.0
        };
        rows * self.template.table.row_height
    }

    fn draw_page_furniture(&self, ctx: &mut DrawContext<'_>, page: usize, top: f64) -> f64 {
        let table = table_positions(&self.template.table, top);
        draw_table_header(ctx, page, &table, self.template.table.header_size);
        table.header_bottom
    }

    fn draw_record(
        &self,
        ctx: &mut DrawContext<'_>,
        page: usize,
        row: &RegisterRow,
        placement: Placement,
        previous: Option<&RegisterRow>,
    ) {
        let Placement::Row {
            y,
            page_start,
            index,
        } = placement
        else {
            log::warn!("register rows need a row placement, got {placement:?}");
            return;
        };
        let layout = &self.template.table;
        let mut table = table_positions(layout, y);
        table.first_member_y = y;

        let new_family = Self::starts_family(row, previous);
        if page_start || new_family {
            let mut heading = row.family_heading();
            if !new_family {
                heading.push_str(" (contd.)");
            }
            let at = Point::new(table.left + layout.cell_padding, table.row_baseline(0));
            ctx.text(page, &heading, at, &TextStyle::new(layout.cell_size).bold());
            let bottom = table.bottom_after(1);
            let rule = LineStyle::default();
            ctx.line(page, Point::new(table.left, y), Point::new(table.left, bottom), rule);
            ctx.line(page, Point::new(table.right, y), Point::new(table.right, bottom), rule);
            ctx.line(page, Point::new(table.left, bottom), Point::new(table.right, bottom), rule);
            table.first_member_y = bottom;
        }

        let cell = TextStyle::new(layout.cell_size);
        let baseline = table.row_baseline(0);
        for column in &layout.columns {
            let text = match column.key {
                ColumnKey::FamilyNumber => row.family_number.clone(),
                ColumnKey::Area => row.area_name.clone(),
                key => member_cell(&row.member, key, index + 1),
            };
            if let Some(slot) = table.cell(column.key) {
                ctx.text(page, &text, Point::new(slot.x, baseline), &cell);
            }
        }
        draw_column_rules(
            ctx,
            page,
            &table,
            table.first_member_y,
            table.bottom_after(1),
        );
    }
}
