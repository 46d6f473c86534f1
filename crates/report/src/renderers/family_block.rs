//! Birthday and wedding day lists: one block per family, two blocks per page

use super::{
    draw_column_rules, draw_member_rows, draw_table_header, member_cell, required_date_range,
};
use crate::composer::{DrawContext, PageFlow, Placement, RecordRenderer, TextStyle};
use crate::layout::{
    clamp_members, compute_positions, ColumnKey, FieldKind, FrameKind, LayoutTemplate,
};
use crate::output::ReportKind;
use crate::templates::{birthday_template, wedding_template};
use crate::{FamilyGroup, FamilyRecord, MemberRecord, ReportConfig, ReportOptions, Result};
use tamil_text::{file_date_stamp, format_date_range};

/// Draws a family's details and its member table into a template slot
#[derive(Debug, Clone)]
pub struct FamilyBlockRenderer {
    kind: ReportKind,
    template: LayoutTemplate,
    per_page: usize,
    max_members: usize,
}

impl FamilyBlockRenderer {
    pub fn birthday(config: &ReportConfig) -> Self {
        Self::new(ReportKind::Birthday, birthday_template(), config)
    }

    pub fn wedding(config: &ReportConfig) -> Self {
        Self::new(ReportKind::Wedding, wedding_template(), config)
    }

    fn new(kind: ReportKind, template: LayoutTemplate, config: &ReportConfig) -> Self {
        let max_members = config.max_members_per_family;
        let per_page = slots_on_page(&template, config.families_per_page, max_members);
        Self {
            kind,
            template,
            per_page,
            max_members,
        }
    }

    /// Replace the template; families per page shrink if the new slots do not fit
    pub fn with_template(mut self, template: LayoutTemplate) -> Self {
        self.per_page = slots_on_page(&template, self.per_page, self.max_members);
        self.template = template;
        self
    }

    fn title_prefix(&self) -> &'static str {
        match self.kind {
            ReportKind::Wedding => "Wedding Day List",
            _ => "Birthday List",
        }
    }

    fn draw_block(&self, ctx: &mut DrawContext<'_>, page: usize, group: &FamilyGroup, index: usize) {
        let template = &self.template;
        let positions = compute_positions(template, index);
        let label = TextStyle::new(template.label_size).bold();
        let value = TextStyle::new(template.value_size);
        let family = &group.family;

        for field in &positions.fields {
            let text = field_text(family, field.kind);
            if text.trim().is_empty() {
                continue;
            }
            ctx.text(page, &field.label, field.label_at, &label);
            ctx.text(page, &text, field.value_at, &value);
        }

        for frame in &positions.frames {
            let text = match frame.kind {
                FrameKind::Address => &family.address,
                FrameKind::Notes => &family.prayer_or_notes_text,
            };
            if text.trim().is_empty() {
                continue;
            }
            ctx.text(page, &frame.label, frame.label_at, &label);
            ctx.text_in_frame(page, text, frame.frame, frame.line_height, &value);
        }

        let named: Vec<&MemberRecord> = group
            .members
            .iter()
            .filter(|m| {
                if !m.has_name() {
                    log::warn!(
                        "skipping unnamed member {:?} of family {:?}",
                        m.member_id,
                        family.family_id
                    );
                }
                m.has_name()
            })
            .collect();
        let (members, _) = clamp_members(&named, self.max_members);

        let table = &positions.table;
        draw_table_header(ctx, page, table, template.table.header_size);
        draw_column_rules(
            ctx,
            page,
            table,
            table.first_member_y,
            table.bottom_after(members.len()),
        );

        let cell = TextStyle::new(template.table.cell_size);
        let rows = members.iter().enumerate().map(|(i, member)| {
            let celebrant = group.is_celebrant(member);
            template
                .table
                .columns
                .iter()
                .map(|column| match column.key {
                    ColumnKey::Name if celebrant => (
                        column.key,
                        format!("{}{}", template.celebrant_marker, member.display_name()),
                        cell.emphasis(true),
                    ),
                    key => (key, member_cell(member, key, i + 1), cell),
                })
                .collect::<Vec<_>>()
        });
        draw_member_rows(ctx, page, table, rows);
    }
}

/// Number of slots, up to `requested`, whose fullest member table stays inside the border
///
/// The first slot is always kept.
fn slots_on_page(template: &LayoutTemplate, requested: usize, max_members: usize) -> usize {
    let requested = requested.max(1);
    let fitting = (1..requested)
        .take_while(|&slot| {
            compute_positions(template, slot)
                .table
                .bottom_after(max_members)
                >= template.border.margin
        })
        .count()
        + 1;
    if fitting < requested {
        log::warn!(
            "familiesPerPage {requested} does not fit the page, using {fitting}"
        );
    }
    fitting
}

fn field_text(family: &FamilyRecord, kind: FieldKind) -> String {
    match kind {
        FieldKind::FamilyNumber => family.family_number(),
        FieldKind::HeadName => family.display_head(),
        FieldKind::Phone => family.phone.trim().to_string(),
        FieldKind::Area => family.area_name.trim().to_string(),
    }
}

impl RecordRenderer for FamilyBlockRenderer {
    type Record = FamilyGroup;

    fn kind(&self) -> ReportKind {
        self.kind
    }

    fn template(&self) -> &LayoutTemplate {
        &self.template
    }

    fn validate(&self, options: &ReportOptions) -> Result<()> {
        required_date_range(options).map(|_| ())
    }

    fn title(&self, options: &ReportOptions) -> String {
        match required_date_range(options) {
            Ok((from, to)) => format!("{} {}", self.title_prefix(), format_date_range(from, to)),
            Err(_) => self.title_prefix().to_string(),
        }
    }

    fn file_stamp(&self, options: &ReportOptions) -> String {
        required_date_range(options)
            .map(|(from, _)| file_date_stamp(from))
            .unwrap_or_else(|_| "all".to_string())
    }

    fn flow(&self) -> PageFlow {
        PageFlow::Slots {
            per_page: self.per_page,
        }
    }

    fn accepts(&self, group: &FamilyGroup) -> bool {
        if group.family.head_name.trim().is_empty() {
            log::warn!("skipping family {:?}: no head name", group.family.family_id);
            return false;
        }
        true
    }

    fn in_area(&self, group: &FamilyGroup, area: &str) -> bool {
        group.family.in_area(area)
    }

    fn area_name(&self, group: &FamilyGroup) -> Option<String> {
        Some(group.family.area_name.clone())
    }

    fn draw_record(
        &self,
        ctx: &mut DrawContext<'_>,
        page: usize,
        group: &FamilyGroup,
        placement: Placement,
        _previous: Option<&FamilyGroup>,
    ) {
        let index = match placement {
            Placement::Slot { index } => index,
            Placement::Row { .. } => 0,
        };
        self.draw_block(ctx, page, group, index);
    }
}
