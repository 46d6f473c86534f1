//! Family block layout
//!
//! A [`LayoutTemplate`] describes the first record slot on a page in page
//! coordinates (origin bottom-left, +y up). Every other slot is the same
//! template shifted down by `record_index * vertical_spacing`. Only the
//! member table grows with the data: rows and the closing rule move with the
//! member count.

use pdf_core::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Which family field a label/value pair shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKind {
    FamilyNumber,
    HeadName,
    Phone,
    Area,
}

/// Which family text goes into a wrapped frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FrameKind {
    Address,
    Notes,
}

/// Member table column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColumnKey {
    Serial,
    FamilyNumber,
    Name,
    Relation,
    Sex,
    Age,
    Occupation,
    WorkingPlace,
    Area,
    Baptised,
    Confirmed,
}

/// A label and its value on one baseline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSlot {
    pub kind: FieldKind,
    pub label: String,
    pub label_x: f64,
    pub value_x: f64,
    /// Baseline offset from the slot's base y
    pub dy: f64,
}

/// A label beside a fixed-size text frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameSlot {
    pub kind: FrameKind,
    pub label: String,
    pub label_x: f64,
    pub x: f64,
    /// Offset of the frame's top edge from the slot's base y
    pub dy: f64,
    pub width: f64,
    pub height: f64,
    pub line_height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub key: ColumnKey,
    pub title: String,
    /// Left rule of the column
    pub x: f64,
    pub width: f64,
    /// Header text rotation in degrees, counter-clockwise
    #[serde(default)]
    pub header_angle: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableLayout {
    pub left: f64,
    pub right: f64,
    /// Offset of the table's top rule from the slot's base y
    pub top_dy: f64,
    pub header_height: f64,
    pub row_height: f64,
    /// Distance from a row's top edge down to its text baseline
    pub text_inset: f64,
    pub cell_padding: f64,
    pub header_size: f32,
    pub cell_size: f32,
    pub columns: Vec<Column>,
}

/// Page-one header lines, centred on the page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderLayout {
    pub diocese_y: f64,
    pub church_y: f64,
    pub title_y: f64,
    /// Rule under the header
    pub rule_y: f64,
    pub diocese_size: f32,
    pub church_size: f32,
    pub title_size: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BorderLayout {
    pub margin: f64,
    pub line_width: f64,
}

/// Fixed coordinates of one report type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutTemplate {
    pub page_width: f64,
    pub page_height: f64,
    pub header: HeaderLayout,
    pub border: BorderLayout,
    /// Base y of the first record slot
    pub base_y: f64,
    /// Distance between consecutive record slots
    pub vertical_spacing: f64,
    pub label_size: f32,
    pub value_size: f32,
    #[serde(default)]
    pub fields: Vec<FieldSlot>,
    #[serde(default)]
    pub frames: Vec<FrameSlot>,
    pub table: TableLayout,
    /// Prefix drawn before a celebrant's name
    pub celebrant_marker: String,
    /// Top of the row flow on pages after the first
    pub continuation_top: f64,
    /// Rows never extend below this y
    pub bottom_limit: f64,
}

impl LayoutTemplate {
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// The page border rectangle
    pub fn border_rect(&self) -> Rect {
        let m = self.border.margin;
        Rect::new(m, m, self.page_width - 2.0 * m, self.page_height - 2.0 * m)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldPosition {
    pub kind: FieldKind,
    pub label: String,
    pub label_at: Point,
    pub value_at: Point,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FramePosition {
    pub kind: FrameKind,
    pub label: String,
    pub label_at: Point,
    pub frame: Rect,
    pub line_height: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeaderCell {
    pub key: ColumnKey,
    pub title: String,
    pub frame: Rect,
    pub angle: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellSlot {
    pub key: ColumnKey,
    /// Text start x
    pub x: f64,
    /// Usable width inside the padding
    pub width: f64,
}

/// Absolute table geometry for one block
#[derive(Debug, Clone, PartialEq)]
pub struct TablePositions {
    pub top: f64,
    pub header_bottom: f64,
    /// Top edge of the first member row
    pub first_member_y: f64,
    pub left: f64,
    pub right: f64,
    pub row_height: f64,
    pub text_inset: f64,
    /// Vertical rule x positions, left edge first, right edge last
    pub rule_xs: Vec<f64>,
    pub headers: Vec<HeaderCell>,
    pub cells: Vec<CellSlot>,
}

impl TablePositions {
    /// Text baseline of member row `index`
    pub fn row_baseline(&self, index: usize) -> f64 {
        compute_member_row_y(self.first_member_y, index, self.row_height) - self.text_inset
    }

    /// Y of the rule closing a table of `member_count` rows
    pub fn bottom_after(&self, member_count: usize) -> f64 {
        compute_dynamic_line_y(self.first_member_y, member_count, self.row_height)
    }

    pub fn cell(&self, key: ColumnKey) -> Option<&CellSlot> {
        self.cells.iter().find(|c| c.key == key)
    }
}

/// Absolute positions of every element of one record slot
#[derive(Debug, Clone, PartialEq)]
pub struct PositionSet {
    pub base_y: f64,
    pub fields: Vec<FieldPosition>,
    pub frames: Vec<FramePosition>,
    pub table: TablePositions,
}

/// Positions for the record at `record_index` on a page
pub fn compute_positions(template: &LayoutTemplate, record_index: usize) -> PositionSet {
    let base_y = template.base_y - record_index as f64 * template.vertical_spacing;

    let fields = template
        .fields
        .iter()
        .map(|slot| FieldPosition {
            kind: slot.kind,
            label: slot.label.clone(),
            label_at: Point::new(slot.label_x, base_y + slot.dy),
            value_at: Point::new(slot.value_x, base_y + slot.dy),
        })
        .collect();

    let frames = template
        .frames
        .iter()
        .map(|slot| {
            let top = base_y + slot.dy;
            FramePosition {
                kind: slot.kind,
                label: slot.label.clone(),
                label_at: Point::new(slot.label_x, top - template.label_size as f64),
                frame: Rect::new(slot.x, top - slot.height, slot.width, slot.height),
                line_height: slot.line_height,
            }
        })
        .collect();

    PositionSet {
        base_y,
        fields,
        frames,
        table: table_positions(&template.table, base_y + template.table.top_dy),
    }
}

/// Table geometry with its top rule at `top`
pub fn table_positions(table: &TableLayout, top: f64) -> TablePositions {
    let header_bottom = top - table.header_height;

    let mut rule_xs: Vec<f64> = table.columns.iter().map(|c| c.x).collect();
    rule_xs.push(table.right);

    let headers = table
        .columns
        .iter()
        .map(|c| HeaderCell {
            key: c.key,
            title: c.title.clone(),
            frame: Rect::new(c.x, header_bottom, c.width, table.header_height),
            angle: c.header_angle,
        })
        .collect();

    let cells = table
        .columns
        .iter()
        .map(|c| CellSlot {
            key: c.key,
            x: c.x + table.cell_padding,
            width: (c.width - 2.0 * table.cell_padding).max(0.0),
        })
        .collect();

    TablePositions {
        top,
        header_bottom,
        first_member_y: header_bottom,
        left: table.left,
        right: table.right,
        row_height: table.row_height,
        text_inset: table.text_inset,
        rule_xs,
        headers,
        cells,
    }
}

/// Y of member row `member_index`, counting down from the first row
pub fn compute_member_row_y(first_member_y: f64, member_index: usize, row_height: f64) -> f64 {
    first_member_y - member_index as f64 * row_height
}

/// Y just past `member_count` rows: the closing rule and the bottom of the column rules
pub fn compute_dynamic_line_y(first_member_y: f64, member_count: usize, row_height: f64) -> f64 {
    first_member_y - member_count as f64 * row_height
}

/// Keep at most `max` members, returning the kept slice and how many were dropped
pub fn clamp_members<T>(members: &[T], max: usize) -> (&[T], usize) {
    if members.len() <= max {
        return (members, 0);
    }
    let dropped = members.len() - max;
    log::warn!(
        "family has {} members, only the first {max} fit the block; dropping {dropped}",
        members.len()
    );
    (&members[..max], dropped)
}

/// Rotate `point` about `center` by `angle_deg`, counter-clockwise
pub fn rotate_point(point: Point, center: Point, angle_deg: f64) -> Point {
    let (sin, cos) = angle_deg.to_radians().sin_cos();
    let dx = point.x - center.x;
    let dy = point.y - center.y;
    Point::new(
        center.x + dx * cos - dy * sin,
        center.y + dx * sin + dy * cos,
    )
}

/// Where to anchor rotated content centred in a frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotatedPlacement {
    /// Content's own lower-left corner after rotation; the rotation pivot
    pub origin: Point,
    pub angle: f64,
    /// Longest run that fits along the rotated baseline
    pub available_width: f64,
    /// Room across the rotated baseline
    pub available_height: f64,
}

/// Centre `content_width` x `content_height` in `frame`, rotated by `angle_deg`
///
/// The content is laid out in a box whose width and height are the frame's
/// swapped for a quarter turn, then mapped back to page space around the
/// frame centre.
pub fn place_rotated(
    frame: Rect,
    content_width: f64,
    content_height: f64,
    angle_deg: f64,
) -> RotatedPlacement {
    let center = frame.center();
    let local_origin = Point::new(
        center.x - content_width / 2.0,
        center.y - content_height / 2.0,
    );
    let origin = rotate_point(local_origin, center, angle_deg);

    let (sin, cos) = angle_deg.to_radians().sin_cos();
    let (sin, cos) = (sin.abs(), cos.abs());
    let fit = |extent_x: f64, extent_y: f64, ux: f64, uy: f64| {
        let along_x = if ux > 1e-9 { extent_x / ux } else { f64::INFINITY };
        let along_y = if uy > 1e-9 { extent_y / uy } else { f64::INFINITY };
        along_x.min(along_y)
    };

    RotatedPlacement {
        origin,
        angle: angle_deg,
        available_width: fit(frame.width, frame.height, cos, sin),
        available_height: fit(frame.width, frame.height, sin, cos),
    }
}
