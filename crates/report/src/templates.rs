//! Built-in layout templates
//!
//! All three reports share the A4 page, the header and the border. Family
//! block reports stack two blocks per page; the register flows rows under a
//! repeated table header.

use crate::layout::{
    BorderLayout, Column, ColumnKey, FieldKind, FieldSlot, FrameKind, FrameSlot, HeaderLayout,
    LayoutTemplate, TableLayout,
};
use pdf_core::A4;

const LEFT: f64 = 30.0;
const RIGHT: f64 = 565.28;

fn header() -> HeaderLayout {
    HeaderLayout {
        diocese_y: 805.0,
        church_y: 788.0,
        title_y: 770.0,
        rule_y: 760.0,
        diocese_size: 11.0,
        church_size: 14.0,
        title_size: 12.0,
    }
}

fn border() -> BorderLayout {
    BorderLayout {
        margin: 20.0,
        line_width: 1.0,
    }
}

fn column(key: ColumnKey, title: &str, x: f64, width: f64) -> Column {
    Column {
        key,
        title: title.to_string(),
        x,
        width,
        header_angle: 0.0,
    }
}

fn rotated(key: ColumnKey, title: &str, x: f64, width: f64) -> Column {
    Column {
        header_angle: 90.0,
        ..column(key, title, x, width)
    }
}

fn table(columns: Vec<Column>, top_dy: f64) -> TableLayout {
    TableLayout {
        left: LEFT,
        right: RIGHT,
        top_dy,
        header_height: 34.0,
        row_height: 16.0,
        text_inset: 11.5,
        cell_padding: 2.0,
        header_size: 9.0,
        cell_size: 9.0,
        columns,
    }
}

fn field(kind: FieldKind, label: &str, label_x: f64, value_x: f64, dy: f64) -> FieldSlot {
    FieldSlot {
        kind,
        label: label.to_string(),
        label_x,
        value_x,
        dy,
    }
}

fn family_fields() -> Vec<FieldSlot> {
    vec![
        field(FieldKind::FamilyNumber, "Family No:", LEFT, 95.0, 0.0),
        field(FieldKind::Area, "Area:", 300.0, 335.0, 0.0),
        field(FieldKind::HeadName, "Head:", LEFT, 95.0, -16.0),
        field(FieldKind::Phone, "Phone:", 300.0, 340.0, -16.0),
    ]
}

fn family_frames() -> Vec<FrameSlot> {
    vec![
        FrameSlot {
            kind: FrameKind::Address,
            label: "Address:".to_string(),
            label_x: LEFT,
            x: 95.0,
            dy: -24.0,
            width: 195.0,
            height: 36.0,
            line_height: 12.0,
        },
        FrameSlot {
            kind: FrameKind::Notes,
            label: "Prayer:".to_string(),
            label_x: 300.0,
            x: 345.0,
            dy: -24.0,
            width: RIGHT - 345.0,
            height: 36.0,
            line_height: 12.0,
        },
    ]
}

fn family_template(columns: Vec<Column>) -> LayoutTemplate {
    LayoutTemplate {
        page_width: A4.width,
        page_height: A4.height,
        header: header(),
        border: border(),
        base_y: 740.0,
        vertical_spacing: 355.0,
        label_size: 10.0,
        value_size: 10.0,
        fields: family_fields(),
        frames: family_frames(),
        table: table(columns, -68.0),
        celebrant_marker: "* ".to_string(),
        continuation_top: 805.0,
        bottom_limit: 30.0,
    }
}

/// Birthday list: member table with baptism and confirmation columns
pub fn birthday_template() -> LayoutTemplate {
    family_template(vec![
        column(ColumnKey::Serial, "S.No", LEFT, 28.0),
        column(ColumnKey::Name, "Name", 58.0, 130.0),
        column(ColumnKey::Relation, "Relation", 188.0, 62.0),
        column(ColumnKey::Sex, "Sex", 250.0, 30.0),
        column(ColumnKey::Age, "Age", 280.0, 30.0),
        column(ColumnKey::Occupation, "Occupation", 310.0, 85.0),
        column(ColumnKey::WorkingPlace, "Working Place", 395.0, 110.0),
        rotated(ColumnKey::Baptised, "Bapt.", 505.0, 30.0),
        rotated(ColumnKey::Confirmed, "Conf.", 535.0, RIGHT - 535.0),
    ])
}

/// Wedding day list: same block, working place takes the sacrament columns' room
pub fn wedding_template() -> LayoutTemplate {
    family_template(vec![
        column(ColumnKey::Serial, "S.No", LEFT, 28.0),
        column(ColumnKey::Name, "Name", 58.0, 130.0),
        column(ColumnKey::Relation, "Relation", 188.0, 62.0),
        column(ColumnKey::Sex, "Sex", 250.0, 30.0),
        column(ColumnKey::Age, "Age", 280.0, 30.0),
        column(ColumnKey::Occupation, "Occupation", 310.0, 85.0),
        column(ColumnKey::WorkingPlace, "Working Place", 395.0, RIGHT - 395.0),
    ])
}

/// Congregation register: one row per member, grouped under family headings
pub fn register_template() -> LayoutTemplate {
    LayoutTemplate {
        page_width: A4.width,
        page_height: A4.height,
        header: header(),
        border: border(),
        base_y: 750.0,
        vertical_spacing: 0.0,
        label_size: 10.0,
        value_size: 10.0,
        fields: Vec::new(),
        frames: Vec::new(),
        table: table(
            vec![
                column(ColumnKey::Serial, "S.No", LEFT, 26.0),
                column(ColumnKey::FamilyNumber, "Family No", 56.0, 50.0),
                column(ColumnKey::Name, "Name", 106.0, 130.0),
                column(ColumnKey::Relation, "Relation", 236.0, 60.0),
                column(ColumnKey::Sex, "Sex", 296.0, 28.0),
                column(ColumnKey::Age, "Age", 324.0, 28.0),
                column(ColumnKey::Occupation, "Occupation", 352.0, 85.0),
                column(ColumnKey::Area, "Area", 437.0, 68.0),
                rotated(ColumnKey::Baptised, "Bapt.", 505.0, 30.0),
                rotated(ColumnKey::Confirmed, "Conf.", 535.0, RIGHT - 535.0),
            ],
            0.0,
        ),
        celebrant_marker: String::new(),
        continuation_top: 805.0,
        bottom_limit: 30.0,
    }
}
