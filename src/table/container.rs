//! The rendered view of the table.
//!
//! A [`Container`] is the document-object model of the review table: a header
//! row and one body row per record, each with a selection control and a delete
//! control. It is derived from the dataset and is thrown away or patched on
//! every change.

use std::fmt::Write as _;

use crate::{
    domain::{Classification, RecordKey, RequirementRecord},
    table::{SortColumn, render::format_confidence},
};

/// The columns of the table, in display order.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Column {
    /// Requirement text. Also the row's selection-preservation key.
    Text,
    /// Label assigned by the model.
    AiClassification,
    /// Model confidence as a percentage.
    Confidence,
    /// The reviewer's selection control.
    UserClassification,
    /// The row's delete control.
    Delete,
}

impl Column {
    /// Every column, in display order.
    pub const ALL: [Self; 5] = [
        Self::Text,
        Self::AiClassification,
        Self::Confidence,
        Self::UserClassification,
        Self::Delete,
    ];

    /// The header label.
    #[must_use]
    pub const fn header(self) -> &'static str {
        match self {
            Self::Text => "Text",
            Self::AiClassification => "AI Classification",
            Self::Confidence => "Confidence",
            Self::UserClassification => "User Classification",
            Self::Delete => "Delete",
        }
    }

    /// The sort activated by this column's header, if it is sortable.
    #[must_use]
    pub const fn sort_column(self) -> Option<SortColumn> {
        match self {
            Self::AiClassification => Some(SortColumn::AiClassification),
            Self::Confidence => Some(SortColumn::Confidence),
            Self::Text | Self::UserClassification | Self::Delete => None,
        }
    }
}

/// A header cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderCell {
    column: Column,
}

impl HeaderCell {
    pub(crate) const fn new(column: Column) -> Self {
        Self { column }
    }

    /// The column this cell heads.
    #[must_use]
    pub const fn column(self) -> Column {
        self.column
    }

    /// The label shown in the cell.
    #[must_use]
    pub const fn label(self) -> &'static str {
        self.column.header()
    }

    /// The sort this header triggers when activated. `None` for inert headers.
    #[must_use]
    pub const fn sort(self) -> Option<SortColumn> {
        self.column.sort_column()
    }
}

/// A drop-down offering the fixed set of classification labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectControl {
    value: Classification,
}

impl SelectControl {
    /// The options listed by the control.
    #[must_use]
    pub const fn options() -> &'static [Classification] {
        &Classification::ALL
    }

    /// The currently selected value.
    #[must_use]
    pub const fn value(self) -> Classification {
        self.value
    }

    /// Changes the selected value.
    pub const fn set(&mut self, value: Classification) {
        self.value = value;
    }
}

/// A control that deletes the record it is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteControl {
    key: RecordKey,
}

impl DeleteControl {
    /// The record this control deletes.
    #[must_use]
    pub const fn key(&self) -> &RecordKey {
        &self.key
    }
}

/// One rendered record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyRow {
    text: String,
    ai_classification: String,
    confidence: String,
    /// The reviewer's classification control.
    pub selection: SelectControl,
    delete: DeleteControl,
}

impl BodyRow {
    pub(crate) fn from_record(record: &RequirementRecord) -> Self {
        Self {
            text: record.text.clone(),
            ai_classification: record.ai_classification.clone(),
            confidence: format_confidence(record.confidence),
            selection: SelectControl::default(),
            delete: DeleteControl { key: record.key() },
        }
    }

    /// Text content of the first cell.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Text content of the AI classification cell.
    #[must_use]
    pub fn ai_classification(&self) -> &str {
        &self.ai_classification
    }

    /// Text content of the confidence cell, e.g. `87%`.
    #[must_use]
    pub fn confidence(&self) -> &str {
        &self.confidence
    }

    /// The delete control.
    #[must_use]
    pub const fn delete(&self) -> &DeleteControl {
        &self.delete
    }

    /// The identity of the record this row displays.
    #[must_use]
    pub const fn key(&self) -> &RecordKey {
        self.delete.key()
    }

    /// The text content of the cell in the given column.
    #[must_use]
    pub fn cell(&self, column: Column) -> &str {
        match column {
            Column::Text => &self.text,
            Column::AiClassification => &self.ai_classification,
            Column::Confidence => &self.confidence,
            Column::UserClassification => self.selection.value().label(),
            Column::Delete => "Delete",
        }
    }
}

/// The table's rendered content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Container {
    header: Vec<HeaderCell>,
    body: Vec<BodyRow>,
}

impl Container {
    /// An empty container.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            header: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Removes all content.
    pub fn clear(&mut self) {
        self.header.clear();
        self.body.clear();
    }

    /// The header cells. Empty until the first render.
    #[must_use]
    pub fn header(&self) -> &[HeaderCell] {
        &self.header
    }

    /// The body rows, in rendered order.
    #[must_use]
    pub fn rows(&self) -> &[BodyRow] {
        &self.body
    }

    /// Returns the body row at `index`.
    #[must_use]
    pub fn row(&self, index: usize) -> Option<&BodyRow> {
        self.body.get(index)
    }

    /// Returns the body row at `index` for modification.
    pub fn row_mut(&mut self, index: usize) -> Option<&mut BodyRow> {
        self.body.get_mut(index)
    }

    pub(crate) fn set_header(&mut self, header: Vec<HeaderCell>) {
        self.header = header;
    }

    pub(crate) fn take_rows(&mut self) -> Vec<BodyRow> {
        std::mem::take(&mut self.body)
    }

    pub(crate) fn push_row(&mut self, row: BodyRow) {
        self.body.push(row);
    }

    /// Writes the container as an HTML table.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut html = String::from("<table>\n  <thead>\n    <tr>");
        for cell in &self.header {
            let attributes = cell.sort().map_or_else(String::new, |sort| {
                format!(" data-sort=\"{}\" style=\"cursor: pointer\"", sort.key())
            });
            let _ = write!(html, "<th{attributes}>{}</th>", escape_html(cell.label()));
        }
        html.push_str("</tr>\n  </thead>\n  <tbody>\n");

        for row in &self.body {
            let _ = write!(
                html,
                "    <tr data-page=\"{}\"><td>{}</td><td>{}</td><td>{}</td><td><select>",
                row.key().page,
                escape_html(row.text()),
                escape_html(row.ai_classification()),
                escape_html(row.confidence()),
            );
            for option in SelectControl::options() {
                let selected = if *option == row.selection.value() {
                    " selected"
                } else {
                    ""
                };
                let label = escape_html(option.label());
                let _ = write!(html, "<option value=\"{label}\"{selected}>{label}</option>");
            }
            html.push_str("</select></td><td><button class=\"delete\">Delete</button></td></tr>\n");
        }

        html.push_str("  </tbody>\n</table>\n");
        html
    }
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
