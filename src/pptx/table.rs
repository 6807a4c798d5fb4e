//! Tables (`a:tbl` inside a graphic frame).

use super::presentation::Presentation;
use super::text::{TextFrame, TextFrameMut, TextLocation};
use crate::error::{Error, Result};
use crate::model::ShapeKey;
use crate::options::DEFAULT_ROW_HEIGHT_EMU;
use crate::xml::XmlElement;

fn table_of(frame: &XmlElement) -> Option<&XmlElement> {
    frame.path(&["graphic", "graphicData", "tbl"])
}

fn table_of_mut(frame: &mut XmlElement) -> Option<&mut XmlElement> {
    frame.path_mut(&["graphic", "graphicData", "tbl"])
}

/// The `a:tc` element at `(row, column)`.
pub(crate) fn cell_element(frame: &XmlElement, row: usize, column: usize) -> Option<&XmlElement> {
    table_of(frame)?
        .children_named("tr")
        .nth(row)?
        .children_named("tc")
        .nth(column)
}

pub(crate) fn cell_element_mut(
    frame: &mut XmlElement,
    row: usize,
    column: usize,
) -> Option<&mut XmlElement> {
    let tbl = table_of_mut(frame)?;
    let row_pos = tbl.elements().enumerate().filter(|(_, e)| e.is("tr")).nth(row)?.0;
    let tr = tbl.element_at_mut(row_pos)?;
    let cell_pos = tr.elements().enumerate().filter(|(_, e)| e.is("tc")).nth(column)?.0;
    tr.element_at_mut(cell_pos)
}

/// An empty cell with one empty paragraph.
fn empty_cell() -> XmlElement {
    XmlElement::new("a:tc")
        .with_child(
            XmlElement::new("a:txBody")
                .with_child(XmlElement::new("a:bodyPr"))
                .with_child(XmlElement::new("a:lstStyle"))
                .with_child(XmlElement::new("a:p")),
        )
        .with_child(XmlElement::new("a:tcPr"))
}

/// Read view of a table shape.
#[derive(Clone)]
pub struct Table<'a> {
    pres: &'a Presentation,
    key: ShapeKey,
}

impl<'a> Table<'a> {
    pub(crate) fn new(pres: &'a Presentation, key: ShapeKey) -> Self {
        Self { pres, key }
    }

    fn table(&self) -> Option<&'a XmlElement> {
        table_of(self.pres.element(&self.key).ok()?)
    }

    pub fn row_count(&self) -> usize {
        self.table().map_or(0, |t| t.children_named("tr").count())
    }

    pub fn column_count(&self) -> usize {
        self.table()
            .and_then(|t| t.child("tblGrid"))
            .map_or(0, |g| g.children_named("gridCol").count())
    }

    /// Column widths in EMU (`a:gridCol/@w`).
    pub fn column_widths(&self) -> Vec<i64> {
        self.table()
            .and_then(|t| t.child("tblGrid"))
            .map(|g| {
                g.children_named("gridCol")
                    .map(|c| c.attr_parse("w").unwrap_or(0))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Row heights in EMU (`a:tr/@h`).
    pub fn row_heights(&self) -> Vec<i64> {
        self.table()
            .map(|t| {
                t.children_named("tr")
                    .map(|r| r.attr_parse("h").unwrap_or(DEFAULT_ROW_HEIGHT_EMU))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Text frame of a cell.
    pub fn cell(&self, row: usize, column: usize) -> Option<TextFrame<'a>> {
        let frame = self.pres.element(&self.key).ok()?;
        cell_element(frame, row, column)?.child("txBody")?;
        Some(TextFrame::new(
            self.pres,
            TextLocation::cell(self.key.clone(), row, column),
        ))
    }

    /// Cell texts row by row.
    pub fn texts(&self) -> Vec<Vec<String>> {
        (0..self.row_count())
            .map(|r| {
                (0..self.column_count())
                    .map(|c| self.cell(r, c).map(|tf| tf.text()).unwrap_or_default())
                    .collect()
            })
            .collect()
    }
}

/// Editable table.
pub struct TableMut<'a> {
    pres: &'a mut Presentation,
    key: ShapeKey,
}

impl<'a> TableMut<'a> {
    pub(crate) fn new(pres: &'a mut Presentation, key: ShapeKey) -> Self {
        Self { pres, key }
    }

    pub fn as_table(&self) -> Table<'_> {
        Table::new(self.pres, self.key.clone())
    }

    pub fn cell_mut(&mut self, row: usize, column: usize) -> Result<TextFrameMut<'_>> {
        if self.as_table().cell(row, column).is_none() {
            return Err(Error::InvalidData(format!(
                "{}: no cell ({}, {})",
                self.key, row, column
            )));
        }
        Ok(TextFrameMut::new(
            &mut *self.pres,
            TextLocation::cell(self.key.clone(), row, column),
        ))
    }

    /// Set the text of a cell.
    pub fn set_cell_text(&mut self, row: usize, column: usize, text: &str) -> Result<()> {
        self.cell_mut(row, column)?.set_text(text)
    }

    /// Append a row of empty cells at the default row height and grow the
    /// frame by that height. Returns the new row index.
    pub fn add_row(&mut self) -> Result<usize> {
        let columns = self.as_table().column_count();
        let key = self.key.clone();
        let frame = self.pres.element_mut(&key)?;
        let tbl = table_of_mut(frame)
            .ok_or_else(|| Error::MissingComponent(format!("{}: a:tbl", key)))?;

        let index = tbl.children_named("tr").count();
        let mut row = XmlElement::new("a:tr").with_attr("h", DEFAULT_ROW_HEIGHT_EMU.to_string());
        for _ in 0..columns {
            row.append_element(empty_cell());
        }
        let at = tbl.position_of("extLst").unwrap_or(tbl.element_count());
        tbl.insert_element(at, row);

        if let Some(ext) = frame.path_mut(&["xfrm", "ext"]) {
            let cy = ext.attr_parse::<i64>("cy").unwrap_or(0) + DEFAULT_ROW_HEIGHT_EMU;
            ext.set_attr("cy", cy.to_string());
        }
        Ok(index)
    }

    /// Remove a row and shrink the frame by its height.
    pub fn remove_row(&mut self, index: usize) -> Result<()> {
        let key = self.key.clone();
        let frame = self.pres.element_mut(&key)?;
        let tbl = table_of_mut(frame)
            .ok_or_else(|| Error::MissingComponent(format!("{}: a:tbl", key)))?;
        let pos = tbl
            .elements()
            .enumerate()
            .filter(|(_, e)| e.is("tr"))
            .nth(index)
            .map(|(i, _)| i)
            .ok_or_else(|| Error::InvalidData(format!("{}: no row {}", key, index)))?;
        let removed = tbl.remove_element(pos);
        let height = removed
            .and_then(|r| r.attr_parse::<i64>("h"))
            .unwrap_or(DEFAULT_ROW_HEIGHT_EMU);

        if let Some(ext) = frame.path_mut(&["xfrm", "ext"]) {
            let cy = (ext.attr_parse::<i64>("cy").unwrap_or(0) - height).max(0);
            ext.set_attr("cy", cy.to_string());
        }
        Ok(())
    }
}
