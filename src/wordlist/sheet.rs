//! Spreadsheet word lists: one lesson per worksheet.

use std::path::Path;

use calamine::{Data, Range, Reader, open_workbook_auto};
use log::debug;

use crate::error::Result;

use super::{Lesson, WordList};

/// Read every worksheet of a workbook as a lesson named after the sheet.
pub fn parse_workbook(path: &Path) -> Result<WordList> {
    let mut workbook = open_workbook_auto(path)?;
    let mut lessons = Vec::new();

    for name in workbook.sheet_names() {
        let range = workbook.worksheet_range(&name)?;
        let words = first_column(&range);
        debug!("Sheet {name:?}: {} words", words.len());
        lessons.push(Lesson { name, words });
    }

    Ok(WordList::new(lessons))
}

/// Non-empty values of column A across the populated row range.
fn first_column(range: &Range<Data>) -> Vec<String> {
    let (Some((first_row, _)), Some((last_row, _))) = (range.start(), range.end()) else {
        return Vec::new();
    };

    (first_row..=last_row)
        .filter_map(|row| range.get_value((row, 0)))
        .filter_map(cell_text)
        .collect()
}

fn cell_text(cell: &Data) -> Option<String> {
    if matches!(cell, Data::Empty) {
        return None;
    }
    let text = cell.to_string();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}
