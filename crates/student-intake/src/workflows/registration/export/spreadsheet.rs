use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook, XlsxError};

use super::columns::Table;

const SHEET_NAME: &str = "Submissions";
const COLUMN_WIDTH: f64 = 15.0;
const HEADER_FILL: u32 = 0x008000;

pub(super) fn encode(table: &Table) -> Result<Vec<u8>, XlsxError> {
    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(Color::RGB(HEADER_FILL))
        .set_border(FormatBorder::Thin);
    let cell_format = Format::new().set_border(FormatBorder::Thin);

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, label) in table.header.iter().enumerate() {
        let col = column_index(col)?;
        worksheet.write_string_with_format(0, col, *label, &header_format)?;
        worksheet.set_column_width(col, COLUMN_WIDTH)?;
    }

    for (row, values) in table.rows.iter().enumerate() {
        let row = u32::try_from(row + 1).map_err(|_| XlsxError::RowColumnLimitError)?;
        for (col, value) in values.iter().enumerate() {
            let col = column_index(col)?;
            if value.is_empty() {
                worksheet.write_blank(row, col, &cell_format)?;
            } else {
                worksheet.write_string_with_format(row, col, value, &cell_format)?;
            }
        }
    }

    workbook.save_to_buffer()
}

fn column_index(col: usize) -> Result<u16, XlsxError> {
    u16::try_from(col).map_err(|_| XlsxError::RowColumnLimitError)
}
