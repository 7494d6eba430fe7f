use super::columns::Table;

pub(super) fn encode(table: &Table) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(Vec::new());

    writer.write_record(&table.header)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }

    writer
        .into_inner()
        .map_err(|err| csv::Error::from(err.into_error()))
}
