use comfy_table::{presets::ASCII_FULL, Attribute, Cell, ContentArrangement, Table};

/// Table with a header row in bold.
pub fn table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            header
                .iter()
                .map(|title| Cell::new(title).add_attribute(Attribute::Bold)),
        );
    table
}

/// Listing where each row keeps the index it has in the unfiltered list, so
/// the operator can select by number after searching.
pub fn numbered<'a>(
    header: &[&str],
    rows: impl IntoIterator<Item = (usize, &'a str, Vec<String>)>,
    filter: &str,
) -> Table {
    let mut full_header = vec!["Number"];
    full_header.extend_from_slice(header);
    let mut table = table(&full_header);

    for (index, name, row) in rows {
        if !name.contains(filter) {
            continue;
        }
        let mut cells = vec![index.to_string()];
        cells.extend(row);
        table.add_row(cells);
    }
    table
}
