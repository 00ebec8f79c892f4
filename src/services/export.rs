use std::io::{self, Write};

use crate::domain::job::{JobRecord, COLUMNS};

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

fn write_row<W: Write>(w: &mut W, row: &[&str]) -> io::Result<()> {
    let mut first = true;
    for cell in row {
        if !first {
            write!(w, ",")?;
        } else {
            first = false;
        }
        if needs_quotes(cell) {
            let escaped = cell.replace('"', "\"\"");
            write!(w, "\"{}\"", escaped)?;
        } else {
            write!(w, "{}", cell)?;
        }
    }
    writeln!(w)
}

/// Write the collected records as a CSV table, header first.
pub fn write_table<W: Write>(mut w: W, records: &[JobRecord]) -> io::Result<()> {
    write_row(&mut w, &COLUMNS)?;
    for record in records {
        write_row(&mut w, &record.row())?;
    }
    Ok(())
}
