//! Line-per-movement JSON output.

use std::io::{self, Write};

use rust_decimal::Decimal;
use serde::Serialize;

/// Write each item as one compact JSON line, in order.
///
/// An item that fails to serialise is logged and skipped; nothing of it
/// reaches `out`. Returns the number of lines written.
pub fn write_movements<W, T>(out: &mut W, items: &[T]) -> io::Result<usize>
where
    W: Write,
    T: Serialize,
{
    let mut written = 0;
    for (i, item) in items.iter().enumerate() {
        let mut line = match serde_json::to_vec(item) {
            Ok(line) => line,
            Err(e) => {
                log::warn!("skipping movement {i}: error marshalling: {e}");
                continue;
            }
        };
        line.push(b'\n');
        out.write_all(&line)?;
        written += 1;
    }
    out.flush()?;
    Ok(written)
}

/// The closing line of a run, after every movement line.
pub fn write_summary<W: Write>(out: &mut W, balance: Decimal) -> io::Result<()> {
    writeln!(out, "current balance for meal card: {balance}")?;
    out.flush()
}
