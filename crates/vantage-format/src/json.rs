//! JSON bar output, either one array or one bar object per line.

use std::io::Write;
use vantage_types::Bar;

use crate::{FormatError, Formatter};

/// Writes bars as JSON.
///
/// Timestamps serialize as exchange-local ISO strings and the bar period as
/// whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JsonFormatter {
    lines: bool,
}

impl JsonFormatter {
    /// One JSON array holding every bar.
    #[must_use]
    pub const fn array() -> Self {
        Self { lines: false }
    }

    /// One bar object per line (NDJSON).
    #[must_use]
    pub const fn lines() -> Self {
        Self { lines: true }
    }
}

impl Formatter for JsonFormatter {
    fn write_bars<W: Write + Send>(&self, bars: &[Bar], mut writer: W) -> Result<(), FormatError> {
        if self.lines {
            for bar in bars {
                serde_json::to_writer(&mut writer, bar)?;
                writer.write_all(b"\n")?;
            }
            return Ok(());
        }

        serde_json::to_writer(&mut writer, bars)?;
        writer.write_all(b"\n")?;
        Ok(())
    }

    fn extension(&self) -> &str {
        if self.lines { "ndjson" } else { "json" }
    }
}
