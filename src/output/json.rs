use crate::output::OutputFormatter;
use crate::remediation::RemediationOutcome;
use crate::report::Report;
use std::io::Write;

/// Serializes reports and outcomes as pretty JSON. Output is deterministic
/// for an unchanged tree since reports are sorted before serialization.
pub struct JsonOutput;

impl JsonOutput {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for JsonOutput {
    fn format_report<W: Write>(&self, report: &Report, writer: &mut W) -> std::io::Result<()> {
        serde_json::to_writer_pretty(&mut *writer, report)?;
        writeln!(writer)
    }

    fn format_outcome<W: Write>(
        &self,
        outcome: &RemediationOutcome,
        writer: &mut W,
    ) -> std::io::Result<()> {
        serde_json::to_writer_pretty(&mut *writer, outcome)?;
        writeln!(writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Stats;

    #[test]
    fn test_report_json_shape() {
        let report = Report::new("demo".to_string(), Vec::new(), Stats::default(), Vec::new());
        let mut out = Vec::new();
        JsonOutput::new().format_report(&report, &mut out).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["verdict"], "PASS");
        assert_eq!(value["summary"]["total"], 0);
        assert_eq!(value["project_name"], "demo");
    }
}
