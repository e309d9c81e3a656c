//! Plain-text rendering of reports.

use crate::injection::{InjectionPoint, Technique};
use crate::report::{ContentStatus, Report, ReportEntry, ReportValue};
use std::fmt;

impl fmt::Display for ContentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InProgress => write!(f, "in progress"),
            Self::Complete => write!(f, "complete"),
            Self::Other(code) => write!(f, "status {code}"),
        }
    }
}

impl fmt::Display for Technique {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let detail = self.detail();
        writeln!(f, "    Type: {}", self.name())?;
        writeln!(f, "    Title: {}", detail.title)?;
        write!(f, "    Payload: {}", detail.payload)
    }
}

impl fmt::Display for InjectionPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Parameter: {} ({})", self.parameter, self.place)?;
        if let Some(dbms) = self.dbms_label() {
            write!(f, "\n  DBMS: {dbms}")?;
        }
        if let Some(os) = &self.os {
            write!(f, "\n  OS: {os}")?;
        }
        for technique in &self.techniques {
            write!(f, "\n{technique}")?;
        }
        Ok(())
    }
}

impl fmt::Display for ReportEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            ReportValue::Injections(points) => {
                let mut first = true;
                for point in points {
                    if !first {
                        writeln!(f)?;
                    }
                    first = false;
                    write!(f, "{point}")?;
                }
                Ok(())
            }
            ReportValue::Raw(value) => {
                write!(f, "[type {}, {}] {}", self.content_type, self.status, value)
            }
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = self.summary();
        if self.is_vulnerable() {
            writeln!(
                f,
                "{} injection point(s), {} technique(s) confirmed",
                summary.injection_points, summary.techniques
            )?;
        } else {
            writeln!(f, "No injection found")?;
        }
        for entry in self.entries() {
            writeln!(f, "{entry}")?;
        }
        Ok(())
    }
}
