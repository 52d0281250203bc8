use std::io::{self, Write};

use fwscope_logs::{ActionCounts, FilterChoices, FirewallLog, parse_timestamp};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Write the processed batch as an aligned table
pub fn write_table(out: &mut impl Write, logs: &[FirewallLog]) -> io::Result<()> {
    writeln!(
        out,
        "{:<19}  {:<6}  {:<8}  {:<24}  {:<5}  {}",
        "TIME", "ACTION", "IFACE", "LABEL", "PROTO", "SRC -> DST"
    )?;
    for log in logs {
        writeln!(out, "{}", format_row(log))?;
    }
    Ok(())
}

/// Format one record as a table row
pub fn format_row(log: &FirewallLog) -> String {
    format!(
        "{:<19}  {:<6}  {:<8}  {:<24}  {:<5}  {} -> {}",
        format_time(log.timestamp.as_deref()),
        log.action.as_deref().unwrap_or("-"),
        log.interface.as_deref().unwrap_or("-"),
        truncate(log.label.as_deref().unwrap_or("-"), 24),
        log.protoname.as_deref().unwrap_or("-"),
        log.source(),
        log.destination(),
    )
}

/// Write per-action totals
pub fn write_summary(out: &mut impl Write, counts: &ActionCounts) -> io::Result<()> {
    writeln!(
        out,
        "{} logs: {} pass, {} block, {} other",
        counts.total(),
        counts.pass,
        counts.block,
        counts.other
    )
}

/// Write the values available for each filter
pub fn write_choices(out: &mut impl Write, choices: &FilterChoices) -> io::Result<()> {
    let join = |set: &std::collections::BTreeSet<String>| {
        set.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
    };
    writeln!(out, "actions:    {}", join(&choices.actions))?;
    writeln!(out, "interfaces: {}", join(&choices.interfaces))?;
    writeln!(out, "directions: {}", join(&choices.directions))
}

fn format_time(raw: Option<&str>) -> String {
    match raw {
        Some(raw) => match parse_timestamp(raw) {
            Some(ts) => ts.format(TIME_FORMAT).to_string(),
            None => truncate(raw, 19),
        },
        None => "-".to_string(),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_row() {
        let log = FirewallLog {
            action: Some("block".to_string()),
            interface: Some("wan".to_string()),
            label: Some("Default deny rule".to_string()),
            protoname: Some("tcp".to_string()),
            src: Some("203.0.113.9".to_string()),
            srcport: Some("51000".to_string()),
            dst: Some("198.51.100.1".to_string()),
            dstport: Some("22".to_string()),
            timestamp: Some("2024-01-02T03:04:05+00:00".to_string()),
            ..Default::default()
        };

        let row = format_row(&log);
        assert!(row.starts_with("2024-01-02 03:04:05  block   wan"));
        assert!(row.ends_with("203.0.113.9:51000 -> 198.51.100.1:22"));
    }

    #[test]
    fn test_format_row_with_missing_fields() {
        let row = format_row(&FirewallLog::default());
        assert!(row.starts_with("-   "));
        assert!(row.ends_with("- -> -"));
    }

    #[test]
    fn test_unparseable_time_is_shown_raw() {
        assert_eq!(format_time(Some("sometime")), "sometime");
    }

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate("─────", 3), "──…");
        assert_eq!(truncate("short", 10), "short");
    }

    #[test]
    fn test_summary() {
        let mut out = Vec::new();
        let counts = ActionCounts {
            pass: 3,
            block: 1,
            other: 0,
        };
        write_summary(&mut out, &counts).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "4 logs: 3 pass, 1 block, 0 other\n");
    }

    #[test]
    fn test_choices() {
        let logs = vec![FirewallLog {
            action: Some("pass".to_string()),
            interface: Some("lan".to_string()),
            ..Default::default()
        }];
        let mut out = Vec::new();
        write_choices(&mut out, &FilterChoices::from_logs(&logs)).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("actions:    pass"));
        assert!(text.contains("interfaces: lan"));
    }
}
