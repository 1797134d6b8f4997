use crate::filter::{BucketId, MetricId, ResultRecord};
use std::fmt::Write;

/// Serialize one record as a flush line: `metric bucket count`.
pub fn format_record(record: &ResultRecord) -> String {
    let mut line = String::new();
    write_record(&mut line, record);
    line
}

/// Join records into a newline-delimited flush body.
pub fn format_batch<'a>(records: impl IntoIterator<Item = &'a ResultRecord>) -> String {
    let mut out = String::new();
    for record in records {
        write_record(&mut out, record);
        out.push('\n');
    }
    out
}

fn write_record(out: &mut String, record: &ResultRecord) {
    // Writing to a String cannot fail.
    let _ = write!(out, "{} {} {}", record.metric, record.bucket, record.delta);
}

/// Parse one flush line. Returns `None` for anything that is not exactly three
/// integers with a minute-aligned bucket.
pub fn parse_record(line: &str) -> Option<ResultRecord> {
    let mut fields = line.split_whitespace();

    let metric = fields.next()?.parse::<u16>().ok()?;
    let bucket = BucketId(fields.next()?.parse::<i64>().ok()?);
    let delta = fields.next()?.parse::<i64>().ok()?;

    if fields.next().is_some() || !bucket.is_aligned() {
        return None;
    }

    Some(ResultRecord::new(MetricId(metric), bucket, delta))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_well_formed_lines() {
        assert_eq!(
            parse_record("1 60 5"),
            Some(ResultRecord::new(MetricId(1), BucketId(60), 5))
        );
        assert_eq!(
            parse_record("  2\t1700000040   -3 "),
            Some(ResultRecord::new(MetricId(2), BucketId(1700000040), -3))
        );
    }

    #[test]
    fn rejects_malformed_lines() {
        for line in [
            "",
            "1 60",
            "1 60 5 9",
            "x 60 5",
            "1 sixty 5",
            "1 60 five",
            "1 61 5",
            "-1 60 5",
            "70000 60 5",
        ] {
            assert_eq!(parse_record(line), None, "line {line:?}");
        }
    }

    #[test]
    fn formatted_lines_parse_back() {
        let records = [
            ResultRecord::new(MetricId(1), BucketId(120), 4),
            ResultRecord::new(MetricId(2), BucketId(180), 1),
        ];
        let body = format_batch(&records);
        assert_eq!(body, "1 120 4\n2 180 1\n");
        assert_eq!(format_record(&records[0]), "1 120 4");

        let parsed: Vec<_> = body.lines().filter_map(parse_record).collect();
        assert_eq!(parsed, records.to_vec());
    }

    #[test]
    fn batch_lines_match_single_record_format() {
        let records = [
            ResultRecord::new(MetricId(1), BucketId(60), i64::MAX),
            ResultRecord::new(MetricId(2), BucketId(-120), -7),
            ResultRecord::new(MetricId(65535), BucketId(0), 0),
        ];

        let body = format_batch(&records);

        let expected: Vec<String> = records.iter().map(format_record).collect();
        assert_eq!(body.lines().collect::<Vec<_>>(), expected);
        assert!(body.ends_with('\n'));
        assert_eq!(format_batch(&[] as &[ResultRecord]), "");
    }
}
