use std::io::{self, BufWriter, Write};

use anyhow::Context;
use snowgen::{Configuration, Decoder, IdServices};
use tracing::{info, warn};

/// Generates `count` IDs and writes them to `out`, one per line.
pub fn generate(config: Configuration, count: u64, out: impl Write) -> anyhow::Result<()> {
    let services = IdServices::builder()
        .config(config)
        .build()
        .context("failed to build ID generator")?;
    let generator = services.generator();
    info!(count, worker_id = generator.worker_id(), "generating IDs");

    let mut out = BufWriter::new(out);
    for _ in 0..count {
        let id = generator.next_id().context("failed to generate ID")?;
        writeln!(out, "{id}")?;
    }
    out.flush()?;

    if generator.recycled_ids() > 0 {
        warn!(
            recycled = generator.recycled_ids(),
            "the timestamp field is too narrow, some IDs may be duplicates; widen --timestamp-bits"
        );
    } else if generator.overflow_ids() > 0 {
        warn!(
            overflow = generator.overflow_ids(),
            "the timestamp field cannot represent the current time; IDs no longer track the clock"
        );
    }
    Ok(())
}

/// Decodes each ID and writes one line per ID to `out`.
pub fn decode(config: &Configuration, ids: &[i64], json: bool, out: impl Write) -> anyhow::Result<()> {
    let decoder = Decoder::new(config).context("failed to build ID decoder")?;
    let mut out = BufWriter::new(out);

    if !json {
        writeln!(out, "id\ttimestamp_ms\tworker_id\tsequence")?;
    }
    for &id in ids {
        let parts = decoder.decode(id);
        let timestamp_ms = parts.timestamp.as_millis();
        if json {
            let line = serde_json::json!({
                "id": id,
                "timestamp_ms": timestamp_ms as u64,
                "worker_id": parts.worker_id,
                "sequence": parts.sequence,
            });
            writeln!(out, "{line}")?;
        } else {
            writeln!(
                out,
                "{id}\t{timestamp_ms}\t{}\t{}",
                parts.worker_id, parts.sequence
            )?;
        }
    }
    out.flush()?;
    Ok(())
}

/// Convenience for `main`: stdout, locked once.
pub fn stdout() -> io::StdoutLock<'static> {
    io::stdout().lock()
}

#[cfg(test)]
mod tests {
    use super::*;
    use snowgen::CUSTOM_EPOCH;

    fn output(f: impl FnOnce(&mut Vec<u8>) -> anyhow::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn generate_prints_requested_count_of_increasing_ids() {
        let config = Configuration::default().with_worker_id(4);
        let text = output(|buf| generate(config, 100, buf));
        let ids: Vec<i64> = text.lines().map(|l| l.parse().unwrap()).collect();
        assert_eq!(ids.len(), 100);
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn decode_prints_tab_separated_fields() {
        let config = Configuration::default();
        let id = (10_i64 << 22) | (3 << 12) | 2;
        let text = output(|buf| decode(&config, &[id], false, buf));
        let expected_ms = CUSTOM_EPOCH.as_millis() + 10;
        assert_eq!(
            text,
            format!("id\ttimestamp_ms\tworker_id\tsequence\n{id}\t{expected_ms}\t3\t2\n")
        );
    }

    #[test]
    fn decode_prints_json_lines() {
        let config = Configuration::default();
        let text = output(|buf| decode(&config, &[0, 4097], true, buf));
        let rows: Vec<serde_json::Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["worker_id"], 1);
        assert_eq!(rows[1]["sequence"], 1);
        assert_eq!(rows[0]["timestamp_ms"], CUSTOM_EPOCH.as_millis() as u64);
    }
}
