use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use core::time::Duration;
use snowgen::{CUSTOM_EPOCH, Configuration};

/// Command-line interface of the `snowgen` binary.
///
/// Layout options are global: they may appear before or after the
/// subcommand, and every one falls back to an environment variable (also
/// read from a `.env` file in the working directory).
#[derive(Parser, Debug, Clone)]
#[command(
    name = "snowgen",
    version,
    about = "Generate and decode Snowflake-style 64-bit IDs"
)]
pub struct CliArgs {
    #[command(flatten)]
    pub layout: LayoutArgs,

    /// Emit logs as JSON lines on stderr.
    ///
    /// Environment variable: `SNOWGEN_LOG_JSON`
    #[arg(long, global = true, env = "SNOWGEN_LOG_JSON", default_value_t = false)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print freshly generated IDs, one per line.
    Generate {
        /// How many IDs to generate.
        #[arg(short = 'n', long, default_value_t = 1)]
        count: u64,
    },
    /// Print the fields of existing IDs.
    Decode {
        /// IDs to decode. Any 64-bit value is accepted.
        #[arg(required = true, allow_negative_numbers = true)]
        ids: Vec<i64>,

        /// Print one JSON object per ID instead of tab-separated columns.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

/// Bit layout and worker identity. Generator and decoder must agree on all
/// of these.
#[derive(Args, Debug, Clone)]
pub struct LayoutArgs {
    /// Width of the timestamp field.
    ///
    /// Environment variable: `SNOWGEN_TIMESTAMP_BITS`
    #[arg(long, global = true, env = "SNOWGEN_TIMESTAMP_BITS", default_value_t = 41)]
    pub timestamp_bits: u8,

    /// Width of the worker id field.
    ///
    /// Environment variable: `SNOWGEN_WORKER_ID_BITS`
    #[arg(long, global = true, env = "SNOWGEN_WORKER_ID_BITS", default_value_t = 10)]
    pub worker_id_bits: u8,

    /// Width of the sequence field.
    ///
    /// Environment variable: `SNOWGEN_SEQUENCE_BITS`
    #[arg(long, global = true, env = "SNOWGEN_SEQUENCE_BITS", default_value_t = 12)]
    pub sequence_bits: u8,

    /// Worker id of this instance. Every concurrently running generator
    /// sharing an ID space needs its own.
    ///
    /// Environment variable: `SNOWGEN_WORKER_ID`
    #[arg(long, global = true, env = "SNOWGEN_WORKER_ID", default_value_t = 0)]
    pub worker_id: u64,

    /// Epoch in milliseconds since 1970-01-01 00:00:00 UTC.
    ///
    /// Environment variable: `SNOWGEN_EPOCH_MS`
    #[arg(long, global = true, env = "SNOWGEN_EPOCH_MS", default_value_t = CUSTOM_EPOCH.as_millis() as u64)]
    pub epoch_ms: u64,

    /// How far, in milliseconds, the epoch may lie in the future.
    ///
    /// Environment variable: `SNOWGEN_MAX_EPOCH_SKEW_MS`
    #[arg(long, global = true, env = "SNOWGEN_MAX_EPOCH_SKEW_MS", default_value_t = 5_000)]
    pub max_epoch_skew_ms: u64,
}

impl TryFrom<&LayoutArgs> for Configuration {
    type Error = anyhow::Error;

    fn try_from(args: &LayoutArgs) -> Result<Self, Self::Error> {
        let config = Configuration::default()
            .with_bits(args.timestamp_bits, args.worker_id_bits, args.sequence_bits)
            .with_worker_id(args.worker_id)
            .with_epoch(Duration::from_millis(args.epoch_ms))
            .with_max_future_epoch_skew(Duration::from_millis(args.max_epoch_skew_ms));

        config.validate().context("invalid ID layout")?;
        Ok(config)
    }
}
