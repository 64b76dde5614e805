// SPDX-FileCopyrightText: 2025 ruzu contributors
// SPDX-License-Identifier: GPL-3.0-or-later

mod config;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{debug, info};
use std::path::PathBuf;

use ruzu_common::{OpcodeWidth, Settings};
use ruzu_decoder::{
    count_field_runs, make_matcher, DecodeTable, FieldKind, Handler, Matcher, Opcode, Operands,
    Pattern, ReadOnly,
};

/// ruzu-decode - match instruction words against bit patterns
#[derive(Parser, Debug)]
#[command(name = "ruzu-decode", version, about = "Decode instruction words against bit patterns")]
struct Args {
    /// Instruction words to decode (0x hex, 0b binary, or decimal)
    #[arg(required = true)]
    words: Vec<String>,

    /// Path to config file (default: ./ruzu-decode.ini or ~/.config/ruzu/)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Opcode width in bits (8, 16, 32 or 64)
    #[arg(short, long)]
    width: Option<u32>,

    /// Extra encoding as NAME=PATTERN; may be repeated
    #[arg(short, long = "pattern", value_name = "NAME=PATTERN")]
    patterns: Vec<String>,

    /// Try the most specific patterns first
    #[arg(long)]
    sort: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

type ToolMatcher<T> = Matcher<T, (), Operands, ReadOnly>;

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp_millis()
        .init();

    let mut settings = config::load_config(args.config.as_ref());
    apply_args(&mut settings, &args)?;

    if settings.patterns.is_empty() {
        bail!(
            "No patterns configured.\n\
             Add a [Patterns] section to the config file, or\n\
             use --pattern NAME=PATTERN on the command line."
        );
    }

    info!(
        "{} patterns, {}-bit opcodes",
        settings.patterns.len(),
        settings.opcode_width.bits()
    );

    match settings.opcode_width {
        OpcodeWidth::W8 => run::<u8>(&settings, &args.words),
        OpcodeWidth::W16 => run::<u16>(&settings, &args.words),
        OpcodeWidth::W32 => run::<u32>(&settings, &args.words),
        OpcodeWidth::W64 => run::<u64>(&settings, &args.words),
    }
}

/// Command-line overrides on top of the config file.
fn apply_args(settings: &mut Settings, args: &Args) -> Result<()> {
    if let Some(bits) = args.width {
        settings.opcode_width = OpcodeWidth::from_bits(bits)
            .with_context(|| format!("Unsupported opcode width: {bits}"))?;
    }
    if args.sort {
        settings.sort_by_specificity = true;
    }
    for arg in &args.patterns {
        let (name, pattern) = parse_pattern_arg(arg)?;
        settings.set_pattern(name, pattern);
    }
    Ok(())
}

fn parse_pattern_arg(arg: &str) -> Result<(&str, &str)> {
    match arg.split_once('=') {
        Some((name, pattern)) if !name.trim().is_empty() => Ok((name.trim(), pattern.trim())),
        _ => bail!("Expected NAME=PATTERN, got `{arg}`"),
    }
}

/// Parse an instruction word: `0x` hex, `0b` binary, otherwise decimal.
/// Underscores are ignored.
fn parse_word<T: Opcode>(text: &str) -> Result<T> {
    let cleaned: String = text.trim().chars().filter(|&c| c != '_').collect();
    let value = if let Some(hex) = cleaned.strip_prefix("0x").or_else(|| cleaned.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16)
    } else if let Some(bin) = cleaned.strip_prefix("0b").or_else(|| cleaned.strip_prefix("0B")) {
        u64::from_str_radix(bin, 2)
    } else {
        cleaned.parse()
    }
    .with_context(|| format!("Invalid instruction word: `{text}`"))?;

    T::from_u64(value)
        .with_context(|| format!("Word {text} does not fit in {} bits", T::BITS))
}

fn collect_operands(_: &(), ops: &Operands) -> Operands {
    ops.clone()
}

/// One matcher per configured pattern, each field extracted as a raw u64.
fn build_table<T: Opcode>(settings: &Settings) -> Result<DecodeTable<T, (), Operands, ReadOnly>> {
    let mut matchers: Vec<ToolMatcher<T>> = Vec::with_capacity(settings.patterns.len());
    for entry in &settings.patterns {
        let pattern = Pattern::<T>::new(&entry.pattern)
            .with_context(|| format!("Invalid pattern `{}`", entry.name))?;
        let kinds = vec![FieldKind::U64; count_field_runs(&pattern)];
        let matcher = make_matcher(
            entry.name.clone(),
            &entry.pattern,
            &kinds,
            Handler::ReadOnly(collect_operands),
        )?;
        debug!("{:?}", matcher);
        matchers.push(matcher);
    }

    Ok(if settings.sort_by_specificity {
        DecodeTable::by_specificity(matchers)
    } else {
        DecodeTable::new(matchers)
    })
}

/// Human-readable result for one word.
fn describe<T: Opcode>(table: &DecodeTable<T, (), Operands, ReadOnly>, word: T) -> String {
    let digits = (T::BITS / 4) as usize;
    match table.decode(word) {
        Some(m) => {
            let operands = m.invoke(word, &());
            let fields: Vec<String> = m
                .fields()
                .zip(operands.iter())
                .map(|(field, value)| format!("{}={}", field.symbol, value))
                .collect();
            format!("{:#0width$x}  {}  {}", word, m.name(), fields.join(" "), width = digits + 2)
                .trim_end()
                .to_string()
        }
        None => format!("{:#0width$x}  <no match>", word, width = digits + 2),
    }
}

fn run<T: Opcode>(settings: &Settings, words: &[String]) -> Result<()> {
    let table = build_table::<T>(settings)?;
    for text in words {
        let word = parse_word::<T>(text)?;
        println!("{}", describe(&table, word));
    }
    Ok(())
}
