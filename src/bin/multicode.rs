//! Command line front end: encode hex or text, decode codes, and demonstrate
//! recovery from simulated copying mistakes.

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use multicode::noise::Noise;
use multicode::Params;

const DEFAULT_CORRECTION_SYMBOLS: &str = "8";

fn correction_arg() -> Arg {
    Arg::new("correction")
        .short('c')
        .long("correction-symbols")
        .help("Number of 4-bit check symbols")
        .value_name("N")
        .value_parser(value_parser!(usize))
        .default_value(DEFAULT_CORRECTION_SYMBOLS)
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false)
        .init();

    let matches = Command::new("multicode")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Human-transcribable codes with error correction")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("encode")
                .visible_alias("e")
                .about("Encode hex (or text) into a code")
                .arg(
                    Arg::new("data")
                        .help("Payload as hex, or as text with --text")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("text")
                        .short('t')
                        .long("text")
                        .help("Treat the payload as UTF-8 text")
                        .action(ArgAction::SetTrue),
                )
                .arg(correction_arg()),
        )
        .subcommand(
            Command::new("decode")
                .visible_alias("d")
                .about("Decode a code, repairing copying mistakes")
                .arg(
                    Arg::new("code")
                        .help("The code, quoted if it contains spaces")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("length")
                        .short('l')
                        .long("length")
                        .help("Payload length in bytes")
                        .value_name("BYTES")
                        .value_parser(value_parser!(usize))
                        .required(true),
                )
                .arg(
                    Arg::new("text")
                        .short('t')
                        .long("text")
                        .help("Print the payload as text instead of hex")
                        .action(ArgAction::SetTrue),
                )
                .arg(correction_arg()),
        )
        .subcommand(
            Command::new("demo")
                .about("Encode, damage and recover a message")
                .arg(
                    Arg::new("message")
                        .help("Message to encode")
                        .default_value("Hello, world!\0")
                        .index(1),
                )
                .arg(
                    Arg::new("edits")
                        .short('e')
                        .long("edits")
                        .help("Number of random copying mistakes")
                        .value_name("COUNT")
                        .value_parser(value_parser!(usize))
                        .default_value("2"),
                )
                .arg(
                    Arg::new("seed")
                        .short('s')
                        .long("seed")
                        .help("Seed for the mistakes")
                        .value_name("TEXT")
                        .default_value("multicode"),
                )
                .arg(correction_arg()),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("encode", sub_matches)) => handle_encode(sub_matches),
        Some(("decode", sub_matches)) => handle_decode(sub_matches),
        Some(("demo", sub_matches)) => handle_demo(sub_matches),
        Some((command, _)) => anyhow::bail!("unknown command {command}"),
        None => anyhow::bail!("no command given, see --help"),
    }
}

fn correction_symbols(matches: &ArgMatches) -> usize {
    matches.get_one::<usize>("correction").copied().unwrap_or(8)
}

fn required<'a>(matches: &'a ArgMatches, id: &str) -> Result<&'a String> {
    matches
        .get_one::<String>(id)
        .with_context(|| format!("missing argument {id}"))
}

fn handle_encode(matches: &ArgMatches) -> Result<()> {
    let input = required(matches, "data")?;
    let data = if matches.get_flag("text") {
        input.as_bytes().to_vec()
    } else {
        hex::decode(input.trim()).with_context(|| format!("{input} is not valid hex"))?
    };

    let params = Params::new(data.len(), correction_symbols(matches));
    println!("{}", multicode::encode(&data, params.correction_symbols));
    log::info!(
        "decode with --length {} --correction-symbols {}",
        params.data_len,
        params.correction_symbols
    );
    Ok(())
}

fn handle_decode(matches: &ArgMatches) -> Result<()> {
    let code = required(matches, "code")?;
    let data_len = matches
        .get_one::<usize>("length")
        .copied()
        .context("missing argument length")?;
    let params = Params::new(data_len, correction_symbols(matches));

    let decoded = params
        .decode(code)
        .with_context(|| format!("could not decode {code:?}"))?;
    if !decoded.repairs.is_empty() || decoded.corrected {
        log::info!(
            "repaired at {:?}, symbols corrected: {}",
            decoded.repairs,
            decoded.corrected
        );
    }

    if matches.get_flag("text") {
        println!("{}", String::from_utf8_lossy(&decoded.data));
    } else {
        println!("{}", hex::encode(&decoded.data));
    }
    Ok(())
}

fn handle_demo(matches: &ArgMatches) -> Result<()> {
    let message = required(matches, "message")?;
    let seed = required(matches, "seed")?;
    let edits = matches.get_one::<usize>("edits").copied().unwrap_or(0);
    let data = message.as_bytes();
    let params = Params::new(data.len(), correction_symbols(matches));

    println!("Data:      {}", hex::encode(data));
    let code = multicode::encode(data, params.correction_symbols);
    println!("Encoded:   {code}");

    let (damaged, applied) = Noise::from(seed.as_str()).damage_logged(&code, edits);
    for edit in &applied {
        println!("Mistake:   {edit}");
    }
    println!("Damaged:   {damaged}");

    match params.decode(&damaged) {
        Ok(decoded) => {
            println!("Recovered: {}", hex::encode(&decoded.data));
            println!("        -> {}", String::from_utf8_lossy(&decoded.data).escape_debug());
            if decoded.data != data {
                println!("Recovered data differs from the original");
            }
        }
        Err(error) => println!("Failed to recover data: {error}"),
    }
    Ok(())
}
