use std::env;
use std::fs;
use std::path::PathBuf;
use std::process;

use notehole::{
    lilypond::to_lilypond, transform_with, write_midi, MidiOptions, Operation, Tone,
};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "Usage: notehole <input.ly> [--op <operation>]... [--axis <tone>] [--midi <output.mid>] [--ly <output.ly>] [--print]";

struct Args {
    input: String,
    operations: Vec<Operation>,
    axis: Option<Tone>,
    midi: Option<PathBuf>,
    ly: Option<PathBuf>,
    print: bool,
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("{}", message);
    process::exit(1);
}

fn parse_args(args: &[String]) -> Result<Args, String> {
    let mut input = None;
    let mut operations = Vec::new();
    let mut axis = None;
    let mut midi = None;
    let mut ly = None;
    let mut print = false;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        let mut value = |flag: &str| {
            iter.next()
                .cloned()
                .ok_or_else(|| format!("{} needs a value", flag))
        };
        match arg.as_str() {
            "--op" => {
                let text = value("--op")?;
                operations.push(text.parse::<Operation>().map_err(|e| e.to_string())?);
            }
            "--axis" => {
                let text = value("--axis")?;
                axis = Some(text.parse::<Tone>().map_err(|e| e.to_string())?);
            }
            "--midi" => midi = Some(PathBuf::from(value("--midi")?)),
            "--ly" => ly = Some(PathBuf::from(value("--ly")?)),
            "--print" => print = true,
            flag if flag.starts_with("--") => return Err(format!("unknown option '{}'", flag)),
            path => {
                if input.replace(path.to_string()).is_some() {
                    return Err("only one input file is accepted".to_string());
                }
            }
        }
    }

    Ok(Args {
        input: input.ok_or_else(|| "missing input file".to_string())?,
        operations,
        axis,
        midi,
        ly,
        print,
    })
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let args = match parse_args(&args) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            fail(USAGE);
        }
    };

    // Read input file
    let source = match fs::read_to_string(&args.input) {
        Ok(content) => content,
        Err(e) => fail(format!("Error reading file '{}': {}", args.input, e)),
    };

    let score = match transform_with(&source, &args.operations, args.axis) {
        Ok(score) => score,
        Err(e) => fail(format!("Error: {}", e)),
    };

    if args.print {
        for item in &score {
            println!("{}", item);
        }
    }

    if let Some(path) = &args.midi {
        if let Err(e) = write_midi(&score, &MidiOptions::default(), path) {
            fail(format!("Error writing '{}': {}", path.display(), e));
        }
        eprintln!("Wrote MIDI to {}", path.display());
    }

    if args.ly.is_some() || (args.midi.is_none() && !args.print) {
        let text = match to_lilypond(&score, "") {
            Ok(text) => text,
            Err(e) => fail(format!("Error: {}", e)),
        };
        match &args.ly {
            Some(path) => {
                if let Err(e) = fs::write(path, &text) {
                    fail(format!("Error writing '{}': {}", path.display(), e));
                }
                eprintln!("Wrote LilyPond to {}", path.display());
            }
            None => print!("{}", text),
        }
    }
}
