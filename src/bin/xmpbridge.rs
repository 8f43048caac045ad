//! xmpbridge command line front end
//!
//! Reads, replaces and merges the XMP metadata of files through the bundled
//! engine.

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use xmpbridge::{FileScope, PropertyValue, Toolkit, WriteMode, XmpError, XmpResult};

#[derive(Parser, Debug)]
#[command(name = "xmpbridge")]
#[command(about = "Read and write XMP metadata embedded in files")]
#[command(version)]
struct Args {
    /// Directory of engine plugins, overrides XMP_TOOLKIT_PLUGINS_PATH
    #[arg(long, global = true)]
    plugin_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the XMP packet of a file
    Print {
        file: PathBuf,
        /// Write the packet here instead of stdout
        out: Option<PathBuf>,
        /// Keep the <?xpacket?> wrapper
        #[arg(long)]
        raw: bool,
    },
    /// Replace all metadata of a file with a packet
    Override { file: PathBuf, xml_file: PathBuf },
    /// Merge a packet into the metadata of a file
    Upsert { file: PathBuf, xml_file: PathBuf },
    /// Set a single property
    Set {
        file: PathBuf,
        namespace: String,
        name: String,
        value: String,
        #[arg(long = "type", value_enum, default_value_t = ValueKind::String)]
        kind: ValueKind,
    },
    /// Print the crate version
    Version,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ValueKind {
    String,
    Bool,
    Int,
    Int64,
    Float,
    Date,
}

impl ValueKind {
    fn name(self) -> &'static str {
        match self {
            ValueKind::String => "string",
            ValueKind::Bool => "bool",
            ValueKind::Int => "int",
            ValueKind::Int64 => "int64",
            ValueKind::Float => "float",
            ValueKind::Date => "date",
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn write_packet(file: PathBuf, xml_file: PathBuf, mode: WriteMode) -> XmpResult<()> {
    let packet = fs::read(&xml_file)?;
    Toolkit::global().write_xmp_to_file(&file, Some(packet.as_slice()), mode)?;
    tracing::info!(file = %file.display(), mode = %mode, "metadata written");
    Ok(())
}

fn run(args: Args) -> XmpResult<()> {
    let toolkit = Toolkit::global();
    if let Some(path) = &args.plugin_path {
        toolkit.initialize(Some(path.as_path()))?;
    }

    match args.command {
        Command::Print { file, out, raw } => {
            let report = toolkit.read_packet_report(&file)?;
            let text = if raw { report.raw } else { report.xmp_data };
            match out {
                Some(out) => fs::write(out, text)?,
                None => println!("{}", text),
            }
        }
        Command::Override { file, xml_file } => write_packet(file, xml_file, WriteMode::Override)?,
        Command::Upsert { file, xml_file } => write_packet(file, xml_file, WriteMode::Upsert)?,
        Command::Set {
            file,
            namespace,
            name,
            value,
            kind,
        } => {
            let value = PropertyValue::from_typed(kind.name(), &value)?;
            toolkit.with_xmp_file(&file, FileScope::for_update(), |session| {
                session.set_property(&namespace, &name, value)
            })?;
        }
        Command::Version => println!("xmpbridge {}", env!("CARGO_PKG_VERSION")),
    }
    Ok(())
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();
    let _guard = Toolkit::global().shutdown_guard();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("xmpbridge: {}", e);
            if let XmpError::MetadataWrite {
                payload: Some(payload),
                ..
            } = &e
            {
                tracing::debug!(payload = %payload, "refused packet");
            }
            ExitCode::FAILURE
        }
    }
}
