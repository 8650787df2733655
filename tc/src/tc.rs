use anyhow::Context;
use clap::Parser;
use log::{info, LevelFilter};

use tiger_frame::{
    frame::{
        x86_64::X86_64, Access, Frag, Fragments, Frame, ProcEntryExit, RegisterCatalog,
        RegisterRole, Target,
    },
    ir::IrExp,
    Uuids, UuidsImpl,
};

use strum::IntoEnumIterator;

/// Lays out a frame for a made up procedure and prints what the backend makes of it.
#[derive(Parser, Debug)]
#[command(version, about = "Tiger frame layout", long_about = None)]
struct Args {
    /// Name of the procedure.
    #[arg(long, default_value = "f")]
    name: String,

    /// Escape flag of each formal, static link first, e.g. 1,0,0.
    #[arg(long, value_delimiter = ',', value_parser = parse_flag)]
    formals: Vec<bool>,

    /// Escape flag of each local, in allocation order.
    #[arg(long, value_delimiter = ',', value_parser = parse_flag)]
    locals: Vec<bool>,

    /// Bytes per machine word.
    #[arg(long, default_value_t = 8, allow_negative_numbers = true)]
    word_size: i64,

    /// Argument registers in calling order. Their count is the register budget for formals.
    #[arg(long, value_delimiter = ',')]
    arg_regs: Option<Vec<String>>,

    /// List the register catalog.
    #[arg(long)]
    registers: bool,

    /// More output, repeat for trace output.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_flag(s: &str) -> Result<bool, String> {
    match s.trim() {
        "1" | "t" | "true" => Ok(true),
        "0" | "f" | "false" => Ok(false),
        other => Err(format!("expected an escape flag (0 or 1), got `{}`", other)),
    }
}

fn target(args: &Args) -> tiger_frame::Result<Target> {
    let target = Target::x86_64().with_word_size(args.word_size)?;
    match &args.arg_regs {
        Some(regs) => target.with_argument_registers(regs.iter().cloned()),
        None => Ok(target),
    }
}

fn describe(access: &Access, catalog: &RegisterCatalog) -> String {
    match access {
        Access::InFrame(offset) => {
            let fp = catalog.name_of(catalog.fp()).unwrap_or("fp");
            format!("{}({})", offset, fp)
        }
        Access::InReg(t) => catalog.display(*t),
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(match args.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        })
        .parse_default_env()
        .init();

    let target = target(&args).context("invalid target configuration")?;
    let mut gen = UuidsImpl::new();
    let catalog = RegisterCatalog::new(&target, &mut gen);

    if args.registers {
        for role in RegisterRole::iter() {
            let names = catalog
                .by_role(role)
                .iter()
                .map(|t| catalog.display(*t))
                .collect::<Vec<_>>();
            println!("{:>12}: {}", role, names.join(" "));
        }
        println!();
    }

    let label = gen.named_label(&args.name);
    let mut frame = Frame::new(label, &args.formals, &target, &mut gen);

    println!("formals:");
    for (i, access) in frame.formals().iter().enumerate() {
        println!("  #{:<3} {}", i + 1, describe(access, &catalog));
    }

    let locals = args
        .locals
        .iter()
        .map(|escapes| frame.alloc_local(*escapes, &mut gen))
        .collect::<Vec<_>>();
    if !locals.is_empty() {
        println!("locals:");
        for (i, access) in locals.iter().enumerate() {
            println!("  #{:<3} {}", i + 1, describe(access, &catalog));
        }
    }
    info!(
        "{} escaping locals, {} bytes",
        frame.local_count(),
        frame.locals_size()
    );

    let backend = X86_64::new(&target, &catalog);
    let body = backend.proc_entry_exit1(&frame, IrExp::Const(0), &mut gen);
    println!("\nview shift:");
    for stm in body.clone().flatten() {
        println!("  {}", stm.debug_to_string(catalog.temp_map(), &gen));
    }

    let mut fragments = Fragments::new();
    fragments.push(Frag::Proc { body, frame });
    for frag in fragments.drain() {
        if let Frag::Proc { frame, .. } = frag {
            let mut instrs = Vec::new();
            backend.proc_entry_exit2(&mut instrs);
            let proc = backend.proc_entry_exit3(&frame, instrs, &gen);
            println!("\n{}", proc.render(&catalog, &gen));
        }
    }
    Ok(())
}
