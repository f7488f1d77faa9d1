use std::io::{self, BufRead, Write};

use clap::{Args, Parser, Subcommand};
use exe_buf::ExeBuf;
use pagejit::funcall::{self, Tally};
use pagejit::{hello, show, Error};

#[derive(Parser)]
#[command(name = "pagejit", about = "Generate machine code into executable pages and run it")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print a greeting from generated code
    Hello {
        /// Who to greet; asked on stdin when missing
        #[arg(long)]
        name: Option<String>,

        /// Build the code in ordinary memory first, then copy it into
        /// pages sized to fit
        #[arg(long)]
        staged: bool,

        #[command(flatten)]
        opts: Opts,
    },
    /// Call a host function from generated code
    Funcall {
        #[command(flatten)]
        opts: Opts,
    },
}

#[derive(Args)]
struct Opts {
    /// Pages of executable memory to allocate
    #[arg(long, default_value_t = 1)]
    pages: usize,

    /// Dump the generated bytes
    #[arg(long)]
    show: bool,

    /// Disassemble the generated bytes with objdump
    #[arg(long)]
    disasm: bool,
}

impl Opts {
    fn report(&self, buf: &ExeBuf) -> Result<(), Error> {
        let code = buf.code()?;
        if self.show {
            println!("{}", show::memory(code, buf.capacity()));
        }
        if self.disasm {
            println!("{}", show::disasm(code)?);
        }
        Ok(())
    }
}

fn ask_name() -> io::Result<String> {
    println!("What is your name?");
    io::stdout().flush()?;
    let mut name = String::new();
    io::stdin().lock().read_line(&mut name)?;
    Ok(name.trim_end_matches(&['\r', '\n'][..]).to_string())
}

fn run(buf: &ExeBuf) -> Result<(), Error> {
    if !cfg!(target_arch = "x86_64") {
        return Err(Error::UnsupportedArch);
    }
    unsafe { buf.execute()? };
    Ok(())
}

fn hello(name: Option<String>, staged: bool, opts: &Opts) -> Result<(), Box<dyn std::error::Error>> {
    let name = match name {
        Some(name) => name,
        None => ask_name()?,
    };
    let message = hello::greeting(&name);

    let mut buf = if staged {
        let code = hello::machine_code(message.as_bytes())?;
        if opts.show {
            println!("Machine code generated:\n{}\n", show::memory(&code, code.len()));
        }
        hello::load(&code)?
    } else {
        let mut buf = ExeBuf::allocate(opts.pages)?;
        hello::build(&mut buf, message.as_bytes())?;
        buf
    };
    opts.report(&buf)?;
    run(&buf)?;
    buf.release()?;
    Ok(())
}

fn funcall(opts: &Opts) -> Result<(), Box<dyn std::error::Error>> {
    let mut tally = Tally::new(vec![1, 2, 3]);
    let mut buf = ExeBuf::allocate(opts.pages)?;
    funcall::build(&mut buf, &mut tally)?;
    opts.report(&buf)?;

    println!("Initial values:");
    println!("{:?}", tally.values);
    run(&buf)?;
    println!("After the host function was called from generated code ({} call(s)):", tally.calls);
    println!("{:?}", tally.values);

    buf.release()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Command::Hello { name, staged, opts } => hello(name, staged, &opts),
        Command::Funcall { opts } => funcall(&opts),
    }
}
