use std::io::{stdin, stdout, Write};
use std::sync::atomic::{AtomicU32, Ordering};

use blog_pudding::cmds::{self, Args, ShellCmd};
use blog_pudding::config::Config;
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(::std::io::stderr)
        .init();

    let config = match Config::load(Args::parse()) {
        Ok(c) => c,
        Err(e) => return eprintln!("invalid configuration: {}", e),
    };

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name_fn(|| {
            static NUM: AtomicU32 = AtomicU32::new(0);
            format!("blog_pudding-worker-{}", NUM.fetch_add(1, Ordering::Relaxed))
        })
        .build()
    {
        Ok(r) => r,
        Err(e) => return eprintln!("{}", e),
    };

    let mut conductor = blog_pudding::remote(&config);

    println!("blog_pudding - type `help` for commands, `quit` to leave.");

    loop {
        print!("{}> ", conductor.location());
        let _ = stdout().flush();

        // stdin stays unlocked between lines; deletion prompts read it too
        let mut line = String::new();
        match stdin().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {},
            Err(e) => break eprintln!("cannot read input: {}", e),
        }

        let cmd = match cmds::parse(&line) {
            Ok(Some(c)) => c,
            Ok(None) => continue,
            Err(e) => {
                eprintln!("{}", e);
                continue;
            },
        };

        if cmd == ShellCmd::Quit {
            break;
        }

        for resp in rt.block_on(conductor.conduct(cmd)) {
            println!("{}", resp);
        }
    }
}
