//! # appinfo-cli - Appinfo Inspection Shell
//!
//! A REPL-style command-line tool for binary appinfo files. Reads commands
//! from stdin, runs them against the open document and prints results to
//! stdout. Works interactively or scripted (pipe commands via stdin).
//!
//! ## Commands
//!
//! ```text
//! OPEN path               Decode a file (replaces the open document)
//! INFO                    Version, universe, app count
//! APPS                    List app ids
//! SHOW appid              Print an app's header fields and sections
//! GET appid path          Print one value or section (path: a/b/c)
//! SET appid path value    Store a string value
//! SETINT appid path n     Store an int32 value
//! DEL appid path          Remove a key
//! VERIFY                  Check the document re-encodes to the file's bytes
//! SAVE [path]             Encode and write atomically
//! EXIT / QUIT             Leave the shell
//! ```
//!
//! For files with named sections the first path component is the section
//! name, e.g. `GET 220 common/name`.
//!
//! ## Configuration
//!
//! ```text
//! APPINFO_PATH        file opened at startup        (default: none)
//! APPINFO_BACKUP      copy to <path>.bak before SAVE (default: "true")
//! APPINFO_LIST_LIMIT  max apps printed by APPS      (default: 50, 0 = all)
//! RUST_LOG            log filter for env_logger      (default: off)
//! ```

mod render;
mod shell;

use anyhow::Result;
use config::AppinfoConfig;
use log::warn;
use shell::{Flow, Shell};
use std::io::{self, BufRead, Write};

fn main() -> Result<()> {
    env_logger::init();

    let config = AppinfoConfig::from_env();
    let startup_path = config.path.clone();
    let mut shell = Shell::new(config);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    writeln!(out, "appinfo-cli")?;
    writeln!(out, "Commands: OPEN path | INFO | APPS | SHOW appid | GET appid path")?;
    writeln!(out, "          SET appid path value | SETINT appid path n | DEL appid path")?;
    writeln!(out, "          VERIFY | SAVE [path] | EXIT")?;

    if let Some(path) = startup_path {
        if let Err(e) = shell.open(&path, &mut out) {
            warn!("startup open failed: {:#}", e);
            writeln!(out, "ERR {:#}", e)?;
        }
    }

    write!(out, "> ")?;
    out.flush().ok();

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        match shell.execute(&line, &mut out) {
            Ok(Flow::Exit) => break,
            Ok(Flow::Continue) => {}
            Err(e) => writeln!(out, "ERR {:#}", e)?,
        }

        write!(out, "> ")?;
        out.flush().ok();
    }

    Ok(())
}
