//! Command interpreter behind the `appinfo-cli` prompt.
//!
//! One [`Shell`] holds at most one open document plus the bytes it was
//! decoded from, so `VERIFY` can compare a fresh encoding against them.

use anyhow::{anyhow, bail, Context, Result};
use appinfo::{AppRecord, Document, FormatVersion, SectionTree, Sections, Value};
use config::AppinfoConfig;
use log::{debug, info};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::render::{hex, render_tree, render_value};

/// Whether the read loop should keep going after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

struct OpenFile {
    path: PathBuf,
    doc: Document,
    /// Bytes last read from or written to `path`.
    source: Vec<u8>,
    modified: bool,
}

pub struct Shell {
    config: AppinfoConfig,
    file: Option<OpenFile>,
}

impl Shell {
    pub fn new(config: AppinfoConfig) -> Self {
        Self { config, file: None }
    }

    /// Runs one input line, writing its output to `out`.
    ///
    /// Blank lines are ignored. Command names are case-insensitive.
    pub fn execute<W: Write>(&mut self, line: &str, out: &mut W) -> Result<Flow> {
        let mut parts = line.split_whitespace();
        let cmd = match parts.next() {
            Some(cmd) => cmd.to_uppercase(),
            None => return Ok(Flow::Continue),
        };
        let args: Vec<&str> = parts.collect();
        debug!("command {} {:?}", cmd, args);

        match cmd.as_str() {
            "OPEN" => {
                let path = args.first().ok_or_else(|| anyhow!("usage: OPEN path"))?;
                self.open(Path::new(path), out)?;
            }
            "INFO" => self.info(out)?,
            "APPS" => self.apps(out)?,
            "SHOW" => {
                let app_id = parse_app_id(args.first(), "usage: SHOW appid")?;
                self.show(app_id, out)?;
            }
            "GET" => {
                if args.len() != 2 {
                    bail!("usage: GET appid path");
                }
                let app_id = parse_app_id(args.first(), "usage: GET appid path")?;
                self.get(app_id, args[1], out)?;
            }
            "SET" => {
                if args.len() < 3 {
                    bail!("usage: SET appid path value");
                }
                let app_id = parse_app_id(args.first(), "usage: SET appid path value")?;
                let value = args[2..].join(" ");
                self.set(app_id, args[1], Value::from(value.as_str()))?;
                writeln!(out, "OK")?;
            }
            "SETINT" => {
                if args.len() != 3 {
                    bail!("usage: SETINT appid path n");
                }
                let app_id = parse_app_id(args.first(), "usage: SETINT appid path n")?;
                let n: u32 = args[2]
                    .parse()
                    .with_context(|| format!("not a u32: {}", args[2]))?;
                self.set(app_id, args[1], Value::Int32(n))?;
                writeln!(out, "OK")?;
            }
            "DEL" => {
                if args.len() != 2 {
                    bail!("usage: DEL appid path");
                }
                let app_id = parse_app_id(args.first(), "usage: DEL appid path")?;
                if self.del(app_id, args[1])? {
                    writeln!(out, "OK")?;
                } else {
                    writeln!(out, "(nil)")?;
                }
            }
            "VERIFY" => self.verify(out)?,
            "SAVE" => self.save(args.first().map(Path::new), out)?,
            "EXIT" | "QUIT" => {
                if self.file.as_ref().map_or(false, |f| f.modified) {
                    writeln!(out, "warning: unsaved changes discarded")?;
                }
                writeln!(out, "bye")?;
                return Ok(Flow::Exit);
            }
            other => bail!("unknown command: {}", other),
        }

        Ok(Flow::Continue)
    }

    pub fn open<W: Write>(&mut self, path: &Path, out: &mut W) -> Result<()> {
        let source = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        let doc = appinfo::decode(&source)
            .with_context(|| format!("failed to decode {}", path.display()))?;
        info!(
            "opened {} ({} bytes, {} apps, {:?})",
            path.display(),
            source.len(),
            doc.len(),
            doc.version()
        );
        writeln!(out, "OK {} apps, dialect {}", doc.len(), dialect_name(doc.version()))?;
        self.file = Some(OpenFile {
            path: path.to_path_buf(),
            doc,
            source,
            modified: false,
        });
        Ok(())
    }

    fn current(&self) -> Result<&OpenFile> {
        self.file.as_ref().ok_or_else(|| anyhow!("no file open (use OPEN path)"))
    }

    fn current_mut(&mut self) -> Result<&mut OpenFile> {
        self.file.as_mut().ok_or_else(|| anyhow!("no file open (use OPEN path)"))
    }

    fn app(&self, app_id: u32) -> Result<&AppRecord> {
        self.current()?
            .doc
            .get(app_id)
            .ok_or_else(|| anyhow!("no such app: {}", app_id))
    }

    fn info<W: Write>(&self, out: &mut W) -> Result<()> {
        let file = self.current()?;
        writeln!(out, "path: {}", file.path.display())?;
        writeln!(
            out,
            "version: {:#010x}, dialect {}",
            file.doc.version().magic(),
            dialect_name(file.doc.version())
        )?;
        writeln!(out, "universe: {}", file.doc.universe())?;
        writeln!(out, "apps: {}", file.doc.len())?;
        writeln!(out, "modified: {}", if file.modified { "yes" } else { "no" })?;
        Ok(())
    }

    fn apps<W: Write>(&self, out: &mut W) -> Result<()> {
        let doc = &self.current()?.doc;
        if doc.is_empty() {
            writeln!(out, "(empty)")?;
            return Ok(());
        }

        let limit = match self.config.list_limit {
            0 => usize::MAX,
            n => n,
        };
        for (app_id, app) in doc.iter().take(limit) {
            writeln!(
                out,
                "{}\tchange={}\tsections={}",
                app_id,
                app.change_number,
                section_count(&app.sections)
            )?;
        }
        if doc.len() > limit {
            writeln!(out, "... and {} more", doc.len() - limit)?;
        }
        writeln!(out, "({} apps)", doc.len())?;
        Ok(())
    }

    fn show<W: Write>(&self, app_id: u32, out: &mut W) -> Result<()> {
        let app = self.app(app_id)?;
        writeln!(out, "app {}", app_id)?;
        writeln!(out, "  size: {}", app.size)?;
        writeln!(out, "  state: {}", app.state)?;
        writeln!(out, "  last_update: {}", app.last_update)?;
        writeln!(out, "  access_token: {}", app.access_token)?;
        writeln!(out, "  checksum: {}", hex(&app.checksum))?;
        writeln!(out, "  change_number: {}", app.change_number)?;

        match &app.sections {
            Sections::Single(tree) => write!(out, "{}", render_tree(tree))?,
            Sections::Named(sections) => {
                for (name, section) in sections {
                    writeln!(out, "[{}] id={}", String::from_utf8_lossy(name), section.id)?;
                    write!(out, "{}", render_tree(&section.tree))?;
                }
            }
        }
        Ok(())
    }

    fn get<W: Write>(&self, app_id: u32, path: &str, out: &mut W) -> Result<()> {
        let app = self.app(app_id)?;
        let keys = split_path(path)?;
        let (tree, rest) = locate(&app.sections, &keys)?;

        if rest.is_empty() {
            write!(out, "{}", render_tree(tree))?;
            return Ok(());
        }
        match tree.get_path(rest) {
            Some(Value::Section(child)) => write!(out, "{}", render_tree(child))?,
            Some(value) => writeln!(out, "{}", render_value(value))?,
            None => writeln!(out, "(nil)")?,
        }
        Ok(())
    }

    fn set(&mut self, app_id: u32, path: &str, value: Value) -> Result<()> {
        let keys = split_path(path)?;
        let file = self.current_mut()?;
        let app = file
            .doc
            .get_mut(app_id)
            .ok_or_else(|| anyhow!("no such app: {}", app_id))?;
        let (tree, rest) = locate_mut(&mut app.sections, &keys)?;
        if rest.is_empty() {
            bail!("path must name a key inside the section");
        }
        tree.insert_path(rest, value)?;
        file.modified = true;
        Ok(())
    }

    fn del(&mut self, app_id: u32, path: &str) -> Result<bool> {
        let keys = split_path(path)?;
        let file = self.current_mut()?;
        let app = file
            .doc
            .get_mut(app_id)
            .ok_or_else(|| anyhow!("no such app: {}", app_id))?;
        let (tree, rest) = locate_mut(&mut app.sections, &keys)?;
        if rest.is_empty() {
            bail!("path must name a key inside the section");
        }
        let removed = tree.remove_path(rest).is_some();
        if removed {
            file.modified = true;
        }
        Ok(removed)
    }

    fn verify<W: Write>(&self, out: &mut W) -> Result<()> {
        let file = self.current()?;
        let encoded = appinfo::encode(&file.doc)?;

        // Bytes after the terminator are never re-encoded.
        let source = &file.source[..encoded.len().min(file.source.len())];
        if encoded.as_slice() == source {
            writeln!(out, "OK byte-identical ({} bytes)", encoded.len())?;
            if file.source.len() > encoded.len() {
                writeln!(
                    out,
                    "note: {} trailing bytes after the terminator are dropped",
                    file.source.len() - encoded.len()
                )?;
            }
        } else {
            let first_diff = encoded
                .iter()
                .zip(file.source.iter())
                .position(|(a, b)| a != b)
                .unwrap_or_else(|| encoded.len().min(file.source.len()));
            writeln!(
                out,
                "DIFF at offset {} (encoded {} bytes, file {} bytes{})",
                first_diff,
                encoded.len(),
                file.source.len(),
                if file.modified { ", unsaved changes" } else { "" }
            )?;
        }
        Ok(())
    }

    fn save<W: Write>(&mut self, target: Option<&Path>, out: &mut W) -> Result<()> {
        let backup = self.config.backup;
        let file = self.current_mut()?;
        let target = target.map(Path::to_path_buf).unwrap_or_else(|| file.path.clone());

        if backup && target.exists() {
            let mut bak = target.as_os_str().to_owned();
            bak.push(".bak");
            fs::copy(&target, &bak)
                .with_context(|| format!("failed to back up {}", target.display()))?;
            debug!("backed up {} to {:?}", target.display(), bak);
        }

        appinfo::io::write_file(&target, &file.doc)
            .with_context(|| format!("failed to save {}", target.display()))?;
        let written = appinfo::encode(&file.doc)?;
        info!("saved {} ({} bytes)", target.display(), written.len());
        writeln!(out, "OK saved {} bytes to {}", written.len(), target.display())?;

        file.source = written;
        file.path = target;
        file.modified = false;
        Ok(())
    }
}

impl std::fmt::Debug for Shell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("Shell");
        s.field("config", &self.config);
        if let Some(file) = &self.file {
            s.field("path", &file.path)
                .field("version", &file.doc.version())
                .field("apps", &file.doc.len())
                .field("modified", &file.modified);
        }
        s.finish()
    }
}

fn parse_app_id(arg: Option<&&str>, usage: &str) -> Result<u32> {
    let arg = arg.ok_or_else(|| anyhow!("{}", usage))?;
    let app_id: u32 = arg
        .parse()
        .with_context(|| format!("not an app id: {}", arg))?;
    if app_id == appinfo::APP_LIST_END {
        bail!("app id 0 is reserved");
    }
    Ok(app_id)
}

/// Splits `a/b/c` into key components; empty components are dropped.
fn split_path(path: &str) -> Result<Vec<&[u8]>> {
    let keys: Vec<&[u8]> = path
        .split('/')
        .filter(|k| !k.is_empty())
        .map(str::as_bytes)
        .collect();
    if keys.is_empty() {
        bail!("empty key path");
    }
    Ok(keys)
}

fn section_count(sections: &Sections) -> usize {
    match sections {
        Sections::Single(tree) => tree.len(),
        Sections::Named(named) => named.len(),
    }
}

/// Picks the tree a key path starts in.
///
/// Dialect A paths start at the single root tree. Dialect B paths name the
/// section first.
fn locate<'a, 'k>(
    sections: &'a Sections,
    keys: &'k [&'k [u8]],
) -> Result<(&'a SectionTree, &'k [&'k [u8]])> {
    match sections {
        Sections::Single(tree) => Ok((tree, keys)),
        Sections::Named(named) => {
            let (name, rest) = keys.split_first().ok_or_else(|| anyhow!("empty key path"))?;
            let section = named
                .get(*name)
                .ok_or_else(|| anyhow!("no such section: {}", String::from_utf8_lossy(name)))?;
            Ok((&section.tree, rest))
        }
    }
}

fn locate_mut<'a, 'k>(
    sections: &'a mut Sections,
    keys: &'k [&'k [u8]],
) -> Result<(&'a mut SectionTree, &'k [&'k [u8]])> {
    match sections {
        Sections::Single(tree) => Ok((tree, keys)),
        Sections::Named(named) => {
            let (name, rest) = keys.split_first().ok_or_else(|| anyhow!("empty key path"))?;
            let section = named
                .get_mut(*name)
                .ok_or_else(|| anyhow!("no such section: {}", String::from_utf8_lossy(name)))?;
            Ok((&mut section.tree, rest))
        }
    }
}

/// Human-readable dialect label.
pub fn dialect_name(version: FormatVersion) -> &'static str {
    match version {
        FormatVersion::DialectA => "A (single tree)",
        FormatVersion::DialectB => "B (named sections)",
    }
}
