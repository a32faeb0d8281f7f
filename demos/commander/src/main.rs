//! Dual-pane file commander in a terminal.
//!
//! Usage: `commander [LEFT_PATH] [RIGHT_PATH]`. Without arguments the
//! panes open the working directory and the home directory. Point
//! `MULLION_CONFIG` at a JSON file to override runtime tunables like
//! repeat delays and frame rate.

use std::rc::Rc;
use std::{env, fs};

use anyhow::Context;
use mullion_core::{Runtime, RuntimeConfig, SystemClock};
use mullion_screens::{Commander, OsLister};
use mullion_term::TermPlatform;

fn load_config() -> anyhow::Result<RuntimeConfig> {
    match env::var_os("MULLION_CONFIG") {
        Some(path) => {
            let text = fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.to_string_lossy()))?;
            serde_json::from_str(&text).context("parsing runtime config")
        }
        None => Ok(RuntimeConfig::default()),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut args = env::args().skip(1);
    let left = args
        .next()
        .or_else(|| env::var("PWD").ok())
        .unwrap_or_else(|| "/".to_owned());
    let right = args
        .next()
        .or_else(|| env::var("HOME").ok())
        .unwrap_or_else(|| "/".to_owned());

    let platform = TermPlatform::new().context("claiming the terminal")?;
    let (w, h) = platform.size().context("querying terminal size")?;
    let mut config = load_config()?;
    config.base_width = w;
    config.base_height = h;

    let mut rt = Runtime::new(Box::new(platform), Box::new(SystemClock::new()), config);
    let commander = Rc::new(Commander::new(
        rt.config(),
        Rc::new(OsLister),
        &left,
        &right,
    ));
    rt.run(commander).context("running the commander")?;
    Ok(())
}
