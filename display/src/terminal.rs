use std::{collections::HashMap, io::Write, path::Path};

use log::{debug, trace};

use config::{DisplayConfig, PanelConfig};
use pacing::{DisplayError, DisplaySurface, StateId};

use crate::error::Error;

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Visible {
    Nothing,
    Init,
    /// Address of the visible panel.
    Panel(String),
}

/// Panels drawn as text on a terminal, one at a time.
///
/// A panel is addressed by `prefix + state id`, matched exactly.
#[derive(Debug)]
pub struct TerminalSurface<W> {
    prefix: String,
    panels: HashMap<String, String>,
    init: String,
    clear_screen: bool,
    visible: Visible,
    writer: W,
}

impl<W> TerminalSurface<W>
where
    W: Write,
{
    pub fn new(writer: W, prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            panels: HashMap::new(),
            init: String::new(),
            clear_screen: true,
            visible: Visible::Nothing,
            writer,
        }
    }

    /// Builds the surface described by `config`. Panel files are resolved
    /// against `base_dir`.
    pub fn from_config(config: &DisplayConfig, base_dir: &Path, writer: W) -> Result<Self, Error> {
        let mut surface = Self::new(writer, config.prefix.clone())
            .with_clear_screen(config.clear_screen)
            .with_init(load_panel(&config.init, base_dir)?);

        for (id, panel) in &config.panels {
            let id = StateId::new(id.as_str())?;
            surface.register(&id, load_panel(panel, base_dir)?);
        }

        debug!(
            "loaded {} panels under prefix {:?}",
            surface.panels.len(),
            surface.prefix
        );
        Ok(surface)
    }

    pub fn with_init(mut self, text: impl Into<String>) -> Self {
        self.init = text.into();
        self
    }

    pub fn with_clear_screen(mut self, clear_screen: bool) -> Self {
        self.clear_screen = clear_screen;
        self
    }

    pub fn register(&mut self, id: &StateId, text: impl Into<String>) {
        let address = self.address(id);
        self.panels.insert(address, text.into());
    }

    pub fn address(&self, id: &StateId) -> String {
        format!("{}{}", self.prefix, id)
    }

    pub fn visible(&self) -> &Visible {
        &self.visible
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    fn render(&mut self, text: &str) -> Result<(), DisplayError> {
        writeln!(self.writer, "{text}")?;
        self.writer.flush()?;
        Ok(())
    }
}

impl<W> DisplaySurface for TerminalSurface<W>
where
    W: Write,
{
    fn hide_all(&mut self) -> Result<(), DisplayError> {
        self.visible = Visible::Nothing;
        if self.clear_screen {
            self.writer.write_all(CLEAR_SCREEN.as_bytes())?;
            self.writer.flush()?;
        }
        Ok(())
    }

    fn show(&mut self, id: &StateId) -> Result<(), DisplayError> {
        let address = self.address(id);
        // Looked up before hiding so a bad id leaves the current panel up.
        let Some(text) = self.panels.get(&address).cloned() else {
            return Err(DisplayError::UnregisteredPanel(address));
        };

        self.hide_all()?;
        trace!("drawing panel {address}");
        self.render(&text)?;
        self.visible = Visible::Panel(address);
        Ok(())
    }

    fn show_init(&mut self) -> Result<(), DisplayError> {
        self.hide_all()?;
        let init = self.init.clone();
        self.render(&init)?;
        self.visible = Visible::Init;
        Ok(())
    }
}

fn load_panel(panel: &PanelConfig, base_dir: &Path) -> Result<String, Error> {
    match panel {
        PanelConfig::Text { text } => Ok(text.clone()),
        PanelConfig::File { file } => {
            let path = base_dir.join(file);
            std::fs::read_to_string(&path).map_err(|source| Error::ReadPanel { path, source })
        }
    }
}
