use crate::{
    markdown::parse::{DeckParser, ParseError},
    presentation::Deck,
    storage::{PresentationStore, StorageError},
};
use serde::Serialize;
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use tracing::info;

const STYLE: &str = r#"
body { margin: 0; font-family: sans-serif; background: #1e1e2e; color: #cdd6f4; }
.slide { min-height: 100vh; box-sizing: border-box; padding: 4em; border-bottom: 1px solid #45475a; }
.slide .timing { float: right; color: #a6adc8; font-size: 0.9em; }
pre { background: #181825; padding: 1em; overflow-x: auto; }
"#;

/// Allows exporting presentations into other formats.
pub struct Exporter {
    parser: DeckParser,
}

impl Exporter {
    /// Construct a new exporter.
    pub fn new(parser: DeckParser) -> Self {
        Self { parser }
    }

    /// Export the presentation at the given path into a standalone html file.
    pub fn export_html(&self, presentation_path: &Path, output_path: &Path) -> Result<(), ExportError> {
        let deck = self.load_deck(presentation_path)?;
        let title = presentation_path.file_stem().map(|stem| stem.to_string_lossy()).unwrap_or_default();
        let html = render_html(&deck, &title);
        fs::write(output_path, html)
            .map_err(|source| ExportError::WriteOutput { path: output_path.to_path_buf(), source })?;
        info!(slides = deck.len(), output = %output_path.display(), "exported presentation");
        Ok(())
    }

    /// Generate the metadata for the given presentation.
    pub fn generate_metadata(&self, presentation_path: &Path) -> Result<ExportMetadata, ExportError> {
        let deck = self.load_deck(presentation_path)?;
        let total_timing = deck.total_timing();
        Ok(ExportMetadata { presentation_path: presentation_path.to_path_buf(), total_timing, deck })
    }

    fn load_deck(&self, presentation_path: &Path) -> Result<Deck, ExportError> {
        let contents = PresentationStore::load(presentation_path)?;
        let deck = self.parser.parse(&contents)?;
        Ok(deck)
    }
}

/// Render a deck as a standalone html document, one section per slide.
pub(crate) fn render_html(deck: &Deck, title: &str) -> String {
    let mut html = String::new();
    let title = escape_html(title);
    html.push_str(&format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n"
    ));
    for (index, slide) in deck.slides().iter().enumerate() {
        let number = index + 1;
        html.push_str(&format!(
            "<section class=\"slide\" id=\"slide-{number}\" data-timing=\"{timing}\">\n<span class=\"timing\">{number}/{total} · {timing}s</span>\n{content}</section>\n",
            timing = slide.timing,
            total = deck.len(),
            content = slide.html,
        ));
    }
    html.push_str("</body>\n</html>\n");
    html
}

fn escape_html(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '&' => output.push_str("&amp;"),
            '"' => output.push_str("&quot;"),
            c => output.push(c),
        }
    }
    output
}

/// The metadata of a parsed presentation.
#[derive(Debug, Serialize)]
pub struct ExportMetadata {
    presentation_path: PathBuf,
    total_timing: u64,

    #[serde(flatten)]
    deck: Deck,
}

#[derive(thiserror::Error, Debug)]
pub enum ExportError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("writing {}: {source}", path.display())]
    WriteOutput { path: PathBuf, source: io::Error },
}
