use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::braille::{DEFAULT_LINE_WIDTH, Presentation};
use crate::document::{DocumentFormat, DocumentMode};

const DEFAULT_SETTINGS_TOML: &str = include_str!("../settings.toml");

pub const DEFAULT_SUMMARY_THRESHOLD: usize = 200;
pub const DEFAULT_TITLE: &str = "Menu in Braille";

#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub braille: BrailleSettings,
    pub document: DocumentSettings,
    pub summarizer: SummarizerSettings,
}

#[derive(Debug, Clone)]
pub struct BrailleSettings {
    pub line_width: usize,
    pub summary_threshold: usize,
}

impl Default for BrailleSettings {
    fn default() -> Self {
        Self {
            line_width: DEFAULT_LINE_WIDTH,
            summary_threshold: DEFAULT_SUMMARY_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DocumentSettings {
    pub title: String,
    pub mode: DocumentMode,
    pub format: DocumentFormat,
    pub presentation: Presentation,
    pub font_path: Option<String>,
    pub font_family: Option<String>,
    pub fallback_families: Vec<String>,
}

impl Default for DocumentSettings {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            mode: DocumentMode::Sequential,
            format: DocumentFormat::Pdf,
            presentation: Presentation::Glyph,
            font_path: None,
            font_family: None,
            fallback_families: vec![
                "DejaVu Sans".to_string(),
                "Noto Sans Symbols 2".to_string(),
                "Segoe UI Symbol".to_string(),
                "Apple Braille".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone)]
pub struct SummarizerSettings {
    pub enabled: bool,
    pub model: String,
    pub max_words: usize,
    pub api_key: Option<String>,
}

impl Default for SummarizerSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            model: crate::summarizer::DEFAULT_MODEL.to_string(),
            max_words: 60,
            api_key: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    braille: Option<BrailleFile>,
    document: Option<DocumentFile>,
    summarizer: Option<SummarizerFile>,
}

#[derive(Debug, Default, Deserialize)]
struct BrailleFile {
    line_width: Option<usize>,
    summary_threshold: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct DocumentFile {
    title: Option<String>,
    mode: Option<String>,
    format: Option<String>,
    presentation: Option<String>,
    font_path: Option<String>,
    font_family: Option<String>,
    fallback_families: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct SummarizerFile {
    enabled: Option<bool>,
    model: Option<String>,
    max_words: Option<usize>,
    api_key: Option<String>,
}

pub fn load_settings(extra_path: Option<&Path>) -> Result<Settings> {
    let mut settings = Settings::default();
    ensure_home_settings_file()?;

    let defaults: SettingsFile =
        toml::from_str(DEFAULT_SETTINGS_TOML).with_context(|| "failed to parse default settings")?;
    settings.merge(defaults)?;

    let mut ordered_paths = vec![
        PathBuf::from("settings.toml"),
        PathBuf::from("settings.local.toml"),
    ];
    if let Some(home) = home_dir() {
        ordered_paths.push(home.join("settings.toml"));
        ordered_paths.push(home.join("settings.local.toml"));
    }
    if let Some(extra) = extra_path {
        if !extra.exists() {
            return Err(anyhow!("settings file not found: {}", extra.display()));
        }
        ordered_paths.push(extra.to_path_buf());
    }

    for path in ordered_paths {
        if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("failed to read settings: {}", path.display()))?;
            let parsed: SettingsFile = toml::from_str(&content)
                .with_context(|| format!("failed to parse settings: {}", path.display()))?;
            settings
                .merge(parsed)
                .with_context(|| format!("invalid settings: {}", path.display()))?;
        }
    }

    Ok(settings)
}

impl Settings {
    fn merge(&mut self, incoming: SettingsFile) -> Result<()> {
        if let Some(braille) = incoming.braille {
            if let Some(width) = braille.line_width {
                if width > 0 {
                    self.braille.line_width = width;
                }
            }
            if let Some(threshold) = braille.summary_threshold {
                self.braille.summary_threshold = threshold;
            }
        }
        if let Some(document) = incoming.document {
            if let Some(title) = non_empty(document.title) {
                self.document.title = title;
            }
            if let Some(mode) = non_empty(document.mode) {
                self.document.mode = mode.parse()?;
            }
            if let Some(format) = non_empty(document.format) {
                self.document.format = format.parse()?;
            }
            if let Some(presentation) = non_empty(document.presentation) {
                self.document.presentation = presentation.parse()?;
            }
            if let Some(path) = non_empty(document.font_path) {
                self.document.font_path = Some(path);
            }
            if let Some(family) = non_empty(document.font_family) {
                self.document.font_family = Some(family);
            }
            if let Some(families) = document.fallback_families {
                let families = families
                    .into_iter()
                    .filter(|family| !family.trim().is_empty())
                    .collect::<Vec<_>>();
                if !families.is_empty() {
                    self.document.fallback_families = families;
                }
            }
        }
        if let Some(summarizer) = incoming.summarizer {
            if let Some(enabled) = summarizer.enabled {
                self.summarizer.enabled = enabled;
            }
            if let Some(model) = non_empty(summarizer.model) {
                self.summarizer.model = model;
            }
            if let Some(max_words) = summarizer.max_words {
                if max_words > 0 {
                    self.summarizer.max_words = max_words;
                }
            }
            if let Some(key) = non_empty(summarizer.api_key) {
                self.summarizer.api_key = Some(key);
            }
        }
        Ok(())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

fn ensure_home_settings_file() -> Result<()> {
    let Some(home) = home_dir() else {
        return Ok(());
    };
    fs::create_dir_all(&home)
        .with_context(|| format!("failed to create settings directory: {}", home.display()))?;
    let path = home.join("settings.toml");
    if !path.exists() {
        fs::write(&path, DEFAULT_SETTINGS_TOML)
            .with_context(|| format!("failed to write settings: {}", path.display()))?;
    }
    Ok(())
}

fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME").ok().and_then(|home| {
        let home = home.trim();
        if home.is_empty() {
            None
        } else {
            Some(Path::new(home).join(".menu-braille"))
        }
    })
}
