//! Indicator settings loaded from YAML.
//!
//! Every field is optional; missing fields take the same defaults as
//! [`ProgressBuilder::new`].
//!
//! ```yaml
//! style: bar
//! label: "Copying "
//! width: 40
//! every: 10
//! filled_char: "="
//! edge_char: ">"
//! empty_char: "-"
//! show_percent: true
//! sizes: bytes
//! stream: stderr
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::Result;
use crate::format::SizeFormat;
use crate::guard::Console;
use crate::progress::{
    Indicator, Mill, ProgressBuilder, Strategy, BAR_EMPTY_CHAR, BAR_FILLED_CHAR, DEFAULT_WIDTH,
    DOTS_CHAR,
};
use crate::sink::{OutputSink, Stream, TermSink};

/// Which indicator a configuration builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorStyle {
    #[default]
    Bar,
    Dots,
    Mill,
}

/// Declarative indicator settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndicatorConfig {
    pub style: IndicatorStyle,
    pub label: String,
    pub width: usize,
    pub every: u64,
    pub hide: bool,
    pub empty_char: char,
    pub filled_char: char,
    pub edge_char: Option<char>,
    pub dot_char: char,
    /// Stream used by [`IndicatorConfig::console`].
    pub stream: Stream,
    pub show_percent: bool,
    pub sizes: SizeFormat,
    pub clear_on_close: bool,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            style: IndicatorStyle::Bar,
            label: String::new(),
            width: DEFAULT_WIDTH,
            every: 1,
            hide: false,
            empty_char: BAR_EMPTY_CHAR,
            filled_char: BAR_FILLED_CHAR,
            edge_char: None,
            dot_char: DOTS_CHAR,
            stream: Stream::Stderr,
            show_percent: false,
            sizes: SizeFormat::Count,
            clear_on_close: false,
        }
    }
}

impl IndicatorConfig {
    /// Parses a configuration from YAML. An empty document gives the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ProgressError::Config`](crate::ProgressError::Config) for
    /// malformed YAML, unknown fields or values of the wrong type.
    ///
    /// # Example
    ///
    /// ```rust
    /// use readout::config::{IndicatorConfig, IndicatorStyle};
    ///
    /// let config = IndicatorConfig::from_yaml(r#"
    /// style: mill
    /// label: Indexing
    /// every: 5
    /// "#).unwrap();
    /// assert_eq!(config.style, IndicatorStyle::Mill);
    /// assert_eq!(config.width, 32);
    /// ```
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Reads and parses a YAML configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    /// Copy these settings onto a builder.
    pub fn apply(&self, builder: ProgressBuilder) -> ProgressBuilder {
        let builder = builder
            .label(self.label.clone())
            .width(self.width)
            .every(self.every)
            .hide(self.hide)
            .empty_char(self.empty_char)
            .filled_char(self.filled_char)
            .dot_char(self.dot_char)
            .show_percent(self.show_percent)
            .sizes(self.sizes)
            .clear_on_close(self.clear_on_close);
        match self.edge_char {
            Some(edge) => builder.edge_char(edge),
            None => builder,
        }
    }

    /// A fresh builder carrying these settings.
    pub fn builder(&self) -> ProgressBuilder {
        self.apply(ProgressBuilder::new())
    }

    /// The strategy selected by `style`, configured with these settings.
    pub fn strategy(&self) -> Box<dyn Strategy> {
        let builder = self.builder();
        match self.style {
            IndicatorStyle::Bar => Box::new(builder.bar_strategy()),
            IndicatorStyle::Dots => Box::new(builder.dots_strategy()),
            IndicatorStyle::Mill => Box::new(Mill::default()),
        }
    }

    /// A console on the configured standard stream.
    pub fn console(&self) -> Console<TermSink> {
        Console::new(TermSink::new(self.stream))
    }

    /// Build the configured indicator on `console`.
    ///
    /// `expected_size` is the total, if already known.
    pub fn build<S: OutputSink>(
        &self,
        console: &Console<S>,
        expected_size: Option<u64>,
    ) -> Result<Indicator<S, Box<dyn Strategy>>> {
        let builder = match expected_size {
            Some(total) => self.builder().expected_size(total),
            None => self.builder(),
        };
        builder.build(console, self.strategy())
    }
}
