//! askai library exports for testing

use clap::ValueEnum;

pub mod core;
pub mod inference;
pub mod tui;

#[cfg(test)]
pub mod test_support;

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Provider {
    Gemini,
    #[value(name = "lmstudio")]
    LmStudio,
}

impl Provider {
    /// Name used in config files and `ASKAI_PROVIDER`.
    pub fn as_str(self) -> &'static str {
        match self {
            Provider::Gemini => "gemini",
            Provider::LmStudio => "lmstudio",
        }
    }
}
