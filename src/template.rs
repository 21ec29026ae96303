use std::{fmt, sync::LazyLock};

use regex::{Captures, Regex};

pub const DEFAULT_MESSAGE: &str =
    "Tengo contratado {0} y mi velocidad de descarga es de {1}, @CableFibertel";

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{|\}\}|\{(\d*)\}").expect("placeholder pattern is valid"));

/// A status text with `{n}` and `{}` placeholders.
///
/// The bot passes `[expected speed, download, upload, ping]`, so a template
/// may reference any of them. `{}` takes the next argument in order, `{{`
/// and `}}` produce literal braces. Placeholders without a matching argument
/// are left untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplate(String);

impl MessageTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn render(&self, args: &[&dyn fmt::Display]) -> String {
        let mut next = 0;
        PLACEHOLDER
            .replace_all(&self.0, |caps: &Captures| match &caps[0] {
                "{{" => "{".to_string(),
                "}}" => "}".to_string(),
                _ => {
                    let index = match &caps[1] {
                        "" => {
                            next += 1;
                            Some(next - 1)
                        }
                        digits => digits.parse::<usize>().ok(),
                    };
                    index
                        .and_then(|index| args.get(index))
                        .map_or_else(|| caps[0].to_string(), |arg| arg.to_string())
                }
            })
            .into_owned()
    }
}

impl Default for MessageTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_MESSAGE)
    }
}
