//! Presentation of a [ResolvedMapping]
use crate::resolve::ResolvedMapping;
use std::io::Write;

/// Output formats
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// `NAME=value` lines
    #[default]
    Env,
    /// `export NAME='value'` lines, for `eval` in a POSIX shell
    Export,
    Json,
    Yaml,
}

impl Format {
    /// Line oriented formats can be concatenated, separated by a blank line
    pub fn is_line_oriented(&self) -> bool {
        matches!(self, Format::Env | Format::Export)
    }
}

pub fn emit(
    mut writer: impl Write,
    resolved: &ResolvedMapping,
    format: Format,
) -> anyhow::Result<()> {
    match format {
        Format::Env => {
            for (name, value) in resolved {
                writeln!(writer, "{name}={value}")?;
            }
        }
        Format::Export => {
            for (name, value) in resolved {
                writeln!(writer, "export {name}={}", shell_quote(value))?;
            }
        }
        Format::Json => {
            serde_json::to_writer_pretty(&mut writer, resolved)?;
            writeln!(writer)?;
        }
        Format::Yaml => serde_yaml::to_writer(&mut writer, resolved)?,
    };

    Ok(())
}

/// Single quotes `value`, `'` becomes `'\''`
fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}
