//! Rendering of a selected path or a workspace list.

use std::fmt;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PanamaError;
use crate::workspace::Workspace;
use crate::Result;

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Bare path
    #[default]
    Path,
    /// `cd "<path>"` for shell eval
    Cd,
    /// JSON object or array
    Json,
}

impl Format {
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Path => "path",
            Format::Cd => "cd",
            Format::Json => "json",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = PanamaError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "path" => Ok(Format::Path),
            "cd" => Ok(Format::Cd),
            "json" => Ok(Format::Json),
            _ => Err(PanamaError::InvalidFormat(s.to_string())),
        }
    }
}

/// Escape characters that stay special inside shell double quotes.
fn shell_quote(path: &str) -> String {
    let mut quoted = String::with_capacity(path.len() + 2);
    quoted.push('"');
    for c in path.chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

#[derive(Serialize)]
struct PathRecord<'a> {
    path: &'a Path,
}

/// Write a single selected path.
pub fn print_path<W: Write>(out: &mut W, path: &Path, format: Format) -> Result<()> {
    match format {
        Format::Path => writeln!(out, "{}", path.display())?,
        Format::Cd => writeln!(out, "cd {}", shell_quote(&path.to_string_lossy()))?,
        Format::Json => {
            serde_json::to_writer_pretty(&mut *out, &PathRecord { path })?;
            writeln!(out)?;
        }
    }
    Ok(())
}

/// Write the full ordered list. `cd` has no list form.
pub fn print_workspaces<W: Write>(
    out: &mut W,
    workspaces: &[Workspace],
    format: Format,
) -> Result<()> {
    match format {
        Format::Path => {
            for ws in workspaces {
                writeln!(out, "{}", ws.path.display())?;
            }
        }
        Format::Json => {
            serde_json::to_writer_pretty(&mut *out, workspaces)?;
            writeln!(out)?;
        }
        Format::Cd => return Err(PanamaError::UnsupportedListFormat(format)),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_path(path: &str, format: Format) -> String {
        let mut buf = Vec::new();
        print_path(&mut buf, Path::new(path), format).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_parse_format() {
        assert_eq!("path".parse::<Format>().unwrap(), Format::Path);
        assert_eq!("cd".parse::<Format>().unwrap(), Format::Cd);
        assert_eq!("json".parse::<Format>().unwrap(), Format::Json);

        let err = "invalid".parse::<Format>().unwrap_err();
        assert_eq!(err.to_string(), "invalid format: invalid");
    }

    #[test]
    fn test_print_path_formats() {
        assert_eq!(render_path("/r/app", Format::Path), "/r/app\n");
        assert_eq!(render_path("/r/app", Format::Cd), "cd \"/r/app\"\n");

        let value: serde_json::Value =
            serde_json::from_str(&render_path("/r/app", Format::Json)).unwrap();
        assert_eq!(value["path"], "/r/app");
    }

    #[test]
    fn test_cd_escapes_shell_specials() {
        assert_eq!(
            render_path("/r/my \"app\"/$HOME", Format::Cd),
            "cd \"/r/my \\\"app\\\"/\\$HOME\"\n"
        );
    }

    #[test]
    fn test_print_workspaces() {
        let mut a = Workspace::new("/r/a", 1);
        a.score = Some(1.1);
        let workspaces = vec![a, Workspace::new("/r/b", 1)];

        let mut buf = Vec::new();
        print_workspaces(&mut buf, &workspaces, Format::Path).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "/r/a\n/r/b\n");

        let mut buf = Vec::new();
        print_workspaces(&mut buf, &workspaces, Format::Json).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 2);
        assert_eq!(value[0]["name"], "a");
        assert_eq!(value[0]["score"], 1.1);
        assert!(value[1].get("score").is_none());
    }

    #[test]
    fn test_cd_not_supported_for_lists() {
        let mut buf = Vec::new();
        let result = print_workspaces(&mut buf, &[], Format::Cd);
        assert!(matches!(
            result,
            Err(PanamaError::UnsupportedListFormat(Format::Cd))
        ));
    }
}
