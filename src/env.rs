//! Dotenv-style configuration loading
//!
//! Reads one or more `KEY=VALUE` files, merges them with a fixed precedence,
//! optionally expands `${NAME}` references, and seeds the process environment.
//! Typed accessors read back from the process environment at call time.
//!
//! File grammar: blank lines and `#` comment lines are skipped, a leading
//! `export ` token is stripped, the key is everything before the first
//! unescaped `=`, values may be quoted with matching single or double quotes,
//! unquoted values are truncated at an inline ` #` comment, and the escapes
//! `\\`, `\n`, `\r`, `\t`, `\"`, `\'` are substituted.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use tracing::debug;

use crate::error::{OutpostError, Result};

/// Loading behavior switches.
///
/// `overwrite` makes later files win over earlier ones and lets loaded keys
/// replace variables already present in the process environment. `expand`
/// substitutes `${NAME}` references in every merged value, resolving first
/// against the merged mapping and then against the process environment;
/// unresolved names expand to the empty string.
#[derive(Debug, Default, Clone, Copy)]
pub struct Options {
    pub overwrite: bool,
    pub expand: bool,
}

/// Load the conventional `.env` and `.env.local` pair.
pub fn load_default(options: &Options) -> Result<HashMap<String, String>> {
    load(&[".env", ".env.local"], options)
}

/// Load and merge the given env files, then apply the result to the process
/// environment.
///
/// An empty file list defaults to `[".env"]`. Paths that are missing or are
/// directories are skipped silently; a file that exists but cannot be read is
/// a hard error. The returned mapping holds the merged (and, with `expand`,
/// expanded) values. Keys already present in the process environment are left
/// untouched unless `overwrite` is set.
pub fn load<P: AsRef<Path>>(files: &[P], options: &Options) -> Result<HashMap<String, String>> {
    let paths: Vec<&Path> = files.iter().map(AsRef::as_ref).collect();
    let paths = if paths.is_empty() {
        vec![Path::new(".env")]
    } else {
        paths
    };

    let mut values: HashMap<String, String> = HashMap::new();
    for path in paths {
        if path.as_os_str().is_empty() {
            continue;
        }
        match fs::metadata(path) {
            Ok(meta) if meta.is_dir() => {
                debug!("skipping env path (is a directory): {}", path.display());
                continue;
            }
            Err(_) => {
                debug!("skipping missing env file: {}", path.display());
                continue;
            }
            Ok(_) => {}
        }
        let content = fs::read_to_string(path)?;
        for (key, value) in parse(&content) {
            if options.overwrite || !values.contains_key(&key) {
                values.insert(key, value);
            }
        }
    }

    if options.expand {
        let merged = values.clone();
        for value in values.values_mut() {
            *value = expand(value, |name| {
                merged
                    .get(name)
                    .cloned()
                    .or_else(|| std::env::var(name).ok())
            });
        }
    }

    for (key, value) in &values {
        if std::env::var_os(key).is_some() && !options.overwrite {
            continue;
        }
        std::env::set_var(key, value);
    }

    Ok(values)
}

/// Parse the body of one env file. Later lines win over earlier ones within
/// the same file.
fn parse(content: &str) -> HashMap<String, String> {
    let mut out = HashMap::new();
    for raw in content.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").map_or(line, str::trim);
        if let Some((key, value)) = split_kv(line) {
            if !key.is_empty() {
                out.insert(key, value);
            }
        }
    }
    out
}

/// Split a line at its first unescaped `=` and normalize the value.
fn split_kv(line: &str) -> Option<(String, String)> {
    let mut escaped = false;
    let mut split_at = None;
    for (idx, ch) in line.char_indices() {
        if ch == '\\' {
            escaped = !escaped;
            continue;
        }
        if ch == '=' && !escaped {
            split_at = Some(idx);
            break;
        }
        escaped = false;
    }
    let idx = split_at?;

    let key = line[..idx].trim().to_string();
    let mut value = line[idx + 1..].trim();

    let quoted = is_quoted(value);
    if quoted {
        value = &value[1..value.len() - 1];
    } else {
        // Inline comments only apply to unquoted values.
        value = trim_inline_comment(value);
    }

    Some((key, unescape(value)))
}

fn is_quoted(s: &str) -> bool {
    s.len() >= 2
        && ((s.starts_with('"') && s.ends_with('"'))
            || (s.starts_with('\'') && s.ends_with('\'')))
}

/// Truncate at the first `#` that starts the value or follows a space.
fn trim_inline_comment(s: &str) -> &str {
    let bytes = s.as_bytes();
    for i in 0..bytes.len() {
        if bytes[i] == b'#' && (i == 0 || bytes[i - 1] == b' ') {
            return s[..i].trim_end();
        }
    }
    s
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('"') => out.push('"'),
            Some('\'') => out.push('\''),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Substitute `${NAME}` tokens using `lookup`; unresolved names become the
/// empty string. A `${` without a closing brace is emitted verbatim.
fn expand<F>(s: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        match rest[start + 2..].find('}') {
            Some(end) => {
                let name = &rest[start + 2..start + 2 + end];
                if let Some(value) = lookup(name) {
                    out.push_str(&value);
                }
                rest = &rest[start + 2 + end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                return out;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Read a string variable, falling back to `default` when unset.
pub fn string(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Read a required string variable.
///
/// # Panics
///
/// Panics when the variable is unset or empty. Meant for startup-time
/// configuration where continuing without the value makes no sense.
pub fn must_string(key: &str) -> String {
    match std::env::var(key) {
        Ok(value) if !value.is_empty() => value,
        _ => panic!("{}", OutpostError::MissingEnv(key.to_string())),
    }
}

/// Read an integer variable, falling back to `default` on absence or parse
/// failure.
pub fn int(key: &str, default: i64) -> i64 {
    match std::env::var(key) {
        Ok(value) => value.trim().parse().unwrap_or(default),
        Err(_) => default,
    }
}

/// Read a boolean variable. Accepts the usual literal set (`1`, `t`, `true`,
/// `0`, `f`, `false`, case variants); anything else falls back to `default`.
pub fn bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(value) => match value.trim() {
            "1" | "t" | "T" | "true" | "TRUE" | "True" => true,
            "0" | "f" | "F" | "false" | "FALSE" | "False" => false,
            _ => default,
        },
        Err(_) => default,
    }
}

/// Read a duration variable. Accepts an integer with an optional `ms`, `s`,
/// `m`, or `h` suffix; a bare integer is seconds.
pub fn duration(key: &str, default: Duration) -> Duration {
    match std::env::var(key) {
        Ok(value) => parse_duration(&value).unwrap_or(default),
        Err(_) => default,
    }
}

fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if let Some(n) = s.strip_suffix("ms") {
        return n.trim().parse().ok().map(Duration::from_millis);
    }
    if let Some(n) = s.strip_suffix('s') {
        return n.trim().parse().ok().map(Duration::from_secs);
    }
    if let Some(n) = s.strip_suffix('m') {
        return n.trim().parse::<u64>().ok().map(|v| Duration::from_secs(v * 60));
    }
    if let Some(n) = s.strip_suffix('h') {
        return n.trim().parse::<u64>().ok().map(|v| Duration::from_secs(v * 3600));
    }
    s.parse().ok().map(Duration::from_secs)
}

/// Read a separator-delimited list variable. An empty value yields an empty
/// list; an unset variable yields `default`.
pub fn strings(key: &str, separator: &str, default: &[&str]) -> Vec<String> {
    match std::env::var(key) {
        Ok(value) if value.trim().is_empty() => Vec::new(),
        Ok(value) => value
            .split(separator)
            .map(|part| part.trim().to_string())
            .collect(),
        Err(_) => default.iter().map(ToString::to_string).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn env_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("failed to create temp env file");
        file.write_all(content.as_bytes())
            .expect("failed to write temp env file");
        file
    }

    #[test]
    fn parse_skips_blanks_comments_and_keyless_lines() {
        let parsed = parse("\n# comment\nno_equals_here\nKEY=value\n  \n");
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed["KEY"], "value");
    }

    #[test]
    fn parse_strips_export_prefix_and_trims() {
        let parsed = parse("export DATABASE_URL = postgres://localhost \n");
        assert_eq!(parsed["DATABASE_URL"], "postgres://localhost");
    }

    #[test]
    fn split_kv_honors_escaped_equals() {
        let (key, value) = split_kv(r"WEIRD\=KEY=v").expect("line should split");
        assert_eq!(key, r"WEIRD\=KEY");
        assert_eq!(value, "v");
    }

    #[test]
    fn quoted_values_keep_inline_hash() {
        let parsed = parse(r#"QUOTE='he said "hi" # not a comment'"#);
        assert_eq!(parsed["QUOTE"], r#"he said "hi" # not a comment"#);
    }

    #[test]
    fn unquoted_values_lose_inline_comment() {
        let parsed = parse("PLAIN=value # trailing note");
        assert_eq!(parsed["PLAIN"], "value");
    }

    #[test]
    fn backslash_escapes_are_substituted() {
        let parsed = parse(r#"ESCAPED="line1\nline2\t\"quoted\"""#);
        assert_eq!(parsed["ESCAPED"], "line1\nline2\t\"quoted\"");
    }

    #[test]
    fn expand_resolves_and_blanks_unknowns() {
        let expanded = expand("${KNOWN}-${UNKNOWN}-${tail", |name| {
            (name == "KNOWN").then(|| "yes".to_string())
        });
        assert_eq!(expanded, "yes--${tail");
    }

    #[test]
    #[serial]
    fn load_round_trip_with_expansion() {
        let file = env_file("RT_A=1\nRT_B=\"${RT_A}2\"\n#comment\nexport RT_C=3\n");
        for key in ["RT_A", "RT_B", "RT_C"] {
            std::env::remove_var(key);
        }

        let values = load(
            &[file.path()],
            &Options {
                overwrite: false,
                expand: true,
            },
        )
        .expect("load should succeed");

        assert_eq!(values.len(), 3);
        assert_eq!(std::env::var("RT_A").unwrap(), "1");
        assert_eq!(std::env::var("RT_B").unwrap(), "12");
        assert_eq!(std::env::var("RT_C").unwrap(), "3");
    }

    #[test]
    #[serial]
    fn first_file_wins_unless_overwrite() {
        let first = env_file("PREC_KEY=first\n");
        let second = env_file("PREC_KEY=second\n");
        std::env::remove_var("PREC_KEY");

        let values =
            load(&[first.path(), second.path()], &Options::default()).expect("load should succeed");
        assert_eq!(values["PREC_KEY"], "first");

        let values = load(
            &[first.path(), second.path()],
            &Options {
                overwrite: true,
                expand: false,
            },
        )
        .expect("load should succeed");
        assert_eq!(values["PREC_KEY"], "second");

        std::env::remove_var("PREC_KEY");
    }

    #[test]
    #[serial]
    fn ambient_environment_wins_unless_overwrite() {
        let file = env_file("AMBIENT_KEY=from_file\n");
        std::env::set_var("AMBIENT_KEY", "ambient");

        load(&[file.path()], &Options::default()).expect("load should succeed");
        assert_eq!(std::env::var("AMBIENT_KEY").unwrap(), "ambient");

        load(
            &[file.path()],
            &Options {
                overwrite: true,
                expand: false,
            },
        )
        .expect("load should succeed");
        assert_eq!(std::env::var("AMBIENT_KEY").unwrap(), "from_file");

        std::env::remove_var("AMBIENT_KEY");
    }

    #[test]
    #[serial]
    fn missing_files_are_skipped() {
        let values = load(&["definitely-not-here.env"], &Options::default())
            .expect("missing files should not error");
        assert!(values.is_empty());
    }

    #[test]
    #[serial]
    fn expansion_falls_back_to_ambient_environment() {
        let file = env_file("FALLBACK_VALUE=${FALLBACK_SOURCE}/suffix\n");
        std::env::set_var("FALLBACK_SOURCE", "ambient");
        std::env::remove_var("FALLBACK_VALUE");

        let values = load(
            &[file.path()],
            &Options {
                overwrite: false,
                expand: true,
            },
        )
        .expect("load should succeed");
        assert_eq!(values["FALLBACK_VALUE"], "ambient/suffix");

        std::env::remove_var("FALLBACK_SOURCE");
        std::env::remove_var("FALLBACK_VALUE");
    }

    #[test]
    #[serial]
    fn typed_accessors_apply_defaults() {
        std::env::remove_var("TYPED_MISSING");
        assert_eq!(string("TYPED_MISSING", "fallback"), "fallback");
        assert_eq!(int("TYPED_MISSING", 42), 42);
        assert!(bool("TYPED_MISSING", true));
        assert_eq!(
            duration("TYPED_MISSING", Duration::from_secs(7)),
            Duration::from_secs(7)
        );
        assert_eq!(strings("TYPED_MISSING", ",", &["a", "b"]), vec!["a", "b"]);

        std::env::set_var("TYPED_INT", "not-a-number");
        assert_eq!(int("TYPED_INT", 42), 42);
        std::env::set_var("TYPED_INT", " 17 ");
        assert_eq!(int("TYPED_INT", 42), 17);
        std::env::remove_var("TYPED_INT");

        std::env::set_var("TYPED_BOOL", "T");
        assert!(bool("TYPED_BOOL", false));
        std::env::set_var("TYPED_BOOL", "0");
        assert!(!bool("TYPED_BOOL", true));
        std::env::remove_var("TYPED_BOOL");

        std::env::set_var("TYPED_DURATION", "250ms");
        assert_eq!(
            duration("TYPED_DURATION", Duration::ZERO),
            Duration::from_millis(250)
        );
        std::env::set_var("TYPED_DURATION", "2m");
        assert_eq!(
            duration("TYPED_DURATION", Duration::ZERO),
            Duration::from_secs(120)
        );
        std::env::set_var("TYPED_DURATION", "90");
        assert_eq!(
            duration("TYPED_DURATION", Duration::ZERO),
            Duration::from_secs(90)
        );
        std::env::remove_var("TYPED_DURATION");

        std::env::set_var("TYPED_LIST", "a, b ,c");
        assert_eq!(strings("TYPED_LIST", ",", &[]), vec!["a", "b", "c"]);
        std::env::set_var("TYPED_LIST", "  ");
        assert!(strings("TYPED_LIST", ",", &["default"]).is_empty());
        std::env::remove_var("TYPED_LIST");
    }

    #[test]
    #[serial]
    #[should_panic(expected = "Missing required environment variable")]
    fn must_string_panics_on_absence() {
        std::env::remove_var("REQUIRED_BUT_ABSENT");
        must_string("REQUIRED_BUT_ABSENT");
    }
}
