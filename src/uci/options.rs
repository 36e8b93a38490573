//! The option registry the `uci` handshake advertises and `setoption`
//! mutates.

pub const MIN_HASH_MB: usize = 1;
pub const MAX_HASH_MB: usize = 4096;
pub const DEFAULT_HASH_MB: usize = 256;

fn print_spin(name: &str, default: impl std::fmt::Display, min: impl std::fmt::Display, max: impl std::fmt::Display) {
    println!("option name {name} type spin default {default} min {min} max {max}");
}

fn print_check(name: &str, default: bool) {
    println!(
        "option name {name} type check default {}",
        if default { "true" } else { "false" }
    );
}

/// A `setoption` that the session must act on beyond recording the value.
pub enum UciOptionAction {
    ReinitHash(usize),
}

pub struct UciOptions {
    pub hash_mb: usize,
    pub ponder: bool,
}

impl UciOptions {
    #[must_use]
    pub fn new() -> Self {
        UciOptions {
            hash_mb: DEFAULT_HASH_MB,
            ponder: false,
        }
    }

    pub fn print_handshake(&self) {
        println!("id name mantis_core");
        println!("id author the mantis_core contributors");
        print_spin("Hash", self.hash_mb, MIN_HASH_MB, MAX_HASH_MB);
        print_check("Ponder", self.ponder);
        println!("uciok");
    }

    /// Applies a parsed `name`/`value` pair. Returns an action the caller
    /// must carry out (e.g. resizing the TT) since this struct doesn't own
    /// it.
    pub fn apply_setoption(&mut self, name: &str, value: Option<&str>) -> Option<UciOptionAction> {
        match name.trim().to_ascii_lowercase().as_str() {
            "hash" => {
                let mb = value
                    .and_then(|v| v.parse::<usize>().ok())
                    .unwrap_or(DEFAULT_HASH_MB)
                    .clamp(MIN_HASH_MB, MAX_HASH_MB);
                if mb != self.hash_mb {
                    #[cfg(feature = "logging")]
                    log::debug!("resizing transposition table: {} MiB -> {} MiB", self.hash_mb, mb);
                    self.hash_mb = mb;
                    return Some(UciOptionAction::ReinitHash(mb));
                }
            }
            "ponder" => {
                if let Some(v) = value {
                    self.ponder = matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1");
                }
            }
            _ => {}
        }
        None
    }
}

impl Default for UciOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Splits `setoption name <...> value <...>` into its name/value parts.
#[must_use]
pub fn parse_setoption(parts: &[&str]) -> Option<(String, Option<String>)> {
    if parts.is_empty() || parts[0] != "setoption" {
        return None;
    }

    let mut name_parts: Vec<&str> = Vec::new();
    let mut value_parts: Vec<&str> = Vec::new();
    let mut mode = "";

    for part in parts.iter().skip(1) {
        match *part {
            "name" => mode = "name",
            "value" => mode = "value",
            _ => match mode {
                "name" => name_parts.push(part),
                "value" => value_parts.push(part),
                _ => {}
            },
        }
    }

    if name_parts.is_empty() {
        return None;
    }

    let name = name_parts.join(" ");
    let value = if value_parts.is_empty() {
        None
    } else {
        Some(value_parts.join(" "))
    };

    Some((name, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_value_is_clamped_to_range() {
        let mut opts = UciOptions::new();
        let action = opts.apply_setoption("Hash", Some("999999"));
        assert_eq!(opts.hash_mb, MAX_HASH_MB);
        assert!(matches!(action, Some(UciOptionAction::ReinitHash(mb)) if mb == MAX_HASH_MB));
    }

    #[test]
    fn ponder_is_accepted_but_inert() {
        let mut opts = UciOptions::new();
        assert!(opts.apply_setoption("Ponder", Some("true")).is_none());
        assert!(opts.ponder);
    }

    #[test]
    fn parse_setoption_splits_name_and_value() {
        let parts: Vec<&str> = "setoption name Hash value 512".split_whitespace().collect();
        let (name, value) = parse_setoption(&parts).unwrap();
        assert_eq!(name, "Hash");
        assert_eq!(value.as_deref(), Some("512"));
    }
}
