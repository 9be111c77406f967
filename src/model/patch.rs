use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Game version reduced to `major.minor`, the granularity baselines are kept at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PatchVersion {
    pub major: u32,
    pub minor: u32,
}

impl FromStr for PatchVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().split('.');
        let major = parts
            .next()
            .and_then(|p| p.parse::<u32>().ok())
            .ok_or_else(|| format!("invalid game version: {}", s))?;
        let minor = parts
            .next()
            .and_then(|p| p.parse::<u32>().ok())
            .ok_or_else(|| format!("invalid game version: {}", s))?;
        Ok(PatchVersion { major, minor })
    }
}

impl fmt::Display for PatchVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// `"14.23.636.2434"` -> `"14.23"`. Strings that don't parse are kept as-is.
pub fn normalize_patch(game_version: &str) -> String {
    game_version
        .parse::<PatchVersion>()
        .map(|p| p.to_string())
        .unwrap_or_else(|_| game_version.trim().to_string())
}

/// Orders version strings numerically; unparseable versions sort first so
/// they are never picked as "most recent".
pub fn compare_patches(a: &str, b: &str) -> Ordering {
    match (a.parse::<PatchVersion>(), b.parse::<PatchVersion>()) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        (Ok(_), Err(_)) => Ordering::Greater,
        (Err(_), Ok(_)) => Ordering::Less,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_full_game_version() {
        assert_eq!(normalize_patch("14.23.636.2434"), "14.23");
        assert_eq!(normalize_patch("14.3"), "14.3");
        assert_eq!(normalize_patch("garbage"), "garbage");
    }

    #[test]
    fn compares_numerically_not_lexically() {
        assert_eq!(compare_patches("14.10", "14.9"), Ordering::Greater);
        assert_eq!(compare_patches("13.24", "14.1"), Ordering::Less);
        assert_eq!(compare_patches("garbage", "1.1"), Ordering::Less);
    }
}
