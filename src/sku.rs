use std::fmt;

/// Structured SKU: `PREFIX-CATEGORY-CODE-Vn`, e.g. `NORD-PC-ARCTIS-V1`.
/// The trailing segment is the version and is the only part that changes
/// when a product is forked into a new version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sku {
    pub prefix: String,
    pub category: String,
    pub code: String,
    pub version: u32,
}

impl Sku {
    pub fn parse(raw: &str) -> Option<Self> {
        let parts: Vec<&str> = raw.split('-').collect();
        if parts.len() != 4 {
            return None;
        }
        if parts.iter().any(|p| p.is_empty()) {
            return None;
        }
        let version = parts[3].strip_prefix('V')?.parse::<u32>().ok()?;
        Some(Self {
            prefix: parts[0].to_string(),
            category: parts[1].to_string(),
            code: parts[2].to_string(),
            version,
        })
    }

    pub fn with_version(&self, version: u32) -> Self {
        Self {
            version,
            ..self.clone()
        }
    }

    pub fn increment_version(&self) -> Self {
        self.with_version(self.version + 1)
    }
}

impl fmt::Display for Sku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}-V{}",
            self.prefix, self.category, self.code, self.version
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_sku() {
        let sku = Sku::parse("NORD-PC-ARCTIS-V1").expect("valid sku");
        assert_eq!(sku.prefix, "NORD");
        assert_eq!(sku.category, "PC");
        assert_eq!(sku.code, "ARCTIS");
        assert_eq!(sku.version, 1);
    }

    #[test]
    fn rejects_malformed_skus() {
        assert!(Sku::parse("NORD-PC-ARCTIS").is_none());
        assert!(Sku::parse("NORD-PC-ARCTIS-1").is_none());
        assert!(Sku::parse("NORD-PC-ARCTIS-Vx").is_none());
        assert!(Sku::parse("NORD--ARCTIS-V1").is_none());
        assert!(Sku::parse("").is_none());
    }

    #[test]
    fn increment_bumps_only_the_version_segment() {
        let sku = Sku::parse("NORD-PC-ARCTIS-V3").unwrap();
        let next = sku.increment_version();
        assert_eq!(next.to_string(), "NORD-PC-ARCTIS-V4");
        assert_eq!(next.code, sku.code);
    }

    #[test]
    fn display_round_trips() {
        let raw = "ACME-GPU-RX9070-V12";
        let sku = Sku::parse(raw).unwrap();
        assert_eq!(sku.to_string(), raw);
    }
}
