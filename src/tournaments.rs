use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tournament {
    pub name: &'static str,
    /// Liquipedia page path, used as the `parent` match condition.
    pub path: &'static str,
    pub region: &'static str,
    pub year: u16,
    pub live: bool,
}

const fn archived(name: &'static str, path: &'static str, region: &'static str, year: u16) -> Tournament {
    Tournament {
        name,
        path,
        region,
        year,
        live: false,
    }
}

const fn live(name: &'static str, path: &'static str, region: &'static str, year: u16) -> Tournament {
    Tournament {
        name,
        path,
        region,
        year,
        live: true,
    }
}

pub const TOURNAMENTS: &[Tournament] = &[
    archived("MPL ID Season 14", "MPL/Indonesia/Season_14", "Indonesia", 2024),
    archived("MPL PH Season 13", "MPL/Philippines/Season_13", "Philippines", 2024),
    archived("MSC 2024", "MSC/2024", "International", 2024),
    archived("MPL ID Season 15", "MPL/Indonesia/Season_15", "Indonesia", 2025),
    archived("MPL PH Season 15", "MPL/Philippines/Season_15", "Philippines", 2025),
    live("MPL ID Season 16", "MPL/Indonesia/Season_16", "Indonesia", 2025),
    live("MPL PH Season 16", "MPL/Philippines/Season_16", "Philippines", 2025),
    live("MPL MY Season 16", "MPL/Malaysia/Season_16", "Malaysia", 2025),
    live("VMC 2025 Winter", "Vietnam_MLBB_Championship/2025/Winter", "Vietnam", 2025),
    live("MPL MENA S8", "MPL/MENA/Season_8", "MENA", 2025),
    live("MCC S6", "MLBB_Continental_Championships/Season_6", "EECA", 2025),
    live("China Masters 2025", "MLBB_China_Masters/2025", "China", 2025),
    live("MTC S5", "MTC_Turkiye_Championship/Season_5", "Turkey", 2025),
];

pub fn find_tournament(name: &str) -> Option<&'static Tournament> {
    let want = name.trim();
    TOURNAMENTS
        .iter()
        .find(|t| t.name.eq_ignore_ascii_case(want) || t.path.eq_ignore_ascii_case(want))
}

/// International first, then regions alphabetically.
pub fn by_region() -> Vec<(&'static str, Vec<&'static Tournament>)> {
    let mut groups: BTreeMap<&'static str, Vec<&'static Tournament>> = BTreeMap::new();
    for t in TOURNAMENTS {
        groups.entry(t.region).or_default().push(t);
    }
    let mut out: Vec<_> = Vec::with_capacity(groups.len());
    if let Some(intl) = groups.remove("International") {
        out.push(("International", intl));
    }
    out.extend(groups);
    out
}

/// Newest year first.
pub fn by_year() -> Vec<(u16, Vec<&'static Tournament>)> {
    let mut groups: BTreeMap<u16, Vec<&'static Tournament>> = BTreeMap::new();
    for t in TOURNAMENTS {
        groups.entry(t.year).or_default().push(t);
    }
    groups.into_iter().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_name_or_path() {
        assert_eq!(find_tournament("mpl id season 16").map(|t| t.path), Some("MPL/Indonesia/Season_16"));
        assert_eq!(find_tournament("MSC/2024").map(|t| t.year), Some(2024));
        assert!(find_tournament("MPL BR").is_none());
    }

    #[test]
    fn international_region_leads() {
        let regions = by_region();
        assert_eq!(regions[0].0, "International");
        assert!(regions[1..].windows(2).all(|w| w[0].0 < w[1].0));
        assert_eq!(by_year()[0].0, 2025);
    }
}
