// 📚 Lookup Tables - process-wide, read-only reference data
//
// Organization keywords, entity-type dictionaries and office abbreviations.
// Loaded once as static data and never mutated during a run.

use crate::entities::EntityKind;
use crate::schema::Source;

/// A name containing any of these tokens (uppercased, whitespace-split)
/// belongs to an organization
pub static ORGANIZATION_KEYWORDS: &[&str] = &[
    "ACTION",
    "ALLIANCE",
    "ASSN",
    "ASSOC",
    "ASSOCIATES",
    "ASSOCIATION",
    "BANK",
    "CAMPAIGN",
    "CAUCUS",
    "CITIZENS",
    "CLUB",
    "CMTE",
    "CO",
    "CO.",
    "COALITION",
    "COMM",
    "COMMITTEE",
    "COMPANY",
    "CORP",
    "CORP.",
    "CORPORATION",
    "COUNCIL",
    "DEMOCRATIC",
    "ENTERPRISES",
    "FEDERATION",
    "FIRM",
    "FOR",
    "FOUNDATION",
    "FRIENDS",
    "FUND",
    "GROUP",
    "HOLDINGS",
    "INC",
    "INC.",
    "INDUSTRIES",
    "INSTITUTE",
    "LEAGUE",
    "LLC",
    "LLC.",
    "LLP",
    "LOCAL",
    "LP",
    "LTD",
    "ORGANIZATION",
    "PAC",
    "PARTNERS",
    "PARTNERSHIP",
    "PARTY",
    "POLITICAL",
    "REPUBLICAN",
    "SERVICES",
    "SOCIETY",
    "TRUST",
    "UNION",
];

/// Pennsylvania filer type codes
pub static PA_FILER_TYPES: &[(&str, EntityKind)] = &[
    ("1", EntityKind::Candidate),
    ("2", EntityKind::Committee),
    ("3", EntityKind::Lobbyist),
    ("4", EntityKind::Party),
];

/// Pennsylvania office abbreviations
pub static PA_OFFICES: &[(&str, &str)] = &[
    ("GOV", "Governor"),
    ("LTG", "Lieutenant Governor"),
    ("ATT", "Attorney General"),
    ("AUD", "Auditor General"),
    ("TRE", "State Treasurer"),
    ("SPM", "Justice of the Supreme Court"),
    ("SPR", "Judge of the Superior Court"),
    ("CCJ", "Judge of the Commonwealth Court"),
    ("CPJ", "Judge of the Court of Common Pleas"),
    ("MCJ", "Judge of the Municipal Court"),
    ("STS", "State Senator"),
    ("STH", "State Representative"),
    ("OTH", "Other"),
];

/// Minnesota race codes
pub static MN_RACES: &[(&str, &str)] = &[
    ("GC", "Governor"),
    ("AG", "Attorney General"),
    ("SS", "Secretary of State"),
    ("SA", "State Auditor"),
    ("ST", "State Treasurer"),
    ("Senate", "State Senator"),
    ("House", "State Representative"),
    ("SC", "State Supreme Court Justice"),
    ("AP", "State Appeals Court Judge"),
    ("DC", "State District Court Judge"),
];

/// Arizona aggregate page names → entity kinds
pub static AZ_ENTITY_TYPES: &[(&str, EntityKind)] = &[
    ("Organizations", EntityKind::Company),
    ("PACs", EntityKind::Committee),
    ("Parties", EntityKind::Party),
    ("Vendors", EntityKind::Vendor),
    ("Individual Contributors", EntityKind::Individual),
    ("Candidates", EntityKind::Candidate),
];

/// Exact-key lookup in one of the tables above
pub fn lookup<T: Copy>(table: &[(&str, T)], key: &str) -> Option<T> {
    let key = key.trim();
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

/// Office abbreviation table of a source; empty where offices are spelled out
pub fn office_codes(source: Source) -> &'static [(&'static str, &'static str)] {
    match source {
        Source::Pennsylvania => PA_OFFICES,
        Source::Minnesota => MN_RACES,
        Source::Arizona | Source::Michigan => &[],
    }
}

pub fn is_organization_keyword(token: &str) -> bool {
    ORGANIZATION_KEYWORDS.contains(&token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_tables() {
        assert_eq!(lookup(PA_FILER_TYPES, "2"), Some(EntityKind::Committee));
        assert_eq!(lookup(PA_FILER_TYPES, "9"), None);
        assert_eq!(lookup(PA_OFFICES, "STH"), Some("State Representative"));
        assert_eq!(lookup(MN_RACES, "GC"), Some("Governor"));
        assert_eq!(lookup(AZ_ENTITY_TYPES, "PACs"), Some(EntityKind::Committee));
    }

    #[test]
    fn test_office_codes_per_source() {
        assert_eq!(lookup(office_codes(Source::Minnesota), "Senate"), Some("State Senator"));
        assert_eq!(lookup(office_codes(Source::Pennsylvania), "GOV"), Some("Governor"));
        assert!(office_codes(Source::Arizona).is_empty());
    }

    #[test]
    fn test_keywords_are_uppercase() {
        for keyword in ORGANIZATION_KEYWORDS {
            assert_eq!(*keyword, keyword.to_uppercase());
        }
        assert!(is_organization_keyword("COMMITTEE"));
        assert!(!is_organization_keyword("SMITH"));
    }
}
