//! Fixed US state lookup tables.
//!
//! Maps full state names (as found in the state boundary `properties.name`)
//! to two-letter abbreviations, and abbreviations to the two-digit FIPS
//! prefix shared by every county in that state.

/// States left out of the national layer (continental-only rendering).
pub const NON_CONTINENTAL: &[&str] = &["Alaska", "Hawaii", "Puerto Rico"];

/// Maps a full state name to its two-letter abbreviation.
///
/// Covers the 50 states, DC and Puerto Rico. Returns `None` for anything
/// else, which callers treat as an unmatched feature.
#[must_use]
pub fn state_abbrev(name: &str) -> Option<&'static str> {
    let abbrev = match name {
        "Alabama" => "AL",
        "Alaska" => "AK",
        "Arizona" => "AZ",
        "Arkansas" => "AR",
        "California" => "CA",
        "Colorado" => "CO",
        "Connecticut" => "CT",
        "Delaware" => "DE",
        "Florida" => "FL",
        "Georgia" => "GA",
        "Hawaii" => "HI",
        "Idaho" => "ID",
        "Illinois" => "IL",
        "Indiana" => "IN",
        "Iowa" => "IA",
        "Kansas" => "KS",
        "Kentucky" => "KY",
        "Louisiana" => "LA",
        "Maine" => "ME",
        "Maryland" => "MD",
        "Massachusetts" => "MA",
        "Michigan" => "MI",
        "Minnesota" => "MN",
        "Mississippi" => "MS",
        "Missouri" => "MO",
        "Montana" => "MT",
        "Nebraska" => "NE",
        "Nevada" => "NV",
        "New Hampshire" => "NH",
        "New Jersey" => "NJ",
        "New Mexico" => "NM",
        "New York" => "NY",
        "North Carolina" => "NC",
        "North Dakota" => "ND",
        "Ohio" => "OH",
        "Oklahoma" => "OK",
        "Oregon" => "OR",
        "Pennsylvania" => "PA",
        "Rhode Island" => "RI",
        "South Carolina" => "SC",
        "South Dakota" => "SD",
        "Tennessee" => "TN",
        "Texas" => "TX",
        "Utah" => "UT",
        "Vermont" => "VT",
        "Virginia" => "VA",
        "Washington" => "WA",
        "West Virginia" => "WV",
        "Wisconsin" => "WI",
        "Wyoming" => "WY",
        "District of Columbia" => "DC",
        "Puerto Rico" => "PR",
        _ => return None,
    };
    Some(abbrev)
}

/// Maps a two-letter state abbreviation to its two-digit FIPS prefix.
///
/// Puerto Rico has no entry: selecting it yields no county layer.
#[must_use]
pub fn state_fips_prefix(abbrev: &str) -> Option<&'static str> {
    let prefix = match abbrev {
        "AL" => "01",
        "AK" => "02",
        "AZ" => "04",
        "AR" => "05",
        "CA" => "06",
        "CO" => "08",
        "CT" => "09",
        "DE" => "10",
        "DC" => "11",
        "FL" => "12",
        "GA" => "13",
        "HI" => "15",
        "ID" => "16",
        "IL" => "17",
        "IN" => "18",
        "IA" => "19",
        "KS" => "20",
        "KY" => "21",
        "LA" => "22",
        "ME" => "23",
        "MD" => "24",
        "MA" => "25",
        "MI" => "26",
        "MN" => "27",
        "MS" => "28",
        "MO" => "29",
        "MT" => "30",
        "NE" => "31",
        "NV" => "32",
        "NH" => "33",
        "NJ" => "34",
        "NM" => "35",
        "NY" => "36",
        "NC" => "37",
        "ND" => "38",
        "OH" => "39",
        "OK" => "40",
        "OR" => "41",
        "PA" => "42",
        "RI" => "44",
        "SC" => "45",
        "SD" => "46",
        "TN" => "47",
        "TX" => "48",
        "UT" => "49",
        "VT" => "50",
        "VA" => "51",
        "WA" => "53",
        "WV" => "54",
        "WI" => "55",
        "WY" => "56",
        _ => return None,
    };
    Some(prefix)
}

/// Zero-pads a county id to the 5-digit FIPS form used by the county rows.
///
/// Boundary files store the id as a number, so Alabama's Autauga County
/// arrives as `1001` and becomes `"01001"`.
#[must_use]
pub fn pad_fips(id: &str) -> String {
    format!("{id:0>5}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_names_resolve() {
        assert_eq!(state_abbrev("Texas"), Some("TX"));
        assert_eq!(state_abbrev("District of Columbia"), Some("DC"));
        assert_eq!(state_abbrev("Puerto Rico"), Some("PR"));
    }

    #[test]
    fn test_unknown_name_is_unmatched() {
        assert_eq!(state_abbrev("Guam"), None);
        assert_eq!(state_abbrev("texas"), None);
    }

    #[test]
    fn test_every_state_has_prefix_except_pr() {
        for name in [
            "Alabama", "Alaska", "California", "Hawaii", "Wyoming", "Rhode Island",
        ] {
            let abbrev = state_abbrev(name).unwrap();
            assert!(state_fips_prefix(abbrev).is_some(), "{name} has no prefix");
        }
        assert_eq!(state_fips_prefix("PR"), None);
        assert_eq!(state_fips_prefix("AL"), Some("01"));
        assert_eq!(state_fips_prefix("WA"), Some("53"));
    }

    #[test]
    fn test_pad_fips() {
        assert_eq!(pad_fips("1001"), "01001");
        assert_eq!(pad_fips("48201"), "48201");
        assert_eq!(pad_fips("7"), "00007");
    }
}
