//! Country name to ISO-2 code resolution
//!
//! The upstream service wants an ISO-2 `nation` code; users type country
//! names in Spanish or English. Two-letter inputs pass through uppercased.

use crate::application::services::fold_key;

/// Resolve a country reference to an ISO-2 code. `None` when the name is
/// unknown; callers then omit the nation field rather than guessing.
pub fn country_code(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let code = match fold_key(trimmed).as_str() {
        "espana" | "spain" => "ES",
        "argentina" => "AR",
        "mexico" => "MX",
        "colombia" => "CO",
        "chile" => "CL",
        "peru" => "PE",
        "venezuela" => "VE",
        "ecuador" => "EC",
        "bolivia" => "BO",
        "uruguay" => "UY",
        "paraguay" => "PY",
        "cuba" => "CU",
        "republica_dominicana" | "dominican_republic" => "DO",
        "guatemala" => "GT",
        "honduras" => "HN",
        "el_salvador" => "SV",
        "nicaragua" => "NI",
        "costa_rica" => "CR",
        "panama" => "PA",
        "puerto_rico" => "PR",
        "estados_unidos" | "united_states" | "usa" => "US",
        "reino_unido" | "united_kingdom" | "uk" | "inglaterra" | "england" => "GB",
        "francia" | "france" => "FR",
        "alemania" | "germany" => "DE",
        "italia" | "italy" => "IT",
        "portugal" => "PT",
        "paises_bajos" | "netherlands" | "holanda" => "NL",
        "belgica" | "belgium" => "BE",
        "suiza" | "switzerland" => "CH",
        "austria" => "AT",
        "irlanda" | "ireland" => "IE",
        "grecia" | "greece" => "GR",
        "polonia" | "poland" => "PL",
        "suecia" | "sweden" => "SE",
        "noruega" | "norway" => "NO",
        "dinamarca" | "denmark" => "DK",
        "finlandia" | "finland" => "FI",
        "rusia" | "russia" => "RU",
        "china" => "CN",
        "japon" | "japan" => "JP",
        "india" => "IN",
        "brasil" | "brazil" => "BR",
        "canada" => "CA",
        "australia" => "AU",
        "nueva_zelanda" | "new_zealand" => "NZ",
        "marruecos" | "morocco" => "MA",
        "sudafrica" | "south_africa" => "ZA",
        "turquia" | "turkey" => "TR",
        "israel" => "IL",
        "egipto" | "egypt" => "EG",
        "filipinas" | "philippines" => "PH",
        _ => {
            // bare ISO-2 codes pass through, anything else is unknown
            if trimmed.len() == 2 && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
                return Some(trimmed.to_ascii_uppercase());
            }
            return None;
        }
    };
    Some(code.to_string())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("España", "ES")]
    #[case("spain", "ES")]
    #[case("Estados Unidos", "US")]
    #[case("reino unido", "GB")]
    #[case("Japón", "JP")]
    #[case("ar", "AR")]
    #[case("GB", "GB")]
    fn known_countries_resolve(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(country_code(raw).as_deref(), Some(expected));
    }

    #[rstest]
    fn unknown_country_is_none() {
        assert_eq!(country_code("Atlantis"), None);
        assert_eq!(country_code(""), None);
    }
}
