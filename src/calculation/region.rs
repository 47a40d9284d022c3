//! Region inference from bargaining-unit names.

use std::collections::BTreeSet;

use crate::config::RegionVocabulary;
use crate::models::fold_label;

fn tokens(folded: &str) -> Vec<&str> {
    folded
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect()
}

/// A [`RegionVocabulary`] folded and ordered for matching.
///
/// Build it once per run and reuse it for every unit name.
///
/// # Example
///
/// ```
/// use meal_benefit_engine::calculation::RegionMatcher;
/// use meal_benefit_engine::config::RegionVocabulary;
///
/// let matcher = RegionMatcher::new(&RegionVocabulary::default());
/// assert_eq!(matcher.infer("SINDPD SP - SIND.TRAB.EM PROC DADOS").as_deref(), Some("SP"));
/// assert_eq!(matcher.infer("Sindicato dos Comerciários de São Paulo").as_deref(), Some("SP"));
/// assert_eq!(matcher.infer("SINDICATO UNIAO PARA TRABALHADORES DE TI"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionMatcher {
    codes: BTreeSet<String>,
    /// Folded name tokens and code, longest name first.
    aliases: Vec<(Vec<String>, String)>,
    locatives: BTreeSet<String>,
}

impl RegionMatcher {
    /// Folds and orders a region vocabulary.
    pub fn new(regions: &RegionVocabulary) -> Self {
        let mut aliases: Vec<(Vec<String>, String)> = regions
            .aliases
            .iter()
            .map(|(name, code)| {
                let name = fold_label(name);
                let name_tokens: Vec<String> = tokens(&name).into_iter().map(String::from).collect();
                (name_tokens, fold_label(code))
            })
            .filter(|(name_tokens, _)| !name_tokens.is_empty())
            .collect();
        aliases.sort_by(|a, b| {
            b.0.len()
                .cmp(&a.0.len())
                .then_with(|| b.0.concat().len().cmp(&a.0.concat().len()))
        });

        Self {
            codes: regions.codes.iter().map(|c| fold_label(c)).collect(),
            aliases,
            locatives: regions.locatives.iter().map(|l| fold_label(l)).collect(),
        }
    }

    /// Infers the region code of a unit name.
    ///
    /// The first token that is a known code wins. Failing that, region names
    /// are searched as whole words, longest first, and count only when they
    /// make up the whole name or follow a locative word ("DE", "DO",
    /// "ESTADO", ...). A bare "PARA" in "UNIAO PARA TRABALHADORES" is a
    /// preposition, not the state.
    pub fn infer(&self, unit_name: &str) -> Option<String> {
        let folded = fold_label(unit_name);
        let unit_tokens = tokens(&folded);

        if let Some(code) = unit_tokens.iter().find(|token| self.codes.contains(**token)) {
            return Some((*code).to_string());
        }

        self.aliases
            .iter()
            .find(|(name, _)| self.names_region(&unit_tokens, name))
            .map(|(_, code)| code.clone())
    }

    fn names_region(&self, unit_tokens: &[&str], name: &[String]) -> bool {
        let matches_at = |start: usize| {
            unit_tokens
                .get(start..start + name.len())
                .is_some_and(|window| window.iter().zip(name).all(|(t, n)| *t == n.as_str()))
        };
        if unit_tokens.len() == name.len() {
            return matches_at(0);
        }
        (1..unit_tokens.len())
            .any(|start| self.locatives.contains(unit_tokens[start - 1]) && matches_at(start))
    }
}

/// Infers the region code a bargaining unit belongs to.
///
/// Builds a [`RegionMatcher`] for a single lookup; see
/// [`RegionMatcher::infer`] for the matching rules.
///
/// # Example
///
/// ```
/// use meal_benefit_engine::calculation::infer_region;
/// use meal_benefit_engine::config::RegionVocabulary;
///
/// let regions = RegionVocabulary::default();
/// assert_eq!(infer_region("SITEPD PR", &regions).as_deref(), Some("PR"));
/// assert_eq!(infer_region("SINDICATO NACIONAL", &regions), None);
/// ```
pub fn infer_region(unit_name: &str, regions: &RegionVocabulary) -> Option<String> {
    RegionMatcher::new(regions).infer(unit_name)
}

/// Normalizes a rate-table region label to a code.
///
/// Accepts a code (`"sp"`), a region name (`"São Paulo"`), or any text
/// [`infer_region`] can resolve.
pub fn canonical_region(label: &str, regions: &RegionVocabulary) -> Option<String> {
    let folded = fold_label(label);
    if folded.is_empty() {
        return None;
    }
    if regions.codes.iter().any(|code| fold_label(code) == folded) {
        return Some(folded);
    }
    if let Some(code) = regions
        .aliases
        .iter()
        .find(|(name, _)| fold_label(name) == folded)
        .map(|(_, code)| fold_label(code))
    {
        return Some(code);
    }
    infer_region(label, regions)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn infer(name: &str) -> Option<String> {
        infer_region(name, &RegionVocabulary::default())
    }

    #[test]
    fn test_code_token_after_prefix() {
        assert_eq!(infer("SINDPD SP").as_deref(), Some("SP"));
        assert_eq!(
            infer("SITEPD PR - SIND DOS TRAB EM EMPR PRIVADAS DE PROC DE DADOS DE CURITIBA")
                .as_deref(),
            Some("PR")
        );
    }

    #[test]
    fn test_code_at_start_with_delimiter() {
        assert_eq!(infer("RJ-SINDPD").as_deref(), Some("RJ"));
        assert_eq!(infer("rs / sindppd").as_deref(), Some("RS"));
    }

    #[test]
    fn test_code_inside_word_does_not_match() {
        // "SPA" and "CRJ" contain codes but are not codes
        assert_eq!(infer("SPA CRJ"), None);
    }

    #[test]
    fn test_region_name_alias_prefers_longest() {
        assert_eq!(
            infer("Sindicato dos Trabalhadores do Rio Grande do Sul").as_deref(),
            Some("RS")
        );
        assert_eq!(infer("Sindicato de Mato Grosso do Sul").as_deref(), Some("MS"));
        assert_eq!(infer("Sindicato do Paraná").as_deref(), Some("PR"));
    }

    #[test]
    fn test_region_name_used_as_a_word_does_not_match() {
        // "PARA" is also a preposition
        assert_eq!(infer("SINDICATO UNIAO PARA TRABALHADORES DE TI"), None);
        assert_eq!(infer("Associação para o Comércio"), None);
        assert_eq!(infer("Sindicato dos Bancários do Pará").as_deref(), Some("PA"));
        assert_eq!(infer("Sindicato do Estado do Para").as_deref(), Some("PA"));
    }

    #[test]
    fn test_region_name_alone_or_after_locative() {
        assert_eq!(infer("Bahia").as_deref(), Some("BA"));
        assert_eq!(infer("Minas Gerais").as_deref(), Some("MG"));
        assert_eq!(infer("Bahia Comercio Sindicato"), None);
        assert_eq!(infer("Sindicato Comerciarios em Minas Gerais").as_deref(), Some("MG"));
    }

    #[test]
    fn test_matcher_without_locatives_only_matches_whole_names() {
        let regions = RegionVocabulary {
            locatives: Vec::new(),
            ..RegionVocabulary::default()
        };
        let matcher = RegionMatcher::new(&regions);
        assert_eq!(matcher.infer("Sergipe").as_deref(), Some("SE"));
        assert_eq!(matcher.infer("Sindicato de Sergipe"), None);
        assert_eq!(matcher.infer("SINDPD SE").as_deref(), Some("SE"));
    }

    #[test]
    fn test_empty_name_has_no_region() {
        assert_eq!(infer(""), None);
    }

    #[test]
    fn test_canonical_region_accepts_codes_and_names() {
        let regions = RegionVocabulary::default();
        assert_eq!(canonical_region(" sp ", &regions).as_deref(), Some("SP"));
        assert_eq!(canonical_region("Paraná", &regions).as_deref(), Some("PR"));
        assert_eq!(canonical_region("Rio de Janeiro", &regions).as_deref(), Some("RJ"));
        assert_eq!(canonical_region("Atlantis", &regions), None);
        assert_eq!(canonical_region("", &regions), None);
    }
}
