//! Configuration types for benefit rule sets.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from the YAML files of a rule-set directory, and the
//! assembled [`RuleSet`] every pipeline stage receives.

use std::collections::BTreeMap;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::{BusinessCalendar, EvaluationPeriod, Holiday, fold_label};

/// Identifying information about a rule set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleMetadata {
    /// The human-readable name of the rule set.
    pub name: String,
    /// The version of the rule set (e.g., "2025-05").
    pub version: String,
    /// Optional free-text description.
    #[serde(default)]
    pub description: Option<String>,
}

/// How fractional day counts are turned into whole days during admission proration.
///
/// # Example
///
/// ```
/// use meal_benefit_engine::config::RoundingPolicy;
/// use rust_decimal::Decimal;
///
/// let half = Decimal::new(145, 1); // 14.5
/// assert_eq!(RoundingPolicy::HalfEven.apply(half), Decimal::from(14));
/// assert_eq!(RoundingPolicy::HalfUp.apply(half), Decimal::from(15));
/// assert_eq!(RoundingPolicy::Floor.apply(half), Decimal::from(14));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingPolicy {
    /// Banker's rounding: ties go to the even neighbour.
    #[default]
    HalfEven,
    /// Ties round away from zero.
    HalfUp,
    /// Always round down.
    Floor,
}

impl RoundingPolicy {
    /// Rounds a value to a whole number under this policy.
    pub fn apply(self, value: Decimal) -> Decimal {
        let strategy = match self {
            RoundingPolicy::HalfEven => RoundingStrategy::MidpointNearestEven,
            RoundingPolicy::HalfUp => RoundingStrategy::MidpointAwayFromZero,
            RoundingPolicy::Floor => RoundingStrategy::ToNegativeInfinity,
        };
        value.round_dp_with_strategy(0, strategy)
    }
}

/// What happens to keys listed in the termination source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationHandling {
    /// Every termination-source key joins the exclusion set.
    #[default]
    Exclude,
    /// Termination-source rows become termination notices and are prorated.
    Prorate,
}

/// Employer/employee split of the benefit value, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostSplit {
    /// Percentage paid by the employer (e.g., 80).
    pub employer_percent: Decimal,
    /// Percentage deducted from the employee (e.g., 20).
    pub employee_percent: Decimal,
}

impl CostSplit {
    /// Checks that both percentages are non-negative and sum to 100.
    pub fn validate(&self) -> EngineResult<()> {
        if self.employer_percent.is_sign_negative() || self.employee_percent.is_sign_negative() {
            return Err(EngineError::InvalidConfig {
                message: "cost split percentages must not be negative".to_string(),
            });
        }
        let sum = self.employer_percent + self.employee_percent;
        if sum != Decimal::ONE_HUNDRED {
            return Err(EngineError::InvalidConfig {
                message: format!("cost split percentages sum to {}, expected 100", sum),
            });
        }
        Ok(())
    }
}

/// Contents of `rules.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct RulesFile {
    /// Rule-set metadata.
    pub rule_set: RuleMetadata,
    /// The evaluation period and cutoff.
    pub period: EvaluationPeriod,
    /// Admission proration rounding.
    #[serde(default)]
    pub rounding: RoundingPolicy,
    /// Termination-source handling.
    #[serde(default)]
    pub termination_handling: TerminationHandling,
    /// Optional employer/employee split.
    #[serde(default)]
    pub cost_split: Option<CostSplit>,
    /// Sheet name used when writing workbooks.
    #[serde(default = "default_output_sheet")]
    pub output_sheet: String,
}

fn default_output_sheet() -> String {
    "COMPRA".to_string()
}

/// Known region codes and free-text aliases for them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionVocabulary {
    /// Region codes recognised as tokens of a unit name.
    pub codes: Vec<String>,
    /// Region name (e.g., "SAO PAULO") to code.
    pub aliases: BTreeMap<String, String>,
    /// Words that must precede a region name inside a unit name ("DE", "DO", ...).
    pub locatives: Vec<String>,
}

impl Default for RegionVocabulary {
    fn default() -> Self {
        let codes = [
            "AC", "AL", "AP", "AM", "BA", "CE", "DF", "ES", "GO", "MA", "MT", "MS", "MG", "PA",
            "PB", "PR", "PE", "PI", "RJ", "RN", "RS", "RO", "RR", "SC", "SP", "SE", "TO",
        ];
        let aliases = [
            ("ACRE", "AC"),
            ("ALAGOAS", "AL"),
            ("AMAPA", "AP"),
            ("AMAZONAS", "AM"),
            ("BAHIA", "BA"),
            ("CEARA", "CE"),
            ("DISTRITO FEDERAL", "DF"),
            ("ESPIRITO SANTO", "ES"),
            ("GOIAS", "GO"),
            ("MARANHAO", "MA"),
            ("MATO GROSSO", "MT"),
            ("MATO GROSSO DO SUL", "MS"),
            ("MINAS GERAIS", "MG"),
            ("PARA", "PA"),
            ("PARAIBA", "PB"),
            ("PARANA", "PR"),
            ("PERNAMBUCO", "PE"),
            ("PIAUI", "PI"),
            ("RIO DE JANEIRO", "RJ"),
            ("RIO GRANDE DO NORTE", "RN"),
            ("RIO GRANDE DO SUL", "RS"),
            ("RONDONIA", "RO"),
            ("RORAIMA", "RR"),
            ("SANTA CATARINA", "SC"),
            ("SAO PAULO", "SP"),
            ("SERGIPE", "SE"),
            ("TOCANTINS", "TO"),
        ];
        Self {
            codes: codes.iter().map(|c| c.to_string()).collect(),
            aliases: aliases
                .iter()
                .map(|(name, code)| (name.to_string(), code.to_string()))
                .collect(),
            locatives: ["DE", "DO", "DA", "DOS", "DAS", "NO", "NA", "EM", "ESTADO"]
                .iter()
                .map(|l| l.to_string())
                .collect(),
        }
    }
}

/// Injectable vocabulary: role keywords, status tokens and flag values.
///
/// Every comparison folds case and accents, so `"Não"` matches `"NAO"`.
///
/// # Example
///
/// ```
/// use meal_benefit_engine::config::Vocabulary;
///
/// let vocabulary = Vocabulary::default();
/// assert_eq!(vocabulary.excluded_role("Diretor Comercial"), Some("director"));
/// assert!(vocabulary.is_active_status("Trabalhando"));
/// assert!(vocabulary.is_leave_not_eligible("não"));
/// assert!(vocabulary.is_termination_affirmative("ok"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vocabulary {
    /// Role-title keyword to role classification.
    pub role_keywords: BTreeMap<String, String>,
    /// Classifications whose holders are not eligible.
    pub excluded_role_classes: Vec<String>,
    /// Token an active employment status must contain.
    pub active_status: String,
    /// Leave-source flag values meaning "not eligible for purchase".
    pub leave_not_eligible: Vec<String>,
    /// Values meaning a termination was formally communicated.
    pub termination_affirmative: Vec<String>,
    /// Region codes and aliases.
    pub regions: RegionVocabulary,
}

impl Default for Vocabulary {
    fn default() -> Self {
        let role_keywords = [
            ("DIRETOR", "director"),
            ("ESTAGI", "intern"),
            ("APRENDIZ", "apprentice"),
        ];
        Self {
            role_keywords: role_keywords
                .iter()
                .map(|(k, c)| (k.to_string(), c.to_string()))
                .collect(),
            excluded_role_classes: vec![
                "director".to_string(),
                "intern".to_string(),
                "apprentice".to_string(),
            ],
            active_status: "TRABALHANDO".to_string(),
            leave_not_eligible: ["N", "NAO", "NÃO", "NO"]
                .iter()
                .map(|v| v.to_string())
                .collect(),
            termination_affirmative: ["OK", "S", "SIM", "Y", "YES"]
                .iter()
                .map(|v| v.to_string())
                .collect(),
            regions: RegionVocabulary::default(),
        }
    }
}

impl Vocabulary {
    /// Returns the classification of the first excluded keyword contained in a role title.
    pub fn excluded_role(&self, role_title: &str) -> Option<&str> {
        let title = fold_label(role_title);
        self.role_keywords
            .iter()
            .filter(|(_, class)| self.excluded_role_classes.contains(class))
            .find(|(keyword, _)| title.contains(&fold_label(keyword)))
            .map(|(_, class)| class.as_str())
    }

    /// Checks whether a status contains the active token.
    pub fn is_active_status(&self, status: &str) -> bool {
        fold_label(status).contains(&fold_label(&self.active_status))
    }

    /// Checks whether a leave flag means "not eligible for purchase".
    pub fn is_leave_not_eligible(&self, flag: &str) -> bool {
        matches_any(flag, &self.leave_not_eligible)
    }

    /// Checks whether a communicated-flag value is affirmative.
    pub fn is_termination_affirmative(&self, flag: &str) -> bool {
        matches_any(flag, &self.termination_affirmative)
    }
}

fn matches_any(value: &str, vocabulary: &[String]) -> bool {
    let folded = fold_label(value);
    vocabulary.iter().any(|v| fold_label(v) == folded)
}

fn aliases(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn key_aliases() -> Vec<String> {
    aliases(&["MATRICULA", "MATRÍCULA", "CADASTRO"])
}

/// Header aliases for the active-employee roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterColumns {
    /// Employee key.
    pub key: Vec<String>,
    /// Employee name.
    pub name: Vec<String>,
    /// Employing company.
    pub company: Vec<String>,
    /// Role title.
    pub role_title: Vec<String>,
    /// Employment status.
    pub status: Vec<String>,
    /// Bargaining-unit name.
    pub unit: Vec<String>,
    /// Admission date.
    pub admission_date: Vec<String>,
    /// Termination date.
    pub termination_date: Vec<String>,
    /// Termination communicated flag.
    pub termination_communicated: Vec<String>,
    /// Vacation days.
    pub vacation_days: Vec<String>,
}

impl Default for RosterColumns {
    fn default() -> Self {
        Self {
            key: key_aliases(),
            name: aliases(&["NOME", "NOME COMPLETO"]),
            company: aliases(&["EMPRESA"]),
            role_title: aliases(&["TITULO DO CARGO", "CARGO"]),
            status: aliases(&["DESC. SITUACAO", "SITUACAO", "STATUS"]),
            unit: aliases(&["SINDICATO"]),
            admission_date: aliases(&["ADMISSAO", "DATA ADMISSAO", "DATA DE ADMISSAO"]),
            termination_date: aliases(&["DATA DEMISSAO", "DATA DE DEMISSAO"]),
            termination_communicated: aliases(&["COMUNICADO DE DESLIGAMENTO"]),
            vacation_days: aliases(&["DIAS DE FERIAS"]),
        }
    }
}

/// Header aliases for the termination source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminationColumns {
    /// Employee key.
    pub key: Vec<String>,
    /// Communicated flag.
    pub communicated: Vec<String>,
    /// Termination date.
    pub date: Vec<String>,
}

impl Default for TerminationColumns {
    fn default() -> Self {
        Self {
            key: key_aliases(),
            communicated: aliases(&["COMUNICADO DE DESLIGAMENTO", "COMUNICADO"]),
            date: aliases(&["DATA DEMISSAO", "DATA DE DEMISSAO", "DEMISSAO"]),
        }
    }
}

/// Header aliases for the admission source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdmissionColumns {
    /// Employee key.
    pub key: Vec<String>,
    /// Admission date.
    pub date: Vec<String>,
}

impl Default for AdmissionColumns {
    fn default() -> Self {
        Self {
            key: key_aliases(),
            date: aliases(&["ADMISSAO", "DATA ADMISSAO", "DATA DE ADMISSAO"]),
        }
    }
}

/// Header aliases for the leave source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeaveColumns {
    /// Employee key.
    pub key: Vec<String>,
    /// "Eligible for purchase" flag.
    pub eligibility: Vec<String>,
}

impl Default for LeaveColumns {
    fn default() -> Self {
        Self {
            key: key_aliases(),
            eligibility: aliases(&["NA COMPRA?", "NA COMPRA"]),
        }
    }
}

/// Header aliases for sources that only list keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyColumns {
    /// Employee key.
    pub key: Vec<String>,
}

impl Default for KeyColumns {
    fn default() -> Self {
        Self { key: key_aliases() }
    }
}

/// Header aliases for the vacation source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VacationColumns {
    /// Employee key.
    pub key: Vec<String>,
    /// Vacation days.
    pub days: Vec<String>,
}

impl Default for VacationColumns {
    fn default() -> Self {
        Self {
            key: key_aliases(),
            days: aliases(&["DIAS DE FERIAS", "DIAS"]),
        }
    }
}

/// Header aliases for the unit calendar.
///
/// A sheet where neither column is found is read positionally: unit name in
/// the first column, day count in the second.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitCalendarColumns {
    /// Bargaining-unit name.
    pub unit: Vec<String>,
    /// Eligible business days.
    pub days: Vec<String>,
}

impl Default for UnitCalendarColumns {
    fn default() -> Self {
        Self {
            unit: aliases(&["SINDICATO"]),
            days: aliases(&["DIAS UTEIS", "DIAS"]),
        }
    }
}

/// Header aliases for the unit rate table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitRateColumns {
    /// Region code or name.
    pub region: Vec<String>,
    /// Per-day rate.
    pub rate: Vec<String>,
}

impl Default for UnitRateColumns {
    fn default() -> Self {
        Self {
            region: aliases(&["ESTADO", "UF"]),
            rate: aliases(&["VALOR", "VALOR DIA"]),
        }
    }
}

/// Header aliases for every input source, from `columns.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMap {
    /// Active-employee roster.
    pub roster: RosterColumns,
    /// Terminations.
    pub terminations: TerminationColumns,
    /// Admissions.
    pub admissions: AdmissionColumns,
    /// Leaves.
    pub leaves: LeaveColumns,
    /// Apprentices.
    pub apprentices: KeyColumns,
    /// Interns.
    pub interns: KeyColumns,
    /// Employees working abroad.
    pub abroad: KeyColumns,
    /// Vacation days.
    pub vacations: VacationColumns,
    /// Unit calendar.
    pub unit_calendar: UnitCalendarColumns,
    /// Unit rates.
    pub unit_rates: UnitRateColumns,
}

/// Contents of one `holidays/*.yaml` file.
#[derive(Debug, Clone, Deserialize)]
pub struct HolidayFile {
    /// Holidays declared in the file.
    pub holidays: Vec<Holiday>,
}

/// The complete rule set loaded from a configuration directory.
///
/// One rule set drives one run; stages read it and never modify it.
#[derive(Debug, Clone)]
pub struct RuleSet {
    metadata: RuleMetadata,
    period: EvaluationPeriod,
    rounding: RoundingPolicy,
    termination_handling: TerminationHandling,
    cost_split: Option<CostSplit>,
    output_sheet: String,
    vocabulary: Vocabulary,
    columns: ColumnMap,
    holidays: Vec<Holiday>,
    calendar: BusinessCalendar,
}

impl RuleSet {
    /// Creates a rule set with default rounding, termination handling and output sheet.
    ///
    /// # Example
    ///
    /// ```
    /// use meal_benefit_engine::config::{ColumnMap, RuleMetadata, RuleSet, Vocabulary};
    /// use meal_benefit_engine::models::EvaluationPeriod;
    /// use chrono::NaiveDate;
    ///
    /// let period = EvaluationPeriod {
    ///     start: NaiveDate::from_ymd_opt(2025, 4, 15).unwrap(),
    ///     end: NaiveDate::from_ymd_opt(2025, 5, 15).unwrap(),
    ///     cutoff: NaiveDate::from_ymd_opt(2025, 5, 15).unwrap(),
    /// };
    /// let rules = RuleSet::new(
    ///     RuleMetadata { name: "VR".into(), version: "2025-05".into(), description: None },
    ///     period,
    ///     Vocabulary::default(),
    ///     ColumnMap::default(),
    ///     Vec::new(),
    /// );
    ///
    /// assert_eq!(rules.total_business_days(), 23);
    /// assert_eq!(rules.output_sheet(), "COMPRA");
    /// ```
    pub fn new(
        metadata: RuleMetadata,
        period: EvaluationPeriod,
        vocabulary: Vocabulary,
        columns: ColumnMap,
        holidays: Vec<Holiday>,
    ) -> Self {
        let mut holidays = holidays;
        holidays.sort_by(|a, b| a.date.cmp(&b.date));
        let calendar = BusinessCalendar::from_holidays(&holidays);
        Self {
            metadata,
            period,
            rounding: RoundingPolicy::default(),
            termination_handling: TerminationHandling::default(),
            cost_split: None,
            output_sheet: default_output_sheet(),
            vocabulary,
            columns,
            holidays,
            calendar,
        }
    }

    /// Sets the admission rounding policy.
    pub fn with_rounding(mut self, rounding: RoundingPolicy) -> Self {
        self.rounding = rounding;
        self
    }

    /// Sets the termination-source handling.
    pub fn with_termination_handling(mut self, handling: TerminationHandling) -> Self {
        self.termination_handling = handling;
        self
    }

    /// Sets the employer/employee split.
    pub fn with_cost_split(mut self, split: Option<CostSplit>) -> Self {
        self.cost_split = split;
        self
    }

    /// Sets the sheet name used when writing workbooks.
    pub fn with_output_sheet(mut self, sheet: impl Into<String>) -> Self {
        self.output_sheet = sheet.into();
        self
    }

    /// Checks the rule set for contradictions.
    ///
    /// Fails when the period starts after it ends or when a configured split
    /// does not sum to 100.
    pub fn validate(&self) -> EngineResult<()> {
        if self.period.start > self.period.end {
            return Err(EngineError::InvalidConfig {
                message: format!(
                    "period start {} is after period end {}",
                    self.period.start, self.period.end
                ),
            });
        }
        if let Some(split) = &self.cost_split {
            split.validate()?;
        }
        Ok(())
    }

    /// Returns the rule-set metadata.
    pub fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    /// Returns the evaluation period.
    pub fn period(&self) -> &EvaluationPeriod {
        &self.period
    }

    /// Returns the admission rounding policy.
    pub fn rounding(&self) -> RoundingPolicy {
        self.rounding
    }

    /// Returns the termination-source handling.
    pub fn termination_handling(&self) -> TerminationHandling {
        self.termination_handling
    }

    /// Returns the employer/employee split, if configured.
    pub fn cost_split(&self) -> Option<&CostSplit> {
        self.cost_split.as_ref()
    }

    /// Returns the output sheet name.
    pub fn output_sheet(&self) -> &str {
        &self.output_sheet
    }

    /// Returns the vocabulary.
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Returns the column aliases.
    pub fn columns(&self) -> &ColumnMap {
        &self.columns
    }

    /// Returns the holidays, sorted by date.
    pub fn holidays(&self) -> &[Holiday] {
        &self.holidays
    }

    /// Returns the authoritative business calendar.
    pub fn calendar(&self) -> &BusinessCalendar {
        &self.calendar
    }

    /// Business days in the whole period on the authoritative calendar.
    pub fn total_business_days(&self) -> u32 {
        self.calendar
            .business_days_between(self.period.start, self.period.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn create_test_rules() -> RuleSet {
        RuleSet::new(
            RuleMetadata {
                name: "VR/VA".to_string(),
                version: "2025-05".to_string(),
                description: None,
            },
            EvaluationPeriod {
                start: date(2025, 4, 15),
                end: date(2025, 5, 15),
                cutoff: date(2025, 5, 15),
            },
            Vocabulary::default(),
            ColumnMap::default(),
            vec![Holiday {
                date: date(2025, 5, 1),
                name: "Dia do Trabalho".to_string(),
                region: "national".to_string(),
            }],
        )
    }

    #[test]
    fn test_rounding_policies_on_ties() {
        assert_eq!(RoundingPolicy::HalfEven.apply(dec("13.5")), dec("14"));
        assert_eq!(RoundingPolicy::HalfEven.apply(dec("12.5")), dec("12"));
        assert_eq!(RoundingPolicy::HalfUp.apply(dec("12.5")), dec("13"));
        assert_eq!(RoundingPolicy::Floor.apply(dec("12.99")), dec("12"));
    }

    #[test]
    fn test_cost_split_must_sum_to_100() {
        let valid = CostSplit {
            employer_percent: dec("80"),
            employee_percent: dec("20"),
        };
        assert!(valid.validate().is_ok());

        let invalid = CostSplit {
            employer_percent: dec("80"),
            employee_percent: dec("25"),
        };
        match invalid.validate() {
            Err(EngineError::InvalidConfig { message }) => assert!(message.contains("105")),
            other => panic!("Expected InvalidConfig, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_split_is_rejected() {
        let split = CostSplit {
            employer_percent: dec("120"),
            employee_percent: dec("-20"),
        };
        assert!(split.validate().is_err());
    }

    #[test]
    fn test_default_vocabulary_role_keywords() {
        let vocabulary = Vocabulary::default();
        assert_eq!(vocabulary.excluded_role("ESTAGIÁRIO DE TI"), Some("intern"));
        assert_eq!(vocabulary.excluded_role("Jovem Aprendiz"), Some("apprentice"));
        assert_eq!(vocabulary.excluded_role("ANALISTA DE SISTEMAS"), None);
    }

    #[test]
    fn test_non_excluded_class_is_ignored() {
        let mut vocabulary = Vocabulary::default();
        vocabulary.excluded_role_classes.retain(|c| c != "director");
        assert_eq!(vocabulary.excluded_role("DIRETOR"), None);
    }

    #[test]
    fn test_leave_vocabulary_folds_accents() {
        let vocabulary = Vocabulary::default();
        assert!(vocabulary.is_leave_not_eligible("Não"));
        assert!(vocabulary.is_leave_not_eligible(" n "));
        assert!(!vocabulary.is_leave_not_eligible("SIM"));
        assert!(!vocabulary.is_leave_not_eligible("NAO SEI"));
    }

    #[test]
    fn test_status_matching_is_substring() {
        let vocabulary = Vocabulary::default();
        assert!(vocabulary.is_active_status("01 - Trabalhando"));
        assert!(!vocabulary.is_active_status("Auxílio Doença"));
    }

    #[test]
    fn test_vocabulary_yaml_fills_missing_fields_with_defaults() {
        let yaml = "active_status: ATIVO\n";
        let vocabulary: Vocabulary = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(vocabulary.active_status, "ATIVO");
        assert_eq!(vocabulary.regions.codes.len(), 27);
        assert!(vocabulary.role_keywords.contains_key("DIRETOR"));
    }

    #[test]
    fn test_column_map_partial_override() {
        let yaml = "roster:\n  key: [ID]\n";
        let columns: ColumnMap = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(columns.roster.key, vec!["ID".to_string()]);
        assert_eq!(columns.roster.unit, vec!["SINDICATO".to_string()]);
        assert_eq!(columns.leaves.eligibility[0], "NA COMPRA?");
    }

    #[test]
    fn test_rules_file_defaults() {
        let yaml = r#"
rule_set:
  name: VR/VA
  version: "2025-05"
period:
  start: 2025-04-15
  end: 2025-05-15
  cutoff: 2025-05-15
"#;
        let rules: RulesFile = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(rules.rounding, RoundingPolicy::HalfEven);
        assert_eq!(rules.termination_handling, TerminationHandling::Exclude);
        assert!(rules.cost_split.is_none());
        assert_eq!(rules.output_sheet, "COMPRA");
    }

    #[test]
    fn test_rule_set_total_business_days_uses_holidays() {
        let rules = create_test_rules();
        assert_eq!(rules.total_business_days(), 22);
    }

    #[test]
    fn test_inverted_period_is_invalid() {
        let mut rules = create_test_rules();
        rules.period.start = date(2025, 6, 1);
        assert!(matches!(
            rules.validate(),
            Err(EngineError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_builder_methods() {
        let rules = create_test_rules()
            .with_rounding(RoundingPolicy::Floor)
            .with_termination_handling(TerminationHandling::Prorate)
            .with_output_sheet("SAIDA");
        assert_eq!(rules.rounding(), RoundingPolicy::Floor);
        assert_eq!(rules.termination_handling(), TerminationHandling::Prorate);
        assert_eq!(rules.output_sheet(), "SAIDA");
        assert!(rules.validate().is_ok());
    }
}
