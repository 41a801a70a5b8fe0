//! Classification engine - payment method translation
//!
//! Maps a raw (payment-method-code, description) pair from the source
//! ledger to the target schema's (payment-type-code, installment-count,
//! term-days) triple. Evaluation is pure rule lookup over ordered tables;
//! the business mapping itself lives in [`rules`] as injected data and can
//! be replaced without touching the engine.

mod rules;

/// Result of classifying one payment row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub target_code: i64,
    pub installments: u32,
    pub term_days: u32,
}

/// One membership-set rule: any of `source_codes` maps to `target_code`
#[derive(Debug, Clone)]
pub struct CodeRule {
    pub source_codes: Vec<i64>,
    pub target_code: i64,
}

/// One description-marker rule for the payment term.
///
/// Markers are stored lowercase; the engine matches them against the
/// lowercased description.
#[derive(Debug, Clone)]
pub struct TermRule {
    pub marker: &'static str,
    pub term_days: u32,
}

/// Ordered rule tables driving the classifier.
///
/// Order matters in both tables: the first matching rule wins, and term
/// markers are not mutually exclusive in real description text.
#[derive(Debug, Clone)]
pub struct RuleTable {
    pub code_rules: Vec<CodeRule>,
    pub term_rules: Vec<TermRule>,
}

impl RuleTable {
    /// The production mapping table, versioned with the crate.
    pub fn builtin() -> Self {
        rules::builtin()
    }
}

/// Installment markers checked against the description, in fixed order.
/// Case-sensitive by contract.
const INSTALLMENT_MARKERS: [(&str, u32); 6] =
    [("1X", 1), ("2X", 2), ("3X", 3), ("4X", 4), ("5X", 5), ("6X", 6)];

/// Pure classifier over an injected rule table. No I/O, no shared state.
#[derive(Debug, Clone)]
pub struct Classifier {
    table: RuleTable,
}

impl Classifier {
    pub fn new(table: RuleTable) -> Self {
        Self { table }
    }

    /// Classify one raw payment row.
    ///
    /// - target code: first code rule whose membership set contains
    ///   `raw_code`; falls through to `raw_code` itself.
    /// - installments: first matching `NX` marker in the description,
    ///   defaulting to 1.
    /// - term days: first matching term marker, case-insensitive,
    ///   defaulting to 0.
    pub fn classify(&self, raw_code: i64, description: &str) -> Classification {
        Classification {
            target_code: self.target_code(raw_code),
            installments: Self::installments(description),
            term_days: self.term_days(description),
        }
    }

    fn target_code(&self, raw_code: i64) -> i64 {
        self.table
            .code_rules
            .iter()
            .find(|rule| rule.source_codes.contains(&raw_code))
            .map_or(raw_code, |rule| rule.target_code)
    }

    fn installments(description: &str) -> u32 {
        INSTALLMENT_MARKERS
            .iter()
            .find(|(marker, _)| description.contains(marker))
            .map_or(1, |&(_, count)| count)
    }

    fn term_days(&self, description: &str) -> u32 {
        let normalized = description.to_lowercase();
        self.table
            .term_rules
            .iter()
            .find(|rule| normalized.contains(rule.marker))
            .map_or(0, |rule| rule.term_days)
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(RuleTable::builtin())
    }
}
