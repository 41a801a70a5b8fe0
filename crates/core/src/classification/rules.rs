//! Built-in classification rule tables.
//!
//! This is versioned business data, not logic: each entry maps a set of
//! source payment-method codes to one target payment-type code, in
//! evaluation order. Updates land here without touching the engine.

use super::{CodeRule, RuleTable, TermRule};

pub(super) fn builtin() -> RuleTable {
    RuleTable { code_rules: code_rules(), term_rules: term_rules() }
}

#[rustfmt::skip]
fn code_rules() -> Vec<CodeRule> {
    let table: &[(&[i64], i64)] = &[
        (&[294], 2),
        (&[296, 392, 393, 379], 34),
        (&[319, 354], 51),
        (&[297, 298, 299, 307, 312, 313, 315, 369, 372, 394, 395, 396, 397,
           325, 326, 342, 344, 345, 346, 347, 348, 349, 350, 351, 352, 353,
           386], 52),
        (&[2, 3, 4, 6, 8, 11, 12, 16, 21, 22, 29, 31, 32, 36, 37, 38, 39,
           41, 43, 45, 48, 318, 327, 330, 331, 332, 333, 334, 335, 336, 337,
           338, 339, 340, 341, 355, 356, 357, 358, 359, 360, 361, 362, 364,
           365, 366, 371, 376, 377, 381, 387, 388, 322, 328, 329, 370, 323,
           324, 380, 389, 390], 54),
        (&[290], 58),
        (&[289], 59),
        (&[288], 60),
        (&[209], 118),
        (&[210], 119),
        (&[212], 120),
        (&[215], 121),
        (&[219], 122),
        (&[224, 230, 237, 245, 254], 123),
        (&[131], 124),
        (&[132], 125),
        (&[134], 126),
        (&[137], 127),
        (&[141], 128),
        (&[146, 152, 159, 167, 176], 129),
        (&[375], 130),
        (&[385], 132),
        (&[53], 136),
        (&[54], 137),
        (&[56], 138),
        (&[59], 139),
        (&[63], 140),
        (&[68, 74, 81, 89, 98], 141),
        (&[1], 153),
        (&[320], 165),
        (&[373], 166),
    ];

    table
        .iter()
        .map(|&(codes, target)| CodeRule { source_codes: codes.to_vec(), target_code: target })
        .collect()
}

// Stored lowercase: the engine matches against the lowercased description.
fn term_rules() -> Vec<TermRule> {
    vec![
        TermRule { marker: "boleto", term_days: 30 },
        TermRule { marker: "faturamento", term_days: 30 },
        TermRule { marker: "crédito", term_days: 30 },
        TermRule { marker: "débito", term_days: 1 },
        TermRule { marker: "rentcars", term_days: 30 },
        TermRule { marker: "american", term_days: 30 },
    ]
}
