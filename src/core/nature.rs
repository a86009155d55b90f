//! VAT nature codes (`Natura`) for lines charged at a zero rate.
//!
//! FatturaPA 1.2.x table. The bare `N2`, `N3` and `N6` codes were withdrawn
//! in 2021 and are not accepted.

use serde::{Deserialize, Serialize};

/// Reason a line carries no VAT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NatureCode {
    /// N1: excluded under art. 15.
    N1,
    /// N2.1: not subject, arts. 7 to 7-septies.
    N2_1,
    /// N2.2: not subject, other cases.
    N2_2,
    /// N3.1: non-taxable, exports.
    N3_1,
    /// N3.2: non-taxable, intra-community supplies.
    N3_2,
    /// N3.3: non-taxable, supplies to San Marino.
    N3_3,
    /// N3.4: non-taxable, operations treated as exports.
    N3_4,
    /// N3.5: non-taxable, following a declaration of intent.
    N3_5,
    /// N3.6: non-taxable, other operations outside the plafond.
    N3_6,
    /// N4: exempt.
    N4,
    /// N5: margin scheme / VAT not shown.
    N5,
    /// N6.1: reverse charge, scrap and recovered materials.
    N6_1,
    /// N6.2: reverse charge, gold and silver.
    N6_2,
    /// N6.3: reverse charge, construction subcontracting.
    N6_3,
    /// N6.4: reverse charge, buildings.
    N6_4,
    /// N6.5: reverse charge, mobile phones.
    N6_5,
    /// N6.6: reverse charge, electronic products.
    N6_6,
    /// N6.7: reverse charge, construction and related services.
    N6_7,
    /// N6.8: reverse charge, energy sector.
    N6_8,
    /// N6.9: reverse charge, other cases.
    N6_9,
    /// N7: VAT paid in another EU state.
    N7,
}

/// Sorted `(code, variant)` table for binary search.
static NATURE_CODES: &[(&str, NatureCode)] = &[
    ("N1", NatureCode::N1),
    ("N2.1", NatureCode::N2_1),
    ("N2.2", NatureCode::N2_2),
    ("N3.1", NatureCode::N3_1),
    ("N3.2", NatureCode::N3_2),
    ("N3.3", NatureCode::N3_3),
    ("N3.4", NatureCode::N3_4),
    ("N3.5", NatureCode::N3_5),
    ("N3.6", NatureCode::N3_6),
    ("N4", NatureCode::N4),
    ("N5", NatureCode::N5),
    ("N6.1", NatureCode::N6_1),
    ("N6.2", NatureCode::N6_2),
    ("N6.3", NatureCode::N6_3),
    ("N6.4", NatureCode::N6_4),
    ("N6.5", NatureCode::N6_5),
    ("N6.6", NatureCode::N6_6),
    ("N6.7", NatureCode::N6_7),
    ("N6.8", NatureCode::N6_8),
    ("N6.9", NatureCode::N6_9),
    ("N7", NatureCode::N7),
];

impl NatureCode {
    /// Code as written in the `Natura` element.
    pub fn code(&self) -> &'static str {
        NATURE_CODES
            .iter()
            .find(|(_, n)| n == self)
            .map(|(c, _)| *c)
            .unwrap_or("N1")
    }

    /// Parse a code, tolerating surrounding whitespace and lowercase.
    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim().to_ascii_uppercase();
        NATURE_CODES
            .binary_search_by(|(c, _)| (*c).cmp(code.as_str()))
            .ok()
            .map(|i| NATURE_CODES[i].1)
    }

    /// Default `RiferimentoNormativo` text when the sale provides none.
    pub fn legal_reference(&self) -> &'static str {
        match self {
            Self::N1 => "Escluse ex art. 15 DPR 633/72",
            Self::N2_1 => "Non soggette artt. da 7 a 7-septies DPR 633/72",
            Self::N2_2 => "Non soggette - altri casi",
            Self::N3_1 => "Non imponibili - esportazioni art. 8 DPR 633/72",
            Self::N3_2 => "Non imponibili - cessioni intracomunitarie art. 41 DL 331/93",
            Self::N3_3 => "Non imponibili - cessioni verso San Marino",
            Self::N3_4 => "Non imponibili - operazioni assimilate alle esportazioni",
            Self::N3_5 => "Non imponibili - a seguito di dichiarazioni d'intento",
            Self::N3_6 => "Non imponibili - altre operazioni",
            Self::N4 => "Esenti art. 10 DPR 633/72",
            Self::N5 => "Regime del margine - IVA non esposta in fattura",
            Self::N6_1 => "Inversione contabile - cessione di rottami",
            Self::N6_2 => "Inversione contabile - cessione di oro e argento",
            Self::N6_3 => "Inversione contabile - subappalto nel settore edile",
            Self::N6_4 => "Inversione contabile - cessione di fabbricati",
            Self::N6_5 => "Inversione contabile - cessione di telefoni cellulari",
            Self::N6_6 => "Inversione contabile - cessione di prodotti elettronici",
            Self::N6_7 => "Inversione contabile - prestazioni comparto edile",
            Self::N6_8 => "Inversione contabile - settore energetico",
            Self::N6_9 => "Inversione contabile - altri casi",
            Self::N7 => "IVA assolta in altro stato UE",
        }
    }
}

impl std::fmt::Display for NatureCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}
