//! Derived fields: age, income, working time and graduation years.
//!
//! Every random draw comes from the run's single seeded generator, in row order
//! and, within a row, in the order the fields are listed on [`DerivedRow`].
//! Re-running on identical input with the same seed gives identical output.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::model::{DerivedRow, FlatRow, Relationship};
use crate::pipeline::RunContext;

/// Indonesian month names in calendar order.
pub const INDONESIAN_MONTHS: [&str; 12] = [
    "januari", "februari", "maret", "april", "mei", "juni", "juli", "agustus", "september",
    "oktober", "november", "desember",
];

/// Years after birth at which each school level is completed.
pub const PRIMARY_GRAD_OFFSET: i64 = 12;
pub const LOWER_SECONDARY_GRAD_OFFSET: i64 = 15;
pub const UPPER_SECONDARY_GRAD_OFFSET: i64 = 18;

const CASH_INCOME_UNIT: i64 = 10_000;
const GOODS_INCOME_BASE: i64 = 3_000_000;
const GOODS_INCOME_UNIT: i64 = 100_000;

/// The month ages are measured at. Birth months before it count one year less.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceEpoch {
    pub year: i64,
    pub month: u32,
}

impl Default for ReferenceEpoch {
    fn default() -> Self {
        Self {
            year: 2025,
            month: 8,
        }
    }
}

/// Birth year, only when the raw text is all ASCII digits and non-zero.
pub fn parse_birth_year(raw: Option<&str>) -> Option<i64> {
    let text = raw?;
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse::<i64>().ok().filter(|&year| year != 0)
}

/// Calendar month of birth, recognised from Indonesian month names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BirthMonth {
    January = 1,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl BirthMonth {
    pub const ALL: [BirthMonth; 12] = [
        BirthMonth::January,
        BirthMonth::February,
        BirthMonth::March,
        BirthMonth::April,
        BirthMonth::May,
        BirthMonth::June,
        BirthMonth::July,
        BirthMonth::August,
        BirthMonth::September,
        BirthMonth::October,
        BirthMonth::November,
        BirthMonth::December,
    ];

    /// First month whose Indonesian name occurs in `raw`, checked in calendar order.
    pub fn parse(raw: &str) -> Option<Self> {
        let text = raw.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|month| text.contains(month.indonesian_name()))
    }

    pub fn indonesian_name(self) -> &'static str {
        INDONESIAN_MONTHS[self as usize - 1]
    }

    /// 1-based month number.
    pub fn number(self) -> u32 {
        self as u32
    }
}

/// 1-based month of the first Indonesian month name found in `raw`, case-insensitive.
pub fn parse_birth_month(raw: Option<&str>) -> Option<u32> {
    raw.and_then(BirthMonth::parse).map(BirthMonth::number)
}

/// Age at the reference epoch. Negative ages are not ages, and neither is an
/// overflowing difference.
pub fn age_at(birth_year: i64, birth_month: u32, epoch: ReferenceEpoch) -> Option<i64> {
    let years = epoch.year.checked_sub(birth_year)?;
    let age = if birth_month < epoch.month {
        years
    } else {
        years.checked_add(1)?
    };
    (age >= 0).then_some(age)
}

/// Year a member born in `birth_year` finishes a school level `offset` years later.
fn graduation_year(birth_year: Option<i64>, offset: i64) -> Option<i64> {
    birth_year?.checked_add(offset)
}

/// Compute every derived field for one row.
pub fn derive(row: FlatRow, ctx: &mut RunContext) -> DerivedRow {
    let epoch = ctx.epoch;
    let birth_year = parse_birth_year(row.member.birth_year.as_deref());
    let birth_month = parse_birth_month(row.member.birth_month.as_deref());

    let age = match (birth_year, birth_month) {
        (Some(year), Some(month)) => age_at(year, month, epoch),
        _ => None,
    };

    let relationship = row.relationship();
    let rng = ctx.rng();

    let cash_income = match relationship {
        Relationship::Head => Some(rng.gen_range(185..274) * CASH_INCOME_UNIT),
        _ => None,
    };

    let goods_income = match (&relationship, cash_income) {
        (Relationship::Head, Some(cash)) => {
            let deduction = rng.gen_range(1..10) * GOODS_INCOME_UNIT;
            Some((GOODS_INCOME_BASE - cash - deduction).abs())
        }
        _ => None,
    };

    let work_days = rng.gen_range(5..8);

    let single_member = row.household.member_count.as_deref() == Some("1");
    let work_hours = match relationship {
        _ if single_member => rng.gen_range(32..39),
        Relationship::Spouse => rng.gen_range(32..39),
        Relationship::Head => rng.gen_range(26..37),
        Relationship::Other(_) | Relationship::Unknown => rng.gen_range(12..29),
    };

    DerivedRow {
        flat: row,
        age,
        cash_income,
        goods_income,
        work_days,
        work_hours,
        grad_primary: graduation_year(birth_year, PRIMARY_GRAD_OFFSET),
        grad_lower_secondary: graduation_year(birth_year, LOWER_SECONDARY_GRAD_OFFSET),
        grad_upper_secondary: graduation_year(birth_year, UPPER_SECONDARY_GRAD_OFFSET),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Household, Location, MemberRecord, RecordId};

    fn row(relationship: &str, year: &str, month: &str, member_count: &str) -> FlatRow {
        FlatRow {
            record_id: RecordId::new("r1"),
            status: Some("success".into()),
            location: Location::default(),
            household: Household {
                member_count: Some(member_count.into()),
                ..Default::default()
            },
            member: MemberRecord {
                relationship: Some(relationship.into()),
                birth_year: Some(year.into()),
                birth_month: Some(month.into()),
                ..Default::default()
            },
            placeholder: false,
        }
    }

    #[test]
    fn birth_year_requires_digits() {
        assert_eq!(parse_birth_year(Some("2000")), Some(2000));
        assert_eq!(parse_birth_year(Some("2000 ")), None);
        assert_eq!(parse_birth_year(Some("-5")), None);
        assert_eq!(parse_birth_year(Some("abc")), None);
        assert_eq!(parse_birth_year(Some("")), None);
        assert_eq!(parse_birth_year(Some("0000")), None);
        assert_eq!(parse_birth_year(Some("99999999999999999999999")), None);
        assert_eq!(parse_birth_year(None), None);
    }

    #[test]
    fn birth_month_from_free_text() {
        assert_eq!(parse_birth_month(Some("Juli")), Some(7));
        assert_eq!(parse_birth_month(Some("8. AGUSTUS")), Some(8));
        assert_eq!(parse_birth_month(Some("bulan desember")), Some(12));
        assert_eq!(parse_birth_month(Some("July")), None);
        assert_eq!(parse_birth_month(None), None);
    }

    #[test]
    fn birth_month_names_round_trip() {
        for (i, month) in BirthMonth::ALL.into_iter().enumerate() {
            assert_eq!(month.number(), i as u32 + 1);
            assert_eq!(BirthMonth::parse(month.indonesian_name()), Some(month));
        }
        assert_eq!(BirthMonth::parse("MEI 1999"), Some(BirthMonth::May));
    }

    #[test]
    fn age_is_anchored_at_reference_month() {
        let mut ctx = RunContext::new(42);
        assert_eq!(derive(row("Anak", "2000", "Juli", "3"), &mut ctx).age, Some(25));
        assert_eq!(derive(row("Anak", "2000", "Agustus", "3"), &mut ctx).age, Some(26));
        assert_eq!(derive(row("Anak", "2000", "Desember", "3"), &mut ctx).age, Some(26));
    }

    #[test]
    fn age_absent_on_bad_inputs() {
        let mut ctx = RunContext::new(42);
        assert_eq!(derive(row("Anak", "20x0", "Juli", "3"), &mut ctx).age, None);
        assert_eq!(derive(row("Anak", "2000", "-", "3"), &mut ctx).age, None);
        // Born after the reference epoch.
        assert_eq!(derive(row("Anak", "2030", "Januari", "3"), &mut ctx).age, None);
    }

    #[test]
    fn age_for_reference_year_births() {
        assert_eq!(age_at(2025, 1, ReferenceEpoch::default()), Some(0));
        assert_eq!(age_at(2026, 9, ReferenceEpoch::default()), Some(0));
        assert_eq!(age_at(2026, 1, ReferenceEpoch::default()), None);
    }

    #[test]
    fn graduation_years_follow_birth_year() {
        let mut ctx = RunContext::new(42);
        let derived = derive(row("Anak", "1990", "Mei", "3"), &mut ctx);
        assert_eq!(derived.grad_primary, Some(2002));
        assert_eq!(derived.grad_lower_secondary, Some(2005));
        assert_eq!(derived.grad_upper_secondary, Some(2008));

        let derived = derive(row("Anak", "", "Mei", "3"), &mut ctx);
        assert_eq!(derived.grad_primary, None);
        assert_eq!(derived.grad_lower_secondary, None);
        assert_eq!(derived.grad_upper_secondary, None);
    }

    #[test]
    fn huge_birth_year_degrades_to_absent() {
        let mut ctx = RunContext::new(42);
        let derived = derive(row("Kepala Keluarga", "9223372036854775800", "Juli", "2"), &mut ctx);
        assert_eq!(derived.age, None);
        assert_eq!(derived.grad_primary, None);
        assert_eq!(derived.grad_lower_secondary, None);
        assert_eq!(derived.grad_upper_secondary, None);
        assert!(derived.cash_income.is_some());
        assert!((5..8).contains(&derived.work_days));
    }

    #[test]
    fn age_arithmetic_never_overflows() {
        let far = ReferenceEpoch { year: i64::MAX, month: 8 };
        assert_eq!(age_at(0, 9, far), None);
        assert_eq!(age_at(-1, 1, far), None);
        assert_eq!(age_at(1, 9, far), Some(i64::MAX));
        let early = ReferenceEpoch { year: i64::MIN, month: 8 };
        assert_eq!(age_at(1, 1, early), None);
    }

    #[test]
    fn income_only_for_household_head() {
        let mut ctx = RunContext::new(7);
        for _ in 0..200 {
            let head = derive(row("Kepala Keluarga", "1970", "Maret", "4"), &mut ctx);
            let cash = head.cash_income.unwrap();
            assert!((1_850_000..2_740_000).contains(&cash));
            assert_eq!(cash % 10_000, 0);
            let goods = head.goods_income.unwrap();
            assert!((1..10).any(|d| (3_000_000 - cash - d * 100_000).abs() == goods));

            for role in ["Istri", "Anak", ""] {
                let other = derive(row(role, "1970", "Maret", "4"), &mut ctx);
                assert_eq!(other.cash_income, None);
                assert_eq!(other.goods_income, None);
            }
        }
    }

    #[test]
    fn work_time_ranges_by_role() {
        let mut ctx = RunContext::new(11);
        for _ in 0..200 {
            let head = derive(row("Kepala Keluarga", "1970", "Maret", "4"), &mut ctx);
            assert!((26..37).contains(&head.work_hours));
            assert!((5..8).contains(&head.work_days));

            let spouse = derive(row("Istri", "1972", "Maret", "4"), &mut ctx);
            assert!((32..39).contains(&spouse.work_hours));

            let child = derive(row("Anak", "2001", "Maret", "4"), &mut ctx);
            assert!((12..29).contains(&child.work_hours));

            let alone = derive(row("Kepala Keluarga", "1950", "Maret", "1"), &mut ctx);
            assert!((32..39).contains(&alone.work_hours));

            let placeholder = derive(row("", "", "", "2"), &mut ctx);
            assert!((12..29).contains(&placeholder.work_hours));
        }
    }

    #[test]
    fn same_seed_same_draws() {
        let rows: Vec<FlatRow> = vec![
            row("Kepala Keluarga", "1970", "Maret", "3"),
            row("Istri", "1972", "Juni", "3"),
            row("Anak", "2005", "Oktober", "3"),
        ];
        let run = |seed| {
            let mut ctx = RunContext::new(seed);
            rows.iter().cloned().map(|r| derive(r, &mut ctx)).collect::<Vec<_>>()
        };
        assert_eq!(run(42), run(42));
    }

    #[test]
    fn custom_reference_epoch() {
        let mut ctx = RunContext::new(1).with_epoch(ReferenceEpoch { year: 2030, month: 1 });
        assert_eq!(derive(row("Anak", "2000", "Januari", "3"), &mut ctx).age, Some(31));
    }
}
