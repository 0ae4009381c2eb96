//! Household -> member rows.

use crate::model::{FlatRow, Household, HouseholdRecord, Location, MemberRecord};
use crate::normalize::normalize_field;

/// Expand each record into one row per member, or one placeholder row if it has none.
///
/// Records without an id are skipped; the reconciler never emits them.
pub fn flatten(records: &[HouseholdRecord]) -> Vec<FlatRow> {
    let mut rows = Vec::with_capacity(records.len());

    for record in records {
        let Some(record_id) = record.record_id.clone() else {
            continue;
        };

        let status = normalize_field(record.status.clone());
        let location = clean_location(&record.location);
        let household = clean_household(&record.household);

        if record.members.is_empty() {
            rows.push(FlatRow {
                record_id,
                status,
                location,
                household,
                member: MemberRecord::default(),
                placeholder: true,
            });
            continue;
        }

        for member in &record.members {
            rows.push(FlatRow {
                record_id: record_id.clone(),
                status: status.clone(),
                location: location.clone(),
                household: household.clone(),
                member: clean_member(member),
                placeholder: false,
            });
        }
    }

    rows
}

fn clean_location(location: &Location) -> Location {
    Location {
        region: normalize_field(location.region.clone()),
        sub_region: normalize_field(location.sub_region.clone()),
        sub_district: normalize_field(location.sub_district.clone()),
        cluster_code: location.cluster_code.clone(),
    }
}

fn clean_household(household: &Household) -> Household {
    Household {
        existence: normalize_field(household.existence.clone()),
        ..household.clone()
    }
}

fn clean_member(member: &MemberRecord) -> MemberRecord {
    MemberRecord {
        existence: normalize_field(member.existence.clone()),
        relationship: normalize_field(member.relationship.clone()),
        sex: normalize_field(member.sex.clone()),
        birth_month: normalize_field(member.birth_month.clone()),
        ..member.clone()
    }
}
